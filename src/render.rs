use crate::model::{CalendarView, DayMismatch, Intensity, VerifyOutput};
use anyhow::Result;
use console::{style, StyledObject};

const CELL: &str = "■";
const GUTTER: usize = 4;

fn cell_style(intensity: Intensity) -> StyledObject<&'static str> {
    match intensity {
        Intensity::None => style(CELL).color256(236),
        Intensity::Low => style(CELL).color256(22),
        Intensity::Medium => style(CELL).color256(28),
        Intensity::High => style(CELL).color256(34),
        Intensity::Max => style(CELL).color256(46),
    }
}

/// Header line with each month abbreviation above the column it starts in.
fn month_header(view: &CalendarView) -> String {
    let mut header = " ".repeat(GUTTER + view.weeks.len() * 2);
    for label in &view.month_labels {
        let start = GUTTER + label.column * 2;
        let end = (start + label.month.len()).min(header.len());
        if header.is_char_boundary(start) && header.is_char_boundary(end) && header[start..end].trim().is_empty() {
            header.replace_range(start..end, &label.month[..end - start]);
        }
    }
    header.trim_end().to_string()
}

pub fn output_calendar(view: &CalendarView, active_days: usize) -> Result<()> {
    println!("{}", style("Contribution Calendar").bold());
    println!("{}", style(month_header(view)).dim());

    for row in 0..7 {
        let label = view
            .weekday_labels
            .iter()
            .find(|l| l.row == row)
            .map(|l| l.label)
            .unwrap_or("");
        let mut line = format!("{:<width$}", label, width = GUTTER);
        for week in &view.weeks {
            match &week.days[row] {
                Some(cell) => line.push_str(&cell_style(cell.intensity).to_string()),
                None => line.push(' '),
            }
            line.push(' ');
        }
        println!("{}", line.trim_end());
    }

    if let (Some(first), Some(last)) = (view.first_day(), view.last_day()) {
        println!(
            "\n{} to {}: {} commits across {} active days",
            first,
            last,
            style(view.total()).green().bold(),
            active_days
        );
    }

    println!("\n{}", style("Legend").bold());
    println!(
        "  Less {} {} {} {} {} More",
        cell_style(Intensity::None),
        cell_style(Intensity::Low),
        cell_style(Intensity::Medium),
        cell_style(Intensity::High),
        cell_style(Intensity::Max)
    );
    Ok(())
}

pub fn output_json<T: serde::Serialize>(output: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

pub fn output_verify(output: &VerifyOutput) -> Result<()> {
    if output.mismatches.is_empty() {
        println!(
            "{} {} commits in {} match the pattern",
            style("✔").green(),
            output.actual_commits,
            output.repository_path
        );
        return Ok(());
    }

    println!(
        "{} history has {} commits, pattern expects {}",
        style("✘").red(),
        output.actual_commits,
        output.expected_commits
    );
    for DayMismatch { date, expected, actual } in &output.mismatches {
        println!("  {date}  expected {expected:>3}, found {actual:>3}");
    }
    Ok(())
}
