use crate::model::{CalendarView, DayCell, Intensity, MonthLabel, WeekColumn, WeekdayLabel};
use crate::pattern::PatternStore;
use crate::util::week_anchor;
use chrono::{Datelike, Duration, NaiveDate};

/// Rows (Monday = 0) that carry a weekday label.
pub const WEEKDAY_LABEL_ROWS: [(&str, usize); 3] = [("Mon", 0), ("Wed", 2), ("Fri", 4)];

/// Lay the trailing year out as Monday-first week columns ending on `today`.
pub fn build(today: NaiveDate, pattern: &PatternStore) -> CalendarView {
    let mut day = week_anchor(today);
    let mut weeks = Vec::with_capacity(54);
    let mut month_labels: Vec<MonthLabel> = Vec::new();

    while day <= today {
        let column = weeks.len();
        let mut days: [Option<DayCell>; 7] = Default::default();

        for (row, slot) in days.iter_mut().enumerate() {
            if day > today {
                break;
            }
            if (column == 0 && row == 0) || day.day() == 1 {
                let month = day.format("%b").to_string();
                if !month_labels.iter().any(|m| m.month == month) {
                    month_labels.push(MonthLabel { month, column });
                }
            }
            let count = pattern.get(day);
            *slot = Some(DayCell {
                date: day,
                count,
                intensity: Intensity::from_count(count),
            });
            day += Duration::days(1);
        }

        weeks.push(WeekColumn { days });
    }

    let weekday_labels = WEEKDAY_LABEL_ROWS
        .iter()
        .map(|&(label, row)| WeekdayLabel { label, row })
        .collect();

    CalendarView {
        weeks,
        month_labels,
        weekday_labels,
    }
}
