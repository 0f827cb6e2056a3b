use crate::util::parse_date;
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_WORK_DIR: &str = "gh_activity_repo";

#[derive(Parser)]
#[command(name = "gpaint")]
#[command(about = "Design a contribution calendar and push it as a backdated git history")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, env = "GPAINT_PATTERN", default_value = "pattern.json", global = true, help = "Path to the pattern JSON file")]
    pub pattern: PathBuf,

    #[arg(long, global = true, value_parser = parse_day, help = "Treat this YYYY-MM-DD date as today")]
    pub today: Option<NaiveDate>,

    #[arg(short, long, global = true, help = "Enable debug logging on stderr")]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(crate::util::today)
    }
}

fn parse_day(input: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(input).map_err(|e| e.to_string())
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the calendar for the trailing year
    Show {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Set the commit count for one day
    Set {
        #[arg(help = "Day to change (YYYY-MM-DD)")]
        date: String,

        #[arg(help = "Commits for that day (0-100)")]
        count: u32,
    },
    /// Clear every day in the pattern
    Reset,
    /// Fill every day of the calendar with a random count
    Fill {
        #[arg(long, default_value_t = 0, help = "Smallest count to draw")]
        min: u32,

        #[arg(long, default_value_t = 10, help = "Largest count to draw")]
        max: u32,

        #[arg(long, help = "Seed for a reproducible fill")]
        seed: Option<u64>,
    },
    /// Create the backdated history and force-push it
    Generate {
        #[arg(long, env = "GPAINT_NAME", help = "Commit author name")]
        name: Option<String>,

        #[arg(long, env = "GPAINT_EMAIL", help = "Commit author email")]
        email: Option<String>,

        #[arg(long, env = "GPAINT_REMOTE", help = "Remote repository URL to force-push to")]
        remote: Option<String>,

        #[arg(long, default_value = DEFAULT_WORK_DIR, help = "Scratch repository directory (recreated on every run)")]
        work_dir: PathBuf,
    },
    /// Compare the scratch repository history with the pattern
    Verify {
        #[arg(long, default_value = DEFAULT_WORK_DIR, help = "Scratch repository directory")]
        work_dir: PathBuf,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Show { json } => crate::show::exec(self.common, json),
            Commands::Set { date, count } => crate::edit::set(self.common, &date, count),
            Commands::Reset => crate::edit::reset(self.common),
            Commands::Fill { min, max, seed } => crate::edit::fill(self.common, min, max, seed),
            Commands::Generate { name, email, remote, work_dir } => {
                crate::generate::exec(self.common, name, email, remote, work_dir)
            }
            Commands::Verify { work_dir, json } => crate::verify::exec(self.common, work_dir, json),
        }
    }
}
