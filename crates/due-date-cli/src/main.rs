use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use due_date_engine::{
    error_when_earlier_or_same_due_date, format_timestamp, parse_timestamp, Interval, LoanSnapshot,
    OpeningSchedule, PolicyConfig,
};

#[derive(Parser)]
#[command(
    name = "due-date",
    about = "Closed-library due dates, renewals and interval checks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Adjust a requested due date for a service point's closures
    Calculate {
        /// Loan-policy JSON file
        #[arg(long)]
        policy: PathBuf,

        /// Opening schedule JSON file
        #[arg(long)]
        schedule: PathBuf,

        /// Requested due date (RFC 3339 with offset)
        #[arg(long)]
        requested: String,
    },
    /// Check that a renewal moves the due date forward
    Renew {
        /// Current due date of the loan
        #[arg(long)]
        current: String,

        /// Proposed due date after renewal
        #[arg(long)]
        proposed: String,
    },
    /// Describe an interval and its relation to another
    Interval {
        #[arg(long)]
        begin: String,

        #[arg(long)]
        end: String,

        #[arg(long, requires = "other_end")]
        other_begin: Option<String>,

        #[arg(long, requires = "other_begin")]
        other_end: Option<String>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Calculate {
            policy,
            schedule,
            requested,
        } => {
            let policy_json = fs::read_to_string(&policy)
                .with_context(|| format!("failed to read policy {}", policy.display()))?;
            let schedule_json = fs::read_to_string(&schedule)
                .with_context(|| format!("failed to read schedule {}", schedule.display()))?;

            let strategy = PolicyConfig::from_json_str(&policy_json)
                .context("invalid policy")?
                .strategy()?;
            let schedule = OpeningSchedule::from_json_str(&schedule_json)?;
            let requested = parse_timestamp(&requested)?;

            let due = strategy
                .calculate_due_date(requested, &schedule)
                .with_context(|| format!("{strategy} could not place the due date"))?;
            println!("{}", format_timestamp(&due));
        }
        Command::Renew { current, proposed } => {
            let loan = LoanSnapshot::new(parse_timestamp(&current)?);
            let due = error_when_earlier_or_same_due_date(&loan, parse_timestamp(&proposed)?)?;
            println!("{}", format_timestamp(&due));
        }
        Command::Interval {
            begin,
            end,
            other_begin,
            other_end,
        } => {
            let interval = Interval::new(&parse_timestamp(&begin)?, &parse_timestamp(&end)?);
            println!("interval: {interval}");
            println!("duration_ms: {}", interval.duration().num_milliseconds());

            if let (Some(other_begin), Some(other_end)) = (other_begin, other_end) {
                let other =
                    Interval::new(&parse_timestamp(&other_begin)?, &parse_timestamp(&other_end)?);
                println!("abuts: {}", interval.abuts(&other));
                println!("overlaps: {}", interval.overlaps(&other));
                match interval.gap(&other) {
                    Some(gap) => println!("gap: {gap}"),
                    None => println!("gap: none"),
                }
            }
        }
    }

    Ok(())
}

/// Install an env-filtered subscriber writing to stderr, unless one is set.
fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
