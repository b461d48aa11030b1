use std::io::Read;
use std::path::PathBuf;

use clap::Parser;

use cognical_scheduler_lib::commands::planning::planning_generate_json_with;
use cognical_scheduler_lib::commands::CommandError;
use cognical_scheduler_lib::error::AppError;
use cognical_scheduler_lib::utils::clock::{FixedClock, SystemClock};
use cognical_scheduler_lib::utils::logger::init_logging;

/// Turns a plan request (tasks, events, settings, locked blocks) into time blocks.
#[derive(Parser)]
#[command(name = "planner", version, about = "Deterministic time-blocking planner")]
struct Cli {
    /// Request JSON file; reads stdin when omitted or "-"
    request: Option<PathBuf>,

    /// Freeze "now" to an RFC 3339 instant for reproducible plans
    #[arg(long)]
    now: Option<String>,

    /// Also write daily-rolling log files into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Pretty-print the plan JSON
    #[arg(long)]
    pretty: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_dir.as_deref()) {
        eprintln!("error: {e}");
    }

    match run(&cli) {
        Ok(output) => println!("{output}"),
        Err(error) => {
            match serde_json::to_string(&error) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("error: {error}"),
            }
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<String, CommandError> {
    let payload = read_request(cli.request.as_ref())?;
    match &cli.now {
        Some(now) => {
            planning_generate_json_with(FixedClock::from_rfc3339(now)?, &payload, cli.pretty)
        }
        None => planning_generate_json_with(SystemClock, &payload, cli.pretty),
    }
}

fn read_request(path: Option<&PathBuf>) -> Result<String, AppError> {
    match path {
        Some(path) if path.as_os_str() != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
