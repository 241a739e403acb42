//! Command-line entry point.
//!
//! # Responsibility
//! - Run the raise pipeline over a local file without any transport layer.
//! - Keep output deterministic for scripted use.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use payroll_core::{
    core_version, default_log_level, init_logging, parse_line, ping, PayrollConfig,
    PayrollService,
};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(
    name = "payroll",
    version = env!("CARGO_PKG_VERSION"),
    about = "Applies the yearly salary raise formula to an employee file."
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a liveness probe
    Ping,
    /// Print the core crate version
    Version,
    /// Load an employee file, apply raises and write the output file
    Apply {
        /// Input file with `id,name,salary,joinDate,role,projectCompletion` lines
        input: PathBuf,
        /// Output file (defaults to PAYROLL_OUTPUT_PATH or data/employees.csv)
        #[clap(long)]
        output: Option<PathBuf>,
        /// Worker thread count
        #[clap(long)]
        workers: Option<NonZeroUsize>,
        /// Seconds to wait for all workers
        #[clap(long)]
        timeout_secs: Option<u64>,
        /// Evaluation date (YYYY-MM-DD); defaults to today
        #[clap(long)]
        as_of: Option<NaiveDate>,
        /// Absolute directory for rolling log files
        #[clap(long)]
        log_dir: Option<String>,
    },
    /// Compute the new salary for a single record line
    Preview {
        /// One `id,name,salary,joinDate,role,projectCompletion` line
        line: String,
        /// Evaluation date (YYYY-MM-DD); defaults to today
        #[clap(long)]
        as_of: Option<NaiveDate>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Ping => println!("payroll_core ping={}", ping()),
        Command::Version => println!("payroll_core version={}", core_version()),
        Command::Apply {
            input,
            output,
            workers,
            timeout_secs,
            as_of,
            log_dir,
        } => {
            if let Some(dir) = log_dir {
                init_logging(default_log_level(), &dir).map_err(|err| err.to_string())?;
            }

            let mut config = PayrollConfig::from_env().map_err(|err| err.to_string())?;
            if let Some(output) = output {
                config = config.with_output_path(output);
            }
            if let Some(workers) = workers {
                config = config.with_workers(workers);
            }
            if let Some(secs) = timeout_secs.filter(|secs| *secs > 0) {
                config = config.with_timeout(Duration::from_secs(secs));
            }

            let bytes = std::fs::read(&input)
                .map_err(|err| format!("failed to read `{}`: {err}", input.display()))?;
            let service = PayrollService::new(&config);
            let lines = service
                .load_and_apply(&bytes, as_of.unwrap_or_else(today))
                .map_err(|err| err.to_string())?;
            println!(
                "raised {} employee(s) with {} worker(s); wrote {}",
                lines.len(),
                config.workers,
                config.output_path.display()
            );
        }
        Command::Preview { line, as_of } => {
            let employee = parse_line(&line).map_err(|err| err.to_string())?;
            let service = PayrollService::new(&PayrollConfig::default());
            let salary = service
                .preview_raise(&employee, as_of.unwrap_or_else(today))
                .map_err(|err| err.to_string())?;
            println!("{salary}");
        }
    }
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
