//! CLI SQL Server memory diagnostic
//!
//! Captures a point-in-time snapshot of every running process's memory
//! footprint and privilege state alongside machine-wide memory totals, then
//! analyzes it for the usual suspects behind unexplained memory pressure:
//! SQL Server locked/large-page memory and WSL2/Hyper-V backing processes.

mod cli;
mod constants;
mod report;
mod snapshot;

#[cfg(windows)]
mod capture;
#[cfg(windows)]
mod ffi;
#[cfg(windows)]
mod system;

use std::process;

use tracing::Level;

use cli::Args;

fn main() {
    let args = cli::parse_args();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("failed to set tracing subscriber");

    process::exit(run(&args));
}

#[cfg(windows)]
fn run(args: &Args) -> i32 {
    let summary = match capture::capture(args.capacity) {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("error: {}", err);
            return 1;
        }
    };

    let findings = report::analyze::analyze(&summary);

    if args.json {
        match report::to_json(&summary, &findings) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("error: failed to render JSON report: {}", err);
                return 1;
            }
        }
    } else if let Err(err) = report::print::print_report(&summary, &findings, args.top) {
        eprintln!("error: failed to print report: {}", err);
        return 1;
    }

    0
}

#[cfg(not(windows))]
fn run(_args: &Args) -> i32 {
    eprintln!(
        "{} captures Windows memory snapshots and only runs on Windows.",
        constants::APP_NAME
    );
    1
}
