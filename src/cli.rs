//! Command-line argument parsing (manual implementation)

use std::env;
use std::process;

use crate::constants::{APP_NAME, APP_VERSION, DEFAULT_TOP_PROCESSES, INITIAL_ENTRY_CAPACITY};

/// Parsed command-line arguments
#[derive(Debug)]
pub struct Args {
    /// Emit the report as pretty-printed JSON instead of the terminal view
    pub json: bool,
    /// Initial entry capacity offered to the snapshot request
    pub capacity: usize,
    /// Number of processes shown in the printed report
    pub top: usize,
    /// Enable debug-level logging
    pub verbose: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            json: false,
            capacity: INITIAL_ENTRY_CAPACITY,
            top: DEFAULT_TOP_PROCESSES,
            verbose: false,
        }
    }
}

/// Print help message and exit
fn print_help() {
    println!(
        "{} {}
A command-line SQL Server memory diagnostic built on raw Win32/NT snapshot queries.

USAGE:
    {} [OPTIONS]

OPTIONS:
    -j, --json             Emit the report as pretty-printed JSON
    -c, --capacity <N>     Initial process-entry capacity for the snapshot
                           buffer [default: {}]; doubled automatically until
                           every process fits
    -t, --top <N>          Number of processes shown in the printed report
                           [default: {}]
    -v, --verbose          Enable debug-level logging
    -h, --help             Print help information
    -V, --version          Print version information

EXAMPLES:
    {}                     Capture a snapshot and print the report
    {} --json              Capture and emit JSON for further tooling
    {} -c 2048 -t 25       Pre-size for a busy host, show more processes",
        APP_NAME, APP_VERSION, APP_NAME, INITIAL_ENTRY_CAPACITY, DEFAULT_TOP_PROCESSES,
        APP_NAME, APP_NAME, APP_NAME
    );
    process::exit(0);
}

/// Print version and exit
fn print_version() {
    println!("{} {}", APP_NAME, APP_VERSION);
    process::exit(0);
}

/// Print error message and exit
fn print_error(msg: &str) -> ! {
    eprintln!("error: {}", msg);
    eprintln!("For more information, try '--help'");
    process::exit(1);
}

/// Parse a positive count from string
fn parse_count(option: &str, s: &str) -> usize {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => n,
        Ok(_) => print_error(&format!("{} must be greater than zero", option)),
        Err(_) => print_error(&format!("invalid value '{}' for {}. Must be a number", s, option)),
    }
}

/// Parse command-line arguments
pub fn parse_args() -> Args {
    let mut args = Args::default();
    let mut argv: Vec<String> = env::args().skip(1).collect();

    while !argv.is_empty() {
        let arg = argv.remove(0);

        match arg.as_str() {
            "-h" | "--help" => print_help(),
            "-V" | "--version" => print_version(),
            "-j" | "--json" => args.json = true,
            "-v" | "--verbose" => args.verbose = true,

            "-c" | "--capacity" => {
                if argv.is_empty() {
                    print_error("--capacity requires a value");
                }
                args.capacity = parse_count("--capacity", &argv.remove(0));
            }

            "-t" | "--top" => {
                if argv.is_empty() {
                    print_error("--top requires a value");
                }
                args.top = parse_count("--top", &argv.remove(0));
            }

            // Handle --key=value syntax
            s if s.starts_with("--") && s.contains('=') => {
                let parts: Vec<&str> = s.splitn(2, '=').collect();
                let key = parts[0];
                let value = parts[1];

                match key {
                    "--capacity" => args.capacity = parse_count("--capacity", value),
                    "--top" => args.top = parse_count("--top", value),
                    _ => print_error(&format!("unknown option '{}'", key)),
                }
            }

            s if s.starts_with('-') => {
                print_error(&format!("unknown option '{}'", s));
            }

            s => {
                print_error(&format!("unexpected argument '{}'", s));
            }
        }
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_constants() {
        let args = Args::default();
        assert!(!args.json);
        assert_eq!(args.capacity, INITIAL_ENTRY_CAPACITY);
        assert_eq!(args.top, DEFAULT_TOP_PROCESSES);
        assert!(!args.verbose);
    }
}
