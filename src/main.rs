//! MiniGit - a minimal snapshot-based version control engine
//!
//! This is the main entry point for the minigit command-line interface.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use minigit::logging::{init_logging, LoggingConfig};
use minigit::shell::{Repl, Session, ShellError};
use minigit::storage::{IdWidth, Repository, RepositoryConfig};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Parse simple command line args.
    let mut work_dir = PathBuf::from(".");
    let mut verbose = false;
    let mut full_ids = false;
    let mut execute: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-C" | "--dir" => {
                i += 1;
                if i < args.len() {
                    work_dir = PathBuf::from(&args[i]);
                }
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "--full-ids" => {
                full_ids = true;
            }
            "-e" | "--execute" => {
                i += 1;
                if i < args.len() {
                    execute = Some(args[i].clone());
                }
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("minigit v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                // Treat as working directory if no flag.
                if !arg.starts_with('-') {
                    work_dir = PathBuf::from(arg);
                } else {
                    eprintln!("Unknown option: {}", arg);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    let logging = LoggingConfig {
        verbose,
        color: std::io::stderr().is_terminal(),
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    let id_width = if full_ids { IdWidth::Full } else { IdWidth::Short };
    let config = RepositoryConfig::new(&work_dir).id_width(id_width);
    let session = Session::new(Repository::with_config(config));

    // Execute single command or run REPL.
    if let Some(line) = execute {
        if execute_command(session, &line, &mut io::stdout(), &mut io::stderr()) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    } else {
        match Repl::new(session).run() {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        }
    }
}

fn print_help() {
    println!("MiniGit - a minimal snapshot-based version control engine");
    println!();
    println!("Usage: minigit [OPTIONS] [DIR]");
    println!();
    println!("Options:");
    println!("  -C, --dir PATH         Working directory (default: .)");
    println!("  -e, --execute CMD      Run one command and exit");
    println!("      --full-ids         Use 16-digit content-mixed commit ids on init");
    println!("  -v, --verbose          Enable debug logging (or set MINIGIT_LOG)");
    println!("  -h, --help             Show this help message");
    println!("  --version              Show version");
    println!();
    println!("Examples:");
    println!("  minigit                          Start the shell in the current directory");
    println!("  minigit -e init                  Initialize a repository and exit");
    println!("  minigit -C proj -e 'commit wip'  Commit staged files in ./proj");
}

/// Run one command, printing its output to `out` and any failure to `err`.
///
/// Returns whether the command succeeded.
fn execute_command<W: Write, E: Write>(mut session: Session, line: &str, out: &mut W, err: &mut E) -> bool {
    let result: Result<(), ShellError> = match session.execute(line) {
        Ok(Some(outcome)) if !outcome.is_silent() => writeln!(out, "{}", outcome).map_err(Into::into),
        Ok(_) => Ok(()),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            let _ = writeln!(err, "Error: {}", e);
            false
        }
    }
}
