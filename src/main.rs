//! scrtx - confidential transaction decoder.

use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{EnvFilter, fmt};

fn setup_logging(verbose: u8, no_color: bool) -> Result<(), SetGlobalDefaultError> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(verbose > 1)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

fn main() -> ExitCode {
    // Parse command line arguments
    let args = scrtx::Args::parse();

    // Disable colors if requested
    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = setup_logging(args.verbose, args.no_color) {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow(), e);
    }

    match scrtx::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Print error message
            eprintln!("{}: {}", "error".red(), e);
            // Return appropriate exit code
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
