//! imagecrop — command-line host for the `image_crop` method channel.
//!
//! Each subcommand becomes one channel call; the outcome is printed as JSON.

mod cli;
mod logger;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let args = cli::Cli::parse();
    logger::init_cli_logger(args.verbose);

    tracing::debug!(?args, "parsed arguments");

    match cli::run(&args).and_then(|outcome| Ok((cli::render(&outcome)?, outcome))) {
        Ok((rendered, outcome)) => {
            println!("{}", rendered);
            if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("{}", cli::error_report(&e));
            ExitCode::FAILURE
        }
    }
}
