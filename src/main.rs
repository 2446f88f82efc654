// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! `pose-overlay` command-line entry point.

use std::process;

use clap::Parser;

use pose_overlay::cli::args::{Cli, Commands};
use pose_overlay::cli::logging::set_verbose;
use pose_overlay::cli::predict::run_prediction;
use pose_overlay::error;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Predict(args) => {
            set_verbose(args.verbose);
            if let Err(e) = run_prediction(&args) {
                error!("{e}");
                process::exit(1);
            }
        }
    }
}
