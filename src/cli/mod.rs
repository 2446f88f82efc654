// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Command-line interface: argument parsing, console output and the
//! `predict` command.

/// CLI arguments.
pub mod args;

/// Console output macros and verbosity.
pub mod logging;

/// Prediction logic.
pub mod predict;
