// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

/// Model used when `--model` is not given.
pub const DEFAULT_MODEL: &str = "graph_opt.onnx";

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Predict Options:
    --model, -m <MODEL>    Path to OpenPose ONNX model [default: graph_opt.onnx]
    --source, -s <SOURCE>  Input source (image, directory, or glob)
    --imgsz <IMGSZ>        Network input size [default: 368]
    --device <DEVICE>      Device (cpu, cuda:0, coreml)
    --threads <THREADS>    Intra-op threads, 0 lets ONNX Runtime decide
    --save                 Save annotated images to runs/pose/predict
    --verbose <BOOL>       Show per-image output [default: true]

Examples:
    pose-overlay predict --model graph_opt.onnx --source person.jpg
    pose-overlay predict -m graph_opt.onnx -s photos/ --save
    pose-overlay predict -s "photos/*.png" --device cuda:0 --verbose false"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate poses and overlay skeletons on images
    Predict(PredictArgs),
}

/// Arguments for the predict command.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Path to OpenPose ONNX model file
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Input source (image, directory, or glob)
    #[arg(short, long)]
    pub source: String,

    /// Network input size (square)
    #[arg(long)]
    pub imgsz: Option<usize>,

    /// Device to use (cpu, cuda:0, coreml)
    #[arg(long)]
    pub device: Option<String>,

    /// Number of intra-op threads (0 = automatic)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Save annotated images to runs/pose/predict
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}
