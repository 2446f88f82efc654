// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;

use crate::annotate::annotate_image;
use crate::cli::args::PredictArgs;
use crate::error::Result;
use crate::io::{SaveResults, find_next_run_dir};
use crate::source::{Source, SourceIterator};
use crate::{Device, InferenceConfig, OpenPoseModel, PosePipeline, Speed, VERSION};
use crate::{error, info, section, success, verbose, warn};

/// Parent directory for saved runs.
const RUNS_DIR: &str = "runs/pose";

/// Build the inference configuration from CLI arguments.
///
/// # Errors
///
/// Returns [`crate::PoseError::ConfigError`] for an unknown device string or
/// a zero input size.
pub fn build_config(args: &PredictArgs) -> Result<InferenceConfig> {
    let mut config = InferenceConfig::new().with_threads(args.threads);

    if let Some(sz) = args.imgsz {
        if sz == 0 {
            return Err(crate::PoseError::ConfigError(
                "--imgsz must be greater than 0".to_string(),
            ));
        }
        config = config.with_imgsz(sz, sz);
    }

    if let Some(device) = &args.device {
        config = config.with_device(device.parse::<Device>()?);
    }

    Ok(config)
}

/// Run pose estimation over every image in the source.
///
/// Per-image failures are reported and skipped. Failures that prevent any
/// work (bad configuration, model load, unreadable source, save directory)
/// are returned.
///
/// # Errors
///
/// Returns an error if the model can't be loaded or the source can't be
/// opened.
#[allow(clippy::cast_precision_loss)]
pub fn run_prediction(args: &PredictArgs) -> Result<()> {
    let config = build_config(args)?;
    let device = config.device;

    let model = OpenPoseModel::load_with_config(&args.model, config)?;
    let (imgsz_h, imgsz_w) = model.imgsz();
    let mut pipeline = PosePipeline::new(model);

    info!("pose-overlay {VERSION} 🚀 Rust ONNX FP32 {}", device_label(device));
    verbose!(
        "OpenPose COCO summary: 18 keypoints, {} limbs, imgsz=({imgsz_h}, {imgsz_w})",
        pipeline.topology().len()
    );

    let source = Source::from(args.source.as_str());
    let images = SourceIterator::new(source)?;
    if images.is_empty() {
        warn!("No images found in source '{}'", args.source);
        return Ok(());
    }
    section!("{}", source_header(&args.source, images.len()));

    let mut saver = if args.save {
        let dir: PathBuf = find_next_run_dir(RUNS_DIR, "predict");
        std::fs::create_dir_all(&dir)?;
        Some(SaveResults::new(dir))
    } else {
        None
    };

    let mut speeds: Vec<Speed> = Vec::new();
    let mut failures = 0_usize;

    for item in images {
        let (img, meta) = match item {
            Ok(val) => val,
            Err(e) => {
                error!("{e}");
                failures += 1;
                continue;
            }
        };

        let results = match pipeline.predict_image(&img, meta.path.clone()) {
            Ok(r) => r,
            Err(e) => {
                error!("{}: {e}", meta.path);
                failures += 1;
                continue;
            }
        };

        verbose!(
            "image {}/{} {}: {imgsz_h}x{imgsz_w} {}, {:.1}ms",
            meta.index + 1,
            meta.total,
            meta.path,
            results.summary(),
            results.speed.inference.unwrap_or(0.0)
        );

        if let Some(saver) = saver.as_mut() {
            let annotated = annotate_image(&img, &results, None);
            if let Err(e) = saver.save(&meta, &annotated) {
                error!("Failed to save result: {e}");
            }
        }

        speeds.push(results.speed);
    }

    if !speeds.is_empty() {
        let avg = average_speed(&speeds);
        verbose!(
            "Speed: {:.1}ms preprocess, {:.1}ms inference, {:.1}ms postprocess per image at shape (1, 3, {imgsz_h}, {imgsz_w})",
            avg.preprocess.unwrap_or(0.0),
            avg.inference.unwrap_or(0.0),
            avg.postprocess.unwrap_or(0.0),
        );
    }

    if let Some(saver) = &saver {
        success!(
            "{} image(s) saved to {}",
            saver.saved(),
            saver.save_dir().display()
        );
    }

    if failures > 0 {
        warn!("{failures} image(s) could not be processed");
    }

    Ok(())
}

/// Short device name for the banner.
const fn device_label(device: Device) -> &'static str {
    match device {
        Device::Cpu => "CPU",
        Device::Cuda(_) => "CUDA",
        Device::CoreMl => "CoreML",
    }
}

/// Verbose header naming the source and how many images it holds.
fn source_header(source: &str, count: usize) -> String {
    let noun = if count == 1 { "image" } else { "images" };
    format!("Predicting {count} {noun} from {source}")
}

/// Mean of each stage over `speeds`. Stages missing everywhere stay `None`.
#[allow(clippy::cast_precision_loss)]
fn average_speed(speeds: &[Speed]) -> Speed {
    let mean = |stage: fn(&Speed) -> Option<f64>| {
        let values: Vec<f64> = speeds.iter().filter_map(stage).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    };

    Speed {
        preprocess: mean(|s| s.preprocess),
        inference: mean(|s| s.inference),
        postprocess: mean(|s| s.postprocess),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Commands};
    use clap::Parser;

    fn predict_args(argv: &[&str]) -> PredictArgs {
        let mut full = vec!["app", "predict", "--source", "x.jpg"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Predict(args) => args,
        }
    }

    #[test]
    fn test_build_config_defaults() {
        let config = build_config(&predict_args(&[])).unwrap();
        assert_eq!(config, InferenceConfig::default());
    }

    #[test]
    fn test_build_config_overrides() {
        let config =
            build_config(&predict_args(&["--imgsz", "256", "--device", "cuda:1", "--threads", "2"]))
                .unwrap();
        assert_eq!(config.imgsz, (256, 256));
        assert_eq!(config.device, Device::Cuda(1));
        assert_eq!(config.num_threads, 2);
    }

    #[test]
    fn test_build_config_rejects_bad_values() {
        assert!(build_config(&predict_args(&["--device", "tpu"])).is_err());
        assert!(build_config(&predict_args(&["--imgsz", "0"])).is_err());
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let args = predict_args(&["--model", "does-not-exist.onnx"]);
        assert!(matches!(
            run_prediction(&args),
            Err(crate::PoseError::ModelLoadError(_))
        ));
    }

    #[test]
    fn test_average_speed() {
        let speeds = [
            Speed::new(1.0, 10.0, 0.5),
            Speed {
                preprocess: None,
                inference: Some(20.0),
                postprocess: Some(1.5),
            },
        ];
        let avg = average_speed(&speeds);
        assert_eq!(avg.preprocess, Some(1.0));
        assert_eq!(avg.inference, Some(15.0));
        assert_eq!(avg.postprocess, Some(1.0));

        let none = average_speed(&[Speed::default()]);
        assert!(none.inference.is_none());
    }

    #[test]
    fn test_source_header() {
        assert_eq!(source_header("a.jpg", 1), "Predicting 1 image from a.jpg");
        assert_eq!(source_header("photos/", 12), "Predicting 12 images from photos/");
    }

    #[test]
    fn test_device_label() {
        assert_eq!(device_label(Device::Cpu), "CPU");
        assert_eq!(device_label(Device::Cuda(3)), "CUDA");
        assert_eq!(device_label(Device::CoreMl), "CoreML");
    }
}
