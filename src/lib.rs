// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # pose-overlay
//!
//! Single-person human pose overlay built on the OpenPose COCO model.
//!
//! A network produces one confidence heatmap per body part. This crate turns
//! those heatmaps into keypoints, connects them with the fixed 17-limb COCO
//! skeleton, and draws the skeleton onto a copy of the photograph.
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use pose_overlay::{OpenPoseModel, PosePipeline, annotate::annotate_image};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = OpenPoseModel::load("graph_opt.onnx")?;
//!     let mut pipeline = PosePipeline::new(model);
//!
//!     let image = image::open("person.jpg")?;
//!     let results = pipeline.predict_image(&image, "person.jpg".to_string())?;
//!     for (part, keypoint) in results.pose.iter() {
//!         if let Some((x, y)) = keypoint.position() {
//!             println!("{part}: ({x}, {y})");
//!         }
//!     }
//!
//!     annotate_image(&image, &results, None).save("person_pose.jpg")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Without a model
//!
//! The decoding core needs no inference engine. Any `[19, H, W]` tensor works:
//!
//! ```rust
//! use ndarray::Array3;
//! use pose_overlay::{BodyPart, Heatmap, Topology, estimate_pose};
//!
//! let mut grid = Array3::<f32>::zeros((19, 46, 46));
//! grid[[BodyPart::Nose.index(), 23, 23]] = 0.9;
//! let heatmap = Heatmap::new(grid)?;
//!
//! let (pose, edges) = estimate_pose(&heatmap, 368, 368, &Topology::default())?;
//! assert_eq!(pose[BodyPart::Nose].position(), Some((184, 184)));
//! assert!(edges.is_empty());
//! # Ok::<(), pose_overlay::PoseError>(())
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! pose-overlay predict --model graph_opt.onnx --source person.jpg
//! pose-overlay predict -m graph_opt.onnx -s photos/ --save
//! ```
//!
//! Annotated images are written to `runs/pose/predict`, `runs/pose/predict2`, ...
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`body_parts`] | The 19-entry body part catalog ([`BodyPart`]) |
//! | [`heatmap`] | [`Heatmap`] tensor and keypoint decoding |
//! | [`skeleton`] | Limb [`Topology`] and [`Edge`] assembly |
//! | [`visualizer`] | Skeleton rendering ([`RenderStyle`]) |
//! | [`results`] | [`PoseResult`], [`Keypoint`], [`Results`], [`Speed`] |
//! | [`pipeline`] | [`PosePipeline`] and [`estimate_pose`] |
//! | [`inference`] | [`HeatmapModel`] trait and [`InferenceConfig`] |
//! | [`model`] | ONNX Runtime backed [`OpenPoseModel`] |
//! | [`preprocessing`] | Image to network input conversion |
//! | [`source`] | Input images ([`Source`], [`SourceIterator`]) |
//! | [`error`] | [`PoseError`] and [`Result`] |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `cuda` | NVIDIA CUDA execution provider |
//! | `coreml` | Apple `CoreML` execution provider |

// Modules
pub mod annotate;
pub mod body_parts;
pub mod cli;
pub mod device;
pub mod error;
pub mod heatmap;
pub mod inference;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod preprocessing;
pub mod results;
pub mod skeleton;
pub mod source;
pub mod visualizer;

// Re-export main types for convenience
pub use body_parts::BodyPart;
pub use device::Device;
pub use error::{PoseError, Result};
pub use heatmap::{CONFIDENCE_THRESHOLD, Heatmap, decode_heatmap};
pub use inference::{HeatmapModel, InferenceConfig};
pub use model::OpenPoseModel;
pub use pipeline::{PosePipeline, estimate_pose};
pub use results::{Keypoint, PoseResult, Results, Speed};
pub use skeleton::{Edge, POSE_PAIRS, Topology, assemble_edges};
pub use source::{Source, SourceIterator, SourceMeta};
pub use visualizer::{RenderStyle, render_skeleton, render_skeleton_array};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "pose-overlay");
    }
}
