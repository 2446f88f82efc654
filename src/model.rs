// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! OpenPose model loading and inference.
//!
//! This module wraps an ONNX Runtime session around an OpenPose COCO graph
//! (for example `graph_opt.pb` converted to ONNX) and exposes it through the
//! [`HeatmapModel`] interface.

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use ndarray::Array4;
use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::value::TensorRef;

use crate::device::Device;
use crate::error::{PoseError, Result};
use crate::heatmap::Heatmap;
use crate::inference::{HeatmapModel, InferenceConfig};
use crate::preprocessing::blob_from_image;
use crate::results::Speed;

/// OpenPose heatmap network backed by ONNX Runtime.
///
/// # Example
///
/// ```no_run
/// use pose_overlay::{HeatmapModel, OpenPoseModel};
///
/// let mut model = OpenPoseModel::load("graph_opt.onnx")?;
/// let image = image::open("person.jpg")?;
/// let heatmap = model.heatmaps(&image)?;
/// let pose = heatmap.decode(image.width(), image.height())?;
/// # Ok::<(), pose_overlay::PoseError>(())
/// ```
pub struct OpenPoseModel {
    /// ONNX Runtime session.
    session: Session,
    /// Input tensor name.
    input_name: String,
    /// Output tensor names.
    output_names: Vec<String>,
    /// Inference configuration.
    config: InferenceConfig,
}

impl OpenPoseModel {
    /// Load a model with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, InferenceConfig::default())
    }

    /// Load a model with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist, can't be loaded, or
    /// the requested device is not compiled in.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: InferenceConfig) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PoseError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let builder = Session::builder().map_err(|e| {
            PoseError::ModelLoadError(format!("Failed to create session builder: {e}"))
        })?;
        let builder = Self::register_device(builder, config.device)?;

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                PoseError::ModelLoadError(format!("Failed to set optimization level: {e}"))
            })?
            .with_intra_threads(config.num_threads)
            .map_err(|e| {
                PoseError::ModelLoadError(format!("Failed to set intra-thread count: {e}"))
            })?
            .commit_from_file(path)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to load model: {e}")))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| PoseError::ModelLoadError("Model has no inputs".to_string()))?;
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        if output_names.is_empty() {
            return Err(PoseError::ModelLoadError("Model has no outputs".to_string()));
        }

        Ok(Self {
            session,
            input_name,
            output_names,
            config,
        })
    }

    /// Register the execution provider for `device`.
    #[allow(clippy::needless_pass_by_value, unused_mut)]
    fn register_device(mut builder: SessionBuilder, device: Device) -> Result<SessionBuilder> {
        match device {
            Device::Cpu => Ok(builder),
            #[cfg(feature = "cuda")]
            Device::Cuda(index) => {
                use ort::execution_providers::CUDAExecutionProvider;
                builder = builder
                    .with_execution_providers([CUDAExecutionProvider::default()
                        .with_device_id(i32::try_from(index).unwrap_or(0))
                        .build()])
                    .map_err(|e| {
                        PoseError::ModelLoadError(format!("Failed to register CUDA EP: {e}"))
                    })?;
                Ok(builder)
            }
            #[cfg(feature = "coreml")]
            Device::CoreMl => {
                use ort::execution_providers::CoreMLExecutionProvider;
                builder = builder
                    .with_execution_providers([CoreMLExecutionProvider::default()
                        .with_subgraphs(true)
                        .build()])
                    .map_err(|e| {
                        PoseError::ModelLoadError(format!("Failed to register CoreML EP: {e}"))
                    })?;
                Ok(builder)
            }
            #[allow(unreachable_patterns)]
            other => Err(PoseError::ConfigError(format!(
                "Device '{other}' requires the matching Cargo feature"
            ))),
        }
    }

    /// Run the ONNX session on a preprocessed `(1, 3, H, W)` tensor.
    fn run_inference(&mut self, input: &Array4<f32>) -> Result<(Vec<f32>, Vec<usize>)> {
        let input_contiguous = input.as_standard_layout();

        let input_tensor = TensorRef::from_array_view(&input_contiguous).map_err(|e| {
            PoseError::InferenceError(format!("Failed to create input tensor: {e}"))
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| PoseError::InferenceError(format!("Inference failed: {e}")))?;

        let output_name = &self.output_names[0];
        let output = outputs.get(output_name.as_str()).ok_or_else(|| {
            PoseError::InferenceError(format!("Output '{output_name}' not found"))
        })?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PoseError::InferenceError(format!("Failed to extract output: {e}")))?;

        let shape_vec = shape
            .iter()
            .map(|&d| {
                usize::try_from(d).map_err(|_| {
                    PoseError::InvalidTensorShape(format!("dynamic output dimension {d}"))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok((data.to_vec(), shape_vec))
    }

    /// Get the inference configuration.
    #[must_use]
    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Get the network input size (height, width).
    #[must_use]
    pub const fn imgsz(&self) -> (usize, usize) {
        self.config.imgsz
    }
}

impl HeatmapModel for OpenPoseModel {
    fn heatmaps(&mut self, image: &DynamicImage) -> Result<Heatmap> {
        self.heatmaps_timed(image).map(|(heatmap, _)| heatmap)
    }

    fn heatmaps_timed(&mut self, image: &DynamicImage) -> Result<(Heatmap, Speed)> {
        let start_preprocess = Instant::now();
        let blob = blob_from_image(image, &self.config)?;
        let preprocess_time = start_preprocess.elapsed().as_secs_f64() * 1000.0;

        let start_inference = Instant::now();
        let (data, shape) = self.run_inference(&blob)?;
        let heatmap = Heatmap::from_network_output(&data, &shape)?;
        let inference_time = start_inference.elapsed().as_secs_f64() * 1000.0;

        let speed = Speed {
            preprocess: Some(preprocess_time),
            inference: Some(inference_time),
            postprocess: None,
        };
        Ok((heatmap, speed))
    }
}

impl std::fmt::Debug for OpenPoseModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenPoseModel")
            .field("input_name", &self.input_name)
            .field("output_names", &self.output_names)
            .field("imgsz", &self.config.imgsz)
            .field("device", &self.config.device)
            .finish()
    }
}
