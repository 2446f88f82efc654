// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Inference configuration and the heatmap model interface.
//!
//! [`InferenceConfig`] controls how images are turned into network input and
//! where the network runs. [`HeatmapModel`] is the only thing the pipeline
//! needs from an inference engine: an image in, a [`Heatmap`] out.

use std::time::Instant;

use image::DynamicImage;

use crate::device::Device;
use crate::error::Result;
use crate::heatmap::Heatmap;
use crate::results::Speed;

/// Anything that can turn an image into per-part heatmaps.
///
/// Implemented by [`OpenPoseModel`](crate::OpenPoseModel); tests and callers
/// with their own inference stack can implement it over synthetic tensors.
pub trait HeatmapModel {
    /// Run the network on `image` and return its `[19, H, W]` heatmaps.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the output has the wrong shape.
    fn heatmaps(&mut self, image: &DynamicImage) -> Result<Heatmap>;

    /// Like [`heatmaps`](Self::heatmaps), also reporting stage timings.
    ///
    /// The default implementation books the whole call as inference time.
    /// Implementations with a separate preprocessing step should override it.
    ///
    /// # Errors
    ///
    /// Same as [`heatmaps`](Self::heatmaps).
    fn heatmaps_timed(&mut self, image: &DynamicImage) -> Result<(Heatmap, Speed)> {
        let start = Instant::now();
        let heatmap = self.heatmaps(image)?;
        let speed = Speed {
            inference: Some(start.elapsed().as_secs_f64() * 1000.0),
            ..Speed::default()
        };
        Ok((heatmap, speed))
    }
}

/// Configuration for heatmap inference.
///
/// # Example
///
/// ```rust
/// use pose_overlay::InferenceConfig;
///
/// let config = InferenceConfig::new()
///     .with_imgsz(368, 368)
///     .with_threads(4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    /// Network input size (height, width).
    pub imgsz: (usize, usize),
    /// Value subtracted from every channel before scaling.
    pub mean: f32,
    /// Multiplier applied after mean subtraction.
    pub scale: f32,
    /// Feed channels in RGB order. When `false`, channels are fed as BGR.
    pub swap_rb: bool,
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose the optimal number.
    pub num_threads: usize,
    /// Execution device.
    pub device: Device,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            imgsz: (368, 368),
            mean: 127.5,
            scale: 1.0,
            swap_rb: true,
            num_threads: 0,
            device: Device::Cpu,
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the network input size.
    ///
    /// # Arguments
    ///
    /// * `height` - The target image height.
    /// * `width` - The target image width.
    #[must_use]
    pub const fn with_imgsz(mut self, height: usize, width: usize) -> Self {
        self.imgsz = (height, width);
        self
    }

    /// Set the per-channel mean subtracted from pixel values.
    #[must_use]
    pub const fn with_mean(mut self, mean: f32) -> Self {
        self.mean = mean;
        self
    }

    /// Set the multiplier applied after mean subtraction.
    #[must_use]
    pub const fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Choose RGB (`true`) or BGR (`false`) channel order for the network.
    #[must_use]
    pub const fn with_swap_rb(mut self, swap_rb: bool) -> Self {
        self.swap_rb = swap_rb;
        self
    }

    /// Set the number of threads for inference.
    ///
    /// # Arguments
    ///
    /// * `threads` - The number of intra-op threads. Set to `0` for auto-configuration.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Set the execution device.
    #[must_use]
    pub const fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }
}
