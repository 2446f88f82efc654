// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! End-to-end pose estimation: model, heatmap decoding and skeleton assembly.

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use ndarray::Array3;

use crate::error::{PoseError, Result};
use crate::heatmap::Heatmap;
use crate::inference::HeatmapModel;
use crate::preprocessing::array_to_image;
use crate::results::{PoseResult, Results};
use crate::skeleton::{Edge, Topology};

/// Decode `heatmap` against a `width` x `height` image and connect the result.
///
/// This is the model-free core of the pipeline and is fully deterministic.
///
/// # Errors
///
/// Returns [`PoseError::InvalidTensorShape`] if the heatmap or image
/// dimensions are invalid.
pub fn estimate_pose(
    heatmap: &Heatmap,
    width: u32,
    height: u32,
    topology: &Topology,
) -> Result<(PoseResult, Vec<Edge>)> {
    let pose = heatmap.decode(width, height)?;
    let edges = topology.edges(&pose);
    Ok((pose, edges))
}

/// Single-person pose pipeline over any [`HeatmapModel`].
///
/// # Example
///
/// ```no_run
/// use pose_overlay::{OpenPoseModel, PosePipeline};
///
/// let model = OpenPoseModel::load("graph_opt.onnx")?;
/// let mut pipeline = PosePipeline::new(model);
/// let results = pipeline.predict("person.jpg")?;
/// println!("{}", results.summary());
/// # Ok::<(), pose_overlay::PoseError>(())
/// ```
#[derive(Debug)]
pub struct PosePipeline<M: HeatmapModel> {
    model: M,
    topology: Topology,
}

impl<M: HeatmapModel> PosePipeline<M> {
    /// Create a pipeline using the OpenPose COCO topology.
    #[must_use]
    pub fn new(model: M) -> Self {
        Self::with_topology(model, Topology::default())
    }

    /// Create a pipeline with a custom topology.
    #[must_use]
    pub const fn with_topology(model: M, topology: Topology) -> Self {
        Self { model, topology }
    }

    /// The topology used to connect keypoints.
    #[must_use]
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Mutable access to the underlying model.
    pub const fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Consume the pipeline and return the model.
    pub fn into_model(self) -> M {
        self.model
    }

    /// Load an image from disk and run the pipeline on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the image can't be loaded or any stage fails.
    pub fn predict<P: AsRef<Path>>(&mut self, path: P) -> Result<Results> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| {
            PoseError::ImageError(format!("Failed to load image {}: {e}", path.display()))
        })?;
        self.predict_image(&img, path.to_string_lossy().to_string())
    }

    /// Run the pipeline on an in-memory image.
    ///
    /// # Arguments
    ///
    /// * `image` - The image to run inference on.
    /// * `path` - Path or identifier carried into the results.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the heatmap has the wrong shape.
    pub fn predict_image(&mut self, image: &DynamicImage, path: String) -> Result<Results> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(PoseError::InvalidTensorShape(format!(
                "image must be non-empty, got {width}x{height}"
            )));
        }

        let (heatmap, mut speed) = self.model.heatmaps_timed(image)?;

        let start_postprocess = Instant::now();
        let (pose, edges) = estimate_pose(&heatmap, width, height, &self.topology)?;
        speed.postprocess = Some(start_postprocess.elapsed().as_secs_f64() * 1000.0);

        let (grid_w, grid_h) = heatmap.grid_size();
        Ok(Results {
            pose,
            edges,
            orig_shape: (height, width),
            grid_shape: (grid_h, grid_w),
            speed,
            path,
        })
    }

    /// Run the pipeline on an HWC u8 array.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::InvalidTensorShape`] if the array is not `H x W x 3`,
    /// or any error from [`predict_image`](Self::predict_image).
    pub fn predict_array(&mut self, image: &Array3<u8>, path: String) -> Result<Results> {
        let img = array_to_image(image)?;
        self.predict_image(&img, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body_parts::BodyPart;
    use crate::results::Keypoint;
    use image::RgbImage;

    /// Returns a fixed heatmap regardless of the input image.
    struct FixedModel {
        heatmap: Heatmap,
        calls: usize,
    }

    impl HeatmapModel for FixedModel {
        fn heatmaps(&mut self, _image: &DynamicImage) -> Result<Heatmap> {
            self.calls += 1;
            Ok(self.heatmap.clone())
        }
    }

    fn single_peak() -> Heatmap {
        let mut grid = Array3::<f32>::zeros((19, 46, 46));
        grid[[0, 23, 23]] = 0.9;
        Heatmap::new(grid).unwrap()
    }

    fn blank(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(w, h))
    }

    #[test]
    fn test_single_keypoint_end_to_end() {
        let model = FixedModel {
            heatmap: single_peak(),
            calls: 0,
        };
        let mut pipeline = PosePipeline::new(model);
        let results = pipeline
            .predict_image(&blank(368, 368), "synthetic".to_string())
            .unwrap();

        assert_eq!(
            results.pose[BodyPart::Nose],
            Keypoint::Present {
                x: 184,
                y: 184,
                confidence: 0.9
            }
        );
        assert_eq!(results.num_keypoints(), 1);
        assert!(results.edges.is_empty());
        assert_eq!(results.orig_shape, (368, 368));
        assert_eq!(results.grid_shape, (46, 46));
        assert_eq!(results.path, "synthetic");
        assert!(results.speed.inference.is_some());
        assert!(results.speed.postprocess.is_some());
        assert_eq!(pipeline.into_model().calls, 1);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let mut grid = Array3::<f32>::zeros((19, 46, 46));
        grid[[BodyPart::Neck.index(), 10, 20]] = 0.8;
        grid[[BodyPart::RShoulder.index(), 12, 15]] = 0.7;
        grid[[BodyPart::LShoulder.index(), 12, 25]] = 0.6;
        let model = FixedModel {
            heatmap: Heatmap::new(grid).unwrap(),
            calls: 0,
        };
        let mut pipeline = PosePipeline::new(model);
        let image = blank(640, 480);

        let first = pipeline.predict_image(&image, String::new()).unwrap();
        let second = pipeline.predict_image(&image, String::new()).unwrap();
        assert_eq!(first.pose, second.pose);
        assert_eq!(first.edges, second.edges);
        assert_eq!(first.num_edges(), 2);
    }

    #[test]
    fn test_estimate_pose_rescales() {
        let mut grid = Array3::<f32>::zeros((19, 46, 46));
        grid[[BodyPart::Neck.index(), 45, 45]] = 0.5;
        let heatmap = Heatmap::new(grid).unwrap();
        let (pose, edges) = estimate_pose(&heatmap, 100, 50, &Topology::default()).unwrap();
        assert_eq!(pose[BodyPart::Neck].position(), Some((97, 48)));
        assert!(edges.is_empty());
    }

    #[test]
    fn test_empty_image_rejected() {
        let model = FixedModel {
            heatmap: single_peak(),
            calls: 0,
        };
        let mut pipeline = PosePipeline::new(model);
        let err = pipeline
            .predict_image(&blank(0, 10), String::new())
            .unwrap_err();
        assert!(matches!(err, PoseError::InvalidTensorShape(_)));
        assert_eq!(pipeline.model_mut().calls, 0);
    }

    #[test]
    fn test_predict_array() {
        let model = FixedModel {
            heatmap: single_peak(),
            calls: 0,
        };
        let mut pipeline = PosePipeline::new(model);
        let arr = Array3::<u8>::zeros((368, 368, 3));
        let results = pipeline.predict_array(&arr, "array".to_string()).unwrap();
        assert_eq!(results.pose[0].position(), Some((184, 184)));

        let bad = Array3::<u8>::zeros((4, 4, 1));
        assert!(pipeline.predict_array(&bad, String::new()).is_err());
    }
}
