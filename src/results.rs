// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Results types for pose estimation output.
//!
//! A [`PoseResult`] always holds exactly one [`Keypoint`] per catalog entry,
//! so indexing it by [`BodyPart`] can never go out of bounds.

use std::ops::Index;

use crate::body_parts::BodyPart;
use crate::skeleton::Edge;

/// Timing information for inference operations (in milliseconds).
#[derive(Debug, Clone, Default)]
pub struct Speed {
    /// Time spent on preprocessing.
    pub preprocess: Option<f64>,
    /// Time spent on model inference.
    pub inference: Option<f64>,
    /// Time spent decoding heatmaps and assembling the skeleton.
    pub postprocess: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance with all timings.
    #[must_use]
    pub const fn new(preprocess: f64, inference: f64, postprocess: f64) -> Self {
        Self {
            preprocess: Some(preprocess),
            inference: Some(inference),
            postprocess: Some(postprocess),
        }
    }

    /// Get total time across all stages.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.preprocess.unwrap_or(0.0)
            + self.inference.unwrap_or(0.0)
            + self.postprocess.unwrap_or(0.0)
    }
}

/// A decoded landmark.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Keypoint {
    /// Peak above the confidence threshold, in original image pixels.
    Present {
        /// Column in pixels.
        x: i32,
        /// Row in pixels.
        y: i32,
        /// Peak confidence in `[0, 1]`.
        confidence: f32,
    },
    /// No confident peak for this part.
    #[default]
    Absent,
}

impl Keypoint {
    /// Whether the keypoint was detected.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    /// Pixel position, if detected.
    #[must_use]
    pub const fn position(&self) -> Option<(i32, i32)> {
        match *self {
            Self::Present { x, y, .. } => Some((x, y)),
            Self::Absent => None,
        }
    }

    /// Confidence, if detected.
    #[must_use]
    pub const fn confidence(&self) -> Option<f32> {
        match *self {
            Self::Present { confidence, .. } => Some(confidence),
            Self::Absent => None,
        }
    }
}

/// One keypoint per body part, indexed by catalog position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseResult {
    points: [Keypoint; BodyPart::COUNT],
}

impl PoseResult {
    /// Wrap a full set of keypoints in catalog order.
    #[must_use]
    pub const fn new(points: [Keypoint; BodyPart::COUNT]) -> Self {
        Self { points }
    }

    /// A result with every keypoint absent.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Keypoint for a body part.
    #[must_use]
    pub const fn get(&self, part: BodyPart) -> &Keypoint {
        &self.points[part.index()]
    }

    /// Replace the keypoint for a body part.
    pub const fn set(&mut self, part: BodyPart, keypoint: Keypoint) {
        self.points[part.index()] = keypoint;
    }

    /// All keypoints in catalog order.
    #[must_use]
    pub const fn points(&self) -> &[Keypoint; BodyPart::COUNT] {
        &self.points
    }

    /// Number of entries, always [`BodyPart::COUNT`].
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Number of detected keypoints.
    #[must_use]
    pub fn num_present(&self) -> usize {
        self.points.iter().filter(|k| k.is_present()).count()
    }

    /// Iterate `(part, keypoint)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyPart, &Keypoint)> {
        BodyPart::ALL.into_iter().zip(self.points.iter())
    }
}

impl Index<BodyPart> for PoseResult {
    type Output = Keypoint;

    fn index(&self, part: BodyPart) -> &Self::Output {
        self.get(part)
    }
}

impl Index<usize> for PoseResult {
    type Output = Keypoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

/// Output of one pipeline pass over a single image.
#[derive(Debug, Clone)]
pub struct Results {
    /// Decoded keypoints.
    pub pose: PoseResult,
    /// Skeleton edges in rendering order.
    pub edges: Vec<Edge>,
    /// Original image shape (height, width).
    pub orig_shape: (u32, u32),
    /// Heatmap grid shape (height, width).
    pub grid_shape: (usize, usize),
    /// Inference timing information.
    pub speed: Speed,
    /// Path to the source image.
    pub path: String,
}

impl Results {
    /// Number of detected keypoints.
    #[must_use]
    pub fn num_keypoints(&self) -> usize {
        self.pose.num_present()
    }

    /// Number of drawable limbs.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Human readable summary such as `"14 keypoints, 11 limbs"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let keypoints = self.num_keypoints();
        let limbs = self.num_edges();
        if keypoints == 0 {
            return "(no pose)".to_string();
        }
        format!(
            "{keypoints} {}, {limbs} {}",
            if keypoints == 1 { "keypoint" } else { "keypoints" },
            if limbs == 1 { "limb" } else { "limbs" }
        )
    }
}
