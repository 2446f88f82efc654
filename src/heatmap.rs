// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Heatmap decoding.
//!
//! Turns a `[19, H, W]` confidence tensor into a [`PoseResult`] by taking the
//! single strongest cell of every channel and rescaling its grid position into
//! original image pixels.

use ndarray::{Array3, ArrayView2, ArrayView3, Axis, s};

use crate::body_parts::BodyPart;
use crate::error::{PoseError, Result};
use crate::results::{Keypoint, PoseResult};

/// A keypoint is present only when its peak is strictly above this value.
pub const CONFIDENCE_THRESHOLD: f32 = 0.2;

/// Validated per-part confidence maps with shape `[19, H, W]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    data: Array3<f32>,
}

impl Heatmap {
    /// Wrap a `[channels, height, width]` array.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::InvalidTensorShape`] if the channel count is not
    /// [`BodyPart::COUNT`] or either grid dimension is zero.
    pub fn new(data: Array3<f32>) -> Result<Self> {
        validate_shape(data.shape())?;
        Ok(Self { data })
    }

    /// Build a heatmap from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::InvalidTensorShape`] if the buffer length does not
    /// match the shape or the shape itself is invalid.
    pub fn from_shape_vec(shape: (usize, usize, usize), data: Vec<f32>) -> Result<Self> {
        let data = Array3::from_shape_vec(shape, data)
            .map_err(|e| PoseError::InvalidTensorShape(format!("{shape:?}: {e}")))?;
        Self::new(data)
    }

    /// Extract the part heatmaps from a raw network output.
    ///
    /// OpenPose graphs emit `[N, C, H, W]` with `C >= 19`: the part heatmaps
    /// come first, followed by part affinity fields. Only batch 0 and the
    /// first 19 channels are kept.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::InvalidTensorShape`] if the output is not 4-D,
    /// has an empty batch, has fewer than 19 channels, or does not match
    /// `data.len()`.
    pub fn from_network_output(data: &[f32], shape: &[usize]) -> Result<Self> {
        let &[batch, channels, height, width] = shape else {
            return Err(PoseError::InvalidTensorShape(format!(
                "expected 4-D network output [N, C, H, W], got {shape:?}"
            )));
        };
        if batch == 0 {
            return Err(PoseError::InvalidTensorShape(
                "network output has an empty batch".to_string(),
            ));
        }
        if channels < BodyPart::COUNT {
            return Err(PoseError::InvalidTensorShape(format!(
                "network output has {channels} channels, need at least {}",
                BodyPart::COUNT
            )));
        }

        let view = ndarray::ArrayView4::from_shape((batch, channels, height, width), data)
            .map_err(|e| PoseError::InvalidTensorShape(format!("{shape:?}: {e}")))?;
        let parts = view
            .index_axis(Axis(0), 0)
            .slice(s![..BodyPart::COUNT, .., ..])
            .to_owned();

        Self::new(parts)
    }

    /// Grid size as `(width, height)`.
    #[must_use]
    pub fn grid_size(&self) -> (usize, usize) {
        let shape = self.data.shape();
        (shape[2], shape[1])
    }

    /// Confidence plane for one body part.
    #[must_use]
    pub fn channel(&self, part: BodyPart) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), part.index())
    }

    /// Borrow the underlying `[19, H, W]` array.
    #[must_use]
    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// Decode against an image of `image_width` x `image_height` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::InvalidTensorShape`] if either image dimension is zero.
    pub fn decode(&self, image_width: u32, image_height: u32) -> Result<PoseResult> {
        decode_heatmap(self.data.view(), image_width, image_height)
    }
}

fn validate_shape(shape: &[usize]) -> Result<()> {
    let &[channels, height, width] = shape else {
        return Err(PoseError::InvalidTensorShape(format!(
            "expected [channels, height, width], got {shape:?}"
        )));
    };
    if channels != BodyPart::COUNT {
        return Err(PoseError::InvalidTensorShape(format!(
            "expected {} channels, got {channels}",
            BodyPart::COUNT
        )));
    }
    if height == 0 || width == 0 {
        return Err(PoseError::InvalidTensorShape(format!(
            "heatmap grid must be non-empty, got {height}x{width}"
        )));
    }
    Ok(())
}

/// Strongest cell of a confidence plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Grid column.
    pub x: usize,
    /// Grid row.
    pub y: usize,
    /// Value at the peak; NaN only when the whole plane is NaN.
    pub value: f32,
}

/// Find the maximum of a non-empty plane.
///
/// The scan is row-major and only a strictly greater value replaces the
/// current best, so ties resolve to the first cell encountered. NaN cells
/// never win unless every cell is NaN, in which case the first cell is returned.
#[must_use]
pub fn find_peak(plane: ArrayView2<'_, f32>) -> Peak {
    let mut best = Peak {
        x: 0,
        y: 0,
        value: f32::NAN,
    };
    for ((y, x), &value) in plane.indexed_iter() {
        if value.is_nan() {
            continue;
        }
        if best.value.is_nan() || value > best.value {
            best = Peak { x, y, value };
        }
    }
    best
}

/// Rescale a grid coordinate to pixel space, truncating toward zero.
///
/// `grid < grid_len`, so the result is below `image_len`, which the caller
/// has bounded by `i32::MAX`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn rescale(grid: usize, grid_len: usize, image_len: u32) -> i32 {
    ((image_len as u64 * grid as u64) / grid_len as u64) as i32
}

/// Decode a `[19, H, W]` heatmap into one keypoint per body part.
///
/// # Errors
///
/// Returns [`PoseError::InvalidTensorShape`] if the heatmap does not have
/// exactly 19 channels or has an empty grid. Image dimensions must lie in
/// `1..=i32::MAX`.
pub fn decode_heatmap(
    heatmap: ArrayView3<'_, f32>,
    image_width: u32,
    image_height: u32,
) -> Result<PoseResult> {
    validate_shape(heatmap.shape())?;
    if image_width == 0 || image_height == 0 {
        return Err(PoseError::InvalidTensorShape(format!(
            "image must be non-empty, got {image_width}x{image_height}"
        )));
    }
    if i32::try_from(image_width).is_err() || i32::try_from(image_height).is_err() {
        return Err(PoseError::InvalidTensorShape(format!(
            "image {image_width}x{image_height} exceeds the i32 pixel range"
        )));
    }

    let (grid_h, grid_w) = (heatmap.shape()[1], heatmap.shape()[2]);
    let mut pose = PoseResult::empty();

    for part in BodyPart::ALL {
        let peak = find_peak(heatmap.index_axis(Axis(0), part.index()));
        // NaN fails this comparison, so an all-NaN plane is Absent
        if peak.value > CONFIDENCE_THRESHOLD {
            pose.set(
                part,
                Keypoint::Present {
                    x: rescale(peak.x, grid_w, image_width),
                    y: rescale(peak.y, grid_h, image_height),
                    confidence: peak.value.min(1.0),
                },
            );
        }
    }

    Ok(pose)
}
