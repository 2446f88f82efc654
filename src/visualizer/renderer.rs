// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Skeleton rendering.
//!
//! Rendering always works on a copy: the caller's buffer is borrowed
//! immutably and a new buffer is returned.

#![allow(clippy::cast_precision_loss)]

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use ndarray::Array3;

use super::color::Color;
use crate::error::{PoseError, Result};
use crate::skeleton::{Edge, POSE_PAIRS};

/// Line and marker appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    /// Limb color, unless `limb_palette` is set.
    pub line_color: Color,
    /// Limb width in pixels.
    pub line_width: u32,
    /// Endpoint marker color.
    pub marker_color: Color,
    /// Endpoint marker radius in pixels.
    pub marker_radius: i32,
    /// Color each default-topology limb from the OpenPose limb palette.
    pub limb_palette: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            line_color: Color::GREEN,
            line_width: 3,
            marker_color: Color::RED,
            marker_radius: 3,
            limb_palette: false,
        }
    }
}

impl RenderStyle {
    /// Create the default style (green 3px limbs, red 3px markers).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limb color.
    #[must_use]
    pub const fn with_line_color(mut self, color: Color) -> Self {
        self.line_color = color;
        self
    }

    /// Set the limb width. Widths below 1 are drawn as 1.
    #[must_use]
    pub const fn with_line_width(mut self, width: u32) -> Self {
        self.line_width = width;
        self
    }

    /// Set the marker color.
    #[must_use]
    pub const fn with_marker_color(mut self, color: Color) -> Self {
        self.marker_color = color;
        self
    }

    /// Set the marker radius.
    #[must_use]
    pub const fn with_marker_radius(mut self, radius: i32) -> Self {
        self.marker_radius = radius;
        self
    }

    /// Enable or disable per-limb palette colors.
    #[must_use]
    pub const fn with_limb_palette(mut self, enabled: bool) -> Self {
        self.limb_palette = enabled;
        self
    }

    fn limb_color(&self, edge: &Edge) -> Rgb<u8> {
        if self.limb_palette
            && let Some(i) = POSE_PAIRS
                .iter()
                .position(|&(from, to)| from == edge.from && to == edge.to)
        {
            return Color::from_limb_index(i).to_rgb();
        }
        self.line_color.to_rgb()
    }
}

/// Draw `edges` onto a copy of `image` and return the copy.
///
/// Each edge is a straight segment with a filled marker at both ends, drawn in
/// list order. Coordinates outside the image are clipped.
#[must_use]
pub fn render_skeleton(image: &RgbImage, edges: &[Edge], style: &RenderStyle) -> RgbImage {
    let mut canvas = image.clone();
    draw_skeleton_mut(&mut canvas, edges, style);
    canvas
}

/// Draw `edges` directly into `canvas`.
pub fn draw_skeleton_mut(canvas: &mut RgbImage, edges: &[Edge], style: &RenderStyle) {
    let marker = style.marker_color.to_rgb();
    for edge in edges {
        draw_thick_line_mut(canvas, edge.start, edge.end, style.line_width, style.limb_color(edge));
        for centre in [edge.start, edge.end] {
            if marker_touches_canvas(canvas, centre, style.marker_radius) {
                draw_filled_circle_mut(canvas, centre, style.marker_radius, marker);
            }
        }
    }
}

/// Render onto an HWC `u8` buffer with three channels.
///
/// # Errors
///
/// Returns [`PoseError::InvalidTensorShape`] if the buffer is not `H x W x 3`
/// or is too large to address as an image.
pub fn render_skeleton_array(
    image: &Array3<u8>,
    edges: &[Edge],
    style: &RenderStyle,
) -> Result<Array3<u8>> {
    let &[height, width, channels] = image.shape() else {
        return Err(PoseError::InvalidTensorShape(format!(
            "expected HxWx3 buffer, got {:?}",
            image.shape()
        )));
    };
    if channels != 3 {
        return Err(PoseError::InvalidTensorShape(format!(
            "expected 3 channels, got {channels}"
        )));
    }
    let w = u32::try_from(width)
        .map_err(|_| PoseError::InvalidTensorShape("buffer width exceeds u32::MAX".to_string()))?;
    let h = u32::try_from(height)
        .map_err(|_| PoseError::InvalidTensorShape("buffer height exceeds u32::MAX".to_string()))?;

    let pixels: Vec<u8> = image.iter().copied().collect();
    let mut canvas = RgbImage::from_raw(w, h, pixels).ok_or_else(|| {
        PoseError::InvalidTensorShape("buffer does not match its dimensions".to_string())
    })?;
    draw_skeleton_mut(&mut canvas, edges, style);

    Array3::from_shape_vec((height, width, 3), canvas.into_raw())
        .map_err(|e| PoseError::InvalidTensorShape(e.to_string()))
}

/// Draw a segment `width` pixels wide by stacking parallel 1px lines,
/// offset along the axis perpendicular to the dominant direction.
///
/// Each line is clipped to the canvas before rasterizing, so the cost is
/// bounded by the canvas size whatever the endpoints are.
#[allow(clippy::cast_possible_truncation)]
fn draw_thick_line_mut(
    canvas: &mut RgbImage,
    start: (i32, i32),
    end: (i32, i32),
    width: u32,
    color: Rgb<u8>,
) {
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let lo = (-1.0, -1.0);
    let hi = (f64::from(w), f64::from(h));

    let start = (f64::from(start.0), f64::from(start.1));
    let end = (f64::from(end.0), f64::from(end.1));
    let horizontal = (end.0 - start.0).abs() >= (end.1 - start.1).abs();

    let width = width.max(1);
    let first = -f64::from((width - 1) / 2);
    for i in 0..width {
        let offset = first + f64::from(i);
        let (dx, dy) = if horizontal { (0.0, offset) } else { (offset, 0.0) };
        let Some((a, b)) = clip_segment(
            (start.0 + dx, start.1 + dy),
            (end.0 + dx, end.1 + dy),
            lo,
            hi,
        ) else {
            continue;
        };
        draw_line_segment_mut(
            canvas,
            (a.0 as f32, a.1 as f32),
            (b.0 as f32, b.1 as f32),
            color,
        );
    }
}

/// Liang-Barsky clip of segment `a`-`b` to the box `lo..=hi`.
///
/// Returns `None` when the segment misses the box.
#[allow(clippy::float_cmp)]
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    lo: (f64, f64),
    hi: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for (p, q) in [
        (-dx, a.0 - lo.0),
        (dx, hi.0 - a.0),
        (-dy, a.1 - lo.1),
        (dy, hi.1 - a.1),
    ] {
        if p == 0.0 {
            // Parallel to this boundary and outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}

/// Whether a marker of `radius` centred at `centre` can reach any pixel.
fn marker_touches_canvas(canvas: &RgbImage, centre: (i32, i32), radius: i32) -> bool {
    let (w, h) = canvas.dimensions();
    let r = i64::from(radius.max(0));
    let (x, y) = (i64::from(centre.0), i64::from(centre.1));
    x >= -r && y >= -r && x < i64::from(w) + r && y < i64::from(h) + r
}
