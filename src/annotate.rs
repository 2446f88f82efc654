// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use image::DynamicImage;

use crate::results::Results;
use crate::visualizer::{RenderStyle, render_skeleton};

/// Draw the skeleton from `result` over a copy of `image`.
///
/// Uses the default [`RenderStyle`] (green limbs, red joints) unless `style`
/// is given. The source image is converted to RGB and never modified.
#[must_use]
pub fn annotate_image(
    image: &DynamicImage,
    result: &Results,
    style: Option<&RenderStyle>,
) -> DynamicImage {
    let default_style = RenderStyle::default();
    let style = style.unwrap_or(&default_style);
    let canvas = image.to_rgb8();
    DynamicImage::ImageRgb8(render_skeleton(&canvas, &result.edges, style))
}
