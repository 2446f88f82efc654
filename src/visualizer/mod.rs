// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Visualization tools for pose results.

/// Color definitions and palettes.
pub mod color;

/// Skeleton drawing.
pub mod renderer;

pub use color::Color;
pub use renderer::{RenderStyle, draw_skeleton_mut, render_skeleton, render_skeleton_array};
