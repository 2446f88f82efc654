// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use image::Rgb;

/// Color type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Red color.
    pub const RED: Color = Color(255, 0, 0);
    /// Green color.
    pub const GREEN: Color = Color(0, 255, 0);
    /// Blue color.
    pub const BLUE: Color = Color(0, 0, 255);
    /// White color.
    pub const WHITE: Color = Color(255, 255, 255);
    /// Black color.
    pub const BLACK: Color = Color(0, 0, 0);

    /// Create a new color from RGB values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Get a color from the limb palette by index.
    #[must_use]
    pub const fn from_limb_index(index: usize) -> Self {
        let color = LIMB_COLORS[index % LIMB_COLORS.len()];
        Self(color[0], color[1], color[2])
    }

    /// Pixel value for an RGB image buffer.
    #[must_use]
    pub const fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.0, self.1, self.2])
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        color.to_rgb()
    }
}

/// OpenPose limb palette, one entry per default topology pair.
pub const LIMB_COLORS: [[u8; 3]; 17] = [
    [255, 0, 0],   // #ff0000
    [255, 85, 0],  // #ff5500
    [255, 170, 0], // #ffaa00
    [255, 255, 0], // #ffff00
    [170, 255, 0], // #aaff00
    [85, 255, 0],  // #55ff00
    [0, 255, 0],   // #00ff00
    [0, 255, 85],  // #00ff55
    [0, 255, 170], // #00ffaa
    [0, 255, 255], // #00ffff
    [0, 170, 255], // #00aaff
    [0, 85, 255],  // #0055ff
    [0, 0, 255],   // #0000ff
    [85, 0, 255],  // #5500ff
    [170, 0, 255], // #aa00ff
    [255, 0, 255], // #ff00ff
    [255, 0, 170], // #ff00aa
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rgb() {
        assert_eq!(Color::GREEN.to_rgb(), Rgb([0, 255, 0]));
        assert_eq!(Rgb::from(Color::new(1, 2, 3)), Rgb([1, 2, 3]));
    }

    #[test]
    fn test_limb_palette_wraps() {
        assert_eq!(Color::from_limb_index(0), Color::RED);
        assert_eq!(Color::from_limb_index(17), Color::RED);
        assert_eq!(Color::from_limb_index(12), Color::BLUE);
    }
}
