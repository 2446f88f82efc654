// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Input image sources.
//!
//! Sources are still images only: a file, a directory, a simple glob, an
//! explicit list of paths, or an in-memory image.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ndarray::Array3;

use crate::error::{PoseError, Result};
use crate::preprocessing::array_to_image;

/// Image extensions accepted from directories and globs.
pub const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"];

/// Represents different input sources for pose estimation.
#[derive(Debug, Clone)]
pub enum Source {
    /// Path to an image file.
    Image(PathBuf),
    /// In-memory image.
    ImageBuffer(DynamicImage),
    /// Raw HWC u8 array.
    Array(Array3<u8>),
    /// List of image paths.
    ImageList(Vec<PathBuf>),
    /// Directory containing images.
    Directory(PathBuf),
    /// Glob pattern for images.
    Glob(String),
}

impl Source {
    /// Check if this source is a single image.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::Image(_) | Self::ImageBuffer(_) | Self::Array(_))
    }

    /// Check if this source is a directory, glob pattern or list.
    #[must_use]
    pub const fn is_batch(&self) -> bool {
        matches!(
            self,
            Self::Directory(_) | Self::Glob(_) | Self::ImageList(_)
        )
    }

    /// Get the path if this source has one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Image(p) | Self::Directory(p) => Some(p),
            _ => None,
        }
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if s.contains('*') {
            return Self::Glob(s.to_string());
        }

        let path = PathBuf::from(s);
        if path.is_dir() {
            return Self::Directory(path);
        }
        Self::Image(path)
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::from(path.to_string_lossy().as_ref())
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::from(path.to_string_lossy().as_ref())
    }
}

impl From<Vec<PathBuf>> for Source {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self::ImageList(paths)
    }
}

impl From<DynamicImage> for Source {
    fn from(img: DynamicImage) -> Self {
        Self::ImageBuffer(img)
    }
}

impl From<Array3<u8>> for Source {
    fn from(arr: Array3<u8>) -> Self {
        Self::Array(arr)
    }
}

/// Metadata about a loaded image.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// Position of the image within its source.
    pub index: usize,
    /// Number of images in the source.
    pub total: usize,
    /// Source path or identifier.
    pub path: String,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            index: 0,
            total: 1,
            path: String::new(),
        }
    }
}

/// Iterator over images from a source.
///
/// Each item is loaded lazily, so one unreadable file yields an `Err` item
/// without ending the iteration.
#[derive(Debug)]
pub struct SourceIterator {
    source: Source,
    current: usize,
    image_paths: Vec<PathBuf>,
}

impl SourceIterator {
    /// Create a new source iterator.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or glob base can't be read.
    pub fn new(source: Source) -> Result<Self> {
        let image_paths = match &source {
            Source::Directory(path) => collect_images_from_dir(path)?,
            Source::Glob(pattern) => collect_images_from_glob(pattern)?,
            Source::Image(path) => vec![path.clone()],
            Source::ImageList(paths) => paths.clone(),
            Source::ImageBuffer(_) | Source::Array(_) => vec![],
        };

        Ok(Self {
            source,
            current: 0,
            image_paths,
        })
    }

    /// Number of images this iterator will yield.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.source {
            Source::ImageBuffer(_) | Source::Array(_) => 1,
            _ => self.image_paths.len(),
        }
    }

    /// Whether the source contains no images.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_image(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        let path = self.image_paths.get(self.current)?;
        let meta = SourceMeta {
            index: self.current,
            total: self.image_paths.len(),
            path: path.to_string_lossy().to_string(),
        };
        self.current += 1;

        Some(
            image::open(path)
                .map(|img| (img, meta))
                .map_err(|e| {
                    PoseError::ImageError(format!("Failed to load {}: {e}", path.display()))
                }),
        )
    }
}

impl Iterator for SourceIterator {
    type Item = Result<(DynamicImage, SourceMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        match &self.source {
            Source::Image(_) | Source::Directory(_) | Source::Glob(_) | Source::ImageList(_) => {
                self.next_image()
            }
            Source::ImageBuffer(img) => {
                if self.current > 0 {
                    return None;
                }
                self.current = 1;
                Some(Ok((img.clone(), SourceMeta::default())))
            }
            Source::Array(arr) => {
                if self.current > 0 {
                    return None;
                }
                self.current = 1;
                Some(array_to_image(arr).map(|img| (img, SourceMeta::default())))
            }
        }
    }
}

/// Check if a path is an image file based on extension.
fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        IMAGE_EXTENSIONS.contains(&ext.as_str())
    })
}

fn collect_images_from_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    list_images(dir, |_| true)
}

/// Collect image paths from a glob pattern.
///
/// Only a single `*` in the file name is supported, as in `"dir/*.jpg"` or
/// `"dir/frame_*.png"`. Matching ignores case.
fn collect_images_from_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(pattern);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let Some((prefix, suffix)) = name.split_once('*') else {
        return Ok(vec![PathBuf::from(pattern)]);
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    list_images(dir, |file_name| {
        file_name.len() >= prefix.len() + suffix.len()
            && file_name.starts_with(prefix)
            && file_name.ends_with(suffix)
    })
}

/// Sorted image files directly under `dir` whose lowercased name passes `accept`.
fn list_images(dir: &Path, accept: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PoseError::ImageError(format!(
            "Directory not found: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            is_image_file(path)
                && path
                    .file_name()
                    .is_some_and(|n| accept(&n.to_string_lossy().to_lowercase()))
        })
        .collect();

    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pose_overlay_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path) {
        RgbImage::from_pixel(4, 3, Rgb([10, 20, 30])).save(path).unwrap();
    }

    #[test]
    fn test_source_from_string() {
        assert!(matches!(Source::from("image.jpg"), Source::Image(_)));
        assert!(matches!(Source::from("*.jpg"), Source::Glob(_)));
        assert!(matches!(
            Source::from(std::env::temp_dir()),
            Source::Directory(_)
        ));
    }

    #[test]
    fn test_source_checks() {
        let img = Source::Image(PathBuf::from("test.jpg"));
        assert!(img.is_image());
        assert!(!img.is_batch());
        assert_eq!(img.path(), Some(Path::new("test.jpg")));

        let dir = Source::Directory(PathBuf::from("./images"));
        assert!(dir.is_batch());
        assert!(Source::from(vec![PathBuf::from("a.png")]).is_batch());
    }

    #[test]
    fn test_directory_is_sorted_and_filtered() {
        let dir = temp_dir("dir");
        write_png(&dir.join("b.png"));
        write_png(&dir.join("a.png"));
        std::fs::write(dir.join("notes.txt"), "skip").unwrap();

        let iter = SourceIterator::new(Source::Directory(dir.clone())).unwrap();
        assert_eq!(iter.len(), 2);
        let items: Vec<_> = iter.map(|item| item.unwrap().1).collect();
        assert!(items[0].path.ends_with("a.png"));
        assert!(items[1].path.ends_with("b.png"));
        assert_eq!((items[1].index, items[1].total), (1, 2));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_glob_extension_filter() {
        let dir = temp_dir("glob");
        write_png(&dir.join("x.png"));
        write_png(&dir.join("y.bmp"));

        let pattern = format!("{}/*.png", dir.display());
        let iter = SourceIterator::new(Source::from(pattern.as_str())).unwrap();
        assert_eq!(iter.len(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_glob_name_prefix() {
        let dir = temp_dir("glob_prefix");
        write_png(&dir.join("a1.png"));
        write_png(&dir.join("A2.PNG"));
        write_png(&dir.join("b1.png"));
        std::fs::write(dir.join("a3.txt"), "skip").unwrap();

        let iter = SourceIterator::new(Source::Glob(format!("{}/a*", dir.display()))).unwrap();
        let names: Vec<_> = iter.map(|item| item.unwrap().1.path).collect();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("A2.PNG"));
        assert!(names[1].ends_with("a1.png"));

        let iter = SourceIterator::new(Source::Glob(format!("{}/a*.png", dir.display()))).unwrap();
        assert_eq!(iter.len(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unreadable_image_does_not_stop_iteration() {
        let dir = temp_dir("list");
        write_png(&dir.join("ok.png"));
        let list = vec![dir.join("missing.png"), dir.join("ok.png")];

        let items: Vec<_> = SourceIterator::new(Source::ImageList(list))
            .unwrap()
            .collect();
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], Err(PoseError::ImageError(_))));
        assert!(items[1].is_ok());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_in_memory_sources_yield_once() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert_eq!(SourceIterator::new(img.into()).unwrap().count(), 1);

        let arr = Array3::<u8>::zeros((2, 2, 3));
        let mut iter = SourceIterator::new(arr.into()).unwrap();
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_missing_directory_glob_errors() {
        assert!(SourceIterator::new(Source::Glob("/definitely/not/here/*.jpg".into())).is_err());
    }
}
