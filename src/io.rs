// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Saving annotated images to a run directory.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{PoseError, Result};
use crate::source::SourceMeta;

/// Writes annotated images into one run directory.
#[derive(Debug, Clone)]
pub struct SaveResults {
    save_dir: PathBuf,
    saved: usize,
}

impl SaveResults {
    /// Create a saver writing into `save_dir`. The directory is created on first save.
    #[must_use]
    pub const fn new(save_dir: PathBuf) -> Self {
        Self { save_dir, saved: 0 }
    }

    /// Directory results are written to.
    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Number of images written so far.
    #[must_use]
    pub const fn saved(&self) -> usize {
        self.saved
    }

    /// Save an annotated image under the source file name.
    ///
    /// In-memory sources without a path are saved as `image{index}.jpg`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory can't be created or encoding fails.
    pub fn save(&mut self, meta: &SourceMeta, annotated: &DynamicImage) -> Result<PathBuf> {
        let filename = Path::new(&meta.path)
            .file_name()
            .map_or_else(
                || format!("image{}.jpg", meta.index),
                |name| name.to_string_lossy().to_string(),
            );
        let save_path = self.save_dir.join(filename);

        if !self.save_dir.exists() {
            std::fs::create_dir_all(&self.save_dir)?;
        }

        annotated.save(&save_path).map_err(|e| {
            PoseError::ImageError(format!("Failed to save {}: {e}", save_path.display()))
        })?;
        self.saved += 1;
        Ok(save_path)
    }
}

/// Find the next available run directory (`predict`, `predict2`, `predict3`, ...).
#[must_use]
pub fn find_next_run_dir<P: AsRef<Path>>(base: P, prefix: &str) -> PathBuf {
    let base = base.as_ref();
    let first = base.join(prefix);
    if !first.exists() {
        return first;
    }

    (2..)
        .map(|i| base.join(format!("{prefix}{i}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}
