//! Per-video output directories.
//!
//! Every video gets `<output_root>/<video_stem>/`, holding frames named
//! `1.jpg`, `2.jpg`, … in extraction order. Creating the directory is
//! idempotent and this crate never deletes it. Only numbered frames are
//! ever removed, and only under [`ExistingOutputPolicy::PruneStale`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{configuration::ExistingOutputPolicy, error::ExtractionError};

/// The output directory for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirectory {
    path: PathBuf,
    created: bool,
}

impl OutputDirectory {
    /// Where the frames of `video_path` go under `output_root`.
    ///
    /// The sub-directory is named after the video's file name without its
    /// extension.
    pub fn resolve(output_root: &Path, video_path: &Path) -> PathBuf {
        let stem = video_path
            .file_stem()
            .map(|stem| stem.to_os_string())
            .unwrap_or_else(|| "video".into());
        output_root.join(stem)
    }

    /// Resolve and create the directory for `video_path`, applying `policy`
    /// to a directory left over from an earlier run.
    ///
    /// # Errors
    ///
    /// - [`ExtractionError::CreateDirectory`] if the directory cannot be
    ///   created.
    /// - [`ExtractionError::OutputNotEmpty`] if it already has content and
    ///   `policy` is [`ExistingOutputPolicy::FailIfNotEmpty`].
    pub fn prepare(
        output_root: &Path,
        video_path: &Path,
        policy: ExistingOutputPolicy,
    ) -> Result<Self, ExtractionError> {
        let path = Self::resolve(output_root, video_path);

        if path.is_dir() {
            if policy == ExistingOutputPolicy::FailIfNotEmpty && !is_empty_dir(&path)? {
                return Err(ExtractionError::OutputNotEmpty { path });
            }
            return Ok(Self {
                path,
                created: false,
            });
        }

        fs::create_dir_all(&path).map_err(|source| ExtractionError::CreateDirectory {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            created: true,
        })
    }

    /// The directory itself.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this run created the directory (as opposed to reusing it).
    pub fn was_created(&self) -> bool {
        self.created
    }

    /// Path of the `index`-th saved frame (1-based).
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.path.join(format!("{index}.jpg"))
    }

    /// Delete numbered frames above `saved_count`, left by an earlier run that
    /// produced more frames. Returns how many files were removed.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Io`] if the directory cannot be listed or a
    /// stale frame cannot be removed.
    pub fn prune_stale(&self, saved_count: u64) -> Result<u64, ExtractionError> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let path = entry.path();
            let stale = frame_index(&path).is_some_and(|index| index > saved_count);
            if stale && entry.file_type()?.is_file() {
                fs::remove_file(&path)?;
                log::debug!("Removed stale frame {}", path.display());
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// The index `n` of a file named exactly `<n>.jpg`.
fn frame_index(path: &Path) -> Option<u64> {
    if path.extension()? != "jpg" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || !stem.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

fn is_empty_dir(path: &Path) -> Result<bool, ExtractionError> {
    Ok(fs::read_dir(path)?.next().is_none())
}
