use crate::diagnostics::Diagnostics;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions picked up by default, matched case-insensitively.
pub const DEFAULT_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadingMode {
    Parallel,
    Sequential,
}

/// Parameters that control which files are organized and how.
#[derive(Clone, Debug)]
pub struct ScanConfig {
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
    pub threading: ThreadingMode,
}

impl ScanConfig {
    /// Builds a new configuration from the supplied extensions and threading mode.
    pub fn new(extensions: Vec<String>, threading: ThreadingMode) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            threading,
        }
    }

    pub fn with_threading(mut self, threading: ThreadingMode) -> Self {
        self.threading = threading;
        self
    }

    pub fn with_extensions(self, extensions: Vec<String>) -> Self {
        Self::new(extensions, self.threading)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(default_extensions(), ThreadingMode::Parallel)
    }
}

pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

/// Lists the image files directly inside `root`, sorted by path.
///
/// Subdirectories are not descended into. Entries that resolve to the same
/// canonical file (hard links aside) are listed once.
pub fn collect_images(
    root: &Path,
    extensions: &[String],
    diagnostics: &dyn Diagnostics,
) -> Vec<PathBuf> {
    let mut seen = FxHashSet::default();
    let mut images = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                diagnostics.error(&format!("Error reading {}: {}", root.display(), error));
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || !has_image_extension(path, extensions) {
            continue;
        }
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if seen.insert(canonical) {
            images.push(path.to_path_buf());
        }
    }

    images.sort();
    images
}

fn has_image_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_lowercase();
            extensions.iter().any(|candidate| candidate == &lower)
        })
        .unwrap_or(false)
}
