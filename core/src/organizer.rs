//! Copies classified images into per-category folders.

use crate::category::{Category, Tally};
use crate::classifier::{ClassificationPipeline, ClassificationResult, Evidence};
use crate::diagnostics::Diagnostics;
use crate::scanner::{collect_images, ScanConfig, ThreadingMode};
use filetime::FileTime;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where one source image ended up.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub source: PathBuf,
    pub category: Category,
    /// `None` when the copy failed.
    pub destination: Option<PathBuf>,
    pub evidence: Evidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a complete organize run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizeOutcome {
    pub tally: Tally,
    pub files: Vec<FileRecord>,
}

impl OrganizeOutcome {
    /// Number of image files found in the source folder.
    pub fn enumerated(&self) -> usize {
        self.files.len()
    }
}

pub struct Organizer {
    output: PathBuf,
    config: ScanConfig,
    pipeline: ClassificationPipeline,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Organizer {
    /// Creates the output folder and every category folder beneath it.
    pub fn new(
        output: impl Into<PathBuf>,
        config: ScanConfig,
        pipeline: ClassificationPipeline,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, OrganizeError> {
        let output = output.into();
        for category in Category::ALL {
            let directory = output.join(category.as_str());
            fs::create_dir_all(&directory).map_err(|source| OrganizeError::CreateDirectory {
                source,
                path: directory.clone(),
            })?;
        }
        Ok(Self {
            output,
            config,
            pipeline,
            diagnostics,
        })
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.output.join(category.as_str())
    }

    /// Classifies and copies every image directly inside `source`.
    ///
    /// Only a missing source folder fails the run; per-file problems are
    /// reported and recorded in the outcome.
    pub fn run(
        &self,
        source: &Path,
        progress_bar: &ProgressBar,
    ) -> Result<OrganizeOutcome, OrganizeError> {
        if !source.is_dir() {
            let error = OrganizeError::MissingSource(source.to_path_buf());
            self.diagnostics.error(&error.to_string());
            return Err(error);
        }

        let images = collect_images(source, &self.config.extensions, self.diagnostics.as_ref());
        if images.is_empty() {
            self.diagnostics.warn("No image files found in source folder");
            return Ok(OrganizeOutcome::default());
        }

        self.diagnostics
            .info(&format!("Found {} image files to process", images.len()));
        progress_bar.set_length(images.len() as u64);

        let mut outcome = OrganizeOutcome::default();
        match self.config.threading {
            ThreadingMode::Sequential => {
                for path in &images {
                    let result = self.pipeline.classify(path);
                    self.place(path, result, &mut outcome, progress_bar);
                }
            }
            ThreadingMode::Parallel => {
                progress_bar.set_message("Classifying");
                let results: Vec<ClassificationResult> =
                    images.par_iter().map(|path| self.pipeline.classify(path)).collect();
                for (path, result) in images.iter().zip(results) {
                    self.place(path, result, &mut outcome, progress_bar);
                }
            }
        }
        Ok(outcome)
    }

    /// Copies one classified image; must run serially so collision names stay unique.
    fn place(
        &self,
        source: &Path,
        result: ClassificationResult,
        outcome: &mut OrganizeOutcome,
        progress_bar: &ProgressBar,
    ) {
        let ClassificationResult { category, evidence } = result;
        let directory = self.category_dir(category);
        let name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());

        let placed = resolve_destination(&directory, source).and_then(|destination| {
            copy_preserving(source, &destination, self.diagnostics.as_ref())?;
            Ok(destination)
        });

        let record = match placed {
            Ok(destination) => {
                outcome.tally.record(category);
                self.diagnostics
                    .info(&format!("{} -> Classified as: {}", name, category.as_str()));
                progress_bar.set_message(format!("Copied: {}", destination.display()));
                FileRecord {
                    source: source.to_path_buf(),
                    category,
                    destination: Some(destination),
                    evidence,
                    error: None,
                }
            }
            Err(error) => {
                outcome.tally.record_failure();
                self.diagnostics
                    .error(&format!("Error copying {}: {}", source.display(), error));
                FileRecord {
                    source: source.to_path_buf(),
                    category,
                    destination: None,
                    evidence,
                    error: Some(error.to_string()),
                }
            }
        };
        outcome.files.push(record);
        progress_bar.inc(1);
    }
}

/// First free name for `source` inside `directory`: `name.ext`, then
/// `name_1.ext`, `name_2.ext`, ...
pub fn resolve_destination(directory: &Path, source: &Path) -> Result<PathBuf, OrganizeError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| OrganizeError::MissingFileName(source.to_path_buf()))?;

    let candidate = directory.join(file_name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("file"));
    let extension = source.extension().map(|ext| ext.to_string_lossy());

    (1usize..)
        .map(|index| {
            let mut name = format!("{}_{}", stem, index);
            if let Some(ext) = &extension {
                name.push('.');
                name.push_str(ext);
            }
            directory.join(name)
        })
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| OrganizeError::MissingFileName(source.to_path_buf()))
}

/// Byte-for-byte copy that also keeps permissions and access/modification times.
///
/// Fails only when the bytes could not be copied. Once they are in place, a
/// timestamp failure is reported as a warning and the copy stands.
pub fn copy_preserving(
    source: &Path,
    destination: &Path,
    diagnostics: &dyn Diagnostics,
) -> Result<(), OrganizeError> {
    let metadata = fs::metadata(source).map_err(|error| OrganizeError::Io {
        source: error,
        path: source.to_path_buf(),
    })?;
    fs::copy(source, destination).map_err(|error| OrganizeError::Io {
        source: error,
        path: destination.to_path_buf(),
    })?;
    preserve_times(&metadata, destination, diagnostics);
    Ok(())
}

fn preserve_times(metadata: &fs::Metadata, destination: &Path, diagnostics: &dyn Diagnostics) {
    let result = filetime::set_file_times(
        destination,
        FileTime::from_last_access_time(metadata),
        FileTime::from_last_modification_time(metadata),
    );
    if let Err(error) = result {
        diagnostics.warn(&format!(
            "Could not preserve timestamps on {}: {}",
            destination.display(),
            error
        ));
    }
}

#[derive(Debug)]
pub enum OrganizeError {
    MissingSource(PathBuf),
    CreateDirectory {
        source: std::io::Error,
        path: PathBuf,
    },
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    MissingFileName(PathBuf),
}

impl Display for OrganizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSource(path) => {
                write!(f, "Source folder does not exist: {}", path.display())
            }
            Self::CreateDirectory { source, path } => {
                write!(f, "failed to create {}: {}", path.display(), source)
            }
            Self::Io { source, path } => {
                write!(f, "failed to copy to {}: {}", path.display(), source)
            }
            Self::MissingFileName(path) => write!(f, "file name not found for {}", path.display()),
        }
    }
}

impl Error for OrganizeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } | Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
