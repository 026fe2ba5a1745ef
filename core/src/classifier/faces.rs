//! Frontal face localisation.

use super::config::FaceConfig;
use super::features::{self, BoundingBox, ClassifierError};
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Pluggable face detection backend.
pub trait FaceDetector: Send + Sync {
    /// Returns every face candidate in `image`; order is irrelevant.
    fn detect(&self, image: &Mat) -> Result<Vec<BoundingBox>, ClassifierError>;
}

/// Haar cascade detector over the grayscale image.
pub struct CascadeFaceDetector {
    cascade: Mutex<CascadeClassifier>,
    source: PathBuf,
    config: FaceConfig,
}

impl CascadeFaceDetector {
    /// Loads the first usable cascade from [`FaceConfig::cascade_candidates`].
    pub fn from_config(config: &FaceConfig) -> Result<Self, ClassifierError> {
        let candidates = config.cascade_candidates();
        for candidate in &candidates {
            if let Ok(detector) = Self::load(candidate, config.clone()) {
                return Ok(detector);
            }
        }
        Err(ClassifierError::CascadeUnavailable(candidates))
    }

    pub fn load(path: &Path, config: FaceConfig) -> Result<Self, ClassifierError> {
        if !path.is_file() {
            return Err(ClassifierError::CascadeUnavailable(vec![path.to_path_buf()]));
        }
        let path_string = path
            .to_str()
            .ok_or_else(|| ClassifierError::InvalidPath(path.to_path_buf()))?;
        let cascade = CascadeClassifier::new(path_string)?;
        if cascade.empty()? {
            return Err(ClassifierError::CascadeUnavailable(vec![path.to_path_buf()]));
        }
        Ok(Self {
            cascade: Mutex::new(cascade),
            source: path.to_path_buf(),
            config,
        })
    }

    /// Cascade file this detector was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&self, image: &Mat) -> Result<Vec<BoundingBox>, ClassifierError> {
        features::ensure_not_empty(image)?;
        let grayscale = features::to_grayscale(image)?;
        let min_size = Size::new(self.config.min_face_size, self.config.min_face_size);
        let mut faces = Vector::<Rect>::new();

        let mut cascade = self.cascade.lock().map_err(|_| ClassifierError::Poisoned)?;
        cascade.detect_multi_scale(
            &grayscale,
            &mut faces,
            self.config.scale_factor,
            self.config.min_neighbors,
            0,
            min_size,
            Size::default(),
        )?;

        Ok(faces.iter().map(BoundingBox::from).collect())
    }
}

/// Stand-in used when no cascade could be loaded; never finds a face.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledFaceDetector;

impl FaceDetector for DisabledFaceDetector {
    fn detect(&self, _image: &Mat) -> Result<Vec<BoundingBox>, ClassifierError> {
        Ok(Vec::new())
    }
}
