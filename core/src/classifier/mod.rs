//! Heuristic image classification.
//!
//! The pipeline runs its detectors in a fixed priority order and stops at the
//! first match:
//!
//! 1. undecodable image → [`Category::Unknown`]
//! 2. document layout → [`Category::Documents`]
//! 3. exactly one large, high face → [`Category::Selfies`]
//! 4. any face → [`Category::People`]
//! 5. green/blue colour mass → [`Category::Nature`]
//! 6. otherwise → [`Category::Unknown`]
//!
//! Each detector isolates its own failures: an OpenCV error inside one
//! detector is reported through the [`Diagnostics`] sink and treated as a
//! negative result, so the pipeline always yields a category.

mod config;
mod document;
mod faces;
mod features;
mod nature;
mod selfie;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::{
    default_config_path, ClassifierConfig, ConfigError, DocumentConfig, FaceConfig, NatureConfig,
    SelfieConfig, CASCADE_ENV_VAR, DEFAULT_CONFIG_FILE,
};
pub use document::{DocumentDetector, DocumentEvidence};
pub use faces::{CascadeFaceDetector, DisabledFaceDetector, FaceDetector};
pub use features::{load_image, BoundingBox, ClassifierError};
pub use nature::{ColorEvidence, NatureDetector};
pub use selfie::SelfieClassifier;

use crate::category::Category;
use crate::diagnostics::Diagnostics;
use opencv::core::Mat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// What the detectors that ran observed. Detectors skipped by an earlier
/// match, or that failed, leave their field empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<(i32, i32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentEvidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faces: Option<Vec<BoundingBox>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorEvidence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub evidence: Evidence,
}

impl ClassificationResult {
    fn new(category: Category, evidence: Evidence) -> Self {
        Self { category, evidence }
    }
}

/// Ordered detector chain producing exactly one [`Category`] per image.
pub struct ClassificationPipeline {
    documents: DocumentDetector,
    faces: Box<dyn FaceDetector>,
    selfies: SelfieClassifier,
    nature: NatureDetector,
    diagnostics: Arc<dyn Diagnostics>,
}

impl ClassificationPipeline {
    /// Builds the pipeline, loading the Haar cascade named by `config`.
    ///
    /// A missing cascade is not fatal: it is reported once and face-based
    /// categories are simply never produced.
    pub fn from_config(config: &ClassifierConfig, diagnostics: Arc<dyn Diagnostics>) -> Self {
        let faces: Box<dyn FaceDetector> = match CascadeFaceDetector::from_config(&config.faces) {
            Ok(detector) => {
                diagnostics.info(&format!(
                    "Loaded face cascade from {}",
                    detector.source().display()
                ));
                Box::new(detector)
            }
            Err(error) => {
                diagnostics.warn(&format!("Face detection disabled: {}", error));
                Box::new(DisabledFaceDetector)
            }
        };
        Self::with_face_detector(config, faces, diagnostics)
    }

    pub fn with_face_detector(
        config: &ClassifierConfig,
        faces: Box<dyn FaceDetector>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            documents: DocumentDetector::new(config.document.clone()),
            faces,
            selfies: SelfieClassifier::new(config.selfie.clone()),
            nature: NatureDetector::new(config.nature.clone()),
            diagnostics,
        }
    }

    /// Loads and classifies the image at `path`. Never fails.
    pub fn classify(&self, path: &Path) -> ClassificationResult {
        match features::load_image(path) {
            Ok(image) => self.classify_image(&image),
            Err(error) => {
                self.diagnostics
                    .warn(&format!("Could not load image {}: {}", path.display(), error));
                ClassificationResult::new(Category::Unknown, Evidence::default())
            }
        }
    }

    pub fn classify_image(&self, image: &Mat) -> ClassificationResult {
        let diagnostics = self.diagnostics.as_ref();
        let (width, height) = features::dimensions(image);
        let mut evidence = Evidence {
            dimensions: Some((width, height)),
            ..Evidence::default()
        };

        evidence.document = self.documents.inspect(image, diagnostics);
        let accepted = evidence
            .document
            .as_ref()
            .is_some_and(|document| self.documents.accepts(document));
        if accepted {
            return ClassificationResult::new(Category::Documents, evidence);
        }

        let faces = match self.faces.detect(image) {
            Ok(faces) => faces,
            Err(error) => {
                diagnostics.error(&format!("Error in face detection: {}", error));
                Vec::new()
            }
        };
        let is_selfie = self.selfies.is_selfie(width, height, &faces);
        let has_faces = !faces.is_empty();
        evidence.faces = Some(faces);

        if is_selfie {
            return ClassificationResult::new(Category::Selfies, evidence);
        }
        if has_faces {
            return ClassificationResult::new(Category::People, evidence);
        }

        evidence.color = self.nature.inspect(image, diagnostics);
        let accepted = evidence
            .color
            .as_ref()
            .is_some_and(|color| self.nature.accepts(color));
        if accepted {
            return ClassificationResult::new(Category::Nature, evidence);
        }

        ClassificationResult::new(Category::Unknown, evidence)
    }
}
