//! Nature/landscape detection from vegetation-green and sky-blue mass.

use super::config::NatureConfig;
use super::features::{self, ClassifierError};
use crate::diagnostics::Diagnostics;
use opencv::core::{self, Mat, Scalar};
use opencv::prelude::*;
use serde::{Deserialize, Serialize};

/// Share of pixels that fell inside each colour range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEvidence {
    pub green_fraction: f64,
    pub blue_fraction: f64,
}

#[derive(Clone, Debug, Default)]
pub struct NatureDetector {
    config: NatureConfig,
}

impl NatureDetector {
    pub fn new(config: NatureConfig) -> Self {
        Self { config }
    }

    /// Returns false when the colour analysis fails.
    pub fn is_nature(&self, image: &Mat, diagnostics: &dyn Diagnostics) -> bool {
        self.inspect(image, diagnostics).is_some_and(|evidence| self.accepts(&evidence))
    }

    /// Measures `image`, reporting a failed analysis and returning `None`.
    pub fn inspect(
        &self,
        image: &Mat,
        diagnostics: &dyn Diagnostics,
    ) -> Option<ColorEvidence> {
        self.measure(image)
            .map_err(|error| {
                diagnostics.error(&format!("Error in nature detection: {}", error));
            })
            .ok()
    }

    pub fn accepts(&self, evidence: &ColorEvidence) -> bool {
        evidence.green_fraction > self.config.green_fraction
            || evidence.blue_fraction > self.config.blue_fraction
            || evidence.green_fraction + evidence.blue_fraction > self.config.combined_fraction
    }

    pub fn measure(&self, image: &Mat) -> Result<ColorEvidence, ClassifierError> {
        features::ensure_not_empty(image)?;
        let hsv = features::to_hsv(image)?;
        let total = image.total() as f64;

        let green = count_in_range(&hsv, self.config.green_lower, self.config.green_upper)?;
        let blue = count_in_range(&hsv, self.config.blue_lower, self.config.blue_upper)?;

        Ok(ColorEvidence {
            green_fraction: green as f64 / total,
            blue_fraction: blue as f64 / total,
        })
    }
}

fn count_in_range(hsv: &Mat, lower: [u8; 3], upper: [u8; 3]) -> Result<i32, ClassifierError> {
    let mut mask = Mat::default();
    core::in_range(hsv, &to_scalar(lower), &to_scalar(upper), &mut mask)?;
    Ok(core::count_non_zero(&mask)?)
}

fn to_scalar(bounds: [u8; 3]) -> Scalar {
    Scalar::new(bounds[0] as f64, bounds[1] as f64, bounds[2] as f64, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::fixtures::{noise, solid, with_band};
    use crate::diagnostics::testing::{Level, RecordingDiagnostics};

    const GREEN: (f64, f64, f64) = (0.0, 200.0, 0.0);
    const SKY: (f64, f64, f64) = (230.0, 120.0, 30.0);
    const GREY: (f64, f64, f64) = (128.0, 128.0, 128.0);

    #[test]
    fn mostly_green_image_is_nature() {
        let detector = NatureDetector::default();
        let image = with_band(solid(100, 100, GREY), 0.35, GREEN);
        let evidence = detector.measure(&image).unwrap();
        assert!((evidence.green_fraction - 0.35).abs() < 1e-9);
        assert_eq!(evidence.blue_fraction, 0.0);
        assert!(detector.accepts(&evidence));
    }

    #[test]
    fn sky_counts_as_blue() {
        let detector = NatureDetector::default();
        let evidence = detector.measure(&solid(50, 50, SKY)).unwrap();
        assert_eq!(evidence.blue_fraction, 1.0);
        assert!(detector.accepts(&evidence));
    }

    #[test]
    fn combined_mass_can_tip_the_balance() {
        let detector = NatureDetector::default();
        let evidence = ColorEvidence {
            green_fraction: 0.25,
            blue_fraction: 0.2,
        };
        assert!(detector.accepts(&evidence));
        let sparse = ColorEvidence {
            green_fraction: 0.2,
            blue_fraction: 0.2,
        };
        assert!(!detector.accepts(&sparse));
    }

    #[test]
    fn grey_image_is_not_nature() {
        let detector = NatureDetector::default();
        let diagnostics = RecordingDiagnostics::default();
        assert!(!detector.is_nature(&solid(80, 80, GREY), &diagnostics));
    }

    #[test]
    fn random_noise_stays_below_thresholds() {
        let detector = NatureDetector::default();
        let evidence = detector.measure(&noise(200, 200)).unwrap();
        assert!(evidence.green_fraction > 0.15, "{:?}", evidence);
        assert!(evidence.blue_fraction > 0.1, "{:?}", evidence);
        assert!(evidence.green_fraction < 0.3, "{:?}", evidence);
        assert!(evidence.blue_fraction < 0.3, "{:?}", evidence);
        assert!(!detector.accepts(&evidence), "{:?}", evidence);
    }

    #[test]
    fn empty_image_is_reported_and_rejected() {
        let detector = NatureDetector::default();
        let diagnostics = RecordingDiagnostics::default();
        assert!(!detector.is_nature(&Mat::default(), &diagnostics));
        assert_eq!(diagnostics.messages(Level::Error).len(), 1);
    }
}
