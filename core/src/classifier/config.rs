//! Threshold configuration for the heuristic detectors.
//!
//! Every threshold can be overridden from a TOML file (`pixsort.toml`):
//!
//! ```toml
//! [document]
//! min_rectangles = 2
//! min_aspect_ratio = 0.7
//!
//! [nature]
//! green_fraction = 0.3
//!
//! [faces]
//! cascade_path = "/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml"
//! ```
//!
//! Omitted keys keep their defaults.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "pixsort.toml";

/// Environment variable that points at a Haar cascade file.
pub const CASCADE_ENV_VAR: &str = "PIXSORT_FACE_CASCADE";

const CASCADE_FILE_NAME: &str = "haarcascade_frontalface_default.xml";

/// Shape and line thresholds for document detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub polygon_epsilon: f64,
    /// Contours must enclose strictly more than this many pixels.
    pub min_rectangle_area: f64,
    /// Rectangle count must be strictly greater than this.
    pub min_rectangles: usize,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    pub canny_low: f64,
    pub canny_high: f64,
    pub hough_threshold: i32,
    pub min_line_length: f64,
    pub max_line_gap: f64,
    /// Lines within this many degrees of horizontal count as text lines.
    pub horizontal_tolerance_degrees: f64,
    /// Horizontal line count must be strictly greater than this.
    pub min_horizontal_lines: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            polygon_epsilon: 0.02,
            min_rectangle_area: 1000.0,
            min_rectangles: 2,
            min_aspect_ratio: 0.7,
            max_aspect_ratio: 1.5,
            canny_low: 50.0,
            canny_high: 150.0,
            hough_threshold: 100,
            min_line_length: 100.0,
            max_line_gap: 10.0,
            horizontal_tolerance_degrees: 10.0,
            min_horizontal_lines: 3,
        }
    }
}

/// Haar cascade parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// Explicit cascade file; searched before the well-known locations.
    pub cascade_path: Option<PathBuf>,
    pub scale_factor: f64,
    pub min_neighbors: i32,
    pub min_face_size: i32,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            cascade_path: None,
            scale_factor: 1.1,
            min_neighbors: 5,
            min_face_size: 30,
        }
    }
}

impl FaceConfig {
    /// Cascade files to try, most specific first.
    pub fn cascade_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = &self.cascade_path {
            candidates.push(path.clone());
        }
        if let Some(path) = std::env::var_os(CASCADE_ENV_VAR) {
            candidates.push(PathBuf::from(path));
        }
        for root in [
            "/usr/share/opencv4/haarcascades",
            "/usr/local/share/opencv4/haarcascades",
            "/usr/share/opencv/haarcascades",
            "/usr/local/share/opencv/haarcascades",
            "/opt/homebrew/share/opencv4/haarcascades",
        ] {
            candidates.push(Path::new(root).join(CASCADE_FILE_NAME));
        }
        candidates
    }
}

/// Face geometry thresholds that separate selfies from group shots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfieConfig {
    /// Face area over frame area must exceed this.
    pub min_face_ratio: f64,
    /// Face width over frame width must exceed this.
    pub min_face_width_ratio: f64,
}

impl Default for SelfieConfig {
    fn default() -> Self {
        Self {
            min_face_ratio: 0.1,
            min_face_width_ratio: 0.2,
        }
    }
}

/// HSV ranges and mass thresholds for nature detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NatureConfig {
    pub green_lower: [u8; 3],
    pub green_upper: [u8; 3],
    pub blue_lower: [u8; 3],
    pub blue_upper: [u8; 3],
    pub green_fraction: f64,
    pub blue_fraction: f64,
    pub combined_fraction: f64,
}

impl Default for NatureConfig {
    fn default() -> Self {
        Self {
            green_lower: [40, 40, 40],
            green_upper: [80, 255, 255],
            blue_lower: [100, 50, 50],
            blue_upper: [130, 255, 255],
            green_fraction: 0.3,
            blue_fraction: 0.3,
            combined_fraction: 0.4,
        }
    }
}

/// Root classifier configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub document: DocumentConfig,
    pub faces: FaceConfig,
    pub selfie: SelfieConfig,
    pub nature: NatureConfig,
}

impl ClassifierConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            source,
            path: path.to_path_buf(),
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Load configuration from `./pixsort.toml` or the user config directory,
    /// falling back to defaults when neither exists.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let mut candidates = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
        candidates.extend(default_config_path());
        Self::load_first(&candidates)
    }

    /// Loads the first candidate that exists. Only a missing file is skipped;
    /// unreadable or malformed files are returned as errors.
    pub fn load_first(candidates: &[PathBuf]) -> Result<Self, ConfigError> {
        for path in candidates {
            match Self::load(path) {
                Ok(config) => return Ok(config),
                Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {}
                Err(error) => return Err(error),
            }
        }
        Ok(Self::default())
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            source,
            path: path.to_path_buf(),
        })
    }
}

/// `<user config dir>/pixsort/pixsort.toml`, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pixsort").join(DEFAULT_CONFIG_FILE))
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    Parse {
        source: toml::de::Error,
        path: PathBuf,
    },
    Serialize(toml::ser::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { source, path } => {
                write!(f, "failed to access config {}: {}", path.display(), source)
            }
            Self::Parse { source, path } => {
                write!(f, "invalid config TOML in {}: {}", path.display(), source)
            }
            Self::Serialize(error) => write!(f, "failed to serialize config: {}", error),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(error) => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_reference_thresholds() {
        let config = ClassifierConfig::default();
        assert_eq!(config.document.min_rectangles, 2);
        assert_eq!(config.document.min_horizontal_lines, 3);
        assert_eq!(config.document.min_rectangle_area, 1000.0);
        assert_eq!(config.faces.scale_factor, 1.1);
        assert_eq!(config.faces.min_neighbors, 5);
        assert_eq!(config.faces.min_face_size, 30);
        assert_eq!(config.selfie.min_face_ratio, 0.1);
        assert_eq!(config.nature.green_lower, [40, 40, 40]);
        assert_eq!(config.nature.combined_fraction, 0.4);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[nature]\ngreen_fraction = 0.5\n").unwrap();

        let config = ClassifierConfig::load(&path).unwrap();
        assert_eq!(config.nature.green_fraction, 0.5);
        assert_eq!(config.nature.blue_fraction, 0.3);
        assert_eq!(config.document, DocumentConfig::default());
    }

    #[test]
    fn save_then_load_preserves_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        let mut config = ClassifierConfig::default();
        config.faces.cascade_path = Some(PathBuf::from("/tmp/cascade.xml"));
        config.document.min_aspect_ratio = 0.5;
        config.save(&path).unwrap();

        assert_eq!(ClassifierConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[document\nmin_rectangles = ").unwrap();
        assert!(matches!(
            ClassifierConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn absent_candidates_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let candidates = vec![dir.path().join("a.toml"), dir.path().join("b.toml")];
        assert_eq!(
            ClassifierConfig::load_first(&candidates).unwrap(),
            ClassifierConfig::default()
        );
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("present.toml");
        std::fs::write(&present, "[selfie]\nmin_face_ratio = 0.25\n").unwrap();
        let candidates = vec![dir.path().join("absent.toml"), present];
        let config = ClassifierConfig::load_first(&candidates).unwrap();
        assert_eq!(config.selfie.min_face_ratio, 0.25);
    }

    #[test]
    fn malformed_candidate_is_not_silently_replaced() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join(DEFAULT_CONFIG_FILE);
        let fallback = dir.path().join("fallback.toml");
        std::fs::write(&broken, "[nature\ngreen_fraction = ").unwrap();
        std::fs::write(&fallback, "[nature]\ngreen_fraction = 0.9\n").unwrap();

        match ClassifierConfig::load_first(&[broken.clone(), fallback]) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, broken),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn explicit_cascade_is_tried_first() {
        let config = FaceConfig {
            cascade_path: Some(PathBuf::from("custom.xml")),
            ..FaceConfig::default()
        };
        let candidates = config.cascade_candidates();
        assert_eq!(candidates[0], PathBuf::from("custom.xml"));
        assert!(candidates
            .iter()
            .any(|path| path.ends_with(CASCADE_FILE_NAME)));
    }
}
