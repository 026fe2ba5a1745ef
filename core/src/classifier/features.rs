//! OpenCV-backed image primitives shared by the detectors.

use opencv::core::{Mat, Rect};
use opencv::imgcodecs;
use opencv::imgproc;
use opencv::prelude::*;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Axis-aligned face candidate in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

impl From<Rect> for BoundingBox {
    fn from(rect: Rect) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height)
    }
}

/// Decodes the image at `path` as 8-bit BGR.
pub fn load_image(path: &Path) -> Result<Mat, ClassifierError> {
    let path_string = path
        .to_str()
        .ok_or_else(|| ClassifierError::InvalidPath(path.to_path_buf()))?;

    let image = imgcodecs::imread(path_string, imgcodecs::IMREAD_COLOR)?;
    if image.empty() {
        return Err(ClassifierError::EmptyImage(path.to_path_buf()));
    }
    Ok(image)
}

/// Width and height of `image` in pixels.
pub fn dimensions(image: &Mat) -> (i32, i32) {
    (image.cols(), image.rows())
}

pub fn to_grayscale(image: &Mat) -> Result<Mat, ClassifierError> {
    let mut grayscale = Mat::default();
    imgproc::cvt_color_def(image, &mut grayscale, imgproc::COLOR_BGR2GRAY)?;
    Ok(grayscale)
}

/// Converts to HSV with hue on OpenCV's 0-180 scale.
pub fn to_hsv(image: &Mat) -> Result<Mat, ClassifierError> {
    let mut hsv = Mat::default();
    imgproc::cvt_color_def(image, &mut hsv, imgproc::COLOR_BGR2HSV)?;
    Ok(hsv)
}

pub(crate) fn ensure_not_empty(image: &Mat) -> Result<(), ClassifierError> {
    if image.empty() || image.rows() == 0 || image.cols() == 0 {
        return Err(ClassifierError::ZeroDimensions);
    }
    Ok(())
}

/// Errors raised while decoding or analysing an image.
#[derive(Debug)]
pub enum ClassifierError {
    InvalidPath(PathBuf),
    EmptyImage(PathBuf),
    ZeroDimensions,
    CascadeUnavailable(Vec<PathBuf>),
    Poisoned,
    OpenCv(opencv::Error),
}

impl Display for ClassifierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(path) => write!(
                f,
                "unable to convert path {} to UTF-8 string",
                path.display()
            ),
            Self::EmptyImage(path) => write!(f, "could not decode image {}", path.display()),
            Self::ZeroDimensions => write!(f, "image has zero width or height"),
            Self::CascadeUnavailable(candidates) => {
                write!(f, "no usable face cascade found (tried")?;
                for candidate in candidates {
                    write!(f, " {}", candidate.display())?;
                }
                write!(f, ")")
            }
            Self::Poisoned => write!(f, "face detector lock poisoned"),
            Self::OpenCv(error) => write!(f, "opencv error: {}", error),
        }
    }
}

impl Error for ClassifierError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OpenCv(error) => Some(error),
            _ => None,
        }
    }
}

impl From<opencv::Error> for ClassifierError {
    fn from(error: opencv::Error) -> Self {
        Self::OpenCv(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{self, Scalar, Vector};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_written_image_with_dimensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grey.png");
        let image = Mat::new_rows_cols_with_default(
            48,
            64,
            core::CV_8UC3,
            Scalar::from((90.0, 90.0, 90.0, 0.0)),
        )
        .unwrap();
        imgcodecs::imwrite(path.to_string_lossy().as_ref(), &image, &Vector::new()).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(dimensions(&loaded), (64, 48));
        assert_eq!(to_grayscale(&loaded).unwrap().channels(), 1);
        assert_eq!(to_hsv(&loaded).unwrap().channels(), 3);
    }

    #[test]
    fn undecodable_file_is_an_empty_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(matches!(
            load_image(&path),
            Err(ClassifierError::EmptyImage(_))
        ));
    }

    #[test]
    fn bounding_box_from_rect() {
        let bounds = BoundingBox::from(Rect::new(1, 2, 30, 40));
        assert_eq!(bounds, BoundingBox::new(1, 2, 30, 40));
        assert_eq!(bounds.area(), 1200);
    }
}
