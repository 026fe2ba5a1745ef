//! Scanned/photographed document detection.
//!
//! Documents show several rectangular layout blocks, many near-horizontal
//! text lines, and a near-square frame. All three signals must agree.

use super::config::DocumentConfig;
use super::features::{self, ClassifierError};
use crate::diagnostics::Diagnostics;
use opencv::core::{Mat, Point, Vec4i, Vector};
use opencv::imgproc;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Measurements taken while deciding whether an image is a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEvidence {
    pub rectangular_contours: usize,
    pub aspect_ratio: f64,
    pub horizontal_lines: usize,
}

#[derive(Clone, Debug, Default)]
pub struct DocumentDetector {
    config: DocumentConfig,
}

impl DocumentDetector {
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    /// Returns false when any measurement fails.
    pub fn is_document(&self, image: &Mat, diagnostics: &dyn Diagnostics) -> bool {
        self.inspect(image, diagnostics).is_some_and(|evidence| self.accepts(&evidence))
    }

    /// Measures `image`, reporting a failed measurement and returning `None`.
    pub fn inspect(
        &self,
        image: &Mat,
        diagnostics: &dyn Diagnostics,
    ) -> Option<DocumentEvidence> {
        self.measure(image)
            .map_err(|error| {
                diagnostics.error(&format!("Error in document detection: {}", error));
            })
            .ok()
    }

    pub fn accepts(&self, evidence: &DocumentEvidence) -> bool {
        evidence.rectangular_contours > self.config.min_rectangles
            && evidence.aspect_ratio >= self.config.min_aspect_ratio
            && evidence.aspect_ratio <= self.config.max_aspect_ratio
            && evidence.horizontal_lines > self.config.min_horizontal_lines
    }

    pub fn measure(&self, image: &Mat) -> Result<DocumentEvidence, ClassifierError> {
        features::ensure_not_empty(image)?;
        let grayscale = features::to_grayscale(image)?;
        let rectangular_contours = self.count_rectangles(&grayscale)?;

        let (width, height) = features::dimensions(&grayscale);
        let aspect_ratio = width as f64 / height as f64;

        let horizontal_lines = self.count_horizontal_lines(&grayscale)?;

        Ok(DocumentEvidence {
            rectangular_contours,
            aspect_ratio,
            horizontal_lines,
        })
    }

    fn count_rectangles(&self, grayscale: &Mat) -> Result<usize, ClassifierError> {
        let mut binary = Mat::default();
        imgproc::threshold(
            grayscale,
            &mut binary,
            0.0,
            255.0,
            imgproc::THRESH_BINARY | imgproc::THRESH_OTSU,
        )?;

        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours_def(
            &binary,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
        )?;

        let mut rectangles = 0;
        for contour in contours.iter() {
            let epsilon = self.config.polygon_epsilon * imgproc::arc_length(&contour, true)?;
            let mut approx = Vector::<Point>::new();
            imgproc::approx_poly_dp(&contour, &mut approx, epsilon, true)?;

            if approx.len() == 4
                && imgproc::contour_area_def(&contour)? > self.config.min_rectangle_area
            {
                rectangles += 1;
            }
        }
        Ok(rectangles)
    }

    fn count_horizontal_lines(&self, grayscale: &Mat) -> Result<usize, ClassifierError> {
        let mut edges = Mat::default();
        imgproc::canny_def(
            grayscale,
            &mut edges,
            self.config.canny_low,
            self.config.canny_high,
        )?;

        let mut lines = Vector::<Vec4i>::new();
        imgproc::hough_lines_p(
            &edges,
            &mut lines,
            1.0,
            PI / 180.0,
            self.config.hough_threshold,
            self.config.min_line_length,
            self.config.max_line_gap,
        )?;

        let tolerance = self.config.horizontal_tolerance_degrees;
        Ok(lines
            .iter()
            .filter(|line| {
                let angle = line_angle_degrees(line[0], line[1], line[2], line[3]);
                angle < tolerance || angle > 180.0 - tolerance
            })
            .count())
    }
}

/// Absolute angle from horizontal in degrees, in `[0, 180]`.
fn line_angle_degrees(x1: i32, y1: i32, x2: i32, y2: i32) -> f64 {
    ((y2 - y1) as f64).atan2((x2 - x1) as f64).to_degrees().abs()
}
