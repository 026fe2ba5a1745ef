//! Selfie vs. group/person photo decision from face geometry.

use super::config::SelfieConfig;
use super::features::BoundingBox;

#[derive(Clone, Debug, Default)]
pub struct SelfieClassifier {
    config: SelfieConfig,
}

impl SelfieClassifier {
    pub fn new(config: SelfieConfig) -> Self {
        Self { config }
    }

    /// A selfie has exactly one face that is large, wide, and centred in the
    /// upper two thirds of the frame.
    pub fn is_selfie(&self, width: i32, height: i32, faces: &[BoundingBox]) -> bool {
        let [face] = faces else {
            return false;
        };
        if width <= 0 || height <= 0 {
            return false;
        }

        let image_area = width as i64 * height as i64;
        let face_ratio = face.area() as f64 / image_area as f64;

        // Integer division: a 400px frame bounds the centre at 266.
        let face_center_y = face.y + face.height / 2;
        let upper_two_thirds = (height / 3) * 2;

        face_ratio > self.config.min_face_ratio
            && face_center_y < upper_two_thirds
            && face.width as f64 > width as f64 * self.config.min_face_width_ratio
    }
}
