//! Synthetic images for detector and pipeline tests.

use opencv::core::{self, Mat, Point, Rect, Scalar, Vector};
use opencv::imgcodecs;
use opencv::imgproc;
use std::path::Path;

/// Solid image filled with a BGR colour.
pub fn solid(rows: i32, cols: i32, bgr: (f64, f64, f64)) -> Mat {
    Mat::new_rows_cols_with_default(
        rows,
        cols,
        core::CV_8UC3,
        Scalar::from((bgr.0, bgr.1, bgr.2, 0.0)),
    )
    .unwrap()
}

/// Uniformly random BGR pixels from OpenCV's default-seeded generator.
///
/// Hue comes out roughly uniform, so about 22% of pixels land in the green
/// band and 17% in the blue band.
pub fn noise(rows: i32, cols: i32) -> Mat {
    let mut image =
        Mat::new_rows_cols_with_default(rows, cols, core::CV_8UC3, Scalar::all(0.0)).unwrap();
    core::randu(&mut image, &Scalar::all(0.0), &Scalar::all(256.0)).unwrap();
    image
}

/// White paragraph blocks and rules on a dark page.
pub fn document_page(rows: i32, cols: i32) -> Mat {
    let mut image = solid(rows, cols, (0.0, 0.0, 0.0));
    let white = Scalar::all(255.0);
    for top in [40, 200, 360] {
        let rect = Rect::new(60, top, 220, 90);
        imgproc::rectangle(&mut image, rect, white, imgproc::FILLED, imgproc::LINE_8, 0).unwrap();
    }
    for y in [80, 160, 260, 340, 460, 520] {
        imgproc::line(
            &mut image,
            Point::new(330, y),
            Point::new(560, y),
            white,
            3,
            imgproc::LINE_8,
            0,
        )
        .unwrap();
    }
    image
}

/// Paints the top `fraction` of rows with a BGR colour.
pub fn with_band(mut image: Mat, fraction: f64, bgr: (f64, f64, f64)) -> Mat {
    use opencv::prelude::*;
    let rows = (image.rows() as f64 * fraction).round() as i32;
    let rect = Rect::new(0, 0, image.cols(), rows);
    imgproc::rectangle(
        &mut image,
        rect,
        Scalar::from((bgr.0, bgr.1, bgr.2, 0.0)),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )
    .unwrap();
    image
}

pub fn write_png(path: &Path, image: &Mat) {
    let params = Vector::<i32>::new();
    assert!(imgcodecs::imwrite(path.to_string_lossy().as_ref(), image, &params).unwrap());
}
