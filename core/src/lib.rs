//! Core photo sorting engine for pixsort.
//!
//! Images are classified with pixel heuristics (document layout, frontal
//! faces, colour mass) into exactly one [`Category`] and copied into
//! `<output>/<category>/`. The CLI is a thin layer over [`Organizer`].

pub mod category;
pub mod classifier;
pub mod diagnostics;
pub mod organizer;
pub mod progress;
pub mod reporting;
pub mod scanner;

pub use category::{Category, Tally};
pub use classifier::{
    BoundingBox, ClassificationPipeline, ClassificationResult, ClassifierConfig, ClassifierError,
    ConfigError, Evidence, FaceDetector,
};
pub use diagnostics::{Diagnostics, SilentDiagnostics, TracingDiagnostics};
pub use organizer::{
    copy_preserving, resolve_destination, FileRecord, OrganizeError, OrganizeOutcome, Organizer,
};
pub use reporting::{default_report_path, print_summary, write_report, write_summary, ReportingError};
pub use scanner::{collect_images, default_extensions, ScanConfig, ThreadingMode};
