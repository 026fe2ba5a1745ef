use crate::category::Category;
use crate::organizer::{FileRecord, OrganizeOutcome};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

const REPORT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ClassificationReport<'a> {
    version: u32,
    generated_at: String,
    source: &'a Path,
    output: &'a Path,
    tally: BTreeMap<Category, usize>,
    failed: usize,
    files: &'a [FileRecord],
}

#[derive(Debug)]
pub enum ReportingError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl Display for ReportingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {}", error),
            Self::Serialization(error) => write!(f, "serialization error: {}", error),
        }
    }
}

impl Error for ReportingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Serialization(error) => Some(error),
        }
    }
}

/// Writes the end-of-run summary block.
pub fn write_summary<W: Write>(
    writer: &mut W,
    outcome: &OrganizeOutcome,
    output: &Path,
) -> std::io::Result<()> {
    let rule = "=".repeat(50);
    writeln!(writer)?;
    writeln!(writer, "{}", rule)?;
    writeln!(writer, "CLASSIFICATION SUMMARY")?;
    writeln!(writer, "{}", rule)?;
    for (category, count) in outcome.tally.iter() {
        writeln!(writer, "{}: {} images", category, count)?;
    }
    writeln!(writer, "Total processed: {} images", outcome.tally.total())?;
    if outcome.tally.failed > 0 {
        writeln!(writer, "Failed to copy: {} images", outcome.tally.failed)?;
    }
    writeln!(writer)?;
    writeln!(writer, "Output folder: {}", output.display())
}

pub fn print_summary(outcome: &OrganizeOutcome, output: &Path) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if let Err(error) = write_summary(&mut handle, outcome, output) {
        eprintln!("Error printing summary: {}", error);
    }
}

/// Writes a JSON report with per-file categories and detector evidence.
pub fn write_report(
    outcome: &OrganizeOutcome,
    source: &Path,
    output: &Path,
    report_path: &Path,
) -> Result<(), ReportingError> {
    let report = ClassificationReport {
        version: REPORT_VERSION,
        generated_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("unknown")),
        source,
        output,
        tally: outcome.tally.iter().collect(),
        failed: outcome.tally.failed,
        files: &outcome.files,
    };

    if let Some(parent) = report_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(ReportingError::Io)?;
    }
    let file = File::create(report_path).map_err(ReportingError::Io)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &report).map_err(ReportingError::Serialization)
}

/// Default report location inside the output folder.
pub fn default_report_path(output: &Path) -> PathBuf {
    output.join("classification_report.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Tally;
    use crate::classifier::Evidence;
    use tempfile::tempdir;

    fn sample_outcome() -> OrganizeOutcome {
        let mut tally = Tally::default();
        tally.record(Category::Nature);
        tally.record(Category::Nature);
        tally.record(Category::Selfies);
        tally.record_failure();
        OrganizeOutcome {
            tally,
            files: vec![FileRecord {
                source: PathBuf::from("in/tree.jpg"),
                category: Category::Nature,
                destination: Some(PathBuf::from("out/nature/tree.jpg")),
                evidence: Evidence::default(),
                error: None,
            }],
        }
    }

    #[test]
    fn summary_lists_every_category() {
        let mut buffer = Vec::new();
        write_summary(&mut buffer, &sample_outcome(), Path::new("organized_photos")).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("CLASSIFICATION SUMMARY"));
        assert!(text.contains("Documents: 0 images"));
        assert!(text.contains("Selfies: 1 images"));
        assert!(text.contains("Nature: 2 images"));
        assert!(text.contains("Unknown: 0 images"));
        assert!(text.contains("Total processed: 3 images"));
        assert!(text.contains("Failed to copy: 1 images"));
        assert!(text.trim_end().ends_with("Output folder: organized_photos"));
    }

    #[test]
    fn report_is_valid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        write_report(&sample_outcome(), Path::new("in"), Path::new("out"), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["tally"]["nature"], 2);
        assert_eq!(value["tally"]["people"], 0);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["files"][0]["category"], "nature");
        assert!(value["files"][0].get("error").is_none());
    }

    #[test]
    fn default_report_lives_in_output() {
        assert_eq!(
            default_report_path(Path::new("out")),
            PathBuf::from("out/classification_report.json")
        );
    }
}
