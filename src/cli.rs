use pixsort_core::{default_extensions, ThreadingMode};
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "organized_photos";

const USAGE: &str = "\
Automatically classify and organize photos

Usage: pixsort <SOURCE_FOLDER> [OPTIONS]

Options:
  -o, --output <DIR>    Output folder for organized photos [default: organized_photos]
      --config=<FILE>   Classifier thresholds (TOML)
      --report[=<FILE>] Write a JSON classification report
      --no-thread       Classify images one at a time
  -h, --help            Print help
  -V, --version         Print version";

/// Where the JSON report should go, if anywhere.
#[derive(Debug, PartialEq, Eq)]
pub enum ReportTarget {
    Default,
    Path(PathBuf),
}

#[derive(Debug, PartialEq, Eq)]
pub struct CliConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub report: Option<ReportTarget>,
    pub threading: ThreadingMode,
    pub extensions: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CliError {
    MissingSource,
    MissingValue(String),
    InvalidFlag(String),
    Help,
    Version,
}

impl CliConfig {
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_iter(env::args().skip(1))
    }

    pub fn from_iter<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        Self::parse(args.into_iter())
    }

    fn parse<I>(mut args: I) -> Result<Self, CliError>
    where
        I: Iterator<Item = String>,
    {
        let mut source: Option<PathBuf> = None;
        let mut output: Option<PathBuf> = None;
        let mut config: Option<PathBuf> = None;
        let mut report: Option<ReportTarget> = None;
        let mut threading = ThreadingMode::Parallel;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Err(CliError::Help),
                "-V" | "--version" => return Err(CliError::Version),
                "--no-thread" => {
                    threading = ThreadingMode::Sequential;
                    continue;
                }
                "--report" => {
                    report = Some(ReportTarget::Default);
                    continue;
                }
                "-o" | "--output" => {
                    let value = args.next().ok_or_else(|| CliError::MissingValue(arg.clone()))?;
                    output = Some(PathBuf::from(value));
                    continue;
                }
                _ => {}
            }

            if arg.starts_with('-') {
                if let Some(value) = arg.strip_prefix("--output=") {
                    output = Some(PathBuf::from(value));
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--config=") {
                    config = Some(PathBuf::from(value));
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--report=") {
                    report = Some(ReportTarget::Path(PathBuf::from(value)));
                    continue;
                }
                return Err(CliError::InvalidFlag(arg));
            }

            if source.is_none() {
                source = Some(PathBuf::from(&arg));
                continue;
            }

            return Err(CliError::InvalidFlag(arg));
        }

        let source = source.ok_or(CliError::MissingSource)?;

        Ok(Self {
            source,
            output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            config,
            report,
            threading,
            extensions: default_extensions(),
        })
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSource => write!(f, "source folder argument is required\n\n{}", USAGE),
            Self::MissingValue(flag) => write!(f, "{} requires a value", flag),
            Self::InvalidFlag(flag) => write!(f, "unrecognized argument: {}", flag),
            Self::Help => write!(f, "{}", USAGE),
            Self::Version => write!(f, "pixsort {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Error for CliError {}
