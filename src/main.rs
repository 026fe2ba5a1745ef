mod cli;

use cli::{CliConfig, CliError, ReportTarget};
use indicatif::ProgressBar;
use pixsort_core::{
    default_report_path, print_summary, progress, write_report, ClassificationPipeline,
    ClassifierConfig, Diagnostics, Organizer, ScanConfig, TracingDiagnostics,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let config = CliConfig::from_env().unwrap_or_else(|err| match err {
        CliError::Help | CliError::Version => {
            println!("{}", err);
            std::process::exit(0);
        }
        _ => {
            eprintln!("{}", err);
            std::process::exit(2);
        }
    });

    init_logging();
    if let Err(code) = run(config) {
        std::process::exit(code);
    }
}

fn run(config: CliConfig) -> Result<(), i32> {
    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);

    let classifier_config = match config.config.as_ref() {
        Some(path) => ClassifierConfig::load(path),
        None => ClassifierConfig::load_or_default(),
    }
    .map_err(|error| {
        diagnostics.error(&error.to_string());
        1
    })?;

    let pipeline = ClassificationPipeline::from_config(&classifier_config, diagnostics.clone());
    let scan_config = ScanConfig::default()
        .with_extensions(config.extensions.clone())
        .with_threading(config.threading);
    let organizer = Organizer::new(&config.output, scan_config, pipeline, diagnostics.clone())
        .map_err(|error| {
            diagnostics.error(&error.to_string());
            1
        })?;

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(progress::organize_style());

    // The organizer has already logged a missing source folder.
    let outcome = organizer.run(&config.source, &progress_bar).map_err(|_| 1)?;
    progress_bar.finish_and_clear();

    if let Some(target) = &config.report {
        let report_path = match target {
            ReportTarget::Default => default_report_path(organizer.output()),
            ReportTarget::Path(path) => path.clone(),
        };
        match write_report(&outcome, &config.source, organizer.output(), &report_path) {
            Ok(_) => diagnostics.info(&format!(
                "Classification report written to {}",
                report_path.display()
            )),
            Err(error) => diagnostics.error(&format!(
                "Error writing classification report: {}",
                error
            )),
        }
    }

    if outcome.enumerated() > 0 {
        print_summary(&outcome, organizer.output());
    }
    Ok(())
}
