//! Diagnostic sink injected into the classifier and organizer.
//!
//! The core never installs a global logger. Callers hand in an
//! implementation of [`Diagnostics`]; the binary uses [`TracingDiagnostics`].

/// Receives progress and failure messages from the core.
pub trait Diagnostics: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards messages to the `tracing` macros.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Discards every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentDiagnostics;

impl Diagnostics for SilentDiagnostics {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}
