//! The error-reporting port used in reporting mode.

use crate::error::GlueError;
use std::sync::{Mutex, PoisonError};

/// Receives glue failures that are reported instead of returned.
pub trait ReportValidationError: Send + Sync {
    fn report(&self, error: &GlueError);
}

impl<F> ReportValidationError for F
where
    F: Fn(&GlueError) + Send + Sync,
{
    fn report(&self, error: &GlueError) {
        self(error)
    }
}

/// Default sink: an error-level `tracing` event per failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ReportValidationError for TracingReporter {
    fn report(&self, error: &GlueError) {
        tracing::error!(kind = ?error.kind(), "{error}");
    }
}

/// Keeps every reported failure, in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<GlueError>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<GlueError> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.reports().iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportValidationError for RecordingReporter {
    fn report(&self, error: &GlueError) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.clone());
    }
}
