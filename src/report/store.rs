//! In-memory report store
//!
//! Keeps completed analysis reports keyed by dataset fingerprint so that
//! repeated requests for the same data are served without re-running the
//! pipeline.

use crate::report::AnalysisReport;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A stored report with its insertion time
#[derive(Debug, Clone)]
pub struct StoredReport {
    pub report: Arc<AnalysisReport>,
    pub created_at: DateTime<Utc>,
}

/// Thread-safe store of completed reports, keyed by
/// [`crate::dataset::Dataset::fingerprint`]
#[derive(Debug, Default)]
pub struct ReportStore {
    reports: RwLock<HashMap<String, StoredReport>>,
}

impl ReportStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a report under the given fingerprint, replacing any
    /// previous entry. Returns the shared handle.
    pub fn insert(
        &self,
        fingerprint: impl Into<String>,
        report: AnalysisReport,
    ) -> Arc<AnalysisReport> {
        let handle = Arc::new(report);
        self.reports.write().insert(
            fingerprint.into(),
            StoredReport {
                report: Arc::clone(&handle),
                created_at: Utc::now(),
            },
        );
        handle
    }

    /// Look up a report by fingerprint
    pub fn get(&self, fingerprint: &str) -> Option<Arc<AnalysisReport>> {
        self.reports
            .read()
            .get(fingerprint)
            .map(|stored| Arc::clone(&stored.report))
    }

    /// Insertion time of a stored report
    pub fn created_at(&self, fingerprint: &str) -> Option<DateTime<Utc>> {
        self.reports.read().get(fingerprint).map(|s| s.created_at)
    }

    /// Remove a report; returns it if present
    pub fn remove(&self, fingerprint: &str) -> Option<Arc<AnalysisReport>> {
        self.reports
            .write()
            .remove(fingerprint)
            .map(|stored| stored.report)
    }

    /// Drop all stored reports
    pub fn clear(&self) {
        self.reports.write().clear();
    }

    /// Number of stored reports
    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }

    /// Stored fingerprints in sorted order
    pub fn fingerprints(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.reports.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}
