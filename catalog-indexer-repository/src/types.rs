//! Request and response types for search index operations.

use crate::errors::SearchIndexError;

/// Outcome of one index provisioning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexProvisioning {
    /// The index did not exist and was created.
    Created,
    /// The index already existed and was left untouched.
    Existing,
    /// The index was deleted (if present) and created again from the definition.
    Recreated,
}

/// Result of a batch operation for a single document.
///
/// Indicates whether the service accepted the document and includes error
/// details if it did not.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The document key.
    pub key: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// HTTP-style status the service reported for this document, if any.
    pub status_code: Option<u16>,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

impl BatchOperationResult {
    /// A successful result for `key`.
    pub fn succeeded(key: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            key: key.into(),
            success: true,
            status_code,
            error: None,
        }
    }

    /// A failed result for `key`.
    pub fn failed(key: impl Into<String>, status_code: Option<u16>, error: SearchIndexError) -> Self {
        Self {
            key: key.into(),
            success: false,
            status_code,
            error: Some(error),
        }
    }
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// Allows callers to handle partial failures: a rejected document shows up
/// here instead of failing the whole batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// An empty summary.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a summary from individual results, computing the counters.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Append another summary's results to this one.
    pub fn merge(&mut self, other: BatchOperationSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.results.extend(other.results);
    }

    /// Results of the documents the service rejected.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOperationResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Whether every document was accepted.
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_results() {
        let summary = BatchOperationSummary::from_results(vec![
            BatchOperationResult::succeeded("1", Some(201)),
            BatchOperationResult::failed("2", Some(400), SearchIndexError::index("bad vector")),
            BatchOperationResult::succeeded("3", Some(200)),
        ]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_complete_success());

        let failed: Vec<&str> = summary.failures().map(|r| r.key.as_str()).collect();
        assert_eq!(failed, vec!["2"]);
    }

    #[test]
    fn test_summary_merge_keeps_order() {
        let mut summary =
            BatchOperationSummary::from_results(vec![BatchOperationResult::succeeded("a", None)]);
        summary.merge(BatchOperationSummary::from_results(vec![
            BatchOperationResult::failed("b", None, SearchIndexError::index("rejected")),
            BatchOperationResult::succeeded("c", None),
        ]));

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        let keys: Vec<&str> = summary.results.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchOperationSummary::empty();
        assert_eq!(summary.total, 0);
        assert!(summary.is_complete_success());
    }
}
