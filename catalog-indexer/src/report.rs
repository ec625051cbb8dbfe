//! Operator-facing summary of an indexer run.

use std::fmt;

use serde::Serialize;

use catalog_indexer_pipeline::{BuildOutcome, RecordFailure, RunReport};
use catalog_indexer_repository::IndexProvisioning;

/// A record that failed to build.
#[derive(Debug, Clone, Serialize)]
pub struct FailedRecord {
    pub id: String,
    pub position: usize,
    pub error: String,
}

impl From<&RecordFailure> for FailedRecord {
    fn from(failure: &RecordFailure) -> Self {
        Self {
            id: failure.record_id.clone(),
            position: failure.position,
            error: failure.error.to_string(),
        }
    }
}

/// A document the index refused.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedDocument {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub error: String,
}

/// Short description of a built document, used by dry runs.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPreview {
    pub id: String,
    pub title: String,
    pub url: String,
    pub dimensions: usize,
}

/// Serializable summary of a run, printed at the end of every invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub records_read: usize,
    pub documents_built: usize,
    pub failed_records: Vec<FailedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    pub uploaded: usize,
    pub rejected: Vec<RejectedDocument>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<DocumentPreview>,
}

impl RunSummary {
    /// Summarize a full run.
    pub fn from_report(report: &RunReport) -> Self {
        let rejected = report
            .upload
            .iter()
            .flat_map(|summary| summary.failures())
            .map(|result| RejectedDocument {
                key: result.key.clone(),
                status: result.status_code,
                error: result
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "rejected".to_string()),
            })
            .collect();

        Self {
            dry_run: false,
            records_read: report.records_read,
            documents_built: report.documents_built,
            failed_records: report.failures.iter().map(FailedRecord::from).collect(),
            index: report.provisioning.map(provisioning_label),
            uploaded: report.uploaded(),
            rejected,
            documents: Vec::new(),
        }
    }

    /// Summarize a run that stopped after building documents.
    pub fn dry_run(outcome: &BuildOutcome) -> Self {
        Self {
            dry_run: true,
            records_read: outcome.records(),
            documents_built: outcome.documents.len(),
            failed_records: outcome.failures.iter().map(FailedRecord::from).collect(),
            documents: outcome
                .documents
                .iter()
                .map(|d| DocumentPreview {
                    id: d.id.clone(),
                    title: d.title.clone(),
                    url: d.url.clone(),
                    dimensions: d.dimensions(),
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Whether nothing failed or was rejected.
    pub fn is_clean(&self) -> bool {
        self.failed_records.is_empty() && self.rejected.is_empty()
    }
}

fn provisioning_label(provisioning: IndexProvisioning) -> String {
    match provisioning {
        IndexProvisioning::Created => "created",
        IndexProvisioning::Existing => "existing",
        IndexProvisioning::Recreated => "recreated",
    }
    .to_string()
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Records read:     {}", self.records_read)?;
        writeln!(f, "Documents built:  {}", self.documents_built)?;
        writeln!(f, "Failed records:   {}", self.failed_records.len())?;
        if self.dry_run {
            writeln!(f, "Index stage:      skipped (dry run)")?;
        } else {
            if let Some(index) = &self.index {
                writeln!(f, "Index:            {}", index)?;
            }
            writeln!(f, "Uploaded:         {}", self.uploaded)?;
            writeln!(f, "Rejected:         {}", self.rejected.len())?;
        }

        for failure in &self.failed_records {
            writeln!(
                f,
                "  record {} (row {}): {}",
                failure.id,
                failure.position + 1,
                failure.error
            )?;
        }
        for rejection in &self.rejected {
            writeln!(f, "  document {}: {}", rejection.key, rejection.error)?;
        }
        Ok(())
    }
}
