//! Run orchestration
//!
//! Loads the mapping list, turns every mapping into one export job, and runs
//! the jobs through a bounded worker pool. A failed job is reported and does
//! not stop the others; the aggregated summary drives the process exit
//! status.

use futures::stream::{self, StreamExt};
use tracing::{error, info};

use crate::bigquery::WarehouseSink;
use crate::config::RunConfig;
use crate::mappings::{load_mappings, CollectionMapping};
use crate::pipeline::{Job, JobReport};
use crate::source::DocumentSource;

/// Result of one attempted mapping
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub mapping: CollectionMapping,
    pub result: Result<JobReport, String>,
}

/// Aggregate result of one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,

    /// Set when the mapping file could not be loaded; the run then performs
    /// no work
    pub load_error: Option<String>,

    pub outcomes: Vec<JobOutcome>,
}

impl RunSummary {
    fn load_failed(message: String) -> Self {
        Self {
            load_error: Some(message),
            ..Self::default()
        }
    }

    /// Whether the run loaded its mappings and every job succeeded. An empty
    /// mapping list counts as success: no work to do.
    pub fn is_success(&self) -> bool {
        self.load_error.is_none() && self.failed == 0
    }
}

/// Attempt every mapped collection and return the aggregated summary.
///
/// Mappings are started in file order, at most `config.concurrency` at a
/// time; `concurrency = 1` runs them strictly sequentially. Jobs share no
/// mutable state, so no coordination beyond completion is needed.
pub async fn run<S, W>(config: &RunConfig, source: &S, sink: &W) -> RunSummary
where
    S: DocumentSource,
    W: WarehouseSink,
{
    let mappings = match load_mappings(&config.mappings_file) {
        Ok(mappings) => mappings,
        Err(e) => {
            error!(
                path = %config.mappings_file.display(),
                error = %e,
                "Failed to load collection mappings; nothing to export"
            );
            return RunSummary::load_failed(e.to_string());
        },
    };

    if mappings.is_empty() {
        info!(
            path = %config.mappings_file.display(),
            "Mapping file lists no collections; nothing to export"
        );
        return RunSummary::default();
    }

    let total = mappings.len();
    info!(
        "Exporting {} collections with concurrency={}",
        total, config.concurrency
    );

    let outcomes: Vec<JobOutcome> = stream::iter(mappings.into_iter().enumerate())
        .map(|(index, mapping)| {
            let job = Job::build(&mapping, config);

            async move {
                info!(
                    "Starting mapping {} / {}: {} -> {}",
                    index + 1,
                    total,
                    mapping.collection_name,
                    job.table
                );

                let result = match job.execute(source, sink).await {
                    Ok(report) => Ok(report),
                    Err(e) => {
                        error!(
                            collection = %mapping.collection_name,
                            table = %job.table,
                            "Export failed for mapping {} / {}: {:#}",
                            index + 1,
                            total,
                            e
                        );
                        Err(format!("{:#}", e))
                    },
                };

                JobOutcome { mapping, result }
            }
        })
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
    let failed = outcomes.len() - succeeded;

    info!(
        "Run complete: {} / {} mappings succeeded",
        succeeded, total
    );

    RunSummary {
        attempted: outcomes.len(),
        succeeded,
        failed,
        load_error: None,
        outcomes,
    }
}
