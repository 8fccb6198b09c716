//! Task routing for the two worker stages.
//!
//! A task names its operation; the worker runs it, then hands the result
//! to the downstream reporter and waits for that call to finish before the
//! task counts as done.

pub mod collect;
pub mod process;

#[cfg(test)]
pub(crate) mod testing;

use crate::error::{Result, WorkerError};
use crate::models::{Operation, StrategyResult, TaskReport, TaskRequest};
use crate::provider::AuditProvider;
use crate::reporter::Reporter;
use crate::storage::ArtifactStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};

/// What a finished task produced.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// Raw artifact keys written by the collect stage.
    Collected(Vec<String>),
    /// One result per strategy from the process stage.
    Processed(Vec<StrategyResult>),
}

/// Runs tasks against fully constructed collaborators.
pub struct Worker {
    provider: Arc<dyn AuditProvider>,
    store: Arc<dyn ArtifactStore>,
    reporter: Arc<dyn Reporter>,
}

impl Worker {
    pub fn new(
        provider: Arc<dyn AuditProvider>,
        store: Arc<dyn ArtifactStore>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            provider,
            store,
            reporter,
        }
    }

    /// Run a task using the current UTC time for storage keys.
    pub async fn handle(&self, request: TaskRequest) -> Result<TaskOutcome> {
        self.handle_at(request, Utc::now()).await
    }

    /// Run a task with a fixed clock. Every key in the task uses `now`.
    pub async fn handle_at(&self, request: TaskRequest, now: DateTime<Utc>) -> Result<TaskOutcome> {
        let operation: Operation = request
            .task
            .parse()
            .map_err(WorkerError::UnknownTask)?;

        if request.slug.trim().is_empty() {
            return Err(WorkerError::MissingInput("slug"));
        }

        info!("Running {} task for {}", operation, request.slug);

        let result = self.run(operation, &request, now).await;
        if let Err(ref e) = result {
            error!("{} task for {} failed: {}", operation, request.slug, e);
        }
        let (outcome, payload) = result?;

        let report = TaskReport {
            slug: request.slug.clone(),
            operation: operation.as_str().to_string(),
            payload,
        };
        self.reporter.report(&report).await?;

        info!("{} task for {} done", operation, request.slug);
        Ok(outcome)
    }

    async fn run(
        &self,
        operation: Operation,
        request: &TaskRequest,
        now: DateTime<Utc>,
    ) -> Result<(TaskOutcome, String)> {
        match operation {
            Operation::Collect => {
                let keys = collect::run_collect(
                    self.provider.as_ref(),
                    self.store.as_ref(),
                    &request.slug,
                    request.url.as_deref(),
                    now,
                )
                .await?;
                let payload = serde_json::to_string(&keys)?;
                Ok((TaskOutcome::Collected(keys), payload))
            }
            Operation::Process => {
                let references = process::collected_keys(&request.sequence)?;
                let results =
                    process::run_process(self.store.as_ref(), &request.slug, &references, now)
                        .await?;
                let payload = serde_json::to_string(&results)?;
                Ok((TaskOutcome::Processed(results), payload))
            }
        }
    }
}
