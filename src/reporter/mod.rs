//! Downstream reporting of task results.
//!
//! Each task ends with exactly one report call. The call is awaited and its
//! failure fails the task.

use crate::error::{Result, WorkerError};
use crate::models::TaskReport;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Receives the single result of a finished task.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn report(&self, report: &TaskReport) -> Result<()>;
}

/// Posts task results as JSON to a callback URL.
pub struct HttpReporter {
    callback_url: String,
    http_client: reqwest::Client,
}

impl HttpReporter {
    /// Build the reporter and its connection pool up front.
    pub fn new(callback_url: &str, timeout_seconds: u64) -> Result<Self> {
        info!("Downstream reports go to {}", callback_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| WorkerError::Report(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            callback_url: callback_url.to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl Reporter for HttpReporter {
    async fn report(&self, report: &TaskReport) -> Result<()> {
        debug!(
            "Reporting {} result for {} ({} bytes)",
            report.operation,
            report.slug,
            report.payload.len()
        );

        let response = self
            .http_client
            .post(&self.callback_url)
            .json(report)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    WorkerError::Report(format!("Cannot connect to {}", self.callback_url))
                } else {
                    WorkerError::Report(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::Report(format!("{}: {}", status, body)));
        }

        info!("Reported {} result for {}", report.operation, report.slug);
        Ok(())
    }
}

/// Prints task results to stdout, one JSON document per task.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

#[async_trait]
impl Reporter for ConsoleReporter {
    async fn report(&self, report: &TaskReport) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(report)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_reporter() {
        let report = TaskReport {
            slug: "abc".to_string(),
            operation: "collect".to_string(),
            payload: "[]".to_string(),
        };
        assert!(ConsoleReporter.report(&report).await.is_ok());
    }

    #[tokio::test]
    async fn test_http_reporter_unreachable_fails() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let reporter = HttpReporter::new("http://127.0.0.1:9/report", 2).unwrap();
        let report = TaskReport {
            slug: "abc".to_string(),
            operation: "process".to_string(),
            payload: "[]".to_string(),
        };
        let err = reporter.report(&report).await.unwrap_err();
        assert!(matches!(err, WorkerError::Report(_)));
    }
}
