//! In-process collaborators for worker tests.

use crate::analysis::AuditDocument;
use crate::error::{Result, WorkerError};
use crate::models::{Category, Strategy, TaskReport};
use crate::provider::AuditProvider;
use crate::reporter::Reporter;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

/// Provider that returns a small canned document per call.
#[derive(Default)]
pub struct ScriptedProvider {
    calls: Mutex<Vec<(String, Category, Strategy)>>,
    failing: Mutex<Option<(Category, Strategy)>>,
}

impl ScriptedProvider {
    pub fn calls(&self) -> Vec<(String, Category, Strategy)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_on(&self, category: Category, strategy: Strategy) {
        *self.failing.lock().unwrap() = Some((category, strategy));
    }
}

#[async_trait]
impl AuditProvider for ScriptedProvider {
    async fn run_audit(
        &self,
        url: &str,
        category: Category,
        strategy: Strategy,
    ) -> Result<AuditDocument> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), category, strategy));

        if *self.failing.lock().unwrap() == Some((category, strategy)) {
            return Err(WorkerError::Provider("scripted failure".to_string()));
        }

        let check_id = format!("{}-check", category.as_str());
        let mut categories = serde_json::Map::new();
        categories.insert(category.as_str().to_string(), json!({"score": 0.75}));

        AuditDocument::from_value(
            "scripted",
            json!({
                "lighthouseVersion": "12.0.0",
                "requestedUrl": url,
                "finalUrl": url,
                "categories": categories,
                "audits": {
                    "first-contentful-paint": {"numericValue": 1200},
                    check_id: {
                        "title": "Check",
                        "description": "Scripted audit",
                        "details": {"type": "opportunity", "overallSavingsMs": 10}
                    }
                },
                "configSettings": {"emulatedFormFactor": strategy.as_str(), "locale": "en-US"},
                "timing": {"total": 1000}
            }),
        )
    }
}

/// Reporter that keeps every report it receives.
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<TaskReport>>,
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<TaskReport> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    async fn report(&self, report: &TaskReport) -> Result<()> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}

/// Reporter whose downstream is always unavailable.
pub struct FailingReporter;

#[async_trait]
impl Reporter for FailingReporter {
    async fn report(&self, _report: &TaskReport) -> Result<()> {
        Err(WorkerError::Report("downstream unavailable".to_string()))
    }
}
