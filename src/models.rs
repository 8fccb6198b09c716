//! Data models for the audit worker.
//!
//! This module contains the core data structures shared by the collect and
//! process stages: audit dimensions, task envelopes, and the simplified
//! report schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Device emulation mode for an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Mobile emulation
    Mobile,
    /// Desktop emulation
    Desktop,
}

impl Strategy {
    /// Every strategy, in the order audits are issued and results reported.
    pub const ALL: [Strategy; 2] = [Strategy::Mobile, Strategy::Desktop];

    /// Name used in storage keys and report payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }

    /// Value expected by the PageSpeed `strategy` query parameter.
    pub fn api_param(&self) -> &'static str {
        match self {
            Strategy::Mobile => "MOBILE",
            Strategy::Desktop => "DESKTOP",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mobile" => Ok(Strategy::Mobile),
            "desktop" => Ok(Strategy::Desktop),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

/// Scoring dimension of an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Performance,
    Seo,
    Accessibility,
    BestPractices,
}

impl Category {
    /// Every category, in the order the collect stage issues them.
    pub const ALL: [Category; 4] = [
        Category::Performance,
        Category::Seo,
        Category::Accessibility,
        Category::BestPractices,
    ];

    /// Key used in storage keys and in the audit document's `categories` map.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Performance => "performance",
            Category::Seo => "seo",
            Category::Accessibility => "accessibility",
            Category::BestPractices => "best-practices",
        }
    }

    /// Value expected by the PageSpeed `category` query parameter.
    pub fn api_param(&self) -> &'static str {
        match self {
            Category::Performance => "PERFORMANCE",
            Category::Seo => "SEO",
            Category::Accessibility => "ACCESSIBILITY",
            Category::BestPractices => "BEST_PRACTICES",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations this worker answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Run every audit and store the raw results.
    Collect,
    /// Consolidate stored results into simplified reports.
    Process,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Collect => "collect",
            Operation::Process => "process",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collect" => Ok(Operation::Collect),
            "process" => Ok(Operation::Process),
            other => Err(other.to_string()),
        }
    }
}

/// Output of an earlier stage in the same job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage name, e.g. "collect".
    pub name: String,
    /// Stage payload, either structured or as the serialized string it was
    /// reported with.
    #[serde(default)]
    pub output: Value,
}

/// Inbound task as delivered by the task protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Operation name ("collect" or "process").
    pub task: String,
    /// Job identifier used to namespace storage keys.
    pub slug: String,
    /// Target URL (collect).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Prior stage outputs (process).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sequence: Vec<StageResult>,
}

/// The single downstream report emitted per task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub slug: String,
    pub operation: String,
    /// Serialized JSON payload.
    pub payload: String,
}

/// Storage keys written for one strategy by the process stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Merged report key (`.json`).
    pub full: String,
    /// Simplified report key (`.min.json`).
    pub min: String,
}

/// Process stage result for one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub simplified_report: SimplifiedReport,
    pub storage_keys: StorageKeys,
}

/// Category scores scaled to 0-100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub performance: f64,
    pub accessibility: f64,
    pub best_practices: f64,
    pub seo: f64,
}

/// Key timing metrics, in the units the provider reports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Timings {
    /// Time to first byte
    pub ttfb: f64,
    /// First contentful paint
    pub fcp: f64,
    /// Largest contentful paint
    pub lcp: f64,
    /// Speed index
    pub si: f64,
    /// Cumulative layout shift (unitless)
    pub cls: f64,
    /// Total blocking time
    pub tbt: f64,
    /// Time to interactive
    pub tti: f64,
    /// Observed DOMContentLoaded
    pub dcl: f64,
}

/// An audit the provider flagged as a savings opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Estimated savings, formatted as `"<ms>ms"`.
    pub savings: String,
}

/// An audit the provider flagged as a diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Provider details, passed through untouched.
    pub details: Value,
}

/// Size and request count for one resource type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBreakdown {
    pub size: u64,
    pub count: usize,
}

/// Aggregate of the `resource-summary` audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub total_requests: usize,
    pub total_transfer_size: u64,
    /// Per resource type, in first-seen order.
    pub breakdown: IndexMap<String, ResourceBreakdown>,
}

/// Emulation settings the audit ran with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditConfig {
    pub emulated_form_factor: String,
    pub locale: String,
}

/// Fixed-shape projection of a merged report for one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedReport {
    pub mode: Strategy,
    pub lighthouse_version: String,
    pub fetch_time: String,
    pub run_warnings: Vec<Value>,
    pub user_agent: String,
    pub url: String,
    pub final_url: String,
    #[serde(flatten)]
    pub scores: CategoryScores,
    pub timings: Timings,
    pub opportunities: Vec<Opportunity>,
    pub diagnostics: Vec<Diagnostic>,
    pub resource_summary: ResourceSummary,
    pub config: AuditConfig,
    /// Provider-side wall time of the audit run, in milliseconds.
    pub total_audit_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("mobile".parse::<Strategy>(), Ok(Strategy::Mobile));
        assert_eq!("DESKTOP".parse::<Strategy>(), Ok(Strategy::Desktop));
        assert!("tablet".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_category_names() {
        let names: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec!["performance", "seo", "accessibility", "best-practices"]
        );
        assert_eq!(Category::BestPractices.api_param(), "BEST_PRACTICES");
    }

    #[test]
    fn test_task_request_parse() {
        let json = r#"{"task":"process","slug":"abc","sequence":[{"name":"collect","output":["a"]}]}"#;
        let request: TaskRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.task, "process");
        assert!(request.url.is_none());
        assert_eq!(request.sequence.len(), 1);
        assert_eq!(request.sequence[0].name, "collect");
    }

    #[test]
    fn test_simplified_report_wire_names() {
        let report = SimplifiedReport {
            mode: Strategy::Desktop,
            lighthouse_version: "12.0.0".to_string(),
            fetch_time: String::new(),
            run_warnings: vec![],
            user_agent: String::new(),
            url: String::new(),
            final_url: String::new(),
            scores: CategoryScores {
                best_practices: 50.0,
                ..Default::default()
            },
            timings: Timings::default(),
            opportunities: vec![],
            diagnostics: vec![],
            resource_summary: ResourceSummary::default(),
            config: AuditConfig::default(),
            total_audit_time: 0.0,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["mode"], "desktop");
        assert_eq!(value["bestPractices"], 50.0);
        assert_eq!(value["lighthouseVersion"], "12.0.0");
        assert!(value["timings"].get("TTFB").is_some());
        assert_eq!(value["resourceSummary"]["totalRequests"], 0);
    }
}
