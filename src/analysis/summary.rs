//! Projection of a merged audit document into the simplified report.
//!
//! Every field has a default, so a document missing any audit still
//! produces a complete report. The input is only read.

use crate::analysis::merge::AuditDocument;
use crate::models::{
    AuditConfig, Category, CategoryScores, Diagnostic, Opportunity, ResourceBreakdown,
    ResourceSummary, SimplifiedReport, Strategy, Timings,
};
use serde_json::Value;

const METRICS_ITEM: &str = "/audits/metrics/details/items/0";
const RESOURCE_SUMMARY_AUDIT: &str = "resource-summary";

/// Build the simplified report for one strategy.
pub fn extract_summary(report: &AuditDocument, mode: Strategy) -> SimplifiedReport {
    SimplifiedReport {
        mode,
        lighthouse_version: string_at(report, "/lighthouseVersion"),
        fetch_time: string_at(report, "/fetchTime"),
        run_warnings: report
            .get("runWarnings")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        user_agent: string_at(report, "/environment/networkUserAgent"),
        url: string_at(report, "/requestedUrl"),
        final_url: string_at(report, "/finalUrl"),
        scores: extract_scores(report),
        timings: extract_timings(report),
        opportunities: extract_opportunities(report),
        diagnostics: extract_diagnostics(report),
        resource_summary: extract_resource_summary(report),
        config: AuditConfig {
            emulated_form_factor: string_at(report, "/configSettings/emulatedFormFactor"),
            locale: string_at(report, "/configSettings/locale"),
        },
        total_audit_time: number_at(report, "/timing/total"),
    }
}

fn string_at(report: &AuditDocument, pointer: &str) -> String {
    report
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn number_at(report: &AuditDocument, pointer: &str) -> f64 {
    report
        .pointer(pointer)
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn category_score(report: &AuditDocument, category: Category) -> f64 {
    number_at(report, &format!("/categories/{}/score", category.as_str())) * 100.0
}

fn extract_scores(report: &AuditDocument) -> CategoryScores {
    CategoryScores {
        performance: category_score(report, Category::Performance),
        accessibility: category_score(report, Category::Accessibility),
        best_practices: category_score(report, Category::BestPractices),
        seo: category_score(report, Category::Seo),
    }
}

fn audit_numeric(report: &AuditDocument, audit_id: &str) -> f64 {
    number_at(report, &format!("/audits/{}/numericValue", audit_id))
}

fn extract_timings(report: &AuditDocument) -> Timings {
    Timings {
        ttfb: number_at(report, &format!("{}/timeToFirstByte", METRICS_ITEM)),
        fcp: audit_numeric(report, "first-contentful-paint"),
        lcp: audit_numeric(report, "largest-contentful-paint"),
        si: audit_numeric(report, "speed-index"),
        cls: audit_numeric(report, "cumulative-layout-shift"),
        tbt: audit_numeric(report, "total-blocking-time"),
        tti: audit_numeric(report, "interactive"),
        dcl: number_at(report, &format!("{}/observedDomContentLoaded", METRICS_ITEM)),
    }
}

/// Audits whose `details.type` equals `kind`, in document order.
fn audits_of_type<'a>(
    report: &'a AuditDocument,
    kind: &'a str,
) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
    report
        .get("audits")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|audits| audits.iter())
        .filter(move |(_, audit)| {
            audit.pointer("/details/type").and_then(Value::as_str) == Some(kind)
        })
}

fn text(audit: &Value, field: &str) -> String {
    audit
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn extract_opportunities(report: &AuditDocument) -> Vec<Opportunity> {
    audits_of_type(report, "opportunity")
        .map(|(id, audit)| {
            let savings = audit
                .pointer("/details/overallSavingsMs")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            Opportunity {
                id: id.clone(),
                title: text(audit, "title"),
                description: text(audit, "description"),
                savings: format!("{}ms", savings),
            }
        })
        .collect()
}

fn extract_diagnostics(report: &AuditDocument) -> Vec<Diagnostic> {
    audits_of_type(report, "diagnostic")
        .map(|(id, audit)| Diagnostic {
            id: id.clone(),
            title: text(audit, "title"),
            description: text(audit, "description"),
            details: audit.get("details").cloned().unwrap_or(Value::Null),
        })
        .collect()
}

fn extract_resource_summary(report: &AuditDocument) -> ResourceSummary {
    let mut summary = ResourceSummary::default();

    let Some(audit) = report
        .get("audits")
        .and_then(|audits| audits.get(RESOURCE_SUMMARY_AUDIT))
    else {
        return summary;
    };

    let items = audit
        .pointer("/details/items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    summary.total_requests = items.len();

    for item in items {
        let size = item.get("transferSize").map(byte_count).unwrap_or(0);
        summary.total_transfer_size += size;

        if let Some(resource_type) = item.get("resourceType").and_then(Value::as_str) {
            let entry = summary
                .breakdown
                .entry(resource_type.to_string())
                .or_insert_with(ResourceBreakdown::default);
            entry.size += size;
            entry.count += 1;
        }
    }

    summary
}

fn byte_count(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| *v > 0.0).map(|v| v as u64))
        .unwrap_or(0)
}
