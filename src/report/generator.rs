//! Summary report generation.
//!
//! This module renders the process stage's per-strategy results as a
//! Markdown summary for people to read.

use crate::cli::OutputFormat;
use crate::models::{SimplifiedReport, StrategyResult};
use anyhow::{Context, Result};
use std::path::Path;

/// How many opportunities to list per strategy.
const TOP_OPPORTUNITIES: usize = 5;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(slug: &str, results: &[StrategyResult]) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Performance Report: {}\n\n", slug));

    if results.is_empty() {
        output.push_str("No strategies were consolidated for this job.\n\n");
        output.push_str(&generate_footer());
        return output;
    }

    output.push_str(&generate_metadata_section(&results[0].simplified_report));
    output.push_str(&generate_scores_section(results));
    output.push_str(&generate_timings_section(results));

    for result in results {
        output.push_str(&generate_strategy_section(result));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &SimplifiedReport) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **URL:** {}\n", report.url));
    if report.final_url != report.url && !report.final_url.is_empty() {
        section.push_str(&format!("- **Final URL:** {}\n", report.final_url));
    }
    section.push_str(&format!("- **Fetched:** {}\n", report.fetch_time));
    section.push_str(&format!(
        "- **Lighthouse:** `{}`\n",
        report.lighthouse_version
    ));
    section.push_str(&format!("- **Locale:** {}\n", report.config.locale));

    for warning in &report.run_warnings {
        if let Some(text) = warning.as_str() {
            section.push_str(&format!("- **Warning:** {}\n", text));
        }
    }
    section.push('\n');

    section
}

/// Score badge for a 0-100 value.
fn score_badge(score: f64) -> &'static str {
    if score >= 90.0 {
        "🟢"
    } else if score >= 50.0 {
        "🟠"
    } else {
        "🔴"
    }
}

fn score_cell(score: f64) -> String {
    format!("{} {:.0}", score_badge(score), score)
}

/// Generate the category score table.
fn generate_scores_section(results: &[StrategyResult]) -> String {
    let mut section = String::new();

    section.push_str("## Scores\n\n");
    section.push_str("| Strategy | Performance | Accessibility | Best Practices | SEO |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");

    for result in results {
        let report = &result.simplified_report;
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            report.mode,
            score_cell(report.scores.performance),
            score_cell(report.scores.accessibility),
            score_cell(report.scores.best_practices),
            score_cell(report.scores.seo),
        ));
    }
    section.push('\n');

    section
}

/// Generate the timings table.
fn generate_timings_section(results: &[StrategyResult]) -> String {
    let mut section = String::new();

    section.push_str("## Timings\n\n");
    section.push_str("| Strategy | TTFB | FCP | LCP | SI | CLS | TBT | TTI | DCL |\n");
    section.push_str("|:---|---:|---:|---:|---:|---:|---:|---:|---:|\n");

    for result in results {
        let report = &result.simplified_report;
        let t = &report.timings;
        section.push_str(&format!(
            "| {} | {:.0} ms | {:.0} ms | {:.0} ms | {:.0} ms | {:.3} | {:.0} ms | {:.0} ms | {:.0} ms |\n",
            report.mode,
            t.ttfb,
            t.fcp,
            t.lcp,
            t.si,
            t.cls,
            t.tbt,
            t.tti,
            t.dcl
        ));
    }
    section.push('\n');

    section
}

/// Generate the detail section for one strategy.
fn generate_strategy_section(result: &StrategyResult) -> String {
    let report = &result.simplified_report;
    let mut section = String::new();

    section.push_str(&format!("## {} details\n\n", report.mode));
    section.push_str(&format!(
        "*Audit time: {:.1}s | Form factor: {} | Full report: `{}`*\n\n",
        report.total_audit_time / 1000.0,
        report.config.emulated_form_factor,
        result.storage_keys.full
    ));

    if !report.opportunities.is_empty() {
        section.push_str("### Top Opportunities\n\n");
        section.push_str("| Audit | Savings |\n");
        section.push_str("|:---|---:|\n");
        for opportunity in report.opportunities.iter().take(TOP_OPPORTUNITIES) {
            section.push_str(&format!(
                "| {} (`{}`) | {} |\n",
                opportunity.title, opportunity.id, opportunity.savings
            ));
        }
        if report.opportunities.len() > TOP_OPPORTUNITIES {
            section.push_str(&format!(
                "\n*...and {} more.*\n",
                report.opportunities.len() - TOP_OPPORTUNITIES
            ));
        }
        section.push('\n');
    }

    if !report.diagnostics.is_empty() {
        section.push_str(&format!(
            "**Diagnostics:** {}\n\n",
            report
                .diagnostics
                .iter()
                .map(|d| format!("`{}`", d.id))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    let resources = &report.resource_summary;
    if resources.total_requests > 0 {
        section.push_str("### Resources\n\n");
        section.push_str(&format!(
            "{} requests, {} bytes transferred.\n\n",
            resources.total_requests, resources.total_transfer_size
        ));
        section.push_str("| Type | Requests | Bytes |\n");
        section.push_str("|:---|:---:|---:|\n");
        for (resource_type, breakdown) in &resources.breakdown {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                resource_type, breakdown.count, breakdown.size
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by perfscan*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(results: &[StrategyResult]) -> Result<String> {
    serde_json::to_string_pretty(results).map_err(Into::into)
}

/// Render the report in `format` and write it to `path`.
pub fn write_report(
    slug: &str,
    results: &[StrategyResult],
    format: OutputFormat,
    path: &Path,
) -> Result<()> {
    let content = match format {
        OutputFormat::Markdown => generate_markdown_report(slug, results),
        OutputFormat::Json => generate_json_report(results)?,
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AuditConfig, CategoryScores, Opportunity, ResourceBreakdown, ResourceSummary,
        StorageKeys, Strategy, Timings,
    };
    use serde_json::json;

    fn create_test_result() -> StrategyResult {
        let mut breakdown = indexmap::IndexMap::new();
        breakdown.insert("script".to_string(), ResourceBreakdown { size: 2048, count: 3 });

        StrategyResult {
            simplified_report: SimplifiedReport {
                mode: Strategy::Mobile,
                lighthouse_version: "12.2.1".to_string(),
                fetch_time: "2024-05-01T10:00:00.000Z".to_string(),
                run_warnings: vec![json!("Slow server")],
                user_agent: "UA".to_string(),
                url: "https://example.com".to_string(),
                final_url: "https://example.com/".to_string(),
                scores: CategoryScores {
                    performance: 87.0,
                    accessibility: 92.0,
                    best_practices: 100.0,
                    seo: 45.0,
                },
                timings: Timings {
                    lcp: 2500.0,
                    cls: 0.05,
                    ..Default::default()
                },
                opportunities: vec![Opportunity {
                    id: "unused-javascript".to_string(),
                    title: "Reduce unused JavaScript".to_string(),
                    description: String::new(),
                    savings: "450ms".to_string(),
                }],
                diagnostics: vec![],
                resource_summary: ResourceSummary {
                    total_requests: 3,
                    total_transfer_size: 2048,
                    breakdown,
                },
                config: AuditConfig {
                    emulated_form_factor: "mobile".to_string(),
                    locale: "en-US".to_string(),
                },
                total_audit_time: 12000.0,
            },
            storage_keys: StorageKeys {
                full: "scans/2024/5/abc.mobile.json".to_string(),
                min: "scans/2024/5/abc.mobile.min.json".to_string(),
            },
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report("abc", &[create_test_result()]);

        assert!(markdown.contains("# Performance Report: abc"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("Slow server"));
        assert!(markdown.contains("## Scores"));
        assert!(markdown.contains("🟠 87"));
        assert!(markdown.contains("🟢 100"));
        assert!(markdown.contains("🔴 45"));
        assert!(markdown.contains("2500 ms"));
        assert!(markdown.contains("Reduce unused JavaScript"));
        assert!(markdown.contains("| script | 3 | 2048 |"));
        assert!(markdown.contains("scans/2024/5/abc.mobile.json"));
    }

    #[test]
    fn test_empty_results() {
        let markdown = generate_markdown_report("abc", &[]);
        assert!(markdown.contains("No strategies"));
        assert!(!markdown.contains("## Scores"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&[create_test_result()]).unwrap();

        assert!(json.contains("\"simplifiedReport\""));
        assert!(json.contains("\"storageKeys\""));
        assert!(json.contains("\"resourceSummary\""));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::TempDir::new().unwrap();

        let md_path = dir.path().join("report.md");
        write_report("abc", &[create_test_result()], OutputFormat::Markdown, &md_path).unwrap();
        let content = std::fs::read_to_string(&md_path).unwrap();
        assert!(content.starts_with("# Performance Report: abc"));

        let json_path = dir.path().join("report.json");
        write_report("abc", &[create_test_result()], OutputFormat::Json, &json_path).unwrap();
        let content = std::fs::read_to_string(&json_path).unwrap();
        let parsed: Vec<StrategyResult> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
