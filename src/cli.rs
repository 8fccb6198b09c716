//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and assembling the task to run.

use crate::config::StorageBackend;
use crate::models::{StageResult, TaskRequest};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};

/// perfscan - two-phase web performance audit worker
///
/// The collect stage runs PageSpeed audits for every category and device
/// strategy and stores the raw results. The process stage merges them into
/// one report per strategy and derives a compact summary.
///
/// Examples:
///   perfscan --operation collect --slug abc123 --url https://example.com
///   perfscan --operation process --slug abc123 --sequence stages.json
///   perfscan --task task.json --callback-url https://orchestrator/results
///   perfscan --task process.json --output report.md
///   echo '{"task":"collect","slug":"abc","url":"https://example.com"}' | perfscan --task -
///   perfscan --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Task document to run (JSON; use "-" for stdin)
    ///
    /// Shape: {"task": "collect"|"process", "slug": "...", "url": "...", "sequence": [...]}
    #[arg(long, value_name = "FILE", conflicts_with = "operation")]
    pub task: Option<PathBuf>,

    /// Operation to run when not using --task
    #[arg(long, value_name = "OP", requires = "slug")]
    pub operation: Option<OperationArg>,

    /// Job identifier used to namespace storage keys
    #[arg(short, long)]
    pub slug: Option<String>,

    /// URL to audit (collect)
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// Prior stage outputs as a JSON array of {"name", "output"} (process)
    #[arg(long, value_name = "FILE")]
    pub sequence: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .perfscan.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// PageSpeed Insights endpoint
    #[arg(long, value_name = "URL", env = "PAGESPEED_API_URL")]
    pub api_url: Option<String>,

    /// PageSpeed Insights API key
    #[arg(long, value_name = "KEY", env = "PAGESPEED_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-audit request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Artifact store backend
    #[arg(long, value_name = "BACKEND")]
    pub storage: Option<StorageBackend>,

    /// Root directory for the fs backend
    #[arg(long, value_name = "DIR", env = "PERFSCAN_STORAGE_ROOT")]
    pub storage_root: Option<PathBuf>,

    /// Base URL for the http backend
    #[arg(long, value_name = "URL", env = "PERFSCAN_STORAGE_URL")]
    pub storage_url: Option<String>,

    /// Where to POST the task result (stdout when unset)
    #[arg(long, value_name = "URL", env = "PERFSCAN_CALLBACK_URL")]
    pub callback_url: Option<String>,

    /// Also write a summary of processed reports to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Summary format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Run against an in-memory store and print the result instead of reporting it
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .perfscan.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Operation selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OperationArg {
    Collect,
    Process,
}

impl OperationArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationArg::Collect => "collect",
            OperationArg::Process => "process",
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.task.is_none() && self.operation.is_none() {
            return Err("Either --task or --operation is required".to_string());
        }

        if let Some(ref url) = self.url {
            if !is_http_url(url) {
                return Err("URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref api_url) = self.api_url {
            if !is_http_url(api_url) {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref callback_url) = self.callback_url {
            if !is_http_url(callback_url) {
                return Err("Callback URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Assemble the task to run from --task or the individual flags.
    pub fn build_task(&self) -> Result<TaskRequest> {
        if let Some(ref path) = self.task {
            let content = read_input(path)?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse task document: {}", path.display()));
        }

        let operation = self
            .operation
            .context("No operation given (use --task or --operation)")?;

        let sequence = match self.sequence {
            Some(ref path) => {
                let content = read_input(path)?;
                serde_json::from_str::<Vec<StageResult>>(&content).with_context(|| {
                    format!("Failed to parse stage sequence: {}", path.display())
                })?
            }
            None => Vec::new(),
        };

        Ok(TaskRequest {
            task: operation.as_str().to_string(),
            slug: self.slug.clone().unwrap_or_default(),
            url: self.url.clone(),
            sequence,
        })
    }
}

/// Read a file, or stdin when the path is "-".
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        return Ok(content);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            task: None,
            operation: Some(OperationArg::Collect),
            slug: Some("abc123".to_string()),
            url: Some("https://example.com".to_string()),
            sequence: None,
            config: None,
            api_url: None,
            api_key: None,
            timeout: None,
            storage: None,
            storage_root: None,
            storage_url: None,
            callback_url: None,
            output: None,
            format: OutputFormat::Markdown,
            dry_run: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_requires_task_or_operation() {
        let mut args = make_args();
        assert!(args.validate().is_ok());

        args.operation = None;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.url = Some("example.com".to_string());
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.callback_url = Some("ftp://host".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_build_task_from_flags() {
        let task = make_args().build_task().unwrap();
        assert_eq!(task.task, "collect");
        assert_eq!(task.slug, "abc123");
        assert_eq!(task.url.as_deref(), Some("https://example.com"));
        assert!(task.sequence.is_empty());
    }

    #[test]
    fn test_build_task_from_files() {
        let dir = tempfile::TempDir::new().unwrap();

        let sequence_path = dir.path().join("stages.json");
        std::fs::write(
            &sequence_path,
            r#"[{"name":"collect","output":"[\"scans/2024/1/a.seo.mobile.json\"]"}]"#,
        )
        .unwrap();
        let mut args = make_args();
        args.operation = Some(OperationArg::Process);
        args.url = None;
        args.sequence = Some(sequence_path);
        let task = args.build_task().unwrap();
        assert_eq!(task.task, "process");
        assert_eq!(task.sequence.len(), 1);

        let task_path = dir.path().join("task.json");
        std::fs::write(&task_path, r#"{"task":"collect","slug":"s","url":"https://a.b"}"#).unwrap();
        let mut args = make_args();
        args.operation = None;
        args.task = Some(task_path);
        let task = args.build_task().unwrap();
        assert_eq!(task.slug, "s");
    }
}
