//! PageSpeed Insights client.
//!
//! Calls the `runPagespeed` endpoint and returns the embedded
//! `lighthouseResult` document.

use super::AuditProvider;
use crate::analysis::AuditDocument;
use crate::error::{Result, WorkerError};
use crate::models::{Category, Strategy};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the PageSpeed client.
#[derive(Debug, Clone)]
pub struct PageSpeedConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for PageSpeedConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.googleapis.com/pagespeedonline/v5/runPagespeed".to_string(),
            api_key: None,
            timeout_seconds: 120,
        }
    }
}

/// HTTP client for the PageSpeed Insights API.
pub struct PageSpeedClient {
    config: PageSpeedConfig,
    http_client: reqwest::Client,
}

impl PageSpeedClient {
    /// Build the client. Fails only if the HTTP stack cannot be initialised.
    pub fn new(config: PageSpeedConfig) -> Result<Self> {
        info!("Initializing PageSpeed client for {}", config.api_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| WorkerError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Query parameters for one audit request.
    fn query_params(
        &self,
        url: &str,
        category: Category,
        strategy: Strategy,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("url", url.to_string()),
            ("category", category.api_param().to_string()),
            ("strategy", strategy.api_param().to_string()),
        ];
        if let Some(ref key) = self.config.api_key {
            params.push(("key", key.clone()));
        }
        params
    }
}

/// Pull the audit document out of a PageSpeed response body.
pub fn extract_lighthouse_result(body: Value, label: &str) -> Result<AuditDocument> {
    let result = match body {
        Value::Object(mut map) => map.remove("lighthouseResult"),
        _ => None,
    };

    match result {
        Some(value @ Value::Object(_)) => AuditDocument::from_value(label, value),
        _ => Err(WorkerError::Provider(format!(
            "Response for {} has no lighthouseResult object",
            label
        ))),
    }
}

#[async_trait]
impl AuditProvider for PageSpeedClient {
    async fn run_audit(
        &self,
        url: &str,
        category: Category,
        strategy: Strategy,
    ) -> Result<AuditDocument> {
        let label = format!("{} {}/{}", url, category, strategy);
        debug!("Requesting audit {}", label);

        let response = self
            .http_client
            .get(&self.config.api_url)
            .query(&self.query_params(url, category, strategy))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WorkerError::Provider(format!(
                        "Audit {} timed out after {}s",
                        label, self.config.timeout_seconds
                    ))
                } else if e.is_connect() {
                    WorkerError::Provider(format!(
                        "Cannot connect to audit API at {}",
                        self.config.api_url
                    ))
                } else {
                    WorkerError::Provider(format!("Failed to send audit request: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::Provider(format!(
                "Audit API error {} for {}: {}",
                status, label, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| WorkerError::Provider(format!("Failed to parse audit response: {}", e)))?;

        let document = extract_lighthouse_result(body, &label)?;
        info!("Audit {} complete", label);
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_default() {
        let config = PageSpeedConfig::default();
        assert!(config.api_url.ends_with("/runPagespeed"));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_query_params() {
        let client = PageSpeedClient::new(PageSpeedConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        })
        .unwrap();

        let params = client.query_params(
            "https://example.com",
            Category::BestPractices,
            Strategy::Desktop,
        );
        assert_eq!(
            params,
            vec![
                ("url", "https://example.com".to_string()),
                ("category", "BEST_PRACTICES".to_string()),
                ("strategy", "DESKTOP".to_string()),
                ("key", "secret".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_lighthouse_result() {
        let body = json!({
            "id": "https://example.com/",
            "lighthouseResult": {"lighthouseVersion": "12.0.0", "audits": {}}
        });
        let doc = extract_lighthouse_result(body, "test").unwrap();
        assert_eq!(doc.get("lighthouseVersion"), Some(&json!("12.0.0")));

        assert!(extract_lighthouse_result(json!({"error": {}}), "test").is_err());
        assert!(extract_lighthouse_result(json!({"lighthouseResult": []}), "test").is_err());
    }
}
