//! Object store reached over plain HTTP GET/PUT.
//!
//! Works with any endpoint that serves `{base_url}/{key}` for reads and
//! accepts a PUT body at the same URL for writes.

use super::ArtifactStore;
use crate::error::{Result, WorkerError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

/// HTTP-backed artifact store.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpStore {
    /// Create a store rooted at `base_url`.
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| WorkerError::storage(base_url, e))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// URL an object with `key` lives at.
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ArtifactStore for HttpStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let url = self.object_url(key);
        debug!("PUT {} ({} bytes)", url, bytes.len());

        let response = self
            .http_client
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| WorkerError::storage(key, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::storage(
                key,
                format!("PUT returned {}: {}", status, body),
            ));
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let url = self.object_url(key);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| WorkerError::storage(key, e))?;

        if !response.status().is_success() {
            return Err(WorkerError::storage(
                key,
                format!("GET returned {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WorkerError::storage(key, e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url() {
        let store = HttpStore::new("https://storage.example.com/bucket/", 5).unwrap();
        assert_eq!(
            store.object_url("scans/2024/1/abc.mobile.json"),
            "https://storage.example.com/bucket/scans/2024/1/abc.mobile.json"
        );
    }
}
