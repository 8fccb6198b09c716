//! Artifact storage.
//!
//! A key-value blob store with put/get semantics. Reads are expected to
//! observe earlier writes to the same key, since the process stage reads
//! back what the collect stage just wrote.

pub mod fs;
pub mod http;
pub mod keys;
pub mod memory;

use crate::error::Result;
use async_trait::async_trait;

pub use fs::FsStore;
pub use http::HttpStore;
pub use keys::{merged_key, raw_key, simplified_key};
pub use memory::MemoryStore;

/// Content type used for every artifact this worker writes.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Blob store the worker persists artifacts to.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any previous object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Read the object stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}
