//! Loading dataset bytes from local paths or `http(s)` URLs.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::debug;

/// Returns `true` if `source` should be fetched over HTTP instead of read
/// from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads a dataset from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %source))]
pub async fn load_source(source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        let client = BasicClient::new()?;
        client
            .get_bytes(source)
            .await
            .with_context(|| format!("Failed to fetch {source}"))?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("Failed to read {source}"))?
    };

    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}
