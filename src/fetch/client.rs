use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Method, Request, Response};

/// Transport used to pull remote datasets. Implementors only supply
/// `execute`; `get_bytes` adds the download semantics on top.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;

    /// GETs `url` and returns the body, failing on a non-success status.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let req = Request::new(Method::GET, url.parse()?);
        let resp = self.execute(req).await?.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}
