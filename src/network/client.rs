//! HTTP page fetcher backed by reqwest

use super::{PageFetcher, Request, Response};
use crate::config::FetchConfig;
use crate::utils::{error::NetworkError, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// Fetches pages over HTTP with browser-like headers
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpPageFetcher {
    /// Create a fetcher from fetch settings
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(NetworkError::from)?;
        Ok(Self { client, config })
    }

    /// Execute an HTTP request
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let mut builder = self.client.get(request.url().clone());
        for (key, value) in request.headers() {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(NetworkError::from)?;
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                Some((name.as_str().to_string(), value.to_str().ok()?.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(NetworkError::from)?;
        Ok(Response::with_headers(status, body, headers))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<Response> {
        let request = Request::page(url, &self.config)?;
        let response = self.execute(request).await?;

        if !response.is_success() {
            let reason = reqwest::StatusCode::from_u16(response.status())
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("request failed");
            return Err(NetworkError::Http(response.status(), reason.to_string()).into());
        }
        if !response.is_html() {
            let content_type = response.content_type().unwrap_or_default().to_string();
            return Err(NetworkError::NotHtml(content_type).into());
        }

        log::info!("Fetched {url} ({} bytes)", response.body().len());
        Ok(response)
    }
}
