//! HTTP request types

use crate::config::FetchConfig;
use crate::utils::{error::NetworkError, Result};
use std::collections::HashMap;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// HTTP GET request
#[derive(Debug, Clone)]
pub struct Request {
    url: Url,
    headers: HashMap<String, String>,
}

impl Request {
    /// Create a GET request; only http(s) URLs are accepted
    pub fn get(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|_| NetworkError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NetworkError::InvalidUrl(url.to_string()).into());
        }
        Ok(Self {
            url: parsed,
            headers: HashMap::new(),
        })
    }

    /// GET request carrying the headers a desktop browser would send
    pub fn page(url: &str, config: &FetchConfig) -> Result<Self> {
        Ok(Self::get(url)?
            .header("User-Agent", &config.user_agent)
            .header("Accept", ACCEPT_HTML)
            .header("Accept-Language", &config.accept_language)
            .header("DNT", "1"))
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Get the URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}
