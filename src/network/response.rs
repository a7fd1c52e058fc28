//! HTTP response types

use std::collections::HashMap;

/// HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: String,
}

impl Response {
    /// Create a new response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Create a new response with headers; names are stored lower-cased
    pub fn with_headers(
        status: u16,
        body: impl Into<String>,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            status,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
            body: body.into(),
        }
    }

    /// An HTML document response
    pub fn html(body: impl Into<String>) -> Self {
        let mut response = Self::new(200, body);
        response.add_header("content-type", "text/html; charset=utf-8");
        response
    }

    /// Get the status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Check if the response was successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    /// Get the content type from headers
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(|s| s.as_str())
    }

    /// Whether the content type names an HTML document
    ///
    /// A missing content type counts as HTML.
    pub fn is_html(&self) -> bool {
        match self.content_type() {
            Some(ct) => {
                let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
                mime == "text/html" || mime == "application/xhtml+xml"
            }
            None => true,
        }
    }

    /// Get a specific header
    pub fn header(&self, key: &str) -> Option<&String> {
        self.headers.get(&key.to_ascii_lowercase())
    }

    /// Add a header
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into().to_ascii_lowercase(), value.into());
    }
}
