//! Page fetching
//!
//! The tagging core only ever sees a serialized HTML document; everything
//! that talks to the outside world goes through [`PageFetcher`].

mod client;
mod request;
mod response;

pub use client::HttpPageFetcher;
pub use request::Request;
pub use response::Response;

use crate::utils::Result;
use async_trait::async_trait;

/// Source of HTML documents
///
/// Implementations fail with `NetworkError::NotHtml` for anything that is
/// not an HTML document and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the successful HTML response
    async fn fetch(&self, url: &str) -> Result<Response>;
}
