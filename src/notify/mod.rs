//! Outbound notification of extracted content

mod email;
mod kakao;

pub use email::{EmailNotifier, MailDraft};
pub use kakao::KakaoNotifier;

use crate::extract::{flatten_contents, ExtractionResult, SelectorContent};
use crate::utils::error::NotifyError;
use async_trait::async_trait;

/// Prefix of every notification message
pub const NOTICE_PREFIX: &str = "공지사항: ";

/// Extracted content ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Page the content was extracted from
    pub url: String,
    /// Channel-specific destination (e-mail address); chat channels ignore it
    pub destination: Option<String>,
    /// Flattened `key: value` lines
    pub content: String,
}

impl Notice {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            destination: None,
            content: content.into(),
        }
    }

    pub fn from_result(url: impl Into<String>, result: &ExtractionResult) -> Self {
        Self::new(url, result.flatten())
    }

    pub fn from_contents(url: impl Into<String>, contents: &[SelectorContent]) -> Self {
        Self::new(url, flatten_contents(contents))
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Message body shared by all channels
    pub fn message(&self) -> String {
        format!("{NOTICE_PREFIX}{}", self.content)
    }
}

/// A delivery channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logs and errors
    fn name(&self) -> &str;

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Turn a non-success response into `NotifyError::Rejected`
async fn check_response(channel: &str, response: reqwest::Response) -> Result<(), NotifyError> {
    let status = response.status();
    if status.is_success() {
        log::info!("{channel} notification delivered");
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotifyError::Rejected {
        channel: channel.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Label;

    #[test]
    fn test_notice_from_result() {
        let result = ExtractionResult::new(vec![
            (Label::from("제목"), "공지 1".into()),
            (Label::from("날짜"), "01.02".into()),
        ]);
        let notice = Notice::from_result("https://board.example", &result)
            .with_destination("me@example.com");
        assert_eq!(notice.message(), "공지사항: 제목: 공지 1\n날짜: 01.02");
        assert_eq!(notice.destination.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn test_notice_from_flat_contents() {
        let contents = vec![SelectorContent {
            selector: "td.subject".into(),
            content: Some("공지 1".into()),
        }];
        assert_eq!(Notice::from_contents("u", &contents).content, "td.subject: 공지 1");
    }
}
