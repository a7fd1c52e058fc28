//! Kakao "send to me" memo channel

use super::{check_response, Notice, Notifier};
use crate::config::KakaoConfig;
use crate::utils::error::NotifyError;
use async_trait::async_trait;
use serde_json::json;

pub struct KakaoNotifier {
    api_key: Option<String>,
    endpoint: String,
    client: reqwest::Client,
}

impl KakaoNotifier {
    pub fn new(config: &KakaoConfig) -> Self {
        Self {
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
            endpoint: config.endpoint.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// The `template_object` form field: a text template linking back to the page
    pub fn template_object(notice: &Notice) -> String {
        json!({
            "object_type": "text",
            "text": notice.message(),
            "link": { "web_url": notice.url },
        })
        .to_string()
    }
}

#[async_trait]
impl Notifier for KakaoNotifier {
    fn name(&self) -> &str {
        "kakao"
    }

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| NotifyError::MissingCredential("kakao.api_key".into()))?;

        let template = Self::template_object(notice);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .form(&[("template_object", template.as_str())])
            .send()
            .await
            .map_err(|e| NotifyError::Transport(format!("Kakao request failed: {e}")))?;

        check_response(self.name(), response).await
    }
}
