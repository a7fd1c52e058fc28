//! Application configuration
//!
//! Loaded from TOML. `${VAR}` placeholders are replaced from the environment
//! before parsing, so credentials can stay out of the file.

use crate::labels::{LabelPalette, LabelStyle};
use crate::renderer::html::DEFAULT_BLOCKED_HOSTS;
use crate::renderer::HtmlParser;
use crate::utils::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";
pub const DEFAULT_KAKAO_ENDPOINT: &str = "https://kapi.kakao.com/v2/api/talk/memo/default/send";
pub const DEFAULT_EMAIL_SUBJECT: &str = "크롤링 알림";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    /// Labels in display and border-priority order
    pub labels: Vec<LabelStyle>,
    pub kakao: KakaoConfig,
    pub email: EmailConfig,
}

impl AppConfig {
    /// Palette built from the configured labels
    pub fn palette(&self) -> LabelPalette {
        LabelPalette::from_styles(&self.labels)
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch.timeout_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.labels.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "labels".into(),
                message: "at least one label is required".into(),
            });
        }
        if let Some(style) = self.labels.iter().find(|s| s.name.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "labels.name".into(),
                message: format!("empty label name (color {})", style.color),
            });
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            labels: default_labels(),
            kakao: KakaoConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

fn default_labels() -> Vec<LabelStyle> {
    [
        ("번호", "blue"),
        ("제목", "green"),
        ("날짜", "yellow"),
        ("조회수", "orange"),
        ("링크", "purple"),
    ]
    .into_iter()
    .map(|(name, color)| LabelStyle {
        name: name.into(),
        color: color.into(),
    })
    .collect()
}

/// Page fetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_secs: u64,
    /// Keep non-tracker scripts in the rendered document
    pub allow_scripts: bool,
    pub blocked_hosts: Vec<String>,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sanitizing parser matching these settings
    pub fn parser(&self) -> HtmlParser {
        HtmlParser::new()
            .with_scripts(self.allow_scripts)
            .with_blocked_hosts(self.blocked_hosts.clone())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.into(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.into(),
            timeout_secs: 30,
            allow_scripts: false,
            blocked_hosts: DEFAULT_BLOCKED_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

/// Kakao "send to me" memo API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KakaoConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
}

impl Default for KakaoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_KAKAO_ENDPOINT.into(),
        }
    }
}

/// SMTP account used for e-mail notices
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// SMTP server, reached over implicit TLS
    pub host: String,
    pub port: u16,
    /// SMTP username, also the sender unless `from` is set
    pub user: Option<String>,
    /// SMTP password, usually `${EMAIL_PASS}`
    pub password: Option<String>,
    pub from: Option<String>,
    pub subject: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.into(),
            port: DEFAULT_SMTP_PORT,
            user: None,
            password: None,
            from: None,
            subject: DEFAULT_EMAIL_SUBJECT.into(),
        }
    }
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string
    pub fn load_str(content: &str) -> Result<AppConfig, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: AppConfig = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
        match path {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Self::load(path)
            }
            None => Ok(AppConfig::default()),
        }
    }

    /// Expand environment variables in the format `${VAR}`
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::InvalidValue {
            field: "placeholder".into(),
            message: e.to_string(),
        })?;

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }
        Ok(result)
    }
}
