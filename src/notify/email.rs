//! E-mail channel over SMTP

use super::{Notice, Notifier};
use crate::config::EmailConfig;
use crate::utils::error::NotifyError;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Addressing and text of one mail, before MIME encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl MailDraft {
    /// Encode into a plain-text message
    pub fn message(&self) -> Result<Message, NotifyError> {
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|e| NotifyError::InvalidMessage(format!("from `{}`: {e}", self.from)))?;
        let to: Mailbox = self
            .to
            .parse()
            .map_err(|e| NotifyError::InvalidMessage(format!("to `{}`: {e}", self.to)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(self.text.clone())
            .map_err(|e| NotifyError::InvalidMessage(e.to_string()))
    }
}

pub struct EmailNotifier {
    host: String,
    port: u16,
    user: Option<String>,
    password: Option<String>,
    from: Option<String>,
    subject: String,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> Self {
        let user = config.user.clone().filter(|user| !user.is_empty());
        Self {
            host: config.host.clone(),
            port: config.port,
            from: config
                .from
                .clone()
                .filter(|from| !from.is_empty())
                .or_else(|| user.clone()),
            user,
            password: config.password.clone().filter(|pass| !pass.is_empty()),
            subject: config.subject.clone(),
        }
    }

    /// Build the mail for a notice; fails when sender or recipient is missing
    pub fn draft(&self, notice: &Notice) -> Result<MailDraft, NotifyError> {
        let to = notice
            .destination
            .as_deref()
            .map(str::trim)
            .filter(|to| !to.is_empty())
            .ok_or_else(|| NotifyError::MissingCredential("email recipient".into()))?;
        let from = self
            .from
            .clone()
            .ok_or_else(|| NotifyError::MissingCredential("email.user".into()))?;

        Ok(MailDraft {
            from,
            to: to.to_string(),
            subject: self.subject.clone(),
            text: format!("{}\nURL: {}", notice.message(), notice.url),
        })
    }

    fn credentials(&self) -> Result<Credentials, NotifyError> {
        let user = self
            .user
            .clone()
            .ok_or_else(|| NotifyError::MissingCredential("email.user".into()))?;
        let password = self
            .password
            .clone()
            .ok_or_else(|| NotifyError::MissingCredential("email.password".into()))?;
        Ok(Credentials::new(user, password))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let message = self.draft(notice)?.message()?;
        let credentials = self.credentials()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .map_err(|e| NotifyError::Transport(format!("SMTP relay {}: {e}", self.host)))?
            .port(self.port)
            .credentials(credentials)
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(format!("SMTP delivery failed: {e}")))?;
        log::info!("{} notification delivered via {}", self.name(), self.host);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn notifier() -> EmailNotifier {
        EmailNotifier::new(&EmailConfig {
            user: Some("bot@example.com".into()),
            password: Some("app-password".into()),
            ..EmailConfig::default()
        })
    }

    #[test]
    fn test_draft_body() {
        let notice = Notice::new("https://board.example/list", "제목: 공지 1")
            .with_destination("me@example.com");
        assert_eq!(
            notifier().draft(&notice).unwrap(),
            MailDraft {
                from: "bot@example.com".into(),
                to: "me@example.com".into(),
                subject: "크롤링 알림".into(),
                text: "공지사항: 제목: 공지 1\nURL: https://board.example/list".into(),
            }
        );
    }

    #[test]
    fn test_message_envelope() {
        let notice = Notice::new("https://board.example/list", "제목: 공지 1")
            .with_destination("me@example.com");
        let message = notifier().draft(&notice).unwrap().message().unwrap();

        let envelope = message.envelope();
        assert_eq!(
            envelope.from().map(ToString::to_string).as_deref(),
            Some("bot@example.com")
        );
        let to: Vec<String> = envelope.to().iter().map(ToString::to_string).collect();
        assert_eq!(to, vec!["me@example.com".to_string()]);
        assert!(!message.formatted().is_empty());
    }

    #[test]
    fn test_explicit_from_overrides_user() {
        let notifier = EmailNotifier::new(&EmailConfig {
            user: Some("bot@example.com".into()),
            from: Some("alerts@example.com".into()),
            ..EmailConfig::default()
        });
        let notice = Notice::new("u", "c").with_destination("me@example.com");
        assert_eq!(notifier.draft(&notice).unwrap().from, "alerts@example.com");
    }

    #[test]
    fn test_bad_recipient_address() {
        let notice = Notice::new("u", "c").with_destination("not an address");
        let result = notifier().draft(&notice).unwrap().message();
        assert!(matches!(result, Err(NotifyError::InvalidMessage(_))));
    }

    #[test]
    fn test_empty_recipient_is_rejected() {
        let notice = Notice::new("u", "c").with_destination("  ");
        assert!(matches!(
            notifier().draft(&notice),
            Err(NotifyError::MissingCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_password() {
        let notifier = EmailNotifier::new(&EmailConfig {
            user: Some("bot@example.com".into()),
            ..EmailConfig::default()
        });
        let notice = Notice::new("u", "c").with_destination("me@example.com");
        let result = notifier.send(&notice).await;
        assert!(
            matches!(result, Err(NotifyError::MissingCredential(name)) if name == "email.password")
        );
    }
}
