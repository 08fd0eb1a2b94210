//! Share-by-email service.
//!
//! Sending is best effort: a failed delivery logs a warning and reports
//! `false` instead of failing the request.

use bramble_common::{config::MailConfig, AppError, AppResult};
use bramble_db::entities::post;
use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Deserialize;
use validator::Validate;

/// Input for recommending a post by email.
#[derive(Debug, Deserialize, Validate)]
pub struct SharePostInput {
    /// Sender's display name.
    #[validate(length(min = 1, max = 25))]
    pub name: String,
    /// Sender's email address.
    #[validate(email)]
    pub email: String,
    /// Recipient's email address.
    #[validate(email)]
    pub to: String,
    /// Optional note from the sender.
    pub comments: Option<String>,
}

/// Mailer service backed by an SMTP relay.
///
/// Built without mail configuration, the service accepts requests but sends
/// nothing.
#[derive(Clone)]
pub struct MailerService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl MailerService {
    /// Build a mailer from the optional mail configuration.
    pub fn new(config: Option<&MailConfig>) -> AppResult<Self> {
        let Some(config) = config else {
            return Ok(Self {
                transport: None,
                from_address: String::new(),
            });
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::Mail(format!("Invalid SMTP relay: {e}")))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: Some(builder.build()),
            from_address: config.from_address.clone(),
        })
    }

    /// A mailer that drops everything. For wiring without SMTP.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            transport: None,
            from_address: String::new(),
        }
    }

    /// Whether a transport is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Recommend a post to someone by email. Returns whether a mail was
    /// actually sent.
    pub async fn share_post(
        &self,
        post: &post::Model,
        post_url: &str,
        input: &SharePostInput,
    ) -> AppResult<bool> {
        input.validate()?;

        let subject = share_subject(&input.name, &post.title);
        let body = share_body(&post.title, post_url, &input.name, input.comments.as_deref());

        let Some(ref transport) = self.transport else {
            tracing::info!(to = %input.to, subject = %subject, "Mail disabled, not sending");
            return Ok(false);
        };

        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|e| AppError::Mail(format!("Invalid from address: {e}")))?;
        let to: Mailbox = input
            .to
            .parse()
            .map_err(|e| AppError::Validation(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from)
            .reply_to(
                input
                    .email
                    .parse()
                    .map_err(|e| AppError::Validation(format!("Invalid sender address: {e}")))?,
            )
            .to(to)
            .subject(&subject)
            .body(body)
            .map_err(|e| AppError::Mail(format!("Failed to build message: {e}")))?;

        match transport.send(message).await {
            Ok(_) => {
                tracing::info!(to = %input.to, subject = %subject, "Share mail sent");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(error = %e, to = %input.to, "Failed to send share mail");
                Ok(false)
            }
        }
    }
}

/// Subject line for a share mail.
#[must_use]
pub fn share_subject(sender_name: &str, post_title: &str) -> String {
    format!("{sender_name} recommends you read {post_title}")
}

/// Plain-text body for a share mail.
#[must_use]
pub fn share_body(
    post_title: &str,
    post_url: &str,
    sender_name: &str,
    comments: Option<&str>,
) -> String {
    let mut body = format!("Read {post_title} at {post_url}");
    if let Some(comments) = comments.filter(|c| !c.trim().is_empty()) {
        body.push_str(&format!("\n\n{sender_name}'s comments: {comments}"));
    }
    body
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bramble_db::entities::post::PostStatus;
    use chrono::Utc;
    use serde_json::json;

    fn create_test_post() -> post::Model {
        post::Model {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            title: "Learning Rust".to_string(),
            slug: "learning-rust".to_string(),
            body: "body".to_string(),
            status: PostStatus::Published,
            tags: json!([]),
            published_at: Utc::now().into(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_share_subject_format() {
        assert_eq!(
            share_subject("Alice", "Learning Rust"),
            "Alice recommends you read Learning Rust"
        );
    }

    #[test]
    fn test_share_body_with_comments() {
        let body = share_body(
            "Learning Rust",
            "https://example.com/p/1",
            "Alice",
            Some("Great read"),
        );
        assert!(body.contains("Read Learning Rust at https://example.com/p/1"));
        assert!(body.contains("Alice's comments: Great read"));
    }

    #[test]
    fn test_share_body_without_comments() {
        let body = share_body("Learning Rust", "https://example.com/p/1", "Alice", None);
        assert!(!body.contains("comments"));

        let blank = share_body(
            "Learning Rust",
            "https://example.com/p/1",
            "Alice",
            Some("   "),
        );
        assert!(!blank.contains("comments"));
    }

    #[tokio::test]
    async fn test_disabled_mailer_reports_not_sent() {
        let mailer = MailerService::disabled();
        assert!(!mailer.is_enabled());

        let input = SharePostInput {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            to: "bob@example.com".to_string(),
            comments: None,
        };
        let sent = mailer
            .share_post(&create_test_post(), "https://example.com/p/1", &input)
            .await
            .unwrap();
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_share_validates_recipient() {
        let mailer = MailerService::disabled();

        let input = SharePostInput {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            to: "not-an-email".to_string(),
            comments: None,
        };
        let result = mailer
            .share_post(&create_test_post(), "https://example.com/p/1", &input)
            .await;
        assert!(result.is_err());
    }
}
