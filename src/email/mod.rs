//! Outbound email delivery.
//!
//! The auth workflows only see [`EmailSender`]; [`ResendSender`] talks to the
//! Resend HTTP API and [`LogEmailSender`] stands in when no API key is set.

mod resend;
pub mod templates;

use async_trait::async_trait;
use tracing::{debug, info};

pub use resend::ResendSender;

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver one HTML message. `Ok` means the provider accepted it.
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

/// Development sender that logs instead of delivering.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        info!(to = %to, subject = %subject, html_len = html.len(), "email send stub");
        match first_link(html) {
            Some(link) => debug!(to = %to, link = %link, "email link"),
            None => debug!(to = %to, html = %html, "email body"),
        }
        Ok(())
    }
}

/// Target of the first `href="..."` in an HTML body.
pub(crate) fn first_link(html: &str) -> Option<&str> {
    let start = html.find("href=\"")? + "href=\"".len();
    let rest = &html[start..];
    rest.find('"').map(|end| &rest[..end])
}
