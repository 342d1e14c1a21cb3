use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::EmailSender;
use crate::config::EmailConfig;

const CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

/// Sends transactional email through the Resend API.
#[derive(Clone)]
pub struct ResendSender {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl ResendSender {
    pub fn new(cfg: &EmailConfig, api_key: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build email http client")?;
        Ok(Self {
            client,
            api_url: cfg.api_url.clone(),
            api_key: api_key.to_string(),
            from: cfg.sender.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for ResendSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let body = SendEmailRequest {
            from: &self.from,
            to: vec![to],
            subject,
            html,
        };

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("resend request")?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            warn!(%status, to = %to, "resend rejected email");
            anyhow::bail!("resend returned {status}: {text}");
        }

        let parsed: SendEmailResponse = res.json().await.context("decode resend response")?;
        match parsed.id {
            Some(id) => {
                debug!(to = %to, email_id = %id, "email accepted by resend");
                Ok(())
            }
            None => anyhow::bail!("resend response carried no message id"),
        }
    }
}
