use crate::config::Settings;
use crate::ingest::provider::{build_http_client, join_url};
use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(Debug, Clone)]
pub struct ResendClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ResendClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_resend_api_key()?.to_string();
        let base_url = settings
            .resend_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            http: build_http_client(settings.provider_timeout_secs, "resend")?,
            api_key,
            base_url,
        })
    }

    /// Sends one email and returns the provider's message id.
    pub async fn send(&self, message: &EmailMessage) -> anyhow::Result<String> {
        anyhow::ensure!(!message.to.is_empty(), "email must have at least one recipient");

        let url = join_url(&self.base_url, "/emails");
        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .context("resend request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read resend response body")?;
        if !status.is_success() {
            anyhow::bail!("resend HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<SendEmailResponse>(&text)
            .with_context(|| format!("resend response is missing an id: {text}"))?;
        Ok(parsed.id)
    }
}
