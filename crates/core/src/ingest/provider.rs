use crate::domain::actions::RawTable;
use crate::domain::ratings::{QuoteInfo, RecommendationTrend};
use anyhow::{Context, Result};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Source of per-symbol analyst upgrade/downgrade history.
#[async_trait::async_trait]
pub trait AnalystActionsProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_upgrades_downgrades(&self, symbol: &str) -> Result<RawTable>;
}

/// Source of analyst recommendation counts, newest period first.
#[async_trait::async_trait]
pub trait RecommendationTrendProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn recommendation_trends(&self, symbol: &str) -> Result<Vec<RecommendationTrend>>;
}

/// Source of company name, consensus key and mean price target.
#[async_trait::async_trait]
pub trait QuoteInfoProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn quote_info(&self, symbol: &str) -> Result<QuoteInfo>;
}

pub(crate) fn build_http_client(timeout_secs: u64, provider: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .with_context(|| format!("failed to build {provider} http client"))
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// One GET, decoded as JSON. Non-2xx statuses are errors carrying the body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
    headers: HeaderMap,
    provider: &str,
) -> Result<T> {
    let res = http
        .get(url)
        .headers(headers)
        .query(query)
        .send()
        .await
        .with_context(|| format!("{provider} request failed"))?;

    let status = res.status();
    let text = res
        .text()
        .await
        .with_context(|| format!("failed to read {provider} response"))?;

    if !status.is_success() {
        anyhow::bail!("{provider} HTTP {status}: {text}");
    }

    serde_json::from_str::<T>(&text)
        .with_context(|| format!("{provider} response did not match the expected shape: {text}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("https://x.io/", "/a/b"), "https://x.io/a/b");
        assert_eq!(join_url("https://x.io", "a/b"), "https://x.io/a/b");
    }
}
