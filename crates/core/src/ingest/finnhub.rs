use crate::config::Settings;
use crate::domain::ratings::RecommendationTrend;
use crate::ingest::provider::{build_http_client, get_json, join_url, RecommendationTrendProvider};
use anyhow::Result;
use reqwest::header::HeaderMap;

const DEFAULT_BASE_URL: &str = "https://finnhub.io";
const RECOMMENDATION_PATH: &str = "/api/v1/stock/recommendation";
const PROVIDER: &str = "finnhub";

#[derive(Debug, Clone)]
pub struct FinnhubClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FinnhubClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_finnhub_api_key()?.to_string();
        let base_url = settings
            .finnhub_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            http: build_http_client(settings.provider_timeout_secs, PROVIDER)?,
            base_url,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl RecommendationTrendProvider for FinnhubClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn recommendation_trends(&self, symbol: &str) -> Result<Vec<RecommendationTrend>> {
        let url = join_url(&self.base_url, RECOMMENDATION_PATH);
        let query = [("symbol", symbol), ("token", self.api_key.as_str())];

        let mut trends: Vec<RecommendationTrend> =
            get_json(&self.http, &url, &query, HeaderMap::new(), PROVIDER).await?;

        // Periods are ISO dates; newest first.
        trends.sort_by(|a, b| b.period.cmp(&a.period));
        Ok(trends)
    }
}
