use crate::config::Settings;
use crate::domain::actions::{Cell, RawTable};
use crate::domain::ratings::QuoteInfo;
use crate::ingest::provider::{
    build_http_client, get_json, join_url, AnalystActionsProvider, QuoteInfoProvider,
};
use crate::ingest::types::{from_raw, QuoteSummaryEnvelope, QuoteSummaryResult, UpgradeDowngradeItem};
use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const QUOTE_SUMMARY_PATH: &str = "/v10/finance/quoteSummary";
const PROVIDER: &str = "yahoo";

/// Columns in the order Yahoo's upgrade/downgrade history is laid out.
pub const UPGRADE_DOWNGRADE_COLUMNS: [&str; 8] = [
    "GradeDate",
    "Firm",
    "ToGrade",
    "FromGrade",
    "Action",
    "priceTargetAction",
    "currentPriceTarget",
    "priorPriceTarget",
];

#[derive(Debug, Clone)]
pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
    crumb: Option<String>,
    cookie: Option<String>,
}

impl YahooClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .yahoo_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            http: build_http_client(settings.provider_timeout_secs, PROVIDER)?,
            base_url,
            crumb: settings.yahoo_crumb.clone(),
            cookie: settings.yahoo_cookie.clone(),
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &self.cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
        }
        Ok(headers)
    }

    async fn quote_summary(&self, symbol: &str, modules: &str) -> Result<QuoteSummaryResult> {
        let url = join_url(&self.base_url, &format!("{QUOTE_SUMMARY_PATH}/{symbol}"));
        let mut query = vec![("modules", modules)];
        if let Some(crumb) = self.crumb.as_deref() {
            query.push(("crumb", crumb));
        }

        let envelope: QuoteSummaryEnvelope =
            get_json(&self.http, &url, &query, self.headers()?, PROVIDER).await?;

        if let Some(err) = envelope.quote_summary.error {
            anyhow::bail!(
                "yahoo quoteSummary error for {symbol}: {} {}",
                err.code.unwrap_or_default(),
                err.description.unwrap_or_default()
            );
        }

        envelope
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .with_context(|| format!("yahoo quoteSummary returned no result for {symbol}"))
    }
}

#[async_trait::async_trait]
impl AnalystActionsProvider for YahooClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_upgrades_downgrades(&self, symbol: &str) -> Result<RawTable> {
        let result = self.quote_summary(symbol, "upgradeDowngradeHistory").await?;
        let history = result
            .upgrade_downgrade_history
            .map(|h| h.history)
            .unwrap_or_default();

        let table = history_to_table(history);
        tracing::debug!(%symbol, rows = table.len(), "fetched upgrade/downgrade history");
        Ok(table)
    }
}

#[async_trait::async_trait]
impl QuoteInfoProvider for YahooClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn quote_info(&self, symbol: &str) -> Result<QuoteInfo> {
        let result = self.quote_summary(symbol, "price,financialData").await?;
        let price = result.price;
        let financial = result.financial_data;

        Ok(QuoteInfo {
            long_name: price.as_ref().and_then(|p| p.long_name.clone()),
            short_name: price.and_then(|p| p.short_name),
            recommendation_key: financial.as_ref().and_then(|f| f.recommendation_key.clone()),
            target_mean_price: financial.and_then(|f| from_raw(f.target_mean_price)),
        })
    }
}

fn history_to_table(history: Vec<UpgradeDowngradeItem>) -> RawTable {
    let mut table = RawTable::new(UPGRADE_DOWNGRADE_COLUMNS.iter().map(|c| c.to_string()).collect());
    for item in history {
        let date = item
            .epoch_grade_date
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .map(Cell::Timestamp)
            .unwrap_or(Cell::Null);

        table.rows.push(vec![
            date,
            Cell::opt_text(item.firm),
            Cell::opt_text(item.to_grade),
            Cell::opt_text(item.from_grade),
            Cell::opt_text(item.action),
            Cell::opt_text(item.price_target_action),
            Cell::opt_number(from_raw(item.current_price_target)),
            Cell::opt_number(from_raw(item.prior_price_target)),
        ]);
    }
    table
}
