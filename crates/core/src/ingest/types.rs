use serde::Deserialize;

/// Yahoo numbers arrive either bare or wrapped as `{"raw": .., "fmt": ..}`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum RawNum {
    Plain(f64),
    Wrapped { raw: Option<f64> },
}

impl RawNum {
    pub fn value(self) -> Option<f64> {
        match self {
            RawNum::Plain(v) => Some(v),
            RawNum::Wrapped { raw } => raw,
        }
    }
}

pub fn from_raw(n: Option<RawNum>) -> Option<f64> {
    n.and_then(RawNum::value)
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummary {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<QuoteSummaryError>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub upgrade_downgrade_history: Option<UpgradeDowngradeHistory>,
    #[serde(default)]
    pub price: Option<PriceModule>,
    #[serde(default)]
    pub financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeDowngradeHistory {
    #[serde(default)]
    pub history: Vec<UpgradeDowngradeItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeDowngradeItem {
    #[serde(default)]
    pub epoch_grade_date: Option<i64>,
    #[serde(default)]
    pub firm: Option<String>,
    #[serde(default)]
    pub to_grade: Option<String>,
    #[serde(default)]
    pub from_grade: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub price_target_action: Option<String>,
    #[serde(default)]
    pub current_price_target: Option<RawNum>,
    #[serde(default)]
    pub prior_price_target: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDataModule {
    #[serde(default)]
    pub recommendation_key: Option<String>,
    #[serde(default)]
    pub target_mean_price: Option<RawNum>,
}
