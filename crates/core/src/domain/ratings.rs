use serde::{Deserialize, Serialize};

/// Analyst recommendation counts for one period, newest period first when listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationTrend {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub strong_buy: u32,
    #[serde(default)]
    pub buy: u32,
    #[serde(default)]
    pub hold: u32,
    #[serde(default)]
    pub sell: u32,
    #[serde(default)]
    pub strong_sell: u32,
}

impl RecommendationTrend {
    pub fn total(&self) -> u32 {
        self.strong_buy + self.buy + self.hold + self.sell + self.strong_sell
    }

    /// Share of analysts at buy or strong buy, in percent rounded to one decimal.
    pub fn bullish_pct(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let pct = f64::from(self.strong_buy + self.buy) / f64::from(total) * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

/// Company-level fields from the quote provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteInfo {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub recommendation_key: Option<String>,
    pub target_mean_price: Option<f64>,
}

/// One dashboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub symbol: String,
    pub company: String,
    pub consensus: String,
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
    pub bullish_pct: f64,
    pub target_price: String,
}

impl RatingSummary {
    pub fn build(symbol: &str, info: &QuoteInfo, latest: Option<&RecommendationTrend>) -> Self {
        let trend = latest.cloned().unwrap_or_default();

        let company = info
            .long_name
            .as_deref()
            .or(info.short_name.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("N/A")
            .to_string();

        let consensus = info
            .recommendation_key
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(consensus_label)
            .unwrap_or_else(|| "N/A".to_string());

        let target_price = match info.target_mean_price {
            Some(p) if p != 0.0 => format!("${p:.2}"),
            _ => "N/A".to_string(),
        };

        Self {
            symbol: symbol.to_string(),
            company,
            consensus,
            strong_buy: trend.strong_buy,
            buy: trend.buy,
            hold: trend.hold,
            sell: trend.sell,
            strong_sell: trend.strong_sell,
            bullish_pct: trend.bullish_pct(),
            target_price,
        }
    }
}

/// `strong_buy` -> `Strong Buy`.
pub fn consensus_label(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
