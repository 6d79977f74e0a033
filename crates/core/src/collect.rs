//! Per-symbol fetch loops. A failing symbol is recorded and skipped; it never aborts the run.

use crate::domain::actions::{CanonicalTable, RawTable};
use crate::domain::ratings::RatingSummary;
use crate::error::FetchError;
use crate::ingest::provider::{AnalystActionsProvider, QuoteInfoProvider, RecommendationTrendProvider};
use crate::pipeline::{normalize, NormalizeOptions};
use crate::time::window::LookbackWindow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActionsReport {
    pub table: CanonicalTable,
    pub failures: BTreeMap<String, FetchError>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RatingsReport {
    pub rows: Vec<RatingSummary>,
    pub failures: BTreeMap<String, FetchError>,
}

/// Fetches every symbol, keeping each outcome.
pub async fn fetch_per_symbol(
    provider: &dyn AnalystActionsProvider,
    symbols: &[String],
) -> BTreeMap<String, Result<RawTable, FetchError>> {
    let mut out = BTreeMap::new();
    for symbol in symbols {
        let res = provider
            .fetch_upgrades_downgrades(symbol)
            .await
            .map_err(|err| {
                tracing::warn!(
                    %symbol,
                    provider = provider.provider_name(),
                    error = %format!("{err:#}"),
                    "analyst actions fetch failed; skipping symbol"
                );
                FetchError::new(symbol, provider.provider_name(), &err)
            });
        out.insert(symbol.clone(), res);
    }
    out
}

/// Fetch, window, concatenate and normalize analyst actions across `symbols`.
///
/// Symbols keep the order given, so ties in the final sort follow that order. Callers
/// usually pass `NormalizeOptions::new(window.date_format())`.
pub async fn collect_actions(
    provider: &dyn AnalystActionsProvider,
    symbols: &[String],
    window: LookbackWindow,
    options: &NormalizeOptions,
    now: DateTime<Utc>,
) -> anyhow::Result<ActionsReport> {
    let mut results = fetch_per_symbol(provider, symbols).await;

    let mut failures = BTreeMap::new();
    let mut batches = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        match results.remove(symbol) {
            Some(Ok(raw)) => {
                let recent = window.filter_raw(raw, now);
                tracing::debug!(%symbol, rows = recent.len(), window_hours = window.hours(), "windowed actions");
                if !recent.is_empty() {
                    batches.push((symbol.clone(), recent));
                }
            }
            Some(Err(err)) => {
                failures.insert(symbol.clone(), err);
            }
            None => {}
        }
    }

    let combined = RawTable::concat_symbols(batches);
    let table = normalize(&combined, options)?;

    tracing::info!(
        symbols = symbols.len(),
        actions = table.len(),
        failures = failures.len(),
        window_hours = window.hours(),
        "collected analyst actions"
    );

    Ok(ActionsReport { table, failures })
}

/// Builds one rating row per symbol from the quote and trend providers, sorted by bullish
/// share, highest first.
pub async fn collect_ratings(
    quotes: &dyn QuoteInfoProvider,
    trends: &dyn RecommendationTrendProvider,
    symbols: &[String],
) -> RatingsReport {
    let mut report = RatingsReport::default();

    for symbol in symbols {
        let info = match quotes.quote_info(symbol).await {
            Ok(info) => info,
            Err(err) => {
                record_failure(&mut report.failures, symbol, quotes.provider_name(), &err);
                continue;
            }
        };

        let latest = match trends.recommendation_trends(symbol).await {
            Ok(list) => list.into_iter().next(),
            Err(err) => {
                record_failure(&mut report.failures, symbol, trends.provider_name(), &err);
                continue;
            }
        };

        report
            .rows
            .push(RatingSummary::build(symbol, &info, latest.as_ref()));
    }

    report.rows.sort_by(|a, b| {
        b.bullish_pct
            .partial_cmp(&a.bullish_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    tracing::info!(
        symbols = symbols.len(),
        rows = report.rows.len(),
        failures = report.failures.len(),
        "collected analyst ratings"
    );

    report
}

fn record_failure(
    failures: &mut BTreeMap<String, FetchError>,
    symbol: &str,
    provider: &'static str,
    err: &anyhow::Error,
) {
    tracing::warn!(%symbol, provider, error = %format!("{err:#}"), "ratings fetch failed; skipping symbol");
    failures.insert(symbol.to_string(), FetchError::new(symbol, provider, err));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actions::Cell;
    use crate::domain::ratings::{QuoteInfo, RecommendationTrend};
    use chrono::TimeZone;
    use std::collections::HashMap;

    struct FakeActions {
        tables: HashMap<String, RawTable>,
    }

    #[async_trait::async_trait]
    impl AnalystActionsProvider for FakeActions {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_upgrades_downgrades(&self, symbol: &str) -> anyhow::Result<RawTable> {
            self.tables
                .get(symbol)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("rate limited"))
        }
    }

    struct FakeRatings;

    #[async_trait::async_trait]
    impl QuoteInfoProvider for FakeRatings {
        fn provider_name(&self) -> &'static str {
            "fake-quotes"
        }

        async fn quote_info(&self, symbol: &str) -> anyhow::Result<QuoteInfo> {
            anyhow::ensure!(symbol != "FAIL", "quote lookup failed");
            Ok(QuoteInfo {
                long_name: Some(format!("{symbol} Inc.")),
                ..Default::default()
            })
        }
    }

    #[async_trait::async_trait]
    impl RecommendationTrendProvider for FakeRatings {
        fn provider_name(&self) -> &'static str {
            "fake-trends"
        }

        async fn recommendation_trends(&self, symbol: &str) -> anyhow::Result<Vec<RecommendationTrend>> {
            let buy = if symbol == "MSFT" { 9 } else { 1 };
            Ok(vec![RecommendationTrend {
                buy,
                hold: 1,
                ..Default::default()
            }])
        }
    }

    fn table(rows: &[(&str, &str)]) -> RawTable {
        RawTable {
            columns: vec!["GradeDate".into(), "Firm".into(), "Action".into()],
            rows: rows
                .iter()
                .map(|(date, action)| vec![Cell::text(*date), Cell::text("Acme"), Cell::text(*action)])
                .collect(),
        }
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn one_failing_symbol_does_not_abort_the_rest() {
        let provider = FakeActions {
            tables: HashMap::from([("AAPL".to_string(), table(&[("2024-01-03 10:00:00", "up")]))]),
        };

        let results = fetch_per_symbol(&provider, &symbols(&["AAPL", "NOPE"])).await;
        assert!(results["AAPL"].is_ok());
        let err = results["NOPE"].as_ref().unwrap_err();
        assert_eq!(err.provider, "fake");
        assert_eq!(err.detail, "rate limited");
    }

    #[tokio::test]
    async fn collect_actions_windows_and_merges_symbols() {
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap();
        let provider = FakeActions {
            tables: HashMap::from([
                (
                    "AAPL".to_string(),
                    table(&[("2024-01-03 10:00:00", "up"), ("2023-12-01 10:00:00", "down")]),
                ),
                ("MSFT".to_string(), table(&[("2024-01-03 11:30:00", "reit")])),
            ]),
        };

        let window = LookbackWindow::last_24_hours();
        let report = collect_actions(
            &provider,
            &symbols(&["AAPL", "MSFT", "NOPE"]),
            window,
            &NormalizeOptions::new(window.date_format()),
            now,
        )
        .await
        .unwrap();

        assert!(report.table.has_symbol);
        assert_eq!(report.table.len(), 2);
        assert_eq!(report.table.rows[0].symbol.as_deref(), Some("MSFT"));
        assert_eq!(report.table.rows[0].date, "2024-01-03 11:30");
        assert_eq!(report.table.rows[0].action, "Reiterates");
        assert_eq!(report.table.rows[1].action, "Upgrade");
        assert!(report.failures.contains_key("NOPE"));
    }

    #[tokio::test]
    async fn collect_actions_with_nothing_recent_is_empty_not_an_error() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let provider = FakeActions {
            tables: HashMap::from([("AAPL".to_string(), table(&[("2024-01-03 10:00:00", "up")]))]),
        };

        let window = LookbackWindow::last_24_hours();
        let options = NormalizeOptions::new(window.date_format());
        let report = collect_actions(&provider, &symbols(&["AAPL"]), window, &options, now)
            .await
            .unwrap();
        assert!(report.table.is_empty());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn ratings_sort_by_bullish_share_and_record_failures() {
        let report = collect_ratings(&FakeRatings, &FakeRatings, &symbols(&["AAPL", "FAIL", "MSFT"])).await;

        let order: Vec<&str> = report.rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["MSFT", "AAPL"]);
        assert_eq!(report.rows[0].bullish_pct, 90.0);
        assert_eq!(report.failures["FAIL"].provider, "fake-quotes");
    }
}
