use crate::collect::{ActionsReport, RatingsReport};
use crate::domain::actions::{CanonicalField, CanonicalTable};
use crate::time::window::LookbackWindow;
use std::fmt::Write as _;

const DIGEST_STYLE: &str = "\
body { font-family: Arial, sans-serif; }
h2 { color: #1f77b4; }
table { border-collapse: collapse; width: 100%; margin: 20px 0; }
th { background-color: #1f77b4; color: white; padding: 12px; text-align: left; }
td { padding: 10px; border-bottom: 1px solid #ddd; }
tr:hover { background-color: #f5f5f5; }
.upgrade { color: #28a745; font-weight: bold; }
.downgrade { color: #dc3545; font-weight: bold; }
";

const DASHBOARD_STYLE: &str = "\
.main { padding: 2rem; }
h1 { color: #1f77b4; font-weight: 600; margin-bottom: 2rem; }
.warning { background: #fff3cd; color: #856404; padding: 8px 12px; margin: 4px 0; border-radius: 4px; }
.error { background: #f8d7da; color: #721c24; padding: 8px 12px; border-radius: 4px; }
.bar { background: #e9ecef; width: 120px; height: 10px; display: inline-block; margin-right: 6px; }
.bar > span { background: #1f77b4; height: 10px; display: block; }
";

// Email headers are abbreviated for the price-target columns.
fn digest_header(field: CanonicalField) -> &'static str {
    match field {
        CanonicalField::PriceTargetAction => "PT Action",
        CanonicalField::CurrentPriceTarget => "Current PT",
        CanonicalField::PriorPriceTarget => "Prior PT",
        other => other.header(),
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn action_class(action: &str) -> &'static str {
    if action.contains("Upgrade") {
        "upgrade"
    } else if action.contains("Downgrade") {
        "downgrade"
    } else {
        ""
    }
}

pub fn digest_subject(count: usize) -> String {
    if count == 0 {
        "📊 Analyst Digest - No Actions Today".to_string()
    } else {
        format!("📊 Analyst Digest - {count} Actions in Last 24H")
    }
}

/// Email body for a digest run.
pub fn digest_html(table: &CanonicalTable, window: &LookbackWindow) -> String {
    let label = window.label();
    if table.is_empty() {
        return format!(
            "<p>No analyst actions in the {}.</p>",
            escape(&label.to_lowercase())
        );
    }

    let mut html = format!(
        "<html><head><style>{DIGEST_STYLE}</style></head><body>\n<h2>Analyst Actions - {}</h2>\n",
        escape(&label)
    );
    push_actions_table(&mut html, table, digest_header, true);
    html.push_str("</body></html>");
    html
}

/// Full dashboard page: ratings first, then recent analyst actions.
pub fn dashboard_html(
    ratings: &RatingsReport,
    actions: &ActionsReport,
    window: &LookbackWindow,
) -> String {
    let mut html = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>📊 Analyst Ratings</title>\
         <style>{DIGEST_STYLE}{DASHBOARD_STYLE}</style></head><body><div class=\"main\">\n\
         <h1>📊 Analyst Ratings</h1>\n"
    );

    push_warnings(&mut html, ratings.failures.values().map(|e| (&e.symbol, &e.detail)));
    if ratings.rows.is_empty() {
        html.push_str("<p class=\"error\">No data available</p>\n");
    } else {
        push_ratings_table(&mut html, ratings);
    }

    let _ = writeln!(html, "<h2>Analyst Actions - {}</h2>", escape(&window.label()));
    push_warnings(&mut html, actions.failures.values().map(|e| (&e.symbol, &e.detail)));
    if actions.table.is_empty() {
        let _ = writeln!(
            html,
            "<p>No analyst actions in the {}.</p>",
            escape(&window.label().to_lowercase())
        );
    } else {
        push_actions_table(&mut html, &actions.table, CanonicalField::header, false);
    }

    html.push_str("</div></body></html>");
    html
}

fn push_warnings<'a, I>(html: &mut String, failures: I)
where
    I: Iterator<Item = (&'a String, &'a String)>,
{
    for (symbol, detail) in failures {
        let _ = writeln!(
            html,
            "<div class=\"warning\">⚠️ Error fetching data for {}: {}</div>",
            escape(symbol),
            escape(detail)
        );
    }
}

fn push_ratings_table(html: &mut String, ratings: &RatingsReport) {
    html.push_str(
        "<table><tr><th>Symbol</th><th>Company</th><th>Consensus</th><th>Strong Buy</th>\
         <th>Buy</th><th>Hold</th><th>Sell</th><th>% Bullish</th><th>Target Price</th></tr>\n",
    );
    for row in &ratings.rows {
        let width = row.bullish_pct.clamp(0.0, 100.0);
        let _ = writeln!(
            html,
            "<tr><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td><span class=\"bar\"><span style=\"width: {width:.1}%\">\
             </span></span>{:.1}%</td><td>{}</td></tr>",
            escape(&row.symbol),
            escape(&row.company),
            escape(&row.consensus),
            row.strong_buy,
            row.buy,
            row.hold,
            row.sell,
            row.bullish_pct,
            escape(&row.target_price),
        );
    }
    html.push_str("</table>\n");
}

fn push_actions_table(
    html: &mut String,
    table: &CanonicalTable,
    header: fn(CanonicalField) -> &'static str,
    bold_symbol: bool,
) {
    let columns = table.columns();

    html.push_str("<table><tr>");
    for field in &columns {
        let _ = write!(html, "<th>{}</th>", header(*field));
    }
    html.push_str("</tr>\n");

    for row in &table.rows {
        html.push_str("<tr>");
        for field in &columns {
            let value = escape(row.get(*field));
            match field {
                CanonicalField::Symbol if bold_symbol => {
                    let _ = write!(html, "<td><strong>{value}</strong></td>");
                }
                CanonicalField::Action => {
                    let _ = write!(html, "<td class=\"{}\">{value}</td>", action_class(&row.action));
                }
                _ => {
                    let _ = write!(html, "<td>{value}</td>");
                }
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actions::CanonicalActionRow;
    use crate::domain::ratings::RatingSummary;
    use crate::error::FetchError;

    fn sample_table() -> CanonicalTable {
        CanonicalTable {
            has_symbol: true,
            rows: vec![CanonicalActionRow {
                symbol: Some("AAPL".into()),
                date: "2024-01-03 10:15".into(),
                firm: "Smith & Co".into(),
                action: "Upgrade".into(),
                to_grade: "Buy".into(),
                from_grade: "Hold".into(),
                price_target_action: "Raises".into(),
                current_price_target: "$210.00".into(),
                prior_price_target: "$200.00".into(),
            }],
        }
    }

    #[test]
    fn subject_reflects_count() {
        assert_eq!(digest_subject(0), "📊 Analyst Digest - No Actions Today");
        assert_eq!(digest_subject(3), "📊 Analyst Digest - 3 Actions in Last 24H");
    }

    #[test]
    fn empty_digest_is_a_single_message() {
        let html = digest_html(&CanonicalTable::default(), &LookbackWindow::last_24_hours());
        assert_eq!(html, "<p>No analyst actions in the last 24 hours.</p>");
    }

    #[test]
    fn digest_rows_are_escaped_and_classed() {
        let html = digest_html(&sample_table(), &LookbackWindow::last_24_hours());
        assert!(html.contains("<th>PT Action</th><th>Current PT</th><th>Prior PT</th>"));
        assert!(html.contains("<td>Smith &amp; Co</td>"));
        assert!(html.contains("<td class=\"upgrade\">Upgrade</td>"));
        assert!(html.contains("<td><strong>AAPL</strong></td>"));
        assert!(html.contains("Analyst Actions - Last 24 Hours"));
    }

    #[test]
    fn digest_column_order_is_fixed() {
        let html = digest_html(&sample_table(), &LookbackWindow::last_24_hours());
        let headers = [
            "Symbol", "Date", "Firm", "Action", "To Grade", "From Grade", "PT Action", "Current PT",
            "Prior PT",
        ];
        let positions: Vec<usize> = headers
            .iter()
            .map(|h| html.find(&format!("<th>{h}</th>")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn dashboard_shows_warnings_and_no_data() {
        let mut ratings = RatingsReport::default();
        ratings.failures.insert(
            "NOPE".into(),
            FetchError {
                symbol: "NOPE".into(),
                provider: "yahoo",
                detail: "HTTP 404 <none>".into(),
            },
        );

        let html = dashboard_html(&ratings, &ActionsReport::default(), &LookbackWindow::last_90_days());
        assert!(html.contains("Error fetching data for NOPE: HTTP 404 &lt;none&gt;"));
        assert!(html.contains("No data available"));
        assert!(html.contains("No analyst actions in the last 90 days."));
    }

    #[test]
    fn dashboard_renders_ratings_rows() {
        let ratings = RatingsReport {
            rows: vec![RatingSummary {
                symbol: "AAPL".into(),
                company: "Apple Inc.".into(),
                consensus: "Buy".into(),
                strong_buy: 10,
                buy: 20,
                hold: 10,
                sell: 0,
                strong_sell: 0,
                bullish_pct: 75.0,
                target_price: "$245.50".into(),
            }],
            failures: Default::default(),
        };
        let actions = ActionsReport {
            table: sample_table(),
            failures: Default::default(),
        };

        let html = dashboard_html(&ratings, &actions, &LookbackWindow::last_90_days());
        assert!(html.contains("Apple Inc."));
        assert!(html.contains("75.0%"));
        assert!(html.contains("<th>Price Target Action</th>"));
    }
}
