//! Turns provider-native analyst-action batches into the canonical display table.

pub mod columns;
pub mod values;

use crate::domain::actions::{CanonicalActionRow, CanonicalField, CanonicalTable, RawTable};
use crate::error::MalformedInputError;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use columns::ColumnMap;
use values::{
    action_label, display_code, display_text, format_price_target, parse_timestamp,
    price_target_action_label,
};

/// strftime pattern used to render the `Date` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat(String);

impl DateFormat {
    pub const MINUTE: &'static str = "%Y-%m-%d %H:%M";
    pub const DAY: &'static str = "%Y-%m-%d";

    /// Validates a caller-supplied pattern up front so rendering cannot fail later.
    pub fn custom(pattern: &str) -> anyhow::Result<Self> {
        anyhow::ensure!(!pattern.trim().is_empty(), "date format must be non-empty");
        anyhow::ensure!(
            !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)),
            "invalid date format: {pattern:?}"
        );
        Ok(Self(pattern.to_string()))
    }

    pub fn pattern(&self) -> &str {
        &self.0
    }

    pub fn minute() -> Self {
        Self(Self::MINUTE.to_string())
    }

    pub fn day() -> Self {
        Self(Self::DAY.to_string())
    }

    pub fn render(&self, ts: DateTime<Utc>) -> String {
        ts.format(&self.0).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::day()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub date_format: DateFormat,
}

impl NormalizeOptions {
    pub fn new(date_format: DateFormat) -> Self {
        Self { date_format }
    }
}

/// Normalizes a raw batch.
///
/// Every canonical column is always present; fields the batch does not carry read `N/A`.
/// Rows come back newest first, ties in input order. A batch without a date column, or
/// with a date that does not parse, is rejected as a whole.
pub fn normalize(
    raw: &RawTable,
    options: &NormalizeOptions,
) -> Result<CanonicalTable, MalformedInputError> {
    let map = ColumnMap::resolve(&raw.columns);
    let has_symbol = map.symbol.is_some();

    if raw.is_empty() {
        return Ok(CanonicalTable {
            has_symbol,
            rows: Vec::new(),
        });
    }

    let date_idx = map
        .index_of(CanonicalField::Date)
        .ok_or_else(MalformedInputError::missing_date_column)?;

    let mut keyed: Vec<(DateTime<Utc>, CanonicalActionRow)> = Vec::with_capacity(raw.len());
    for row in 0..raw.len() {
        let date_cell = raw.cell(row, date_idx);
        let ts = parse_timestamp(date_cell).ok_or_else(|| {
            MalformedInputError::unparseable_date(
                row,
                &raw.columns[date_idx],
                &display_text(date_cell),
            )
        })?;

        let field = |f: CanonicalField| raw.cell_in(row, map.index_of(f));

        keyed.push((
            ts,
            CanonicalActionRow {
                symbol: map.symbol.map(|idx| display_text(raw.cell(row, idx))),
                date: options.date_format.render(ts),
                firm: display_text(field(CanonicalField::Firm)),
                action: display_code(field(CanonicalField::Action), action_label),
                to_grade: display_text(field(CanonicalField::ToGrade)),
                from_grade: display_text(field(CanonicalField::FromGrade)),
                price_target_action: display_code(
                    field(CanonicalField::PriceTargetAction),
                    price_target_action_label,
                ),
                current_price_target: format_price_target(field(CanonicalField::CurrentPriceTarget)),
                prior_price_target: format_price_target(field(CanonicalField::PriorPriceTarget)),
            },
        ));
    }

    // Stable sort keeps input order among equal timestamps.
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    tracing::debug!(rows = keyed.len(), has_symbol, "normalized analyst actions");

    Ok(CanonicalTable {
        has_symbol,
        rows: keyed.into_iter().map(|(_, row)| row).collect(),
    })
}
