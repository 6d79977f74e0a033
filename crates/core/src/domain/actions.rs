use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SYMBOL_COLUMN: &str = "Symbol";
pub const NOT_AVAILABLE: &str = "N/A";

const NULL_CELL: &Cell = &Cell::Null;

/// One raw value as handed over by an upstream provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn opt_text(s: Option<String>) -> Self {
        s.map(Cell::Text).unwrap_or(Cell::Null)
    }

    pub fn opt_number(n: Option<f64>) -> Self {
        n.map(Cell::Number).unwrap_or(Cell::Null)
    }
}

/// Provider-native record set: one row per analyst action, columns named however the
/// provider names them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (row, column); short rows read as `Null`.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(NULL_CELL)
    }

    /// Like [`RawTable::cell`], reading `Null` when the column is absent altogether.
    pub fn cell_in(&self, row: usize, column: Option<usize>) -> &Cell {
        match column {
            Some(column) => self.cell(row, column),
            None => NULL_CELL,
        }
    }

    /// Concatenates per-symbol batches into one table with a leading `Symbol` column.
    ///
    /// Columns are unioned in first-seen order; cells a batch does not carry become `Null`.
    /// Rows are addressed positionally, so batches never collide on a key.
    pub fn concat_symbols<I>(batches: I) -> Self
    where
        I: IntoIterator<Item = (String, RawTable)>,
    {
        let batches: Vec<(String, RawTable)> = batches.into_iter().collect();

        let mut columns: Vec<String> = vec![SYMBOL_COLUMN.to_string()];
        for (_, batch) in &batches {
            for col in &batch.columns {
                if !columns.iter().any(|c| c == col) {
                    columns.push(col.clone());
                }
            }
        }

        let mut out = RawTable::new(columns);
        for (symbol, batch) in batches {
            let positions: Vec<usize> = batch
                .columns
                .iter()
                .map(|col| out.columns.iter().position(|c| c == col).unwrap_or(0))
                .collect();

            for row_idx in 0..batch.rows.len() {
                let mut row = vec![Cell::Null; out.columns.len()];
                row[0] = Cell::Text(symbol.clone());
                for (src, &dst) in positions.iter().enumerate() {
                    row[dst] = batch.cell(row_idx, src).clone();
                }
                out.rows.push(row);
            }
        }
        out
    }
}

/// The fixed set of output columns, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CanonicalField {
    Symbol,
    Date,
    Firm,
    Action,
    ToGrade,
    FromGrade,
    PriceTargetAction,
    CurrentPriceTarget,
    PriorPriceTarget,
}

impl CanonicalField {
    /// Output order, `Symbol` excluded.
    pub const ACTION_FIELDS: [CanonicalField; 8] = [
        CanonicalField::Date,
        CanonicalField::Firm,
        CanonicalField::Action,
        CanonicalField::ToGrade,
        CanonicalField::FromGrade,
        CanonicalField::PriceTargetAction,
        CanonicalField::CurrentPriceTarget,
        CanonicalField::PriorPriceTarget,
    ];

    pub fn header(self) -> &'static str {
        match self {
            CanonicalField::Symbol => "Symbol",
            CanonicalField::Date => "Date",
            CanonicalField::Firm => "Firm",
            CanonicalField::Action => "Action",
            CanonicalField::ToGrade => "To Grade",
            CanonicalField::FromGrade => "From Grade",
            CanonicalField::PriceTargetAction => "Price Target Action",
            CanonicalField::CurrentPriceTarget => "Current Price Target",
            CanonicalField::PriorPriceTarget => "Prior Price Target",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalActionRow {
    #[serde(rename = "Symbol", skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Firm")]
    pub firm: String,
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "To Grade")]
    pub to_grade: String,
    #[serde(rename = "From Grade")]
    pub from_grade: String,
    #[serde(rename = "Price Target Action")]
    pub price_target_action: String,
    #[serde(rename = "Current Price Target")]
    pub current_price_target: String,
    #[serde(rename = "Prior Price Target")]
    pub prior_price_target: String,
}

impl CanonicalActionRow {
    pub fn get(&self, field: CanonicalField) -> &str {
        match field {
            CanonicalField::Symbol => self.symbol.as_deref().unwrap_or(NOT_AVAILABLE),
            CanonicalField::Date => &self.date,
            CanonicalField::Firm => &self.firm,
            CanonicalField::Action => &self.action,
            CanonicalField::ToGrade => &self.to_grade,
            CanonicalField::FromGrade => &self.from_grade,
            CanonicalField::PriceTargetAction => &self.price_target_action,
            CanonicalField::CurrentPriceTarget => &self.current_price_target,
            CanonicalField::PriorPriceTarget => &self.prior_price_target,
        }
    }
}

/// Display-ready analyst actions, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalTable {
    pub has_symbol: bool,
    pub rows: Vec<CanonicalActionRow>,
}

impl CanonicalTable {
    pub fn columns(&self) -> Vec<CanonicalField> {
        let mut out = Vec::with_capacity(CanonicalField::ACTION_FIELDS.len() + 1);
        if self.has_symbol {
            out.push(CanonicalField::Symbol);
        }
        out.extend(CanonicalField::ACTION_FIELDS);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cells_deserialize_from_plain_json_values() {
        let cells: Vec<Cell> = serde_json::from_value(json!([null, 12.5, "up"])).unwrap();
        assert_eq!(
            cells,
            vec![Cell::Null, Cell::Number(12.5), Cell::text("up")]
        );
    }

    #[test]
    fn concat_symbols_unions_columns_and_fills_nulls() {
        let a = RawTable {
            columns: vec!["GradeDate".into(), "Firm".into()],
            rows: vec![vec![Cell::text("2024-01-01"), Cell::text("Acme")]],
        };
        let b = RawTable {
            columns: vec!["GradeDate".into(), "Action".into()],
            rows: vec![
                vec![Cell::text("2024-01-02"), Cell::text("up")],
                vec![Cell::text("2024-01-03")],
            ],
        };

        let out = RawTable::concat_symbols(vec![("AAPL".to_string(), a), ("MSFT".to_string(), b)]);

        assert_eq!(out.columns, vec!["Symbol", "GradeDate", "Firm", "Action"]);
        assert_eq!(out.len(), 3);
        assert_eq!(out.rows[0][3], Cell::Null);
        assert_eq!(out.rows[1][0], Cell::text("MSFT"));
        assert_eq!(out.rows[1][2], Cell::Null);
        assert_eq!(out.rows[1][3], Cell::text("up"));
        assert_eq!(out.rows[2][3], Cell::Null);
    }

    #[test]
    fn canonical_row_serializes_with_display_headers() {
        let row = CanonicalActionRow {
            symbol: None,
            date: "2024-01-02".into(),
            firm: "Acme".into(),
            action: "Upgrade".into(),
            to_grade: "Buy".into(),
            from_grade: "Hold".into(),
            price_target_action: "Raises".into(),
            current_price_target: "$210.00".into(),
            prior_price_target: "$200.00".into(),
        };
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v["To Grade"], "Buy");
        assert_eq!(v["Price Target Action"], "Raises");
        assert!(v.get("Symbol").is_none());
    }
}
