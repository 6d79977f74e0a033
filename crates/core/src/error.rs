use serde::Serialize;
use std::fmt;

/// Upstream call for a single symbol failed. Callers record it and keep going.
#[derive(Debug, Clone, Serialize)]
pub struct FetchError {
    pub symbol: String,
    pub provider: &'static str,
    pub detail: String,
}

impl FetchError {
    pub fn new(symbol: &str, provider: &'static str, err: &anyhow::Error) -> Self {
        Self {
            symbol: symbol.to_string(),
            provider,
            detail: format!("{err:#}"),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetch failed (symbol={}, provider={}): {}",
            self.symbol, self.provider, self.detail
        )
    }
}

impl std::error::Error for FetchError {}

/// A raw batch violated the normalization contract. Fatal for the whole batch.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedInputError {
    pub row: Option<usize>,
    pub column: Option<String>,
    pub detail: String,
}

impl MalformedInputError {
    pub fn missing_date_column() -> Self {
        Self {
            row: None,
            column: None,
            detail: "no date-bearing column in batch".to_string(),
        }
    }

    pub fn unparseable_date(row: usize, column: &str, value: &str) -> Self {
        Self {
            row: Some(row),
            column: Some(column.to_string()),
            detail: format!("unparseable timestamp {value:?}"),
        }
    }
}

impl fmt::Display for MalformedInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed input")?;
        if let Some(row) = self.row {
            write!(f, " (row={row}")?;
            if let Some(column) = &self.column {
                write!(f, ", column={column}")?;
            }
            write!(f, ")")?;
        }
        write!(f, ": {}", self.detail)
    }
}

impl std::error::Error for MalformedInputError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_input_display_names_row_and_column() {
        let err = MalformedInputError::unparseable_date(2, "GradeDate", "yesterday");
        assert_eq!(
            err.to_string(),
            "malformed input (row=2, column=GradeDate): unparseable timestamp \"yesterday\""
        );
    }

    #[test]
    fn fetch_error_keeps_context_chain() {
        let err = anyhow::anyhow!("HTTP 429").context("quoteSummary request failed");
        let fetch = FetchError::new("AAPL", "yahoo", &err);
        assert_eq!(fetch.detail, "quoteSummary request failed: HTTP 429");
        assert!(fetch.to_string().contains("symbol=AAPL"));
    }
}
