use crate::domain::actions::{Cell, NOT_AVAILABLE};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

// Rating-change codes and price-target codes share keys but not meanings; keep them apart.
const ACTION_LABELS: &[(&str, &str)] = &[
    ("main", "Maintains"),
    ("up", "Upgrade"),
    ("down", "Downgrade"),
    ("init", "Initiates"),
    ("reit", "Reiterates"),
];

const PRICE_TARGET_ACTION_LABELS: &[(&str, &str)] = &[
    ("up", "Raises"),
    ("down", "Lowers"),
    ("init", "Announces"),
    ("main", "Maintains"),
    ("reit", "Reiterates"),
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Human label for a rating-change code; unknown codes pass through.
pub fn action_label(code: &str) -> String {
    lookup(ACTION_LABELS, code)
}

/// Human label for a price-target code; unknown codes pass through.
pub fn price_target_action_label(code: &str) -> String {
    lookup(PRICE_TARGET_ACTION_LABELS, code)
}

fn lookup(table: &[(&str, &str)], code: &str) -> String {
    table
        .iter()
        .find(|(k, _)| *k == code)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Renders a free-text cell; null and blank become `N/A`.
pub fn display_text(cell: &Cell) -> String {
    match cell {
        Cell::Null => NOT_AVAILABLE.to_string(),
        Cell::Text(s) if s.trim().is_empty() => NOT_AVAILABLE.to_string(),
        Cell::Text(s) => s.clone(),
        Cell::Number(n) => n.to_string(),
        Cell::Timestamp(ts) => ts.to_rfc3339(),
    }
}

/// Maps a code cell through `label`, keeping `N/A` for missing codes.
pub fn display_code(cell: &Cell, label: fn(&str) -> String) -> String {
    match cell {
        Cell::Text(s) if !s.trim().is_empty() => label(s.trim()),
        other => display_text(other),
    }
}

/// `$%.2f` for numbers and numeric strings, `N/A` for null or blank.
pub fn format_price_target(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) if n.is_finite() => format!("${n:.2}"),
        Cell::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => format!("${n:.2}"),
            _ => display_text(cell),
        },
        Cell::Number(_) | Cell::Null => NOT_AVAILABLE.to_string(),
        Cell::Timestamp(_) => display_text(cell),
    }
}

/// Parses a date-bearing cell. Numbers are epoch seconds; naive text is taken as UTC.
pub fn parse_timestamp(cell: &Cell) -> Option<DateTime<Utc>> {
    match cell {
        Cell::Timestamp(ts) => Some(*ts),
        Cell::Number(n) if n.is_finite() => Utc.timestamp_opt(*n as i64, 0).single(),
        Cell::Text(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_codes_map_to_fixed_labels() {
        assert_eq!(action_label("main"), "Maintains");
        assert_eq!(action_label("up"), "Upgrade");
        assert_eq!(action_label("down"), "Downgrade");
        assert_eq!(action_label("init"), "Initiates");
        assert_eq!(action_label("reit"), "Reiterates");
        assert_eq!(action_label("xyz"), "xyz");
    }

    #[test]
    fn price_target_codes_use_their_own_map() {
        assert_eq!(price_target_action_label("up"), "Raises");
        assert_eq!(price_target_action_label("down"), "Lowers");
        assert_eq!(price_target_action_label("init"), "Announces");
        assert_eq!(price_target_action_label("main"), "Maintains");
        assert_eq!(price_target_action_label("reit"), "Reiterates");
        assert_eq!(price_target_action_label("xyz"), "xyz");
    }

    #[test]
    fn price_targets_format_or_fall_back_to_na() {
        assert_eq!(format_price_target(&Cell::Number(12.5)), "$12.50");
        assert_eq!(format_price_target(&Cell::text("200")), "$200.00");
        assert_eq!(format_price_target(&Cell::Null), "N/A");
        assert_eq!(format_price_target(&Cell::text("")), "N/A");
        assert_eq!(format_price_target(&Cell::Number(f64::NAN)), "N/A");
    }

    #[test]
    fn parse_timestamp_accepts_common_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 13, 30, 0).unwrap();
        assert_eq!(parse_timestamp(&Cell::text("2024-01-02T13:30:00Z")), Some(expected));
        assert_eq!(parse_timestamp(&Cell::text("2024-01-02 13:30:00")), Some(expected));
        assert_eq!(parse_timestamp(&Cell::text("2024-01-02 13:30")), Some(expected));
        assert_eq!(
            parse_timestamp(&Cell::Number(expected.timestamp() as f64)),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp(&Cell::text("2024-01-02")),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(&Cell::text("yesterday")), None);
        assert_eq!(parse_timestamp(&Cell::Null), None);
    }
}
