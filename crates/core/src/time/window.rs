use crate::domain::actions::{CanonicalField, RawTable};
use crate::pipeline::columns::ColumnMap;
use crate::pipeline::values::parse_timestamp;
use crate::pipeline::DateFormat;
use chrono::{DateTime, Duration, Utc};

const MINUTE_GRANULARITY_MAX_HOURS: i64 = 24;

/// How far back a report looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    span: Duration,
}

impl LookbackWindow {
    pub fn last_24_hours() -> Self {
        Self {
            span: Duration::hours(24),
        }
    }

    pub fn last_90_days() -> Self {
        Self {
            span: Duration::days(90),
        }
    }

    pub fn from_hours(hours: i64) -> anyhow::Result<Self> {
        anyhow::ensure!(hours >= 1, "lookback window must be at least 1 hour (got {hours})");
        Ok(Self {
            span: Duration::hours(hours),
        })
    }

    pub fn hours(&self) -> i64 {
        self.span.num_hours()
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.span
    }

    /// Minute granularity for windows up to a day, date-only beyond that.
    pub fn date_format(&self) -> DateFormat {
        if self.hours() <= MINUTE_GRANULARITY_MAX_HOURS {
            DateFormat::minute()
        } else {
            DateFormat::day()
        }
    }

    pub fn label(&self) -> String {
        let hours = self.hours();
        if hours == 24 {
            "Last 24 Hours".to_string()
        } else if hours % 24 == 0 {
            format!("Last {} Days", hours / 24)
        } else {
            format!("Last {hours} Hours")
        }
    }

    /// Keeps rows dated at or after `now - span`.
    ///
    /// Rows whose date does not parse are kept so normalization reports them; a batch with
    /// no date column is returned untouched for the same reason.
    pub fn filter_raw(&self, table: RawTable, now: DateTime<Utc>) -> RawTable {
        let cutoff = self.cutoff(now);
        let Some(date_idx) = ColumnMap::resolve(&table.columns).index_of(CanonicalField::Date)
        else {
            return table;
        };

        let RawTable { columns, rows } = table;
        let rows = rows
            .into_iter()
            .filter(|row| {
                let cell = row.get(date_idx);
                match cell.and_then(parse_timestamp) {
                    Some(ts) => ts >= cutoff,
                    None => true,
                }
            })
            .collect();

        RawTable { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actions::Cell;
    use chrono::TimeZone;

    #[test]
    fn short_windows_render_minutes() {
        assert_eq!(LookbackWindow::last_24_hours().date_format(), DateFormat::minute());
        assert_eq!(LookbackWindow::last_90_days().date_format(), DateFormat::day());
        assert_eq!(LookbackWindow::from_hours(25).unwrap().date_format(), DateFormat::day());
    }

    #[test]
    fn labels() {
        assert_eq!(LookbackWindow::last_24_hours().label(), "Last 24 Hours");
        assert_eq!(LookbackWindow::last_90_days().label(), "Last 90 Days");
        assert_eq!(LookbackWindow::from_hours(6).unwrap().label(), "Last 6 Hours");
    }

    #[test]
    fn rejects_non_positive_windows() {
        assert!(LookbackWindow::from_hours(0).is_err());
    }

    #[test]
    fn filter_keeps_rows_at_or_after_cutoff() {
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap();
        let window = LookbackWindow::last_24_hours();
        let table = RawTable {
            columns: vec!["GradeDate".into(), "Firm".into()],
            rows: vec![
                vec![Cell::text("2024-01-03 08:00:00"), Cell::text("recent")],
                vec![Cell::text("2024-01-02 12:00:00"), Cell::text("boundary")],
                vec![Cell::text("2024-01-01 12:00:00"), Cell::text("old")],
                vec![Cell::text("garbage"), Cell::text("unparseable")],
            ],
        };

        let out = window.filter_raw(table, now);
        let firms: Vec<_> = out.rows.iter().map(|r| r[1].clone()).collect();
        assert_eq!(
            firms,
            vec![
                Cell::text("recent"),
                Cell::text("boundary"),
                Cell::text("unparseable")
            ]
        );
    }
}
