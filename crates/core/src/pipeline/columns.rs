use crate::domain::actions::CanonicalField;

/// One classification rule: a predicate over the lower-cased column name and its position
/// among the non-symbol columns.
struct Rule {
    field: CanonicalField,
    matches: fn(&str, usize) -> bool,
}

// Evaluated top to bottom; the first match wins.
const RULES: &[Rule] = &[
    Rule {
        field: CanonicalField::Date,
        matches: |name: &str, pos: usize| pos == 0 || name.contains("date") || name.contains("index"),
    },
    Rule {
        field: CanonicalField::Firm,
        matches: |name: &str, _: usize| name.contains("firm"),
    },
    Rule {
        field: CanonicalField::ToGrade,
        matches: |name: &str, _: usize| name.contains("tograde"),
    },
    Rule {
        field: CanonicalField::FromGrade,
        matches: |name: &str, _: usize| name.contains("fromgrade"),
    },
    Rule {
        field: CanonicalField::Action,
        matches: |name: &str, _: usize| name.contains("action") && !name.contains("price"),
    },
    Rule {
        field: CanonicalField::PriceTargetAction,
        matches: |name: &str, _: usize| name.contains("pricetargetaction"),
    },
    Rule {
        field: CanonicalField::CurrentPriceTarget,
        matches: |name: &str, _: usize| name.contains("currentpricetarget"),
    },
    Rule {
        field: CanonicalField::PriorPriceTarget,
        matches: |name: &str, _: usize| name.contains("priorpricetarget"),
    },
];

/// Maps a provider column name to its canonical field.
///
/// `position` counts columns after any caller-attached `Symbol` column, so the first data
/// column is position 0. Returns `None` for columns with no canonical counterpart.
pub fn classify_column(name: &str, position: usize) -> Option<CanonicalField> {
    let lower = name.trim().to_ascii_lowercase();
    RULES
        .iter()
        .find(|rule| (rule.matches)(&lower, position))
        .map(|rule| rule.field)
}

pub fn is_symbol_column(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case("symbol")
}

/// Resolved column layout of a raw batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub symbol: Option<usize>,
    slots: Vec<(CanonicalField, usize)>,
}

impl ColumnMap {
    /// Classifies every column. When two columns land on the same field the earlier one
    /// is kept.
    pub fn resolve(columns: &[String]) -> Self {
        let mut out = ColumnMap::default();
        let mut position = 0;

        for (idx, name) in columns.iter().enumerate() {
            if out.symbol.is_none() && is_symbol_column(name) {
                out.symbol = Some(idx);
                continue;
            }

            let field = classify_column(name, position);
            position += 1;

            let Some(field) = field else {
                tracing::debug!(column = %name, "dropping unmapped column");
                continue;
            };
            if out.index_of(field).is_some() {
                tracing::debug!(column = %name, ?field, "duplicate column for field; keeping first");
                continue;
            }
            out.slots.push((field, idx));
        }

        out
    }

    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        if field == CanonicalField::Symbol {
            return self.symbol;
        }
        self.slots
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, idx)| *idx)
    }
}
