use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;
use crate::models::Session;

/// Upper bound on rows accepted from one grid submission.
pub const MAX_GRID_ROWS: usize = 10_000;

static PERIOD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("period pattern compiles"));

pub fn is_valid_period(period: &str) -> bool {
    PERIOD_PATTERN.is_match(period)
}

/// One submitted grid row. `source` indexes the session table; property ID and
/// last-modified-by are read-only and never travel with the form.
#[derive(Clone, Debug, PartialEq)]
pub struct GridRow {
    pub source: usize,
    pub period: String,
    pub property_name: String,
    pub unit_count: i32,
    pub occupancy_rate: f64,
    pub total_rent: f64,
    pub comment: String,
    pub edited: bool,
    pub delete: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridSubmission {
    pub revision: u64,
    pub rows: Vec<GridRow>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridChange {
    pub updated: usize,
    pub deleted: usize,
}

fn first<'a>(form: &'a HashMap<String, Vec<String>>, key: &str) -> Option<&'a str> {
    form.get(key).and_then(|v| v.first()).map(|s| s.as_str())
}

fn checked(form: &HashMap<String, Vec<String>>, key: &str) -> bool {
    matches!(first(form, key), Some("on") | Some("true") | Some("1"))
}

fn required<'a>(
    form: &'a HashMap<String, Vec<String>>,
    key: &str,
    row: usize,
) -> Result<&'a str, AppError> {
    first(form, key).ok_or_else(|| AppError::Validation(format!("Row {}: missing field {}", row, key)))
}

/// Parses the grid form fields (`revision`, `row_count`, `r{i}_{field}`) and validates
/// every cell. Nothing is returned unless the whole submission is valid.
pub fn parse_grid_form(form: &HashMap<String, Vec<String>>) -> Result<GridSubmission, AppError> {
    let revision = first(form, "revision")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| AppError::Validation("Grid form is missing its revision".into()))?;
    let row_count = first(form, "row_count")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .ok_or_else(|| AppError::Validation("Grid form is missing its row count".into()))?;
    if row_count > MAX_GRID_ROWS {
        return Err(AppError::Validation("Grid form has too many rows".into()));
    }

    let mut rows = Vec::new();
    for i in 0..row_count {
        let n = i + 1;
        let field = |name: &str| format!("r{}_{}", i, name);

        let source = required(form, &field("source"), n)?
            .trim()
            .parse::<usize>()
            .map_err(|_| AppError::Validation(format!("Row {}: invalid row reference", n)))?;

        let period = required(form, &field("period"), n)?.trim().to_string();
        if !is_valid_period(&period) {
            return Err(AppError::Validation(format!(
                "Row {}: Year-Month must use the YYYY-MM format, got \"{}\"",
                n, period
            )));
        }

        let unit_raw = required(form, &field("unit_count"), n)?.trim();
        let unit_count = unit_raw.parse::<i32>().map_err(|_| {
            AppError::Validation(format!("Row {}: Unit Count must be a whole number, got \"{}\"", n, unit_raw))
        })?;
        let occupancy_rate = parse_number(required(form, &field("occupancy_rate"), n)?, n, "Occupancy Rate")?;
        let total_rent = parse_number(required(form, &field("total_rent"), n)?, n, "Total Rent")?;

        rows.push(GridRow {
            source,
            period,
            property_name: first(form, &field("property_name")).unwrap_or("").to_string(),
            unit_count,
            occupancy_rate,
            total_rent,
            comment: first(form, &field("comment")).unwrap_or("").to_string(),
            edited: checked(form, &field("edited")),
            delete: checked(form, &field("delete")),
        });
    }
    Ok(GridSubmission { revision, rows })
}

fn parse_number(raw: &str, row: usize, column: &str) -> Result<f64, AppError> {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(AppError::Validation(format!(
            "Row {}: {} must be a number, got \"{}\"",
            row, column, raw
        ))),
    }
}

/// Merges a submission into the full session table.
///
/// Only rows currently visible may be referenced. Rows hidden by the filters stay as they
/// are. Deleted rows leave the in-memory table only.
pub fn apply_grid(session: &mut Session, submission: &GridSubmission) -> Result<GridChange, AppError> {
    if submission.revision != session.revision {
        return Err(AppError::Validation(
            "The grid changed since this page was loaded; please review the rows and submit again.".into(),
        ));
    }
    let visible: HashSet<usize> = session.visible_indices().into_iter().collect();
    let mut seen = HashSet::new();
    for row in &submission.rows {
        if !visible.contains(&row.source) || !seen.insert(row.source) {
            return Err(AppError::Validation(
                "The grid no longer matches the current view; please reload and try again.".into(),
            ));
        }
    }

    let mut change = GridChange::default();
    let mut to_delete = BTreeSet::new();
    for row in &submission.rows {
        if row.delete {
            to_delete.insert(row.source);
            continue;
        }
        let target = &mut session.table[row.source];
        target.period = row.period.clone();
        target.property_name = row.property_name.clone();
        target.unit_count = row.unit_count;
        target.occupancy_rate = row.occupancy_rate;
        target.total_rent = row.total_rent;
        target.comment = row.comment.clone();
        target.edited = row.edited;
        change.updated += 1;
    }
    for idx in to_delete.iter().rev() {
        session.table.remove(*idx);
    }
    change.deleted = to_delete.len();
    if change.deleted > 0 {
        session.revision += 1;
    }
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_pattern() {
        assert!(is_valid_period("2025-04"));
        assert!(!is_valid_period("2025-4"));
        assert!(!is_valid_period("202504"));
        assert!(!is_valid_period(" 2025-04x"));
    }

    #[test]
    fn oversized_row_count_is_rejected_before_reading_rows() {
        let mut form = HashMap::new();
        form.insert("revision".to_string(), vec!["0".to_string()]);
        form.insert("row_count".to_string(), vec!["100000000000".to_string()]);
        match parse_grid_form(&form) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Grid form has too many rows"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn missing_revision_is_rejected() {
        let form = HashMap::new();
        assert!(matches!(parse_grid_form(&form), Err(AppError::Validation(_))));
    }
}
