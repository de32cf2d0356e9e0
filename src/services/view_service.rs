use chrono::{DateTime, Local};

use crate::models::{PropertyRecord, Session, ViewFilter, ALL};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterOptions {
    pub periods: Vec<String>,
    pub property_ids: Vec<String>,
}

/// Selector options: the sentinel followed by every distinct value, sorted.
/// Property IDs sort numerically.
pub fn filter_options(table: &[PropertyRecord]) -> FilterOptions {
    let mut periods: Vec<String> = table.iter().map(|r| r.period.clone()).collect();
    periods.sort();
    periods.dedup();
    let mut ids: Vec<i32> = table.iter().map(|r| r.property_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let mut period_opts = vec![ALL.to_string()];
    period_opts.extend(periods);
    let mut id_opts = vec![ALL.to_string()];
    id_opts.extend(ids.into_iter().map(|id| id.to_string()));
    FilterOptions {
        periods: period_opts,
        property_ids: id_opts,
    }
}

pub fn apply_filter(table: &[PropertyRecord], filter: &ViewFilter) -> Vec<PropertyRecord> {
    table.iter().filter(|r| filter.matches(r)).cloned().collect()
}

pub fn status_line(filter: &ViewFilter, shown: usize, total: usize) -> String {
    if filter.is_active() {
        format!("Filtered: Showing {} of {} records", shown, total)
    } else {
        "No filters applied".to_string()
    }
}

/// Appends a blank row and returns its index. The row takes the active period filter
/// (or the current month) and the next unused property ID.
pub fn append_blank_row(session: &mut Session, now: DateTime<Local>) -> usize {
    let period = session
        .filters
        .period
        .clone()
        .unwrap_or_else(|| now.format("%Y-%m").to_string());
    let property_id = session
        .table
        .iter()
        .map(|r| r.property_id)
        .max()
        .map(|m| m.saturating_add(1))
        .unwrap_or(1001);
    session.table.push(PropertyRecord {
        period,
        property_id,
        property_name: String::new(),
        unit_count: 0,
        occupancy_rate: 0.0,
        total_rent: 0.0,
        comment: String::new(),
        last_modified_by: String::new(),
        edited: false,
    });
    session.revision += 1;
    session.table.len() - 1
}
