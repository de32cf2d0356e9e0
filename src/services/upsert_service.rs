use crate::error::AppError;
use crate::models::{Flash, PropertyRecord};
use crate::store::{RecordStore, RowOutcome};

pub const MISSING_PASSWORD: &str = "SYNAPSE_PASSWORD environment variable not set.";

/// Tally of one save action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub updated: usize,
    pub inserted: usize,
    pub skipped: usize,
    /// Same length and order as the submitted rows.
    pub outcomes: Vec<RowOutcome>,
}

impl SaveSummary {
    pub fn from_outcomes(outcomes: Vec<RowOutcome>) -> Self {
        let mut summary = SaveSummary::default();
        for o in &outcomes {
            match o {
                RowOutcome::Updated => summary.updated += 1,
                RowOutcome::Inserted => summary.inserted += 1,
                RowOutcome::Skipped => summary.skipped += 1,
            }
        }
        summary.outcomes = outcomes;
        summary
    }

    pub fn message(&self, table: &str) -> Flash {
        match (self.updated, self.inserted) {
            (0, 0) => Flash::info(format!("No changes needed to save to {}.", table)),
            (u, 0) => Flash::success(format!("Data saved to {}: {} records updated.", table, u)),
            (0, i) => Flash::success(format!("Data saved to {}: {} new records added.", table, i)),
            (u, i) => Flash::success(format!(
                "Data saved to {}: {} records updated, {} new records added.",
                table, u, i
            )),
        }
    }
}

/// Upserts every row, stamping `last_modified_by` with the acting user.
/// Without a configured store no connection is attempted.
pub async fn save_rows(
    store: Option<&dyn RecordStore>,
    rows: &[PropertyRecord],
    username: &str,
) -> Result<SaveSummary, AppError> {
    let store = store.ok_or_else(|| AppError::ConfigurationMissing(MISSING_PASSWORD.to_string()))?;
    let stamped: Vec<PropertyRecord> = rows.iter().map(|r| r.stamped(username)).collect();
    let outcomes = store.upsert_rows(&stamped).await?;
    let summary = SaveSummary::from_outcomes(outcomes);
    tracing::info!(
        username,
        updated = summary.updated,
        inserted = summary.inserted,
        skipped = summary.skipped,
        "Saved records to warehouse"
    );
    Ok(summary)
}

/// Mirrors a successful save in the session table: written rows now carry the acting user.
pub fn apply_stamps(table: &mut [PropertyRecord], summary: &SaveSummary, username: &str) {
    for (row, outcome) in table.iter_mut().zip(summary.outcomes.iter()) {
        if outcome.wrote() {
            row.last_modified_by = username.to_string();
        }
    }
}

/// The user-facing line for a failed save.
pub fn failure_message(err: &AppError) -> Flash {
    match err {
        AppError::ConfigurationMissing(msg) => Flash::error(msg.clone()),
        other => Flash::error(format!("Failed to save to the warehouse: {}", other)),
    }
}
