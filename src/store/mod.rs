pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::PropertyRecord;

pub use postgres::PostgresStore;

/// What the warehouse did with one submitted row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowOutcome {
    Inserted,
    Updated,
    Skipped,
}

impl RowOutcome {
    /// Key absent: insert. Key present and flagged edited: update. Otherwise leave it.
    pub fn resolve(exists: bool, edited: bool) -> RowOutcome {
        match (exists, edited) {
            (false, _) => RowOutcome::Inserted,
            (true, true) => RowOutcome::Updated,
            (true, false) => RowOutcome::Skipped,
        }
    }

    pub fn wrote(&self) -> bool {
        !matches!(self, RowOutcome::Skipped)
    }
}

/// Backing table for property records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All stored rows, or `None` when the table does not exist yet.
    async fn load_all(&self) -> Result<Option<Vec<PropertyRecord>>, AppError>;

    /// Upserts `rows` in order inside one transaction and reports one outcome per row.
    /// Rows arrive already stamped with the acting user.
    async fn upsert_rows(&self, rows: &[PropertyRecord]) -> Result<Vec<RowOutcome>, AppError>;
}
