#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use propex::config::{DatabaseSettings, TableName};
use propex::error::AppError;
use propex::models::{AppState, PropertyRecord};
use propex::services::CredentialStore;
use propex::store::{RecordStore, RowOutcome};

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Update(String, i32),
    Insert(String, i32),
}

/// In-memory stand-in for the warehouse table. Each `upsert_rows` call is one
/// transaction: it applies to a copy and only replaces the table when every row worked.
#[derive(Default)]
pub struct MemoryStore {
    pub rows: Mutex<Vec<PropertyRecord>>,
    pub statements: Mutex<Vec<Statement>>,
    pub calls: AtomicUsize,
    pub table_exists: bool,
    /// Fail when reaching this row index inside a save.
    pub fail_at: Option<usize>,
    pub fail_load: bool,
}

impl MemoryStore {
    pub fn empty() -> Self {
        Self { table_exists: true, ..Default::default() }
    }

    pub fn with_rows(rows: Vec<PropertyRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            table_exists: true,
            ..Default::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn find(&self, period: &str, property_id: i32) -> Option<PropertyRecord> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.period == period && r.property_id == property_id)
            .cloned()
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load_all(&self) -> Result<Option<Vec<PropertyRecord>>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            return Err(AppError::Database(sqlx::Error::Protocol("connection refused".into())));
        }
        if !self.table_exists {
            return Ok(None);
        }
        Ok(Some(self.rows.lock().unwrap().clone()))
    }

    async fn upsert_rows(&self, rows: &[PropertyRecord]) -> Result<Vec<RowOutcome>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut working = self.rows.lock().unwrap().clone();
        let mut executed = Vec::new();
        let mut outcomes = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            if self.fail_at == Some(i) {
                return Err(AppError::Database(sqlx::Error::Protocol("lost connection".into())));
            }
            let pos = working
                .iter()
                .position(|r| r.period == row.period && r.property_id == row.property_id);
            let outcome = RowOutcome::resolve(pos.is_some(), row.edited);
            match (outcome, pos) {
                (RowOutcome::Inserted, _) => {
                    working.push(row.clone());
                    executed.push(Statement::Insert(row.period.clone(), row.property_id));
                }
                (RowOutcome::Updated, Some(p)) => {
                    working[p] = row.clone();
                    executed.push(Statement::Update(row.period.clone(), row.property_id));
                }
                _ => {}
            }
            outcomes.push(outcome);
        }
        *self.rows.lock().unwrap() = working;
        self.statements.lock().unwrap().extend(executed);
        Ok(outcomes)
    }
}

pub fn test_settings(password: Option<&str>) -> DatabaseSettings {
    DatabaseSettings {
        env: "test".into(),
        server: "localhost".into(),
        port: 5432,
        username: "tester".into(),
        database: "weu_ndw_test".into(),
        password: password.map(|p| p.to_string()),
        table: TableName::parse("[dbo].[PropertyExport]").unwrap(),
    }
}

pub fn fast_credentials() -> CredentialStore {
    CredentialStore::demo_with_iterations(1_000)
}

pub fn state_with_store(store: Option<Arc<MemoryStore>>) -> AppState {
    let settings = test_settings(store.as_ref().map(|_| "secret"));
    let store: Option<Arc<dyn RecordStore>> = store.map(|s| s as Arc<dyn RecordStore>);
    AppState::new(fast_credentials(), settings, store)
}

pub fn record(period: &str, property_id: i32, edited: bool) -> PropertyRecord {
    PropertyRecord {
        period: period.to_string(),
        property_id,
        property_name: format!("Property {}", property_id),
        unit_count: 10,
        occupancy_rate: 0.9,
        total_rent: 1000.0,
        comment: String::new(),
        last_modified_by: "seed".into(),
        edited,
    }
}
