use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Connection, Postgres, Row, Transaction};

use crate::config::{DatabaseSettings, TableName};
use crate::error::AppError;
use crate::models::PropertyRecord;

use super::{RecordStore, RowOutcome};

/// Warehouse table reached over a fresh connection per load or save.
pub struct PostgresStore {
    options: PgConnectOptions,
    table: TableName,
}

impl PostgresStore {
    /// Returns `None` when no password is configured: without the secret nothing connects.
    pub fn from_settings(settings: &DatabaseSettings) -> Option<Self> {
        let password = settings.password.as_deref()?;
        let options = PgConnectOptions::new()
            .host(&settings.server)
            .port(settings.port)
            .username(&settings.username)
            .password(password)
            .database(&settings.database);
        Some(Self::new(options, settings.table.clone()))
    }

    pub fn new(options: PgConnectOptions, table: TableName) -> Self {
        Self { options, table }
    }

    async fn connect(&self) -> Result<PgConnection, AppError> {
        let conn = PgConnection::connect_with(&self.options).await?;
        tracing::debug!(table = self.table.display(), "Warehouse connection opened");
        Ok(conn)
    }

    async fn table_exists(&self, conn: &mut PgConnection) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(self.table.quoted())
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists)
    }

    async fn ensure_table(&self, conn: &mut PgConnection) -> Result<(), AppError> {
        if let Some(schema) = self.table.schema() {
            let sql = format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", schema);
            sqlx::query(&sql).execute(&mut *conn).await?;
        }
        let sql = format!(
            r#"CREATE TABLE IF NOT EXISTS {} (
                "Year-Month" VARCHAR(7) NOT NULL,
                "Property ID" INTEGER NOT NULL,
                "Property Name" VARCHAR(255),
                "Unit Count" INTEGER,
                "Occupancy Rate" DOUBLE PRECISION,
                "Total Rent" DOUBLE PRECISION,
                "Comment" VARCHAR(255),
                "Last Modified By" VARCHAR(255),
                "Edited" BOOLEAN,
                PRIMARY KEY ("Year-Month", "Property ID")
            )"#,
            self.table.quoted()
        );
        sqlx::query(&sql).execute(&mut *conn).await?;
        Ok(())
    }

    async fn upsert_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        rows: &[PropertyRecord],
    ) -> Result<Vec<RowOutcome>, AppError> {
        // The WHERE on the conflict branch turns "exists but not edited" into no row returned.
        let sql = format!(
            r#"INSERT INTO {} ("Year-Month", "Property ID", "Property Name", "Unit Count",
                "Occupancy Rate", "Total Rent", "Comment", "Last Modified By", "Edited")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT ("Year-Month", "Property ID") DO UPDATE SET
                "Property Name" = EXCLUDED."Property Name",
                "Unit Count" = EXCLUDED."Unit Count",
                "Occupancy Rate" = EXCLUDED."Occupancy Rate",
                "Total Rent" = EXCLUDED."Total Rent",
                "Comment" = EXCLUDED."Comment",
                "Last Modified By" = EXCLUDED."Last Modified By",
                "Edited" = EXCLUDED."Edited"
            WHERE EXCLUDED."Edited"
            RETURNING (xmax = 0) AS inserted"#,
            self.table.quoted()
        );
        let mut outcomes = Vec::with_capacity(rows.len());
        for row in rows {
            let returned = sqlx::query(&sql)
                .bind(&row.period)
                .bind(row.property_id)
                .bind(&row.property_name)
                .bind(row.unit_count)
                .bind(row.occupancy_rate)
                .bind(row.total_rent)
                .bind(&row.comment)
                .bind(&row.last_modified_by)
                .bind(row.edited)
                .fetch_optional(&mut **tx)
                .await?;
            let inserted = match returned {
                Some(r) => Some(r.try_get::<bool, _>("inserted")?),
                None => None,
            };
            outcomes.push(outcome_from_returned(inserted, row.edited));
        }
        Ok(outcomes)
    }
}

/// Maps what the upsert statement returned to a row outcome. `None` means the conflict
/// branch's `WHERE` filtered the row out; `Some(inserted)` carries `xmax = 0`.
pub(crate) fn outcome_from_returned(inserted: Option<bool>, edited: bool) -> RowOutcome {
    match inserted {
        None => RowOutcome::Skipped,
        Some(inserted) => RowOutcome::resolve(!inserted, edited),
    }
}

fn record_from_row(row: &PgRow) -> Result<PropertyRecord, sqlx::Error> {
    Ok(PropertyRecord {
        period: row.try_get("Year-Month")?,
        property_id: row.try_get("Property ID")?,
        property_name: row.try_get::<Option<String>, _>("Property Name")?.unwrap_or_default(),
        unit_count: row.try_get::<Option<i32>, _>("Unit Count")?.unwrap_or_default(),
        occupancy_rate: row.try_get::<Option<f64>, _>("Occupancy Rate")?.unwrap_or_default(),
        total_rent: row.try_get::<Option<f64>, _>("Total Rent")?.unwrap_or_default(),
        comment: row.try_get::<Option<String>, _>("Comment")?.unwrap_or_default(),
        last_modified_by: row
            .try_get::<Option<String>, _>("Last Modified By")?
            .unwrap_or_default(),
        edited: row.try_get::<Option<bool>, _>("Edited")?.unwrap_or_default(),
    })
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn load_all(&self) -> Result<Option<Vec<PropertyRecord>>, AppError> {
        let mut conn = self.connect().await?;
        if !self.table_exists(&mut conn).await? {
            conn.close().await?;
            return Ok(None);
        }
        let sql = format!(
            r#"SELECT "Year-Month", "Property ID", "Property Name", "Unit Count",
                "Occupancy Rate", "Total Rent", "Comment", "Last Modified By", "Edited"
            FROM {}
            ORDER BY "Year-Month", "Property ID""#,
            self.table.quoted()
        );
        let rows = sqlx::query(&sql).fetch_all(&mut conn).await?;
        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        conn.close().await?;
        Ok(Some(records))
    }

    async fn upsert_rows(&self, rows: &[PropertyRecord]) -> Result<Vec<RowOutcome>, AppError> {
        let mut conn = self.connect().await?;
        // DDL runs outside the transaction, in auto-commit mode.
        self.ensure_table(&mut conn).await?;

        let mut tx = conn.begin().await?;
        let result = self.upsert_in_tx(&mut tx, rows).await;
        let outcomes = match result {
            Ok(outcomes) => outcomes,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(%rollback_err, "Rollback after failed upsert did not complete");
                }
                return Err(e);
            }
        };
        tx.commit().await?;
        conn.close().await?;
        Ok(outcomes)
    }
}
