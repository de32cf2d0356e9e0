use crate::models::{Flash, PropertyRecord};
use crate::store::RecordStore;

/// Synthetic table used when no warehouse table is available: ten properties for
/// April 2025 and the same ten for May 2025.
pub fn seed_records(username: &str) -> Vec<PropertyRecord> {
    let mut rows = Vec::with_capacity(20);
    for i in 0..10 {
        rows.push(PropertyRecord {
            period: "2025-04".to_string(),
            property_id: 1001 + i,
            property_name: format!("Newsec Sweden HQ {}", i + 1),
            unit_count: 50 + i,
            occupancy_rate: round2(0.98 - 0.01 * f64::from(i)),
            total_rent: 120_000.0 + 1_000.0 * f64::from(i),
            comment: format!("April data for unit {}", i + 1),
            last_modified_by: username.to_string(),
            edited: false,
        });
    }
    for i in 0..10 {
        rows.push(PropertyRecord {
            period: "2025-05".to_string(),
            property_id: 1001 + i,
            property_name: format!("Newsec Sweden HQ {}", i + 1),
            unit_count: 52 + i,
            occupancy_rate: round2(0.99 - 0.01 * f64::from(i)),
            total_rent: 122_000.0 + 1_000.0 * f64::from(i),
            comment: format!("May data for unit {}", i + 1),
            last_modified_by: username.to_string(),
            edited: false,
        });
    }
    rows
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Builds a new session's table: the warehouse rows when the table exists, the seed otherwise.
/// A load failure is reported as a flash and never prevents the session from starting.
pub async fn load_initial_table(
    store: Option<&dyn RecordStore>,
    username: &str,
) -> (Vec<PropertyRecord>, Option<Flash>) {
    let Some(store) = store else {
        return (seed_records(username), None);
    };
    match store.load_all().await {
        Ok(Some(rows)) => {
            tracing::info!(rows = rows.len(), "Loaded records from warehouse");
            (rows, Some(Flash::success("Data loaded successfully")))
        }
        Ok(None) => {
            tracing::info!("Warehouse table not found; using seed data");
            (seed_records(username), None)
        }
        Err(e) => {
            tracing::error!(%e, "Failed to load records from warehouse");
            (
                seed_records(username),
                Some(Flash::error(format!("Failed to connect to database: {}", e))),
            )
        }
    }
}
