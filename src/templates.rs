use askama::Template;

use crate::models::{CurrentUser, Flash, PropertyRecord, Role};

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub flash_messages: Vec<Flash>,
    pub has_flash_messages: bool,
    pub roles: Vec<RoleOption>,
    pub username: String,
    pub error: Option<String>,
}

pub struct RoleOption {
    pub key: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl RoleOption {
    pub fn list(roles: &[Role], selected: Option<Role>) -> Vec<RoleOption> {
        roles
            .iter()
            .enumerate()
            .map(|(i, r)| RoleOption {
                key: r.key(),
                label: r.label(),
                selected: match selected {
                    Some(s) => s == *r,
                    None => i == 0,
                },
            })
            .collect()
    }
}

pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn list(values: Vec<String>, selected: &str) -> Vec<SelectOption> {
        values
            .into_iter()
            .map(|value| SelectOption {
                selected: value == selected,
                value,
            })
            .collect()
    }
}

/// One grid row as the form renders it. `index` is the form position, `source` the
/// row's index in the session table.
pub struct GridRowView {
    pub index: usize,
    pub source: usize,
    pub period: String,
    pub property_id: i32,
    pub property_name: String,
    pub unit_count: i32,
    pub occupancy_rate: f64,
    pub total_rent: f64,
    pub comment: String,
    pub last_modified_by: String,
    pub edited: bool,
}

impl GridRowView {
    pub fn new(index: usize, source: usize, record: &PropertyRecord) -> Self {
        Self {
            index,
            source,
            period: record.period.clone(),
            property_id: record.property_id,
            property_name: record.property_name.clone(),
            unit_count: record.unit_count,
            occupancy_rate: record.occupancy_rate,
            total_rent: record.total_rent,
            comment: record.comment.clone(),
            last_modified_by: record.last_modified_by.clone(),
            edited: record.edited,
        }
    }
}

#[derive(Template)]
#[template(path = "records.html")]
pub struct RecordsTemplate {
    pub flash_messages: Vec<Flash>,
    pub has_flash_messages: bool,
    pub current_user: CurrentUser,
    pub period_options: Vec<SelectOption>,
    pub property_options: Vec<SelectOption>,
    pub status_line: String,
    pub filtered: bool,
    pub columns: Vec<&'static str>,
    pub rows: Vec<GridRowView>,
    pub row_count: usize,
    pub revision: u64,
    pub table_label: String,
    pub warehouse_configured: bool,
}
