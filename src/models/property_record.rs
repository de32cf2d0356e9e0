use std::fmt;

use serde::{Deserialize, Serialize};

/// Column headers in their fixed display and export order.
pub const COLUMNS: [&str; 9] = [
    "Year-Month",
    "Property ID",
    "Property Name",
    "Unit Count",
    "Occupancy Rate",
    "Total Rent",
    "Comment",
    "Last Modified By",
    "Edited",
];

/// One monthly financial record for a property, keyed by `(period, property_id)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
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

impl PropertyRecord {
    /// Copy of the record with `last_modified_by` overwritten by the acting user.
    pub fn stamped(&self, username: &str) -> PropertyRecord {
        PropertyRecord {
            last_modified_by: username.to_string(),
            ..self.clone()
        }
    }

    /// Cell values in [`COLUMNS`] order.
    pub fn cells(&self) -> [CellValue; 9] {
        [
            CellValue::Text(self.period.clone()),
            CellValue::Integer(self.property_id),
            CellValue::Text(self.property_name.clone()),
            CellValue::Integer(self.unit_count),
            CellValue::Float(self.occupancy_rate),
            CellValue::Float(self.total_rent),
            CellValue::Text(self.comment.clone()),
            CellValue::Text(self.last_modified_by.clone()),
            CellValue::Bool(self.edited),
        ]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i32),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Integer(n) => write!(f, "{}", n),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}
