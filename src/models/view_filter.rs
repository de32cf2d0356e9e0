use crate::error::AppError;

use super::property_record::PropertyRecord;

/// Sentinel shown in both filter selectors for "no restriction".
pub const ALL: &str = "All";

/// Equality filters on period and property ID. `None` stands for [`ALL`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub period: Option<String>,
    pub property_id: Option<i32>,
}

impl ViewFilter {
    /// Builds a filter from the raw selector values. Empty strings count as "All".
    pub fn from_selection(period: &str, property_id: &str) -> Result<Self, AppError> {
        let period = match period.trim() {
            "" | ALL => None,
            p => Some(p.to_string()),
        };
        let property_id = match property_id.trim() {
            "" | ALL => None,
            raw => Some(raw.parse::<i32>().map_err(|_| {
                AppError::Validation(format!("Property ID filter must be a number or \"All\": {}", raw))
            })?),
        };
        Ok(Self { period, property_id })
    }

    pub fn is_active(&self) -> bool {
        self.period.is_some() || self.property_id.is_some()
    }

    pub fn matches(&self, record: &PropertyRecord) -> bool {
        if let Some(p) = &self.period {
            if &record.period != p {
                return false;
            }
        }
        if let Some(id) = self.property_id {
            if record.property_id != id {
                return false;
            }
        }
        true
    }

    pub fn period_selection(&self) -> String {
        self.period.clone().unwrap_or_else(|| ALL.to_string())
    }

    pub fn property_selection(&self) -> String {
        self.property_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| ALL.to_string())
    }
}
