use std::time::{Duration, Instant};

use super::current_user::CurrentUser;
use super::property_record::PropertyRecord;
use super::view_filter::ViewFilter;

/// Everything one logged-in browser session works on.
///
/// `revision` changes whenever rows are added or removed, so a grid form rendered
/// against an older layout can be told apart from a current one.
#[derive(Clone, Debug)]
pub struct Session {
    pub user: CurrentUser,
    pub filters: ViewFilter,
    pub table: Vec<PropertyRecord>,
    pub revision: u64,
    pub last_seen: Instant,
}

impl Session {
    pub fn new(user: CurrentUser, table: Vec<PropertyRecord>) -> Self {
        Self {
            user,
            filters: ViewFilter::default(),
            table,
            revision: 0,
            last_seen: Instant::now(),
        }
    }

    pub fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > timeout
    }

    /// Indices into `table` of the rows the current filters let through.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.table
            .iter()
            .enumerate()
            .filter(|(_, r)| self.filters.matches(r))
            .map(|(i, _)| i)
            .collect()
    }
}
