//! Data models

pub mod alert;
pub mod detection;
pub mod sensor;
pub mod user;

pub use alert::*;
pub use detection::*;
pub use sensor::*;
pub use user::*;

use serde::Deserialize;

/// Paging for the history endpoints. No limit returns every row.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct ListFilter {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListFilter {
    /// SQLite treats a negative LIMIT as unbounded
    pub(crate) fn limit(&self) -> i64 {
        self.limit.filter(|l| *l >= 0).unwrap_or(-1)
    }

    pub(crate) fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
