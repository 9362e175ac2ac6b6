//! Request types for the shift ledger API.
//!
//! Submission bodies reuse the attendance forms directly; this module holds
//! the remaining query and body shapes.

use serde::{Deserialize, Serialize};

/// Query string of `GET /workers/:id/pay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayQuery {
    /// `YYYY-MM` period key.
    pub period: String,
}

/// Body of `POST /holiday-rates/import`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HolidayImportRequest {
    /// `(YYYY-MM-DD, rate)` text rows.
    #[serde(default)]
    pub rows: Vec<(String, String)>,
}
