//! HTTP API module for the shift ledger.
//!
//! This module exposes clock-in/clock-out, request filing and review, the
//! administrator board and pay summaries as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{HolidayImportRequest, PayQuery};
pub use response::{ApiError, ApiErrorResponse, ClockInResponse, ClockOutResponse};
pub use state::{AppState, Clock};
