//! HTTP request handlers for the shift ledger API.
//!
//! This module contains the handler functions for all API endpoints.
//! Every handler reads `now` from the state clock once and holds the store
//! lock for the whole read-transition-commit cycle.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::{
    admin_board, approve_request, clear_discipline, clock_in, clock_out, reject_request,
    restore_request, submit_expense_claim, submit_profile_edit, submit_time_correction,
    ExpenseClaimForm, ProfileEditForm, TimeCorrectionForm,
};
use crate::calculation::pay_summary_for;
use crate::error::EngineError;
use crate::models::{PayPeriod, RequestId};

use super::request::{HolidayImportRequest, PayQuery};
use super::response::{ApiError, ApiErrorResponse, ClockInResponse, ClockOutResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/workers/:id/clock-in", post(clock_in_handler))
        .route("/workers/:id/clock-out", post(clock_out_handler))
        .route(
            "/workers/:id/requests/time-correction",
            post(time_correction_handler),
        )
        .route("/workers/:id/requests/expense", post(expense_handler))
        .route("/workers/:id/requests/profile", post(profile_handler))
        .route("/workers/:id/discipline/clear", post(clear_discipline_handler))
        .route("/workers/:id/pay", get(pay_handler))
        .route("/requests/:id/approve", post(approve_handler))
        .route("/requests/:id/reject", post(reject_handler))
        .route("/requests/:id/restore", post(restore_handler))
        .route("/holiday-rates/import", post(holiday_import_handler))
        .route("/admin/board", get(board_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

/// Unwraps a JSON body, turning extractor rejections into API errors.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    let response = ApiErrorResponse::bad_request(error);
    Err(json_response(response.status, response.error))
}

/// Handler for POST /workers/:id/clock-in.
async fn clock_in_handler(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let now = state.now();
    info!(correlation_id = %correlation_id, worker_id = %worker_id, "Processing clock-in");

    let mut store = state.store().lock().await;
    match clock_in(&mut *store, state.config(), &worker_id, now) {
        Ok(outcome) => json_response(
            StatusCode::OK,
            ClockInResponse {
                worker_id,
                at: now,
                outcome,
            },
        ),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /workers/:id/clock-out.
async fn clock_out_handler(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let now = state.now();
    info!(correlation_id = %correlation_id, worker_id = %worker_id, "Processing clock-out");

    let mut store = state.store().lock().await;
    match clock_out(&mut *store, state.config(), &worker_id, now) {
        Ok(outcome) => json_response(
            StatusCode::OK,
            ClockOutResponse {
                worker_id,
                at: now,
                outcome,
            },
        ),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /workers/:id/requests/time-correction.
async fn time_correction_handler(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
    payload: Result<Json<TimeCorrectionForm>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, worker_id = %worker_id, "Filing time correction");
    let form = match parse_body(payload, correlation_id) {
        Ok(form) => form,
        Err(response) => return response,
    };

    let mut store = state.store().lock().await;
    match submit_time_correction(&mut *store, &worker_id, form, state.now()) {
        Ok(request) => json_response(StatusCode::CREATED, request),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /workers/:id/requests/expense.
async fn expense_handler(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
    payload: Result<Json<ExpenseClaimForm>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, worker_id = %worker_id, "Filing expense claim");
    let form = match parse_body(payload, correlation_id) {
        Ok(form) => form,
        Err(response) => return response,
    };

    let mut store = state.store().lock().await;
    match submit_expense_claim(&mut *store, &worker_id, form, state.now()) {
        Ok(request) => json_response(StatusCode::CREATED, request),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /workers/:id/requests/profile.
async fn profile_handler(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
    payload: Result<Json<ProfileEditForm>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, worker_id = %worker_id, "Filing profile edit");
    let form = match parse_body(payload, correlation_id) {
        Ok(form) => form,
        Err(response) => return response,
    };

    let mut store = state.store().lock().await;
    match submit_profile_edit(&mut *store, &worker_id, form, state.now()) {
        Ok(request) => json_response(StatusCode::CREATED, request),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /workers/:id/discipline/clear.
async fn clear_discipline_handler(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, worker_id = %worker_id, "Clearing discipline");

    let mut store = state.store().lock().await;
    match clear_discipline(&mut *store, &worker_id) {
        Ok(status) => json_response(StatusCode::OK, status),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /workers/:id/pay?period=YYYY-MM.
async fn pay_handler(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
    query: Result<Query<PayQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, worker_id = %worker_id, "Computing pay summary");

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(
                correlation_id = %correlation_id,
                error = %rejection.body_text(),
                "Query string rejected"
            );
            return json_response(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(rejection.body_text()),
            );
        }
    };
    let period = match PayPeriod::from_key(&query.period) {
        Ok(period) => period,
        Err(err) => return error_response(correlation_id, err),
    };

    let store = state.store().lock().await;
    match pay_summary_for(
        &*store,
        state.config().defaults(),
        &worker_id,
        period,
        state.now(),
    ) {
        Ok(summary) => json_response(StatusCode::OK, summary),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /requests/:id/approve.
async fn approve_handler(
    State(state): State<AppState>,
    Path(request_id): Path<RequestId>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, request_id, "Approving request");

    let mut store = state.store().lock().await;
    match approve_request(&mut *store, request_id, state.now()) {
        Ok(outcome) => json_response(StatusCode::OK, outcome),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /requests/:id/reject.
async fn reject_handler(
    State(state): State<AppState>,
    Path(request_id): Path<RequestId>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, request_id, "Rejecting request");

    let mut store = state.store().lock().await;
    match reject_request(&mut *store, request_id, state.now()) {
        Ok(outcome) => json_response(StatusCode::OK, outcome),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /requests/:id/restore.
async fn restore_handler(
    State(state): State<AppState>,
    Path(request_id): Path<RequestId>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, request_id, "Restoring request");

    let mut store = state.store().lock().await;
    match restore_request(&mut *store, request_id, state.now()) {
        Ok(request) => json_response(StatusCode::CREATED, request),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /holiday-rates/import.
async fn holiday_import_handler(
    State(state): State<AppState>,
    payload: Result<Json<HolidayImportRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut store = state.store().lock().await;
    let report = store.holiday_rates_mut().import_rows(&request.rows);
    info!(
        correlation_id = %correlation_id,
        added = report.added,
        updated = report.updated,
        skipped = report.skipped,
        "Holiday rates imported"
    );
    json_response(StatusCode::OK, report)
}

/// Handler for GET /admin/board.
async fn board_handler(State(state): State<AppState>) -> Response {
    let store = state.store().lock().await;
    let board = admin_board(&*store, state.config().defaults(), state.now());
    info!(
        pending = board.pending.len(),
        working = board.working.len(),
        "Admin board read"
    );
    json_response(StatusCode::OK, board)
}
