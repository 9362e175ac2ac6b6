//! Worker-filed requests: time corrections, expense claims, profile edits.
//!
//! Forms arrive with optional fields. Validation runs before anything is
//! written, so a rejected submission leaves the store untouched.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{ExceptionRequest, RequestPayload, parse_clock_time};
use crate::store::{Change, Repository, StateDelta};

/// Profile fields a worker may ask to change.
pub const EDITABLE_PROFILE_FIELDS: [&str; 3] = ["name", "phone", "bank_account"];

/// A request to rewrite the times of an attendance log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeCorrectionForm {
    /// The log to correct, when the worker picked one.
    pub log_id: Option<Uuid>,
    /// Date of the log.
    pub date: Option<NaiveDate>,
    /// Corrected start, `HH:MM`.
    pub start_time: Option<String>,
    /// Corrected end, `HH:MM`.
    pub end_time: Option<String>,
    /// Why the times are wrong.
    pub reason: Option<String>,
}

/// A reimbursement request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseClaimForm {
    /// Day the expense was incurred.
    pub date: Option<NaiveDate>,
    /// Amount to reimburse.
    pub amount: Option<Decimal>,
    /// Expense category.
    pub category: Option<String>,
    /// Free-text note.
    pub memo: Option<String>,
}

/// A request to change profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileEditForm {
    /// Field name to new value.
    pub changes: BTreeMap<String, String>,
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn required<T>(value: Option<T>, field: &str) -> EngineResult<T> {
    value.ok_or_else(|| invalid(field, "is required"))
}

fn required_text(value: Option<String>, field: &str) -> EngineResult<String> {
    let text = required(value, field)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(invalid(field, "must not be blank"));
    }
    Ok(trimmed.to_string())
}

fn required_time(value: Option<String>, field: &str) -> EngineResult<chrono::NaiveTime> {
    let text = required(value, field)?;
    parse_clock_time(text.trim()).map_err(|_| invalid(field, "must be a time in HH:MM format"))
}

impl TimeCorrectionForm {
    /// Checks required fields and builds the payload.
    pub fn validate(self) -> EngineResult<RequestPayload> {
        let date = required(self.date, "date")?;
        let start_time = required_time(self.start_time, "start_time")?;
        let end_time = required_time(self.end_time, "end_time")?;
        let reason = required_text(self.reason, "reason")?;

        Ok(RequestPayload::TimeCorrection {
            log_id: self.log_id,
            date,
            start_time,
            end_time,
            reason,
        })
    }
}

impl ExpenseClaimForm {
    /// Checks required fields and builds the payload.
    pub fn validate(self) -> EngineResult<RequestPayload> {
        let date = required(self.date, "date")?;
        let amount = required(self.amount, "amount")?;
        if amount <= Decimal::ZERO {
            return Err(invalid("amount", "must be greater than zero"));
        }
        let category = required_text(self.category, "category")?;

        Ok(RequestPayload::ExpenseClaim {
            date,
            amount,
            category,
            memo: self.memo.unwrap_or_default(),
        })
    }
}

impl ProfileEditForm {
    /// Checks that at least one known field changes and builds the payload.
    pub fn validate(self) -> EngineResult<RequestPayload> {
        if self.changes.is_empty() {
            return Err(invalid("changes", "must contain at least one field"));
        }
        for (field, value) in &self.changes {
            if !EDITABLE_PROFILE_FIELDS.contains(&field.as_str()) {
                return Err(invalid(field, "is not an editable profile field"));
            }
            if field == "name" && value.trim().is_empty() {
                return Err(invalid(field, "must not be blank"));
            }
        }
        Ok(RequestPayload::ProfileEdit {
            changes: self.changes,
        })
    }
}

fn file_request<R: Repository + ?Sized>(
    repo: &mut R,
    worker_id: &str,
    payload: RequestPayload,
    now: NaiveDateTime,
) -> EngineResult<ExceptionRequest> {
    if repo.worker(worker_id).is_none() {
        return Err(EngineError::WorkerNotFound {
            worker_id: worker_id.to_string(),
        });
    }

    let request = ExceptionRequest::pending(repo.next_request_id(), worker_id, now, payload);
    let mut delta = StateDelta::default();
    delta.push(Change::FileRequest(request.clone()));
    repo.commit(delta)?;

    info!(
        request_id = request.id,
        worker_id = %worker_id,
        kind = ?request.kind(),
        "Request filed"
    );
    Ok(request)
}

/// Validates and files a time-correction request.
pub fn submit_time_correction<R: Repository + ?Sized>(
    repo: &mut R,
    worker_id: &str,
    form: TimeCorrectionForm,
    now: NaiveDateTime,
) -> EngineResult<ExceptionRequest> {
    let payload = form.validate()?;
    file_request(repo, worker_id, payload, now)
}

/// Validates and files an expense claim.
pub fn submit_expense_claim<R: Repository + ?Sized>(
    repo: &mut R,
    worker_id: &str,
    form: ExpenseClaimForm,
    now: NaiveDateTime,
) -> EngineResult<ExceptionRequest> {
    let payload = form.validate()?;
    file_request(repo, worker_id, payload, now)
}

/// Validates and files a profile edit.
pub fn submit_profile_edit<R: Repository + ?Sized>(
    repo: &mut R,
    worker_id: &str,
    form: ProfileEditForm,
    now: NaiveDateTime,
) -> EngineResult<ExceptionRequest> {
    let payload = form.validate()?;
    file_request(repo, worker_id, payload, now)
}
