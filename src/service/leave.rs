use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::model::Page;
use crate::model::leave::{
    Leave, LeaveApplication, LeaveDecision, LeaveFilter, LeaveStatus, NewLeave,
};
use crate::store::{InternStore, LeaveStore};

pub const MIN_REASON_CHARS: usize = 10;

/// Inclusive whole-day count of `start..=end`.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> Result<u32, ApiError> {
    if end < start {
        return Err(ApiError::validation("end_date cannot be before start_date"));
    }
    let days = (end - start).num_days() + 1;
    u32::try_from(days).map_err(|_| ApiError::validation("Leave range is too long"))
}

/// Checks an application and derives the record to persist.
pub fn prepare(intern_id: u64, application: LeaveApplication) -> Result<NewLeave, ApiError> {
    let total_days = inclusive_days(application.start_date, application.end_date)?;

    let reason = application.reason.trim().to_string();
    if reason.chars().count() < MIN_REASON_CHARS {
        return Err(ApiError::Validation(format!(
            "reason must be at least {MIN_REASON_CHARS} characters"
        )));
    }

    Ok(NewLeave {
        intern_id,
        leave_type: application.leave_type,
        start_date: application.start_date,
        end_date: application.end_date,
        total_days,
        reason,
    })
}

pub async fn submit<S>(
    store: &S,
    intern_id: u64,
    application: LeaveApplication,
) -> Result<Leave, ApiError>
where
    S: InternStore + LeaveStore,
{
    let new = prepare(intern_id, application)?;

    if store.find_intern(intern_id).await?.is_none() {
        return Err(ApiError::not_found("Intern"));
    }

    let leave = store.insert_leave(&new).await?;
    info!(
        leave_id = leave.id,
        intern_id,
        total_days = leave.total_days,
        "Leave request submitted"
    );
    Ok(leave)
}

/// Moves a pending request to its terminal status. Only one decision ever lands.
pub async fn decide<S: LeaveStore>(
    store: &S,
    leave_id: u64,
    decision: LeaveDecision,
    decided_by: u64,
) -> Result<Leave, ApiError> {
    let target = decision.target_status();

    if store
        .transition_leave(leave_id, LeaveStatus::Pending, target, decided_by)
        .await?
    {
        info!(leave_id, status = %target, decided_by, "Leave decided");
        return store
            .find_leave(leave_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Leave request"));
    }

    match store.find_leave(leave_id).await? {
        None => Err(ApiError::not_found("Leave request")),
        Some(current) => {
            warn!(leave_id, current = %current.status, requested = %target, "Leave already decided");
            Err(ApiError::Conflict(format!(
                "Leave request is already {}",
                current.status
            )))
        }
    }
}

pub async fn get<S: LeaveStore>(store: &S, leave_id: u64) -> Result<Leave, ApiError> {
    store
        .find_leave(leave_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Leave request"))
}

pub async fn list<S: LeaveStore>(
    store: &S,
    filter: &LeaveFilter,
    page: Page,
) -> Result<(Vec<Leave>, i64), ApiError> {
    let total = store.count_leaves(filter).await?;
    let leaves = store.list_leaves(filter, Some(page)).await?;
    Ok((leaves, total))
}

/// All of one intern's requests, newest first
pub async fn mine<S: LeaveStore>(store: &S, intern_id: u64) -> Result<Vec<Leave>, ApiError> {
    let filter = LeaveFilter {
        intern_id: Some(intern_id),
        status: None,
    };
    store.list_leaves(&filter, None).await
}
