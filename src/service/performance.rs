use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::performance::{NewPerformanceEntry, PerformanceEntry};
use crate::service::access::Scope;
use crate::store::{InternStore, PerformanceStore};
use crate::utils::stats::{mean, percentage, round1};

pub const MAX_RATING: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct Ratings {
    pub initiative: u8,
    pub communication: u8,
    pub behaviour: u8,
}

/// Monthly review as sent by staff. `overall_rating` and
/// `completion_percentage` are accepted but always recomputed.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
#[schema(example = json!({
    "total_tasks": 10,
    "tasks_completed": 7,
    "ratings": { "initiative": 8, "communication": 9, "behaviour": 7 },
    "remarks": "Steady progress"
}))]
pub struct MonthlyReport {
    pub total_tasks: u32,
    pub tasks_completed: u32,
    pub ratings: Ratings,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub overall_rating: Option<f64>,
    #[serde(default)]
    pub completion_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PerformanceSummary {
    pub intern_id: u64,
    pub months_recorded: usize,
    /// Overall rating of the latest month
    pub current_rating: Option<f64>,
    /// Mean overall rating across all months
    pub average_rating: Option<f64>,
}

pub fn overall_rating(ratings: &Ratings) -> f64 {
    let sum = ratings.initiative as f64 + ratings.communication as f64 + ratings.behaviour as f64;
    round1(sum / 3.0)
}

pub fn completion_percentage(total_tasks: u32, tasks_completed: u32) -> f64 {
    percentage(tasks_completed as u64, total_tasks as u64)
}

/// Validates a report and computes its derived fields.
pub fn prepare(report: MonthlyReport) -> Result<NewPerformanceEntry, ApiError> {
    let r = &report.ratings;
    for (name, value) in [
        ("initiative", r.initiative),
        ("communication", r.communication),
        ("behaviour", r.behaviour),
    ] {
        if value > MAX_RATING {
            return Err(ApiError::Validation(format!(
                "{name} must be between 0 and {MAX_RATING}"
            )));
        }
    }
    if report.tasks_completed > report.total_tasks {
        return Err(ApiError::validation(
            "tasks_completed cannot exceed total_tasks",
        ));
    }

    Ok(NewPerformanceEntry {
        total_tasks: report.total_tasks,
        tasks_completed: report.tasks_completed,
        initiative: r.initiative,
        communication: r.communication,
        behaviour: r.behaviour,
        overall_rating: overall_rating(r),
        completion_percentage: completion_percentage(report.total_tasks, report.tasks_completed),
        remarks: report
            .remarks
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

pub fn summarize(intern_id: u64, entries: &[PerformanceEntry]) -> PerformanceSummary {
    let ratings: Vec<f64> = entries.iter().map(|e| e.overall_rating).collect();
    PerformanceSummary {
        intern_id,
        months_recorded: entries.len(),
        current_rating: entries
            .iter()
            .max_by_key(|e| e.month)
            .map(|e| e.overall_rating),
        average_rating: mean(&ratings).map(round1),
    }
}

async fn ensure_intern<S: InternStore>(
    store: &S,
    scope: &Scope,
    intern_id: u64,
) -> Result<(), ApiError> {
    let intern = store
        .find_intern(intern_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Intern"))?;
    scope.ensure(&intern.domain)
}

pub async fn record_month<S>(
    store: &S,
    scope: &Scope,
    intern_id: u64,
    report: MonthlyReport,
) -> Result<PerformanceEntry, ApiError>
where
    S: InternStore + PerformanceStore,
{
    let entry = prepare(report)?;
    ensure_intern(store, scope, intern_id).await?;

    let stored = store.append_performance(intern_id, &entry).await?;
    info!(
        intern_id,
        month = stored.month,
        overall_rating = stored.overall_rating,
        "Performance month recorded"
    );
    Ok(stored)
}

pub async fn history<S>(
    store: &S,
    scope: &Scope,
    intern_id: u64,
) -> Result<Vec<PerformanceEntry>, ApiError>
where
    S: InternStore + PerformanceStore,
{
    ensure_intern(store, scope, intern_id).await?;
    store.list_performance(intern_id).await
}

pub async fn summary<S>(
    store: &S,
    scope: &Scope,
    intern_id: u64,
) -> Result<PerformanceSummary, ApiError>
where
    S: InternStore + PerformanceStore,
{
    let entries = history(store, scope, intern_id).await?;
    Ok(summarize(intern_id, &entries))
}
