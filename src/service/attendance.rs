use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::model::attendance::{Attendance, AttendanceStatus, MeetingLog, NewAttendance};
use crate::model::intern::{Intern, InternFilter, InternStatus};
use crate::service::access::Scope;
use crate::store::{AttendanceStore, InternStore};
use crate::utils::stats::{mean, percentage, ratio, round1};

/// Query string of the per-intern attendance listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceFilter {
    /// Department (intern domain)
    pub department: Option<String>,
    pub status: Option<InternStatus>,
    /// Case-insensitive match on name, email or intern code
    pub search: Option<String>,
    /// Only count the meeting held on this day
    #[param(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

/* ========================= Tallies ========================= */

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct AttendanceStats {
    pub total_meetings: u32,
    pub present: u32,
    pub absent: u32,
    pub leave: u32,
    pub attendance_rate: f64,
}

impl AttendanceStats {
    fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Leave => self.leave += 1,
        }
        self.total_meetings += 1;
        self.attendance_rate = percentage(self.present as u64, self.total_meetings as u64);
    }

    fn merge(&mut self, other: &AttendanceStats) {
        self.present += other.present;
        self.absent += other.absent;
        self.leave += other.leave;
        self.total_meetings += other.total_meetings;
        self.attendance_rate = percentage(self.present as u64, self.total_meetings as u64);
    }
}

fn tally(rows: &[Attendance]) -> HashMap<u64, AttendanceStats> {
    let mut by_intern: HashMap<u64, AttendanceStats> = HashMap::new();
    for row in rows {
        by_intern.entry(row.intern_id).or_default().record(row.status);
    }
    by_intern
}

/* ========================= Reports ========================= */

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InternAttendance {
    pub intern_id: u64,
    pub intern_code: String,
    pub name: String,
    pub email: String,
    pub domain: String,
    pub status: InternStatus,
    #[serde(flatten)]
    pub stats: AttendanceStats,
}

impl InternAttendance {
    fn new(intern: Intern, stats: AttendanceStats) -> Self {
        Self {
            intern_id: intern.id,
            intern_code: intern.intern_code,
            name: intern.name,
            email: intern.email,
            domain: intern.domain,
            status: intern.status,
            stats,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DepartmentAttendance {
    pub department: String,
    pub intern_count: u32,
    #[serde(flatten)]
    pub stats: AttendanceStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub total_interns: u32,
    pub total_present: u32,
    pub total_absent: u32,
    pub total_leave: u32,
    pub department_count: u32,
    /// Mean of the per-intern rates
    pub average_attendance_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DepartmentReport {
    pub departments: Vec<DepartmentAttendance>,
    pub summary: AttendanceSummary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceHistory {
    pub stats: AttendanceStats,
    pub records: Vec<Attendance>,
}

/* ========================= Operations ========================= */

/// Matching interns ordered by name, each with counts over the selected rows.
#[instrument(skip(store, scope))]
pub async fn list_with_stats<S>(
    store: &S,
    scope: &Scope,
    filter: &AttendanceFilter,
) -> Result<Vec<InternAttendance>, ApiError>
where
    S: InternStore + AttendanceStore,
{
    let intern_filter = InternFilter {
        domains: scope.domains(filter.department.as_deref())?,
        statuses: filter.status.into_iter().collect(),
        search: filter.search.clone(),
    };

    let interns = store.list_interns(&intern_filter, None).await?;
    let rows = store.list_attendance(None, filter.date).await?;
    let by_intern = tally(&rows);

    Ok(interns
        .into_iter()
        .map(|intern| {
            let stats = by_intern.get(&intern.id).copied().unwrap_or_default();
            InternAttendance::new(intern, stats)
        })
        .collect())
}

/// Per-department aggregates over enrolled interns, departments by name.
#[instrument(skip(store, scope))]
pub async fn department_stats<S>(store: &S, scope: &Scope) -> Result<DepartmentReport, ApiError>
where
    S: InternStore + AttendanceStore,
{
    let intern_filter = InternFilter {
        domains: scope.domains(None)?,
        statuses: InternStatus::ENROLLED.to_vec(),
        search: None,
    };

    let interns = store.list_interns(&intern_filter, None).await?;
    let rows = store.list_attendance(None, None).await?;
    Ok(build_department_report(&interns, &rows))
}

pub fn build_department_report(interns: &[Intern], rows: &[Attendance]) -> DepartmentReport {
    let by_intern = tally(rows);

    let mut departments: BTreeMap<&str, DepartmentAttendance> = BTreeMap::new();
    let mut rates = Vec::with_capacity(interns.len());
    let mut overall = AttendanceStats::default();

    for intern in interns {
        let stats = by_intern.get(&intern.id).copied().unwrap_or_default();
        rates.push(ratio(stats.present as u64, stats.total_meetings as u64));
        overall.merge(&stats);

        let entry = departments
            .entry(intern.domain.as_str())
            .or_insert_with(|| DepartmentAttendance {
                department: intern.domain.clone(),
                intern_count: 0,
                stats: AttendanceStats::default(),
            });
        entry.intern_count += 1;
        entry.stats.merge(&stats);
    }

    let summary = AttendanceSummary {
        total_interns: interns.len() as u32,
        total_present: overall.present,
        total_absent: overall.absent,
        total_leave: overall.leave,
        department_count: departments.len() as u32,
        average_attendance_rate: mean(&rates).map(round1).unwrap_or(0.0),
    };

    DepartmentReport {
        departments: departments.into_values().collect(),
        summary,
    }
}

/// Records one meeting for several interns. Nothing is written on any failure.
pub async fn log_meeting<S>(store: &S, scope: &Scope, log: MeetingLog) -> Result<u64, ApiError>
where
    S: InternStore + AttendanceStore,
{
    if log.entries.is_empty() {
        return Err(ApiError::validation("entries cannot be empty"));
    }

    let mut seen = HashSet::with_capacity(log.entries.len());
    for entry in &log.entries {
        if !seen.insert(entry.intern_id) {
            return Err(ApiError::Validation(format!(
                "Intern {} appears more than once",
                entry.intern_id
            )));
        }
    }

    for entry in &log.entries {
        let intern = store
            .find_intern(entry.intern_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Intern {} not found", entry.intern_id)))?;
        scope.ensure(&intern.domain)?;
    }

    let entries: Vec<NewAttendance> = log
        .entries
        .into_iter()
        .map(|e| NewAttendance {
            remarks: e.remarks.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
            ..e
        })
        .collect();

    let recorded = store.insert_attendance(log.meeting_date, &entries).await?;
    info!(meeting_date = %log.meeting_date, recorded, "Meeting attendance logged");
    Ok(recorded)
}

pub async fn history<S>(store: &S, intern_id: u64) -> Result<AttendanceHistory, ApiError>
where
    S: InternStore + AttendanceStore,
{
    if store.find_intern(intern_id).await?.is_none() {
        return Err(ApiError::not_found("Intern"));
    }

    let records = store.list_attendance(Some(intern_id), None).await?;
    let stats = tally(&records).remove(&intern_id).unwrap_or_default();
    Ok(AttendanceHistory { stats, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus::{Absent, Leave, Present};
    use crate::store::memory::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn mark(intern_id: u64, status: AttendanceStatus) -> NewAttendance {
        NewAttendance {
            intern_id,
            status,
            remarks: None,
        }
    }

    async fn meeting(store: &MemoryStore, d: u32, entries: Vec<NewAttendance>) {
        log_meeting(
            store,
            &Scope::All,
            MeetingLog {
                meeting_date: day(d),
                entries,
            },
        )
        .await
        .unwrap();
    }

    #[test]
    fn stats_without_records_have_zero_rate() {
        let stats = AttendanceStats::default();
        assert_eq!(stats.total_meetings, 0);
        assert_eq!(stats.attendance_rate, 0.0);
    }

    #[actix_web::test]
    async fn rates_count_present_over_all_records() {
        let store = MemoryStore::default();
        let asha = store.seed_intern("Asha Rao", "Web", InternStatus::Active);
        let bala = store.seed_intern("Bala Iyer", "Web", InternStatus::Active);

        meeting(&store, 6, vec![mark(asha.id, Present), mark(bala.id, Absent)]).await;
        meeting(&store, 7, vec![mark(asha.id, Present), mark(bala.id, Present)]).await;
        meeting(&store, 8, vec![mark(asha.id, Leave), mark(bala.id, Absent)]).await;

        let rows = list_with_stats(&store, &Scope::All, &AttendanceFilter::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Asha Rao");
        assert_eq!(
            rows[0].stats,
            AttendanceStats {
                total_meetings: 3,
                present: 2,
                absent: 0,
                leave: 1,
                attendance_rate: 66.7,
            }
        );
        assert_eq!(rows[1].stats.attendance_rate, 33.3);
    }

    #[actix_web::test]
    async fn filters_are_conjunctive() {
        let store = MemoryStore::default();
        let active = store.seed_intern("Asha Rao", "Web", InternStatus::Active);
        store.seed_intern("Bala Iyer", "Web", InternStatus::Selected);
        store.seed_intern("Chitra Sen", "Design", InternStatus::Active);
        meeting(&store, 6, vec![mark(active.id, Present)]).await;

        let filter = AttendanceFilter {
            department: Some("Web".into()),
            status: Some(InternStatus::Active),
            ..Default::default()
        };
        let rows = list_with_stats(&store, &Scope::All, &filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].intern_id, active.id);
        assert_eq!(rows[0].stats.attendance_rate, 100.0);

        let filter = AttendanceFilter {
            search: Some("CHITRA".into()),
            ..Default::default()
        };
        let rows = list_with_stats(&store, &Scope::All, &filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].domain, "Design");
        assert_eq!(rows[0].stats.total_meetings, 0);
        assert_eq!(rows[0].stats.attendance_rate, 0.0);
    }

    #[actix_web::test]
    async fn date_filter_limits_counted_rows() {
        let store = MemoryStore::default();
        let asha = store.seed_intern("Asha Rao", "Web", InternStatus::Active);
        let bala = store.seed_intern("Bala Iyer", "Web", InternStatus::Active);
        meeting(&store, 6, vec![mark(asha.id, Present)]).await;
        meeting(&store, 7, vec![mark(asha.id, Absent), mark(bala.id, Present)]).await;

        let filter = AttendanceFilter {
            date: Some(day(6)),
            ..Default::default()
        };
        let rows = list_with_stats(&store, &Scope::All, &filter).await.unwrap();
        assert_eq!(rows[0].stats.total_meetings, 1);
        assert_eq!(rows[0].stats.present, 1);
        assert_eq!(rows[1].stats.total_meetings, 0);
    }

    #[actix_web::test]
    async fn incharge_listing_is_limited_to_departments() {
        let store = MemoryStore::default();
        store.seed_intern("Asha Rao", "Web", InternStatus::Active);
        store.seed_intern("Chitra Sen", "Design", InternStatus::Active);
        let scope = Scope::Departments(vec!["Design".into()]);

        let rows = list_with_stats(&store, &scope, &AttendanceFilter::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].domain, "Design");

        let filter = AttendanceFilter {
            department: Some("Web".into()),
            ..Default::default()
        };
        let err = list_with_stats(&store, &scope, &filter).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn department_report_covers_enrolled_interns_only() {
        let store = MemoryStore::default();
        let asha = store.seed_intern("Asha Rao", "Web", InternStatus::Active);
        let bala = store.seed_intern("Bala Iyer", "Web", InternStatus::Completed);
        let chitra = store.seed_intern("Chitra Sen", "Design", InternStatus::Selected);
        let applicant = store.seed_intern("Dev Nair", "Web", InternStatus::Applied);

        meeting(
            &store,
            6,
            vec![
                mark(asha.id, Present),
                mark(bala.id, Absent),
                mark(chitra.id, Present),
                mark(applicant.id, Present),
            ],
        )
        .await;
        meeting(&store, 7, vec![mark(asha.id, Leave), mark(bala.id, Present)]).await;

        let report = department_stats(&store, &Scope::All).await.unwrap();
        let names: Vec<&str> = report.departments.iter().map(|d| d.department.as_str()).collect();
        assert_eq!(names, ["Design", "Web"]);

        let web = &report.departments[1];
        assert_eq!(web.intern_count, 2);
        assert_eq!(web.stats.total_meetings, 4);
        assert_eq!(web.stats.present, 2);
        assert_eq!(web.stats.attendance_rate, 50.0);

        assert_eq!(
            report.summary,
            AttendanceSummary {
                total_interns: 3,
                total_present: 3,
                total_absent: 1,
                total_leave: 1,
                department_count: 2,
                // (50 + 50 + 100) / 3
                average_attendance_rate: 66.7,
            }
        );
    }

    #[actix_web::test]
    async fn average_rate_is_rounded_once() {
        let store = MemoryStore::default();
        let asha = store.seed_intern("Asha Rao", "Web", InternStatus::Active);
        let bala = store.seed_intern("Bala Iyer", "Web", InternStatus::Active);

        meeting(&store, 6, vec![mark(asha.id, Absent), mark(bala.id, Present)]).await;
        meeting(&store, 7, vec![mark(bala.id, Present)]).await;
        meeting(&store, 8, vec![mark(bala.id, Absent)]).await;

        let report = department_stats(&store, &Scope::All).await.unwrap();
        // (0 + 66.666..) / 2, not (0 + 66.7) / 2
        assert_eq!(report.summary.average_attendance_rate, 33.3);
    }

    #[test]
    fn empty_department_report() {
        let report = build_department_report(&[], &[]);
        assert!(report.departments.is_empty());
        assert_eq!(report.summary, AttendanceSummary::default());
    }

    #[actix_web::test]
    async fn meeting_log_is_all_or_nothing() {
        let store = MemoryStore::default();
        let asha = store.seed_intern("Asha Rao", "Web", InternStatus::Active);
        let bala = store.seed_intern("Bala Iyer", "Web", InternStatus::Active);
        meeting(&store, 6, vec![mark(asha.id, Present)]).await;

        let err = log_meeting(
            &store,
            &Scope::All,
            MeetingLog {
                meeting_date: day(6),
                entries: vec![mark(bala.id, Present), mark(asha.id, Absent)],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert!(store.list_attendance(Some(bala.id), None).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn meeting_log_rejects_bad_batches() {
        let store = MemoryStore::default();
        let asha = store.seed_intern("Asha Rao", "Web", InternStatus::Active);
        let log = |entries| MeetingLog {
            meeting_date: day(9),
            entries,
        };

        let err = log_meeting(&store, &Scope::All, log(vec![])).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = log_meeting(
            &store,
            &Scope::All,
            log(vec![mark(asha.id, Present), mark(asha.id, Absent)]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = log_meeting(&store, &Scope::All, log(vec![mark(999, Present)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let design_only = Scope::Departments(vec!["Design".into()]);
        let err = log_meeting(&store, &design_only, log(vec![mark(asha.id, Present)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn history_returns_own_rows_and_stats() {
        let store = MemoryStore::default();
        let asha = store.seed_intern("Asha Rao", "Web", InternStatus::Active);
        let bala = store.seed_intern("Bala Iyer", "Web", InternStatus::Active);
        meeting(&store, 6, vec![mark(asha.id, Present), mark(bala.id, Absent)]).await;
        meeting(&store, 7, vec![mark(asha.id, Absent)]).await;

        let own = history(&store, asha.id).await.unwrap();
        assert_eq!(own.records.len(), 2);
        assert!(own.records.iter().all(|r| r.intern_id == asha.id));
        assert_eq!(own.stats.attendance_rate, 50.0);

        let err = history(&store, 999).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
