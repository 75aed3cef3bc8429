use std::sync::Mutex;

use chrono::{NaiveDate, Utc};

use super::{AttendanceStore, InchargeStore, InternStore, LeaveStore, PerformanceStore};
use crate::error::ApiError;
use crate::model::Page;
use crate::model::attendance::{Attendance, NewAttendance};
use crate::model::incharge::{Incharge, InchargeChanges, NewIncharge};
use crate::model::intern::{
    Intern, InternChanges, InternFilter, InternStatus, NewIntern, PerformanceTag,
};
use crate::model::leave::{Leave, LeaveFilter, LeaveStatus, NewLeave};
use crate::model::performance::{NewPerformanceEntry, PerformanceEntry};

/// Store backed by vectors behind one lock, so each call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    next_id: u64,
    interns: Vec<Intern>,
    incharges: Vec<Incharge>,
    leaves: Vec<Leave>,
    attendance: Vec<Attendance>,
    performance: Vec<PerformanceEntry>,
}

impl Tables {
    fn id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    /// Adds an intern directly, skipping intake validation.
    pub fn seed_intern(&self, name: &str, domain: &str, status: InternStatus) -> Intern {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.id();
        let intern = Intern {
            id,
            intern_code: format!("INT-{id:08X}"),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: "+910000000000".to_string(),
            domain: domain.to_string(),
            college: "City College".to_string(),
            resume_url: None,
            duration_months: 3,
            status,
            performance: PerformanceTag::Average,
            join_date: None,
            end_date: None,
            created_at: Utc::now(),
        };
        tables.interns.push(intern.clone());
        intern
    }

    pub fn seed_incharge(&self, name: &str, departments: &[&str], is_active: bool) -> Incharge {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.id();
        let incharge = Incharge {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            departments: departments.iter().map(|d| d.to_string()).collect(),
            is_active,
            created_at: Utc::now(),
        };
        tables.incharges.push(incharge.clone());
        incharge
    }
}

fn matches(filter: &InternFilter, intern: &Intern) -> bool {
    if !filter.domains.is_empty() && !filter.domains.contains(&intern.domain) {
        return false;
    }
    if !filter.statuses.is_empty() && !filter.statuses.contains(&intern.status) {
        return false;
    }
    match filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => {
            let term = term.to_lowercase();
            [&intern.name, &intern.email, &intern.intern_code]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
        }
        None => true,
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: Option<Page>) -> Vec<T> {
    match page {
        Some(p) => items
            .into_iter()
            .skip(p.offset() as usize)
            .take(p.per_page as usize)
            .collect(),
        None => items,
    }
}

impl InternStore for MemoryStore {
    async fn insert_intern(&self, new: &NewIntern) -> Result<Intern, ApiError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.interns.iter().any(|i| i.email == new.email) {
            return Err(ApiError::Conflict(
                "An application with this email already exists".into(),
            ));
        }
        let id = tables.id();
        let intern = Intern {
            id,
            intern_code: new.intern_code.clone(),
            name: new.name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            domain: new.domain.clone(),
            college: new.college.clone(),
            resume_url: new.resume_url.clone(),
            duration_months: new.duration_months,
            status: InternStatus::Applied,
            performance: PerformanceTag::Average,
            join_date: None,
            end_date: None,
            created_at: Utc::now(),
        };
        tables.interns.push(intern.clone());
        Ok(intern)
    }

    async fn find_intern(&self, id: u64) -> Result<Option<Intern>, ApiError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.interns.iter().find(|i| i.id == id).cloned())
    }

    async fn list_interns(
        &self,
        filter: &InternFilter,
        page: Option<Page>,
    ) -> Result<Vec<Intern>, ApiError> {
        let tables = self.tables.lock().unwrap();
        let mut found: Vec<Intern> = tables
            .interns
            .iter()
            .filter(|i| matches(filter, i))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(paginate(found, page))
    }

    async fn count_interns(&self, filter: &InternFilter) -> Result<i64, ApiError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.interns.iter().filter(|i| matches(filter, i)).count() as i64)
    }

    async fn update_intern(
        &self,
        id: u64,
        changes: &InternChanges,
    ) -> Result<Option<Intern>, ApiError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(intern) = tables.interns.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            intern.status = status;
        }
        if let Some(performance) = changes.performance {
            intern.performance = performance;
        }
        if let Some(domain) = &changes.domain {
            intern.domain = domain.clone();
        }
        if let Some(join_date) = changes.join_date {
            intern.join_date = Some(join_date);
        }
        if let Some(end_date) = changes.end_date {
            intern.end_date = Some(end_date);
        }
        Ok(Some(intern.clone()))
    }
}

impl InchargeStore for MemoryStore {
    async fn insert_incharge(&self, new: &NewIncharge) -> Result<Incharge, ApiError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.incharges.iter().any(|i| i.email == new.email) {
            return Err(ApiError::Conflict(
                "An incharge with this email already exists".into(),
            ));
        }
        let id = tables.id();
        let mut departments = new.departments.clone();
        departments.sort();
        let incharge = Incharge {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            departments,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.incharges.push(incharge.clone());
        Ok(incharge)
    }

    async fn find_incharge(&self, id: u64) -> Result<Option<Incharge>, ApiError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.incharges.iter().find(|i| i.id == id).cloned())
    }

    async fn list_incharges(&self) -> Result<Vec<Incharge>, ApiError> {
        let tables = self.tables.lock().unwrap();
        let mut all = tables.incharges.clone();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn update_incharge(
        &self,
        id: u64,
        changes: &InchargeChanges,
    ) -> Result<Option<Incharge>, ApiError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(incharge) = tables.incharges.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        if let Some(is_active) = changes.is_active {
            incharge.is_active = is_active;
        }
        if let Some(departments) = &changes.departments {
            let mut departments = departments.clone();
            departments.sort();
            incharge.departments = departments;
        }
        Ok(Some(incharge.clone()))
    }
}

impl LeaveStore for MemoryStore {
    async fn insert_leave(&self, new: &NewLeave) -> Result<Leave, ApiError> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.id();
        let leave = Leave {
            id,
            intern_id: new.intern_id,
            leave_type: new.leave_type,
            start_date: new.start_date,
            end_date: new.end_date,
            total_days: new.total_days,
            reason: new.reason.clone(),
            status: LeaveStatus::Pending,
            decided_by: None,
            decided_at: None,
            created_at: Utc::now(),
        };
        tables.leaves.push(leave.clone());
        Ok(leave)
    }

    async fn find_leave(&self, id: u64) -> Result<Option<Leave>, ApiError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.leaves.iter().find(|l| l.id == id).cloned())
    }

    async fn list_leaves(
        &self,
        filter: &LeaveFilter,
        page: Option<Page>,
    ) -> Result<Vec<Leave>, ApiError> {
        let tables = self.tables.lock().unwrap();
        let mut found: Vec<Leave> = tables
            .leaves
            .iter()
            .filter(|l| filter.intern_id.is_none_or(|id| l.intern_id == id))
            .filter(|l| filter.status.is_none_or(|s| l.status == s))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(found, page))
    }

    async fn count_leaves(&self, filter: &LeaveFilter) -> Result<i64, ApiError> {
        Ok(self.list_leaves(filter, None).await?.len() as i64)
    }

    async fn transition_leave(
        &self,
        id: u64,
        from: LeaveStatus,
        to: LeaveStatus,
        decided_by: u64,
    ) -> Result<bool, ApiError> {
        let mut tables = self.tables.lock().unwrap();
        match tables.leaves.iter_mut().find(|l| l.id == id && l.status == from) {
            Some(leave) => {
                leave.status = to;
                leave.decided_by = Some(decided_by);
                leave.decided_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl AttendanceStore for MemoryStore {
    async fn insert_attendance(
        &self,
        meeting_date: NaiveDate,
        entries: &[NewAttendance],
    ) -> Result<u64, ApiError> {
        let mut tables = self.tables.lock().unwrap();
        for entry in entries {
            let taken = tables
                .attendance
                .iter()
                .any(|a| a.intern_id == entry.intern_id && a.meeting_date == meeting_date);
            if taken {
                return Err(ApiError::Conflict(format!(
                    "Attendance for intern {} on {} is already logged",
                    entry.intern_id, meeting_date
                )));
            }
        }
        for entry in entries {
            let id = tables.id();
            tables.attendance.push(Attendance {
                id,
                intern_id: entry.intern_id,
                meeting_date,
                status: entry.status,
                remarks: entry.remarks.clone(),
                created_at: Utc::now(),
            });
        }
        Ok(entries.len() as u64)
    }

    async fn list_attendance(
        &self,
        intern_id: Option<u64>,
        meeting_date: Option<NaiveDate>,
    ) -> Result<Vec<Attendance>, ApiError> {
        let tables = self.tables.lock().unwrap();
        let mut found: Vec<Attendance> = tables
            .attendance
            .iter()
            .filter(|a| intern_id.is_none_or(|id| a.intern_id == id))
            .filter(|a| meeting_date.is_none_or(|d| a.meeting_date == d))
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.meeting_date, a.intern_id));
        Ok(found)
    }
}

impl PerformanceStore for MemoryStore {
    async fn append_performance(
        &self,
        intern_id: u64,
        entry: &NewPerformanceEntry,
    ) -> Result<PerformanceEntry, ApiError> {
        let mut tables = self.tables.lock().unwrap();
        let existing = tables
            .performance
            .iter()
            .filter(|p| p.intern_id == intern_id)
            .count();
        let id = tables.id();
        let stored = PerformanceEntry {
            id,
            intern_id,
            month: existing as u32 + 1,
            total_tasks: entry.total_tasks,
            tasks_completed: entry.tasks_completed,
            initiative: entry.initiative,
            communication: entry.communication,
            behaviour: entry.behaviour,
            overall_rating: entry.overall_rating,
            completion_percentage: entry.completion_percentage,
            remarks: entry.remarks.clone(),
            created_at: Utc::now(),
        };
        tables.performance.push(stored.clone());
        Ok(stored)
    }

    async fn list_performance(&self, intern_id: u64) -> Result<Vec<PerformanceEntry>, ApiError> {
        let tables = self.tables.lock().unwrap();
        let mut found: Vec<PerformanceEntry> = tables
            .performance
            .iter()
            .filter(|p| p.intern_id == intern_id)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.month);
        Ok(found)
    }
}
