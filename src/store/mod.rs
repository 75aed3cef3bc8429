//! Persistence seams. Services are generic over these traits; production runs
//! them against the MySQL pool, tests against [`memory::MemoryStore`].
#![allow(async_fn_in_trait)]

use chrono::NaiveDate;

use crate::error::ApiError;
use crate::model::Page;
use crate::model::attendance::{Attendance, NewAttendance};
use crate::model::incharge::{Incharge, InchargeChanges, NewIncharge};
use crate::model::intern::{Intern, InternChanges, InternFilter, NewIntern};
use crate::model::leave::{Leave, LeaveFilter, LeaveStatus, NewLeave};
use crate::model::performance::{NewPerformanceEntry, PerformanceEntry};

pub mod mysql;

#[cfg(test)]
pub mod memory;

pub trait InternStore {
    /// Conflict when the email is already registered
    async fn insert_intern(&self, new: &NewIntern) -> Result<Intern, ApiError>;
    async fn find_intern(&self, id: u64) -> Result<Option<Intern>, ApiError>;
    async fn list_interns(
        &self,
        filter: &InternFilter,
        page: Option<Page>,
    ) -> Result<Vec<Intern>, ApiError>;
    async fn count_interns(&self, filter: &InternFilter) -> Result<i64, ApiError>;
    /// Returns the updated intern, `None` if it does not exist
    async fn update_intern(
        &self,
        id: u64,
        changes: &InternChanges,
    ) -> Result<Option<Intern>, ApiError>;
}

pub trait InchargeStore {
    async fn insert_incharge(&self, new: &NewIncharge) -> Result<Incharge, ApiError>;
    async fn find_incharge(&self, id: u64) -> Result<Option<Incharge>, ApiError>;
    async fn list_incharges(&self) -> Result<Vec<Incharge>, ApiError>;
    async fn update_incharge(
        &self,
        id: u64,
        changes: &InchargeChanges,
    ) -> Result<Option<Incharge>, ApiError>;
}

pub trait LeaveStore {
    async fn insert_leave(&self, new: &NewLeave) -> Result<Leave, ApiError>;
    async fn find_leave(&self, id: u64) -> Result<Option<Leave>, ApiError>;
    async fn list_leaves(
        &self,
        filter: &LeaveFilter,
        page: Option<Page>,
    ) -> Result<Vec<Leave>, ApiError>;
    async fn count_leaves(&self, filter: &LeaveFilter) -> Result<i64, ApiError>;
    /// Single conditional write `from -> to`. `false` when no row was in `from`.
    async fn transition_leave(
        &self,
        id: u64,
        from: LeaveStatus,
        to: LeaveStatus,
        decided_by: u64,
    ) -> Result<bool, ApiError>;
}

pub trait AttendanceStore {
    /// All or nothing. An already logged (intern, date) pair is a Conflict.
    async fn insert_attendance(
        &self,
        meeting_date: NaiveDate,
        entries: &[NewAttendance],
    ) -> Result<u64, ApiError>;
    async fn list_attendance(
        &self,
        intern_id: Option<u64>,
        meeting_date: Option<NaiveDate>,
    ) -> Result<Vec<Attendance>, ApiError>;
}

pub trait PerformanceStore {
    /// Appends the next month for the intern; the month number is fixed here.
    async fn append_performance(
        &self,
        intern_id: u64,
        entry: &NewPerformanceEntry,
    ) -> Result<PerformanceEntry, ApiError>;
    /// Ordered by month
    async fn list_performance(&self, intern_id: u64) -> Result<Vec<PerformanceEntry>, ApiError>;
}
