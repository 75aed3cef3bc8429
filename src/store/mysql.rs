use std::collections::HashMap;

use chrono::NaiveDate;
use futures_util::TryStreamExt;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use tracing::debug;

use super::{AttendanceStore, InchargeStore, InternStore, LeaveStore, PerformanceStore};
use crate::db::{is_constraint_violation, is_lost_race, is_serialization_failure};
use crate::error::{ApiError, db_error};
use crate::model::Page;
use crate::model::attendance::{Attendance, NewAttendance};
use crate::model::incharge::{Incharge, InchargeChanges, InchargeRow, NewIncharge};
use crate::model::intern::{Intern, InternChanges, InternFilter, NewIntern};
use crate::model::leave::{Leave, LeaveFilter, LeaveStatus, NewLeave};
use crate::model::performance::{NewPerformanceEntry, PerformanceEntry};
use crate::utils::db_utils::{SqlValue, WhereClause};

const INTERN_COLUMNS: &str = "id, intern_code, name, email, phone, domain, college, resume_url, \
     duration_months, status, performance, join_date, end_date, created_at";

const LEAVE_COLUMNS: &str = "id, intern_id, leave_type, start_date, end_date, total_days, reason, \
     status, decided_by, decided_at, created_at";

const PERFORMANCE_COLUMNS: &str = "id, intern_id, month, total_tasks, tasks_completed, initiative, \
     communication, behaviour, overall_rating, completion_percentage, remarks, created_at";

/* =========================
Interns
========================= */

fn intern_where(filter: &InternFilter) -> WhereClause {
    let mut clause = WhereClause::new();
    clause.any_of(
        "domain",
        filter.domains.iter().cloned().map(SqlValue::String).collect(),
    );
    clause.any_of(
        "status",
        filter
            .statuses
            .iter()
            .map(|s| SqlValue::String(s.to_string()))
            .collect(),
    );
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        clause.contains_any(&["name", "email", "intern_code"], term);
    }
    clause
}

impl InternStore for MySqlPool {
    async fn insert_intern(&self, new: &NewIntern) -> Result<Intern, ApiError> {
        let result = sqlx::query(
            r#"
            INSERT INTO interns
                (intern_code, name, email, phone, domain, college, resume_url, duration_months)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.intern_code)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.domain)
        .bind(&new.college)
        .bind(new.resume_url.as_deref())
        .bind(new.duration_months)
        .execute(self)
        .await;

        let id = match result {
            Ok(r) => r.last_insert_id(),
            Err(e) if is_constraint_violation(&e) => {
                return Err(ApiError::Conflict(
                    "An application with this email already exists".into(),
                ));
            }
            Err(e) => {
                tracing::error!(error = %e, email = %new.email, "Failed to insert intern");
                return Err(ApiError::Server);
            }
        };

        self.find_intern(id).await?.ok_or(ApiError::Server)
    }

    async fn find_intern(&self, id: u64) -> Result<Option<Intern>, ApiError> {
        let sql = format!("SELECT {INTERN_COLUMNS} FROM interns WHERE id = ?");
        sqlx::query_as::<_, Intern>(&sql)
            .bind(id)
            .fetch_optional(self)
            .await
            .map_err(db_error("Failed to fetch intern"))
    }

    async fn list_interns(
        &self,
        filter: &InternFilter,
        page: Option<Page>,
    ) -> Result<Vec<Intern>, ApiError> {
        let clause = intern_where(filter);
        let mut sql = format!(
            "SELECT {INTERN_COLUMNS} FROM interns{} ORDER BY name, id",
            clause.sql()
        );
        if page.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }
        debug!(sql = %sql, bindings = ?clause.values(), "Fetching interns");

        let mut query = clause.bind_as(sqlx::query_as::<_, Intern>(&sql));
        if let Some(p) = page {
            query = query.bind(p.per_page).bind(p.offset());
        }

        query
            .fetch_all(self)
            .await
            .map_err(db_error("Failed to fetch interns"))
    }

    async fn count_interns(&self, filter: &InternFilter) -> Result<i64, ApiError> {
        let clause = intern_where(filter);
        let sql = format!("SELECT COUNT(*) FROM interns{}", clause.sql());

        clause
            .bind_scalar(sqlx::query_scalar::<_, i64>(&sql))
            .fetch_one(self)
            .await
            .map_err(db_error("Failed to count interns"))
    }

    async fn update_intern(
        &self,
        id: u64,
        changes: &InternChanges,
    ) -> Result<Option<Intern>, ApiError> {
        if changes.is_empty() {
            return self.find_intern(id).await;
        }

        let mut builder = QueryBuilder::<MySql>::new("UPDATE interns SET ");
        let mut set = builder.separated(", ");
        if let Some(status) = changes.status {
            set.push("status = ").push_bind_unseparated(status);
        }
        if let Some(performance) = changes.performance {
            set.push("performance = ").push_bind_unseparated(performance);
        }
        if let Some(domain) = &changes.domain {
            set.push("domain = ").push_bind_unseparated(domain.clone());
        }
        if let Some(join_date) = changes.join_date {
            set.push("join_date = ").push_bind_unseparated(join_date);
        }
        if let Some(end_date) = changes.end_date {
            set.push("end_date = ").push_bind_unseparated(end_date);
        }
        builder.push(" WHERE id = ").push_bind(id);

        builder.build().execute(self).await.map_err(|e| {
            tracing::error!(error = %e, intern_id = id, "Failed to update intern");
            ApiError::Server
        })?;

        self.find_intern(id).await
    }
}

/* =========================
Incharges
========================= */

async fn departments_of(pool: &MySqlPool, incharge_id: u64) -> Result<Vec<String>, ApiError> {
    sqlx::query_scalar::<_, String>(
        "SELECT department FROM incharge_departments WHERE incharge_id = ? ORDER BY department",
    )
    .bind(incharge_id)
    .fetch_all(pool)
    .await
    .map_err(db_error("Failed to fetch incharge departments"))
}

async fn replace_departments(
    tx: &mut sqlx::Transaction<'_, MySql>,
    incharge_id: u64,
    departments: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM incharge_departments WHERE incharge_id = ?")
        .bind(incharge_id)
        .execute(&mut **tx)
        .await?;

    for department in departments {
        sqlx::query("INSERT INTO incharge_departments (incharge_id, department) VALUES (?, ?)")
            .bind(incharge_id)
            .bind(department)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

impl InchargeStore for MySqlPool {
    async fn insert_incharge(&self, new: &NewIncharge) -> Result<Incharge, ApiError> {
        let mut tx = self
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let result = sqlx::query("INSERT INTO incharges (name, email, phone) VALUES (?, ?, ?)")
            .bind(&new.name)
            .bind(&new.email)
            .bind(new.phone.as_deref())
            .execute(&mut *tx)
            .await;

        let id = match result {
            Ok(r) => r.last_insert_id(),
            Err(e) if is_constraint_violation(&e) => {
                return Err(ApiError::Conflict(
                    "An incharge with this email already exists".into(),
                ));
            }
            Err(e) => return Err(db_error("Failed to insert incharge")(e)),
        };

        replace_departments(&mut tx, id, &new.departments)
            .await
            .map_err(db_error("Failed to assign incharge departments"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit incharge"))?;

        self.find_incharge(id).await?.ok_or(ApiError::Server)
    }

    async fn find_incharge(&self, id: u64) -> Result<Option<Incharge>, ApiError> {
        let row = sqlx::query_as::<_, InchargeRow>(
            "SELECT id, name, email, phone, is_active, created_at FROM incharges WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self)
        .await
        .map_err(db_error("Failed to fetch incharge"))?;

        match row {
            Some(row) => {
                let departments = departments_of(self, id).await?;
                Ok(Some(row.with_departments(departments)))
            }
            None => Ok(None),
        }
    }

    async fn list_incharges(&self) -> Result<Vec<Incharge>, ApiError> {
        let rows = sqlx::query_as::<_, InchargeRow>(
            "SELECT id, name, email, phone, is_active, created_at FROM incharges ORDER BY name, id",
        )
        .fetch_all(self)
        .await
        .map_err(db_error("Failed to fetch incharges"))?;

        let mut departments: HashMap<u64, Vec<String>> = HashMap::new();
        let mut stream = sqlx::query_as::<_, (u64, String)>(
            "SELECT incharge_id, department FROM incharge_departments ORDER BY department",
        )
        .fetch(self);
        while let Some((incharge_id, department)) = stream
            .try_next()
            .await
            .map_err(db_error("Failed to fetch incharge departments"))?
        {
            departments.entry(incharge_id).or_default().push(department);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let assigned = departments.remove(&row.id).unwrap_or_default();
                row.with_departments(assigned)
            })
            .collect())
    }

    async fn update_incharge(
        &self,
        id: u64,
        changes: &InchargeChanges,
    ) -> Result<Option<Incharge>, ApiError> {
        let mut tx = self
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM incharges WHERE id = ? FOR UPDATE",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to lock incharge"))?;
        if exists == 0 {
            return Ok(None);
        }

        if let Some(is_active) = changes.is_active {
            sqlx::query("UPDATE incharges SET is_active = ? WHERE id = ?")
                .bind(is_active)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to update incharge"))?;
        }
        if let Some(departments) = &changes.departments {
            replace_departments(&mut tx, id, departments)
                .await
                .map_err(db_error("Failed to replace incharge departments"))?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit incharge update"))?;

        self.find_incharge(id).await
    }
}

/* =========================
Leaves
========================= */

fn leave_where(filter: &LeaveFilter) -> WhereClause {
    let mut clause = WhereClause::new();
    if let Some(intern_id) = filter.intern_id {
        clause.eq("intern_id", SqlValue::U64(intern_id));
    }
    if let Some(status) = filter.status {
        clause.eq("status", SqlValue::String(status.to_string()));
    }
    clause
}

impl LeaveStore for MySqlPool {
    async fn insert_leave(&self, new: &NewLeave) -> Result<Leave, ApiError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leaves
                (intern_id, leave_type, start_date, end_date, total_days, reason)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.intern_id)
        .bind(new.leave_type)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.total_days)
        .bind(&new.reason)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, intern_id = new.intern_id, "Failed to create leave request");
            ApiError::Server
        })?;

        self.find_leave(result.last_insert_id())
            .await?
            .ok_or(ApiError::Server)
    }

    async fn find_leave(&self, id: u64) -> Result<Option<Leave>, ApiError> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leaves WHERE id = ?");
        sqlx::query_as::<_, Leave>(&sql)
            .bind(id)
            .fetch_optional(self)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, leave_id = id, "Failed to fetch leave request");
                ApiError::Server
            })
    }

    async fn list_leaves(
        &self,
        filter: &LeaveFilter,
        page: Option<Page>,
    ) -> Result<Vec<Leave>, ApiError> {
        let clause = leave_where(filter);
        let mut sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leaves{} ORDER BY created_at DESC, id DESC",
            clause.sql()
        );
        if page.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }

        let mut query = clause.bind_as(sqlx::query_as::<_, Leave>(&sql));
        if let Some(p) = page {
            query = query.bind(p.per_page).bind(p.offset());
        }

        query
            .fetch_all(self)
            .await
            .map_err(db_error("Failed to fetch leave list"))
    }

    async fn count_leaves(&self, filter: &LeaveFilter) -> Result<i64, ApiError> {
        let clause = leave_where(filter);
        let sql = format!("SELECT COUNT(*) FROM leaves{}", clause.sql());

        clause
            .bind_scalar(sqlx::query_scalar::<_, i64>(&sql))
            .fetch_one(self)
            .await
            .map_err(db_error("Failed to count leave requests"))
    }

    async fn transition_leave(
        &self,
        id: u64,
        from: LeaveStatus,
        to: LeaveStatus,
        decided_by: u64,
    ) -> Result<bool, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE leaves
            SET status = ?, decided_by = ?, decided_at = CURRENT_TIMESTAMP
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(to)
        .bind(decided_by)
        .bind(id)
        .bind(from)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id = id, target = %to, "Leave transition failed");
            ApiError::Server
        })?;

        Ok(result.rows_affected() == 1)
    }
}

/* =========================
Attendance
========================= */

impl AttendanceStore for MySqlPool {
    async fn insert_attendance(
        &self,
        meeting_date: NaiveDate,
        entries: &[NewAttendance],
    ) -> Result<u64, ApiError> {
        let mut tx = self
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        // same lock order for overlapping batches
        let mut ordered: Vec<&NewAttendance> = entries.iter().collect();
        ordered.sort_by_key(|e| e.intern_id);

        for entry in ordered {
            let result = sqlx::query(
                r#"
                INSERT INTO attendance (intern_id, meeting_date, status, remarks)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(entry.intern_id)
            .bind(meeting_date)
            .bind(entry.status)
            .bind(entry.remarks.as_deref())
            .execute(&mut *tx)
            .await;

            if let Err(e) = result {
                // tx rolls back on drop
                if is_constraint_violation(&e) {
                    return Err(ApiError::Conflict(format!(
                        "Attendance for intern {} on {} is already logged",
                        entry.intern_id, meeting_date
                    )));
                }
                if is_serialization_failure(&e) {
                    return Err(ApiError::Conflict(format!(
                        "Attendance for {meeting_date} was logged concurrently"
                    )));
                }
                tracing::error!(error = %e, intern_id = entry.intern_id, %meeting_date, "Failed to log attendance");
                return Err(ApiError::Server);
            }
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit attendance"))?;

        Ok(entries.len() as u64)
    }

    async fn list_attendance(
        &self,
        intern_id: Option<u64>,
        meeting_date: Option<NaiveDate>,
    ) -> Result<Vec<Attendance>, ApiError> {
        let mut clause = WhereClause::new();
        if let Some(intern_id) = intern_id {
            clause.eq("intern_id", SqlValue::U64(intern_id));
        }
        if let Some(date) = meeting_date {
            clause.eq("meeting_date", SqlValue::Date(date));
        }
        let sql = format!(
            "SELECT id, intern_id, meeting_date, status, remarks, created_at FROM attendance{} \
             ORDER BY meeting_date, intern_id",
            clause.sql()
        );

        clause
            .bind_as(sqlx::query_as::<_, Attendance>(&sql))
            .fetch(self)
            .try_collect()
            .await
            .map_err(db_error("Failed to fetch attendance"))
    }
}

/* =========================
Performance
========================= */

impl PerformanceStore for MySqlPool {
    async fn append_performance(
        &self,
        intern_id: u64,
        entry: &NewPerformanceEntry,
    ) -> Result<PerformanceEntry, ApiError> {
        let mut tx = self
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        // the intern row serializes month allocation, even before the first entry
        let locked = sqlx::query_scalar::<_, u64>("SELECT id FROM interns WHERE id = ? FOR UPDATE")
            .bind(intern_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock intern"))?;
        if locked.is_none() {
            return Err(ApiError::not_found("Intern"));
        }

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM performance_entries WHERE intern_id = ?",
        )
        .bind(intern_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to count performance entries"))?;
        let month = existing as u32 + 1;

        let result = sqlx::query(
            r#"
            INSERT INTO performance_entries
                (intern_id, month, total_tasks, tasks_completed, initiative, communication,
                 behaviour, overall_rating, completion_percentage, remarks)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(intern_id)
        .bind(month)
        .bind(entry.total_tasks)
        .bind(entry.tasks_completed)
        .bind(entry.initiative)
        .bind(entry.communication)
        .bind(entry.behaviour)
        .bind(entry.overall_rating)
        .bind(entry.completion_percentage)
        .bind(entry.remarks.as_deref())
        .execute(&mut *tx)
        .await;

        let id = match result {
            Ok(r) => r.last_insert_id(),
            Err(e) if is_lost_race(&e) => {
                return Err(ApiError::Conflict(format!(
                    "Month {month} was recorded concurrently for intern {intern_id}"
                )));
            }
            Err(e) => {
                tracing::error!(error = %e, intern_id, month, "Failed to record performance");
                return Err(ApiError::Server);
            }
        };

        tx.commit()
            .await
            .map_err(db_error("Failed to commit performance entry"))?;

        let sql = format!("SELECT {PERFORMANCE_COLUMNS} FROM performance_entries WHERE id = ?");
        sqlx::query_as::<_, PerformanceEntry>(&sql)
            .bind(id)
            .fetch_one(self)
            .await
            .map_err(db_error("Failed to fetch performance entry"))
    }

    async fn list_performance(&self, intern_id: u64) -> Result<Vec<PerformanceEntry>, ApiError> {
        let sql = format!(
            "SELECT {PERFORMANCE_COLUMNS} FROM performance_entries WHERE intern_id = ? ORDER BY month"
        );
        sqlx::query_as::<_, PerformanceEntry>(&sql)
            .bind(intern_id)
            .fetch_all(self)
            .await
            .map_err(db_error("Failed to fetch performance entries"))
    }
}
