use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::Page;
use crate::model::intern::{
    Intern, InternApplication, InternChanges, InternFilter, InternStatus, NewIntern,
};
use crate::service::access::Scope;
use crate::store::InternStore;

/// Query string of the staff intern listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InternQuery {
    pub department: Option<String>,
    pub status: Option<InternStatus>,
    /// Case-insensitive match on name, email or intern code
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub fn intern_code() -> String {
    let raw = Uuid::new_v4().to_simple().to_string();
    format!("INT-{}", raw[..8].to_uppercase())
}

pub(crate) fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Validates and normalizes an application form.
pub fn prepare(application: InternApplication) -> Result<NewIntern, ApiError> {
    let name = required("name", &application.name)?;
    let domain = required("domain", &application.domain)?;
    let college = required("college", &application.college)?;

    let email = application.email.trim().to_lowercase();
    if !valid_email(&email) {
        return Err(ApiError::validation("email is not a valid address"));
    }

    let phone = application.phone.trim().to_string();
    if !valid_phone(&phone) {
        return Err(ApiError::validation(
            "phone must have 7 to 15 digits with an optional leading +",
        ));
    }

    if !(1..=12).contains(&application.duration_months) {
        return Err(ApiError::validation(
            "duration_months must be between 1 and 12",
        ));
    }

    Ok(NewIntern {
        intern_code: intern_code(),
        name,
        email,
        phone,
        domain,
        college,
        resume_url: application
            .resume_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty()),
        duration_months: application.duration_months,
    })
}

pub async fn apply<S: InternStore>(
    store: &S,
    application: InternApplication,
) -> Result<Intern, ApiError> {
    let new = prepare(application)?;
    let intern = store.insert_intern(&new).await?;
    info!(
        intern_id = intern.id,
        intern_code = %intern.intern_code,
        domain = %intern.domain,
        "Internship application received"
    );
    Ok(intern)
}

#[instrument(skip(store, scope))]
pub async fn list<S: InternStore>(
    store: &S,
    scope: &Scope,
    query: &InternQuery,
) -> Result<(Vec<Intern>, i64, Page), ApiError> {
    let filter = InternFilter {
        domains: scope.domains(query.department.as_deref())?,
        statuses: query.status.into_iter().collect(),
        search: query.search.clone(),
    };
    let page = Page::new(query.page, query.per_page);

    let total = store.count_interns(&filter).await?;
    let interns = store.list_interns(&filter, Some(page)).await?;
    Ok((interns, total, page))
}

pub async fn get<S: InternStore>(store: &S, scope: &Scope, id: u64) -> Result<Intern, ApiError> {
    let intern = store
        .find_intern(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Intern"))?;
    scope.ensure(&intern.domain)?;
    Ok(intern)
}

/// The authenticated intern's own record
pub async fn profile<S: InternStore>(store: &S, intern_id: u64) -> Result<Intern, ApiError> {
    get(store, &Scope::All, intern_id).await
}

pub async fn update<S: InternStore>(
    store: &S,
    id: u64,
    mut changes: InternChanges,
) -> Result<Intern, ApiError> {
    if changes.is_empty() {
        return Err(ApiError::validation("No changes supplied"));
    }
    if let Some(domain) = changes.domain.take() {
        changes.domain = Some(required("domain", &domain)?);
    }

    let current = store
        .find_intern(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Intern"))?;

    if changes.status == Some(InternStatus::Active)
        && changes.join_date.is_none()
        && current.join_date.is_none()
    {
        changes.join_date = Some(Utc::now().date_naive());
    }

    let join_date = changes.join_date.or(current.join_date);
    let end_date = changes.end_date.or(current.end_date);
    if let (Some(join), Some(end)) = (join_date, end_date) {
        if end < join {
            return Err(ApiError::validation("end_date cannot be before join_date"));
        }
    }

    let updated = store
        .update_intern(id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Intern"))?;
    info!(intern_id = id, status = %updated.status, "Intern updated");
    Ok(updated)
}
