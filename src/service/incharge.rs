use std::collections::BTreeSet;

use tracing::info;

use crate::error::ApiError;
use crate::model::incharge::{Incharge, InchargeChanges, NewIncharge};
use crate::service::intern::valid_email;
use crate::store::InchargeStore;

/// Trimmed, de-duplicated and sorted. At least one department is required.
pub fn normalize_departments(departments: &[String]) -> Result<Vec<String>, ApiError> {
    let set: BTreeSet<String> = departments
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect();
    if set.is_empty() {
        return Err(ApiError::validation("At least one department is required"));
    }
    Ok(set.into_iter().collect())
}

pub async fn create<S: InchargeStore>(store: &S, new: NewIncharge) -> Result<Incharge, ApiError> {
    let name = new.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    let email = new.email.trim().to_lowercase();
    if !valid_email(&email) {
        return Err(ApiError::validation("email is not a valid address"));
    }

    let new = NewIncharge {
        name,
        email,
        phone: new.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
        departments: normalize_departments(&new.departments)?,
    };

    let incharge = store.insert_incharge(&new).await?;
    info!(incharge_id = incharge.id, departments = ?incharge.departments, "Incharge created");
    Ok(incharge)
}

pub async fn list<S: InchargeStore>(store: &S) -> Result<Vec<Incharge>, ApiError> {
    store.list_incharges().await
}

pub async fn update<S: InchargeStore>(
    store: &S,
    id: u64,
    mut changes: InchargeChanges,
) -> Result<Incharge, ApiError> {
    if changes.is_empty() {
        return Err(ApiError::validation("No changes supplied"));
    }
    if let Some(departments) = &changes.departments {
        changes.departments = Some(normalize_departments(departments)?);
    }

    let updated = store
        .update_incharge(id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Incharge"))?;
    info!(incharge_id = id, is_active = updated.is_active, "Incharge updated");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn ravi(departments: &[&str]) -> NewIncharge {
        NewIncharge {
            name: "Ravi Kumar".into(),
            email: " Ravi@Example.com ".into(),
            phone: None,
            departments: departments.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn departments_are_normalized() {
        let raw = vec![" Web ".to_string(), "Design".into(), "Web".into(), "".into()];
        assert_eq!(normalize_departments(&raw).unwrap(), ["Design", "Web"]);
        assert!(normalize_departments(&["  ".to_string()]).is_err());
    }

    #[actix_web::test]
    async fn create_normalizes_and_rejects_duplicates() {
        let store = MemoryStore::default();
        let created = create(&store, ravi(&["Web", "Design"])).await.unwrap();
        assert_eq!(created.email, "ravi@example.com");
        assert_eq!(created.departments, ["Design", "Web"]);
        assert!(created.is_active);

        let err = create(&store, ravi(&["Web"])).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err = create(&store, ravi(&[])).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_web::test]
    async fn update_toggles_and_reassigns() {
        let store = MemoryStore::default();
        let created = create(&store, ravi(&["Web"])).await.unwrap();

        let updated = update(
            &store,
            created.id,
            InchargeChanges {
                is_active: Some(false),
                departments: Some(vec!["Data".into()]),
            },
        )
        .await
        .unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.departments, ["Data"]);

        let err = update(&store, created.id, InchargeChanges::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = update(
            &store,
            404,
            InchargeChanges {
                is_active: Some(true),
                departments: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn list_is_ordered_by_name() {
        let store = MemoryStore::default();
        store.seed_incharge("Zoya", &["Web"], true);
        store.seed_incharge("Amit", &["Design"], true);
        let names: Vec<String> = list(&store).await.unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["Amit", "Zoya"]);
    }
}
