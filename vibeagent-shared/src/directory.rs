//! User detail aggregation
//!
//! Joins a user with the households it references and its active jobs.
//!
//! ```text
//! get_user_detail("(123) 456-7890")
//!   ├── normalize phone        -> "+11234567890"
//!   ├── users/+11234567890     (404 if missing)
//!   ├── households/{id} ...    (one lookup per household_ids entry, concurrent)
//!   └── jobs where user_id == key and status in ACTIVE
//! ```
//!
//! Household references are not enforced, so a user may point at
//! households that were deleted. Those lookups, and any that fail outright,
//! are dropped from the result instead of failing the whole read.

use crate::{
    models::{Household, Job, User},
    phone::{self, PhoneError},
    store::{DocumentStore, StoreError},
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// A user with its resolved households and active jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    pub user: User,

    /// Households that exist, in `household_ids` order
    pub households: Vec<Household>,

    #[serde(rename = "activeJobs")]
    pub active_jobs: Vec<Job>,
}

/// Aggregation failures
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("user {0} not found")]
    UserNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Loads a user by raw phone number together with its households and
/// active jobs.
pub async fn get_user_detail(store: &dyn DocumentStore, raw_phone: &str) -> Result<UserDetail, DirectoryError> {
    let phone = phone::normalize(raw_phone)?;

    let user = User::find_by_phone(store, &phone)
        .await?
        .ok_or_else(|| DirectoryError::UserNotFound(phone.clone()))?;

    let (households, active_jobs) = futures::join!(
        load_households(store, &user.household_ids),
        Job::find_active_for_user(store, &phone),
    );
    let active_jobs = active_jobs?;

    debug!(
        %phone,
        households = households.len(),
        active_jobs = active_jobs.len(),
        "Loaded user detail"
    );

    Ok(UserDetail {
        user,
        households,
        active_jobs,
    })
}

async fn load_households(store: &dyn DocumentStore, ids: &[String]) -> Vec<Household> {
    let lookups = ids.iter().map(|id| async move {
        match Household::find_by_id(store, id).await {
            Ok(Some(household)) => Some(household),
            Ok(None) => {
                debug!(household_id = %id, "Dropping dangling household reference");
                None
            }
            Err(e) => {
                warn!(household_id = %id, error = %e, "Household lookup failed, dropping");
                None
            }
        }
    });

    join_all(lookups).await.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{CreateJob, JobStatus, UpdateHousehold, UpdateUser},
        store::{
            memory::MemoryStore, Collection, Document, DocumentWrite, Filter, SetMode,
        },
    };
    use async_trait::async_trait;

    const PHONE: &str = "+11234567890";

    async fn seed_user(store: &dyn DocumentStore, household_ids: &[&str]) {
        User::upsert(
            store,
            PHONE,
            UpdateUser {
                name: Some("Test User".to_string()),
                household_ids: Some(household_ids.iter().map(|s| s.to_string()).collect()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    async fn seed_household(store: &dyn DocumentStore, id: &str, address: &str) {
        Household::upsert(
            store,
            id,
            UpdateHousehold {
                address: Some(address.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    async fn seed_job(store: &dyn DocumentStore, title: &str, status: &str) {
        Job::create(
            store,
            CreateJob {
                household_id: "house1".to_string(),
                user_id: PHONE.to_string(),
                title: title.to_string(),
                category: None,
                status: JobStatus::new(status),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_phone() {
        let store = MemoryStore::new();
        let err = get_user_detail(&store, "invalid-phone").await.unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidPhone(_)));
    }

    #[tokio::test]
    async fn test_user_not_found() {
        let store = MemoryStore::new();
        let err = get_user_detail(&store, PHONE).await.unwrap_err();
        assert!(matches!(err, DirectoryError::UserNotFound(p) if p == PHONE));
    }

    #[tokio::test]
    async fn test_full_detail_with_formatted_phone() {
        let store = MemoryStore::new();
        seed_user(&store, &["house1", "house2"]).await;
        seed_household(&store, "house2", "2 Second St").await;
        seed_household(&store, "house1", "1 First St").await;
        seed_job(&store, "Open job", JobStatus::OPEN).await;
        seed_job(&store, "Finished job", JobStatus::COMPLETED).await;
        seed_job(&store, "Waiting job", JobStatus::AWAITING_USER).await;

        let detail = get_user_detail(&store, "(123) 456-7890").await.unwrap();

        assert_eq!(detail.user.id, PHONE);
        let addresses: Vec<_> = detail
            .households
            .iter()
            .map(|h| h.address.as_deref().unwrap())
            .collect();
        assert_eq!(addresses, vec!["1 First St", "2 Second St"]);
        let titles: Vec<_> = detail.active_jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Open job", "Waiting job"]);
    }

    #[tokio::test]
    async fn test_dangling_household_is_dropped() {
        let store = MemoryStore::new();
        seed_user(&store, &["house1", "deleted"]).await;
        seed_household(&store, "house1", "123 Main St").await;

        let detail = get_user_detail(&store, PHONE).await.unwrap();

        assert_eq!(detail.households.len(), 1);
        assert_eq!(detail.households[0].id, "house1");
        assert!(detail.active_jobs.is_empty());
    }

    /// Store whose household lookups fail for one id
    struct FlakyStore {
        inner: MemoryStore,
        failing_id: &'static str,
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        fn backend(&self) -> &'static str {
            "flaky"
        }

        async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
            if collection == Collection::Households && id == self.failing_id {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            self.inner.get(collection, id).await
        }

        async fn set(
            &self,
            collection: Collection,
            id: &str,
            write: DocumentWrite,
            mode: SetMode,
        ) -> Result<Document, StoreError> {
            self.inner.set(collection, id, write, mode).await
        }

        async fn add(&self, collection: Collection, write: DocumentWrite) -> Result<Document, StoreError> {
            self.inner.add(collection, write).await
        }

        async fn query(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<Document>, StoreError> {
            self.inner.query(collection, filters).await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_household_lookup_is_dropped() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            failing_id: "broken",
        };
        seed_user(&store, &["broken", "house1"]).await;
        seed_household(&store, "house1", "123 Main St").await;
        seed_household(&store, "broken", "unreachable").await;

        let detail = get_user_detail(&store, PHONE).await.unwrap();

        assert_eq!(detail.households.len(), 1);
        assert_eq!(detail.households[0].id, "house1");
    }

    #[test]
    fn test_detail_serializes_active_jobs_in_camel_case() {
        let detail = UserDetail {
            user: User {
                id: PHONE.to_string(),
                phone: PHONE.to_string(),
                name: None,
                email: None,
                household_ids: vec![],
                created_at: None,
                updated_at: None,
            },
            households: vec![],
            active_jobs: vec![],
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert!(value.get("activeJobs").is_some());
        assert!(value.get("active_jobs").is_none());
    }
}
