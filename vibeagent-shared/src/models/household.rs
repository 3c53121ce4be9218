//! Household model
//!
//! Households are keyed by a generated opaque id, or by a caller-chosen id
//! when first written through an upsert.

use crate::store::{
    Collection, Document, DocumentStore, DocumentWrite, SetMode, StoreError, CREATED_AT,
    UPDATED_AT,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A household document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// IANA timezone name, e.g. `America/New_York`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Phone key of the owning user (not enforced)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<String>,

    /// Phone keys of member users (not enforced)
    #[serde(default)]
    pub user_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a household
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateHousehold {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<String>,

    #[serde(default)]
    pub user_ids: Vec<String>,
}

/// Input for a merge update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHousehold {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<String>>,
}

impl Household {
    /// Creates a household under a generated id
    pub async fn create(store: &dyn DocumentStore, data: CreateHousehold) -> Result<Self, StoreError> {
        let write = DocumentWrite::from_record(&data)?
            .stamp(UPDATED_AT)
            .stamp_on_insert(CREATED_AT);

        store
            .add(Collection::Households, write)
            .await?
            .into_record()
    }

    /// Finds a household by id
    pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> Result<Option<Self>, StoreError> {
        store
            .get(Collection::Households, id)
            .await?
            .map(Document::into_record)
            .transpose()
    }

    /// Creates or merge-updates the household with the given id
    pub async fn upsert(
        store: &dyn DocumentStore,
        id: &str,
        changes: UpdateHousehold,
    ) -> Result<Self, StoreError> {
        let write = DocumentWrite::from_record(&changes)?
            .stamp(UPDATED_AT)
            .stamp_on_insert(CREATED_AT);

        store
            .set(Collection::Households, id, write, SetMode::Merge)
            .await?
            .into_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let store = MemoryStore::new();

        let household = Household::create(
            &store,
            CreateHousehold {
                address: Some("456 Oak Ave".to_string()),
                timezone: Some("America/Chicago".to_string()),
                owner_user_id: Some("+11234567890".to_string()),
                user_ids: vec!["+11234567890".to_string()],
            },
        )
        .await
        .unwrap();

        assert!(!household.id.is_empty());
        assert_eq!(household.address.as_deref(), Some("456 Oak Ave"));
        assert!(household.created_at.is_some());

        let found = Household::find_by_id(&store, &household.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, household);
    }

    #[tokio::test]
    async fn test_upsert_with_caller_chosen_id() {
        let store = MemoryStore::new();

        let created = Household::upsert(
            &store,
            "house123",
            UpdateHousehold {
                address: Some("789 Pine St".to_string()),
                timezone: Some("America/Denver".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(created.id, "house123");

        let updated = Household::upsert(
            &store,
            "house123",
            UpdateHousehold {
                address: Some("1 Elm St".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.address.as_deref(), Some("1 Elm St"));
        assert_eq!(updated.timezone.as_deref(), Some("America/Denver"));
        assert_eq!(updated.created_at, created.created_at);
    }
}
