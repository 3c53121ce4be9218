//! User model
//!
//! Users are keyed by their normalized phone number (see
//! [`crate::phone::normalize`]). The `phone` field always equals the key.
//!
//! # Example
//!
//! ```no_run
//! use vibeagent_shared::models::user::{UpdateUser, User};
//! use vibeagent_shared::store::memory::MemoryStore;
//!
//! # async fn example() -> Result<(), vibeagent_shared::store::StoreError> {
//! let store = MemoryStore::new();
//! let user = User::upsert(
//!     &store,
//!     "+11234567890",
//!     UpdateUser {
//!         name: Some("Ada".to_string()),
//!         ..Default::default()
//!     },
//! )
//! .await?;
//! assert_eq!(user.id, "+11234567890");
//! # Ok(())
//! # }
//! ```

use crate::store::{
    Collection, Document, DocumentStore, DocumentWrite, SetMode, StoreError, CREATED_AT,
    UPDATED_AT,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Document key (normalized phone number)
    pub id: String,

    /// Normalized phone number
    #[serde(default)]
    pub phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Households this user belongs to, in the order they were assigned
    #[serde(default)]
    pub household_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating (or replacing) a user
///
/// `phone` must already be normalized; it becomes the document key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUser {
    pub phone: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub household_ids: Vec<String>,
}

/// Input for a merge update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_ids: Option<Vec<String>>,
}

impl User {
    /// Creates a user keyed by `data.phone`, replacing any existing document.
    pub async fn create(store: &dyn DocumentStore, data: CreateUser) -> Result<Self, StoreError> {
        let write = DocumentWrite::from_record(&data)?
            .stamp(UPDATED_AT)
            .stamp_on_insert(CREATED_AT);

        store
            .set(Collection::Users, &data.phone, write, SetMode::Overwrite)
            .await?
            .into_record()
    }

    /// Finds a user by normalized phone number
    pub async fn find_by_phone(store: &dyn DocumentStore, phone: &str) -> Result<Option<Self>, StoreError> {
        store
            .get(Collection::Users, phone)
            .await?
            .map(Document::into_record)
            .transpose()
    }

    /// Creates or merge-updates the user keyed by `phone`.
    ///
    /// `created_at` is only stamped when the user did not exist yet.
    pub async fn upsert(
        store: &dyn DocumentStore,
        phone: &str,
        changes: UpdateUser,
    ) -> Result<Self, StoreError> {
        let write = DocumentWrite::from_record(&changes)?
            .with_field("phone", phone)
            .stamp(UPDATED_AT)
            .stamp_on_insert(CREATED_AT);

        store
            .set(Collection::Users, phone, write, SetMode::Merge)
            .await?
            .into_record()
    }
}
