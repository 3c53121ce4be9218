//! Job model
//!
//! A job is a unit of work for a household, requested by a user. Status is
//! an open set of strings; the well-known values are exposed as constants
//! on [`JobStatus`].
//!
//! # Active jobs
//!
//! ```text
//! open ─┬─> in_progress ─┬─> completed
//!       └─> awaiting_user ┘
//! ```
//!
//! A job counts as *active* while its status is `open`, `in_progress`, or
//! `awaiting_user`.

use crate::store::{
    Collection, Document, DocumentStore, DocumentWrite, Filter, SetMode, StoreError, CREATED_AT,
    UPDATED_AT,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Job status string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobStatus(String);

impl JobStatus {
    pub const OPEN: &'static str = "open";
    pub const IN_PROGRESS: &'static str = "in_progress";
    pub const AWAITING_USER: &'static str = "awaiting_user";
    pub const COMPLETED: &'static str = "completed";

    /// Statuses that make a job active
    pub const ACTIVE: [&'static str; 3] = [Self::OPEN, Self::IN_PROGRESS, Self::AWAITING_USER];

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn open() -> Self {
        Self::new(Self::OPEN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::open()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,

    /// Household the job belongs to (not enforced)
    #[serde(default)]
    pub household_id: String,

    /// Phone key of the requesting user (not enforced)
    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Absent only for jobs first written through an upsert without a status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    pub household_id: String,
    pub user_id: String,
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    pub status: JobStatus,
}

/// Input for a merge update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateJob {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

impl Job {
    /// Creates a job under a generated id
    pub async fn create(store: &dyn DocumentStore, data: CreateJob) -> Result<Self, StoreError> {
        let write = DocumentWrite::from_record(&data)?
            .stamp(UPDATED_AT)
            .stamp_on_insert(CREATED_AT);

        store.add(Collection::Jobs, write).await?.into_record()
    }

    /// Finds a job by id
    pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> Result<Option<Self>, StoreError> {
        store
            .get(Collection::Jobs, id)
            .await?
            .map(Document::into_record)
            .transpose()
    }

    /// Creates or merge-updates the job with the given id
    pub async fn upsert(store: &dyn DocumentStore, id: &str, changes: UpdateJob) -> Result<Self, StoreError> {
        let write = DocumentWrite::from_record(&changes)?
            .stamp(UPDATED_AT)
            .stamp_on_insert(CREATED_AT);

        store
            .set(Collection::Jobs, id, write, SetMode::Merge)
            .await?
            .into_record()
    }

    /// Lists a user's active jobs in store order
    pub async fn find_active_for_user(store: &dyn DocumentStore, user_id: &str) -> Result<Vec<Self>, StoreError> {
        let filters = [
            Filter::eq("user_id", user_id),
            Filter::one_of("status", JobStatus::ACTIVE),
        ];

        store
            .query(Collection::Jobs, &filters)
            .await?
            .into_iter()
            .map(Document::into_record)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    const USER: &str = "+11234567890";

    fn new_job(title: &str, user_id: &str, status: &str) -> CreateJob {
        CreateJob {
            household_id: "house123".to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            category: Some("plumbing".to_string()),
            status: JobStatus::new(status),
        }
    }

    #[test]
    fn test_status_defaults_to_open() {
        assert_eq!(JobStatus::default().as_str(), "open");
        assert!(!JobStatus::ACTIVE.contains(&JobStatus::COMPLETED));
    }

    #[test]
    fn test_status_serializes_as_plain_string() {
        assert_eq!(
            serde_json::to_value(JobStatus::new("in_progress")).unwrap(),
            serde_json::json!("in_progress")
        );
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryStore::new();

        let job = Job::create(&store, new_job("Fix plumbing", USER, JobStatus::OPEN))
            .await
            .unwrap();
        assert_eq!(job.status, Some(JobStatus::open()));
        assert!(job.created_at.is_some());

        let found = Job::find_by_id(&store, &job.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Fix plumbing");
    }

    #[tokio::test]
    async fn test_upsert_status_only() {
        let store = MemoryStore::new();
        let job = Job::create(&store, new_job("Paint fence", USER, JobStatus::OPEN))
            .await
            .unwrap();

        let updated = Job::upsert(
            &store,
            &job.id,
            UpdateJob {
                status: Some(JobStatus::new(JobStatus::COMPLETED)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.status.unwrap().as_str(), "completed");
        assert_eq!(updated.title, "Paint fence");
    }

    #[tokio::test]
    async fn test_find_active_for_user() {
        let store = MemoryStore::new();
        for (title, user, status) in [
            ("open", USER, JobStatus::OPEN),
            ("done", USER, JobStatus::COMPLETED),
            ("waiting", USER, JobStatus::AWAITING_USER),
            ("someone else", "+19999999999", JobStatus::OPEN),
            ("working", USER, JobStatus::IN_PROGRESS),
        ] {
            Job::create(&store, new_job(title, user, status)).await.unwrap();
        }

        let active = Job::find_active_for_user(&store, USER).await.unwrap();
        let titles: Vec<_> = active.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["open", "waiting", "working"]);
    }
}
