//! Typed records stored in the document store
//!
//! Each entity has a read model (`User`, `Household`, `Job`,
//! `RequestCapture`) plus create/update payloads. Update payloads serialize
//! only the fields that were supplied, so a merge write never clears a field
//! the caller left out.
//!
//! Referential integrity between users, households, and jobs is not
//! enforced: ids stored in one record may point at documents that no longer
//! exist.

pub mod household;
pub mod job;
pub mod request_capture;
pub mod user;

pub use household::{CreateHousehold, Household, UpdateHousehold};
pub use job::{CreateJob, Job, JobStatus, UpdateJob};
pub use request_capture::{NewRequestCapture, RequestCapture};
pub use user::{CreateUser, UpdateUser, User};
