//! External collaborators
//!
//! The persistence seam used by timers and the HTTP client for the
//! time-tracking backend.

pub mod backend;
pub mod store;

// Re-export main types
pub use backend::{AssignedTask, BackendClient};
pub use store::TimeEntryStore;
