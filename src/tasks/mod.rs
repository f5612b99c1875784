//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod task_sync;

// Re-export main functions
pub use task_sync::{sync_assigned_tasks, task_sync_task};
