//! Desk notification types

use crate::dashboard::DashboardStats;
use serde::{Deserialize, Serialize};

/// What the desk was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeskAction {
    Loaded,
    Created,
    Updated,
    Deleted,
}

/// What happened to the view list as a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewChange {
    /// Store write confirmed and mirrored in the list
    Applied,
    /// The operation failed; the list is exactly as before
    Unchanged,
    /// A reload failed; the list was emptied rather than left stale
    Cleared,
}

/// Emitted once per completed desk operation, success or failure.
///
/// Must be Clone for `tokio::sync::broadcast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskEvent {
    pub action: DeskAction,
    pub change: ViewChange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    /// Failure message shown to the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stats recomputed after the operation
    pub stats: DashboardStats,
    /// ISO 8601 timestamp
    pub timestamp: String,
}

impl DeskEvent {
    fn new(action: DeskAction, change: ViewChange, stats: DashboardStats) -> Self {
        Self {
            action,
            change,
            ticket_id: None,
            error: None,
            stats,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn applied(action: DeskAction, stats: DashboardStats) -> Self {
        Self::new(action, ViewChange::Applied, stats)
    }

    pub fn unchanged(action: DeskAction, error: impl Into<String>, stats: DashboardStats) -> Self {
        Self::new(action, ViewChange::Unchanged, stats).with_error(error)
    }

    pub fn cleared(error: impl Into<String>, stats: DashboardStats) -> Self {
        Self::new(DeskAction::Loaded, ViewChange::Cleared, stats).with_error(error)
    }

    pub fn with_ticket(mut self, id: impl Into<String>) -> Self {
        self.ticket_id = Some(id.into());
        self
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Anything that can publish desk events
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: DeskEvent);
}
