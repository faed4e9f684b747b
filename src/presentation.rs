//! Ticket → display-row mapping
//!
//! Pure functions from core types to the strings and style classes a table
//! view needs. Nothing here touches the store or the view list.

use crate::neo4j::models::{Ticket, TicketPriority, TicketStatus};
use serde::Serialize;

/// Badge style class for a status cell
pub fn status_class(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Open => "status-open",
        TicketStatus::InProgress => "status-progress",
        TicketStatus::Resolved => "status-resolved",
        TicketStatus::Closed => "status-closed",
    }
}

/// Badge style class for a priority cell
pub fn priority_class(priority: TicketPriority) -> &'static str {
    match priority {
        TicketPriority::Low => "priority-low",
        TicketPriority::Medium => "priority-medium",
        TicketPriority::High => "priority-high",
        TicketPriority::Critical => "priority-critical",
    }
}

/// One table row, every cell already formatted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketRow {
    pub id: String,
    pub title: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub priority: &'static str,
    pub priority_class: &'static str,
    pub category: String,
    pub assigned_to: String,
    pub created_at: String,
}

impl From<&Ticket> for TicketRow {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id.clone(),
            title: ticket.title.clone(),
            status: ticket.status.label(),
            status_class: status_class(ticket.status),
            priority: ticket.priority.label(),
            priority_class: priority_class(ticket.priority),
            category: ticket.category.clone(),
            assigned_to: if ticket.is_assigned() {
                ticket.assigned_to.clone()
            } else {
                "Unassigned".to_string()
            },
            created_at: ticket.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

impl TicketRow {
    /// Fixed-width line for terminal output
    pub fn to_line(&self) -> String {
        format!(
            "{:<36}  {:<11}  {:<8}  {:<12}  {:<14}  {}  {}",
            self.id,
            self.status,
            self.priority,
            self.category,
            self.assigned_to,
            self.created_at,
            self.title
        )
    }
}
