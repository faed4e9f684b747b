//! In-memory view of the persisted tickets
//!
//! The list is only mutated by [`TicketDesk`](super::TicketDesk) after the
//! store has confirmed the matching write, so mutators are crate-private.
//! Everything public here is a derived read.

use crate::neo4j::models::{Ticket, TicketPriority, TicketStatus};
use serde::{Deserialize, Serialize};

/// Maximum length of the "recent tickets" prefix
pub const RECENT_LIMIT: usize = 5;

/// Ordered tickets as last confirmed by the store, newest first
#[derive(Debug, Clone, Default)]
pub struct TicketViewList {
    tickets: Vec<Ticket>,
}

impl TicketViewList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The first `min(limit, len)` tickets in list order
    pub fn recent(&self, limit: usize) -> &[Ticket] {
        &self.tickets[..limit.min(self.tickets.len())]
    }

    /// Tickets matching every criterion of `filter`, in list order
    pub fn filtered<'a>(&'a self, filter: &'a TicketFilter) -> impl Iterator<Item = &'a Ticket> {
        self.tickets.iter().filter(move |t| filter.matches(t))
    }

    // ------------------------------------------------------------------------
    // Mutations (store-confirmed only)
    // ------------------------------------------------------------------------

    pub(crate) fn replace_all(&mut self, tickets: Vec<Ticket>) {
        self.tickets = tickets;
    }

    pub(crate) fn clear(&mut self) {
        self.tickets.clear();
    }

    /// New tickets are the newest, so they go first
    pub(crate) fn insert_created(&mut self, ticket: Ticket) {
        self.tickets.retain(|t| t.id != ticket.id);
        self.tickets.insert(0, ticket);
    }

    /// Replace the ticket with the same id in place. A ticket the list did
    /// not know about yet is inserted at its `created_at` position.
    pub(crate) fn apply_updated(&mut self, ticket: Ticket) {
        if let Some(slot) = self.tickets.iter_mut().find(|t| t.id == ticket.id) {
            *slot = ticket;
            return;
        }
        let pos = self
            .tickets
            .iter()
            .position(|t| t.created_at < ticket.created_at)
            .unwrap_or(self.tickets.len());
        self.tickets.insert(pos, ticket);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Ticket> {
        let pos = self.tickets.iter().position(|t| t.id == id)?;
        Some(self.tickets.remove(pos))
    }
}

/// Status / priority / free-text criteria. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    /// Case-insensitive match on id, title, category or assignee
    pub search: Option<String>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if self.status.is_some_and(|s| s != ticket.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != ticket.priority) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                [&ticket.id, &ticket.title, &ticket.category, &ticket.assigned_to]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}
