//! GraphStore trait definition
//!
//! Defines the abstract interface for the ticket graph operations.
//! This trait mirrors the public async methods of `Neo4jClient`,
//! enabling testing with mock implementations and future backend swaps.

use crate::neo4j::models::*;
use anyhow::Result;
use async_trait::async_trait;

/// Abstract interface for ticket storage in the graph database.
///
/// Methods return raw [`TicketRecord`] rows; decoding and error
/// classification belong to the repository layer.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Execute a trivial round-trip query, discarding the result
    async fn ping(&self) -> Result<()>;

    /// List every ticket, newest first
    async fn list_tickets(&self) -> Result<Vec<TicketRecord>>;

    /// Persist a new ticket node. The store assigns `id` and `created_at`.
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<TicketRecord>;

    /// Overwrite the mutable fields of the ticket with this id.
    /// Returns `None` when no such ticket exists.
    async fn update_ticket(&self, id: &str, fields: &TicketFields)
        -> Result<Option<TicketRecord>>;

    /// Remove the ticket with this id. Returns `false` when nothing matched.
    async fn delete_ticket(&self, id: &str) -> Result<bool>;
}
