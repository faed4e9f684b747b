//! Ticket repository: typed CRUD over the graph store

use crate::error::{Result, TicketError};
use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Maps tickets to and from the graph store.
///
/// Cheap to clone; clones share the same store handle.
#[derive(Clone)]
pub struct TicketRepository {
    store: Arc<dyn GraphStore>,
    timeout: Duration,
}

impl TicketRepository {
    pub fn new(store: Arc<dyn GraphStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Bound a store call by the configured timeout and classify its failure
    async fn round_trip<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(TicketError::from_store(e)),
            Err(_) => Err(TicketError::Persistence(format!(
                "{} timed out after {:?}",
                op, self.timeout
            ))),
        }
    }

    /// Every ticket in the store, newest first.
    ///
    /// A single undecodable row fails the whole call; a partial list is
    /// never returned.
    pub async fn find_all(&self) -> Result<Vec<Ticket>> {
        let records = self
            .round_trip("find_all", self.store.list_tickets())
            .await
            .inspect_err(|e| error!("Failed to load tickets: {}", e))?;

        let tickets = records
            .into_iter()
            .map(TicketRecord::into_ticket)
            .collect::<Result<Vec<_>>>()
            .inspect_err(|e| error!("Failed to decode tickets: {}", e))?;

        info!("Loaded {} tickets from Neo4j", tickets.len());
        Ok(tickets)
    }

    /// Persist a new ticket and return it with its store-assigned id and
    /// creation time
    pub async fn create(&self, ticket: &NewTicket) -> Result<Ticket> {
        let record = self
            .round_trip("create", self.store.create_ticket(ticket))
            .await
            .inspect_err(|e| error!(title = %ticket.title, "Failed to create ticket: {}", e))?;

        let created = record.into_ticket()?;
        debug!(id = %created.id, "Ticket created");
        Ok(created)
    }

    /// Overwrite every mutable field of an existing ticket.
    ///
    /// `id` selects the node; `created_at` is never written.
    pub async fn update(&self, ticket: &Ticket) -> Result<Ticket> {
        let fields = ticket.fields();
        let record = self
            .round_trip("update", self.store.update_ticket(&ticket.id, &fields))
            .await
            .inspect_err(|e| error!(id = %ticket.id, "Failed to update ticket: {}", e))?
            .ok_or_else(|| TicketError::NotFound(ticket.id.clone()))?;

        let updated = record.into_ticket()?;
        debug!(id = %updated.id, "Ticket updated");
        Ok(updated)
    }

    /// Remove a ticket. `false` means nothing was deleted, either because the
    /// id is unknown or because the store call failed.
    pub async fn delete(&self, id: &str) -> bool {
        match self.round_trip("delete", self.store.delete_ticket(id)).await {
            Ok(true) => {
                debug!(id, "Ticket deleted");
                true
            }
            Ok(false) => {
                warn!(id, "Delete matched no ticket");
                false
            }
            Err(e) => {
                error!(id, "Failed to delete ticket: {}", e);
                false
            }
        }
    }
}
