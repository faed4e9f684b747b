//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::GraphStore;

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn ping(&self) -> anyhow::Result<()> {
        self.ping().await
    }

    async fn list_tickets(&self) -> anyhow::Result<Vec<TicketRecord>> {
        self.list_tickets().await
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> anyhow::Result<TicketRecord> {
        self.create_ticket(ticket).await
    }

    async fn update_ticket(
        &self,
        id: &str,
        fields: &TicketFields,
    ) -> anyhow::Result<Option<TicketRecord>> {
        self.update_ticket(id, fields).await
    }

    async fn delete_ticket(&self, id: &str) -> anyhow::Result<bool> {
        self.delete_ticket(id).await
    }
}
