//! Neo4j client for interacting with the ticket graph

use super::models::*;
use anyhow::{Context, Result};
use neo4rs::{query, Graph, Query};
use std::sync::Arc;

/// Columns every ticket query returns, in `TicketRecord` order.
///
/// Missing properties come back as empty strings so that decoding reports
/// them as invalid rows instead of transport failures.
const TICKET_COLUMNS: &str = r#"
    coalesce(t.id, '') AS id,
    coalesce(t.title, '') AS title,
    coalesce(t.status, '') AS status,
    coalesce(t.priority, '') AS priority,
    coalesce(t.category, '') AS category,
    coalesce(t.assigned_to, '') AS assigned_to,
    coalesce(toString(t.created_at), '') AS created_at
"#;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        // Initialize schema
        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize the graph schema with constraints and indexes
    async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            "CREATE CONSTRAINT ticket_id IF NOT EXISTS FOR (t:Ticket) REQUIRE t.id IS UNIQUE",
        ];

        let indexes = vec![
            "CREATE INDEX ticket_status IF NOT EXISTS FOR (t:Ticket) ON (t.status)",
            "CREATE INDEX ticket_priority IF NOT EXISTS FOR (t:Ticket) ON (t.priority)",
            "CREATE INDEX ticket_created_at IF NOT EXISTS FOR (t:Ticket) ON (t.created_at)",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        for index in indexes {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!("Index may already exist: {}", e);
            }
        }

        Ok(())
    }

    /// Execute a parameterized Cypher query and collect every row
    pub(crate) async fn execute_with_params(&self, q: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Run `RETURN 1` and drain the result
    pub async fn ping(&self) -> Result<()> {
        self.execute_with_params(query("RETURN 1 AS ok"))
            .await
            .context("Liveness query failed")?;
        Ok(())
    }

    // ========================================================================
    // Ticket operations
    // ========================================================================

    /// List all tickets, newest first (ties broken by id)
    pub async fn list_tickets(&self) -> Result<Vec<TicketRecord>> {
        let cypher = format!(
            r#"
            MATCH (t:Ticket)
            RETURN {}
            ORDER BY t.created_at DESC, t.id
            "#,
            TICKET_COLUMNS
        );

        let rows = self
            .execute_with_params(query(&cypher))
            .await
            .context("Failed to list tickets")?;
        tracing::debug!(rows = rows.len(), "Fetched ticket rows");

        rows.iter().map(row_to_record).collect()
    }

    /// Create a ticket node; id and creation time come from the database
    pub async fn create_ticket(&self, ticket: &NewTicket) -> Result<TicketRecord> {
        let cypher = format!(
            r#"
            CREATE (t:Ticket {{
                id: randomUUID(),
                title: $title,
                status: $status,
                priority: $priority,
                category: $category,
                assigned_to: $assigned_to,
                created_at: datetime({{timezone: 'UTC'}})
            }})
            RETURN {}
            "#,
            TICKET_COLUMNS
        );
        let q = with_field_params(query(&cypher), ticket);

        let rows = self
            .execute_with_params(q)
            .await
            .context("Failed to create ticket")?;
        let row = rows
            .first()
            .context("CREATE returned no row for the new ticket")?;
        row_to_record(row)
    }

    /// Overwrite the mutable fields of an existing ticket
    pub async fn update_ticket(
        &self,
        id: &str,
        fields: &TicketFields,
    ) -> Result<Option<TicketRecord>> {
        let cypher = format!(
            r#"
            MATCH (t:Ticket {{id: $id}})
            SET t.title = $title,
                t.status = $status,
                t.priority = $priority,
                t.category = $category,
                t.assigned_to = $assigned_to
            RETURN {}
            "#,
            TICKET_COLUMNS
        );
        let q = with_field_params(query(&cypher).param("id", id), fields);

        let rows = self
            .execute_with_params(q)
            .await
            .with_context(|| format!("Failed to update ticket {}", id))?;
        rows.first().map(row_to_record).transpose()
    }

    /// Delete a ticket. Returns whether a node was removed.
    pub async fn delete_ticket(&self, id: &str) -> Result<bool> {
        let q = query(
            r#"
            MATCH (t:Ticket {id: $id})
            DETACH DELETE t
            RETURN count(t) AS deleted
            "#,
        )
        .param("id", id);

        let rows = self
            .execute_with_params(q)
            .await
            .with_context(|| format!("Failed to delete ticket {}", id))?;
        let deleted = match rows.first() {
            Some(row) => row.get::<i64>("deleted")?,
            None => 0,
        };
        Ok(deleted > 0)
    }
}

fn with_field_params(q: Query, fields: &TicketFields) -> Query {
    q.param("title", fields.title.clone())
        .param("status", fields.status.label())
        .param("priority", fields.priority.label())
        .param("category", fields.category.clone())
        .param("assigned_to", fields.assigned_to.clone())
}

/// Helper to convert a projected row to a TicketRecord
fn row_to_record(row: &neo4rs::Row) -> Result<TicketRecord> {
    Ok(TicketRecord {
        id: row.get("id")?,
        title: row.get("title")?,
        status: row.get("status")?,
        priority: row.get("priority")?,
        category: row.get("category")?,
        assigned_to: row.get("assigned_to")?,
        created_at: row.get("created_at")?,
    })
}
