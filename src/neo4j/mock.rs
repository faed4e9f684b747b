//! In-memory mock implementation of GraphStore for testing.
//!
//! Stores raw `TicketRecord` rows in a `tokio::sync::RwLock<HashMap>` and
//! supports failure injection for reads, writes and connectivity.
//! Conditionally compiled with `#[cfg(test)]`.

use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory mock implementation of GraphStore for testing.
pub struct MockGraphStore {
    pub tickets: RwLock<HashMap<String, TicketRecord>>,

    /// Every call fails as if the server were down
    pub unavailable: AtomicBool,
    /// `list_tickets` fails
    pub fail_reads: AtomicBool,
    /// create/update/delete fail after "reaching" the server
    pub fail_writes: AtomicBool,
    /// Artificial latency applied to every call, in milliseconds
    pub latency_ms: AtomicI64,

    /// Seconds since the mock epoch, bumped per created ticket so that
    /// creation times are strictly increasing
    clock: AtomicI64,
}

impl MockGraphStore {
    /// Create a new empty MockGraphStore.
    pub fn new() -> Self {
        Self {
            tickets: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            latency_ms: AtomicI64::new(0),
            clock: AtomicI64::new(0),
        }
    }

    /// Insert a raw row as-is, bypassing validation
    pub async fn insert_raw(&self, record: TicketRecord) {
        self.tickets.write().await.insert(record.id.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.tickets.read().await.len()
    }

    pub async fn get(&self, id: &str) -> Option<TicketRecord> {
        self.tickets.read().await.get(id).cloned()
    }

    pub fn set_unavailable(&self, on: bool) {
        self.unavailable.store(on, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn set_latency_ms(&self, ms: i64) {
        self.latency_ms.store(ms, Ordering::SeqCst);
    }

    async fn round_trip(&self) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(latency as u64)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "mock offline");
            return Err(anyhow::Error::new(io));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("mock write rejected");
        }
        Ok(())
    }

    fn next_timestamp(&self) -> String {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (epoch + Duration::seconds(tick)).to_rfc3339()
    }
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn ping(&self) -> Result<()> {
        self.round_trip().await
    }

    async fn list_tickets(&self) -> Result<Vec<TicketRecord>> {
        self.round_trip().await?;
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("mock read rejected");
        }
        let mut rows: Vec<TicketRecord> = self.tickets.read().await.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<TicketRecord> {
        self.round_trip().await?;
        self.check_write()?;
        let record = TicketRecord {
            id: Uuid::new_v4().to_string(),
            title: ticket.title.clone(),
            status: ticket.status.label().to_string(),
            priority: ticket.priority.label().to_string(),
            category: ticket.category.clone(),
            assigned_to: ticket.assigned_to.clone(),
            created_at: self.next_timestamp(),
        };
        self.tickets
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_ticket(
        &self,
        id: &str,
        fields: &TicketFields,
    ) -> Result<Option<TicketRecord>> {
        self.round_trip().await?;
        self.check_write()?;
        let mut tickets = self.tickets.write().await;
        Ok(tickets.get_mut(id).map(|record| {
            record.title = fields.title.clone();
            record.status = fields.status.label().to_string();
            record.priority = fields.priority.label().to_string();
            record.category = fields.category.clone();
            record.assigned_to = fields.assigned_to.clone();
            record.clone()
        }))
    }

    async fn delete_ticket(&self, id: &str) -> Result<bool> {
        self.round_trip().await?;
        self.check_write()?;
        Ok(self.tickets.write().await.remove(id).is_some())
    }
}
