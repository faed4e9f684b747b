//! Process-wide connection to the ticket graph
//!
//! A [`ConnectionManager`] owns at most one live store handle. The first
//! caller of [`ConnectionManager::store`] opens it; concurrent first callers
//! wait on the same lock so the driver is constructed exactly once. The
//! handle is then passed explicitly to whoever needs it.

use super::client::Neo4jClient;
use super::traits::GraphStore;
use crate::error::TicketError;
use crate::Neo4jYamlConfig;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::Mutex;

static INSTANCE: OnceLock<ConnectionManager> = OnceLock::new();

/// Where and how to connect
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Upper bound for opening the driver and for the liveness query
    pub timeout: Duration,
}

impl ConnectionSettings {
    pub fn from_config(neo4j: &Neo4jYamlConfig, timeout: Duration) -> Self {
        Self {
            uri: neo4j.uri.clone(),
            user: neo4j.user.clone(),
            password: neo4j.password.clone(),
            timeout,
        }
    }
}

/// Opens the underlying driver
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn GraphStore>>;
}

/// Connects with neo4rs
pub struct Neo4jConnector;

#[async_trait]
impl Connector for Neo4jConnector {
    async fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn GraphStore>> {
        let client = Neo4jClient::new(&settings.uri, &settings.user, &settings.password).await?;
        tracing::info!("Connected to Neo4j at {}", settings.uri);
        Ok(Arc::new(client))
    }
}

/// Owner of the single store handle
pub struct ConnectionManager {
    settings: ConnectionSettings,
    connector: Box<dyn Connector>,
    store: Mutex<Option<Arc<dyn GraphStore>>>,
}

impl ConnectionManager {
    /// Create a manager that connects with neo4rs
    pub fn new(settings: ConnectionSettings) -> Self {
        Self::with_connector(settings, Box::new(Neo4jConnector))
    }

    pub fn with_connector(settings: ConnectionSettings, connector: Box<dyn Connector>) -> Self {
        Self {
            settings,
            connector,
            store: Mutex::new(None),
        }
    }

    /// Install the process-wide manager. Only the first call takes effect;
    /// later calls get the already-installed instance back.
    pub fn install(settings: ConnectionSettings) -> &'static ConnectionManager {
        let mut installed_now = false;
        let manager = INSTANCE.get_or_init(|| {
            installed_now = true;
            ConnectionManager::new(settings.clone())
        });
        if !installed_now && manager.settings.uri != settings.uri {
            tracing::warn!(
                installed = %manager.settings.uri,
                ignored = %settings.uri,
                "Connection manager already installed, ignoring new settings"
            );
        }
        manager
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Return the shared store handle, opening it on first use
    pub async fn store(&self) -> Result<Arc<dyn GraphStore>, TicketError> {
        let mut slot = self.store.lock().await;
        if let Some(store) = slot.as_ref() {
            return Ok(Arc::clone(store));
        }

        let store = tokio::time::timeout(
            self.settings.timeout,
            self.connector.connect(&self.settings),
        )
        .await
        .map_err(|_| {
            TicketError::Connectivity(format!(
                "timed out after {:?} connecting to {}",
                self.settings.timeout, self.settings.uri
            ))
        })?
        .map_err(|e| TicketError::Connectivity(format!("{}: {:#}", self.settings.uri, e)))?;

        *slot = Some(Arc::clone(&store));
        Ok(store)
    }

    /// Round-trip a trivial query. Never fails: every problem is logged and
    /// reported as `false`.
    pub async fn test_connection(&self) -> bool {
        match self.store().await {
            Ok(store) => check_liveness(store.as_ref(), self.settings.timeout).await,
            Err(e) => {
                tracing::error!("Neo4j connection failed: {}", e);
                false
            }
        }
    }

    /// Whether a handle is currently open
    pub async fn is_open(&self) -> bool {
        self.store.lock().await.is_some()
    }

    /// Release the manager's handle. Safe to call repeatedly, or before
    /// anything was opened. A later [`store`](Self::store) call opens a
    /// fresh handle.
    ///
    /// Handles already returned by [`store`](Self::store) are shared, not
    /// revoked: the driver pool stays open until the last of them is dropped.
    /// Close after the repositories and desks built on it are gone.
    pub async fn close(&self) {
        if self.store.lock().await.take().is_some() {
            tracing::info!("Neo4j connection closed");
        }
    }
}

/// Run the store's liveness query within `timeout`
pub async fn check_liveness(store: &dyn GraphStore, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, store.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!("Neo4j connection failed: {:#}", e);
            false
        }
        Err(_) => {
            tracing::error!("Neo4j liveness check timed out after {:?}", timeout);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neo4j::mock::MockGraphStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingConnector {
        opened: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Connector for CountingConnector {
        async fn connect(&self, _settings: &ConnectionSettings) -> Result<Arc<dyn GraphStore>> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.opened.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("authentication failure");
            }
            Ok(Arc::new(MockGraphStore::new()))
        }
    }

    fn settings() -> ConnectionSettings {
        ConnectionSettings {
            uri: "bolt://mock:7687".into(),
            user: "neo4j".into(),
            password: "mock".into(),
            timeout: Duration::from_secs(2),
        }
    }

    fn manager(fail: bool) -> (Arc<ConnectionManager>, Arc<AtomicUsize>) {
        let opened = Arc::new(AtomicUsize::new(0));
        let connector = CountingConnector {
            opened: Arc::clone(&opened),
            fail,
        };
        (
            Arc::new(ConnectionManager::with_connector(settings(), Box::new(connector))),
            opened,
        )
    }

    #[tokio::test]
    async fn test_concurrent_first_use_opens_once() {
        let (manager, opened) = manager(false);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(async move { manager.store().await }));
        }
        let stores: Vec<_> = {
            let mut out = Vec::new();
            for h in handles {
                out.push(h.await.unwrap().unwrap());
            }
            out
        };

        assert_eq!(opened.load(Ordering::SeqCst), 1);
        for store in &stores[1..] {
            assert!(Arc::ptr_eq(&stores[0], store));
        }
    }

    #[tokio::test]
    async fn test_connection_ok() {
        let (manager, _) = manager(false);
        assert!(manager.test_connection().await);
        assert!(manager.is_open().await);
    }

    #[tokio::test]
    async fn test_connection_failure_reports_false() {
        let (manager, _) = manager(true);
        assert!(!manager.test_connection().await);
        assert!(!manager.is_open().await);
        assert!(matches!(
            manager.store().await,
            Err(TicketError::Connectivity(_))
        ));
    }

    #[tokio::test]
    async fn test_liveness_false_when_store_down() {
        let store = MockGraphStore::new();
        store.set_unavailable(true);
        assert!(!check_liveness(&store, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_liveness_times_out() {
        let store = MockGraphStore::new();
        store.set_latency_ms(200);
        assert!(!check_liveness(&store, Duration::from_millis(20)).await);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (manager, opened) = manager(false);
        // never opened
        manager.close().await;
        manager.store().await.unwrap();
        manager.close().await;
        manager.close().await;
        assert!(!manager.is_open().await);

        // reopens lazily
        manager.store().await.unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_close_does_not_revoke_handed_out_store() {
        let (manager, opened) = manager(false);
        let held = manager.store().await.unwrap();
        manager.close().await;

        assert!(!manager.is_open().await);
        assert!(check_liveness(held.as_ref(), Duration::from_secs(1)).await);

        let fresh = manager.store().await.unwrap();
        assert!(!Arc::ptr_eq(&held, &fresh));
        assert_eq!(opened.load(Ordering::SeqCst), 2);
    }
}
