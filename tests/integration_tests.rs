//! Integration tests for ticket-desk
//!
//! These tests require Neo4j to be running.
//! Run with: cargo test --test integration_tests

use std::sync::Arc;
use std::time::Duration;
use ticket_desk::events::EventBus;
use ticket_desk::neo4j::{ConnectionManager, ConnectionSettings, NewTicket, TicketPriority, TicketStatus};
use ticket_desk::tickets::{TicketDesk, TicketRepository};
use ticket_desk::TicketError;

/// Get test connection settings from environment or use defaults
fn test_settings() -> ConnectionSettings {
    ConnectionSettings {
        uri: std::env::var("NEO4J_URI").unwrap_or_else(|_| "bolt://127.0.0.1:7687".into()),
        user: std::env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".into()),
        password: std::env::var("NEO4J_PASSWORD").unwrap_or_else(|_| "00000000".into()),
        timeout: Duration::from_secs(5),
    }
}

/// Connect, or `None` when Neo4j is not reachable
async fn connect() -> Option<ConnectionManager> {
    let manager = ConnectionManager::new(test_settings());
    if !manager.test_connection().await {
        eprintln!("Neo4j not available at {}", manager.settings().uri);
        return None;
    }
    Some(manager)
}

fn unique_title(prefix: &str) -> String {
    format!("{} {}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

#[tokio::test]
async fn test_ticket_crud_round_trip() {
    let Some(manager) = connect().await else {
        eprintln!("Skipping test: Neo4j not available");
        return;
    };
    let repo = TicketRepository::new(manager.store().await.unwrap(), Duration::from_secs(5));

    let input = NewTicket::new(unique_title("integration"), "Testing")
        .with_priority(TicketPriority::High)
        .assigned_to("jane.smith");
    let created = repo.create(&input).await.expect("create should succeed");
    assert!(!created.id.is_empty());
    assert_eq!(created.fields(), input);

    let all = repo.find_all().await.unwrap();
    let found = all.iter().find(|t| t.id == created.id).expect("created ticket listed");
    assert_eq!(found, &created);

    let mut edited = created.clone();
    edited.status = TicketStatus::Resolved;
    let updated = repo.update(&edited).await.unwrap();
    assert_eq!(updated.status, TicketStatus::Resolved);
    assert_eq!(updated.created_at, created.created_at);

    assert!(repo.delete(&created.id).await);
    assert!(!repo.delete(&created.id).await);

    let err = repo.update(&edited).await.unwrap_err();
    assert!(matches!(err, TicketError::NotFound(_)));

    manager.close().await;
}

#[tokio::test]
async fn test_desk_against_live_store() {
    let Some(manager) = connect().await else {
        eprintln!("Skipping test: Neo4j not available");
        return;
    };
    let repo = TicketRepository::new(manager.store().await.unwrap(), Duration::from_secs(5));
    let mut desk = TicketDesk::new(repo, Arc::new(EventBus::default()));

    let before = desk.refresh().await.unwrap();
    let created = desk
        .create(NewTicket::new(unique_title("desk"), "Testing"))
        .await
        .unwrap();
    assert_eq!(desk.view().len(), before + 1);
    assert_eq!(desk.recent()[0].id, created.id);

    assert!(desk.delete(created.id.clone()).await.unwrap());
    assert!(!desk.view().contains(&created.id));

    let stats = desk.stats();
    assert_eq!(
        stats.total,
        stats.open + stats.in_progress + stats.resolved + stats.closed
    );

    manager.close().await;
}
