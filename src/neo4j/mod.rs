//! Neo4j client, connection management and models for the ticket graph

pub mod client;
pub mod connection;
mod impl_graph_store;
pub mod models;
pub mod traits;

pub use client::Neo4jClient;
pub use connection::{check_liveness, ConnectionManager, ConnectionSettings};
pub use models::*;
pub use traits::GraphStore;

#[cfg(test)]
pub(crate) mod mock;
