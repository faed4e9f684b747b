//! Error types for ticket persistence

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// The store cannot be reached or refused our credentials
    #[error("Cannot reach the ticket store: {0}")]
    Connectivity(String),

    /// A round-trip failed after a session was established (includes timeouts)
    #[error("Ticket store operation failed: {0}")]
    Persistence(String),

    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// A stored row could not be decoded into a ticket
    #[error("Invalid ticket row: {0}")]
    Mapping(String),
}

impl TicketError {
    /// Classify a failure coming out of the graph store.
    ///
    /// Transport and authentication failures reported by neo4rs are
    /// connectivity problems; everything else is a failed round-trip.
    pub fn from_store(err: anyhow::Error) -> Self {
        let connectivity = err.chain().any(|cause| {
            cause
                .downcast_ref::<neo4rs::Error>()
                .is_some_and(is_connectivity)
                || cause.downcast_ref::<std::io::Error>().is_some()
        });
        if connectivity {
            TicketError::Connectivity(format!("{:#}", err))
        } else {
            TicketError::Persistence(format!("{:#}", err))
        }
    }
}

fn is_connectivity(err: &neo4rs::Error) -> bool {
    matches!(
        err,
        neo4rs::Error::ConnectionError
            | neo4rs::Error::IOError { .. }
            | neo4rs::Error::AuthenticationError(_)
    )
}

pub type Result<T> = std::result::Result<T, TicketError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_plain_failure_is_persistence() {
        let err = TicketError::from_store(anyhow::anyhow!("constraint violated"));
        assert!(matches!(err, TicketError::Persistence(ref m) if m.contains("constraint")));
    }

    #[test]
    fn test_connection_error_is_connectivity() {
        let err: anyhow::Result<()> =
            Err(neo4rs::Error::ConnectionError).context("Failed to list tickets");
        let err = TicketError::from_store(err.unwrap_err());
        assert!(matches!(err, TicketError::Connectivity(_)), "got {err:?}");
    }

    #[test]
    fn test_io_error_is_connectivity() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TicketError::from_store(anyhow::Error::new(io));
        assert!(matches!(err, TicketError::Connectivity(_)));
    }
}
