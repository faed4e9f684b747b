//! Dashboard statistics derived from the ticket view list

use crate::neo4j::models::{Ticket, TicketStatus};
use serde::{Deserialize, Serialize};

/// Ticket counts bucketed by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

impl DashboardStats {
    /// Count `tickets` from scratch. Always a full recount, never an
    /// incremental adjustment.
    pub fn compute(tickets: &[Ticket]) -> Self {
        tickets.iter().fold(
            Self {
                total: tickets.len(),
                ..Default::default()
            },
            |mut stats, ticket| {
                match ticket.status {
                    TicketStatus::Open => stats.open += 1,
                    TicketStatus::InProgress => stats.in_progress += 1,
                    TicketStatus::Resolved => stats.resolved += 1,
                    TicketStatus::Closed => stats.closed += 1,
                }
                stats
            },
        )
    }

    pub fn count(&self, status: TicketStatus) -> usize {
        match status {
            TicketStatus::Open => self.open,
            TicketStatus::InProgress => self.in_progress,
            TicketStatus::Resolved => self.resolved,
            TicketStatus::Closed => self.closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neo4j::models::TicketPriority;
    use chrono::Utc;

    fn with_status(status: TicketStatus) -> Ticket {
        Ticket {
            id: format!("{:?}", status),
            title: "t".into(),
            status,
            priority: TicketPriority::Low,
            category: "c".into(),
            assigned_to: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(DashboardStats::compute(&[]), DashboardStats::default());
    }

    #[test]
    fn test_buckets_sum_to_total() {
        let statuses = [
            TicketStatus::Open,
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Closed,
            TicketStatus::Closed,
            TicketStatus::Closed,
        ];
        let tickets: Vec<_> = statuses.iter().copied().map(with_status).collect();
        let stats = DashboardStats::compute(&tickets);

        assert_eq!(stats.total, 7);
        assert_eq!(stats.open, 2);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.closed, 3);
        assert_eq!(
            stats.total,
            TicketStatus::ALL.iter().map(|s| stats.count(*s)).sum::<usize>()
        );
    }
}
