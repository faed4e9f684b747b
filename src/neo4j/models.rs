//! Neo4j graph models for tickets

use crate::error::TicketError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Enumerations (stored as their display labels)
// ============================================================================

/// Workflow status of a ticket
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TicketStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Every status, in workflow order
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    /// Label persisted on the `Ticket` node
    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("Unknown ticket status: {}", s)),
        }
    }
}

/// Urgency of a ticket
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Critical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TicketPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown ticket priority: {}", s)),
        }
    }
}

// ============================================================================
// Ticket entities
// ============================================================================

/// A persisted ticket.
///
/// `id` and `created_at` are assigned by the store on creation and never
/// change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: String,
    /// Empty when unassigned
    #[serde(default)]
    pub assigned_to: String,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_assigned(&self) -> bool {
        !self.assigned_to.trim().is_empty()
    }

    /// The mutable part of this ticket, as written by an update
    pub fn fields(&self) -> TicketFields {
        TicketFields {
            title: self.title.clone(),
            status: self.status,
            priority: self.priority,
            category: self.category.clone(),
            assigned_to: self.assigned_to.clone(),
        }
    }
}

/// The fields of a ticket that callers may set: everything except the
/// store-owned `id` and `created_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketFields {
    pub title: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: TicketPriority,
    pub category: String,
    #[serde(default)]
    pub assigned_to: String,
}

/// A ticket that has not been persisted yet
pub type NewTicket = TicketFields;

impl TicketFields {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn assigned_to(mut self, assignee: impl Into<String>) -> Self {
        self.assigned_to = assignee.into();
        self
    }
}

// ============================================================================
// Raw store rows
// ============================================================================

/// A ticket row exactly as the store returns it, before enum validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRecord {
    pub id: String,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub category: String,
    pub assigned_to: String,
    /// Timestamp as rendered by the store, see [`parse_timestamp`]
    pub created_at: String,
}

impl TicketRecord {
    /// Decode the row into a [`Ticket`].
    ///
    /// Unknown status or priority labels are rejected, never defaulted.
    pub fn into_ticket(self) -> Result<Ticket, TicketError> {
        let status = self.status.parse::<TicketStatus>().map_err(|e| {
            TicketError::Mapping(format!("ticket {}: {}", self.id, e))
        })?;
        let priority = self.priority.parse::<TicketPriority>().map_err(|e| {
            TicketError::Mapping(format!("ticket {}: {}", self.id, e))
        })?;
        if self.id.trim().is_empty() {
            return Err(TicketError::Mapping("ticket row without id".into()));
        }
        let created_at = parse_timestamp(&self.created_at).ok_or_else(|| {
            TicketError::Mapping(format!(
                "ticket {}: bad created_at '{}'",
                self.id, self.created_at
            ))
        })?;

        Ok(Ticket {
            id: self.id,
            title: self.title,
            status,
            priority,
            category: self.category,
            assigned_to: self.assigned_to,
            created_at,
        })
    }
}

/// Parse a datetime the way Neo4j prints it.
///
/// Values stored with a named zone print as `2024-03-31T03:30:00+02:00[Europe/Paris]`
/// and whole minutes print without seconds (`2024-03-31T01:30Z`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let raw = match raw.find('[') {
        Some(zone_start) if raw.ends_with(']') => &raw[..zone_start],
        _ => raw,
    };
    let parsed = DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
        let offset_form = match raw.strip_suffix('Z') {
            Some(local) => format!("{}+00:00", local),
            None => raw.to_string(),
        };
        DateTime::parse_from_str(&offset_form, "%Y-%m-%dT%H:%M%:z").ok()
    })?;
    Some(parsed.with_timezone(&Utc))
}
