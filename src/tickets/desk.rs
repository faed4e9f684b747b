//! Foreground controller for ticket operations
//!
//! Store round-trips run on spawned tokio tasks. Their results come back
//! through a single mpsc channel whose only consumer is the [`TicketDesk`],
//! which is also the only writer of the view list. An operation is done once
//! its completion has been received and applied: the view list, the stats
//! and the emitted [`DeskEvent`] then all reflect the store's answer.
//!
//! Completions can arrive out of order. A reload snapshot may predate writes
//! that were confirmed while it was in flight, so those writes are journaled
//! and replayed over the snapshot. Confirmed deletes are remembered so a late
//! update answer cannot bring a deleted ticket back.

use super::repository::TicketRepository;
use super::view::{TicketViewList, RECENT_LIMIT};
use crate::dashboard::DashboardStats;
use crate::error::{Result, TicketError};
use crate::events::{DeskAction, DeskEvent, EventEmitter};
use crate::neo4j::models::{NewTicket, Ticket};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// A request for the background worker
#[derive(Debug, Clone)]
pub enum TicketCommand {
    /// Reload every ticket (initial load and explicit refresh)
    Load,
    Create(NewTicket),
    Update(Ticket),
    Delete(String),
}

impl TicketCommand {
    fn action(&self) -> DeskAction {
        match self {
            Self::Load => DeskAction::Loaded,
            Self::Create(_) => DeskAction::Created,
            Self::Update(_) => DeskAction::Updated,
            Self::Delete(_) => DeskAction::Deleted,
        }
    }

    fn ticket_id(&self) -> Option<String> {
        match self {
            Self::Load | Self::Create(_) => None,
            Self::Update(ticket) => Some(ticket.id.clone()),
            Self::Delete(id) => Some(id.clone()),
        }
    }
}

/// Handle for a submitted command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(u64);

/// What a completed command did, as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Number of tickets now in the view list
    Loaded(usize),
    Created(Ticket),
    Updated(Ticket),
    /// `removed` is false when the store deleted nothing
    Deleted { id: String, removed: bool },
}

/// Raw store answer produced on the worker
enum StoreOutcome {
    Loaded(Vec<Ticket>),
    Created(Ticket),
    Updated(Ticket),
    Deleted { id: String, removed: bool },
}

struct Completion {
    id: CommandId,
    action: DeskAction,
    ticket_id: Option<String>,
    result: Result<StoreOutcome>,
}

/// A confirmed write, replayable over a reload snapshot
#[derive(Debug, Clone)]
enum ViewEdit {
    Upsert(Ticket),
    Remove(String),
}

/// A finished command, already applied to the view list
#[derive(Debug, Clone)]
pub struct Finished {
    pub id: CommandId,
    pub result: Result<CommandOutput>,
}

/// Owns the view list and serializes every mutation of it
pub struct TicketDesk {
    repo: TicketRepository,
    view: TicketViewList,
    stats: DashboardStats,
    events: Arc<dyn EventEmitter>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    next_id: u64,
    in_flight: usize,
    /// In-flight loads, with the journal length at their dispatch
    pending_loads: HashMap<CommandId, usize>,
    /// Writes confirmed while at least one load was in flight
    journal: Vec<ViewEdit>,
    /// Ids the store confirmed deleted. Ids are never reused.
    deleted: HashSet<String>,
}

impl TicketDesk {
    pub fn new(repo: TicketRepository, events: Arc<dyn EventEmitter>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            repo,
            view: TicketViewList::new(),
            stats: DashboardStats::default(),
            events,
            tx,
            rx,
            next_id: 0,
            in_flight: 0,
            pending_loads: HashMap::new(),
            journal: Vec::new(),
            deleted: HashSet::new(),
        }
    }

    pub fn view(&self) -> &TicketViewList {
        &self.view
    }

    /// Up to five newest tickets
    pub fn recent(&self) -> &[Ticket] {
        self.view.recent(RECENT_LIMIT)
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    /// Commands submitted but not yet applied
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start `cmd` on a background task and return immediately.
    ///
    /// Every submitted command produces exactly one completion, even if the
    /// worker panics.
    pub fn submit(&mut self, cmd: TicketCommand) -> CommandId {
        self.next_id += 1;
        let id = CommandId(self.next_id);
        self.in_flight += 1;

        let action = cmd.action();
        let ticket_id = cmd.ticket_id();
        if action == DeskAction::Loaded {
            self.pending_loads.insert(id, self.journal.len());
        }

        let repo = self.repo.clone();
        let tx = self.tx.clone();
        debug!(?id, ?action, "Dispatching ticket command");
        tokio::spawn(async move {
            let worker = tokio::spawn(async move { run(&repo, cmd).await });
            let result = worker.await.unwrap_or_else(|e| {
                error!(?id, ?action, "Ticket worker failed: {}", e);
                Err(TicketError::Persistence(format!("worker failed: {}", e)))
            });
            // The receiver lives as long as the desk
            let _ = tx.send(Completion {
                id,
                action,
                ticket_id,
                result,
            });
        });
        id
    }

    /// Wait for the next command to finish and apply it.
    /// Returns `None` when nothing is in flight.
    pub async fn next_finished(&mut self) -> Option<Finished> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.in_flight -= 1;
        let id = completion.id;
        let result = self.apply(completion);
        Some(Finished { id, result })
    }

    /// Submit `cmd` and wait until it has been applied. Other commands
    /// finishing in the meantime are applied as they arrive.
    pub async fn execute(&mut self, cmd: TicketCommand) -> Result<CommandOutput> {
        let wanted = self.submit(cmd);
        loop {
            match self.next_finished().await {
                Some(finished) if finished.id == wanted => return finished.result,
                Some(_) => continue,
                None => {
                    return Err(TicketError::Persistence(
                        "worker stopped before completing the command".into(),
                    ))
                }
            }
        }
    }

    /// Reload the list from the store
    pub async fn refresh(&mut self) -> Result<usize> {
        match self.execute(TicketCommand::Load).await? {
            CommandOutput::Loaded(n) => Ok(n),
            other => unreachable!("load produced {:?}", other),
        }
    }

    pub async fn create(&mut self, ticket: NewTicket) -> Result<Ticket> {
        match self.execute(TicketCommand::Create(ticket)).await? {
            CommandOutput::Created(t) => Ok(t),
            other => unreachable!("create produced {:?}", other),
        }
    }

    pub async fn update(&mut self, ticket: Ticket) -> Result<Ticket> {
        match self.execute(TicketCommand::Update(ticket)).await? {
            CommandOutput::Updated(t) => Ok(t),
            other => unreachable!("update produced {:?}", other),
        }
    }

    /// `true` when the ticket was deleted from the store and the list
    pub async fn delete(&mut self, id: impl Into<String>) -> Result<bool> {
        match self.execute(TicketCommand::Delete(id.into())).await? {
            CommandOutput::Deleted { removed, .. } => Ok(removed),
            other => unreachable!("delete produced {:?}", other),
        }
    }

    /// Mirror a store answer into the view list, recount, and notify
    fn apply(&mut self, completion: Completion) -> Result<CommandOutput> {
        let Completion {
            id,
            action,
            ticket_id,
            result,
        } = completion;

        let replay_from = self.pending_loads.remove(&id);
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                let event = if action == DeskAction::Loaded {
                    self.view.clear();
                    self.trim_journal();
                    self.recount();
                    DeskEvent::cleared(err.to_string(), self.stats)
                } else {
                    DeskEvent::unchanged(action, err.to_string(), self.stats)
                };
                self.emit(event, ticket_id);
                return Err(err);
            }
        };

        let output = match outcome {
            StoreOutcome::Loaded(tickets) => {
                self.view.replace_all(tickets);
                let start = replay_from.unwrap_or(self.journal.len());
                let confirmed_since = self.journal[start..].to_vec();
                if !confirmed_since.is_empty() {
                    debug!(
                        ?id,
                        writes = confirmed_since.len(),
                        "Replaying writes confirmed during reload"
                    );
                }
                for edit in &confirmed_since {
                    self.replay(edit);
                }
                self.trim_journal();
                CommandOutput::Loaded(self.view.len())
            }
            StoreOutcome::Created(ticket) => {
                if !self.deleted.contains(&ticket.id) {
                    self.view.insert_created(ticket.clone());
                }
                self.record(ViewEdit::Upsert(ticket.clone()));
                CommandOutput::Created(ticket)
            }
            StoreOutcome::Updated(ticket) => {
                if self.deleted.contains(&ticket.id) {
                    debug!(id = %ticket.id, "Update answered after delete, not re-adding");
                } else {
                    self.view.apply_updated(ticket.clone());
                }
                self.record(ViewEdit::Upsert(ticket.clone()));
                CommandOutput::Updated(ticket)
            }
            StoreOutcome::Deleted { id, removed: true } => {
                self.view.remove(&id);
                self.deleted.insert(id.clone());
                self.record(ViewEdit::Remove(id.clone()));
                CommandOutput::Deleted { id, removed: true }
            }
            StoreOutcome::Deleted { id, removed: false } => {
                warn!(id = %id, "Ticket not deleted, keeping it in the list");
                let event = DeskEvent::unchanged(
                    action,
                    format!("Failed to delete ticket {}", id),
                    self.stats,
                );
                self.emit(event, Some(id.clone()));
                return Ok(CommandOutput::Deleted { id, removed: false });
            }
        };

        self.recount();
        let ticket_id = match &output {
            CommandOutput::Created(t) | CommandOutput::Updated(t) => Some(t.id.clone()),
            _ => ticket_id,
        };
        self.emit(DeskEvent::applied(action, self.stats), ticket_id);
        Ok(output)
    }

    /// Journal a confirmed write while some load could still miss it
    fn record(&mut self, edit: ViewEdit) {
        if !self.pending_loads.is_empty() {
            self.journal.push(edit);
        }
    }

    fn trim_journal(&mut self) {
        if self.pending_loads.is_empty() {
            self.journal.clear();
        }
    }

    fn replay(&mut self, edit: &ViewEdit) {
        match edit {
            ViewEdit::Upsert(ticket) if !self.deleted.contains(&ticket.id) => {
                self.view.apply_updated(ticket.clone());
            }
            ViewEdit::Upsert(_) => {}
            ViewEdit::Remove(id) => {
                self.view.remove(id);
            }
        }
    }

    fn recount(&mut self) {
        self.stats = DashboardStats::compute(self.view.tickets());
    }

    fn emit(&self, event: DeskEvent, ticket_id: Option<String>) {
        let event = match ticket_id {
            Some(id) => event.with_ticket(id),
            None => event,
        };
        self.events.emit(event);
    }
}

/// Worker side: one repository call per command
async fn run(repo: &TicketRepository, cmd: TicketCommand) -> Result<StoreOutcome> {
    Ok(match cmd {
        TicketCommand::Load => StoreOutcome::Loaded(repo.find_all().await?),
        TicketCommand::Create(ticket) => StoreOutcome::Created(repo.create(&ticket).await?),
        TicketCommand::Update(ticket) => StoreOutcome::Updated(repo.update(&ticket).await?),
        TicketCommand::Delete(id) => {
            let removed = repo.delete(&id).await;
            StoreOutcome::Deleted { id, removed }
        }
    })
}
