//! Ticket persistence and synchronization
//!
//! - `TicketRepository`: typed CRUD against the graph store
//! - `TicketViewList`: in-memory list mirroring confirmed store state
//! - `TicketDesk`: runs repository calls in the background and applies
//!   their results to the view list

pub mod desk;
pub mod repository;
pub mod view;

pub use desk::{CommandId, CommandOutput, Finished, TicketCommand, TicketDesk};
pub use repository::TicketRepository;
pub use view::{TicketFilter, TicketViewList, RECENT_LIMIT};
