//! Desk notifications
//!
//! This module provides:
//! - `DeskEvent`: emitted after every completed desk operation
//! - `EventBus`: broadcast channel for distributing events to UI listeners

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{DeskAction, DeskEvent, EventEmitter, ViewChange};
