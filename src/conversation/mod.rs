//! Per-user conversation flow: idle until the add-event trigger, then exactly
//! one message is taken as the payload.

pub mod reply;
mod state;
mod store;
mod sweeper;

pub use state::{transition, Action, SessionState, Trigger};
pub use store::{SessionKey, SessionStore};
pub use sweeper::{spawn_sweeper, sweep_interval};
