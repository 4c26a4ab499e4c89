//! Chat session
//!
//! The coordinator that owns the identity lock, the heartbeat timer, and the
//! command interpreter.

mod command;
mod coordinator;
mod error;

pub use command::Command;
pub use coordinator::{
    Session, SessionConfig, SessionOutcome, SessionState, TerminationReason,
};
pub use error::SessionError;
