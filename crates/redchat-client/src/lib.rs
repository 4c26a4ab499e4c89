//! # redchat-client
//!
//! Terminal chat client coordinated entirely through a shared Redis store.
//!
//! A [`Session`] claims an identity, keeps it alive with a heartbeat, and
//! multiplexes three event sources (broadcasts, heartbeat ticks, and input
//! lines) in one loop until the user leaves or the heartbeat fails.

pub mod app;
pub mod cli;
pub mod input;
pub mod session;

pub use app::run;
pub use cli::Cli;
pub use input::{InputReader, EXIT_LINE};
pub use session::{
    Command, Session, SessionConfig, SessionError, SessionOutcome, SessionState,
    TerminationReason,
};
