//! Presence storage module.
//!
//! Tracks which identities are claimed and online.

mod online;

pub use online::{PresenceStore, ONLINE_SET_KEY};
