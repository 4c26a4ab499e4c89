//! Value objects - immutable types that represent domain concepts

mod identity;

pub use identity::{Identity, IdentityError};
