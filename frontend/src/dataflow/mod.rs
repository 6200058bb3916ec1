//! Core dataflow primitives for reactive state management
//!
//! - **[`Relay`]** - event streaming from the outside world into Actors
//! - **[`Actor`]** - replay-latest state container driven by Relays
//! - **[`Atom`]** - synchronous wrapper for local UI state
//!
//! Relays follow the `{source}_{event}_relay` naming pattern.

pub mod actor;
pub mod atom;
pub mod relay;

pub use actor::Actor;
pub use atom::Atom;
pub use relay::{Relay, relay};
