//! # Place Core
//!
//! The engine behind the place graph of a playthrough. This crate reads and
//! writes the documents described in `place_rules`, walks the place hierarchy,
//! and grows the map from unused content templates.
//!
//! ## Core Components
//!
//! - **storage**: JSON documents per playthrough, identifier counters, the template catalog and the guidelines cache
//! - **places**: Place lookups, hierarchy walks and cardinal navigation
//! - **generation**: Category matching and the map-entry builder
//!
//! ## Design Philosophy
//!
//! - **Explicit Context**: Every component is built from a [`PlaythroughContext`], never from global state
//! - **All or Nothing**: A failed operation leaves every document as it was
//! - **Typed Failures**: Each failure mode is a distinct [`PlaceError`] variant

pub mod config;
pub mod context;
pub mod error;
pub mod generation;
pub mod places;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use config::*;
pub use context::*;
pub use error::*;
pub use generation::*;
pub use places::*;
pub use storage::*;
