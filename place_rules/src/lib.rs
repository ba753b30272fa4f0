//! # Place Rules
//!
//! The "Place Bible" crate - the typed place hierarchy, content templates, and
//! the shapes of every persisted document. This crate performs no I/O; the
//! engine in `place_core` reads and writes these types.

pub mod entities;
pub mod mechanics;
pub mod world_state;

pub use entities::*;
pub use mechanics::*;
pub use world_state::*;
