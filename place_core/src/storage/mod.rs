//! Storage layer - file-backed JSON documents.
//!
//! - **map_store**: the map document of a playthrough, read and replaced whole
//! - **templates**: content templates per place type, with a secret overlay
//! - **identifiers**: monotonic identifier counters in the playthrough metadata
//! - **metadata**: playthrough creation and the current place
//! - **guidelines**: the hierarchy-keyed guidelines cache

mod guidelines;
mod identifiers;
mod json;
mod map_store;
mod metadata;
mod templates;

pub use guidelines::*;
pub use identifiers::*;
pub use map_store::*;
pub use metadata::*;
pub use templates::*;
