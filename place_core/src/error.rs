//! Errors raised by the place engine.

use std::path::PathBuf;

use place_rules::{CardinalDirection, EntityClass, PlaceId, PlaceType, UnknownPlaceType};
use thiserror::Error;

/// Broad category of a [`PlaceError`], for callers that react by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Something asked for does not exist.
    NotFound,
    /// Stored state is corrupted or an operation was misused.
    Structural,
    /// Procedural content ran out; recoverable by generating more templates.
    Exhaustion,
    /// Reading or writing a document failed.
    Storage,
}

/// Errors from place graph and template operations.
#[derive(Debug, Error)]
pub enum PlaceError {
    // Not found
    #[error("place '{0}' not found")]
    PlaceNotFound(PlaceId),

    #[error("template '{name}' not found among {place_type} templates")]
    TemplateNotFound { name: String, place_type: PlaceType },

    #[error("area '{0}' not found in map")]
    AreaNotFound(PlaceId),

    #[error("no guidelines found for key '{0}'")]
    GuidelinesNotFound(String),

    // Structural
    #[error("unknown place type '{tag}' for place '{id}'")]
    UnknownPlaceType { id: PlaceId, tag: String },

    #[error("place '{0}' has no place template")]
    MissingPlaceTemplate(PlaceId),

    #[error("there were no categories for {place_type} template '{name}'")]
    NoCategories { name: String, place_type: PlaceType },

    #[error("{place_type} template '{name}' has no description")]
    MissingDescription { name: String, place_type: PlaceType },

    #[error("walking up from '{0}' never reached a world")]
    IncompleteHierarchy(PlaceId),

    #[error("{place_type} '{id}' has no '{field}' parent")]
    MissingParent {
        id: PlaceId,
        place_type: PlaceType,
        field: &'static str,
    },

    #[error("world '{0}' has no father")]
    NoFather(PlaceId),

    #[error("unhandled place type '{place_type}' for '{id}'")]
    UnhandledType { id: PlaceId, place_type: PlaceType },

    #[error("a {0} requires a father identifier")]
    MissingFather(PlaceType),

    #[error("'{id}' is not an area, but a '{actual}'")]
    NotAnArea { id: PlaceId, actual: String },

    #[error("place '{child}' is already a child of '{parent}'")]
    DuplicateChild { parent: PlaceId, child: PlaceId },

    #[error("there was already a {direction} connection in '{id}'")]
    DuplicateConnection {
        id: PlaceId,
        direction: CardinalDirection,
    },

    #[error("{0} templates don't have sub-types")]
    NoSubtypes(PlaceType),

    #[error("guidelines can't be empty")]
    InvalidGuideline,

    #[error("playthrough '{0}' already exists")]
    PlaythroughExists(String),

    #[error("no '{0}' counter in the playthrough metadata")]
    MissingCounter(EntityClass),

    #[error("'{class}' counter holds '{value}', which isn't a non-negative integer")]
    CorruptCounter { class: EntityClass, value: String },

    #[error("'{class}' counter can't move from {current} to {requested}")]
    NonMonotonicCounter {
        class: EntityClass,
        current: u64,
        requested: u64,
    },

    // Exhaustion
    #[error("no available {0} templates: every one is already in use")]
    NoAvailableTemplates(PlaceType),

    #[error("no available {place_type} templates match the categories {categories:?}")]
    NoCandidates {
        place_type: PlaceType,
        categories: Vec<String>,
    },

    // Storage
    #[error("storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed document at {}: {source}", .path.display())]
    MalformedDocument {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl PlaceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaceError::PlaceNotFound(_)
            | PlaceError::TemplateNotFound { .. }
            | PlaceError::AreaNotFound(_)
            | PlaceError::GuidelinesNotFound(_) => ErrorKind::NotFound,

            PlaceError::NoAvailableTemplates(_) | PlaceError::NoCandidates { .. } => {
                ErrorKind::Exhaustion
            }

            PlaceError::StorageUnavailable { .. } | PlaceError::MalformedDocument { .. } => {
                ErrorKind::Storage
            }

            _ => ErrorKind::Structural,
        }
    }

    /// Check if procedural content ran out, as opposed to a real failure.
    pub fn is_exhaustion(&self) -> bool {
        self.kind() == ErrorKind::Exhaustion
    }

    pub(crate) fn unknown_type(id: &PlaceId, err: UnknownPlaceType) -> Self {
        PlaceError::UnknownPlaceType {
            id: id.clone(),
            tag: err.0,
        }
    }
}

pub type Result<T, E = PlaceError> = std::result::Result<T, E>;
