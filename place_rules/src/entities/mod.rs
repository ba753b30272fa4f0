//! Entity definitions for the place graph.

mod place;
mod template;

pub use place::*;
pub use template::*;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of a node in the map document.
///
/// Identifiers are decimal integers stored as strings, unique per playthrough.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub String);

impl PlaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the identifier, if it is one.
    pub fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<u64> for PlaceId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for PlaceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classes of entities that draw identifiers from their own counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    Places,
    Characters,
}

impl EntityClass {
    /// Key of this class inside `last_identifiers`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityClass::Places => "places",
            EntityClass::Characters => "characters",
        }
    }
}

impl std::fmt::Display for EntityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Types of places, from the broadest to the narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceType {
    StoryUniverse,
    World,
    Region,
    Area,
    Location,
    Room,
}

/// A type tag that is not one of the known place types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown place type '{0}'")]
pub struct UnknownPlaceType(pub String);

impl PlaceType {
    pub const ALL: [PlaceType; 6] = [
        PlaceType::StoryUniverse,
        PlaceType::World,
        PlaceType::Region,
        PlaceType::Area,
        PlaceType::Location,
        PlaceType::Room,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::StoryUniverse => "story_universe",
            PlaceType::World => "world",
            PlaceType::Region => "region",
            PlaceType::Area => "area",
            PlaceType::Location => "location",
            PlaceType::Room => "room",
        }
    }

    /// Name of the field that stores the parent identifier in a map entry.
    ///
    /// Worlds are the roots of the map; story universes never appear in it.
    pub fn parent_field(&self) -> Option<&'static str> {
        match self {
            PlaceType::StoryUniverse | PlaceType::World => None,
            PlaceType::Region => Some("world"),
            PlaceType::Area => Some("region"),
            PlaceType::Location => Some("area"),
            PlaceType::Room => Some("location"),
        }
    }

    /// Type of the template a place of this type is matched against.
    pub fn template_parent(&self) -> Option<PlaceType> {
        match self {
            PlaceType::StoryUniverse => None,
            PlaceType::World => Some(PlaceType::StoryUniverse),
            PlaceType::Region => Some(PlaceType::World),
            PlaceType::Area => Some(PlaceType::Region),
            PlaceType::Location => Some(PlaceType::Area),
            PlaceType::Room => Some(PlaceType::Location),
        }
    }

    /// Whether entering a place of this type is tracked.
    pub fn tracks_visits(&self) -> bool {
        matches!(self, PlaceType::Area | PlaceType::Location)
    }

    /// Whether templates of this type carry a sub-type tag.
    pub fn has_subtypes(&self) -> bool {
        matches!(self, PlaceType::Location | PlaceType::Room)
    }
}

impl FromStr for PlaceType {
    type Err = UnknownPlaceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlaceType::ALL
            .into_iter()
            .find(|place_type| place_type.as_str() == s)
            .ok_or_else(|| UnknownPlaceType(s.to_string()))
    }
}

impl std::fmt::Display for PlaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
