//! Place node definitions - the entries of the map document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{PlaceId, PlaceType, UnknownPlaceType};
use crate::mechanics::CardinalDirection;

/// One entry of the map document.
///
/// The type tag is kept as stored so that an unrecognized tag surfaces as an
/// error when the node is inspected rather than when the whole map is loaded.
/// Which of the optional fields are present depends on the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceNode {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub place_template: String,

    // Parent links, one per type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<PlaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<PlaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<PlaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PlaceId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_identifier: Option<String>,
    /// Child locations of an area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<PlaceId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visited: Option<bool>,

    // Cardinal connections between areas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub north: Option<PlaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub south: Option<PlaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub east: Option<PlaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub west: Option<PlaceId>,

    /// Fields this crate does not interpret, preserved on save.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PlaceNode {
    fn bare(place_type: PlaceType, place_template: impl Into<String>) -> Self {
        Self {
            type_tag: place_type.as_str().to_string(),
            place_template: place_template.into(),
            world: None,
            region: None,
            area: None,
            location: None,
            weather_identifier: None,
            locations: None,
            characters: None,
            visited: None,
            north: None,
            south: None,
            east: None,
            west: None,
            extra: BTreeMap::new(),
        }
    }

    /// A world: the root of a map, with no parent.
    pub fn world(place_template: impl Into<String>) -> Self {
        Self::bare(PlaceType::World, place_template)
    }

    pub fn region(place_template: impl Into<String>, world: PlaceId) -> Self {
        Self {
            world: Some(world),
            ..Self::bare(PlaceType::Region, place_template)
        }
    }

    pub fn area(
        place_template: impl Into<String>,
        region: PlaceId,
        weather_identifier: impl Into<String>,
    ) -> Self {
        Self {
            region: Some(region),
            weather_identifier: Some(weather_identifier.into()),
            locations: Some(Vec::new()),
            characters: Some(Vec::new()),
            visited: Some(false),
            ..Self::bare(PlaceType::Area, place_template)
        }
    }

    pub fn location(place_template: impl Into<String>, area: PlaceId) -> Self {
        Self {
            area: Some(area),
            characters: Some(Vec::new()),
            visited: Some(false),
            ..Self::bare(PlaceType::Location, place_template)
        }
    }

    /// A room. Rooms carry nothing beyond their parent location.
    pub fn room(place_template: impl Into<String>, location: PlaceId) -> Self {
        Self {
            location: Some(location),
            ..Self::bare(PlaceType::Room, place_template)
        }
    }

    /// Parse the stored type tag.
    pub fn place_type(&self) -> Result<PlaceType, UnknownPlaceType> {
        self.type_tag.parse()
    }

    /// Whether the stored type tag is exactly `place_type`.
    pub fn is_type(&self, place_type: PlaceType) -> bool {
        self.type_tag == place_type.as_str()
    }

    /// Value stored under the parent field that `place_type` uses.
    pub fn parent_for(&self, place_type: PlaceType) -> Option<&PlaceId> {
        match place_type {
            PlaceType::StoryUniverse | PlaceType::World => None,
            PlaceType::Region => self.world.as_ref(),
            PlaceType::Area => self.region.as_ref(),
            PlaceType::Location => self.area.as_ref(),
            PlaceType::Room => self.location.as_ref(),
        }
    }

    /// Value of the parent field named by `field`, as used by containment queries.
    pub fn parent_field(&self, field: &str) -> Option<&PlaceId> {
        match field {
            "world" => self.world.as_ref(),
            "region" => self.region.as_ref(),
            "area" => self.area.as_ref(),
            "location" => self.location.as_ref(),
            _ => None,
        }
    }

    pub fn connection(&self, direction: CardinalDirection) -> Option<&PlaceId> {
        match direction {
            CardinalDirection::North => self.north.as_ref(),
            CardinalDirection::South => self.south.as_ref(),
            CardinalDirection::East => self.east.as_ref(),
            CardinalDirection::West => self.west.as_ref(),
        }
    }

    /// Mutable slot holding the connection in `direction`.
    pub fn connection_slot(&mut self, direction: CardinalDirection) -> &mut Option<PlaceId> {
        match direction {
            CardinalDirection::North => &mut self.north,
            CardinalDirection::South => &mut self.south,
            CardinalDirection::East => &mut self.east,
            CardinalDirection::West => &mut self.west,
        }
    }

    pub fn is_visited(&self) -> bool {
        self.visited.unwrap_or(false)
    }

    /// Check if a character is currently at this place.
    pub fn has_character(&self, character_id: &str) -> bool {
        self.characters
            .as_deref()
            .is_some_and(|characters| characters.iter().any(|c| c == character_id))
    }
}
