//! Persisted documents of a playthrough: the map and its metadata.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::entities::{EntityClass, PlaceId, PlaceNode, PlaceType};

/// Value of `current_place` and `player_identifier` before one is set.
pub const UNSET_IDENTIFIER: &str = "-1";

/// Starting value of every identifier counter.
pub const INITIAL_COUNTER: &str = "0";

/// The map document: every place node of a playthrough, keyed by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct PlaceMap {
    places: BTreeMap<PlaceId, PlaceNode>,
}

impl PlaceMap {
    /// Create a new empty map.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &PlaceId) -> Option<&PlaceNode> {
        self.places.get(id)
    }

    pub fn get_mut(&mut self, id: &PlaceId) -> Option<&mut PlaceNode> {
        self.places.get_mut(id)
    }

    pub fn contains(&self, id: &PlaceId) -> bool {
        self.places.contains_key(id)
    }

    /// Insert a node, returning the one it replaced.
    pub fn insert(&mut self, id: PlaceId, node: PlaceNode) -> Option<PlaceNode> {
        self.places.insert(id, node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlaceId, &PlaceNode)> {
        self.places.iter()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Template names already instantiated by places of `place_type`.
    pub fn templates_of_type(&self, place_type: PlaceType) -> BTreeSet<String> {
        self.places
            .values()
            .filter(|node| node.is_type(place_type))
            .map(|node| node.place_template.clone())
            .collect()
    }

    /// Places of `contained` whose parent field for `container` names `container_id`.
    pub fn places_in(
        &self,
        container_id: &PlaceId,
        container: PlaceType,
        contained: PlaceType,
    ) -> Vec<(&PlaceId, &PlaceNode)> {
        let Some(field) = container_field(container) else {
            return Vec::new();
        };

        self.places
            .iter()
            .filter(|(_, node)| {
                node.is_type(contained) && node.parent_field(field) == Some(container_id)
            })
            .collect()
    }

    /// The numerically highest identifier in the map.
    pub fn highest_identifier(&self) -> Option<&PlaceId> {
        self.places
            .keys()
            .filter_map(|id| id.numeric().map(|n| (n, id)))
            .max_by_key(|(n, _)| *n)
            .map(|(_, id)| id)
    }
}

/// Name of the field children use to point at a container of this type.
fn container_field(container: PlaceType) -> Option<&'static str> {
    match container {
        PlaceType::World => Some("world"),
        PlaceType::Region => Some("region"),
        PlaceType::Area => Some("area"),
        PlaceType::Location => Some("location"),
        PlaceType::StoryUniverse | PlaceType::Room => None,
    }
}

/// In-game time tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlaythroughTime {
    pub hour: u8,
}

/// Metadata of a playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaythroughMetadata {
    pub story_universe_template: String,
    pub player_identifier: String,
    #[serde(default)]
    pub followers: Vec<String>,
    pub current_place: String,
    #[serde(default)]
    pub time: PlaythroughTime,

    /// Entity class -> last identifier handed out, as a decimal string.
    #[serde(default)]
    pub last_identifiers: BTreeMap<String, String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PlaythroughMetadata {
    /// Metadata of a freshly created playthrough.
    pub fn new(story_universe_template: impl Into<String>, hour: u8) -> Self {
        let last_identifiers = [EntityClass::Places, EntityClass::Characters]
            .into_iter()
            .map(|class| (class.as_str().to_string(), INITIAL_COUNTER.to_string()))
            .collect();

        Self {
            story_universe_template: story_universe_template.into(),
            player_identifier: UNSET_IDENTIFIER.to_string(),
            followers: Vec::new(),
            current_place: UNSET_IDENTIFIER.to_string(),
            time: PlaythroughTime { hour },
            last_identifiers,
            extra: BTreeMap::new(),
        }
    }

    /// The place the player is at, if one has been set.
    pub fn current_place(&self) -> Option<PlaceId> {
        if self.current_place.is_empty() || self.current_place == UNSET_IDENTIFIER {
            None
        } else {
            Some(PlaceId::new(self.current_place.clone()))
        }
    }

    pub fn last_identifier(&self, class: EntityClass) -> Option<&str> {
        self.last_identifiers.get(class.as_str()).map(String::as_str)
    }

    pub fn set_last_identifier(&mut self, class: EntityClass, value: u64) {
        self.last_identifiers
            .insert(class.as_str().to_string(), value.to_string());
    }
}
