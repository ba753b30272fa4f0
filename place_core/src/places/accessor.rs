//! Place Accessor - typed lookups and mutations of map entries.

use std::collections::BTreeSet;

use place_rules::{PlaceId, PlaceNode, PlaceType};
use tracing::{debug, info, warn};

use super::{ensure_area, lookup, lookup_mut, template_of_node, type_of_node};
use crate::context::PlaythroughContext;
use crate::error::{PlaceError, Result};
use crate::storage::{MapStore, TemplateCatalog};

/// A place referenced by identifier and template name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceSummary {
    pub id: PlaceId,
    pub place_template: String,
}

#[derive(Debug, Clone)]
pub struct PlaceAccessor {
    map_store: MapStore,
    catalog: TemplateCatalog,
}

impl PlaceAccessor {
    pub fn new(ctx: &PlaythroughContext) -> Self {
        Self {
            map_store: MapStore::new(ctx),
            catalog: TemplateCatalog::new(ctx),
        }
    }

    pub fn get(&self, id: &PlaceId) -> Result<PlaceNode> {
        let map = self.map_store.load()?;
        lookup(&map, id).cloned()
    }

    /// Template name of a node, which must not be blank.
    pub fn template_of<'a>(id: &PlaceId, node: &'a PlaceNode) -> Result<&'a str> {
        template_of_node(id, node)
    }

    pub fn type_of(&self, id: &PlaceId) -> Result<PlaceType> {
        let map = self.map_store.load()?;
        type_of_node(id, lookup(&map, id)?)
    }

    /// Categories of the template `template_name` among templates of `place_type`.
    pub fn categories_of(&self, template_name: &str, place_type: PlaceType) -> Result<Vec<String>> {
        let template = self.catalog.get(place_type, template_name)?;

        if template.categories.is_empty() {
            return Err(PlaceError::NoCategories {
                name: template_name.to_string(),
                place_type,
            });
        }
        Ok(template.categories)
    }

    /// Template names already used by places of `place_type`.
    pub fn templates_in_use(&self, place_type: PlaceType) -> Result<BTreeSet<String>> {
        Ok(self.map_store.load()?.templates_of_type(place_type))
    }

    pub fn is_visited(&self, id: &PlaceId) -> Result<bool> {
        Ok(self.get(id)?.is_visited())
    }

    /// Mark a place as visited. Returns whether this was the first visit.
    ///
    /// Only areas and locations track visits; other places are left untouched.
    pub fn mark_visited(&self, id: &PlaceId) -> Result<bool> {
        self.map_store.update(|map| {
            let node = lookup_mut(map, id)?;
            let place_type = type_of_node(id, node)?;

            if !place_type.tracks_visits() {
                debug!(%id, %place_type, "Place type doesn't track visits");
                return Ok(false);
            }
            if node.is_visited() {
                return Ok(false);
            }

            node.visited = Some(true);
            info!(%id, "First visit to place");
            Ok(true)
        })
    }

    /// Register `child_id` as one of the locations of area `parent_id`.
    pub fn add_child(&self, parent_id: &PlaceId, child_id: &PlaceId) -> Result<()> {
        self.map_store.update(|map| {
            lookup(map, child_id)?;
            let parent = lookup_mut(map, parent_id)?;
            ensure_area(parent_id, parent)?;

            let locations = parent.locations.get_or_insert_with(Vec::new);
            if locations.contains(child_id) {
                return Err(PlaceError::DuplicateChild {
                    parent: parent_id.clone(),
                    child: child_id.clone(),
                });
            }
            locations.push(child_id.clone());

            debug!(parent = %parent_id, child = %child_id, "Added child place");
            Ok(())
        })
    }

    pub fn set_weather(&self, area_id: &PlaceId, weather_identifier: &str) -> Result<()> {
        self.map_store.update(|map| {
            let area = lookup_mut(map, area_id)?;
            ensure_area(area_id, area)?;
            area.weather_identifier = Some(weather_identifier.to_string());

            debug!(area = %area_id, weather = weather_identifier, "Set weather");
            Ok(())
        })
    }

    /// Put a character at a place that holds characters.
    pub fn add_character(&self, id: &PlaceId, character_id: &str) -> Result<()> {
        self.map_store.update(|map| {
            let node = lookup_mut(map, id)?;
            let place_type = type_of_node(id, node)?;

            let Some(characters) = node.characters.as_mut() else {
                return Err(PlaceError::UnhandledType {
                    id: id.clone(),
                    place_type,
                });
            };
            if !characters.iter().any(|c| c == character_id) {
                characters.push(character_id.to_string());
            }
            Ok(())
        })
    }

    /// Remove a character from a place. Removing an absent character is a no-op.
    pub fn remove_character(&self, id: &PlaceId, character_id: &str) -> Result<()> {
        self.map_store.update(|map| {
            let node = lookup_mut(map, id)?;
            if let Some(characters) = node.characters.as_mut() {
                characters.retain(|c| c != character_id);
            }
            Ok(())
        })
    }

    pub fn characters_at(&self, id: &PlaceId) -> Result<Vec<String>> {
        Ok(self.get(id)?.characters.unwrap_or_default())
    }

    /// Places of type `contained` directly inside `container_id`.
    pub fn places_in(
        &self,
        container_id: &PlaceId,
        container: PlaceType,
        contained: PlaceType,
    ) -> Result<Vec<PlaceSummary>> {
        let map = self.map_store.load()?;
        let places: Vec<PlaceSummary> = map
            .places_in(container_id, container, contained)
            .into_iter()
            .map(|(id, node)| PlaceSummary {
                id: id.clone(),
                place_template: node.place_template.clone(),
            })
            .collect();

        if places.is_empty() {
            warn!(%container, container_id = %container_id, %contained, "No contained places found");
        }
        Ok(places)
    }

    /// The most recently allocated place still present in the map.
    pub fn highest_identifier(&self) -> Result<Option<PlaceId>> {
        Ok(self.map_store.load()?.highest_identifier().cloned())
    }
}
