//! Navigation Graph - cardinal connections between areas.
//!
//! A connection is a directed edge stored on the origin area. A full two-way
//! link takes two [`NavigationGraph::connect`] calls, one per direction.

use place_rules::{CardinalDirection, PlaceId};
use tracing::{info, warn};

use super::{lookup_area, template_of_node};
use crate::context::PlaythroughContext;
use crate::error::{PlaceError, Result};
use crate::storage::MapStore;

/// The area at the other end of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: PlaceId,
    pub place_template: String,
}

/// Connections of an area, one slot per direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connections {
    pub north: Option<Connection>,
    pub south: Option<Connection>,
    pub east: Option<Connection>,
    pub west: Option<Connection>,
}

impl Connections {
    pub fn get(&self, direction: CardinalDirection) -> Option<&Connection> {
        match direction {
            CardinalDirection::North => self.north.as_ref(),
            CardinalDirection::South => self.south.as_ref(),
            CardinalDirection::East => self.east.as_ref(),
            CardinalDirection::West => self.west.as_ref(),
        }
    }

    fn slot(&mut self, direction: CardinalDirection) -> &mut Option<Connection> {
        match direction {
            CardinalDirection::North => &mut self.north,
            CardinalDirection::South => &mut self.south,
            CardinalDirection::East => &mut self.east,
            CardinalDirection::West => &mut self.west,
        }
    }

    /// Directions that don't lead anywhere yet.
    pub fn open_directions(&self) -> Vec<CardinalDirection> {
        CardinalDirection::ALL
            .into_iter()
            .filter(|direction| self.get(*direction).is_none())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct NavigationGraph {
    map_store: MapStore,
}

impl NavigationGraph {
    pub fn new(ctx: &PlaythroughContext) -> Self {
        Self {
            map_store: MapStore::new(ctx),
        }
    }

    pub fn opposite(direction: CardinalDirection) -> CardinalDirection {
        direction.opposite()
    }

    pub fn has_connection(&self, area_id: &PlaceId, direction: CardinalDirection) -> Result<bool> {
        let map = self.map_store.load()?;
        Ok(lookup_area(&map, area_id)?.connection(direction).is_some())
    }

    /// Set the `direction` slot of `origin_id` to `destination_id`.
    ///
    /// A slot can be set only once.
    pub fn connect(
        &self,
        direction: CardinalDirection,
        origin_id: &PlaceId,
        destination_id: &PlaceId,
    ) -> Result<()> {
        self.map_store.update(|map| {
            lookup_area(map, origin_id)?;
            let origin = map
                .get_mut(origin_id)
                .ok_or_else(|| PlaceError::AreaNotFound(origin_id.clone()))?;

            let slot = origin.connection_slot(direction);
            if slot.is_some() {
                return Err(PlaceError::DuplicateConnection {
                    id: origin_id.clone(),
                    direction,
                });
            }
            *slot = Some(destination_id.clone());

            info!(%direction, origin = %origin_id, destination = %destination_id, "Created cardinal connection");
            Ok(())
        })
    }

    /// Connections of an area. Edges to places missing from the map read as
    /// no connection.
    pub fn connections_of(&self, area_id: &PlaceId) -> Result<Connections> {
        let map = self.map_store.load()?;
        let area = lookup_area(&map, area_id)?;
        let mut connections = Connections::default();

        for direction in CardinalDirection::ALL {
            let Some(target_id) = area.connection(direction) else {
                continue;
            };
            let Some(target) = map.get(target_id) else {
                warn!(area = %area_id, %direction, target = %target_id, "Connected area not found in map");
                continue;
            };

            *connections.slot(direction) = Some(Connection {
                id: target_id.clone(),
                place_template: template_of_node(target_id, target)?.to_string(),
            });
        }

        Ok(connections)
    }
}
