//! Map-Entry Builder - creates new places from unused templates.

use std::collections::BTreeSet;

use place_rules::{CardinalDirection, EntityClass, PlaceId, PlaceNode, PlaceType, TemplateSet};
use rand::Rng;
use tracing::{debug, info};

use super::CategoryFilter;
use crate::context::PlaythroughContext;
use crate::error::{PlaceError, Result};
use crate::places::{
    father_identifier_in, lookup, lookup_area, template_of_node, NavigationGraph, PlaceAccessor,
};
use crate::storage::{IdentifierAllocator, MapStore, TemplateCatalog};

/// What to build, and under which father.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntryRequest {
    /// Where the new node hangs. Required for everything but worlds.
    pub father_id: Option<PlaceId>,
    pub father_template: String,
    pub father_type: PlaceType,
    pub new_type: PlaceType,
    pub required_subtype: Option<String>,
}

impl MapEntryRequest {
    /// A world matched against a story-universe template.
    pub fn world(story_universe_template: impl Into<String>) -> Self {
        Self {
            father_id: None,
            father_template: story_universe_template.into(),
            father_type: PlaceType::StoryUniverse,
            new_type: PlaceType::World,
            required_subtype: None,
        }
    }

    /// A place of `new_type` under the place `father_id`.
    pub fn child(
        father_id: PlaceId,
        father_template: impl Into<String>,
        father_type: PlaceType,
        new_type: PlaceType,
    ) -> Self {
        Self {
            father_id: Some(father_id),
            father_template: father_template.into(),
            father_type,
            new_type,
            required_subtype: None,
        }
    }

    /// Only accept templates with this sub-type.
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.required_subtype = Some(subtype.into());
        self
    }
}

/// A freshly created map entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlace {
    pub id: PlaceId,
    pub place_type: PlaceType,
    pub place_template: String,
}

/// The places `create_initial_map` lays out under a world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialMap {
    pub region: CreatedPlace,
    pub area: CreatedPlace,
    pub location: CreatedPlace,
}

#[derive(Debug, Clone)]
pub struct MapEntryBuilder {
    ctx: PlaythroughContext,
    map_store: MapStore,
    catalog: TemplateCatalog,
    places: PlaceAccessor,
    identifiers: IdentifierAllocator,
    navigation: NavigationGraph,
}

impl MapEntryBuilder {
    pub fn new(ctx: &PlaythroughContext) -> Self {
        Self {
            ctx: ctx.clone(),
            map_store: MapStore::new(ctx),
            catalog: TemplateCatalog::new(ctx),
            places: PlaceAccessor::new(ctx),
            identifiers: IdentifierAllocator::new(ctx),
            navigation: NavigationGraph::new(ctx),
        }
    }

    pub fn create_entry(&self, request: &MapEntryRequest) -> Result<CreatedPlace> {
        self.create_entry_with_rng(request, &mut rand::thread_rng())
    }

    /// Create one map entry.
    ///
    /// Any failure leaves the map untouched. The node is built before an
    /// identifier is taken, so only a failed final write can skip one.
    pub fn create_entry_with_rng<R: Rng + ?Sized>(
        &self,
        request: &MapEntryRequest,
        rng: &mut R,
    ) -> Result<CreatedPlace> {
        let templates = self.catalog.load(request.new_type)?;

        let _gate = self.ctx.lock_writes();
        let mut map = self.map_store.load()?;

        let available = without_used(templates, &map.templates_of_type(request.new_type));
        if available.is_empty() {
            return Err(PlaceError::NoAvailableTemplates(request.new_type));
        }

        let reference = self
            .places
            .categories_of(&request.father_template, request.father_type)?;
        let place_template = CategoryFilter::new(request.new_type, reference)
            .with_subtype(request.required_subtype.clone())
            .filter_and_select_with_rng(&available, rng)?;

        let node = self.new_node(request, &place_template)?;

        let value = self.identifiers.next_identifier(EntityClass::Places)?;
        self.identifiers.commit(EntityClass::Places, value)?;
        let id = PlaceId::from(value);

        map.insert(id.clone(), node);
        self.map_store.save(&map)?;

        info!(
            playthrough = self.ctx.name(),
            %id,
            place_type = %request.new_type,
            place_template = %place_template,
            "Created map entry"
        );

        Ok(CreatedPlace {
            id,
            place_type: request.new_type,
            place_template,
        })
    }

    fn new_node(&self, request: &MapEntryRequest, place_template: &str) -> Result<PlaceNode> {
        let father = || {
            request
                .father_id
                .clone()
                .ok_or(PlaceError::MissingFather(request.new_type))
        };

        match request.new_type {
            PlaceType::World => {
                if let Some(father_id) = &request.father_id {
                    debug!(%father_id, "Worlds have no father, ignoring it");
                }
                Ok(PlaceNode::world(place_template))
            }
            PlaceType::Region => Ok(PlaceNode::region(place_template, father()?)),
            PlaceType::Area => Ok(PlaceNode::area(
                place_template,
                father()?,
                self.ctx.default_weather(),
            )),
            PlaceType::Location => Ok(PlaceNode::location(place_template, father()?)),
            PlaceType::Room => Ok(PlaceNode::room(place_template, father()?)),
            PlaceType::StoryUniverse => Err(PlaceError::UnhandledType {
                id: request.father_id.clone().unwrap_or_else(|| PlaceId::new("")),
                place_type: PlaceType::StoryUniverse,
            }),
        }
    }

    pub fn create_initial_map(&self, world_id: &PlaceId) -> Result<InitialMap> {
        self.create_initial_map_with_rng(world_id, &mut rand::thread_rng())
    }

    /// Lay out a region, an area inside it and a location inside that.
    pub fn create_initial_map_with_rng<R: Rng + ?Sized>(
        &self,
        world_id: &PlaceId,
        rng: &mut R,
    ) -> Result<InitialMap> {
        let world = self.places.get(world_id)?;
        let world_template = template_of_node(world_id, &world)?.to_string();

        let region = self.create_entry_with_rng(
            &MapEntryRequest::child(world_id.clone(), world_template, PlaceType::World, PlaceType::Region),
            rng,
        )?;
        let area = self.create_entry_with_rng(
            &MapEntryRequest::child(
                region.id.clone(),
                region.place_template.clone(),
                PlaceType::Region,
                PlaceType::Area,
            ),
            rng,
        )?;
        let location = self.create_entry_with_rng(
            &MapEntryRequest::child(
                area.id.clone(),
                area.place_template.clone(),
                PlaceType::Area,
                PlaceType::Location,
            ),
            rng,
        )?;

        Ok(InitialMap {
            region,
            area,
            location,
        })
    }

    pub fn extend_area(
        &self,
        direction: CardinalDirection,
        origin_id: &PlaceId,
    ) -> Result<CreatedPlace> {
        self.extend_area_with_rng(direction, origin_id, &mut rand::thread_rng())
    }

    /// Create a new area in `direction` of `origin_id`, in the same region,
    /// and link the two both ways.
    pub fn extend_area_with_rng<R: Rng + ?Sized>(
        &self,
        direction: CardinalDirection,
        origin_id: &PlaceId,
        rng: &mut R,
    ) -> Result<CreatedPlace> {
        let map = self.map_store.load()?;
        let origin = lookup_area(&map, origin_id)?;
        if origin.connection(direction).is_some() {
            return Err(PlaceError::DuplicateConnection {
                id: origin_id.clone(),
                direction,
            });
        }

        let region_id = father_identifier_in(&map, origin_id)?;
        let region_template = template_of_node(&region_id, lookup(&map, &region_id)?)?.to_string();
        drop(map);

        let area = self.create_entry_with_rng(
            &MapEntryRequest::child(region_id, region_template, PlaceType::Region, PlaceType::Area),
            rng,
        )?;

        self.navigation.connect(direction, origin_id, &area.id)?;
        self.navigation
            .connect(direction.opposite(), &area.id, origin_id)?;

        Ok(area)
    }

    /// Sub-types still available for a `place_type` under a father template.
    pub fn available_subtypes(
        &self,
        father_template: &str,
        place_type: PlaceType,
    ) -> Result<Vec<String>> {
        if !place_type.has_subtypes() {
            return Err(PlaceError::NoSubtypes(place_type));
        }
        let father_type = place_type
            .template_parent()
            .ok_or(PlaceError::NoSubtypes(place_type))?;

        let reference = self.places.categories_of(father_template, father_type)?;
        let templates = self.catalog.load(place_type)?;
        let used = self.places.templates_in_use(place_type)?;

        let subtypes: BTreeSet<String> = CategoryFilter::new(place_type, reference)
            .filter(&without_used(templates, &used))
            .into_values()
            .filter_map(|template| template.subtype)
            .collect();

        Ok(subtypes.into_iter().collect())
    }
}

fn without_used(mut templates: TemplateSet, used: &BTreeSet<String>) -> TemplateSet {
    templates.retain(|name, _| !used.contains(name));
    templates
}
