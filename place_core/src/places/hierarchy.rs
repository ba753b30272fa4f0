//! Hierarchy Walker - reconstructs the ancestor chain of a place.

use place_rules::{PlaceId, PlaceMap, PlaceNode, PlaceType};
use tracing::warn;

use super::{lookup, template_of_node, type_of_node};
use crate::context::PlaythroughContext;
use crate::error::{PlaceError, Result};
use crate::storage::{MapStore, TemplateCatalog};

/// A node together with its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRef {
    pub id: PlaceId,
    pub node: PlaceNode,
}

/// The chain of places from a node up to its world.
///
/// Levels the walk didn't pass through are `None`; the world is always there.
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    pub world: PlaceRef,
    pub region: Option<PlaceRef>,
    pub area: Option<PlaceRef>,
    pub location: Option<PlaceRef>,
    pub room: Option<PlaceRef>,
}

impl Hierarchy {
    pub fn level(&self, place_type: PlaceType) -> Option<&PlaceRef> {
        match place_type {
            PlaceType::StoryUniverse => None,
            PlaceType::World => Some(&self.world),
            PlaceType::Region => self.region.as_ref(),
            PlaceType::Area => self.area.as_ref(),
            PlaceType::Location => self.location.as_ref(),
            PlaceType::Room => self.room.as_ref(),
        }
    }
}

/// Template names along a hierarchy, as used for guideline keys.
///
/// A missing region takes the world's name, a missing area the region's
/// (after that fallback). A missing location stays missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyTemplates {
    pub world: String,
    pub region: String,
    pub area: String,
    pub location: Option<String>,
}

/// Name and description of one level of a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceDescription {
    pub place_type: PlaceType,
    pub name: String,
    pub description: String,
}

/// Walk parent pointers from `id` up to the world.
///
/// The walk is bounded by the number of place types, so corrupted parent
/// pointers (cycles, dangling or missing links) end in
/// [`PlaceError::IncompleteHierarchy`] instead of looping.
pub fn ancestors_in(map: &PlaceMap, id: &PlaceId) -> Result<Hierarchy> {
    let mut world = None;
    let mut region = None;
    let mut area = None;
    let mut location = None;
    let mut room = None;

    let mut current = id.clone();
    for _ in 0..PlaceType::ALL.len() {
        let node = match map.get(&current) {
            Some(node) => node,
            None if current == *id => return Err(PlaceError::PlaceNotFound(id.clone())),
            None => {
                warn!(start = %id, missing = %current, "Dangling parent pointer");
                return Err(PlaceError::IncompleteHierarchy(id.clone()));
            }
        };
        let place_type = type_of_node(&current, node)?;

        let slot = match place_type {
            PlaceType::World => &mut world,
            PlaceType::Region => &mut region,
            PlaceType::Area => &mut area,
            PlaceType::Location => &mut location,
            PlaceType::Room => &mut room,
            PlaceType::StoryUniverse => {
                return Err(PlaceError::UnhandledType {
                    id: current,
                    place_type,
                })
            }
        };
        if slot.is_some() {
            warn!(start = %id, repeated = %current, "Cycle in parent pointers");
            return Err(PlaceError::IncompleteHierarchy(id.clone()));
        }
        *slot = Some(PlaceRef {
            id: current.clone(),
            node: node.clone(),
        });

        if place_type == PlaceType::World {
            break;
        }

        match node.parent_for(place_type) {
            Some(parent) => current = parent.clone(),
            None => {
                warn!(start = %id, orphan = %current, %place_type, "Place has no parent link");
                return Err(PlaceError::IncompleteHierarchy(id.clone()));
            }
        }
    }

    let world = world.ok_or_else(|| PlaceError::IncompleteHierarchy(id.clone()))?;
    Ok(Hierarchy {
        world,
        region,
        area,
        location,
        room,
    })
}

/// The identifier stored under the parent field of `id`.
pub fn father_identifier_in(map: &PlaceMap, id: &PlaceId) -> Result<PlaceId> {
    let node = lookup(map, id)?;
    let place_type = type_of_node(id, node)?;

    match place_type {
        PlaceType::World => Err(PlaceError::NoFather(id.clone())),
        PlaceType::StoryUniverse => Err(PlaceError::UnhandledType {
            id: id.clone(),
            place_type,
        }),
        PlaceType::Region | PlaceType::Area | PlaceType::Location | PlaceType::Room => node
            .parent_for(place_type)
            .cloned()
            .ok_or_else(|| PlaceError::MissingParent {
                id: id.clone(),
                place_type,
                field: place_type.parent_field().unwrap_or_default(),
            }),
    }
}

/// Template names along the hierarchy of `id`, with level fallbacks applied.
pub fn templates_along_hierarchy_in(map: &PlaceMap, id: &PlaceId) -> Result<HierarchyTemplates> {
    let hierarchy = ancestors_in(map, id)?;
    let template = |place: &PlaceRef| template_of_node(&place.id, &place.node).map(str::to_string);

    let world = template(&hierarchy.world)?;
    let region = match &hierarchy.region {
        Some(place) => template(place)?,
        None => world.clone(),
    };
    let area = match &hierarchy.area {
        Some(place) => template(place)?,
        None => region.clone(),
    };
    let location = hierarchy.location.as_ref().map(template).transpose()?;

    Ok(HierarchyTemplates {
        world,
        region,
        area,
        location,
    })
}

#[derive(Debug, Clone)]
pub struct HierarchyWalker {
    map_store: MapStore,
    catalog: TemplateCatalog,
}

impl HierarchyWalker {
    pub fn new(ctx: &PlaythroughContext) -> Self {
        Self {
            map_store: MapStore::new(ctx),
            catalog: TemplateCatalog::new(ctx),
        }
    }

    pub fn ancestors(&self, id: &PlaceId) -> Result<Hierarchy> {
        ancestors_in(&self.map_store.load()?, id)
    }

    pub fn father_identifier(&self, id: &PlaceId) -> Result<PlaceId> {
        father_identifier_in(&self.map_store.load()?, id)
    }

    pub fn templates_along_hierarchy(&self, id: &PlaceId) -> Result<HierarchyTemplates> {
        templates_along_hierarchy_in(&self.map_store.load()?, id)
    }

    /// Template of the place one level above `id`.
    pub fn father_template(&self, id: &PlaceId) -> Result<String> {
        let map = self.map_store.load()?;
        let place_type = type_of_node(id, lookup(&map, id)?)?;
        let templates = templates_along_hierarchy_in(&map, id)?;

        match place_type {
            PlaceType::Location => Ok(templates.area),
            PlaceType::Area => Ok(templates.region),
            PlaceType::Region => Ok(templates.world),
            PlaceType::StoryUniverse | PlaceType::World | PlaceType::Room => {
                Err(PlaceError::UnhandledType {
                    id: id.clone(),
                    place_type,
                })
            }
        }
    }

    /// The area a place is in. An area is in itself.
    pub fn area_of(&self, id: &PlaceId) -> Result<PlaceId> {
        let map = self.map_store.load()?;
        let place_type = type_of_node(id, lookup(&map, id)?)?;

        match place_type {
            PlaceType::Area => Ok(id.clone()),
            PlaceType::Location | PlaceType::Room => ancestors_in(&map, id)?
                .area
                .map(|area| area.id)
                .ok_or_else(|| PlaceError::IncompleteHierarchy(id.clone())),
            PlaceType::StoryUniverse | PlaceType::World | PlaceType::Region => {
                Err(PlaceError::UnhandledType {
                    id: id.clone(),
                    place_type,
                })
            }
        }
    }

    /// Names and descriptions of the world, region, area and location above `id`.
    pub fn describe(&self, id: &PlaceId) -> Result<Vec<PlaceDescription>> {
        let hierarchy = self.ancestors(id)?;
        let mut descriptions = Vec::new();

        for place_type in [
            PlaceType::World,
            PlaceType::Region,
            PlaceType::Area,
            PlaceType::Location,
        ] {
            let Some(place) = hierarchy.level(place_type) else {
                continue;
            };
            let name = template_of_node(&place.id, &place.node)?;
            let template = self.catalog.get(place_type, name)?;
            if template.description.trim().is_empty() {
                return Err(PlaceError::MissingDescription {
                    name: name.to_string(),
                    place_type,
                });
            }

            descriptions.push(PlaceDescription {
                place_type,
                name: name.to_string(),
                description: template.description,
            });
        }

        Ok(descriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Visibility;
    use crate::testing::{sample_map, Fixture};
    use place_rules::Template;

    #[test]
    fn test_ancestors_of_room() {
        let map = sample_map();
        let hierarchy = ancestors_in(&map, &PlaceId::from(5)).unwrap();

        assert_eq!(hierarchy.world.id, PlaceId::from(1));
        assert_eq!(hierarchy.region.unwrap().id, PlaceId::from(2));
        assert_eq!(hierarchy.area.unwrap().id, PlaceId::from(3));
        assert_eq!(hierarchy.location.unwrap().id, PlaceId::from(4));
        assert_eq!(hierarchy.room.unwrap().id, PlaceId::from(5));
    }

    #[test]
    fn test_ancestors_of_world() {
        let map = sample_map();
        let hierarchy = ancestors_in(&map, &PlaceId::from(1)).unwrap();
        assert_eq!(hierarchy.world.node.place_template, "Ashgate");
        assert!(hierarchy.region.is_none());
    }

    #[test]
    fn test_dangling_parent_is_incomplete() {
        let mut map = sample_map();
        map.get_mut(&PlaceId::from(2)).unwrap().world = Some(PlaceId::from(77));

        let err = ancestors_in(&map, &PlaceId::from(4)).unwrap_err();
        assert!(matches!(err, PlaceError::IncompleteHierarchy(id) if id == PlaceId::from(4)));
    }

    #[test]
    fn test_cycle_is_incomplete() {
        let mut map = sample_map();
        // Region points back at the area below it
        map.get_mut(&PlaceId::from(2)).unwrap().world = Some(PlaceId::from(3));

        let err = ancestors_in(&map, &PlaceId::from(3)).unwrap_err();
        assert!(matches!(err, PlaceError::IncompleteHierarchy(_)));
    }

    #[test]
    fn test_self_loop_is_incomplete() {
        let mut map = sample_map();
        map.get_mut(&PlaceId::from(3)).unwrap().region = Some(PlaceId::from(3));

        let err = ancestors_in(&map, &PlaceId::from(4)).unwrap_err();
        assert!(matches!(err, PlaceError::IncompleteHierarchy(_)));
    }

    #[test]
    fn test_missing_start_is_not_found() {
        let map = sample_map();
        let err = ancestors_in(&map, &PlaceId::from(40)).unwrap_err();
        assert!(matches!(err, PlaceError::PlaceNotFound(_)));
    }

    #[test]
    fn test_father_identifier_matches_parent_field() {
        let map = sample_map();
        for (id, node) in map.iter() {
            let place_type = node.place_type().unwrap();
            match place_type {
                PlaceType::World => assert!(matches!(
                    father_identifier_in(&map, id),
                    Err(PlaceError::NoFather(_))
                )),
                _ => assert_eq!(
                    Some(&father_identifier_in(&map, id).unwrap()),
                    node.parent_for(place_type)
                ),
            }
        }
    }

    #[test]
    fn test_father_identifier_of_story_universe_entry() {
        let mut map = sample_map();
        map.get_mut(&PlaceId::from(1)).unwrap().type_tag = "story_universe".to_string();

        let err = father_identifier_in(&map, &PlaceId::from(1)).unwrap_err();
        assert!(matches!(
            err,
            PlaceError::UnhandledType { place_type: PlaceType::StoryUniverse, .. }
        ));
    }

    #[test]
    fn test_templates_along_full_hierarchy() {
        let map = sample_map();
        let templates = templates_along_hierarchy_in(&map, &PlaceId::from(4)).unwrap();

        assert_eq!(
            templates,
            HierarchyTemplates {
                world: "Ashgate".to_string(),
                region: "Ember Reach".to_string(),
                area: "Thistle Vale".to_string(),
                location: Some("Old Mill".to_string()),
            }
        );
    }

    #[test]
    fn test_templates_fall_back_to_nearest_ancestor() {
        let mut map = sample_map();
        // An area hanging directly under the world
        map.insert(
            PlaceId::from(6),
            PlaceNode::area("Glasswater", PlaceId::from(1), "sunny"),
        );

        let templates = templates_along_hierarchy_in(&map, &PlaceId::from(6)).unwrap();
        assert_eq!(templates.region, "Ashgate");
        assert_eq!(templates.area, "Glasswater");
        assert_eq!(templates.location, None);

        let world_only = templates_along_hierarchy_in(&map, &PlaceId::from(1)).unwrap();
        assert_eq!(world_only.region, "Ashgate");
        assert_eq!(world_only.area, "Ashgate");
    }

    #[test]
    fn test_father_template() {
        let fixture = Fixture::new().with_sample_map();
        let walker = HierarchyWalker::new(&fixture.ctx);

        assert_eq!(walker.father_template(&PlaceId::from(4)).unwrap(), "Thistle Vale");
        assert_eq!(walker.father_template(&PlaceId::from(3)).unwrap(), "Ember Reach");
        assert_eq!(walker.father_template(&PlaceId::from(2)).unwrap(), "Ashgate");
        assert!(matches!(
            walker.father_template(&PlaceId::from(1)),
            Err(PlaceError::UnhandledType { .. })
        ));
    }

    #[test]
    fn test_area_of() {
        let fixture = Fixture::new().with_sample_map();
        let walker = HierarchyWalker::new(&fixture.ctx);

        assert_eq!(walker.area_of(&PlaceId::from(3)).unwrap(), PlaceId::from(3));
        assert_eq!(walker.area_of(&PlaceId::from(5)).unwrap(), PlaceId::from(3));
        assert!(walker.area_of(&PlaceId::from(2)).is_err());
    }

    #[test]
    fn test_describe() {
        let fixture = Fixture::new()
            .with_sample_map()
            .with_template(PlaceType::World, "Ashgate", &["volcanic"])
            .with_template(PlaceType::Region, "Ember Reach", &["forest"])
            .with_template(PlaceType::Area, "Thistle Vale", &["forest"]);
        let walker = HierarchyWalker::new(&fixture.ctx);

        let descriptions = walker.describe(&PlaceId::from(3)).unwrap();
        let names: Vec<_> = descriptions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Ashgate", "Ember Reach", "Thistle Vale"]);
        assert_eq!(descriptions[0].place_type, PlaceType::World);

        // The location's template isn't in the catalog
        assert!(matches!(
            walker.describe(&PlaceId::from(4)),
            Err(PlaceError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn test_describe_rejects_blank_description() {
        let fixture = Fixture::new()
            .with_sample_map()
            .with_template(PlaceType::World, "Ashgate", &["volcanic"]);
        TemplateCatalog::new(&fixture.ctx)
            .save(
                PlaceType::Region,
                "Ember Reach",
                Template::new("  ").with_category("forest"),
                Visibility::Public,
            )
            .unwrap();

        let err = HierarchyWalker::new(&fixture.ctx)
            .describe(&PlaceId::from(2))
            .unwrap_err();
        assert!(matches!(
            err,
            PlaceError::MissingDescription { name, place_type: PlaceType::Region } if name == "Ember Reach"
        ));
    }
}
