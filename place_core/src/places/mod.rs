//! Typed operations over the map document.
//!
//! - **accessor**: lookups and mutations of single places
//! - **hierarchy**: parent-pointer walks up to the world
//! - **navigation**: cardinal connections between areas
//!
//! The walker and the navigation graph hold no state of their own; they work
//! on the map as read at call time.

mod accessor;
mod hierarchy;
mod navigation;

pub use accessor::*;
pub use hierarchy::*;
pub use navigation::*;

use place_rules::{PlaceId, PlaceMap, PlaceNode, PlaceType};

use crate::error::{PlaceError, Result};

pub(crate) fn lookup<'a>(map: &'a PlaceMap, id: &PlaceId) -> Result<&'a PlaceNode> {
    map.get(id).ok_or_else(|| PlaceError::PlaceNotFound(id.clone()))
}

pub(crate) fn lookup_mut<'a>(map: &'a mut PlaceMap, id: &PlaceId) -> Result<&'a mut PlaceNode> {
    map.get_mut(id)
        .ok_or_else(|| PlaceError::PlaceNotFound(id.clone()))
}

pub(crate) fn type_of_node(id: &PlaceId, node: &PlaceNode) -> Result<PlaceType> {
    node.place_type()
        .map_err(|err| PlaceError::unknown_type(id, err))
}

/// Template name of a node, which must not be blank.
pub(crate) fn template_of_node<'a>(id: &PlaceId, node: &'a PlaceNode) -> Result<&'a str> {
    if node.place_template.trim().is_empty() {
        return Err(PlaceError::MissingPlaceTemplate(id.clone()));
    }
    Ok(&node.place_template)
}

/// Look up a node that must be an area.
pub(crate) fn lookup_area<'a>(map: &'a PlaceMap, id: &PlaceId) -> Result<&'a PlaceNode> {
    let node = map
        .get(id)
        .ok_or_else(|| PlaceError::AreaNotFound(id.clone()))?;
    ensure_area(id, node)?;
    Ok(node)
}

pub(crate) fn ensure_area(id: &PlaceId, node: &PlaceNode) -> Result<()> {
    if node.is_type(PlaceType::Area) {
        Ok(())
    } else {
        Err(PlaceError::NotAnArea {
            id: id.clone(),
            actual: node.type_tag.clone(),
        })
    }
}
