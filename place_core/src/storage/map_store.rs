//! Map Store - the single source of truth for place nodes.

use place_rules::PlaceMap;

use super::json::{read_json_or_default, write_json};
use crate::context::PlaythroughContext;
use crate::error::Result;

/// Whole-document access to a playthrough's map.
#[derive(Debug, Clone)]
pub struct MapStore {
    ctx: PlaythroughContext,
}

impl MapStore {
    pub fn new(ctx: &PlaythroughContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Load the whole map. A playthrough without a map file has an empty map.
    pub fn load(&self) -> Result<PlaceMap> {
        read_json_or_default(&self.ctx.map_path())
    }

    /// Replace the whole map.
    ///
    /// Doesn't take the write gate; callers doing read-modify-write should
    /// hold it or use [`MapStore::update`].
    pub fn save(&self, map: &PlaceMap) -> Result<()> {
        write_json(&self.ctx.map_path(), map)
    }

    /// Load, modify and save the map under the write gate.
    ///
    /// Nothing is written if `apply` fails.
    pub fn update<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut PlaceMap) -> Result<T>,
    {
        let _gate = self.ctx.lock_writes();
        let mut map = self.load()?;
        let value = apply(&mut map)?;
        self.save(&map)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaceError;
    use crate::testing::Fixture;
    use place_rules::{PlaceId, PlaceNode};

    #[test]
    fn test_load_empty() {
        let fixture = Fixture::new();
        let store = MapStore::new(&fixture.ctx);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let fixture = Fixture::new();
        let store = MapStore::new(&fixture.ctx);

        let mut map = PlaceMap::new();
        map.insert(PlaceId::from(1), PlaceNode::world("Ashgate"));
        store.save(&map).unwrap();

        assert_eq!(store.load().unwrap(), map);
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let fixture = Fixture::new();
        let store = MapStore::new(&fixture.ctx);

        let result: Result<()> = store.update(|map| {
            map.insert(PlaceId::from(1), PlaceNode::world("Ashgate"));
            Err(PlaceError::PlaceNotFound(PlaceId::from(9)))
        });

        assert!(result.is_err());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_update_persists() {
        let fixture = Fixture::new();
        let store = MapStore::new(&fixture.ctx);

        let len = store
            .update(|map| {
                map.insert(PlaceId::from(1), PlaceNode::world("Ashgate"));
                Ok(map.len())
            })
            .unwrap();

        assert_eq!(len, 1);
        assert!(store.load().unwrap().contains(&PlaceId::from(1)));
    }
}
