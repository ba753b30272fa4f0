//! Temporary playthroughs for unit tests.

use place_rules::{PlaceId, PlaceMap, PlaceNode, PlaceType, PlaythroughMetadata, Template};
use tempfile::TempDir;

use crate::config::EngineConfig;
use crate::context::PlaythroughContext;
use crate::storage::{MapStore, MetadataStore, TemplateCatalog, Visibility};

pub(crate) const PLAYTHROUGH: &str = "test";

/// A playthrough named "test" rooted in its own temporary directory.
pub(crate) struct Fixture {
    pub ctx: PlaythroughContext,
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::with_data_root(dir.path());
        Self {
            ctx: PlaythroughContext::new(&config, PLAYTHROUGH),
            dir,
        }
    }

    /// A separately constructed context on the same data root.
    pub fn open(&self, name: &str) -> PlaythroughContext {
        PlaythroughContext::new(&EngineConfig::with_data_root(self.dir.path()), name)
    }

    pub fn with_template(self, place_type: PlaceType, name: &str, categories: &[&str]) -> Self {
        let template = Template::new(format!("{name}, as seen in tests"))
            .with_categories(categories.iter().copied());
        self.save_template(place_type, name, template)
    }

    pub fn with_subtyped_template(
        self,
        place_type: PlaceType,
        name: &str,
        categories: &[&str],
        subtype: &str,
    ) -> Self {
        let template = Template::new(format!("{name}, as seen in tests"))
            .with_categories(categories.iter().copied())
            .with_subtype(subtype);
        self.save_template(place_type, name, template)
    }

    pub fn with_story_universe(self, name: &str, categories: &[&str]) -> Self {
        self.with_template(PlaceType::StoryUniverse, name, categories)
    }

    /// Fresh metadata and an empty map.
    pub fn with_playthrough(self) -> Self {
        MapStore::new(&self.ctx).save(&PlaceMap::new()).unwrap();
        self.with_playthrough_counter(0)
    }

    /// Metadata whose place counter already stands at `last_place`. The map
    /// is left alone.
    pub fn with_playthrough_counter(self, last_place: u64) -> Self {
        let mut metadata = PlaythroughMetadata::new("Emberfall", 12);
        metadata.set_last_identifier(place_rules::EntityClass::Places, last_place);
        MetadataStore::new(&self.ctx).save(&metadata).unwrap();
        self
    }

    pub fn with_sample_map(self) -> Self {
        MapStore::new(&self.ctx).save(&sample_map()).unwrap();
        self
    }

    pub fn edit_map(&self, edit: impl FnOnce(&mut PlaceMap)) {
        let store = MapStore::new(&self.ctx);
        let mut map = store.load().unwrap();
        edit(&mut map);
        store.save(&map).unwrap();
    }

    fn save_template(self, place_type: PlaceType, name: &str, template: Template) -> Self {
        TemplateCatalog::new(&self.ctx)
            .save(place_type, name, template, Visibility::Public)
            .unwrap();
        self
    }
}

/// World 1 > Region 2 > Area 3 > Location 4 > Room 5.
pub(crate) fn sample_map() -> PlaceMap {
    let mut map = PlaceMap::new();
    map.insert(PlaceId::from(1), PlaceNode::world("Ashgate"));
    map.insert(PlaceId::from(2), PlaceNode::region("Ember Reach", PlaceId::from(1)));

    let mut area = PlaceNode::area("Thistle Vale", PlaceId::from(2), "sunny");
    area.locations = Some(vec![PlaceId::from(4)]);
    map.insert(PlaceId::from(3), area);

    map.insert(PlaceId::from(4), PlaceNode::location("Old Mill", PlaceId::from(3)));
    map.insert(PlaceId::from(5), PlaceNode::room("Cellar", PlaceId::from(4)));
    map
}
