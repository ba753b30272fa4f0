//! Playthrough metadata: creation, the current place, and the story universe.

use place_rules::{PlaceId, PlaceMap, PlaceType, PlaythroughMetadata};
use rand::Rng;
use tracing::info;

use super::json::{read_json, write_json};
use super::templates::TemplateCatalog;
use crate::context::PlaythroughContext;
use crate::error::{PlaceError, Result};

#[derive(Debug, Clone)]
pub struct MetadataStore {
    ctx: PlaythroughContext,
}

impl MetadataStore {
    pub fn new(ctx: &PlaythroughContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    pub fn load(&self) -> Result<PlaythroughMetadata> {
        read_json(&self.ctx.metadata_path())
    }

    /// Replace the metadata. Callers doing read-modify-write hold the write gate.
    pub fn save(&self, metadata: &PlaythroughMetadata) -> Result<()> {
        write_json(&self.ctx.metadata_path(), metadata)
    }

    /// Check if this playthrough has been created.
    pub fn exists(&self) -> bool {
        self.ctx.playthrough_dir().exists()
    }

    /// Create the playthrough with a random starting hour.
    pub fn create_playthrough(&self, story_universe_template: &str) -> Result<PlaythroughMetadata> {
        self.create_playthrough_with_rng(story_universe_template, &mut rand::thread_rng())
    }

    /// Create the playthrough: fresh metadata plus an empty map.
    pub fn create_playthrough_with_rng<R: Rng + ?Sized>(
        &self,
        story_universe_template: &str,
        rng: &mut R,
    ) -> Result<PlaythroughMetadata> {
        let catalog = TemplateCatalog::new(&self.ctx);
        if !catalog.contains(PlaceType::StoryUniverse, story_universe_template)? {
            return Err(PlaceError::TemplateNotFound {
                name: story_universe_template.to_string(),
                place_type: PlaceType::StoryUniverse,
            });
        }

        let _gate = self.ctx.lock_writes();
        if self.exists() {
            return Err(PlaceError::PlaythroughExists(self.ctx.name().to_string()));
        }

        let metadata = PlaythroughMetadata::new(story_universe_template, rng.gen_range(0..=23));
        self.save(&metadata)?;
        write_json(&self.ctx.map_path(), &PlaceMap::new())?;

        info!(
            playthrough = self.ctx.name(),
            story_universe = story_universe_template,
            path = %self.ctx.playthrough_dir().display(),
            "Created playthrough"
        );
        Ok(metadata)
    }

    /// The place the player is at, if one has been set.
    pub fn current_place(&self) -> Result<Option<PlaceId>> {
        Ok(self.load()?.current_place())
    }

    pub fn set_current_place(&self, id: &PlaceId) -> Result<()> {
        let _gate = self.ctx.lock_writes();
        let mut metadata = self.load()?;
        metadata.current_place = id.to_string();
        self.save(&metadata)
    }

    pub fn story_universe_template(&self) -> Result<String> {
        Ok(self.load()?.story_universe_template)
    }
}
