//! Guidelines Cache - generated guidelines keyed by the hierarchy they belong to.

use std::collections::BTreeMap;

use tracing::info;

use super::json::{read_json_or_default, write_json};
use crate::context::PlaythroughContext;
use crate::error::{PlaceError, Result};
use crate::places::HierarchyTemplates;

type GuidelinesDocument = BTreeMap<String, Vec<String>>;

/// Composite key made of ancestor template names, root to leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GuidelineKey(String);

impl GuidelineKey {
    pub fn new(
        story_universe: &str,
        world: &str,
        region: &str,
        area: &str,
        location: Option<&str>,
    ) -> Self {
        let key = match location {
            Some(location) => format!("{story_universe}:{world}:{region}:{area}:{location}"),
            None => format!("{story_universe}:{world}:{region}:{area}"),
        };
        Self(key)
    }

    /// Key for the templates found along a place's hierarchy.
    pub fn for_hierarchy(story_universe: &str, templates: &HierarchyTemplates) -> Self {
        Self::new(
            story_universe,
            &templates.world,
            &templates.region,
            &templates.area,
            templates.location.as_deref(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GuidelineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only store of guidelines.
#[derive(Debug, Clone)]
pub struct GuidelinesCache {
    ctx: PlaythroughContext,
}

impl GuidelinesCache {
    pub fn new(ctx: &PlaythroughContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    fn document(&self) -> Result<GuidelinesDocument> {
        read_json_or_default(self.ctx.guidelines_path())
    }

    pub fn exists(&self, key: &GuidelineKey) -> Result<bool> {
        Ok(self.document()?.contains_key(key.as_str()))
    }

    pub fn load(&self, key: &GuidelineKey) -> Result<Vec<String>> {
        self.document()?
            .remove(key.as_str())
            .ok_or_else(|| PlaceError::GuidelinesNotFound(key.to_string()))
    }

    /// Append guidelines under `key`, creating the entry if it's new.
    ///
    /// Existing guidelines are never replaced or deduplicated.
    pub fn append<I, S>(&self, key: &GuidelineKey, guidelines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let guidelines: Vec<String> = guidelines.into_iter().map(Into::into).collect();
        if guidelines.iter().any(|g| g.trim().is_empty()) {
            return Err(PlaceError::InvalidGuideline);
        }

        let _gate = self.ctx.lock_guidelines();
        let mut document = self.document()?;
        let entry = document.entry(key.to_string()).or_default();
        entry.extend(guidelines);
        let total = entry.len();
        write_json(self.ctx.guidelines_path(), &document)?;

        info!(key = %key, total, "Stored guidelines");
        Ok(())
    }
}
