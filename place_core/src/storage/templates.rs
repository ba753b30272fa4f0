//! Template Catalog - content templates per place type.
//!
//! Each type has a public document and a parallel secret one. Reads merge the
//! two; writes go to exactly one of them.

use std::path::PathBuf;

use place_rules::{PlaceType, Template, TemplateSet};
use tracing::debug;

use super::json::{read_json_or_default, write_json};
use crate::context::PlaythroughContext;
use crate::error::{PlaceError, Result};

/// Which document a template is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    /// Hidden from listings meant for players, but usable for generation.
    Secret,
}

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    ctx: PlaythroughContext,
}

impl TemplateCatalog {
    pub fn new(ctx: &PlaythroughContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    fn path(&self, place_type: PlaceType, visibility: Visibility) -> PathBuf {
        let file = match visibility {
            Visibility::Public => format!("{}s.json", place_type.as_str()),
            Visibility::Secret => format!("secret_{}s.json", place_type.as_str()),
        };
        self.ctx.templates_dir().join(file)
    }

    /// Load only the templates stored with the given visibility.
    pub fn load_only(&self, place_type: PlaceType, visibility: Visibility) -> Result<TemplateSet> {
        read_json_or_default(&self.path(place_type, visibility))
    }

    /// Load every template of a type, secret ones included.
    ///
    /// A secret template shadows a public one with the same name.
    pub fn load(&self, place_type: PlaceType) -> Result<TemplateSet> {
        let mut templates = self.load_only(place_type, Visibility::Public)?;
        let secret = self.load_only(place_type, Visibility::Secret)?;

        debug!(
            %place_type,
            public = templates.len(),
            secret = secret.len(),
            "Loaded templates"
        );

        templates.extend(secret);
        Ok(templates)
    }

    pub fn get(&self, place_type: PlaceType, name: &str) -> Result<Template> {
        self.load(place_type)?
            .remove(name)
            .ok_or_else(|| PlaceError::TemplateNotFound {
                name: name.to_string(),
                place_type,
            })
    }

    pub fn contains(&self, place_type: PlaceType, name: &str) -> Result<bool> {
        Ok(self.load(place_type)?.contains_key(name))
    }

    /// Names of every template of a type, sorted.
    pub fn names(&self, place_type: PlaceType) -> Result<Vec<String>> {
        Ok(self.load(place_type)?.into_keys().collect())
    }

    /// Add or replace a template in the document of the given visibility.
    pub fn save(
        &self,
        place_type: PlaceType,
        name: impl Into<String>,
        template: Template,
        visibility: Visibility,
    ) -> Result<()> {
        let name = name.into();
        let path = self.path(place_type, visibility);

        let _gate = self.ctx.lock_templates();
        let mut templates: TemplateSet = read_json_or_default(&path)?;
        templates.insert(name.clone(), template);
        write_json(&path, &templates)?;

        debug!(%place_type, name = %name, ?visibility, "Saved template");
        Ok(())
    }
}
