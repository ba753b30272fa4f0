//! Content templates used to instantiate places.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Templates of one place type, keyed by template name.
pub type TemplateSet = BTreeMap<String, Template>;

/// A named, category-tagged content definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Tags used to match a child template to its father's theme.
    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub description: String,

    /// Sub-type tag (e.g. "tavern" for a location).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Template {
    /// Create a template with a description and no categories.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            categories: Vec::new(),
            description: description.into(),
            subtype: None,
            extra: BTreeMap::new(),
        }
    }

    /// Add a category to this template.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Add multiple categories to this template.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    /// Set the sub-type tag.
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn category_set(&self) -> BTreeSet<&str> {
        self.categories.iter().map(String::as_str).collect()
    }

    /// Check if this template shares at least one category with `reference`.
    pub fn shares_category_with(&self, reference: &BTreeSet<String>) -> bool {
        self.categories.iter().any(|c| reference.contains(c))
    }
}
