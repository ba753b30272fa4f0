//! Generation - turning templates into new places.
//!
//! The pipeline works as follows:
//! 1. **Catalog**: load every template of the requested type
//! 2. **Exclusion**: drop templates already used in the map
//! 3. **Reference**: read the categories of the father's template
//! 4. **Filtering**: keep templates sharing a category with the father
//! 5. **Selection**: pick one at random
//! 6. **Allocation**: take the next place identifier
//! 7. **Persistence**: write the new node into the map

mod builder;

pub use builder::*;

use std::collections::BTreeSet;

use place_rules::{PlaceType, TemplateSet};
use rand::seq::IteratorRandom;
use rand::Rng;

use crate::error::{PlaceError, Result};

/// Keep the templates sharing at least one category with `reference` and,
/// if given, carrying exactly `required_subtype`.
pub fn filter_by_categories(
    templates: &TemplateSet,
    reference: &BTreeSet<String>,
    required_subtype: Option<&str>,
) -> TemplateSet {
    templates
        .iter()
        .filter(|(_, template)| template.shares_category_with(reference))
        .filter(|(_, template)| match required_subtype {
            Some(subtype) => template.subtype.as_deref() == Some(subtype),
            None => true,
        })
        .map(|(name, template)| (name.clone(), template.clone()))
        .collect()
}

/// Category Filter & Selector for one place type.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    place_type: PlaceType,
    reference: BTreeSet<String>,
    required_subtype: Option<String>,
}

impl CategoryFilter {
    /// Create a filter matching templates of `place_type` against `reference`.
    pub fn new<I, S>(place_type: PlaceType, reference: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            place_type,
            reference: reference.into_iter().map(Into::into).collect(),
            required_subtype: None,
        }
    }

    /// Also require an exact sub-type.
    pub fn with_subtype(mut self, subtype: Option<impl Into<String>>) -> Self {
        self.required_subtype = subtype.map(Into::into);
        self
    }

    pub fn reference(&self) -> &BTreeSet<String> {
        &self.reference
    }

    pub fn filter(&self, templates: &TemplateSet) -> TemplateSet {
        filter_by_categories(templates, &self.reference, self.required_subtype.as_deref())
    }

    pub fn select(&self, candidates: &TemplateSet) -> Result<String> {
        self.select_with_rng(candidates, &mut rand::thread_rng())
    }

    /// Pick one candidate uniformly at random.
    pub fn select_with_rng<R: Rng + ?Sized>(
        &self,
        candidates: &TemplateSet,
        rng: &mut R,
    ) -> Result<String> {
        candidates
            .keys()
            .choose(rng)
            .cloned()
            .ok_or_else(|| PlaceError::NoCandidates {
                place_type: self.place_type,
                categories: self.reference.iter().cloned().collect(),
            })
    }

    pub fn filter_and_select(&self, templates: &TemplateSet) -> Result<String> {
        self.filter_and_select_with_rng(templates, &mut rand::thread_rng())
    }

    /// Filter `templates`, then pick one of the survivors.
    pub fn filter_and_select_with_rng<R: Rng + ?Sized>(
        &self,
        templates: &TemplateSet,
        rng: &mut R,
    ) -> Result<String> {
        self.select_with_rng(&self.filter(templates), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use place_rules::Template;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn templates() -> TemplateSet {
        TemplateSet::from([
            ("Thistle Vale".to_string(), Template::new("Heather").with_categories(["forest", "rural"])),
            ("Saltmarsh".to_string(), Template::new("Reeds").with_category("coastal")),
            ("Old Mill".to_string(), Template::new("Grain").with_category("rural").with_subtype("mill")),
            ("Black Pines".to_string(), Template::new("Dark").with_category("forest").with_subtype("camp")),
        ])
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_keeps_intersecting_templates() {
        let filtered = filter_by_categories(&templates(), &set(&["forest"]), None);
        let names: Vec<_> = filtered.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Black Pines", "Thistle Vale"]);
    }

    #[test]
    fn test_filter_is_exactly_the_intersecting_subset() {
        let all = templates();
        let reference = set(&["rural", "coastal"]);
        let filtered = filter_by_categories(&all, &reference, None);

        for (name, template) in &all {
            assert_eq!(
                filtered.contains_key(name),
                template.categories.iter().any(|c| reference.contains(c))
            );
        }
    }

    #[test]
    fn test_filter_with_subtype() {
        let filtered = filter_by_categories(&templates(), &set(&["forest", "rural"]), Some("mill"));
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains_key("Old Mill"));
    }

    #[test]
    fn test_filter_never_fails() {
        assert!(filter_by_categories(&TemplateSet::new(), &set(&["forest"]), None).is_empty());
        assert!(filter_by_categories(&templates(), &set(&["desert"]), None).is_empty());
        assert!(filter_by_categories(&templates(), &BTreeSet::new(), None).is_empty());
    }

    #[test]
    fn test_select_picks_a_candidate() {
        let filter = CategoryFilter::new(PlaceType::Area, ["forest"]);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let name = filter.filter_and_select_with_rng(&templates(), &mut rng).unwrap();
            assert!(name == "Thistle Vale" || name == "Black Pines");
        }
    }

    #[test]
    fn test_select_reaches_every_candidate() {
        let filter = CategoryFilter::new(PlaceType::Area, ["forest", "rural", "coastal"]);
        let mut rng = StdRng::seed_from_u64(11);

        let picked: BTreeSet<String> = (0..200)
            .map(|_| filter.filter_and_select_with_rng(&templates(), &mut rng).unwrap())
            .collect();
        assert_eq!(picked.len(), 4);
    }

    #[test]
    fn test_select_from_nothing() {
        let filter = CategoryFilter::new(PlaceType::Location, ["desert"]).with_subtype(Some("oasis"));
        let err = filter
            .filter_and_select_with_rng(&templates(), &mut StdRng::seed_from_u64(1))
            .unwrap_err();

        assert!(err.is_exhaustion());
        assert!(matches!(
            err,
            PlaceError::NoCandidates { place_type: PlaceType::Location, categories } if categories == vec!["desert"]
        ));
    }

    #[test]
    fn test_thread_rng_forms() {
        let filter = CategoryFilter::new(PlaceType::Area, ["coastal"]);
        assert_eq!(filter.filter_and_select(&templates()).unwrap(), "Saltmarsh");
        assert_eq!(filter.select(&filter.filter(&templates())).unwrap(), "Saltmarsh");
        assert!(filter.select(&TemplateSet::new()).unwrap_err().is_exhaustion());
    }
}
