//! Identifier Allocator - monotonic per-class counters.

use place_rules::{EntityClass, PlaythroughMetadata};
use tracing::debug;

use super::metadata::MetadataStore;
use crate::context::PlaythroughContext;
use crate::error::{PlaceError, Result};

/// Hands out identifiers from the counters in the playthrough metadata.
///
/// [`next_identifier`](Self::next_identifier) and [`commit`](Self::commit)
/// form one logical step; callers that don't already hold the write gate use
/// [`allocate`](Self::allocate).
#[derive(Debug, Clone)]
pub struct IdentifierAllocator {
    ctx: PlaythroughContext,
    metadata: MetadataStore,
}

impl IdentifierAllocator {
    pub fn new(ctx: &PlaythroughContext) -> Self {
        Self {
            ctx: ctx.clone(),
            metadata: MetadataStore::new(ctx),
        }
    }

    fn current(metadata: &PlaythroughMetadata, class: EntityClass) -> Result<u64> {
        let value = metadata
            .last_identifier(class)
            .ok_or(PlaceError::MissingCounter(class))?;

        value.trim().parse().map_err(|_| PlaceError::CorruptCounter {
            class,
            value: value.to_string(),
        })
    }

    /// The identifier that would be handed out next. Doesn't persist anything.
    pub fn next_identifier(&self, class: EntityClass) -> Result<u64> {
        let metadata = self.metadata.load()?;
        Ok(Self::current(&metadata, class)? + 1)
    }

    /// Persist `value` as the last identifier handed out for `class`.
    pub fn commit(&self, class: EntityClass, value: u64) -> Result<()> {
        let mut metadata = self.metadata.load()?;
        let current = Self::current(&metadata, class)?;

        if value <= current {
            return Err(PlaceError::NonMonotonicCounter {
                class,
                current,
                requested: value,
            });
        }

        metadata.set_last_identifier(class, value);
        self.metadata.save(&metadata)?;

        debug!(%class, value, "Committed identifier");
        Ok(())
    }

    /// Produce the next identifier and persist it before returning it.
    pub fn allocate(&self, class: EntityClass) -> Result<u64> {
        let _gate = self.ctx.lock_writes();
        let value = self.next_identifier(class)?;
        self.commit(class, value)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use std::collections::HashSet;

    #[test]
    fn test_allocation_is_monotonic() {
        let fixture = Fixture::new().with_playthrough();
        let allocator = IdentifierAllocator::new(&fixture.ctx);

        let mut seen = HashSet::new();
        let mut last = 0;
        for _ in 0..20 {
            let id = allocator.allocate(EntityClass::Places).unwrap();
            assert!(id > last);
            assert!(seen.insert(id));
            last = id;
        }
        assert_eq!(last, 20);
    }

    #[test]
    fn test_classes_are_independent() {
        let fixture = Fixture::new().with_playthrough();
        let allocator = IdentifierAllocator::new(&fixture.ctx);

        allocator.allocate(EntityClass::Places).unwrap();
        allocator.allocate(EntityClass::Places).unwrap();

        assert_eq!(allocator.allocate(EntityClass::Characters).unwrap(), 1);
        assert_eq!(allocator.next_identifier(EntityClass::Places).unwrap(), 3);
    }

    #[test]
    fn test_next_identifier_does_not_persist() {
        let fixture = Fixture::new().with_playthrough();
        let allocator = IdentifierAllocator::new(&fixture.ctx);

        assert_eq!(allocator.next_identifier(EntityClass::Places).unwrap(), 1);
        assert_eq!(allocator.next_identifier(EntityClass::Places).unwrap(), 1);
    }

    #[test]
    fn test_commit_rejects_reuse() {
        let fixture = Fixture::new().with_playthrough();
        let allocator = IdentifierAllocator::new(&fixture.ctx);

        allocator.commit(EntityClass::Places, 5).unwrap();
        let err = allocator.commit(EntityClass::Places, 5).unwrap_err();
        assert!(matches!(
            err,
            PlaceError::NonMonotonicCounter { current: 5, requested: 5, .. }
        ));
    }

    #[test]
    fn test_missing_counter() {
        let fixture = Fixture::new().with_playthrough();
        let store = MetadataStore::new(&fixture.ctx);
        let mut metadata = store.load().unwrap();
        metadata.last_identifiers.remove("characters");
        store.save(&metadata).unwrap();

        let allocator = IdentifierAllocator::new(&fixture.ctx);
        let err = allocator.next_identifier(EntityClass::Characters).unwrap_err();
        assert!(matches!(err, PlaceError::MissingCounter(EntityClass::Characters)));
    }

    #[test]
    fn test_missing_metadata_is_a_storage_error() {
        let fixture = Fixture::new();
        let allocator = IdentifierAllocator::new(&fixture.ctx);

        let err = allocator.next_identifier(EntityClass::Places).unwrap_err();
        assert!(matches!(err, PlaceError::StorageUnavailable { .. }));
    }
}
