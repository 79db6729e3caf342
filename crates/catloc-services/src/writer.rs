//! Create/update/delete of a parent-plus-translations aggregate against a
//! store that only offers independent single-table operations.
//!
//! Atomicity is approximated as a small step machine per operation with an
//! explicit compensating action on the create path: Started -> ParentWritten
//! -> ChildrenWritten -> Committed, with ParentWritten -> CompensatingDelete
//! -> Failed as the rollback path. Every failure names the step it happened
//! in so callers can reason about partial state.

use std::fmt;

use catloc_core::ParentId;
use catloc_domain::{Aggregate, ContentKind, StoredAggregate, ValidationError};
use catloc_store::{CatalogStore, StoreError};

/// The store round trip a failed write operation was executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePhase {
    InsertParent,
    InsertTranslations,
    UpdateParent,
    ClearTranslations,
    CountDependents,
    DeleteParent,
}

impl WritePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            WritePhase::InsertParent => "insert-parent",
            WritePhase::InsertTranslations => "insert-translations",
            WritePhase::UpdateParent => "update-parent",
            WritePhase::ClearTranslations => "clear-translations",
            WritePhase::CountDependents => "count-dependents",
            WritePhase::DeleteParent => "delete-parent",
        }
    }
}

impl fmt::Display for WritePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    /// Input defect caught before any write; the store is untouched.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// A store operation failed during `phase`. Earlier phases have already
    /// taken effect; see the operation docs for the partial states.
    #[error("store write failed during {phase}: {source}")]
    Store {
        phase: WritePhase,
        source: StoreError,
    },
    /// The compensating delete itself failed: `parent` now exists with no
    /// translations and needs out-of-band repair.
    #[error(
        "parent `{parent}` is orphaned: translations failed ({cause}) and the \
         compensating delete failed too ({compensation})"
    )]
    Orphaned {
        parent: ParentId,
        cause: StoreError,
        compensation: StoreError,
    },
}

fn during(phase: WritePhase) -> impl FnOnce(StoreError) -> WriteError {
    move |source| WriteError::Store { phase, source }
}

/// Create a parent record plus its translation set as one logical unit.
///
/// Order: (1) insert the parent, obtaining its id; (2) insert one
/// translation per locale, in registry order. If step 2 fails the parent
/// inserted in step 1 is deleted again, so that on success parent and
/// translations exist together and on failure neither exists. The one hole
/// is the compensation itself failing (store unreachable); that surfaces as
/// [`WriteError::Orphaned`] rather than being hidden.
pub fn create_aggregate<K: ContentKind, S: CatalogStore>(
    store: &S,
    aggregate: &Aggregate<K>,
) -> Result<ParentId, WriteError> {
    aggregate.validate()?;
    let id = store
        .insert_parent::<K>(&aggregate.parent)
        .map_err(during(WritePhase::InsertParent))?;
    for (locale, text) in &aggregate.translations {
        if let Err(cause) = store.insert_translation::<K>(&id, *locale, text) {
            return Err(match store.delete_parent::<K>(&id) {
                Ok(()) => WriteError::Store {
                    phase: WritePhase::InsertTranslations,
                    source: cause,
                },
                Err(compensation) => WriteError::Orphaned {
                    parent: id,
                    cause,
                    compensation,
                },
            });
        }
    }
    tracing::debug!(
        event = "aggregate_created",
        kind = %K::KIND,
        id = %id,
        translations = aggregate.translations.len()
    );
    Ok(id)
}

/// Replace a stored aggregate with `aggregate`.
///
/// Order: (1) update the parent fields in place; (2) delete every existing
/// translation; (3) insert the new set. Translation sets change locale
/// membership between edits, so the set is replaced wholesale instead of
/// diffed per locale. That leaves two windows when a later step fails:
/// after (1) the parent is updated while the old translations remain; after
/// (2) the parent briefly has no translations. The failure names its
/// [`WritePhase`] and the same call can simply be retried, since the
/// intended final state derives from the same arguments.
pub fn update_aggregate<K: ContentKind, S: CatalogStore>(
    store: &S,
    id: &ParentId,
    aggregate: &Aggregate<K>,
) -> Result<(), WriteError> {
    aggregate.validate()?;
    store
        .update_parent::<K>(id, &aggregate.parent)
        .map_err(during(WritePhase::UpdateParent))?;
    store
        .delete_translations::<K>(id)
        .map_err(during(WritePhase::ClearTranslations))?;
    for (locale, text) in &aggregate.translations {
        store
            .insert_translation::<K>(id, *locale, text)
            .map_err(during(WritePhase::InsertTranslations))?;
    }
    tracing::debug!(
        event = "aggregate_updated",
        kind = %K::KIND,
        id = %id,
        translations = aggregate.translations.len()
    );
    Ok(())
}

/// Delete a parent record. The store's cascading-delete configuration
/// removes its translations and any dependent child rows; this function
/// only reads the dependent count first so the caller can tell the user
/// what went away with it. Returns that count.
pub fn delete_aggregate<K: ContentKind, S: CatalogStore>(
    store: &S,
    id: &ParentId,
) -> Result<u64, WriteError> {
    let dependents = store
        .count_dependents::<K>(id)
        .map_err(during(WritePhase::CountDependents))?;
    store
        .delete_parent::<K>(id)
        .map_err(during(WritePhase::DeleteParent))?;
    tracing::debug!(event = "aggregate_deleted", kind = %K::KIND, id = %id, dependents);
    Ok(dependents)
}

/// Read one aggregate back. Stable entrypoint for CLI/GUI callers.
pub fn load_aggregate<K: ContentKind, S: CatalogStore>(
    store: &S,
    id: &ParentId,
) -> Result<StoredAggregate<K>, StoreError> {
    store.fetch::<K>(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catloc_core::Locale;
    use catloc_domain::{Card, CardKind, CardText, Category, CategoryKind, CategoryText};
    use catloc_store::MemoryStore;

    fn category() -> Category {
        Category {
            icon: "🎲".into(),
            color: "#FF5733".into(),
            sort_order: 1,
            is_active: true,
            is_premium: false,
        }
    }

    fn card(category: &ParentId) -> Card {
        Card {
            category_id: category.clone(),
            icon: Some("🔥".into()),
            intensity: Some(3),
            is_active: true,
            is_premium: false,
        }
    }

    fn text(content: &str) -> CardText {
        CardText {
            content: content.into(),
            tags: None,
        }
    }

    fn card_aggregate(category: &ParentId) -> Aggregate<CardKind> {
        Aggregate::<CardKind>::new(card(category))
            .with_translation(Locale::Es, text("Imita a un animal"))
            .with_translation(Locale::En, text("Imitate an animal"))
    }

    /// Store wrapper that fails selected operations with an injected error,
    /// delegating everything else to the wrapped [`MemoryStore`].
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
        fail_insert_translation: bool,
        fail_delete_parent: bool,
        fail_delete_translations: bool,
        fail_update_parent: bool,
    }

    fn injected(table: &'static str) -> StoreError {
        StoreError::Rejected {
            table,
            status: 503,
            body: "injected fault".into(),
        }
    }

    impl CatalogStore for FailingStore {
        fn insert_parent<K: ContentKind>(
            &self,
            parent: &K::Parent,
        ) -> Result<ParentId, StoreError> {
            self.inner.insert_parent::<K>(parent)
        }

        fn insert_translation<K: ContentKind>(
            &self,
            parent: &ParentId,
            locale: Locale,
            text: &K::Text,
        ) -> Result<(), StoreError> {
            if self.fail_insert_translation {
                return Err(injected(K::TRANSLATION_TABLE));
            }
            self.inner.insert_translation::<K>(parent, locale, text)
        }

        fn update_parent<K: ContentKind>(
            &self,
            id: &ParentId,
            parent: &K::Parent,
        ) -> Result<(), StoreError> {
            if self.fail_update_parent {
                return Err(injected(K::PARENT_TABLE));
            }
            self.inner.update_parent::<K>(id, parent)
        }

        fn delete_translations<K: ContentKind>(
            &self,
            parent: &ParentId,
        ) -> Result<u64, StoreError> {
            if self.fail_delete_translations {
                return Err(injected(K::TRANSLATION_TABLE));
            }
            self.inner.delete_translations::<K>(parent)
        }

        fn delete_parent<K: ContentKind>(&self, id: &ParentId) -> Result<(), StoreError> {
            if self.fail_delete_parent {
                return Err(injected(K::PARENT_TABLE));
            }
            self.inner.delete_parent::<K>(id)
        }

        fn count_dependents<K: ContentKind>(&self, id: &ParentId) -> Result<u64, StoreError> {
            self.inner.count_dependents::<K>(id)
        }

        fn fetch<K: ContentKind>(&self, id: &ParentId) -> Result<StoredAggregate<K>, StoreError> {
            self.inner.fetch::<K>(id)
        }
    }

    #[test]
    fn create_then_read_returns_exactly_the_given_translations() {
        let store = MemoryStore::new();
        let cat = store.insert_parent::<CategoryKind>(&category()).unwrap();
        let aggregate = card_aggregate(&cat);
        let id = create_aggregate(&store, &aggregate).unwrap();
        let stored = load_aggregate::<CardKind, _>(&store, &id).unwrap();
        assert_eq!(stored.aggregate.parent, aggregate.parent);
        assert_eq!(stored.aggregate.translations, aggregate.translations);
    }

    #[test]
    fn create_with_no_translations_writes_nothing() {
        let store = MemoryStore::new();
        let before = store.table_len("cards");
        let empty = Aggregate::<CardKind>::new(card(&ParentId::new("c1")));
        let err = create_aggregate(&store, &empty).unwrap_err();
        assert!(matches!(
            err,
            WriteError::Invalid(ValidationError::EmptyTranslations)
        ));
        assert_eq!(store.table_len("cards"), before);
        assert_eq!(store.table_len("card_translations"), 0);
    }

    #[test]
    fn failed_translation_insert_compensates_the_parent_away() {
        let store = FailingStore {
            fail_insert_translation: true,
            ..FailingStore::default()
        };
        let err = create_aggregate(&store, &card_aggregate(&ParentId::new("c1"))).unwrap_err();
        assert!(matches!(
            err,
            WriteError::Store {
                phase: WritePhase::InsertTranslations,
                ..
            }
        ));
        assert_eq!(store.inner.table_len("cards"), 0);
        assert_eq!(store.inner.table_len("card_translations"), 0);
    }

    #[test]
    fn failed_compensation_surfaces_the_orphan() {
        let store = FailingStore {
            fail_insert_translation: true,
            fail_delete_parent: true,
            ..FailingStore::default()
        };
        let err = create_aggregate(&store, &card_aggregate(&ParentId::new("c1"))).unwrap_err();
        match err {
            WriteError::Orphaned { parent, .. } => {
                assert_eq!(parent.as_str(), "mem-1");
            }
            other => panic!("expected Orphaned, got {other:?}"),
        }
        // the orphan is really there
        assert_eq!(store.inner.table_len("cards"), 1);
        assert_eq!(store.inner.table_len("card_translations"), 0);
    }

    #[test]
    fn update_replaces_the_whole_translation_set_idempotently() {
        let store = MemoryStore::new();
        let cat = store.insert_parent::<CategoryKind>(&category()).unwrap();
        let id = create_aggregate(&store, &card_aggregate(&cat)).unwrap();

        let replacement = Aggregate::<CardKind>::new(card(&cat))
            .with_translation(Locale::Es, text("Canta una canción"))
            .with_translation(Locale::Pt, text("Canta uma canção"));
        update_aggregate(&store, &id, &replacement).unwrap();
        let first = load_aggregate::<CardKind, _>(&store, &id).unwrap();

        update_aggregate(&store, &id, &replacement).unwrap();
        let second = load_aggregate::<CardKind, _>(&store, &id).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.aggregate.translations, replacement.translations);
        assert!(!second.aggregate.translations.contains_key(&Locale::En));
    }

    #[test]
    fn update_failures_name_their_phase() {
        let store = FailingStore::default();
        let cat = store.inner.insert_parent::<CategoryKind>(&category()).unwrap();
        let id = create_aggregate(&store, &card_aggregate(&cat)).unwrap();

        let store = FailingStore {
            inner: store.inner,
            fail_update_parent: true,
            ..FailingStore::default()
        };
        let err = update_aggregate(&store, &id, &card_aggregate(&cat)).unwrap_err();
        assert!(matches!(
            err,
            WriteError::Store {
                phase: WritePhase::UpdateParent,
                ..
            }
        ));

        let store = FailingStore {
            inner: store.inner,
            fail_delete_translations: true,
            ..FailingStore::default()
        };
        let err = update_aggregate(&store, &id, &card_aggregate(&cat)).unwrap_err();
        assert!(matches!(
            err,
            WriteError::Store {
                phase: WritePhase::ClearTranslations,
                ..
            }
        ));
        // phase 1 already ran: parent updated, old translations still there
        assert_eq!(store.inner.table_len("card_translations"), 2);
    }

    #[test]
    fn delete_reports_the_dependent_children_it_takes_along() {
        let store = MemoryStore::new();
        let cat = store.insert_parent::<CategoryKind>(&category()).unwrap();
        store
            .insert_translation::<CategoryKind>(
                &cat,
                Locale::Es,
                &CategoryText {
                    name: "Retos".into(),
                    description: String::new(),
                },
            )
            .unwrap();
        create_aggregate(&store, &card_aggregate(&cat)).unwrap();
        create_aggregate(&store, &card_aggregate(&cat)).unwrap();

        let removed = delete_aggregate::<CategoryKind, _>(&store, &cat).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.table_len("categories"), 0);
        assert_eq!(store.table_len("cards"), 0);
        assert_eq!(store.table_len("card_translations"), 0);
    }
}
