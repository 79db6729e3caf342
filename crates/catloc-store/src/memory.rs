//! In-memory store double. Holds rows as JSON objects keyed by table name
//! and emulates exactly the constraints the real store is configured with:
//! (parent, locale) uniqueness in translation tables and cascading deletes.
//! Nothing else is enforced; in particular foreign keys are not checked.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use catloc_core::{Locale, ParentId};
use catloc_domain::{ContentKind, StoredAggregate};
use serde_json::Value;

use crate::rest::aggregate_from_rows;
use crate::{CatalogStore, StoreError};

struct TransRow {
    parent: String,
    locale: Locale,
    row: Value,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    parents: HashMap<&'static str, BTreeMap<String, Value>>,
    translations: HashMap<&'static str, Vec<TransRow>>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Row count of a named table (parent or translation). Tests use this
    /// to assert "store unchanged" around rejected operations.
    pub fn table_len(&self, table: &str) -> usize {
        let inner = self.lock();
        inner.parents.get(table).map_or(0, BTreeMap::len)
            + inner.translations.get(table).map_or(0, Vec::len)
    }
}

fn to_object(
    value: Result<Value, serde_json::Error>,
    table: &'static str,
) -> Result<serde_json::Map<String, Value>, StoreError> {
    match value {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(StoreError::Malformed {
            table,
            detail: "row did not serialize to an object".into(),
        }),
    }
}

impl CatalogStore for MemoryStore {
    fn insert_parent<K: ContentKind>(&self, parent: &K::Parent) -> Result<ParentId, StoreError> {
        let row = Value::Object(to_object(serde_json::to_value(parent), K::PARENT_TABLE)?);
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = format!("mem-{}", inner.next_id);
        inner
            .parents
            .entry(K::PARENT_TABLE)
            .or_default()
            .insert(id.clone(), row);
        Ok(ParentId::new(id))
    }

    fn insert_translation<K: ContentKind>(
        &self,
        parent: &ParentId,
        locale: Locale,
        text: &K::Text,
    ) -> Result<(), StoreError> {
        let mut row = to_object(serde_json::to_value(text), K::TRANSLATION_TABLE)?;
        row.insert(
            K::TRANSLATION_FK.to_string(),
            Value::String(parent.as_str().to_string()),
        );
        row.insert("locale".to_string(), Value::String(locale.code().to_string()));

        let mut inner = self.lock();
        let rows = inner.translations.entry(K::TRANSLATION_TABLE).or_default();
        if rows
            .iter()
            .any(|r| r.parent == parent.as_str() && r.locale == locale)
        {
            return Err(StoreError::Conflict {
                parent: parent.clone(),
                locale,
            });
        }
        rows.push(TransRow {
            parent: parent.as_str().to_string(),
            locale,
            row: Value::Object(row),
        });
        Ok(())
    }

    fn update_parent<K: ContentKind>(
        &self,
        id: &ParentId,
        parent: &K::Parent,
    ) -> Result<(), StoreError> {
        let row = Value::Object(to_object(serde_json::to_value(parent), K::PARENT_TABLE)?);
        let mut inner = self.lock();
        let table = inner.parents.entry(K::PARENT_TABLE).or_default();
        match table.get_mut(id.as_str()) {
            Some(slot) => {
                *slot = row;
                Ok(())
            }
            None => Err(StoreError::NotFound {
                table: K::PARENT_TABLE,
                id: id.clone(),
            }),
        }
    }

    fn delete_translations<K: ContentKind>(&self, parent: &ParentId) -> Result<u64, StoreError> {
        let mut inner = self.lock();
        let rows = inner.translations.entry(K::TRANSLATION_TABLE).or_default();
        let before = rows.len();
        rows.retain(|r| r.parent != parent.as_str());
        Ok((before - rows.len()) as u64)
    }

    fn delete_parent<K: ContentKind>(&self, id: &ParentId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner
            .parents
            .entry(K::PARENT_TABLE)
            .or_default()
            .remove(id.as_str());
        if let Some(rows) = inner.translations.get_mut(K::TRANSLATION_TABLE) {
            rows.retain(|r| r.parent != id.as_str());
        }
        // Cascade into the dependent child table and its translations, the
        // way the real store is configured.
        if let Some(child) = K::CHILD {
            let mut doomed: Vec<String> = Vec::new();
            if let Some(children) = inner.parents.get_mut(child.table) {
                doomed = children
                    .iter()
                    .filter(|(_, row)| {
                        row.get(child.fk).and_then(Value::as_str) == Some(id.as_str())
                    })
                    .map(|(child_id, _)| child_id.clone())
                    .collect();
                for child_id in &doomed {
                    children.remove(child_id);
                }
            }
            if !doomed.is_empty() {
                // Ids are store-unique, so matching on parent id alone is safe.
                for rows in inner.translations.values_mut() {
                    rows.retain(|r| !doomed.contains(&r.parent));
                }
            }
        }
        Ok(())
    }

    fn count_dependents<K: ContentKind>(&self, id: &ParentId) -> Result<u64, StoreError> {
        let Some(child) = K::CHILD else {
            return Ok(0);
        };
        let inner = self.lock();
        let count = inner.parents.get(child.table).map_or(0, |children| {
            children
                .values()
                .filter(|row| row.get(child.fk).and_then(Value::as_str) == Some(id.as_str()))
                .count()
        });
        Ok(count as u64)
    }

    fn fetch<K: ContentKind>(&self, id: &ParentId) -> Result<StoredAggregate<K>, StoreError> {
        let inner = self.lock();
        let parent_row = inner
            .parents
            .get(K::PARENT_TABLE)
            .and_then(|table| table.get(id.as_str()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                table: K::PARENT_TABLE,
                id: id.clone(),
            })?;
        let translation_rows: Vec<Value> = inner
            .translations
            .get(K::TRANSLATION_TABLE)
            .map_or_else(Vec::new, |rows| {
                rows.iter()
                    .filter(|r| r.parent == id.as_str())
                    .map(|r| r.row.clone())
                    .collect()
            });
        drop(inner);
        aggregate_from_rows::<K>(id, parent_row, Value::Array(translation_rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catloc_domain::{Card, CardKind, CardText, Category, CategoryKind, CategoryText};

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
            icon: None,
            intensity: Some(2),
            is_active: true,
            is_premium: false,
        }
    }

    fn name(n: &str) -> CategoryText {
        CategoryText {
            name: n.into(),
            description: String::new(),
        }
    }

    #[test]
    fn ids_are_minted_in_sequence() {
        let store = MemoryStore::new();
        let a = store.insert_parent::<CategoryKind>(&category()).unwrap();
        let b = store.insert_parent::<CategoryKind>(&category()).unwrap();
        assert_eq!(a.as_str(), "mem-1");
        assert_eq!(b.as_str(), "mem-2");
    }

    #[test]
    fn duplicate_locale_for_same_parent_conflicts() {
        let store = MemoryStore::new();
        let id = store.insert_parent::<CategoryKind>(&category()).unwrap();
        store
            .insert_translation::<CategoryKind>(&id, Locale::Es, &name("Retos"))
            .unwrap();
        let err = store
            .insert_translation::<CategoryKind>(&id, Locale::Es, &name("Otra vez"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { locale: Locale::Es, .. }));
        assert_eq!(store.table_len("category_translations"), 1);
    }

    #[test]
    fn fetch_returns_parent_and_translation_set() {
        let store = MemoryStore::new();
        let id = store.insert_parent::<CategoryKind>(&category()).unwrap();
        store
            .insert_translation::<CategoryKind>(&id, Locale::Es, &name("Retos"))
            .unwrap();
        store
            .insert_translation::<CategoryKind>(&id, Locale::En, &name("Dares"))
            .unwrap();
        let stored = store.fetch::<CategoryKind>(&id).unwrap();
        assert_eq!(stored.aggregate.parent, category());
        assert_eq!(stored.aggregate.translations.len(), 2);
        assert_eq!(stored.aggregate.translations[&Locale::Es].name, "Retos");
    }

    #[test]
    fn update_of_missing_parent_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_parent::<CategoryKind>(&ParentId::new("mem-9"), &category())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn delete_cascades_to_translations_children_and_their_translations() {
        let store = MemoryStore::new();
        let cat = store.insert_parent::<CategoryKind>(&category()).unwrap();
        store
            .insert_translation::<CategoryKind>(&cat, Locale::Es, &name("Retos"))
            .unwrap();
        let c = store.insert_parent::<CardKind>(&card(&cat)).unwrap();
        store
            .insert_translation::<CardKind>(
                &c,
                Locale::Es,
                &CardText {
                    content: "Haz 10 sentadillas".into(),
                    tags: None,
                },
            )
            .unwrap();

        assert_eq!(store.count_dependents::<CategoryKind>(&cat).unwrap(), 1);
        assert_eq!(store.count_dependents::<CardKind>(&c).unwrap(), 0);

        store.delete_parent::<CategoryKind>(&cat).unwrap();
        assert_eq!(store.table_len("categories"), 0);
        assert_eq!(store.table_len("category_translations"), 0);
        assert_eq!(store.table_len("cards"), 0);
        assert_eq!(store.table_len("card_translations"), 0);
    }

    #[test]
    fn delete_translations_reports_removed_rows() {
        let store = MemoryStore::new();
        let id = store.insert_parent::<CategoryKind>(&category()).unwrap();
        store
            .insert_translation::<CategoryKind>(&id, Locale::Es, &name("Retos"))
            .unwrap();
        store
            .insert_translation::<CategoryKind>(&id, Locale::En, &name("Dares"))
            .unwrap();
        assert_eq!(store.delete_translations::<CategoryKind>(&id).unwrap(), 2);
        assert_eq!(store.delete_translations::<CategoryKind>(&id).unwrap(), 0);
    }
}
