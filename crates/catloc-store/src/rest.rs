//! REST rendition of the store capability, following the PostgREST-style
//! conventions of the hosted data API: one table per resource,
//! `?col=eq.value` filters, `Prefer` headers for representation and counts.

use catloc_core::{Locale, ParentId};
use catloc_domain::{Aggregate, ContentKind, StoredAggregate};
use serde_json::Value;

use crate::{CatalogStore, StoreError};

pub struct RestStore {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        RestStore {
            base_url: base_url.into(),
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn authed(&self, rb: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.api_key {
            Some(key) => rb
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}")),
            None => rb,
        }
    }
}

fn eq(id: &ParentId) -> String {
    format!("eq.{}", id.as_str())
}

/// Embedded-resource select for the parent-with-translations join read.
fn join_select(translation_table: &str) -> String {
    format!("*,{translation_table}(*)")
}

/// Total from a `Content-Range` header: `0-9/57` or `*/57` -> 57.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

/// Accept both uuid-style string ids and serial numeric ids.
fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn ensure_ok(
    resp: reqwest::blocking::Response,
    table: &'static str,
) -> Result<reqwest::blocking::Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(StoreError::Rejected {
        table,
        status: status.as_u16(),
        body,
    })
}

impl CatalogStore for RestStore {
    fn insert_parent<K: ContentKind>(&self, parent: &K::Parent) -> Result<ParentId, StoreError> {
        let resp = self
            .authed(self.client.post(self.table_url(K::PARENT_TABLE)))
            .header("Prefer", "return=representation")
            .json(parent)
            .send()?;
        let rows: Vec<Value> = ensure_ok(resp, K::PARENT_TABLE)?.json()?;
        let id = rows
            .first()
            .and_then(|row| row.get("id"))
            .and_then(id_value)
            .ok_or_else(|| StoreError::Malformed {
                table: K::PARENT_TABLE,
                detail: "created row carries no id".into(),
            })?;
        tracing::debug!(event = "store_insert_parent", table = K::PARENT_TABLE, id = %id);
        Ok(ParentId::new(id))
    }

    fn insert_translation<K: ContentKind>(
        &self,
        parent: &ParentId,
        locale: Locale,
        text: &K::Text,
    ) -> Result<(), StoreError> {
        let mut row = match serde_json::to_value(text) {
            Ok(Value::Object(map)) => map,
            _ => {
                return Err(StoreError::Malformed {
                    table: K::TRANSLATION_TABLE,
                    detail: "translation did not serialize to an object".into(),
                })
            }
        };
        row.insert(
            K::TRANSLATION_FK.to_string(),
            Value::String(parent.as_str().to_string()),
        );
        row.insert("locale".to_string(), Value::String(locale.code().to_string()));

        let resp = self
            .authed(self.client.post(self.table_url(K::TRANSLATION_TABLE)))
            .json(&row)
            .send()?;
        // The (parent, locale) uniqueness constraint lives in the store.
        if resp.status().as_u16() == 409 {
            return Err(StoreError::Conflict {
                parent: parent.clone(),
                locale,
            });
        }
        ensure_ok(resp, K::TRANSLATION_TABLE)?;
        Ok(())
    }

    fn update_parent<K: ContentKind>(
        &self,
        id: &ParentId,
        parent: &K::Parent,
    ) -> Result<(), StoreError> {
        let resp = self
            .authed(self.client.patch(self.table_url(K::PARENT_TABLE)))
            .query(&[("id", eq(id))])
            .header("Prefer", "return=representation")
            .json(parent)
            .send()?;
        let rows: Vec<Value> = ensure_ok(resp, K::PARENT_TABLE)?.json()?;
        if rows.is_empty() {
            return Err(StoreError::NotFound {
                table: K::PARENT_TABLE,
                id: id.clone(),
            });
        }
        Ok(())
    }

    fn delete_translations<K: ContentKind>(&self, parent: &ParentId) -> Result<u64, StoreError> {
        let resp = self
            .authed(self.client.delete(self.table_url(K::TRANSLATION_TABLE)))
            .query(&[(K::TRANSLATION_FK, eq(parent))])
            .header("Prefer", "return=representation")
            .send()?;
        let rows: Vec<Value> = ensure_ok(resp, K::TRANSLATION_TABLE)?.json()?;
        tracing::debug!(
            event = "store_delete_translations",
            table = K::TRANSLATION_TABLE,
            parent = %parent,
            removed = rows.len()
        );
        Ok(rows.len() as u64)
    }

    fn delete_parent<K: ContentKind>(&self, id: &ParentId) -> Result<(), StoreError> {
        let resp = self
            .authed(self.client.delete(self.table_url(K::PARENT_TABLE)))
            .query(&[("id", eq(id))])
            .send()?;
        ensure_ok(resp, K::PARENT_TABLE)?;
        Ok(())
    }

    fn count_dependents<K: ContentKind>(&self, id: &ParentId) -> Result<u64, StoreError> {
        let Some(child) = K::CHILD else {
            return Ok(0);
        };
        let resp = self
            .authed(self.client.head(self.table_url(child.table)))
            .query(&[(child.fk, eq(id)), ("select", "id".to_string())])
            .header("Prefer", "count=exact")
            .send()?;
        let resp = ensure_ok(resp, child.table)?;
        let range = resp
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        parse_content_range(range).ok_or_else(|| StoreError::Malformed {
            table: child.table,
            detail: format!("unparseable Content-Range: {range:?}"),
        })
    }

    fn fetch<K: ContentKind>(&self, id: &ParentId) -> Result<StoredAggregate<K>, StoreError> {
        let resp = self
            .authed(self.client.get(self.table_url(K::PARENT_TABLE)))
            .query(&[("id", eq(id)), ("select", join_select(K::TRANSLATION_TABLE))])
            .send()?;
        let mut rows: Vec<Value> = ensure_ok(resp, K::PARENT_TABLE)?.json()?;
        if rows.is_empty() {
            return Err(StoreError::NotFound {
                table: K::PARENT_TABLE,
                id: id.clone(),
            });
        }
        let mut row = rows.swap_remove(0);
        let embedded = match row.as_object_mut() {
            Some(map) => map.remove(K::TRANSLATION_TABLE).unwrap_or(Value::Null),
            None => {
                return Err(StoreError::Malformed {
                    table: K::PARENT_TABLE,
                    detail: "row is not an object".into(),
                })
            }
        };
        aggregate_from_rows::<K>(id, row, embedded)
    }
}

/// Assemble a [`StoredAggregate`] from one parent row plus its embedded
/// translation rows. Shared with the in-memory store.
pub(crate) fn aggregate_from_rows<K: ContentKind>(
    id: &ParentId,
    parent_row: Value,
    translation_rows: Value,
) -> Result<StoredAggregate<K>, StoreError> {
    let parent: K::Parent =
        serde_json::from_value(parent_row).map_err(|e| StoreError::Malformed {
            table: K::PARENT_TABLE,
            detail: e.to_string(),
        })?;
    let mut aggregate = Aggregate::<K>::new(parent);
    if let Value::Array(rows) = translation_rows {
        for row in rows {
            let Some(code) = row.get("locale").and_then(Value::as_str) else {
                return Err(StoreError::Malformed {
                    table: K::TRANSLATION_TABLE,
                    detail: "translation row carries no locale".into(),
                });
            };
            let Some(locale) = Locale::from_code(code) else {
                // A locale outside the registry is readable but unusable;
                // skip it rather than fail the whole read.
                tracing::warn!(event = "store_unknown_locale", locale = %code, parent = %id);
                continue;
            };
            let text: K::Text =
                serde_json::from_value(row).map_err(|e| StoreError::Malformed {
                    table: K::TRANSLATION_TABLE,
                    detail: e.to_string(),
                })?;
            aggregate.translations.insert(locale, text);
        }
    }
    Ok(StoredAggregate {
        id: id.clone(),
        aggregate,
    })
}
