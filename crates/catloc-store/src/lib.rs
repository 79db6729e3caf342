//! Store capability consumed by the aggregate writer and the CLI.
//!
//! The store is a black box offering independent single-table operations
//! with row-level constraints and cascading deletes configured server-side.
//! No cross-table transaction primitive is available to callers; the writer
//! layers compensation on top of these methods instead.

use catloc_core::{Locale, ParentId};
use catloc_domain::{ContentKind, StoredAggregate};

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store rejected the {table} operation ({status}): {body}")]
    Rejected {
        table: &'static str,
        status: u16,
        body: String,
    },
    #[error("no row with id `{id}` in {table}")]
    NotFound { table: &'static str, id: ParentId },
    #[error("translation for ({parent}, {locale}) already exists")]
    Conflict { parent: ParentId, locale: Locale },
    #[error("malformed response from {table}: {detail}")]
    Malformed { table: &'static str, detail: String },
}

/// Per-table operations of the catalog store.
///
/// One method per round trip. `delete_parent` relies on the store's
/// cascading-delete configuration to remove translation rows and any further
/// child rows; it never issues the cascade itself.
pub trait CatalogStore {
    fn insert_parent<K: ContentKind>(&self, parent: &K::Parent) -> Result<ParentId, StoreError>;

    fn insert_translation<K: ContentKind>(
        &self,
        parent: &ParentId,
        locale: Locale,
        text: &K::Text,
    ) -> Result<(), StoreError>;

    fn update_parent<K: ContentKind>(
        &self,
        id: &ParentId,
        parent: &K::Parent,
    ) -> Result<(), StoreError>;

    /// Delete every translation row of `parent`. Returns the rows removed.
    fn delete_translations<K: ContentKind>(&self, parent: &ParentId) -> Result<u64, StoreError>;

    fn delete_parent<K: ContentKind>(&self, id: &ParentId) -> Result<(), StoreError>;

    /// Number of dependent child rows (`K::CHILD`), for user-facing
    /// reporting only. Kinds without a child table report 0 without a
    /// round trip.
    fn count_dependents<K: ContentKind>(&self, id: &ParentId) -> Result<u64, StoreError>;

    /// Read one parent row joined with its translation rows.
    fn fetch<K: ContentKind>(&self, id: &ParentId) -> Result<StoredAggregate<K>, StoreError>;
}
