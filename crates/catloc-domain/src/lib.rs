//! Aggregate model for the CatLoc catalog: entity kinds, their per-locale
//! translation texts, validation invariants, and the report DTOs shared with
//! frontends (CLI, admin panel, mobile app).

use std::collections::BTreeMap;

use thiserror::Error;

pub use catloc_core::{Locale, ParentId};

mod kinds;
mod reports;

pub use kinds::{
    Card, CardKind, CardText, Category, CategoryKind, CategoryText, ChildRel, ContentKind,
    DailyTip, DailyTipKind, DailyTipText, DeepTalk, DeepTalkKind, DeepTalkText, EntityKind,
    LocalizedText,
};
pub use reports::{ImportFailure, ImportOutcome, ImportPlan, SCHEMA_VERSION};

/// Caller-correctable input defect. Always raised before any write happens,
/// so it carries zero side effects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("aggregate has no translations")]
    EmptyTranslations,
    #[error("mandatory field `{field}` is blank for locale `{locale}`")]
    BlankMandatoryField { locale: Locale, field: &'static str },
    #[error("no translation in any required locale")]
    MissingRequiredLocale,
    #[error("field `{field}` is out of range: {value} not in {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("malformed value for `{field}`: {value:?}")]
    Malformed { field: &'static str, value: String },
}

/// A parent record plus its complete per-locale translation set: the unit of
/// business-level atomicity. The map is ordered by locale registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate<K: ContentKind> {
    pub parent: K::Parent,
    pub translations: BTreeMap<Locale, K::Text>,
}

impl<K: ContentKind> Aggregate<K> {
    pub fn new(parent: K::Parent) -> Self {
        Aggregate {
            parent,
            translations: BTreeMap::new(),
        }
    }

    /// Builder-style convenience used by the importer and tests.
    pub fn with_translation(mut self, locale: Locale, text: K::Text) -> Self {
        self.translations.insert(locale, text);
        self
    }

    /// Check every invariant the writer relies on before touching the store:
    /// kind-specific parent fields, a non-empty translation set, mandatory
    /// text fields per present locale, and at least one required locale.
    pub fn validate(&self) -> Result<(), ValidationError> {
        K::validate_parent(&self.parent)?;
        if self.translations.is_empty() {
            return Err(ValidationError::EmptyTranslations);
        }
        for (locale, text) in &self.translations {
            for field in K::Text::MANDATORY {
                if text.field(field).unwrap_or("").trim().is_empty() {
                    return Err(ValidationError::BlankMandatoryField {
                        locale: *locale,
                        field,
                    });
                }
            }
        }
        if !self.translations.keys().any(|l| l.is_required()) {
            return Err(ValidationError::MissingRequiredLocale);
        }
        Ok(())
    }

    /// Locales from the registry that have no translation yet, in order.
    pub fn missing_locales(&self) -> Vec<Locale> {
        Locale::all()
            .filter(|l| !self.translations.contains_key(l))
            .collect()
    }
}

/// An aggregate as read back from the store, together with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAggregate<K: ContentKind> {
    pub id: ParentId,
    pub aggregate: Aggregate<K>,
}
