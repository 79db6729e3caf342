use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Workspace-wide result alias.
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Supported catalog locales, in registry order.
///
/// The order here is the order every consumer sees (`registry()`, iteration
/// over translation sets, generated file columns). `Es` is the designated
/// source locale: content is authored in Spanish first and machine-translated
/// outward from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Es,
    En,
    Pt,
    Fr,
    De,
    It,
}

/// Registry metadata for one locale.
#[derive(Debug, Clone, Copy)]
pub struct LocaleMeta {
    pub locale: Locale,
    /// Published content must carry at least one required locale.
    pub is_required: bool,
    /// The source locale used for machine translation.
    pub is_default: bool,
}

const REGISTRY: &[LocaleMeta] = &[
    LocaleMeta { locale: Locale::Es, is_required: true, is_default: true },
    LocaleMeta { locale: Locale::En, is_required: true, is_default: false },
    LocaleMeta { locale: Locale::Pt, is_required: false, is_default: false },
    LocaleMeta { locale: Locale::Fr, is_required: false, is_default: false },
    LocaleMeta { locale: Locale::De, is_required: false, is_default: false },
    LocaleMeta { locale: Locale::It, is_required: false, is_default: false },
];

impl Locale {
    /// Ordered sequence of supported locales with metadata. Pure and static.
    pub fn registry() -> &'static [LocaleMeta] {
        REGISTRY
    }

    /// All supported locales, in registry order.
    pub fn all() -> impl Iterator<Item = Locale> {
        REGISTRY.iter().map(|m| m.locale)
    }

    /// Locales whose presence is mandatory for published content.
    pub fn required() -> impl Iterator<Item = Locale> {
        REGISTRY.iter().filter(|m| m.is_required).map(|m| m.locale)
    }

    /// The designated source locale (always required).
    pub fn default_locale() -> Locale {
        REGISTRY
            .iter()
            .find(|m| m.is_default)
            .map(|m| m.locale)
            .unwrap_or(Locale::Es)
    }

    /// Case-insensitive lookup by short code ("es", "EN", ...).
    pub fn from_code(code: &str) -> Option<Locale> {
        let code = code.trim();
        Self::all().find(|l| l.code().eq_ignore_ascii_case(code))
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
            Locale::Pt => "pt",
            Locale::Fr => "fr",
            Locale::De => "de",
            Locale::It => "it",
        }
    }

    /// Human-readable name, in the language itself.
    pub fn name(self) -> &'static str {
        match self {
            Locale::Es => "Español",
            Locale::En => "English",
            Locale::Pt => "Português",
            Locale::Fr => "Français",
            Locale::De => "Deutsch",
            Locale::It => "Italiano",
        }
    }

    pub fn is_required(self) -> bool {
        REGISTRY
            .iter()
            .find(|m| m.locale == self)
            .map(|m| m.is_required)
            .unwrap_or(false)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Opaque row identity assigned by the store on insert.
///
/// The production store mints uuid-ish strings; the in-memory store mints
/// `mem-N`. Nothing in this workspace inspects the contents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ParentId(pub String);

impl ParentId {
    pub fn new(id: impl Into<String>) -> Self {
        ParentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParentId {
    fn from(s: &str) -> Self {
        ParentId(s.to_string())
    }
}
