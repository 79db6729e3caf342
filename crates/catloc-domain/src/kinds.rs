//! The closed set of catalog entity kinds. Each kind pairs a language-neutral
//! parent record with a per-locale text record; the marker types carry the
//! table wiring so the store and writer stay fully typed per kind.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use catloc_core::ParentId;

use crate::ValidationError;

/// Runtime tag for an entity kind (CLI arguments, logging, reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Category,
    Card,
    DailyTip,
    DeepTalk,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Card => "card",
            EntityKind::DailyTip => "daily_tip",
            EntityKind::DeepTalk => "deep_talk",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependent child table (beyond the translation table) that the store
/// cascades into on delete. Only used for user-facing delete reporting.
#[derive(Debug, Clone, Copy)]
pub struct ChildRel {
    pub table: &'static str,
    pub fk: &'static str,
}

/// Field-level access to a per-locale text record. The synchronizer fans out
/// over `FIELDS`, the validator checks `MANDATORY`; both only ever see field
/// names listed here.
pub trait LocalizedText:
    Clone + Default + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync
{
    const FIELDS: &'static [&'static str];
    const MANDATORY: &'static [&'static str];

    /// Value of a named field; `None` when the field is unknown or unset.
    fn field(&self, name: &str) -> Option<&str>;

    /// Set a named field. Unknown names are ignored.
    fn set_field(&mut self, name: &str, value: String);

    fn is_complete(&self) -> bool {
        Self::MANDATORY
            .iter()
            .all(|f| !self.field(f).unwrap_or("").trim().is_empty())
    }
}

/// One catalog entity kind: tables, record types, and parent-field checks.
pub trait ContentKind {
    const KIND: EntityKind;
    const PARENT_TABLE: &'static str;
    const TRANSLATION_TABLE: &'static str;
    /// Column in the translation table referencing the parent row.
    const TRANSLATION_FK: &'static str;
    const CHILD: Option<ChildRel>;

    type Parent: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;
    type Text: LocalizedText;

    fn validate_parent(parent: &Self::Parent) -> Result<(), ValidationError>;
}

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap()
});

fn check_color(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if HEX_COLOR.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Malformed {
            field,
            value: value.to_string(),
        })
    }
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

// --- Category: a game mode grouping cards ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    /// Emoji token shown next to the category name.
    pub icon: String,
    /// Accent color as `#RRGGBB`.
    pub color: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub is_premium: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryText {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl LocalizedText for CategoryText {
    const FIELDS: &'static [&'static str] = &["name", "description"];
    const MANDATORY: &'static [&'static str] = &["name"];

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(&self.name),
            "description" => Some(&self.description),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value,
            "description" => self.description = value,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryKind;

impl ContentKind for CategoryKind {
    const KIND: EntityKind = EntityKind::Category;
    const PARENT_TABLE: &'static str = "categories";
    const TRANSLATION_TABLE: &'static str = "category_translations";
    const TRANSLATION_FK: &'static str = "category_id";
    const CHILD: Option<ChildRel> = Some(ChildRel {
        table: "cards",
        fk: "category_id",
    });

    type Parent = Category;
    type Text = CategoryText;

    fn validate_parent(parent: &Category) -> Result<(), ValidationError> {
        check_color("color", &parent.color)
    }
}

// --- Card: one piece of playable content inside a category ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Card {
    pub category_id: ParentId,
    #[serde(default)]
    pub icon: Option<String>,
    /// Spiciness level 1..=5; unset means the category default applies.
    #[serde(default)]
    pub intensity: Option<i32>,
    pub is_active: bool,
    pub is_premium: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CardText {
    pub content: String,
    /// Free-text comma-separated tags for in-app search.
    #[serde(default)]
    pub tags: Option<String>,
}

impl LocalizedText for CardText {
    const FIELDS: &'static [&'static str] = &["content", "tags"];
    const MANDATORY: &'static [&'static str] = &["content"];

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "content" => Some(&self.content),
            "tags" => self.tags.as_deref(),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: String) {
        match name {
            "content" => self.content = value,
            "tags" => self.tags = Some(value),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardKind;

impl ContentKind for CardKind {
    const KIND: EntityKind = EntityKind::Card;
    const PARENT_TABLE: &'static str = "cards";
    const TRANSLATION_TABLE: &'static str = "card_translations";
    const TRANSLATION_FK: &'static str = "card_id";
    const CHILD: Option<ChildRel> = None;

    type Parent = Card;
    type Text = CardText;

    fn validate_parent(parent: &Card) -> Result<(), ValidationError> {
        if parent.category_id.as_str().trim().is_empty() {
            return Err(ValidationError::Malformed {
                field: "category_id",
                value: String::new(),
            });
        }
        if let Some(intensity) = parent.intensity {
            check_range("intensity", intensity.into(), 1, 5)?;
        }
        Ok(())
    }
}

// --- DailyTip: one short advice entry shown once a day ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyTip {
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyTipText {
    pub title: String,
    pub body: String,
}

impl LocalizedText for DailyTipText {
    const FIELDS: &'static [&'static str] = &["title", "body"];
    const MANDATORY: &'static [&'static str] = &["title", "body"];

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "body" => Some(&self.body),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = value,
            "body" => self.body = value,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTipKind;

impl ContentKind for DailyTipKind {
    const KIND: EntityKind = EntityKind::DailyTip;
    const PARENT_TABLE: &'static str = "daily_tips";
    const TRANSLATION_TABLE: &'static str = "daily_tip_translations";
    const TRANSLATION_FK: &'static str = "daily_tip_id";
    const CHILD: Option<ChildRel> = None;

    type Parent = DailyTip;
    type Text = DailyTipText;

    fn validate_parent(_parent: &DailyTip) -> Result<(), ValidationError> {
        Ok(())
    }
}

// --- DeepTalk: a conversation prompt with an optional follow-up ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeepTalk {
    /// Conversation depth 1..=3 (icebreaker to intimate).
    pub depth: i32,
    pub is_active: bool,
    pub is_premium: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeepTalkText {
    pub prompt: String,
    #[serde(default)]
    pub follow_up: Option<String>,
}

impl LocalizedText for DeepTalkText {
    const FIELDS: &'static [&'static str] = &["prompt", "follow_up"];
    const MANDATORY: &'static [&'static str] = &["prompt"];

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "prompt" => Some(&self.prompt),
            "follow_up" => self.follow_up.as_deref(),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: String) {
        match name {
            "prompt" => self.prompt = value,
            "follow_up" => self.follow_up = Some(value),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeepTalkKind;

impl ContentKind for DeepTalkKind {
    const KIND: EntityKind = EntityKind::DeepTalk;
    const PARENT_TABLE: &'static str = "deep_talks";
    const TRANSLATION_TABLE: &'static str = "deep_talk_translations";
    const TRANSLATION_FK: &'static str = "deep_talk_id";
    const CHILD: Option<ChildRel> = None;

    type Parent = DeepTalk;
    type Text = DeepTalkText;

    fn validate_parent(parent: &DeepTalk) -> Result<(), ValidationError> {
        check_range("depth", parent.depth.into(), 1, 3)
    }
}
