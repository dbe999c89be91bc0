use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Persisted timestamp layout, local time with second precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Equipment category of a record.
///
/// Creation only offers the five named variants; anything else found in the
/// file is kept verbatim as [`Category::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Control panels
    Panel,
    /// Relays
    Relay,
    /// Hand tools
    Tools,
    /// Amplifiers
    Amplifier,
    /// Everything else
    #[default]
    Other,
    /// Value read from storage outside the known set
    Custom(String),
}

impl Category {
    /// Categories a new record may be created with
    pub const CHOICES: [Category; 5] = [
        Category::Panel,
        Category::Relay,
        Category::Tools,
        Category::Amplifier,
        Category::Other,
    ];

    /// Canonical label as written to the file
    pub fn as_str(&self) -> &str {
        match self {
            Category::Panel => "Panel",
            Category::Relay => "Relay",
            Category::Tools => "Tools",
            Category::Amplifier => "Amplifier",
            Category::Other => "Other",
            Category::Custom(label) => label,
        }
    }

    /// Whether this is one of [`Category::CHOICES`]
    pub fn is_canonical(&self) -> bool {
        !matches!(self, Category::Custom(_))
    }

    /// Label exactly as stored: canonical or the legacy Portuguese spelling
    fn stored(label: &str) -> Option<Self> {
        match label {
            "Panel" | "Painel" => Some(Category::Panel),
            "Relay" | "Relé" => Some(Category::Relay),
            "Tools" | "Ferramentas" => Some(Category::Tools),
            "Amplifier" | "Amplificador" => Some(Category::Amplifier),
            "Other" | "Outros" => Some(Category::Other),
            _ => None,
        }
    }

    /// Label typed by a user (canonical or Portuguese, case-insensitive)
    fn known(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "panel" | "painel" => Some(Category::Panel),
            "relay" | "relé" | "rele" => Some(Category::Relay),
            "tools" | "ferramentas" => Some(Category::Tools),
            "amplifier" | "amplificador" => Some(Category::Amplifier),
            "other" | "outros" => Some(Category::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::stored(&label).unwrap_or(Category::Custom(label))
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Custom(label) => label,
            other => other.as_str().to_string(),
        }
    }
}

/// Strict parse used for creation requests: unknown labels are rejected
impl FromStr for Category {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::known(s).ok_or_else(|| {
            StoreError::Validation(format!(
                "unknown category {s:?} (expected one of Panel, Relay, Tools, Amplifier, Other)"
            ))
        })
    }
}

/// One inventory entry. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Identifier carried by the QR code
    #[serde(alias = "codigo")]
    pub code: String,
    /// Display name
    #[serde(alias = "nome")]
    pub name: String,
    /// Free text, empty when not given
    #[serde(alias = "descricao", default)]
    pub description: String,
    /// Equipment category
    #[serde(alias = "categoria", default)]
    pub category: Category,
    /// Units on hand
    #[serde(alias = "quantidade")]
    pub quantity: u32,
    /// Local creation time
    #[serde(alias = "data_cadastro", with = "timestamp")]
    pub created_at: NaiveDateTime,
}

/// Field order of the persisted header
pub const HEADER: [&str; 6] = [
    "code",
    "name",
    "description",
    "category",
    "quantity",
    "created_at",
];

/// Creation request for [`RecordStore::insert`](super::RecordStore::insert)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Identifier, usually a decoded payload
    pub code: String,
    /// Display name (required)
    pub name: String,
    /// Free text
    pub description: String,
    /// Category, `Other` by default
    pub category: Category,
    /// Units, 1 by default
    pub quantity: u32,
}

impl NewRecord {
    /// Request with an empty description, category `Other` and quantity 1
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: String::new(),
            category: Category::Other,
            quantity: 1,
        }
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the category
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the quantity
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Check the record invariants
    pub fn validate(&self) -> StoreResult<()> {
        if self.code.is_empty() {
            return Err(StoreError::Validation("code must not be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("name must not be empty".to_string()));
        }
        if self.quantity == 0 {
            return Err(StoreError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        if !self.category.is_canonical() {
            return Err(StoreError::Validation(format!(
                "category {:?} is not one of the known categories",
                self.category.as_str()
            )));
        }
        Ok(())
    }

    /// Stamp a validated request
    pub(crate) fn into_record(self, created_at: NaiveDateTime) -> InventoryRecord {
        InventoryRecord {
            code: self.code,
            name: self.name,
            description: self.description,
            category: self.category,
            quantity: self.quantity,
            created_at,
        }
    }
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .map_err(|err| de::Error::custom(format!("invalid timestamp {raw:?}: {err}")))
    }
}
