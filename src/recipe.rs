//! The recipe data model.
//!
//! A [`Recipe`] is created once, in a single insert, by the import pipeline
//! and is read-only afterwards. `ingredients` and `instructions` keep the
//! order the model returned them in; `created_at` is assigned by storage and
//! orders the catalog listing (newest first).

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque, immutable recipe identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub Uuid);

impl RecipeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecipeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecipeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(RecipeId)
    }
}

/// One ingredient line.
///
/// `quantity` is deliberately a string so forms like `"1/2"` or `"2-3"`
/// survive untouched. `unit` may be empty. Bare JSON numbers are accepted
/// for all three text fields and kept in their JSON spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(deserialize_with = "string_or_number")]
    pub item: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A string, a number (as written) or null (as empty).
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "invalid type: {other}, expected a string or number"
        ))),
    }
}

/// A stored recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    /// Free-form "time • servings" display text.
    pub cook_time: Option<String>,
    pub tags: Vec<String>,
    /// Free text using the notes section labels, see [`crate::notes`].
    pub notes: Option<String>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Listing projection of this recipe.
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            name: self.name.clone(),
            tags: self.tags.clone(),
            cook_time: self.cook_time.clone(),
        }
    }

    /// True if the recipe carries `tag` (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.tags.iter().any(|t| *t == tag)
    }
}

/// The columns shown in the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub tags: Vec<String>,
    pub cook_time: Option<String>,
}

/// A recipe row ready for insertion; storage assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub cook_time: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub source_url: Option<String>,
}

impl NewRecipe {
    /// Materialise the stored form of this row.
    pub fn into_recipe(self, id: RecipeId, created_at: DateTime<Utc>) -> Recipe {
        Recipe {
            id,
            name: self.name,
            ingredients: self.ingredients,
            instructions: self.instructions,
            cook_time: self.cook_time,
            tags: self.tags,
            notes: self.notes,
            source_url: self.source_url,
            created_at,
        }
    }
}

/// Trim, lowercase and de-duplicate tags, keeping first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
