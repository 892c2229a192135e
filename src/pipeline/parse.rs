//! Response parsing: model text → JSON → recipe row.
//!
//! The prompt asks for bare JSON, but models sometimes wrap it in a
//! ```` ```json ```` fence anyway. We strip one leading and one trailing fence
//! marker, trim, and parse. Only JSON syntax is checked at this stage: a
//! syntactically valid object with the wrong shape is rejected later, when it
//! is mapped onto a storage row, and reported as a storage error.

use crate::error::RecipeError;
use crate::recipe::{normalize_tags, Ingredient, NewRecipe};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

static RE_LEADING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^```(?:json)?\s*").unwrap());
static RE_TRAILING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*```$").unwrap());

/// Remove a leading ```` ``` ```` / ```` ```json ```` marker and a trailing
/// ```` ``` ```` marker, if present, and trim.
pub fn strip_code_fences(raw: &str) -> String {
    let s = RE_LEADING_FENCE.replace(raw.trim(), "");
    let s = RE_TRAILING_FENCE.replace(&s, "");
    s.trim().to_string()
}

/// Parse raw model output as JSON.
pub fn parse_model_output(raw: &str) -> Result<Value, RecipeError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(&cleaned).map_err(|e| RecipeError::ExtractionParse {
        detail: e.to_string(),
    })
}

/// The object shape the prompt asks for.
#[derive(Debug, Deserialize)]
struct ExtractedRecipe {
    name: String,
    ingredients: Vec<Ingredient>,
    instructions: Vec<String>,
    #[serde(default)]
    cook_time: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    notes: Option<String>,
}

/// Map a parsed extraction onto a recipe row.
///
/// Missing `cook_time`/`notes` become null and missing `tags` an empty list.
/// Any other shape mismatch is a [`RecipeError::Storage`], the same failure
/// class a column-type violation on insert would produce.
pub fn recipe_from_value(value: Value, source_url: Option<String>) -> Result<NewRecipe, RecipeError> {
    let extracted: ExtractedRecipe =
        serde_json::from_value(value).map_err(|e| RecipeError::Storage {
            message: format!("recipe row rejected: {e}"),
        })?;

    Ok(NewRecipe {
        name: extracted.name,
        ingredients: extracted.ingredients,
        instructions: extracted.instructions,
        cook_time: extracted.cook_time,
        tags: normalize_tags(extracted.tags.unwrap_or_default()),
        notes: extracted.notes.filter(|n| !n.trim().is_empty()),
        source_url,
    })
}
