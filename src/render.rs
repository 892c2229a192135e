//! Markdown rendering of stored recipes.
//!
//! Used by `GET /api/recipes/:id/markdown` and by `recipebox show`.

use crate::notes;
use crate::recipe::{Ingredient, Recipe, RecipeSummary};

/// `quantity unit item (note)`, skipping empty parts.
pub fn format_ingredient(ingredient: &Ingredient) -> String {
    let mut line = [
        ingredient.quantity.trim(),
        ingredient.unit.trim(),
        ingredient.item.trim(),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ");

    if let Some(note) = ingredient.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        line.push_str(&format!(" ({note})"));
    }
    line
}

/// Render one recipe as a markdown document.
pub fn render_recipe(recipe: &Recipe) -> String {
    let mut out = format!("# {}\n", recipe.name.trim());

    let mut meta = Vec::new();
    if let Some(cook_time) = recipe.cook_time.as_deref().filter(|c| !c.trim().is_empty()) {
        meta.push(format!("**Cook time:** {}", cook_time.trim()));
    }
    if !recipe.tags.is_empty() {
        meta.push(format!("**Tags:** {}", recipe.tags.join(", ")));
    }
    if !meta.is_empty() {
        out.push('\n');
        out.push_str(&meta.join("  \n"));
        out.push('\n');
    }

    out.push_str("\n## Ingredients\n\n");
    for ingredient in &recipe.ingredients {
        out.push_str("- ");
        out.push_str(&format_ingredient(ingredient));
        out.push('\n');
    }

    out.push_str("\n## Instructions\n\n");
    for (i, step) in recipe.instructions.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, step.trim()));
    }

    if let Some(text) = recipe.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        out.push_str("\n## Notes\n\n");
        out.push_str(notes::render_notes(text).trim_end());
        out.push('\n');
    }

    if let Some(url) = recipe.source_url.as_deref() {
        out.push_str(&format!("\n---\nSource: <{url}>\n"));
    }

    out
}

/// One line per recipe: `id  name  [cook time]  #tag #tag`.
pub fn render_listing(recipes: &[RecipeSummary]) -> String {
    recipes
        .iter()
        .map(|r| {
            let mut line = format!("{}  {}", r.id, r.name);
            if let Some(ref cook_time) = r.cook_time {
                line.push_str(&format!("  [{cook_time}]"));
            }
            if !r.tags.is_empty() {
                let tags: Vec<String> = r.tags.iter().map(|t| format!("#{t}")).collect();
                line.push_str("  ");
                line.push_str(&tags.join(" "));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
