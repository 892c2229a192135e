//! The fixed extraction prompt and the notes section vocabulary.
//!
//! Keeping the prompt here, rather than inline in the model invoker, means
//! the JSON contract the parser relies on and the section labels the notes
//! renderer recognises are written down in exactly one place, and tests can
//! check them without calling a model.

/// Section labels the model is asked to use inside the `notes` field.
///
/// The renderer treats any line ending in `:` as a header; only the
/// substitutions label changes its state.
pub const NOTES_SECTION_LABELS: [&str; 7] = [
    "What to cook when you don't feel like cooking:",
    "Love your leftovers:",
    "Must have meat:",
    "Cooking for kids:",
    "Gluten-free:",
    "Dairy-free:",
    SUBSTITUTIONS_LABEL,
];

/// The label that switches the notes renderer into list mode.
pub const SUBSTITUTIONS_LABEL: &str = "Substitutions:";

/// Instruction prompt sent with every extraction request.
///
/// The closed schema here is what [`crate::pipeline::parse`] maps onto a
/// recipe row.
pub const EXTRACTION_PROMPT: &str = r#"Extract the recipe and return it as a JSON object. Return ONLY valid JSON with no markdown, no explanation, no code fences.

The JSON must have exactly these fields:
- name: string (recipe name)
- ingredients: array of objects with:
  - item: string (ingredient name)
  - quantity: string (numeric amount, e.g. "1", "1/2", "20") — use "" if none
  - unit: string (e.g. "cup", "pound", "clove") — use "" if none
  - note: string (any parenthetical explanation or tip about this ingredient) — omit if none
- instructions: array of strings — copy each step EXACTLY as written in the source, preserving the author's voice, emphasis, capitalization, and any tips or asides embedded in the steps. Do not summarize, shorten, or rewrite.
- cook_time: string combining cook time and servings if available (e.g. "Under 30 minutes • Serves 4–6") or null
- tags: array of lowercase strings inferred from the recipe (e.g. ["pasta", "vegetarian", "quick"]) — can be empty
- notes: string capturing ALL additional information from the recipe. Format using these section labels exactly where applicable, each on its own line followed by the content:
  "What to cook when you don't feel like cooking:" — any shortcuts or lazy versions
  "Love your leftovers:" — leftover storage and repurposing tips
  "Must have meat:" — meat add-on suggestions
  "Cooking for kids:" — kid-friendly adaptations
  "Gluten-free:" — gluten-free swaps
  "Dairy-free:" — dairy-free swaps
  "Substitutions:" — ingredient substitution notes. Put each ingredient on its own line in the format "Ingredient: description". Do not join them with pipes or put multiple on one line.
  Only include sections that are present in the source. Use null if there is nothing extra."#;

/// Build the single text part used for pasted text and fetched pages.
///
/// `recipe_text` must already be truncated by the caller.
pub fn text_extraction_prompt(recipe_text: &str) -> String {
    format!("{}\n\nRecipe text:\n{}", EXTRACTION_PROMPT, recipe_text)
}
