//! Recipe storage.
//!
//! The catalog needs exactly three operations from its store: insert one
//! row and get its id back, list rows newest first, and fetch one row by
//! id. [`RecipeStore`] names those three; [`postgres::PgRecipeStore`] is the
//! production implementation and [`memory::MemoryStore`] backs tests and
//! `recipebox serve --in-memory`.

pub mod memory;
pub mod postgres;

use crate::error::RecipeError;
use crate::recipe::{NewRecipe, Recipe, RecipeId, RecipeSummary};
use async_trait::async_trait;

pub use memory::MemoryStore;
pub use postgres::PgRecipeStore;

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Insert one complete recipe row and return its id.
    async fn insert(&self, recipe: &NewRecipe) -> Result<RecipeId, RecipeError>;

    /// All recipes, newest first.
    async fn list(&self) -> Result<Vec<RecipeSummary>, RecipeError>;

    /// One recipe by id.
    async fn get(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeError>;
}
