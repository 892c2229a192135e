use crate::error::RecipeError;
use crate::recipe::{Ingredient, NewRecipe, Recipe, RecipeId, RecipeSummary};
use crate::store::RecipeStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    pub async fn connect(database_url: &str) -> Result<Self, RecipeError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RecipeError> {
        let migrations = [include_str!("migrations/001_recipes.sql")];

        for (i, sql) in migrations.iter().enumerate() {
            tracing::info!("Running migration {}", i + 1);
            sqlx::raw_sql(sql).execute(&self.pool).await?;
        }

        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn insert(&self, recipe: &NewRecipe) -> Result<RecipeId, RecipeError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO recipes (id, name, ingredients, instructions, cook_time, tags, notes, source_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(&recipe.name)
        .bind(Json(&recipe.ingredients))
        .bind(Json(&recipe.instructions))
        .bind(&recipe.cook_time)
        .bind(&recipe.tags)
        .bind(&recipe.notes)
        .bind(&recipe.source_url)
        .execute(&self.pool)
        .await?;

        Ok(RecipeId(id))
    }

    async fn list(&self) -> Result<Vec<RecipeSummary>, RecipeError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, tags, cook_time
            FROM recipes
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(summary_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RecipeError::from)
    }

    async fn get(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, ingredients, instructions, cook_time, tags, notes, source_url, created_at
            FROM recipes WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(recipe_from_row)
            .transpose()
            .map_err(RecipeError::from)
    }
}

fn summary_from_row(r: &PgRow) -> Result<RecipeSummary, sqlx::Error> {
    Ok(RecipeSummary {
        id: RecipeId(r.try_get::<Uuid, _>("id")?),
        name: r.try_get("name")?,
        tags: r.try_get("tags")?,
        cook_time: r.try_get("cook_time")?,
    })
}

fn recipe_from_row(r: &PgRow) -> Result<Recipe, sqlx::Error> {
    let ingredients: Json<Vec<Ingredient>> = r.try_get("ingredients")?;
    let instructions: Json<Vec<String>> = r.try_get("instructions")?;
    Ok(Recipe {
        id: RecipeId(r.try_get::<Uuid, _>("id")?),
        name: r.try_get("name")?,
        ingredients: ingredients.0,
        instructions: instructions.0,
        cook_time: r.try_get("cook_time")?,
        tags: r.try_get("tags")?,
        notes: r.try_get("notes")?,
        source_url: r.try_get("source_url")?,
        created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
