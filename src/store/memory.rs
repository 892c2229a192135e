use crate::error::RecipeError;
use crate::recipe::{NewRecipe, Recipe, RecipeId, RecipeSummary};
use crate::store::RecipeStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

/// Process-local store. Rows live in insertion order, which is also
/// `created_at` order, so listing is a reverse walk.
#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<Vec<Recipe>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored recipes.
    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Recipe>>, RecipeError> {
        self.rows.lock().map_err(|_| RecipeError::Storage {
            message: "memory store lock poisoned".into(),
        })
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn insert(&self, recipe: &NewRecipe) -> Result<RecipeId, RecipeError> {
        let mut rows = self.lock()?;
        let id = RecipeId::new();
        // Keep created_at strictly increasing even if the clock repeats.
        let mut created_at = Utc::now();
        if let Some(last) = rows.last() {
            if created_at <= last.created_at {
                created_at = last.created_at + chrono::Duration::microseconds(1);
            }
        }
        rows.push(recipe.clone().into_recipe(id, created_at));
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<RecipeSummary>, RecipeError> {
        let rows = self.lock()?;
        Ok(rows.iter().rev().map(Recipe::summary).collect())
    }

    async fn get(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeError> {
        let rows = self.lock()?;
        Ok(rows.iter().find(|r| r.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Ingredient;

    fn new_recipe(name: &str) -> NewRecipe {
        NewRecipe {
            name: name.into(),
            ingredients: vec![Ingredient {
                item: "salt".into(),
                quantity: "1".into(),
                unit: "pinch".into(),
                note: None,
            }],
            instructions: vec!["Season.".into()],
            cook_time: None,
            tags: vec![],
            notes: None,
            source_url: None,
        }
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = MemoryStore::new();
        let id = store.insert(&new_recipe("Soup")).await.unwrap();
        let recipe = store.get(id).await.unwrap().expect("stored");
        assert_eq!(recipe.name, "Soup");
        assert_eq!(recipe.id, id);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryStore::new();
        let first = store.insert(&new_recipe("First")).await.unwrap();
        let second = store.insert(&new_recipe("Second")).await.unwrap();
        let third = store.insert(&new_recipe("Third")).await.unwrap();

        let ids: Vec<RecipeId> = store.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![third, second, first]);

        let a = store.get(first).await.unwrap().unwrap();
        let b = store.get(second).await.unwrap().unwrap();
        assert!(a.created_at < b.created_at);
    }

    #[test]
    fn unknown_id_is_none() {
        let store = MemoryStore::new();
        let found = tokio_test::block_on(store.get(RecipeId::new()));
        assert!(tokio_test::assert_ok!(found).is_none());
        assert!(store.is_empty());
    }
}
