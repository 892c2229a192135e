use std::sync::Arc;

use crate::import::Importer;
use crate::store::RecipeStore;

#[derive(Clone)]
pub struct AppState {
    pub importer: Arc<Importer>,
    pub store: Arc<dyn RecipeStore>,
}

impl AppState {
    /// Share the importer's store with the read-only routes.
    pub fn new(importer: Importer) -> Self {
        let store = Arc::clone(importer.store());
        Self {
            importer: Arc::new(importer),
            store,
        }
    }
}
