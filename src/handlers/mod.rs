pub mod exposition;
pub mod pricing;
pub mod root;

use std::sync::Arc;

use crate::catalog::Catalog;

/// Application state shared by the pricing handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}
