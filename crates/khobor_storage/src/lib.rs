use khobor_core::{ArticleStore, Error, Result};
use std::sync::Arc;

pub mod backends;

pub use backends::MemoryStore;

/// Builds the store handle selected by name. Constructed once at process
/// start; callers pass the handle down rather than reaching for a global.
pub fn create_store(kind: &str) -> Result<Arc<dyn ArticleStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        other => Err(Error::Storage(format!("unknown storage backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::backends::MemoryStore;
    pub use super::create_store;
    pub use khobor_core::ArticleStore;
}
