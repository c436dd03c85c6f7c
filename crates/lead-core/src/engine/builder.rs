//! Builder para `TransitionEngine`.
//!
//! El backend es obligatorio; catálogo, configuración y política de ranking
//! tienen valores por defecto. Cada `build()` crea una cache y un libro de
//! leads propios, de modo que cada test o vista obtiene instancias aisladas.
//!
//! ```ignore
//! let engine = TransitionEngine::builder(backend)
//!     .config(EngineConfig::from_env()?)
//!     .build();
//! ```
use std::sync::Arc;

use lead_domain::StatusCatalog;
use lead_policies::{SuggestionPolicy, WeightRanker};

use crate::backend::TransitionBackend;
use crate::cache::TransitionCache;
use crate::catalog::CatalogAccess;
use crate::config::EngineConfig;
use crate::engine::TransitionEngine;
use crate::event::EventBus;
use crate::executor::StatusUpdateExecutor;
use crate::leads::LeadBook;
use crate::loader::BatchLoader;

pub struct EngineBuilder {
    backend: Arc<dyn TransitionBackend>,
    config: EngineConfig,
    policy: Arc<dyn SuggestionPolicy>,
}

impl EngineBuilder {
    pub(crate) fn new(backend: Arc<dyn TransitionBackend>) -> Self {
        Self { backend,
               config: EngineConfig::default(),
               policy: Arc::new(WeightRanker::new()) }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Reemplaza el catálogo de la configuración actual.
    pub fn catalog(mut self, catalog: StatusCatalog) -> Self {
        self.config.catalog = catalog;
        self
    }

    pub fn policy(mut self, policy: Arc<dyn SuggestionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> TransitionEngine {
        let events = EventBus::new(self.config.event_capacity);
        let cache = Arc::new(TransitionCache::new(self.config.cache_ttl, events));
        let leads = Arc::new(LeadBook::new());
        let catalog = Arc::new(CatalogAccess::new(self.backend.clone(),
                                                  self.config.catalog.clone(),
                                                  self.config.fetch_timeout));
        let loader = BatchLoader::new(catalog.clone(), cache.clone(), leads.clone(), self.policy);
        let executor = StatusUpdateExecutor::new(self.backend,
                                                 self.config.catalog.clone(),
                                                 cache.clone(),
                                                 leads.clone(),
                                                 self.config.fetch_timeout);
        TransitionEngine::from_parts(self.config, catalog, cache, leads, loader, executor)
    }
}
