//! Core TransitionEngine implementation

use std::sync::Arc;

use lead_domain::{Lead, LeadId, LeadStatus, StatusCatalog, StatusOption};
use lead_policies::suggested_status;
use log::{debug, info};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::backend::TransitionBackend;
use crate::cache::{SlotState, TransitionCache};
use crate::catalog::CatalogAccess;
use crate::config::EngineConfig;
use crate::engine::EngineBuilder;
use crate::errors::EngineError;
use crate::event::TransitionEvent;
use crate::executor::StatusUpdateExecutor;
use crate::leads::LeadBook;
use crate::loader::{BatchLoader, BatchReport};

/// Fachada del motor de transiciones.
///
/// Dueña de su cache y de su libro de leads (nada global): la vista la crea
/// al montarse y llama a `clear_cache` al desmontarse.
pub struct TransitionEngine {
    config: EngineConfig,
    catalog: Arc<CatalogAccess>,
    cache: Arc<TransitionCache>,
    leads: Arc<LeadBook>,
    loader: BatchLoader,
    executor: StatusUpdateExecutor,
}

impl TransitionEngine {
    /// Crea un nuevo builder para configurar el engine
    #[inline]
    pub fn builder(backend: Arc<dyn TransitionBackend>) -> EngineBuilder {
        EngineBuilder::new(backend)
    }

    /// Engine con configuración por defecto.
    pub fn new(backend: Arc<dyn TransitionBackend>) -> Self {
        EngineBuilder::new(backend).build()
    }

    pub(crate) fn from_parts(config: EngineConfig,
                             catalog: Arc<CatalogAccess>,
                             cache: Arc<TransitionCache>,
                             leads: Arc<LeadBook>,
                             loader: BatchLoader,
                             executor: StatusUpdateExecutor)
                             -> Self {
        Self { config,
               catalog,
               cache,
               leads,
               loader,
               executor }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &StatusCatalog {
        self.catalog.catalog()
    }

    /// Comprueba al arrancar que catálogo local y backend coinciden.
    pub async fn verify_catalog(&self) -> Result<(), EngineError> {
        self.catalog.verify_catalog().await?;
        info!("status catalog verified ({} statuses)", self.catalog().len());
        Ok(())
    }

    /// Registra la página de leads de la vista y carga sus transiciones.
    /// Un lead cuyo estado cambió respecto a la copia local pierde su
    /// entrada de cache.
    pub async fn load_page(&self, leads: Vec<Lead>) -> BatchReport {
        let ids = self.register_leads(leads);
        self.load_transitions_for_leads(ids).await
    }

    /// Registra leads en el libro local sin disparar cargas. Devuelve sus ids.
    pub fn register_leads(&self, leads: Vec<Lead>) -> Vec<LeadId> {
        let mut ids = Vec::with_capacity(leads.len());
        for lead in leads {
            let id = lead.id;
            let status = lead.status;
            if let Some(previous) = self.leads.upsert(lead) {
                if previous != status {
                    debug!("lead {id} changed {previous} -> {status} remotely; invalidating");
                    self.cache.invalidate(&id);
                }
            }
            ids.push(id);
        }
        ids
    }

    pub async fn load_transitions_for_leads<I>(&self, lead_ids: I) -> BatchReport
        where I: IntoIterator<Item = LeadId>
    {
        self.loader.load_batch(lead_ids).await
    }

    /// Variante "fire-and-forget": la carga corre en una tarea aparte y el
    /// resultado aterriza en la cache.
    pub fn prefetch(&self, lead_ids: Vec<LeadId>) -> JoinHandle<BatchReport> {
        let loader = self.loader.clone();
        tokio::spawn(async move { loader.load_batch(lead_ids).await })
    }

    pub fn get_transitions_for_lead(&self, lead_id: &LeadId) -> Option<Vec<StatusOption>> {
        self.cache.get(lead_id)
    }

    pub fn is_lead_loading(&self, lead_id: &LeadId) -> bool {
        self.cache.is_loading(lead_id)
    }

    pub fn cache_state(&self, lead_id: &LeadId) -> SlotState {
        self.cache.state(lead_id)
    }

    /// Lectura del widget con espera/respaldo (ver `BatchLoader::resolve_for_lead`).
    /// `None` si el lead no está en la vista o la carga falló.
    pub async fn resolve_transitions(&self, lead_id: &LeadId) -> Option<Vec<StatusOption>> {
        let lead = self.leads.get(lead_id)?;
        self.loader.resolve_for_lead(&lead).await
    }

    /// Mejor transición válida del lead, si hay opciones cacheadas.
    pub fn suggested_status(&self, lead_id: &LeadId) -> Option<LeadStatus> {
        self.cache.get(lead_id).and_then(|options| suggested_status(&options))
    }

    pub async fn set_status(&self, lead_id: LeadId, new_status: LeadStatus) -> Result<Lead, EngineError> {
        self.executor.set_status(lead_id, new_status).await
    }

    pub fn is_updating(&self, lead_id: &LeadId) -> bool {
        self.executor.is_updating(lead_id)
    }

    pub fn lead(&self, lead_id: &LeadId) -> Option<Lead> {
        self.leads.get(lead_id)
    }

    /// Vacía la cache de transiciones (la vista se desmonta o se limpia).
    /// Las cargas en vuelo descartan su resultado al terminar.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Olvida también los leads registrados.
    pub fn reset(&self) {
        self.cache.clear();
        self.leads.clear();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.cache.subscribe()
    }
}
