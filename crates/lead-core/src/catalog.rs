//! Acceso de solo lectura a las aristas del backend.
//!
//! Valida el estado de origen contra el catálogo antes de cualquier llamada
//! y filtra aristas que violan el contrato (peso fuera de rango, origen
//! distinto al pedido). Es la única frontera de I/O de lectura del motor.
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use lead_domain::{LeadId, LeadStatus, StatusCatalog, TransitionEdge};
use log::{debug, warn};

use crate::backend::{bounded, TransitionBackend};
use crate::errors::EngineError;

pub struct CatalogAccess {
    backend: Arc<dyn TransitionBackend>,
    catalog: StatusCatalog,
    timeout: Duration,
}

impl CatalogAccess {
    pub fn new(backend: Arc<dyn TransitionBackend>, catalog: StatusCatalog, timeout: Duration) -> Self {
        Self { backend, catalog, timeout }
    }

    pub fn catalog(&self) -> &StatusCatalog {
        &self.catalog
    }

    pub fn backend(&self) -> &Arc<dyn TransitionBackend> {
        &self.backend
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Aristas salientes de `from_status`.
    pub async fn fetch_edges(&self, from_status: LeadStatus) -> Result<Vec<TransitionEdge>, EngineError> {
        if !self.catalog.contains(from_status) {
            return Err(EngineError::StatusNotInCatalog(from_status));
        }
        let edges = bounded(self.timeout, self.backend.get_edges_for_status(from_status)).await?;
        Ok(sanitize(edges, |edge| {
            if edge.from_status != from_status {
                warn!("backend returned edge from {} when asked for {from_status}", edge.from_status);
                return false;
            }
            true
        }))
    }

    /// Aristas por lead en una sola llamada. Un conjunto vacío no llama al
    /// backend.
    pub async fn fetch_edges_batch(&self, lead_ids: &[LeadId]) -> Result<HashMap<LeadId, Vec<TransitionEdge>>, EngineError> {
        if lead_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let raw = bounded(self.timeout, self.backend.get_edges_batch(lead_ids)).await?;
        let mut by_lead = HashMap::with_capacity(raw.len());
        for (lead_id, edges) in raw {
            if !lead_ids.contains(&lead_id) {
                debug!("ignoring edges for unrequested lead {lead_id}");
                continue;
            }
            let edges = sanitize(edges, |edge| {
                if !self.catalog.contains(edge.from_status) {
                    warn!("lead {lead_id} sits at {} which is not in the client catalog", edge.from_status);
                    return false;
                }
                true
            });
            by_lead.insert(lead_id, edges);
        }
        Ok(by_lead)
    }

    /// Compara el catálogo local con el del backend. Cualquier diferencia en
    /// uno u otro sentido es un error explícito.
    pub async fn verify_catalog(&self) -> Result<(), EngineError> {
        let remote: BTreeSet<String> = bounded(self.timeout, self.backend.list_statuses()).await?
                                                                                          .into_iter()
                                                                                          .map(|s| s.trim().to_string())
                                                                                          .collect();
        let local: BTreeSet<String> = self.catalog.names().into_iter().map(str::to_string).collect();
        let unknown_to_client: BTreeSet<String> = remote.difference(&local).cloned().collect();
        let unknown_to_backend: BTreeSet<String> = local.difference(&remote).cloned().collect();
        if unknown_to_client.is_empty() && unknown_to_backend.is_empty() {
            return Ok(());
        }
        Err(EngineError::CatalogMismatch { unknown_to_client,
                                           unknown_to_backend })
    }
}

fn sanitize<F>(edges: Vec<TransitionEdge>, mut keep: F) -> Vec<TransitionEdge>
    where F: FnMut(&TransitionEdge) -> bool
{
    edges.into_iter()
         .filter(|edge| match edge.validate() {
             Ok(()) => true,
             Err(e) => {
                 warn!("dropping edge {} -> {}: {e}", edge.from_status, edge.to_status);
                 false
             }
         })
         .filter(|edge| keep(edge))
         .collect()
}
