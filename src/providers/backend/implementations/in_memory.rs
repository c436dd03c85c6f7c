//! Backend en memoria: mantiene la tabla de aristas y el estado autoritativo
//! de cada lead tras un `RwLock` compartido, como haría el servicio remoto.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use lead_core::{BackendError, TransitionBackend};
use lead_domain::{CommitOutcome, Lead, LeadId, LeadStatus, TransitionEdge};
use log::debug;
use tokio::sync::RwLock;

use crate::providers::backend::seed::pipeline_edges;

#[derive(Clone, Default)]
pub struct InMemoryBackend {
    edges: Arc<RwLock<HashMap<LeadStatus, Vec<TransitionEdge>>>>,
    leads: Arc<RwLock<HashMap<LeadId, Lead>>>,
}

impl InMemoryBackend {
    pub fn new(edges: Vec<TransitionEdge>) -> Self {
        let mut table: HashMap<LeadStatus, Vec<TransitionEdge>> = HashMap::new();
        for edge in edges {
            table.entry(edge.from_status).or_default().push(edge);
        }
        for list in table.values_mut() {
            list.sort_by(|a, b| b.weight.cmp(&a.weight));
        }
        Self { edges: Arc::new(RwLock::new(table)),
               leads: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Backend sembrado con el pipeline inmobiliario por defecto.
    pub fn seeded() -> Self {
        Self::new(pipeline_edges())
    }

    pub async fn insert_lead(&self, lead: Lead) {
        self.leads.write().await.insert(lead.id, lead);
    }

    /// Cambia el estado del lead en el servidor sin pasar por el cliente
    /// (otro usuario editando el mismo lead).
    pub async fn force_status(&self, lead_id: LeadId, status: LeadStatus) -> Option<Lead> {
        let mut guard = self.leads.write().await;
        let lead = guard.get_mut(&lead_id)?;
        lead.status = status;
        lead.updated_at = Some(Utc::now());
        Some(lead.clone())
    }

    pub async fn lead(&self, lead_id: &LeadId) -> Option<Lead> {
        self.leads.read().await.get(lead_id).cloned()
    }

    /// Página de leads en orden estable por nombre.
    pub async fn page(&self) -> Vec<Lead> {
        let mut leads: Vec<Lead> = self.leads.read().await.values().cloned().collect();
        leads.sort_by(|a, b| a.name.cmp(&b.name));
        leads
    }
}

#[async_trait]
impl TransitionBackend for InMemoryBackend {
    async fn get_edges_for_status(&self, status: LeadStatus) -> Result<Vec<TransitionEdge>, BackendError> {
        Ok(self.edges.read().await.get(&status).cloned().unwrap_or_default())
    }

    async fn get_edges_batch(&self, lead_ids: &[LeadId]) -> Result<HashMap<LeadId, Vec<TransitionEdge>>, BackendError> {
        let leads = self.leads.read().await;
        let edges = self.edges.read().await;
        let mut out = HashMap::with_capacity(lead_ids.len());
        for id in lead_ids {
            // leads desconocidos se omiten; el cliente aplica la lista vacía
            if let Some(lead) = leads.get(id) {
                out.insert(*id, edges.get(&lead.status).cloned().unwrap_or_default());
            }
        }
        debug!("batch edges: requested={} returned={}", lead_ids.len(), out.len());
        Ok(out)
    }

    async fn commit_status(&self, lead_id: LeadId, new_status: LeadStatus) -> Result<CommitOutcome, BackendError> {
        let mut leads = self.leads.write().await;
        match leads.get_mut(&lead_id) {
            Some(lead) => {
                lead.status = new_status;
                lead.updated_at = Some(Utc::now());
                Ok(CommitOutcome::ok(Some(lead.clone())))
            }
            None => Ok(CommitOutcome::rejected(format!("lead {lead_id} does not exist"))),
        }
    }

    async fn list_statuses(&self) -> Result<Vec<String>, BackendError> {
        Ok(LeadStatus::ALL.iter().map(|s| s.as_str().to_string()).collect())
    }
}
