//! Aplicación de un cambio de estado elegido por el usuario.
//!
//! Orden de operaciones en éxito: escribir el estado local del lead y
//! después invalidar su entrada de cache, para que cualquier recarga
//! posterior parta ya del estado nuevo. El executor no vuelve a rankear: el
//! siguiente widget que lea la entrada invalidada dispara la recarga.
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use lead_domain::{Lead, LeadId, LeadStatus, StatusCatalog};
use log::{debug, warn};

use crate::backend::{bounded, TransitionBackend};
use crate::cache::TransitionCache;
use crate::constants::COMMIT_REJECTED_FALLBACK;
use crate::errors::EngineError;
use crate::event::TransitionEvent;
use crate::leads::LeadBook;

pub struct StatusUpdateExecutor {
    backend: Arc<dyn TransitionBackend>,
    catalog: StatusCatalog,
    cache: Arc<TransitionCache>,
    leads: Arc<LeadBook>,
    timeout: Duration,
    updating: DashSet<LeadId>,
}

/// Marca de "actualización en curso" que se libera al salir de scope,
/// también si el futuro se cancela a mitad del commit.
struct UpdateGuard<'a> {
    updating: &'a DashSet<LeadId>,
    lead_id: LeadId,
}

impl<'a> UpdateGuard<'a> {
    fn acquire(updating: &'a DashSet<LeadId>, lead_id: LeadId) -> Option<Self> {
        updating.insert(lead_id).then(|| Self { updating, lead_id })
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.updating.remove(&self.lead_id);
    }
}

impl StatusUpdateExecutor {
    pub fn new(backend: Arc<dyn TransitionBackend>,
               catalog: StatusCatalog,
               cache: Arc<TransitionCache>,
               leads: Arc<LeadBook>,
               timeout: Duration)
               -> Self {
        Self { backend,
               catalog,
               cache,
               leads,
               timeout,
               updating: DashSet::new() }
    }

    pub fn is_updating(&self, lead_id: &LeadId) -> bool {
        self.updating.contains(lead_id)
    }

    pub async fn set_status(&self, lead_id: LeadId, new_status: LeadStatus) -> Result<Lead, EngineError> {
        let lead = self.precheck(lead_id, new_status)?;
        let Some(_guard) = UpdateGuard::acquire(&self.updating, lead_id) else {
            debug!("ignoring duplicate status update for lead {lead_id}");
            return Err(EngineError::Reentrant(lead_id));
        };
        // otro commit pudo terminar entre la validación y el guard
        let lead = match self.leads.get(&lead_id) {
            Some(current) if current.status == new_status => {
                return Err(EngineError::SameStatus { lead_id, status: new_status });
            }
            Some(current) => current,
            None => lead,
        };

        let outcome = bounded(self.timeout, self.backend.commit_status(lead_id, new_status))
            .await
            .map_err(|e| {
                warn!("status commit for lead {lead_id} failed: {e}");
                EngineError::Commit(e.to_string())
            })?;
        if !outcome.success {
            let message = outcome.error.unwrap_or_else(|| COMMIT_REJECTED_FALLBACK.to_string());
            warn!("backend rejected status {new_status} for lead {lead_id}: {message}");
            return Err(EngineError::Commit(message));
        }

        let updated = match outcome.lead {
            Some(remote) if remote.id == lead_id => {
                self.leads.upsert(remote.clone());
                remote
            }
            _ => match self.leads.apply_status(&lead_id, new_status) {
                Some(updated) => updated,
                None => {
                    // la vista descartó el lead durante el commit
                    let mut updated = lead.clone();
                    updated.status = new_status;
                    updated
                }
            },
        };
        self.cache.invalidate(&lead_id);
        self.cache.events().publish(TransitionEvent::StatusChanged { lead_id,
                                                                     from: lead.status,
                                                                     to: updated.status });
        debug!("lead {lead_id} moved {} -> {}", lead.status, updated.status);
        Ok(updated)
    }

    /// Validaciones síncronas, sin I/O ni efectos sobre `updating`.
    fn precheck(&self, lead_id: LeadId, new_status: LeadStatus) -> Result<Lead, EngineError> {
        let lead = self.leads.get(&lead_id).ok_or(EngineError::UnknownLead(lead_id))?;
        if !self.catalog.contains(new_status) {
            return Err(EngineError::StatusNotInCatalog(new_status));
        }
        if lead.status == new_status {
            return Err(EngineError::SameStatus { lead_id, status: new_status });
        }
        Ok(lead)
    }
}
