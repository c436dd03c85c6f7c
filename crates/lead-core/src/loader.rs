//! Carga de transiciones por lotes.
//!
//! Varias filas visibles piden opciones a la vez; el loader agrupa sus ids
//! en una sola llamada por conjunto no cacheado y marca los ids como
//! `Loading` antes de esperar a la red, de modo que peticiones concurrentes
//! con ids solapados no vuelvan a pedirlos.
use std::collections::HashSet;
use std::sync::Arc;

use lead_domain::{Lead, LeadId, LeadStatus, StatusOption, TransitionEdge};
use lead_policies::SuggestionPolicy;
use log::{debug, warn};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{timeout_at, Instant};

use crate::cache::{CacheLookup, Claim, TransitionCache};
use crate::constants::LOAD_CANCELLED;
use crate::catalog::CatalogAccess;
use crate::errors::EngineError;
use crate::leads::LeadBook;

/// Resumen de una invocación de `load_batch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Ids distintos solicitados.
    pub requested: usize,
    /// Ids que esta invocación pidió al backend y dejó poblados.
    pub fetched: Vec<LeadId>,
    /// Ids ya poblados o en vuelo por otra carga.
    pub skipped: Vec<LeadId>,
    /// Ids que quedan `Absent`: fallo de red o estado local fuera del catálogo.
    pub failed: Vec<LeadId>,
}

impl BatchReport {
    pub fn issued_request(&self) -> bool {
        !self.fetched.is_empty() || !self.failed.is_empty()
    }
}

#[derive(Clone)]
pub struct BatchLoader {
    catalog: Arc<CatalogAccess>,
    cache: Arc<TransitionCache>,
    leads: Arc<LeadBook>,
    policy: Arc<dyn SuggestionPolicy>,
}

impl BatchLoader {
    pub fn new(catalog: Arc<CatalogAccess>,
               cache: Arc<TransitionCache>,
               leads: Arc<LeadBook>,
               policy: Arc<dyn SuggestionPolicy>)
               -> Self {
        Self { catalog,
               cache,
               leads,
               policy }
    }

    /// Carga las opciones de los ids que no estén poblados ni en vuelo.
    /// Los fallos no se propagan: se registran y los ids quedan `Absent`
    /// para reintentar en el siguiente acceso.
    pub async fn load_batch<I>(&self, lead_ids: I) -> BatchReport
        where I: IntoIterator<Item = LeadId>
    {
        let mut seen = HashSet::new();
        let requested: Vec<LeadId> = lead_ids.into_iter().filter(|id| seen.insert(*id)).collect();
        // un estado local fuera del catálogo no puede rankearse: se rechaza antes de I/O
        let (wanted, out_of_catalog): (Vec<LeadId>, Vec<LeadId>) =
            requested.iter().copied().partition(|id| self.in_catalog(id));
        if !out_of_catalog.is_empty() {
            warn!("{} leads have a status outside the catalog; not loading them", out_of_catalog.len());
        }

        // Paso síncrono: reclamar antes de cualquier await.
        let claim = ClaimGuard::new(&self.cache, self.cache.claim(&wanted));
        let claimed: HashSet<LeadId> = claim.lead_ids().iter().copied().collect();
        let mut report = BatchReport { requested: requested.len(),
                                       skipped: wanted.iter().copied().filter(|id| !claimed.contains(id)).collect(),
                                       failed: out_of_catalog,
                                       ..BatchReport::default() };
        if claimed.is_empty() {
            debug!("batch of {} leads fully cached or in flight; no request", report.requested);
            return report;
        }

        debug!("fetching transitions for {} of {} leads", claimed.len(), report.requested);
        let response = self.catalog.fetch_edges_batch(claim.lead_ids()).await;
        let mut by_lead = match response {
            Ok(map) => map,
            Err(e) => {
                warn!("batch transition load failed for {} leads: {e}", claimed.len());
                report.failed.extend(claim.release(&e.to_string()));
                return report;
            }
        };

        let entries = claim.lead_ids()
                           .iter()
                           .map(|id| {
                               // un lead que el backend omitió se puebla con la lista por defecto
                               let edges = by_lead.remove(id).unwrap_or_default();
                               let options = match self.current_status(id, &edges) {
                                   Some(current) => self.rank(current, &edges),
                                   // sin estado conocido ni aristas: poblado sin opciones
                                   None => Vec::new(),
                               };
                               (*id, options)
                           })
                           .collect();
        report.fetched = claim.populate(entries);
        report
    }

    /// Carga individual de respaldo para un lead ausente de la cache.
    ///
    /// - Poblado: devuelve las opciones sin llamar al backend.
    /// - En vuelo: `Ok(None)`; el llamador debe esperar el evento de cambio.
    /// - Ausente: reclama, pide las aristas del estado actual y puebla.
    pub async fn fetch_for_lead(&self, lead: &Lead) -> Result<Option<Vec<StatusOption>>, EngineError> {
        let claim = ClaimGuard::new(&self.cache, self.cache.claim(&[lead.id]));
        if claim.lead_ids().is_empty() {
            return Ok(self.cache.get(&lead.id));
        }
        match self.catalog.fetch_edges(lead.status).await {
            Ok(edges) => {
                let options = self.rank(lead.status, &edges);
                let populated = claim.populate(vec![(lead.id, options.clone())]);
                // si se invalidó durante el vuelo, el resultado ya no aplica
                Ok(if populated.is_empty() { None } else { Some(options) })
            }
            Err(e) => {
                warn!("transition fetch for lead {} failed: {e}", lead.id);
                claim.release(&e.to_string());
                Err(e)
            }
        }
    }

    /// Política del widget: usa la cache si está poblada, espera si otro la
    /// está cargando y solo pide individualmente si el lead está ausente.
    /// Los fallos se registran y se devuelven como `None` ("sin opciones").
    pub async fn resolve_for_lead(&self, lead: &Lead) -> Option<Vec<StatusOption>> {
        // suscribirse antes de mirar el estado para no perder la transición
        let mut events = self.cache.subscribe();
        let deadline = Instant::now() + self.catalog.timeout();
        loop {
            match self.cache.lookup(&lead.id) {
                CacheLookup::Ready(options) => return Some(options),
                CacheLookup::Loading => match timeout_at(deadline, events.recv()).await {
                    Ok(Ok(_)) | Ok(Err(RecvError::Lagged(_))) => continue,
                    Ok(Err(RecvError::Closed)) => return None,
                    Err(_) => {
                        warn!("gave up waiting for transitions of lead {}", lead.id);
                        return None;
                    }
                },
                CacheLookup::Absent => match self.fetch_for_lead(lead).await {
                    Ok(Some(options)) => return Some(options),
                    // otro llamador lo reclamó o fue invalidado: volver a mirar
                    Ok(None) => continue,
                    Err(_) => return None,
                },
            }
        }
    }

    pub fn cache(&self) -> &Arc<TransitionCache> {
        &self.cache
    }

    fn rank(&self, current: LeadStatus, edges: &[TransitionEdge]) -> Vec<StatusOption> {
        self.policy.rank(self.catalog.catalog(), current, edges)
    }

    fn in_catalog(&self, lead_id: &LeadId) -> bool {
        self.leads
            .status_of(lead_id)
            .map_or(true, |status| self.catalog.catalog().contains(status))
    }

    /// Estado actual del lead: el libro local manda; si la vista no lo
    /// conoce se toma del origen de sus aristas.
    fn current_status(&self, lead_id: &LeadId, edges: &[TransitionEdge]) -> Option<LeadStatus> {
        self.leads
            .status_of(lead_id)
            .or_else(|| edges.first().map(|e| e.from_status))
    }
}

/// Reclamo en curso de una carga. Si el futuro se cancela antes de poblar
/// o liberar (tarea abortada, timeout del host, vista desmontada), `Drop`
/// devuelve a `Absent` los ids que sigan a nombre de su ticket.
struct ClaimGuard<'a> {
    cache: &'a TransitionCache,
    claim: Claim,
}

impl<'a> ClaimGuard<'a> {
    fn new(cache: &'a TransitionCache, claim: Claim) -> Self {
        Self { cache, claim }
    }

    fn lead_ids(&self) -> &[LeadId] {
        &self.claim.lead_ids
    }

    fn populate(self, entries: Vec<(LeadId, Vec<StatusOption>)>) -> Vec<LeadId> {
        self.cache.populate(self.claim.ticket, entries)
    }

    fn release(self, reason: &str) -> Vec<LeadId> {
        self.cache.release(self.claim.ticket, &self.claim.lead_ids, reason)
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        // release solo toca slots aún `Loading` con este ticket
        let leftover = self.cache.release(self.claim.ticket, &self.claim.lead_ids, LOAD_CANCELLED);
        if !leftover.is_empty() {
            debug!("released {} claimed leads of a cancelled load", leftover.len());
        }
    }
}
