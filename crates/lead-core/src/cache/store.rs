//! Store en memoria de opciones por lead.
//!
//! Única estructura mutable compartida del motor. Cada mutación es un paso
//! síncrono (sin `.await` de por medio) sobre el shard correspondiente del
//! `DashMap`:
//! - `claim`: compare-and-set `Absent -> Loading(ticket)` por lead.
//! - `populate`: `Loading(ticket) -> Populated`, solo si el ticket sigue
//!   siendo el dueño (una invalidación durante el vuelo descarta el
//!   resultado).
//! - `release`: `Loading(ticket) -> Absent` tras un fallo.
//! - `invalidate` / `clear`: vuelta a `Absent`.
//!
//! Nunca se mantiene una referencia del mapa mientras se publica un evento
//! ni mientras se accede a otra clave.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lead_domain::{LeadId, StatusOption};
use log::debug;
use tokio::sync::broadcast;
use tokio::time::Instant;

use super::slot::{CacheLookup, CacheSlot, SlotState};
use crate::event::{EventBus, TransitionEvent};

/// Leads reclamados por una carga concreta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub ticket: u64,
    pub lead_ids: Vec<LeadId>,
}

impl Claim {
    pub fn is_empty(&self) -> bool {
        self.lead_ids.is_empty()
    }
}

#[derive(Debug)]
pub struct TransitionCache {
    slots: DashMap<LeadId, CacheSlot>,
    next_ticket: AtomicU64,
    ttl: Option<Duration>,
    events: EventBus,
}

impl TransitionCache {
    pub fn new(ttl: Option<Duration>, events: EventBus) -> Self {
        Self { slots: DashMap::new(),
               next_ticket: AtomicU64::new(1),
               ttl,
               events }
    }

    /// Opciones de un lead; `None` si está ausente, cargando o expirado.
    /// Un vector vacío es un resultado poblado válido.
    pub fn get(&self, lead_id: &LeadId) -> Option<Vec<StatusOption>> {
        match self.lookup(lead_id) {
            CacheLookup::Ready(options) => Some(options),
            CacheLookup::Absent | CacheLookup::Loading => None,
        }
    }

    pub fn is_loading(&self, lead_id: &LeadId) -> bool {
        self.slots
            .get(lead_id)
            .map(|slot| matches!(slot.value(), CacheSlot::Loading { .. }))
            .unwrap_or(false)
    }

    pub fn state(&self, lead_id: &LeadId) -> SlotState {
        match self.lookup(lead_id) {
            CacheLookup::Absent => SlotState::Absent,
            CacheLookup::Loading => SlotState::Loading,
            CacheLookup::Ready(_) => SlotState::Populated,
        }
    }

    /// Consulta en un solo paso. Una entrada expirada se desaloja y se
    /// reporta como `Absent`.
    pub fn lookup(&self, lead_id: &LeadId) -> CacheLookup {
        let expired = match self.slots.get(lead_id) {
            None => return CacheLookup::Absent,
            Some(slot) => match slot.value() {
                CacheSlot::Loading { .. } => return CacheLookup::Loading,
                CacheSlot::Populated { options, fetched_at } => {
                    if !self.is_expired(*fetched_at) {
                        return CacheLookup::Ready(options.clone());
                    }
                    *fetched_at
                }
            },
        };
        // la referencia ya se soltó; desalojar solo si nadie la repobló
        self.slots
            .remove_if(lead_id, |_, slot| matches!(slot, CacheSlot::Populated { fetched_at, .. } if *fetched_at == expired));
        debug!("transition cache entry for {lead_id} expired");
        CacheLookup::Absent
    }

    /// Marca como `Loading` cada lead que no esté ni poblado ni cargando y
    /// devuelve los que se reclamaron. Los demás quedan intactos.
    pub fn claim(&self, lead_ids: &[LeadId]) -> Claim {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let mut claimed = Vec::new();
        for id in lead_ids {
            let won = match self.slots.entry(*id) {
                Entry::Vacant(vacant) => {
                    vacant.insert(CacheSlot::Loading { ticket });
                    true
                }
                Entry::Occupied(mut occupied) => {
                    let stale = match occupied.get() {
                        CacheSlot::Loading { .. } => false,
                        CacheSlot::Populated { fetched_at, .. } => self.is_expired(*fetched_at),
                    };
                    if stale {
                        occupied.insert(CacheSlot::Loading { ticket });
                    }
                    stale
                }
            };
            if won {
                claimed.push(*id);
            }
        }
        if !claimed.is_empty() {
            self.events.publish(TransitionEvent::Loading { lead_ids: claimed.clone() });
        }
        Claim { ticket, lead_ids: claimed }
    }

    /// Guarda las opciones de los leads que sigan reclamados por `ticket`.
    /// Devuelve los leads efectivamente poblados.
    pub fn populate(&self, ticket: u64, entries: Vec<(LeadId, Vec<StatusOption>)>) -> Vec<LeadId> {
        let now = Instant::now();
        let mut populated = Vec::with_capacity(entries.len());
        for (id, options) in entries {
            let Some(mut slot) = self.slots.get_mut(&id) else {
                debug!("dropping transitions for {id}: invalidated while loading");
                continue;
            };
            if !slot.is_claimed_by(ticket) {
                debug!("dropping transitions for {id}: claim {ticket} superseded");
                continue;
            }
            *slot = CacheSlot::Populated { options, fetched_at: now };
            drop(slot);
            populated.push(id);
        }
        if !populated.is_empty() {
            self.events.publish(TransitionEvent::Populated { lead_ids: populated.clone() });
        }
        populated
    }

    /// Devuelve a `Absent` los leads aún reclamados por `ticket`.
    pub fn release(&self, ticket: u64, lead_ids: &[LeadId], reason: &str) -> Vec<LeadId> {
        let released: Vec<LeadId> = lead_ids.iter()
                                            .copied()
                                            .filter(|id| self.slots.remove_if(id, |_, slot| slot.is_claimed_by(ticket)).is_some())
                                            .collect();
        if !released.is_empty() {
            self.events.publish(TransitionEvent::LoadFailed { lead_ids: released.clone(),
                                                              reason: reason.to_string() });
        }
        released
    }

    /// Elimina la entrada (cualquiera sea su estado). Devuelve si existía.
    pub fn invalidate(&self, lead_id: &LeadId) -> bool {
        let existed = self.slots.remove(lead_id).is_some();
        if existed {
            self.events.publish(TransitionEvent::Invalidated { lead_id: *lead_id });
        }
        existed
    }

    pub fn clear(&self) {
        self.slots.clear();
        self.events.publish(TransitionEvent::Cleared);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn is_expired(&self, fetched_at: Instant) -> bool {
        self.ttl.map(|ttl| fetched_at.elapsed() >= ttl).unwrap_or(false)
    }
}
