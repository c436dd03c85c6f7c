//! Eventos de cambio publicados tras cada mutación de cache o de leads.
//!
//! Los widgets se suscriben para re-renderizar: un lead en `Loading` espera
//! aquí en vez de lanzar su propia petición.
use lead_domain::{LeadId, LeadStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionEvent {
    /// Leads reclamados por una carga (batch o individual).
    Loading { lead_ids: Vec<LeadId> },
    /// Opciones disponibles en cache.
    Populated { lead_ids: Vec<LeadId> },
    /// La carga falló; los leads vuelven a `Absent`.
    LoadFailed { lead_ids: Vec<LeadId>, reason: String },
    Invalidated { lead_id: LeadId },
    Cleared,
    StatusChanged {
        lead_id: LeadId,
        from: LeadStatus,
        to: LeadStatus,
    },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TransitionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publica sin bloquear; sin suscriptores el evento se descarta.
    pub fn publish(&self, event: TransitionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_EVENT_CAPACITY)
    }
}
