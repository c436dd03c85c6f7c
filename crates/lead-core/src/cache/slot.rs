use lead_domain::StatusOption;
use tokio::time::Instant;

/// Estado almacenado por lead. `Absent` no se guarda: es la ausencia de
/// clave en el mapa.
#[derive(Debug, Clone)]
pub enum CacheSlot {
    /// Reclamado por una carga en vuelo identificada por `ticket`.
    Loading { ticket: u64 },
    /// Lista completa de opciones (puede no tener ninguna válida).
    Populated { options: Vec<StatusOption>, fetched_at: Instant },
}

impl CacheSlot {
    pub fn is_claimed_by(&self, ticket: u64) -> bool {
        matches!(self, CacheSlot::Loading { ticket: t } if *t == ticket)
    }
}

/// Vista sin datos del estado de un lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Absent,
    Loading,
    Populated,
}

/// Resultado de consultar la cache en un solo paso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Absent,
    Loading,
    Ready(Vec<StatusOption>),
}
