//! Constantes del motor.

/// Timeout por defecto de cada llamada al backend (segundos).
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Capacidad del canal broadcast de eventos de cambio.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Mensaje usado cuando el backend rechaza un commit sin dar motivo.
pub const COMMIT_REJECTED_FALLBACK: &str = "status update rejected by backend";

/// Motivo publicado al liberar ids de una carga cancelada a mitad de vuelo.
pub const LOAD_CANCELLED: &str = "load cancelled";

pub const ENV_FETCH_TIMEOUT_SECS: &str = "LEADFLOW_FETCH_TIMEOUT_SECS";
pub const ENV_CACHE_TTL_SECS: &str = "LEADFLOW_CACHE_TTL_SECS";
pub const ENV_EVENT_CAPACITY: &str = "LEADFLOW_EVENT_CAPACITY";
pub const ENV_STATUS_CATALOG: &str = "LEADFLOW_STATUS_CATALOG";
