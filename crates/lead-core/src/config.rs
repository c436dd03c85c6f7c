//! Carga de configuración del motor desde variables de entorno.
//! Usa el prefijo `LEADFLOW_` y valores por defecto razonables.

use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use lead_domain::StatusCatalog;
use once_cell::sync::Lazy;

use crate::constants::{DEFAULT_EVENT_CAPACITY, DEFAULT_FETCH_TIMEOUT_SECS, ENV_CACHE_TTL_SECS, ENV_EVENT_CAPACITY,
                       ENV_FETCH_TIMEOUT_SECS, ENV_STATUS_CATALOG};
use crate::errors::EngineError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Límite de cada llamada al backend; al expirar cuenta como fallo.
    pub fetch_timeout: Duration,
    /// TTL opcional de entradas pobladas. `None`: solo invalidación explícita.
    pub cache_ttl: Option<Duration>,
    pub event_capacity: usize,
    /// Catálogo compartido con el backend (orden = desempate del ranking).
    pub catalog: StatusCatalog,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
               cache_ttl: None,
               event_capacity: DEFAULT_EVENT_CAPACITY,
               catalog: StatusCatalog::default() }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, EngineError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de claves inyectable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EngineError>
        where F: Fn(&str) -> Option<String>
    {
        let mut cfg = Self::default();
        if let Some(secs) = parse_u64(&lookup, ENV_FETCH_TIMEOUT_SECS)? {
            if secs == 0 {
                return Err(EngineError::Config(format!("{ENV_FETCH_TIMEOUT_SECS} must be greater than zero")));
            }
            cfg.fetch_timeout = Duration::from_secs(secs);
        }
        cfg.cache_ttl = parse_u64(&lookup, ENV_CACHE_TTL_SECS)?.filter(|s| *s > 0)
                                                               .map(Duration::from_secs);
        if let Some(cap) = parse_u64(&lookup, ENV_EVENT_CAPACITY)? {
            cfg.event_capacity = usize::try_from(cap).map_err(|_| EngineError::Config(format!("{ENV_EVENT_CAPACITY} too large")))?
                                                     .max(1);
        }
        if let Some(raw) = lookup(ENV_STATUS_CATALOG).filter(|v| !v.trim().is_empty()) {
            cfg.catalog = StatusCatalog::parse_list(&raw)?;
        }
        Ok(cfg)
    }

    pub fn with_catalog(mut self, catalog: StatusCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>, EngineError>
    where F: Fn(&str) -> Option<String>
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim()
                        .parse::<u64>()
                        .map(Some)
                        .map_err(|_| EngineError::Config(format!("{key}={raw:?} is not a non-negative integer"))),
    }
}
