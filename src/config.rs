//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`CONFIG`) con la configuración del motor y de la demo.
use once_cell::sync::Lazy;
use std::env;

use lead_core::EngineConfig;

use crate::errors::CoreError;

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Configuración del motor de transiciones (timeouts, TTL, catálogo).
    pub engine: EngineConfig,
    /// Cantidad de leads de ejemplo que siembra la demo.
    pub demo_leads: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        let engine = EngineConfig::from_env()?;
        let demo_leads = match env::var("LEADFLOW_DEMO_LEADS") {
            Ok(raw) => raw.trim()
                          .parse()
                          .map_err(|_| CoreError::Config(format!("LEADFLOW_DEMO_LEADS={raw:?} no es un número")))?,
            Err(_) => 12,
        };
        Ok(Self { engine, demo_leads })
    }
}

/// Instancia global perezosa, evaluada una sola vez. Conserva el error de
/// carga para que el binario lo reporte en vez de abortar.
pub static CONFIG: Lazy<Result<AppConfig, String>> = Lazy::new(|| AppConfig::from_env().map_err(|e| e.to_string()));
