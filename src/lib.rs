//! LeadFlow Rust
//!
//! Librería de la aplicación sobre el motor `lead-core`:
//! - `config`: configuración global cargada desde el entorno.
//! - `errors`: error de núcleo de la aplicación.
//! - `providers`: implementaciones de backend (en memoria, pipeline sembrado).

pub mod config;
pub mod errors;
pub mod providers;

pub use providers::backend::implementations::InMemoryBackend;

