//! lead-core: motor de transiciones de estado de leads
//!
//! Componentes (de hoja a raíz):
//! - `catalog`: acceso de solo lectura a las aristas del backend.
//! - `cache`: store de opciones por lead con estados Absent/Loading/Populated.
//! - `loader`: carga por lotes con deduplicación de peticiones en vuelo.
//! - `executor`: aplica cambios de estado (commit remoto + escritura local).
//! - `engine`: fachada que consumen los widgets.
pub mod backend;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod executor;
pub mod leads;
pub mod loader;

pub use backend::{BackendError, TransitionBackend};
pub use cache::{CacheLookup, SlotState, TransitionCache};
pub use catalog::CatalogAccess;
pub use config::EngineConfig;
pub use engine::{EngineBuilder, TransitionEngine};
pub use errors::{EngineError, ErrorClass};
pub use event::{EventBus, TransitionEvent};
pub use executor::StatusUpdateExecutor;
pub use leads::LeadBook;
pub use loader::{BatchLoader, BatchReport};
