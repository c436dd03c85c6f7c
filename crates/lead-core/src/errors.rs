//! Taxonomía de errores del motor.
//!
//! - Validación: se rechaza antes de cualquier I/O, nunca se reintenta.
//! - Transitorio: fallo de red/backend al cargar; no es fatal, la entrada
//!   vuelve a `Absent` y el siguiente acceso reintenta.
//! - Commit: el backend rechazó el cambio; visible al usuario, sin mutar
//!   estado local.
//! - Reentrada: commit duplicado mientras otro está pendiente; la UI lo
//!   ignora.

use std::collections::BTreeSet;

use lead_domain::{DomainError, LeadId, LeadStatus};
use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error("lead {0} is not loaded in this view")]
    UnknownLead(LeadId),
    #[error("status {0} is not part of the configured catalog")]
    StatusNotInCatalog(LeadStatus),
    #[error("lead {lead_id} is already {status}")]
    SameStatus { lead_id: LeadId, status: LeadStatus },
    #[error("status update already in flight for lead {0}")]
    Reentrant(LeadId),
    #[error("transition fetch failed: {0}")]
    Transient(#[from] BackendError),
    #[error("status update failed: {0}")]
    Commit(String),
    #[error("status catalog drift: unknown to client {unknown_to_client:?}, unknown to backend {unknown_to_backend:?}")]
    CatalogMismatch {
        unknown_to_client: BTreeSet<String>,
        unknown_to_backend: BTreeSet<String>,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Transient,
    Commit,
    Reentrancy,
    Configuration,
}

impl EngineError {
    pub fn class(&self) -> ErrorClass {
        match self {
            EngineError::Validation(_)
            | EngineError::UnknownLead(_)
            | EngineError::StatusNotInCatalog(_)
            | EngineError::SameStatus { .. } => ErrorClass::Validation,
            EngineError::Reentrant(_) => ErrorClass::Reentrancy,
            EngineError::Transient(_) => ErrorClass::Transient,
            EngineError::Commit(_) => ErrorClass::Commit,
            EngineError::CatalogMismatch { .. } | EngineError::Config(_) => ErrorClass::Configuration,
        }
    }

    /// Indica si la UI debe mostrar el error. Los fallos de precarga y la
    /// reentrada se registran pero no interrumpen al usuario.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self.class(), ErrorClass::Transient | ErrorClass::Reentrancy)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.class(), ErrorClass::Transient)
    }
}
