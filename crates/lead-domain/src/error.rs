use thiserror::Error;

/// Errores de validación del dominio. Se detectan siempre antes de cualquier
/// llamada de red y nunca se reintentan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown lead status: {0}")]
    UnknownStatus(String),
    #[error("malformed lead identifier: {0}")]
    MalformedLeadId(String),
    #[error("transition weight {0} out of range 0..=100")]
    WeightOutOfRange(u32),
    #[error("status catalog must not be empty")]
    EmptyCatalog,
    #[error("status catalog lists {0} more than once")]
    DuplicateStatus(String),
}
