//! Frontera de I/O con el backend remoto.
//!
//! El host entrega una implementación ya autenticada; el motor solo conoce
//! estas cuatro operaciones (forma, no transporte).
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use lead_domain::{CommitOutcome, LeadId, LeadStatus, TransitionEdge};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("caller is not authenticated")]
    Unauthorized,
    #[error("backend rejected request: {0}")]
    Rejected(String),
    #[error("malformed backend payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait TransitionBackend: Send + Sync {
    /// Aristas salientes de un estado, ordenadas por peso descendente.
    async fn get_edges_for_status(&self, status: LeadStatus) -> Result<Vec<TransitionEdge>, BackendError>;

    /// Aristas por lead; el backend resuelve el estado actual de cada lead.
    /// Los leads sin aristas pueden omitirse del mapa.
    async fn get_edges_batch(&self, lead_ids: &[LeadId]) -> Result<HashMap<LeadId, Vec<TransitionEdge>>, BackendError>;

    async fn commit_status(&self, lead_id: LeadId, new_status: LeadStatus) -> Result<CommitOutcome, BackendError>;

    /// Nombres de estado que conoce el backend (para detectar deriva de
    /// catálogo al arrancar).
    async fn list_statuses(&self) -> Result<Vec<String>, BackendError>;
}

/// Ejecuta una llamada al backend con límite de tiempo; la expiración cuenta
/// como fallo.
pub(crate) async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, BackendError>
    where F: Future<Output = Result<T, BackendError>>
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout(timeout)),
    }
}
