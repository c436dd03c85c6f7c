//! Aristas de transición (propiedad del backend) y la vista derivada
//! `StatusOption` que consumen los widgets.
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::status::LeadStatus;

/// Peso máximo admitido para una arista.
pub const MAX_WEIGHT: u8 = 100;

/// Descripción de las opciones que no tienen arista recomendada.
pub const MANUAL_CHANGE_DESCRIPTION: &str = "Manual status change";

/// Movimiento recomendado entre dos estados. El peso es una prioridad
/// relativa (no una probabilidad; no tiene por qué sumar 100).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEdge {
    pub from_status: LeadStatus,
    pub to_status: LeadStatus,
    pub weight: u8,
    pub description: String,
}

impl TransitionEdge {
    pub fn new(from_status: LeadStatus,
               to_status: LeadStatus,
               weight: u32,
               description: impl Into<String>)
               -> Result<Self, DomainError> {
        if weight > MAX_WEIGHT as u32 {
            return Err(DomainError::WeightOutOfRange(weight));
        }
        Ok(Self { from_status,
                  to_status,
                  weight: weight as u8,
                  description: description.into() })
    }

    /// Comprueba el invariante de peso (útil para datos deserializados).
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.weight > MAX_WEIGHT {
            return Err(DomainError::WeightOutOfRange(self.weight as u32));
        }
        Ok(())
    }
}

/// Opción de cambio de estado lista para mostrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOption {
    pub to_status: LeadStatus,
    pub weight: u8,
    pub description: String,
    pub is_valid: bool,
}

impl StatusOption {
    /// Opción respaldada por una arista del backend.
    pub fn from_edge(edge: &TransitionEdge) -> Self {
        Self { to_status: edge.to_status,
               weight: edge.weight,
               description: edge.description.clone(),
               is_valid: true }
    }

    /// Opción manual (sin arista): peso 0 y descripción fija.
    pub fn manual(to_status: LeadStatus) -> Self {
        Self { to_status,
               weight: 0,
               description: MANUAL_CHANGE_DESCRIPTION.to_string(),
               is_valid: false }
    }
}
