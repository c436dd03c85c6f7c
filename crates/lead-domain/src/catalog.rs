//! Catálogo ordenado de estados usado para construir las opciones.
//!
//! Normalmente coincide con `LeadStatus::ALL`, pero puede configurarse como
//! un subconjunto (el backend es dueño del catálogo real). El orden es
//! determinista y sirve de desempate en el ranking.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::status::LeadStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCatalog {
    statuses: Vec<LeadStatus>,
}

impl StatusCatalog {
    /// Construye un catálogo validando que no esté vacío ni repita estados.
    pub fn new(statuses: Vec<LeadStatus>) -> Result<Self, DomainError> {
        if statuses.is_empty() {
            return Err(DomainError::EmptyCatalog);
        }
        let mut seen = HashSet::new();
        for st in &statuses {
            if !seen.insert(*st) {
                return Err(DomainError::DuplicateStatus(st.to_string()));
            }
        }
        Ok(Self { statuses })
    }

    /// Parsea una lista separada por comas (`"prospect_found,contacted"`).
    pub fn parse_list(raw: &str) -> Result<Self, DomainError> {
        let statuses = raw.split(',')
                          .map(str::trim)
                          .filter(|s| !s.is_empty())
                          .map(str::parse::<LeadStatus>)
                          .collect::<Result<Vec<_>, _>>()?;
        Self::new(statuses)
    }

    pub fn statuses(&self) -> &[LeadStatus] {
        &self.statuses
    }

    pub fn contains(&self, status: LeadStatus) -> bool {
        self.statuses.contains(&status)
    }

    /// Posición en el catálogo (orden de desempate).
    pub fn position(&self, status: LeadStatus) -> Option<usize> {
        self.statuses.iter().position(|s| *s == status)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.statuses.iter().map(LeadStatus::as_str).collect()
    }
}

impl Default for StatusCatalog {
    fn default() -> Self {
        Self { statuses: LeadStatus::ALL.to_vec() }
    }
}
