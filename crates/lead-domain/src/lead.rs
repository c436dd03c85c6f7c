//! Identidad del lead y la porción de la entidad que el motor lee/escribe.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::status::LeadStatus;

/// Identificador de lead (UUID asignado por el store remoto).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(Uuid);

impl LeadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LeadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for LeadId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
                                 .map_err(|_| DomainError::MalformedLeadId(s.to_string()))
    }
}

/// Lead tal como lo ve el motor. El resto de campos del store remoto
/// (contacto, notas, imágenes) no se modelan aquí.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub status: LeadStatus,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Lead {
    pub fn new(name: impl Into<String>, status: LeadStatus) -> Self {
        Self { id: LeadId::new(),
               name: name.into(),
               status,
               updated_at: None }
    }

    pub fn with_id(id: LeadId, name: impl Into<String>, status: LeadStatus) -> Self {
        Self { id,
               name: name.into(),
               status,
               updated_at: None }
    }
}

/// Respuesta de `commit_status` en el backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead: Option<Lead>,
}

impl CommitOutcome {
    pub fn ok(lead: Option<Lead>) -> Self {
        Self { success: true, error: None, lead }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self { success: false,
               error: Some(message.into()),
               lead: None }
    }
}
