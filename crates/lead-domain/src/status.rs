//! Enumeración cerrada de etapas del pipeline de un lead.
//!
//! El orden de declaración es el orden canónico del catálogo y actúa como
//! desempate al ordenar sugerencias, por lo que no debe reordenarse.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Lead detectado, aún sin contacto.
    ProspectFound,
    /// Primer mensaje enviado.
    Contacted,
    /// El lead respondió.
    Responded,
    Interested,
    MeetingScheduled,
    ProposalSent,
    Negotiating,
    UnderContract,
    ClosedWon,
    ClosedLost,
}

impl LeadStatus {
    /// Todas las etapas en orden de pipeline.
    pub const ALL: [LeadStatus; 10] = [LeadStatus::ProspectFound,
                                       LeadStatus::Contacted,
                                       LeadStatus::Responded,
                                       LeadStatus::Interested,
                                       LeadStatus::MeetingScheduled,
                                       LeadStatus::ProposalSent,
                                       LeadStatus::Negotiating,
                                       LeadStatus::UnderContract,
                                       LeadStatus::ClosedWon,
                                       LeadStatus::ClosedLost];

    /// Nombre estable usado en el contrato con el backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::ProspectFound => "prospect_found",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Responded => "responded",
            LeadStatus::Interested => "interested",
            LeadStatus::MeetingScheduled => "meeting_scheduled",
            LeadStatus::ProposalSent => "proposal_sent",
            LeadStatus::Negotiating => "negotiating",
            LeadStatus::UnderContract => "under_contract",
            LeadStatus::ClosedWon => "closed_won",
            LeadStatus::ClosedLost => "closed_lost",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, LeadStatus::ClosedWon | LeadStatus::ClosedLost)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        LeadStatus::ALL.iter()
                       .copied()
                       .find(|st| st.as_str() == needle)
                       .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_from_str() {
        for st in LeadStatus::ALL {
            assert_eq!(st.as_str().parse::<LeadStatus>().unwrap(), st);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "archived".parse::<LeadStatus>().unwrap_err();
        assert_eq!(err, DomainError::UnknownStatus("archived".into()));
    }

    #[test]
    fn serde_uses_snake_case() {
        let v = serde_json::to_value(LeadStatus::MeetingScheduled).unwrap();
        assert_eq!(v, serde_json::json!("meeting_scheduled"));
    }
}
