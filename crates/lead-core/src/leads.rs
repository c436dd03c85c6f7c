//! Copia local de los leads visibles (la página cargada por la vista).
//!
//! El executor lee aquí el estado actual y escribe el nuevo estado de forma
//! optimista tras un commit exitoso.
use chrono::Utc;
use dashmap::DashMap;
use lead_domain::{Lead, LeadId, LeadStatus};

#[derive(Debug, Default)]
pub struct LeadBook {
    leads: DashMap<LeadId, Lead>,
}

impl LeadBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra (o reemplaza) un lead y devuelve el estado anterior si
    /// ya estaba registrado.
    pub fn upsert(&self, lead: Lead) -> Option<LeadStatus> {
        self.leads.insert(lead.id, lead).map(|prev| prev.status)
    }

    pub fn get(&self, lead_id: &LeadId) -> Option<Lead> {
        self.leads.get(lead_id).map(|l| l.value().clone())
    }

    pub fn status_of(&self, lead_id: &LeadId) -> Option<LeadStatus> {
        self.leads.get(lead_id).map(|l| l.status)
    }

    /// Escribe el estado local; devuelve el lead actualizado.
    pub fn apply_status(&self, lead_id: &LeadId, status: LeadStatus) -> Option<Lead> {
        let mut lead = self.leads.get_mut(lead_id)?;
        lead.status = status;
        lead.updated_at = Some(Utc::now());
        Some(lead.clone())
    }

    pub fn remove(&self, lead_id: &LeadId) -> Option<Lead> {
        self.leads.remove(lead_id).map(|(_, lead)| lead)
    }

    pub fn clear(&self) {
        self.leads.clear();
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }
}
