//! Tabla de aristas por defecto del pipeline de prospección inmobiliaria.
//! Los pesos son prioridades relativas por estado de origen.
use lead_domain::LeadStatus::{self, *};
use lead_domain::TransitionEdge;

const PIPELINE: &[(LeadStatus, LeadStatus, u32, &str)] = &[
    (ProspectFound, Contacted, 90, "Send the first outreach text"),
    (ProspectFound, ClosedLost, 10, "Not a fit for this market"),
    (Contacted, Responded, 70, "Owner replied to outreach"),
    (Contacted, ClosedLost, 20, "No answer after follow-ups"),
    (Responded, Interested, 65, "Owner open to an offer"),
    (Responded, ClosedLost, 30, "Owner declined"),
    (Interested, MeetingScheduled, 80, "Book a property walkthrough"),
    (Interested, ClosedLost, 15, "Went cold"),
    (MeetingScheduled, ProposalSent, 75, "Send written offer"),
    (MeetingScheduled, Interested, 20, "Meeting postponed"),
    (ProposalSent, Negotiating, 60, "Counter-offer received"),
    (ProposalSent, UnderContract, 30, "Offer accepted as sent"),
    (ProposalSent, ClosedLost, 20, "Offer rejected"),
    (Negotiating, UnderContract, 70, "Terms agreed"),
    (Negotiating, ClosedLost, 25, "Negotiation fell through"),
    (UnderContract, ClosedWon, 85, "Closing completed"),
    (UnderContract, ClosedLost, 10, "Contract cancelled"),
    (ClosedLost, ProspectFound, 5, "Re-open as new prospect"),
];

/// Aristas sembradas del pipeline.
pub fn pipeline_edges() -> Vec<TransitionEdge> {
    PIPELINE.iter()
            .filter_map(|(from, to, weight, desc)| TransitionEdge::new(*from, *to, *weight, *desc).ok())
            .collect()
}
