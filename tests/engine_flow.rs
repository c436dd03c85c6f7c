use std::sync::Arc;

use lead_core::{SlotState, TransitionEngine, TransitionEvent};
use lead_domain::{Lead, LeadStatus};
use leadflow_rust::InMemoryBackend;

async fn seeded_page(backend: &InMemoryBackend) -> Vec<Lead> {
    let leads = vec![Lead::new("12 Maple St", LeadStatus::ProspectFound),
                     Lead::new("40 Oak Ave", LeadStatus::ProposalSent),
                     Lead::new("7 Cedar Ln", LeadStatus::ClosedWon)];
    for lead in &leads {
        backend.insert_lead(lead.clone()).await;
    }
    backend.page().await
}

#[tokio::test]
async fn page_load_ranks_every_lead_from_one_batch() {
    let backend = InMemoryBackend::seeded();
    let page = seeded_page(&backend).await;
    let engine = TransitionEngine::new(Arc::new(backend.clone()));
    engine.verify_catalog().await.expect("seeded backend shares the catalog");

    let report = engine.load_page(page.clone()).await;
    assert_eq!(report.requested, 3);
    assert_eq!(report.fetched.len(), 3);

    for lead in &page {
        let options = engine.get_transitions_for_lead(&lead.id).expect("populated");
        assert_eq!(options.len(), LeadStatus::ALL.len() - 1);
        assert!(options.iter().all(|o| o.to_status != lead.status));
    }

    let proposal = page.iter().find(|l| l.status == LeadStatus::ProposalSent).unwrap();
    assert_eq!(engine.suggested_status(&proposal.id), Some(LeadStatus::Negotiating));

    // sin aristas salientes: todas las opciones son manuales y no hay sugerencia
    let won = page.iter().find(|l| l.status == LeadStatus::ClosedWon).unwrap();
    let options = engine.get_transitions_for_lead(&won.id).unwrap();
    assert!(options.iter().all(|o| !o.is_valid && o.weight == 0));
    assert_eq!(engine.suggested_status(&won.id), None);
}

#[tokio::test]
async fn set_status_commits_remotely_and_refreshes_suggestions() {
    let backend = InMemoryBackend::seeded();
    let page = seeded_page(&backend).await;
    let engine = TransitionEngine::new(Arc::new(backend.clone()));
    engine.load_page(page.clone()).await;
    let mut events = engine.subscribe();

    let prospect = page.iter().find(|l| l.status == LeadStatus::ProspectFound).unwrap();
    let updated = engine.set_status(prospect.id, LeadStatus::Contacted).await.unwrap();
    assert_eq!(updated.status, LeadStatus::Contacted);
    assert_eq!(backend.lead(&prospect.id).await.unwrap().status, LeadStatus::Contacted);
    assert_eq!(engine.cache_state(&prospect.id), SlotState::Absent);

    let event = events.recv().await.unwrap();
    assert!(matches!(event, TransitionEvent::Invalidated { lead_id } if lead_id == prospect.id));

    engine.load_transitions_for_leads([prospect.id]).await;
    assert_eq!(engine.suggested_status(&prospect.id), Some(LeadStatus::Responded));
}

#[tokio::test]
async fn remote_edit_is_picked_up_on_next_page_load() {
    let backend = InMemoryBackend::seeded();
    let page = seeded_page(&backend).await;
    let engine = TransitionEngine::new(Arc::new(backend.clone()));
    engine.load_page(page.clone()).await;

    let lead = page.iter().find(|l| l.status == LeadStatus::ProspectFound).unwrap();
    backend.force_status(lead.id, LeadStatus::Negotiating).await.unwrap();

    engine.load_page(backend.page().await).await;
    assert_eq!(engine.lead(&lead.id).unwrap().status, LeadStatus::Negotiating);
    assert_eq!(engine.suggested_status(&lead.id), Some(LeadStatus::UnderContract));
}
