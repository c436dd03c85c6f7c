
use std::sync::Arc;
use std::time::Duration;

use lead_core::{EngineConfig, SlotState, TransitionEngine, TransitionEvent};
use lead_domain::{LeadStatus, StatusCatalog, StatusOption};
use test_support::{engine_for, leads, settle_until, ScriptedBackend};

#[tokio::test]
async fn second_batch_only_fetches_uncached_ids() {
    let backend = ScriptedBackend::new().with_edge(LeadStatus::ProspectFound, LeadStatus::Contacted, 80, "call");
    let engine = engine_for(&backend);
    let page = leads(&backend, &[LeadStatus::ProspectFound, LeadStatus::ProspectFound, LeadStatus::Contacted]);
    let (a, b, c) = (page[0].id, page[1].id, page[2].id);
    engine.register_leads(page);

    let first = engine.load_transitions_for_leads(vec![a, b]).await;
    assert_eq!(first.fetched.len(), 2);
    let second = engine.load_transitions_for_leads(vec![a, b, c]).await;

    assert_eq!(backend.batch_calls(), vec![vec![a, b], vec![c]]);
    assert_eq!(second.fetched, vec![c]);
    assert_eq!(second.skipped, vec![a, b]);

    // Un tercer pedido totalmente cacheado no toca la red
    let third = engine.load_transitions_for_leads(vec![c, a, a]).await;
    assert!(!third.issued_request());
    assert_eq!(third.requested, 2);
    assert_eq!(backend.batch_calls().len(), 2);
}

#[tokio::test]
async fn concurrent_loads_of_same_id_issue_one_call() {
    let backend = ScriptedBackend::new();
    backend.set_latency(Duration::from_millis(20));
    let engine = engine_for(&backend);
    let page = leads(&backend, &[LeadStatus::Contacted]);
    let a = page[0].id;
    engine.register_leads(page);

    let (r1, r2) = tokio::join!(engine.load_transitions_for_leads(vec![a]), engine.load_transitions_for_leads(vec![a]));

    assert_eq!(backend.batch_calls(), vec![vec![a]]);
    assert_eq!(r1.fetched, vec![a]);
    assert_eq!(r2.skipped, vec![a]);
    assert!(engine.get_transitions_for_lead(&a).is_some());
}

#[tokio::test]
async fn caller_sees_loading_while_other_batch_is_in_flight() {
    let backend = ScriptedBackend::new();
    let gate = backend.close_gate();
    let engine = Arc::new(engine_for(&backend));
    let page = leads(&backend, &[LeadStatus::Responded, LeadStatus::Interested]);
    let (a, b) = (page[0].id, page[1].id);
    engine.register_leads(page);

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.load_transitions_for_leads(vec![a]).await })
    };
    settle_until(|| engine.is_lead_loading(&a)).await;

    // Solapado: solo `b` viaja en una segunda llamada
    let second = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.load_transitions_for_leads(vec![a, b]).await })
    };
    settle_until(|| backend.batch_calls().len() == 2).await;
    assert_eq!(backend.batch_calls(), vec![vec![a], vec![b]]);
    assert_eq!(engine.get_transitions_for_lead(&a), None);

    gate.add_permits(2);
    let (r1, r2) = (first.await.unwrap(), second.await.unwrap());
    assert_eq!(r1.fetched, vec![a]);
    assert_eq!(r2.fetched, vec![b]);
    assert_eq!(r2.skipped, vec![a]);
    assert_eq!(engine.cache_state(&a), SlotState::Populated);
    assert_eq!(engine.cache_state(&b), SlotState::Populated);
}

#[tokio::test]
async fn lead_omitted_by_backend_gets_default_options() {
    let backend = ScriptedBackend::new().with_edge(LeadStatus::ProspectFound, LeadStatus::Contacted, 80, "d1");
    let engine = engine_for(&backend);
    let page = leads(&backend, &[LeadStatus::ProspectFound, LeadStatus::ProspectFound]);
    let (l1, l2) = (page[0].id, page[1].id);
    backend.omit(l2);

    let report = engine.load_page(page).await;
    assert_eq!(report.fetched, vec![l1, l2]);

    let with_edges = engine.get_transitions_for_lead(&l1).unwrap();
    assert!(with_edges[0].is_valid);
    assert_eq!(engine.suggested_status(&l1), Some(LeadStatus::Contacted));

    let defaults = engine.get_transitions_for_lead(&l2).unwrap();
    assert_eq!(defaults.len(), engine.catalog().len() - 1);
    assert!(defaults.iter().all(|o| !o.is_valid));
    assert!(!engine.is_lead_loading(&l2));
    assert_eq!(engine.suggested_status(&l2), None);
}

#[tokio::test]
async fn failed_batch_returns_ids_to_absent_and_retries() {
    let backend = ScriptedBackend::new();
    backend.fail_next_batches(1);
    let engine = engine_for(&backend);
    let page = leads(&backend, &[LeadStatus::Negotiating, LeadStatus::UnderContract]);
    let ids: Vec<_> = page.iter().map(|l| l.id).collect();
    let mut events = engine.subscribe();

    let failed = engine.load_page(page).await;
    assert_eq!(failed.failed, ids);
    assert!(failed.fetched.is_empty());
    for id in &ids {
        assert_eq!(engine.cache_state(id), SlotState::Absent);
    }
    assert!(matches!(events.recv().await.unwrap(), TransitionEvent::Loading { .. }));
    assert!(matches!(events.recv().await.unwrap(), TransitionEvent::LoadFailed { .. }));

    let retried = engine.load_transitions_for_leads(ids.clone()).await;
    assert_eq!(retried.fetched, ids);
    assert_eq!(backend.batch_calls().len(), 2);
}

#[tokio::test]
async fn slow_batch_times_out_as_failure() {
    let backend = ScriptedBackend::new();
    backend.set_latency(Duration::from_millis(200));
    let config = EngineConfig::default().with_fetch_timeout(Duration::from_millis(20));
    let engine = TransitionEngine::builder(backend.clone()).config(config).build();
    let page = leads(&backend, &[LeadStatus::Contacted]);
    let a = page[0].id;

    let report = engine.load_page(page).await;
    assert_eq!(report.failed, vec![a]);
    assert_eq!(engine.cache_state(&a), SlotState::Absent);
}

#[tokio::test]
async fn unregistered_lead_without_edges_is_populated_once() {
    let backend = ScriptedBackend::new().with_edge(LeadStatus::ProspectFound, LeadStatus::Contacted, 80, "d1");
    let engine = engine_for(&backend);
    // solo ids: la vista no registró los leads
    let page = leads(&backend, &[LeadStatus::ProspectFound, LeadStatus::ProspectFound]);
    let (l1, l2) = (page[0].id, page[1].id);
    backend.omit(l2);

    let first = engine.load_transitions_for_leads(vec![l1, l2]).await;
    assert_eq!(first.fetched, vec![l1, l2]);
    assert!(first.failed.is_empty());
    for _ in 0..2 {
        let again = engine.load_transitions_for_leads(vec![l1, l2]).await;
        assert!(!again.issued_request());
    }

    assert_eq!(backend.batch_calls(), vec![vec![l1, l2]]);
    assert_eq!(engine.cache_state(&l2), SlotState::Populated);
    assert_eq!(engine.get_transitions_for_lead(&l2), Some(Vec::new()));
    assert_eq!(engine.suggested_status(&l2), None);
    // el estado de l1 se deduce del origen de sus aristas
    assert_eq!(engine.suggested_status(&l1), Some(LeadStatus::Contacted));
}

#[tokio::test]
async fn aborted_prefetch_returns_claim_to_absent() {
    let backend = ScriptedBackend::new().with_edge(LeadStatus::Contacted, LeadStatus::Responded, 60, "reply");
    let gate = backend.close_gate();
    let engine = engine_for(&backend);
    let page = leads(&backend, &[LeadStatus::Contacted]);
    let a = page[0].id;
    let ids = engine.register_leads(page);

    let handle = engine.prefetch(ids);
    settle_until(|| backend.batch_calls().len() == 1).await;
    assert!(engine.is_lead_loading(&a));
    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());
    assert_eq!(engine.cache_state(&a), SlotState::Absent);

    gate.add_permits(1);
    let report = engine.load_transitions_for_leads(vec![a]).await;
    assert_eq!(report.fetched, vec![a]);
    assert_eq!(backend.batch_calls().len(), 2);
    assert_eq!(engine.suggested_status(&a), Some(LeadStatus::Responded));
}

#[tokio::test]
async fn load_dropped_by_caller_timeout_can_be_retried() {
    let backend = ScriptedBackend::new();
    let gate = backend.close_gate();
    let engine = engine_for(&backend);
    let page = leads(&backend, &[LeadStatus::Negotiating]);
    let a = page[0].id;
    engine.register_leads(page);

    let outcome = tokio::time::timeout(Duration::from_millis(10), engine.load_transitions_for_leads(vec![a])).await;
    assert!(outcome.is_err());
    assert!(!engine.is_lead_loading(&a));

    gate.add_permits(1);
    let report = engine.load_transitions_for_leads(vec![a]).await;
    assert_eq!(report.fetched, vec![a]);
}

#[tokio::test]
async fn lead_outside_catalog_is_rejected_before_any_fetch() {
    let backend = ScriptedBackend::new();
    let catalog = StatusCatalog::parse_list("contacted,responded,interested").unwrap();
    let engine = TransitionEngine::builder(backend.clone()).catalog(catalog).build();
    let page = leads(&backend, &[LeadStatus::ProspectFound, LeadStatus::Contacted]);
    let (outside, inside) = (page[0].id, page[1].id);
    engine.register_leads(page);

    let report = engine.load_transitions_for_leads(vec![outside, inside]).await;
    assert_eq!(report.failed, vec![outside]);
    assert_eq!(report.fetched, vec![inside]);
    assert_eq!(backend.batch_calls(), vec![vec![inside]]);
    assert_eq!(engine.cache_state(&outside), SlotState::Absent);
    assert_eq!(engine.get_transitions_for_lead(&inside).map(|o| o.len()), Some(2));

    // la ruta individual rechaza igual, sin llamar al backend
    assert_eq!(engine.resolve_transitions(&outside).await, None);
    assert!(backend.single_calls().is_empty());
}

#[tokio::test]
async fn invalidation_during_flight_drops_stale_result() {
    let backend = ScriptedBackend::new().with_edge(LeadStatus::Contacted, LeadStatus::Responded, 60, "reply");
    let gate = backend.close_gate();
    let engine = Arc::new(engine_for(&backend));
    let page = leads(&backend, &[LeadStatus::Contacted]);
    let a = page[0].id;
    engine.register_leads(page);

    let task = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.load_transitions_for_leads(vec![a]).await })
    };
    settle_until(|| backend.batch_calls().len() == 1).await;
    engine.clear_cache();
    gate.add_permits(1);

    let report = task.await.unwrap();
    assert!(report.fetched.is_empty());
    assert_eq!(engine.get_transitions_for_lead(&a), None);
}

#[tokio::test]
async fn resolve_waits_for_batch_instead_of_fetching() {
    let backend = ScriptedBackend::new().with_edge(LeadStatus::Interested, LeadStatus::MeetingScheduled, 90, "book a visit");
    let gate = backend.close_gate();
    let engine = Arc::new(engine_for(&backend));
    let page = leads(&backend, &[LeadStatus::Interested]);
    let a = page[0].id;
    engine.register_leads(page);

    let batch = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.load_transitions_for_leads(vec![a]).await })
    };
    settle_until(|| engine.is_lead_loading(&a)).await;

    let widget = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.resolve_transitions(&a).await })
    };
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(backend.single_calls().is_empty(), "widget must not fall back while loading");

    gate.add_permits(1);
    batch.await.unwrap();
    let options: Vec<StatusOption> = widget.await.unwrap().expect("options after batch");
    assert_eq!(options[0].to_status, LeadStatus::MeetingScheduled);
    assert!(backend.single_calls().is_empty());
}

#[tokio::test]
async fn resolve_falls_back_to_single_fetch_when_absent() {
    let backend = ScriptedBackend::new().with_edge(LeadStatus::ProposalSent, LeadStatus::Negotiating, 75, "counter");
    let engine = engine_for(&backend);
    let page = leads(&backend, &[LeadStatus::ProposalSent]);
    let a = page[0].id;
    engine.register_leads(page);

    let options = engine.resolve_transitions(&a).await.unwrap();
    assert_eq!(backend.single_calls(), vec![LeadStatus::ProposalSent]);
    assert!(backend.batch_calls().is_empty());
    assert_eq!(options[0].to_status, LeadStatus::Negotiating);

    // ya poblado: una segunda lectura no llama al backend
    assert_eq!(engine.resolve_transitions(&a).await, Some(options));
    assert_eq!(backend.single_calls().len(), 1);
}

#[tokio::test]
async fn prefetch_runs_in_background() {
    let backend = ScriptedBackend::new();
    let engine = engine_for(&backend);
    let page = leads(&backend, &[LeadStatus::ClosedWon]);
    let a = page[0].id;
    let ids = engine.register_leads(page);

    let report = engine.prefetch(ids).await.unwrap();
    assert_eq!(report.fetched, vec![a]);
    assert_eq!(engine.get_transitions_for_lead(&a).map(|o| o.len()), Some(9));
}
