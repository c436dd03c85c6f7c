//! Demo de línea de comandos: siembra leads, carga sus transiciones en un
//! solo lote, muestra las sugerencias y aplica un cambio de estado.
use std::sync::Arc;

use lead_core::{TransitionEngine, TransitionEvent};
use lead_domain::{Lead, LeadStatus};
use leadflow_rust::config::CONFIG;
use leadflow_rust::errors::CoreError;
use leadflow_rust::InMemoryBackend;
use log::{error, info, warn};

const STREETS: &[&str] = &["Maple St", "Oak Ave", "Cedar Ln", "Birch Rd", "Elm Ct", "Pine Way"];

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run().await {
        error!("demo failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CoreError> {
    let config = CONFIG.as_ref().map_err(|e| CoreError::Config(e.clone()))?;
    let backend = InMemoryBackend::seeded();
    for i in 0..config.demo_leads {
        let street = STREETS[i % STREETS.len()];
        let status = LeadStatus::ALL[i % LeadStatus::ALL.len()];
        backend.insert_lead(Lead::new(format!("{} {}", 100 + i, street), status)).await;
    }

    let engine = TransitionEngine::builder(Arc::new(backend.clone())).config(config.engine.clone())
                                                                     .build();

    if let Err(e) = engine.verify_catalog().await {
        if cfg!(feature = "strict_catalog") {
            return Err(e.into());
        }
        warn!("continuing with local catalog: {e}");
    }

    let mut events = engine.subscribe();
    let page = backend.page().await;
    let report = engine.load_page(page.clone()).await;
    info!("page loaded: requested={} fetched={} failed={}",
          report.requested,
          report.fetched.len(),
          report.failed.len());

    for lead in &page {
        let options = engine.get_transitions_for_lead(&lead.id).unwrap_or_default();
        let suggested = engine.suggested_status(&lead.id)
                              .map(|s| s.to_string())
                              .unwrap_or_else(|| "-".into());
        println!("{:<16} {:<18} suggested={}", lead.name, lead.status, suggested);
        for opt in options.iter().filter(|o| o.is_valid) {
            println!("    -> {:<18} {:>3}  {}", opt.to_status, opt.weight, opt.description);
        }
    }

    let target = page.iter()
                     .find_map(|lead| engine.suggested_status(&lead.id).map(|s| (lead.id, s)));
    if let Some((lead_id, status)) = target {
        let updated = engine.set_status(lead_id, status).await?;
        println!("\nupdated {} to {}", updated.name, updated.status);
        let report = engine.load_transitions_for_leads([lead_id]).await;
        info!("refetched after update: fetched={}", report.fetched.len());
        if let Some(next) = engine.suggested_status(&lead_id) {
            println!("next suggestion for {}: {}", updated.name, next);
        }
    }

    while let Ok(event) = events.try_recv() {
        if let TransitionEvent::StatusChanged { lead_id, from, to } = event {
            info!("status changed: {lead_id} {from} -> {to}");
        }
    }
    Ok(())
}
