//! lead-policies – ranking de sugerencias de cambio de estado
//!
//! Provee el contrato `SuggestionPolicy` y la implementación por peso
//! (`WeightRanker`). Dado el estado actual y sus aristas salientes produce la
//! lista completa de opciones: una por cada estado del catálogo excepto el
//! actual, primero las transiciones válidas por peso descendente y después
//! las manuales. Es puro y determinista: misma entrada, misma salida.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use lead_domain::{LeadStatus, StatusCatalog, StatusOption, TransitionEdge};
use log::{debug, warn};

/// Contrato de políticas de ranking deterministas.
pub trait SuggestionPolicy: Send + Sync {
    fn id(&self) -> &'static str;
    fn rank(&self, catalog: &StatusCatalog, current: LeadStatus, edges: &[TransitionEdge]) -> Vec<StatusOption>;
}

/// Política: válidas primero por peso desc; desempate por orden de catálogo.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightRanker;

impl WeightRanker {
    pub fn new() -> Self {
        Self
    }
}

impl SuggestionPolicy for WeightRanker {
    fn id(&self) -> &'static str {
        "weight_desc"
    }

    fn rank(&self, catalog: &StatusCatalog, current: LeadStatus, edges: &[TransitionEdge]) -> Vec<StatusOption> {
        let lookup = edge_lookup(catalog, current, edges);

        let mut options: Vec<StatusOption> = catalog.statuses()
                                                    .iter()
                                                    .filter(|st| **st != current)
                                                    .map(|st| match lookup.get(st) {
                                                        Some(edge) => StatusOption::from_edge(edge),
                                                        None => StatusOption::manual(*st),
                                                    })
                                                    .collect();
        // sort_by es estable: a igualdad de (validez, peso) se conserva el orden del catálogo
        options.sort_by(|a, b| b.is_valid.cmp(&a.is_valid).then(b.weight.cmp(&a.weight)));
        options
    }
}

/// Índice `to_status -> arista`, descartando aristas que no aplican.
/// Con aristas repetidas hacia el mismo destino gana la de mayor peso (la
/// primera en caso de empate).
fn edge_lookup<'a>(catalog: &StatusCatalog,
                   current: LeadStatus,
                   edges: &'a [TransitionEdge])
                   -> HashMap<LeadStatus, &'a TransitionEdge> {
    let mut lookup: HashMap<LeadStatus, &TransitionEdge> = HashMap::with_capacity(edges.len());
    for edge in edges {
        if edge.from_status != current {
            debug!("ignoring edge {} -> {}: lead is at {}", edge.from_status, edge.to_status, current);
            continue;
        }
        if edge.to_status == current {
            continue;
        }
        if !catalog.contains(edge.to_status) {
            // Deriva de catálogo: el backend conoce un estado que el cliente no lista.
            warn!("edge {} -> {} dropped: target not in client catalog", edge.from_status, edge.to_status);
            continue;
        }
        match lookup.entry(edge.to_status) {
            Entry::Vacant(slot) => {
                slot.insert(edge);
            }
            Entry::Occupied(mut slot) => {
                if edge.weight > slot.get().weight {
                    slot.insert(edge);
                }
            }
        }
    }
    lookup
}

/// Ranking con la política por defecto.
pub fn rank(catalog: &StatusCatalog, current: LeadStatus, edges: &[TransitionEdge]) -> Vec<StatusOption> {
    WeightRanker.rank(catalog, current, edges)
}

/// Estado sugerido: la primera opción si es una transición válida.
pub fn suggested_status(options: &[StatusOption]) -> Option<LeadStatus> {
    options.first().filter(|o| o.is_valid).map(|o| o.to_status)
}
