// src/convert/value_sets.rs
//! Registers every value_set a parser declares or matches against.

use crate::{
    descriptor::ValueSetRegistry,
    error::{ConvertError, Result},
    ir::{ParserGraph, Pattern, Transition, ValueSet},
};

/// Declarations first, then references in state/case order.
fn value_sets_in(graph: &ParserGraph) -> impl Iterator<Item = &ValueSet> {
    let referenced = graph
        .states
        .iter()
        .filter_map(|s| match &s.transition {
            Some(Transition::Select(sel)) => Some(sel),
            _ => None,
        })
        .flat_map(|sel| sel.cases.iter())
        .flat_map(|c| c.patterns.iter())
        .filter_map(|p| match p {
            Pattern::ValueSet(vs) => Some(vs),
            _ => None,
        });
    graph.value_sets.iter().chain(referenced)
}

pub fn register_value_sets(parser: &str, graph: &ParserGraph, registry: &mut ValueSetRegistry) -> Result<()> {
    for vs in value_sets_in(graph) {
        match registry.register(&vs.name, vs.width, vs.capacity) {
            Ok(true) => log::debug!(
                "parser `{parser}`: value_set `{}` ({} bits, {} entries)",
                vs.name,
                vs.width,
                vs.capacity
            ),
            Ok(false) => {}
            Err(conflict) => {
                return Err(ConvertError::ConflictingLookupTableWidth {
                    parser: parser.to_owned(),
                    name: vs.name.clone(),
                    existing: conflict.existing,
                    requested: conflict.requested,
                });
            }
        }
    }
    Ok(())
}
