// src/convert/mod.rs
//! Parser graph -> parser descriptor.
//!
//! One pass over the states in declared order. Value sets are registered
//! first, then each state becomes a record of its ops, its select key and
//! its transitions. Nothing is merged into the program until the whole
//! parser converted.

pub mod combine;
pub mod expr;
pub mod field;
pub mod naming;
pub mod select;
pub mod stmt;
pub mod value_sets;

use std::time::Instant;

use hashbrown::HashSet;

use crate::{
    config::ConvertOptions,
    descriptor::{ParserDescriptor, Program, StateRecord, TransitionRecord, ValueSetRegistry},
    error::{ConvertError, Result, Site},
    ir::{NextState, ParserGraph, StateId, Transition},
};
use naming::StateNames;
use select::{SelectOutput, convert_select};
use stmt::StatementEmitter;
use value_sets::register_value_sets;

/// A converted parser with the value sets it registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedParser {
    pub descriptor: ParserDescriptor,
    pub value_sets: ValueSetRegistry,
}

fn successors(t: Option<&Transition>) -> Vec<NextState> {
    match t {
        None => Vec::new(),
        Some(Transition::Direct(next)) => vec![*next],
        Some(Transition::Select(sel)) => sel.cases.iter().map(|c| c.next).collect(),
    }
}

fn warn_unreachable(parser: &str, graph: &ParserGraph) {
    let mut seen: HashSet<usize> = HashSet::new();
    let mut stack = vec![graph.start];
    while let Some(StateId(i)) = stack.pop() {
        let Some(state) = graph.states.get(i) else {
            continue;
        };
        if !seen.insert(i) {
            continue;
        }
        for next in successors(state.transition.as_ref()) {
            if let NextState::State(id) = next {
                stack.push(id);
            }
        }
    }
    for (i, s) in graph.states.iter().enumerate() {
        if !seen.contains(&i) {
            log::warn!("parser `{parser}`: state `{}` is unreachable from the start state", s.name);
        }
    }
}

/// Converts one parser; the descriptor id is `id`.
pub fn convert_parser(graph: &ParserGraph, id: u32, opts: &ConvertOptions) -> Result<ConvertedParser> {
    let t0 = Instant::now();
    let parser = opts.parser_name.as_deref().unwrap_or(&graph.name);

    let mut value_sets = ValueSetRegistry::new();
    register_value_sets(parser, graph, &mut value_sets)?;

    let names = StateNames::new(parser, graph)?;
    if opts.check_reachability {
        warn_unreachable(parser, graph);
    }

    let mut parse_states = Vec::with_capacity(graph.states.len());
    for (i, state) in graph.states.iter().enumerate() {
        let name = names.state_name(StateId(i))?;
        let site = Site::new(parser, name);

        let parser_ops = StatementEmitter::new(&site).convert_all(&state.statements)?;
        let SelectOutput { keys, transitions } = match &state.transition {
            None => SelectOutput::default(),
            Some(Transition::Direct(next)) => SelectOutput {
                keys: Vec::new(),
                transitions: vec![TransitionRecord::always(names.next_state_name(*next)?.to_owned())],
            },
            Some(Transition::Select(sel)) => convert_select(&site, &names, sel)?,
        };

        log::debug!(
            "{site}: {} op(s), {} transition(s)",
            parser_ops.len(),
            transitions.len()
        );
        parse_states.push(StateRecord {
            name: name.to_owned(),
            id: i as u32,
            parser_ops,
            transition_key: keys,
            transitions,
        });
    }

    log::debug!(
        "parser `{parser}`: {} state(s), {} value_set(s) in {} us",
        parse_states.len(),
        value_sets.len(),
        t0.elapsed().as_micros()
    );
    Ok(ConvertedParser {
        descriptor: ParserDescriptor {
            name: parser.to_owned(),
            id,
            init_state: names.state_name(graph.start)?.to_owned(),
            parse_states,
        },
        value_sets,
    })
}

/// Owns the compilation-unit artifact and merges converted parsers into it.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
    opts: ConvertOptions,
}

impl ProgramBuilder {
    pub fn new(opts: ConvertOptions) -> Self {
        Self {
            program: Program::default(),
            opts,
        }
    }

    /// Converts and merges `graph`. On error the program is left untouched.
    pub fn add_parser(&mut self, graph: &ParserGraph) -> Result<&ParserDescriptor> {
        let id = self.program.parsers.len() as u32;
        let converted = convert_parser(graph, id, &self.opts)?;

        if let Err((name, conflict)) = self.program.parse_vsets.merge(&converted.value_sets) {
            return Err(ConvertError::ConflictingLookupTableWidth {
                parser: converted.descriptor.name.clone(),
                name: name.to_owned(),
                existing: conflict.existing,
                requested: conflict.requested,
            });
        }

        self.program.parsers.push(converted.descriptor);
        Ok(&self.program.parsers[id as usize])
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn finish(self) -> Program {
        self.program
    }
}
