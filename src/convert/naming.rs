// src/convert/naming.rs
//! Emitted state names and the canonical fallback transition.

use hashbrown::HashMap;

use crate::{
    descriptor::TransitionRecord,
    error::{ConvertError, Result},
    ir::{NextState, ParserGraph, StateId},
};

pub const ACCEPT: &str = "accept";
pub const REJECT: &str = "reject";
pub const START: &str = "start";

/// Externally visible state names for one parser, validated up front.
pub struct StateNames<'g> {
    parser: &'g str,
    names: Vec<&'g str>,
}

impl<'g> StateNames<'g> {
    /// Fails on a state named after a terminal, a non-start state named
    /// `start`, or two states sharing a name.
    pub fn new(parser: &'g str, graph: &'g ParserGraph) -> Result<Self> {
        let dup = |name: &str, reason| ConvertError::DuplicateStateName {
            parser: parser.to_owned(),
            name: name.to_owned(),
            reason,
        };
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(graph.states.len());
        for (i, s) in graph.states.iter().enumerate() {
            let name = s.name.as_str();
            if name == ACCEPT || name == REJECT {
                return Err(dup(name, "is reserved for a terminal state"));
            }
            if name == START && i != graph.start.0 {
                return Err(dup(name, "is reserved for the start state"));
            }
            if seen.insert(name, i).is_some() {
                return Err(dup(name, "is declared more than once"));
            }
        }
        if graph.state(graph.start).is_none() {
            return Err(ConvertError::UnknownState {
                parser: parser.to_owned(),
                target: graph.start.0,
            });
        }
        Ok(Self {
            parser,
            names: graph.states.iter().map(|s| s.name.as_str()).collect(),
        })
    }

    pub fn state_name(&self, id: StateId) -> Result<&'g str> {
        self.names
            .get(id.0)
            .copied()
            .ok_or_else(|| ConvertError::UnknownState {
                parser: self.parser.to_owned(),
                target: id.0,
            })
    }

    pub fn next_state_name(&self, next: NextState) -> Result<&'g str> {
        match next {
            NextState::Accept => Ok(ACCEPT),
            NextState::Reject => Ok(REJECT),
            NextState::State(id) => self.state_name(id),
        }
    }
}

/// The "no case matched" slot closing every select.
pub fn default_transition() -> TransitionRecord {
    TransitionRecord::always(REJECT.to_owned())
}
