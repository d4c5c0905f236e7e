// src/ir/mod.rs
//! Type-checked parser graph handed over by the front end.
//!
//! The converter only reads these types; nothing here is mutated after
//! construction.

pub mod build;
pub mod expr;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

pub use expr::{BinOp, Expr, ExprKind, Field, Type, UnOp};

/// Index of a state inside [`ParserGraph::states`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct StateId(pub usize);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NextState {
    Accept,
    Reject,
    State(StateId),
}

/// An externally populated lookup table (`value_set`) as resolved by the
/// front end. References carry the declaration they resolve to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValueSet {
    pub name: String,
    /// Total element width in bits.
    pub width: u32,
    /// Maximum number of entries the control plane may install.
    pub capacity: u32,
}

/// Per-key match pattern inside a select case.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pattern {
    Exact {
        #[serde_as(as = "DisplayFromStr")]
        value: BigInt,
    },
    Bool {
        value: bool,
    },
    Mask {
        #[serde_as(as = "DisplayFromStr")]
        value: BigInt,
        #[serde_as(as = "DisplayFromStr")]
        mask: BigInt,
    },
    Range {
        #[serde_as(as = "DisplayFromStr")]
        lo: BigInt,
        #[serde_as(as = "DisplayFromStr")]
        hi: BigInt,
    },
    Wildcard,
    ValueSet(ValueSet),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub patterns: Vec<Pattern>,
    pub next: NextState,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub keys: Vec<Expr>,
    pub cases: Vec<Case>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Direct(NextState),
    Select(Selector),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Statement {
    Assign {
        target: Expr,
        value: Expr,
    },
    /// `packet.extract(target)` or, with a size, the variable-length form.
    Extract {
        target: Expr,
        #[serde(default)]
        var_size: Option<Expr>,
    },
    Advance {
        bits: Expr,
    },
    Verify {
        cond: Expr,
        error: Expr,
    },
    SetValid {
        header: Expr,
    },
    SetInvalid {
        header: Expr,
    },
    PushFront {
        stack: Expr,
        count: u32,
    },
    PopFront {
        stack: Expr,
        count: u32,
    },
    /// Any other extern or builtin call the runtime knows by name.
    Primitive {
        name: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ParserState {
    pub name: String,
    #[serde(default)]
    pub statements: Vec<Statement>,
    #[serde(default)]
    pub transition: Option<Transition>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ParserGraph {
    pub name: String,
    pub states: Vec<ParserState>,
    pub start: StateId,
    /// Parser-local `value_set` declarations, in declaration order.
    #[serde(default)]
    pub value_sets: Vec<ValueSet>,
}

impl ParserGraph {
    pub fn state(&self, id: StateId) -> Option<&ParserState> {
        self.states.get(id.0)
    }
}
