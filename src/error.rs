// src/error.rs
//! Conversion errors. Every variant names the construct it came from.

use std::fmt;

use num_bigint::BigInt;
use thiserror::Error;

/// Parser and state a diagnostic is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub parser: String,
    pub state: String,
}

impl Site {
    pub fn new(parser: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            parser: parser.into(),
            state: state.into(),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parser `{}`, state `{}`", self.parser, self.state)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("{site}: select key `{key}` is not supported: {reason}")]
    UnsupportedKeyExpression {
        site: Site,
        key: String,
        reason: &'static str,
    },

    #[error(
        "{site}, case {case}: range [{lo:#x}, {hi:#x}] on key {key} is not an aligned power-of-two block; \
         use a value_set instead"
    )]
    UnrepresentableRange {
        site: Site,
        case: usize,
        key: usize,
        lo: BigInt,
        hi: BigInt,
    },

    #[error("{site}, case {case}: constant {value:#x} on key {key} does not fit in {width} bits")]
    ConstantOutOfRange {
        site: Site,
        case: usize,
        key: usize,
        value: BigInt,
        width: u32,
    },

    #[error("{site}, case {case}: {detail}")]
    MixedCaseForm {
        site: Site,
        case: usize,
        detail: String,
    },

    #[error("{site}, case {case}: {patterns} patterns for {keys} select keys")]
    CaseArity {
        site: Site,
        case: usize,
        patterns: usize,
        keys: usize,
    },

    #[error(
        "parser `{parser}`: value_set `{name}` registered with width {existing}, \
         redeclared with width {requested}"
    )]
    ConflictingLookupTableWidth {
        parser: String,
        name: String,
        existing: u32,
        requested: u32,
    },

    #[error("parser `{parser}`: state name `{name}` {reason}")]
    DuplicateStateName {
        parser: String,
        name: String,
        reason: &'static str,
    },

    #[error("parser `{parser}`: transition to unknown state #{target}")]
    UnknownState { parser: String, target: usize },

    #[error("{site}: cannot assign to `{target}`")]
    UnsupportedAssignmentTarget { site: Site, target: String },

    #[error("{site}: expression `{expr}` is not supported: {reason}")]
    UnsupportedExpression {
        site: Site,
        expr: String,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
