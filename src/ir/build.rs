// src/ir/build.rs
// Shorthand constructors for hand-written graphs (tests, the demo driver).

use num_bigint::BigInt;

use super::{
    Case, Expr, ExprKind, Field, NextState, ParserGraph, ParserState, Pattern, Selector,
    Statement, StateId, Transition, Type, ValueSet,
};

pub fn bits(width: u32) -> Type {
    Type::Bits {
        width,
        signed: false,
    }
}

pub fn int(width: u32) -> Type {
    Type::Bits {
        width,
        signed: true,
    }
}

pub fn header_type(name: &str, fields: &[(&str, Type)]) -> Type {
    Type::Header {
        name: name.into(),
        fields: to_fields(fields),
    }
}

pub fn struct_type(name: &str, fields: &[(&str, Type)]) -> Type {
    Type::Struct {
        name: name.into(),
        fields: to_fields(fields),
    }
}

fn to_fields(fields: &[(&str, Type)]) -> Vec<Field> {
    fields
        .iter()
        .map(|(name, ty)| Field {
            name: (*name).into(),
            ty: ty.clone(),
        })
        .collect()
}

pub fn path(name: &str, ty: Type) -> Expr {
    Expr::new(ExprKind::Path { name: name.into() }, ty)
}

/// `base.field`, typed from the base's field list (`bit<0>` if absent).
pub fn member(base: Expr, field: &str) -> Expr {
    let ty = base
        .ty
        .fields()
        .iter()
        .find(|f| f.name == field)
        .map(|f| f.ty.clone())
        .unwrap_or_else(|| bits(0));
    Expr::new(
        ExprKind::Member {
            base: Box::new(base),
            field: field.into(),
        },
        ty,
    )
}

pub fn constant(value: i64, ty: Type) -> Expr {
    Expr::new(
        ExprKind::Constant {
            value: BigInt::from(value),
        },
        ty,
    )
}

pub fn boolean(value: bool) -> Expr {
    Expr::new(ExprKind::Bool { value }, Type::Bool)
}

pub fn lookahead(ty: Type) -> Expr {
    Expr::new(ExprKind::Lookahead, ty)
}

pub fn exact(value: i64) -> Pattern {
    Pattern::Exact {
        value: BigInt::from(value),
    }
}

pub fn masked(value: i64, mask: i64) -> Pattern {
    Pattern::Mask {
        value: BigInt::from(value),
        mask: BigInt::from(mask),
    }
}

pub fn range(lo: i64, hi: i64) -> Pattern {
    Pattern::Range {
        lo: BigInt::from(lo),
        hi: BigInt::from(hi),
    }
}

pub fn value_set(name: &str, width: u32, capacity: u32) -> Pattern {
    Pattern::ValueSet(ValueSet {
        name: name.into(),
        width,
        capacity,
    })
}

pub fn extract(target: Expr) -> Statement {
    Statement::Extract {
        target,
        var_size: None,
    }
}

pub fn assign(target: Expr, value: Expr) -> Statement {
    Statement::Assign { target, value }
}

pub fn case(patterns: Vec<Pattern>, next: NextState) -> Case {
    Case { patterns, next }
}

pub fn select(keys: Vec<Expr>, cases: Vec<Case>) -> Transition {
    Transition::Select(Selector { keys, cases })
}

pub fn goto(id: usize) -> NextState {
    NextState::State(StateId(id))
}

pub fn state(name: &str, statements: Vec<Statement>, transition: Option<Transition>) -> ParserState {
    ParserState {
        name: name.into(),
        statements,
        transition,
    }
}

/// A graph whose first state is the start state.
pub fn graph(name: &str, states: Vec<ParserState>) -> ParserGraph {
    ParserGraph {
        name: name.into(),
        states,
        start: StateId(0),
        value_sets: Vec::new(),
    }
}
