// src/convert/field.rs
//! Recognizes expressions that denote runtime-readable locations and names
//! them the way the runtime addresses fields.
//!
//! Header instances are named by their path below the root struct
//! (`hdr.vlan[1]` -> `vlan[1]`); scalar fields that live outside any header
//! are flattened into the `scalars` pseudo-header under their full dotted path.

use serde_json::{Value, json};

use crate::ir::{Expr, ExprKind, Type};

pub const SCALARS: &str = "scalars";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    /// Field of a header instance.
    Field { header: String, field: String },
    /// Field of the last valid element of a header stack.
    StackField { stack: String, field: String },
    /// Metadata or local scalar.
    Scalar { name: String },
}

impl FieldRef {
    pub fn to_json(&self) -> Value {
        match self {
            FieldRef::Field { header, field } => json!({ "type": "field", "value": [header, field] }),
            FieldRef::StackField { stack, field } => {
                json!({ "type": "stack_field", "value": [stack, field] })
            }
            FieldRef::Scalar { name } => json!({ "type": "field", "value": [SCALARS, name] }),
        }
    }
}

/// Name of `base.field` where `base` is a struct or header union.
fn qualified(base: &Expr, field: &str) -> Option<String> {
    match (&base.kind, &base.ty) {
        (ExprKind::Path { .. }, Type::Struct { .. }) => Some(field.to_owned()),
        (ExprKind::Path { name }, Type::HeaderUnion { .. }) => Some(format!("{name}.{field}")),
        (ExprKind::Member { base: b, field: f }, Type::Struct { .. } | Type::HeaderUnion { .. }) => {
            Some(format!("{}.{field}", qualified(b, f)?))
        }
        (ExprKind::Index { .. }, Type::HeaderUnion { .. }) => {
            Some(format!("{}.{field}", header_instance(base)?))
        }
        _ => None,
    }
}

/// Runtime name of a header (or header union) instance.
pub fn header_instance(e: &Expr) -> Option<String> {
    if !matches!(e.ty, Type::Header { .. } | Type::HeaderUnion { .. }) {
        return None;
    }
    match &e.kind {
        ExprKind::Path { name } => Some(name.clone()),
        ExprKind::Member { base, field } => qualified(base, field),
        ExprKind::Index { base, index } => Some(format!("{}[{index}]", stack_instance(base)?)),
        _ => None,
    }
}

/// Runtime name of a header stack.
pub fn stack_instance(e: &Expr) -> Option<String> {
    if !matches!(e.ty, Type::HeaderStack { .. }) {
        return None;
    }
    match &e.kind {
        ExprKind::Path { name } => Some(name.clone()),
        ExprKind::Member { base, field } => qualified(base, field),
        _ => None,
    }
}

/// Dotted path of a struct-typed location, root included.
pub fn struct_path(e: &Expr) -> Option<String> {
    if !matches!(e.ty, Type::Struct { .. }) {
        return None;
    }
    match &e.kind {
        ExprKind::Path { name } => Some(name.clone()),
        ExprKind::Member { base, field } => Some(format!("{}.{field}", struct_path(base)?)),
        _ => None,
    }
}

fn is_scalar(ty: &Type) -> bool {
    matches!(ty, Type::Bits { .. } | Type::Bool | Type::Varbit { .. } | Type::Error)
}

/// Resolves `e` to a field the runtime can read and write.
pub fn field_ref(e: &Expr) -> Option<FieldRef> {
    if !is_scalar(&e.ty) {
        return None;
    }
    match &e.kind {
        ExprKind::Path { name } => Some(FieldRef::Scalar { name: name.clone() }),
        ExprKind::Member { base, field } => match &base.ty {
            Type::Header { .. } => match &base.kind {
                ExprKind::StackLast { base: stack } => Some(FieldRef::StackField {
                    stack: stack_instance(stack)?,
                    field: field.clone(),
                }),
                _ => Some(FieldRef::Field {
                    header: header_instance(base)?,
                    field: field.clone(),
                }),
            },
            Type::Struct { .. } => Some(FieldRef::Scalar {
                name: format!("{}.{field}", struct_path(base)?),
            }),
            _ => None,
        },
        _ => None,
    }
}

/// Whether `e` is a runtime-readable location (match key or assignment target).
pub fn is_field_expr(e: &Expr) -> bool {
    field_ref(e).is_some()
}
