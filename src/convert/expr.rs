// src/convert/expr.rs
//! Width-aware encoding of expressions into runtime operands.
//!
//! The runtime evaluates arithmetic in unbounded precision, so every result
//! that can carry out of its declared width is truncated explicitly. Booleans
//! live in 1-bit fields: `b2d` turns a condition into data and `d2b` turns
//! data back into a condition.

use num_bigint::{BigInt, BigUint};
use serde_json::{Value, json};

use super::{
    combine::{ones, to_width},
    field::{field_ref, header_instance, stack_instance},
};
use crate::{
    descriptor::hex_str,
    error::{ConvertError, Result, Site},
    ir::{BinOp, Expr, ExprKind, Type, UnOp},
};

fn expression(op: &str, left: Value, right: Value) -> Value {
    json!({ "type": "expression", "value": { "op": op, "left": left, "right": right } })
}

fn hexstr(value: &BigInt, width: u32) -> Value {
    json!({ "type": "hexstr", "value": hex_str(&to_width(value, width), width) })
}

fn width_hexstr(width: u32) -> Value {
    json!({ "type": "hexstr", "value": hex_str(&ones(width), width) })
}

/// Converts expressions for one state; errors are attributed to `site`.
pub struct ExprConverter<'a> {
    site: &'a Site,
}

impl<'a> ExprConverter<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    fn unsupported(&self, e: &Expr, reason: &'static str) -> ConvertError {
        ConvertError::UnsupportedExpression {
            site: self.site.clone(),
            expr: e.to_string(),
            reason,
        }
    }

    /// Truncates `v` to the width of `ty` (`two_comp_mod` for signed types).
    fn truncate(&self, v: Value, ty: &Type) -> Value {
        match ty {
            Type::Bits {
                width,
                signed: false,
            } => expression("&", v, width_hexstr(*width)),
            Type::Bits {
                width,
                signed: true,
            } => expression(
                "two_comp_mod",
                v,
                json!({ "type": "hexstr", "value": hex_str(&BigUint::from(*width), 32) }),
            ),
            _ => v,
        }
    }

    /// Operand of a primitive: headers and stacks by name, everything else as data.
    pub fn operand(&self, e: &Expr) -> Result<Value> {
        match &e.ty {
            Type::Header { .. } => self.header(e),
            Type::HeaderUnion { .. } => header_instance(e)
                .map(|h| json!({ "type": "header_union", "value": h }))
                .ok_or_else(|| self.unsupported(e, "not a header union instance")),
            Type::HeaderStack { .. } => self.stack(e),
            Type::Struct { .. } => Err(self.unsupported(e, "structs cannot be passed as operands")),
            Type::Bits { .. } | Type::Bool | Type::Varbit { .. } | Type::Error => self.data(e),
        }
    }

    pub fn header(&self, e: &Expr) -> Result<Value> {
        header_instance(e)
            .map(|h| json!({ "type": "header", "value": h }))
            .ok_or_else(|| self.unsupported(e, "not a header instance"))
    }

    pub fn stack(&self, e: &Expr) -> Result<Value> {
        stack_instance(e)
            .map(|s| json!({ "type": "header_stack", "value": s }))
            .ok_or_else(|| self.unsupported(e, "not a header stack"))
    }

    /// Encodes `e` as a data value (bits); booleans become a single bit.
    pub fn data(&self, e: &Expr) -> Result<Value> {
        if let Some(f) = field_ref(e) {
            return Ok(f.to_json());
        }
        if e.ty == Type::Bool {
            return match &e.kind {
                ExprKind::Bool { value } => Ok(hexstr(&BigInt::from(*value as u8), 1)),
                _ => Ok(expression("b2d", Value::Null, self.cond(e)?)),
            };
        }
        let width = e.ty.bit_width();
        match &e.kind {
            ExprKind::Constant { value } => match width {
                Some(w) => Ok(hexstr(value, w)),
                None => Err(self.unsupported(e, "constant without a fixed width")),
            },
            ExprKind::ErrorConst { code, .. } => Ok(hexstr(&BigInt::from(*code), 32)),
            ExprKind::Lookahead => match width {
                Some(w) => Ok(json!({ "type": "lookahead", "value": [0, w] })),
                None => Err(self.unsupported(e, "lookahead of a type without a fixed width")),
            },
            ExprKind::Slice { base, hi, lo } => {
                if hi < lo {
                    return Err(self.unsupported(e, "slice bounds are reversed"));
                }
                let shifted = expression(
                    ">>",
                    self.data(base)?,
                    hexstr(&BigInt::from(*lo), 32),
                );
                Ok(expression("&", shifted, width_hexstr(hi - lo + 1)))
            }
            ExprKind::Unary { op, expr } => match op {
                UnOp::Complement => Ok(self.truncate(expression("~", Value::Null, self.data(expr)?), &e.ty)),
                UnOp::Neg => Ok(self.truncate(expression("-", Value::Null, self.data(expr)?), &e.ty)),
                UnOp::Not => Err(self.unsupported(e, "logical not on a non-boolean")),
            },
            ExprKind::Binary { op, left, right } => {
                if op.is_comparison() || matches!(op, BinOp::And | BinOp::Or) {
                    return Err(self.unsupported(e, "boolean operator with a non-boolean result"));
                }
                let v = expression(op.symbol(), self.data(left)?, self.data(right)?);
                Ok(if op.may_overflow() {
                    self.truncate(v, &e.ty)
                } else {
                    v
                })
            }
            ExprKind::Cast { expr } => match (&expr.ty, &e.ty) {
                (Type::Bool, _) => Ok(expression("b2d", Value::Null, self.cond(expr)?)),
                (from, to) if from == to => self.data(expr),
                (_, Type::Bits { .. }) => Ok(self.truncate(self.data(expr)?, &e.ty)),
                _ => Err(self.unsupported(e, "cast between non-bit types")),
            },
            ExprKind::Path { .. } | ExprKind::Member { .. } => {
                Err(self.unsupported(e, "not a runtime field"))
            }
            ExprKind::Index { .. }
            | ExprKind::StackNext { .. }
            | ExprKind::StackLast { .. }
            | ExprKind::IsValid { .. }
            | ExprKind::Bool { .. }
            | ExprKind::StructLiteral { .. } => Err(self.unsupported(e, "not a data value")),
        }
    }

    /// Encodes a boolean condition.
    pub fn cond(&self, e: &Expr) -> Result<Value> {
        if e.ty != Type::Bool {
            return Ok(expression("d2b", Value::Null, self.data(e)?));
        }
        if let Some(f) = field_ref(e) {
            return Ok(expression("d2b", Value::Null, f.to_json()));
        }
        match &e.kind {
            ExprKind::Bool { value } => Ok(json!({ "type": "bool", "value": value })),
            ExprKind::IsValid { base } => {
                let target = match &base.ty {
                    Type::HeaderUnion { .. } => self.operand(base)?,
                    _ => self.header(base)?,
                };
                Ok(expression("valid", Value::Null, target))
            }
            ExprKind::Unary { op: UnOp::Not, expr } => Ok(expression("not", Value::Null, self.cond(expr)?)),
            ExprKind::Binary { op, left, right } => match op {
                BinOp::And | BinOp::Or => Ok(expression(op.symbol(), self.cond(left)?, self.cond(right)?)),
                _ if op.is_comparison() => {
                    Ok(expression(op.symbol(), self.data(left)?, self.data(right)?))
                }
                _ => Err(self.unsupported(e, "arithmetic with a boolean result")),
            },
            ExprKind::Cast { expr } => Ok(expression("d2b", Value::Null, self.data(expr)?)),
            _ => Err(self.unsupported(e, "not a condition")),
        }
    }
}
