// src/convert/stmt.rs
//! Parser statements -> `parser_ops`, one record per statement, in order.

use serde_json::{Value, json};

use super::{
    expr::ExprConverter,
    field::{field_ref, header_instance, stack_instance, struct_path},
};
use crate::{
    descriptor::OpRecord,
    error::{ConvertError, Result, Site},
    ir::{Expr, ExprKind, Statement, Type},
};

pub struct StatementEmitter<'a> {
    site: &'a Site,
    exprs: ExprConverter<'a>,
}

fn primitive(name: &str, parameters: Vec<Value>) -> OpRecord {
    OpRecord::new("primitive", vec![json!({ "op": name, "parameters": parameters })])
}

impl<'a> StatementEmitter<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self {
            site,
            exprs: ExprConverter::new(site),
        }
    }

    fn bad_target(&self, target: &Expr) -> ConvertError {
        ConvertError::UnsupportedAssignmentTarget {
            site: self.site.clone(),
            target: target.to_string(),
        }
    }

    pub fn convert_all(&self, statements: &[Statement]) -> Result<Vec<OpRecord>> {
        statements.iter().map(|s| self.convert(s)).collect()
    }

    pub fn convert(&self, statement: &Statement) -> Result<OpRecord> {
        match statement {
            Statement::Assign { target, value } => self.assign(target, value),
            Statement::Extract { target, var_size } => {
                let header = match &target.kind {
                    ExprKind::StackNext { base } => {
                        let stack = stack_instance(base).ok_or_else(|| self.bad_target(target))?;
                        json!({ "type": "stack", "value": stack })
                    }
                    _ => {
                        let h = header_instance(target).ok_or_else(|| self.bad_target(target))?;
                        let kind = if matches!(target.ty, Type::HeaderUnion { .. }) {
                            "union"
                        } else {
                            "regular"
                        };
                        json!({ "type": kind, "value": h })
                    }
                };
                match var_size {
                    None => Ok(OpRecord::new("extract", vec![header])),
                    Some(size) => {
                        let size = json!({ "type": "expression", "value": self.exprs.data(size)? });
                        Ok(OpRecord::new("extract_VL", vec![header, size]))
                    }
                }
            }
            Statement::Advance { bits } => Ok(OpRecord::new("advance", vec![self.exprs.data(bits)?])),
            Statement::Verify { cond, error } => Ok(OpRecord::new(
                "verify",
                vec![self.exprs.cond(cond)?, self.exprs.data(error)?],
            )),
            Statement::SetValid { header } => Ok(primitive("add_header", vec![self.exprs.header(header)?])),
            Statement::SetInvalid { header } => {
                Ok(primitive("remove_header", vec![self.exprs.header(header)?]))
            }
            Statement::PushFront { stack, count } => Ok(primitive(
                "push",
                vec![self.exprs.stack(stack)?, json!({ "type": "hexstr", "value": format!("{count:#x}") })],
            )),
            Statement::PopFront { stack, count } => Ok(primitive(
                "pop",
                vec![self.exprs.stack(stack)?, json!({ "type": "hexstr", "value": format!("{count:#x}") })],
            )),
            Statement::Primitive { name, args } => {
                let params = args
                    .iter()
                    .map(|a| self.exprs.operand(a))
                    .collect::<Result<Vec<_>>>()?;
                Ok(primitive(name, params))
            }
        }
    }

    /// Form follows the target type.
    fn assign(&self, target: &Expr, value: &Expr) -> Result<OpRecord> {
        match &target.ty {
            Type::Bits { .. } | Type::Bool | Type::Error => {
                let dst = field_ref(target).ok_or_else(|| self.bad_target(target))?;
                Ok(OpRecord::new("set", vec![dst.to_json(), self.exprs.data(value)?]))
            }
            Type::Varbit { .. } => {
                let dst = field_ref(target).ok_or_else(|| self.bad_target(target))?;
                Ok(OpRecord::new("assign_VL", vec![dst.to_json(), self.exprs.data(value)?]))
            }
            Type::Header { .. } => {
                let dst = self.exprs.header(target).map_err(|_| self.bad_target(target))?;
                Ok(OpRecord::new("assign_header", vec![dst, self.exprs.header(value)?]))
            }
            Type::HeaderUnion { .. } => {
                let dst = self.exprs.operand(target).map_err(|_| self.bad_target(target))?;
                Ok(OpRecord::new("assign_union", vec![dst, self.exprs.operand(value)?]))
            }
            Type::HeaderStack { .. } => {
                let dst = self.exprs.stack(target).map_err(|_| self.bad_target(target))?;
                Ok(OpRecord::new("assign_header_stack", vec![dst, self.exprs.stack(value)?]))
            }
            Type::Struct { .. } => {
                let dst = struct_path(target).ok_or_else(|| self.bad_target(target))?;
                Ok(OpRecord::new(
                    "assign_struct",
                    vec![json!({ "type": "struct", "value": dst }), self.field_list(value)?],
                ))
            }
        }
    }

    /// Nested `field_list` for a struct value: a literal or another struct location.
    fn field_list(&self, value: &Expr) -> Result<Value> {
        let entries = match &value.kind {
            ExprKind::StructLiteral { fields } => fields
                .iter()
                .map(|(name, e)| Ok(json!({ "name": name, "value": self.field_value(e)? })))
                .collect::<Result<Vec<_>>>()?,
            _ => value
                .ty
                .fields()
                .iter()
                .map(|f| {
                    let read = Expr::new(
                        ExprKind::Member {
                            base: Box::new(value.clone()),
                            field: f.name.clone(),
                        },
                        f.ty.clone(),
                    );
                    Ok(json!({ "name": f.name, "value": self.field_value(&read)? }))
                })
                .collect::<Result<Vec<_>>>()?,
        };
        Ok(json!({ "type": "field_list", "value": entries }))
    }

    fn field_value(&self, e: &Expr) -> Result<Value> {
        match &e.ty {
            Type::Struct { .. } => self.field_list(e),
            _ => self.exprs.operand(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build::*;

    #[test]
    fn bool_literal_assignment_is_a_single_bit() {
        let site = Site::new("p", "s");
        let emitter = StatementEmitter::new(&site);
        let meta = path("meta", struct_type("meta_t", &[("seen", Type::Bool)]));
        let op = emitter.convert(&assign(member(meta, "seen"), boolean(true))).unwrap();
        assert_eq!(op.op, "set");
        assert_eq!(op.parameters[1], json!({ "type": "hexstr", "value": "0x01" }));
    }

    #[test]
    fn constants_cannot_be_assigned_to() {
        let site = Site::new("p", "s");
        let emitter = StatementEmitter::new(&site);
        let err = emitter
            .convert(&assign(constant(1, bits(8)), constant(2, bits(8))))
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedAssignmentTarget { .. }));
    }
}
