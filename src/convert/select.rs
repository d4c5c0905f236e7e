// src/convert/select.rs
//! Select -> `transition_key` plus ordered transitions closed by the fallback.

use serde_json::{Value, json};

use super::{
    combine::{CombineError, CombinedKey, KeySpec, combine},
    field::field_ref,
    naming::{StateNames, default_transition},
};
use crate::{
    descriptor::TransitionRecord,
    error::{ConvertError, Result, Site},
    ir::{Expr, ExprKind, Selector},
};

/// `transition_key` and `transitions` of one state.
#[derive(Debug, Default)]
pub struct SelectOutput {
    pub keys: Vec<Value>,
    pub transitions: Vec<TransitionRecord>,
}

fn attach(err: CombineError, site: &Site, case: usize) -> ConvertError {
    let site = site.clone();
    match err {
        CombineError::Arity { patterns, keys } => ConvertError::CaseArity {
            site,
            case,
            patterns,
            keys,
        },
        CombineError::UnrepresentableRange { key, lo, hi } => ConvertError::UnrepresentableRange {
            site,
            case,
            key,
            lo,
            hi,
        },
        CombineError::ConstantOutOfRange { key, value, width } => ConvertError::ConstantOutOfRange {
            site,
            case,
            key,
            value,
            width,
        },
        CombineError::MixedCaseForm { detail } => ConvertError::MixedCaseForm { site, case, detail },
    }
}

/// Validates one key and returns its descriptor entry and width.
fn convert_key(site: &Site, key: &Expr) -> Result<(Value, KeySpec)> {
    let unsupported = |reason| ConvertError::UnsupportedKeyExpression {
        site: site.clone(),
        key: key.to_string(),
        reason,
    };
    let width = key
        .ty
        .bit_width()
        .ok_or_else(|| unsupported("key has no fixed bit width"))?;
    let spec = KeySpec {
        width,
        signed: key.ty.is_signed(),
    };
    if matches!(key.kind, ExprKind::Lookahead) {
        return Ok((json!({ "type": "lookahead", "value": [0, width] }), spec));
    }
    let field = field_ref(key).ok_or_else(|| unsupported("not a runtime-readable field"))?;
    Ok((field.to_json(), spec))
}

/// Emits `[case 1, ..., case n, fallback]`, in declared order.
pub fn convert_select(site: &Site, names: &StateNames<'_>, selector: &Selector) -> Result<SelectOutput> {
    let mut keys = Vec::with_capacity(selector.keys.len());
    let mut specs = Vec::with_capacity(selector.keys.len());
    for key in &selector.keys {
        let (json, spec) = convert_key(site, key)?;
        keys.push(json);
        specs.push(spec);
    }

    let mut transitions = Vec::with_capacity(selector.cases.len() + 1);
    for (i, case) in selector.cases.iter().enumerate() {
        let next = names.next_state_name(case.next)?.to_owned();
        let record = match combine(&specs, &case.patterns).map_err(|e| attach(e, site, i))? {
            CombinedKey::Ternary { value, mask, width } => {
                TransitionRecord::ternary(&value, &mask, width, next)
            }
            CombinedKey::ValueSet { name } => TransitionRecord::value_set(&name, next),
        };
        transitions.push(record);
    }
    transitions.push(default_transition());

    log::debug!(
        "{site}: select over {} key(s), {} case(s)",
        keys.len(),
        selector.cases.len()
    );
    Ok(SelectOutput { keys, transitions })
}
