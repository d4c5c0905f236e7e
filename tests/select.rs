//! Select emission: key validation, case order, the fallback slot.

mod common;

use bmv2_parser::{
    ConvertError, ConvertOptions, convert_parser,
    descriptor::{TransitionKind, TransitionRecord},
    ir::{Expr, ExprKind, NextState, Pattern, build::*},
};
use common::*;
use serde_json::json;

fn convert_single(keys: Vec<Expr>, cases: Vec<bmv2_parser::ir::Case>) -> Result<Vec<TransitionRecord>, ConvertError> {
    let g = graph(
        "p",
        vec![
            state("start", vec![extract(member(hdr(), "h"))], Some(select(keys, cases))),
            state("next", vec![], None),
        ],
    );
    let out = convert_parser(&g, 0, &ConvertOptions::default())?;
    Ok(out.descriptor.parse_states[0].transitions.clone())
}

#[test]
fn cases_keep_declared_order_and_fallback_is_last() {
    let cases = vec![
        case(vec![exact(3)], goto(1)),
        case(vec![exact(1)], NextState::Accept),
        case(vec![exact(2)], goto(1)),
    ];
    let t = convert_single(vec![hfield("h", "f")], cases).unwrap();
    assert_eq!(t.len(), 4);
    let values: Vec<_> = t.iter().map(|r| r.value.clone()).collect();
    assert_eq!(
        values,
        vec![Some("0x03".into()), Some("0x01".into()), Some("0x02".into()), None]
    );
    let next: Vec<_> = t.iter().map(|r| r.next_state.as_str()).collect();
    assert_eq!(next, vec!["next", "accept", "next", "reject"]);
    assert_eq!(t[3].kind, TransitionKind::Default);
}

#[test]
fn empty_selector_has_only_the_fallback() {
    let t = convert_single(vec![hfield("h", "f")], vec![]).unwrap();
    assert_eq!(t, vec![TransitionRecord::always("reject".into())]);
}

#[test]
fn multi_key_case_is_one_hexstr() {
    let t = convert_single(
        vec![hfield("h", "f"), hfield("h", "g")],
        vec![case(vec![exact(0x05), Pattern::Wildcard], goto(1))],
    )
    .unwrap();
    assert_eq!(t[0].value.as_deref(), Some("0x0050"));
    assert_eq!(t[0].mask.as_deref(), Some("0x0ff0"));
}

#[test]
fn value_set_case_names_the_table() {
    let t = convert_single(
        vec![hfield("ethernet", "etherType")],
        vec![case(vec![value_set("pvs", 16, 4)], goto(1))],
    )
    .unwrap();
    assert_eq!(t[0], TransitionRecord::value_set("pvs", "next".into()));
    assert_eq!(t[0].mask, None);
}

#[test]
fn transition_key_lists_fields_and_lookahead() {
    let g = graph(
        "p",
        vec![state(
            "start",
            vec![],
            Some(select(
                vec![hfield("ethernet", "etherType"), lookahead(bits(8)), member(meta(), "count")],
                vec![],
            )),
        )],
    );
    let out = convert_parser(&g, 0, &ConvertOptions::default()).unwrap();
    assert_eq!(
        out.descriptor.parse_states[0].transition_key,
        vec![
            json!({ "type": "field", "value": ["ethernet", "etherType"] }),
            json!({ "type": "lookahead", "value": [0, 8] }),
            json!({ "type": "field", "value": ["scalars", "meta.count"] }),
        ]
    );
}

#[test]
fn stack_last_key_is_a_stack_field() {
    let last = Expr::new(
        ExprKind::StackLast {
            base: Box::new(member(hdr(), "vlan")),
        },
        vlan_t(),
    );
    let g = graph(
        "p",
        vec![state("start", vec![], Some(select(vec![member(last, "etherType")], vec![])))],
    );
    let out = convert_parser(&g, 0, &ConvertOptions::default()).unwrap();
    assert_eq!(
        out.descriptor.parse_states[0].transition_key[0],
        json!({ "type": "stack_field", "value": ["vlan", "etherType"] })
    );
}

#[test]
fn non_field_key_is_rejected_once_per_select() {
    let err = convert_single(
        vec![constant(4, bits(8))],
        vec![case(vec![exact(1)], goto(1)), case(vec![exact(2)], goto(1))],
    )
    .unwrap_err();
    match err {
        ConvertError::UnsupportedKeyExpression { site, key, .. } => {
            assert_eq!(site.state, "start");
            assert_eq!(key, "4");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn whole_header_key_is_rejected() {
    let err = convert_single(vec![member(hdr(), "h")], vec![]).unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedKeyExpression { .. }), "{err}");
}

#[test]
fn failing_case_aborts_with_its_position() {
    let err = convert_single(
        vec![hfield("h", "f")],
        vec![case(vec![exact(1)], goto(1)), case(vec![range(3, 9)], goto(1))],
    )
    .unwrap_err();
    match err {
        ConvertError::UnrepresentableRange { case, key, .. } => assert_eq!((case, key), (1, 0)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn mixed_case_is_reported() {
    let err = convert_single(
        vec![hfield("h", "f"), hfield("h", "g")],
        vec![case(vec![exact(1), value_set("pvs", 12, 2)], goto(1))],
    )
    .unwrap_err();
    assert!(matches!(err, ConvertError::MixedCaseForm { case: 0, .. }), "{err}");
}

#[test]
fn case_arity_is_checked() {
    let err = convert_single(vec![hfield("h", "f")], vec![case(vec![], goto(1))]).unwrap_err();
    assert!(
        matches!(err, ConvertError::CaseArity { patterns: 0, keys: 1, .. }),
        "{err}"
    );
}

#[test]
fn out_of_width_mask_is_attributed() {
    let err = convert_single(
        vec![hfield("h", "f")],
        vec![case(vec![exact(1)], goto(1)), case(vec![masked(0x100, 0x1ff)], goto(1))],
    )
    .unwrap_err();
    match err {
        ConvertError::ConstantOutOfRange { site, case, key, width, .. } => {
            assert_eq!(site.state, "start");
            assert_eq!((case, key, width), (1, 0, 8));
        }
        other => panic!("unexpected {other:?}"),
    }
}
