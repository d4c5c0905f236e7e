//! Whole-parser conversion and the on-disk descriptor shape.

mod common;

use bmv2_parser::{
    ConvertError, ConvertOptions, ProgramBuilder, convert_parser,
    descriptor::{TransitionRecord, load_graphs_json_bytes, load_program_json_bytes},
    ir::{NextState, ParserGraph, StateId, Transition, build::*},
};
use common::*;
use serde_json::json;

/// start: extract hdr.h; select (hdr.h.f) { 1: B; }   B: (no transition)
fn two_state() -> ParserGraph {
    graph(
        "MyParser",
        vec![
            state(
                "start",
                vec![extract(member(hdr(), "h"))],
                Some(select(vec![hfield("h", "f")], vec![case(vec![exact(0x01)], goto(1))])),
            ),
            state("B", vec![], None),
        ],
    )
}

#[test]
fn two_state_parser() {
    let out = convert_parser(&two_state(), 0, &ConvertOptions::default()).unwrap();
    let d = &out.descriptor;
    assert_eq!(d.name, "MyParser");
    assert_eq!(d.init_state, "start");
    assert!(out.value_sets.is_empty());

    let start = d.state("start").unwrap();
    assert_eq!(start.id, 0);
    assert_eq!(start.parser_ops.len(), 1);
    assert_eq!(
        start.transitions,
        vec![
            TransitionRecord::ternary(&1u32.into(), &0xffu32.into(), 8, "B".into()),
            TransitionRecord::always("reject".into()),
        ]
    );

    let b = d.state("B").unwrap();
    assert_eq!(b.id, 1);
    assert!(b.parser_ops.is_empty());
    assert!(b.transition_key.is_empty());
    assert!(b.transitions.is_empty());
}

#[test]
fn serialized_shape() {
    let out = convert_parser(&two_state(), 0, &ConvertOptions::default()).unwrap();
    let v = serde_json::to_value(&out.descriptor).unwrap();
    assert_eq!(
        v["parse_states"][0],
        json!({
            "name": "start",
            "id": 0,
            "parser_ops": [
                { "op": "extract", "parameters": [{ "type": "regular", "value": "h" }] }
            ],
            "transition_key": [{ "type": "field", "value": ["h", "f"] }],
            "transitions": [
                { "type": "hexstr", "value": "0x01", "mask": "0xff", "next_state": "B" },
                { "type": "default", "value": null, "mask": null, "next_state": "reject" }
            ]
        })
    );
}

#[test]
fn conversion_is_deterministic() {
    let g = two_state();
    let a = convert_parser(&g, 0, &ConvertOptions::default()).unwrap();
    let b = convert_parser(&g, 0, &ConvertOptions::default()).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a.descriptor).unwrap(),
        serde_json::to_string(&b.descriptor).unwrap()
    );
}

#[test]
fn direct_transition_is_a_single_default() {
    let mut g = two_state();
    g.states[0].transition = Some(Transition::Direct(NextState::Accept));
    let out = convert_parser(&g, 0, &ConvertOptions::default()).unwrap();
    let start = &out.descriptor.parse_states[0];
    assert!(start.transition_key.is_empty());
    assert_eq!(start.transitions, vec![TransitionRecord::always("accept".into())]);
}

#[test]
fn option_name_overrides_the_graph_name() {
    let out = convert_parser(&two_state(), 3, &ConvertOptions::named("ingress_parser")).unwrap();
    assert_eq!(out.descriptor.name, "ingress_parser");
    assert_eq!(out.descriptor.id, 3);
}

#[test]
fn start_state_need_not_be_first() {
    let mut g = two_state();
    g.states.swap(0, 1);
    g.start = StateId(1);
    // The select still targets index 1 which now names `start` itself.
    let out = convert_parser(&g, 0, &ConvertOptions::default()).unwrap();
    assert_eq!(out.descriptor.init_state, "start");
    assert_eq!(out.descriptor.parse_states[1].transitions[0].next_state, "start");
}

fn naming_error(g: &ParserGraph) -> (String, &'static str) {
    match convert_parser(g, 0, &ConvertOptions::default()) {
        Err(ConvertError::DuplicateStateName { name, reason, .. }) => (name, reason),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn terminal_names_are_reserved() {
    let mut g = two_state();
    g.states[1].name = "accept".into();
    assert_eq!(naming_error(&g).0, "accept");
    g.states[1].name = "reject".into();
    assert_eq!(naming_error(&g).0, "reject");
}

#[test]
fn start_name_is_reserved_for_the_start_state() {
    let mut g = two_state();
    g.states[0].name = "first".into();
    g.states[1].name = "start".into();
    assert_eq!(naming_error(&g).0, "start");
}

#[test]
fn duplicate_names_are_rejected() {
    let mut g = two_state();
    g.states.push(state("B", vec![], None));
    let (name, reason) = naming_error(&g);
    assert_eq!(name, "B");
    assert!(reason.contains("more than once"));
}

#[test]
fn dangling_target_is_reported() {
    let mut g = two_state();
    g.states[1].transition = Some(Transition::Direct(goto(7)));
    assert_eq!(
        convert_parser(&g, 0, &ConvertOptions::default()),
        Err(ConvertError::UnknownState {
            parser: "MyParser".into(),
            target: 7
        })
    );
}

#[test]
fn unreachable_states_still_convert() {
    let mut g = two_state();
    g.states.push(state("orphan", vec![], Some(Transition::Direct(NextState::Reject))));
    let out = convert_parser(&g, 0, &ConvertOptions::default()).unwrap();
    assert_eq!(out.descriptor.parse_states.len(), 3);
    assert_eq!(out.descriptor.parse_states[2].name, "orphan");
}

#[test]
fn program_roundtrips_through_json() {
    let mut b = ProgramBuilder::new(ConvertOptions::default());
    b.add_parser(&two_state()).unwrap();
    let mut second = two_state();
    second.name = "Other".into();
    second.states[0].transition = Some(select(
        vec![hfield("ethernet", "etherType")],
        vec![case(vec![value_set("pvs", 16, 8)], goto(1))],
    ));
    b.add_parser(&second).unwrap();
    let program = b.finish();

    let bytes = serde_json::to_vec_pretty(&program).unwrap();
    let back = load_program_json_bytes(&bytes).unwrap();
    assert_eq!(back, program);

    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        v["parse_vsets"],
        json!([{ "name": "pvs", "id": 0, "compressed_bitwidth": 16, "max_size": 8 }])
    );
    assert_eq!(
        v["parsers"][1]["parse_states"][0]["transitions"][0],
        json!({ "type": "parse_vset", "value": "pvs", "mask": null, "next_state": "B" })
    );
}

#[test]
fn graphs_load_from_json() {
    let g = two_state();
    let one = serde_json::to_vec(&g).unwrap();
    assert_eq!(load_graphs_json_bytes(&one).unwrap(), vec![g.clone()]);

    let many = serde_json::to_vec(&vec![g.clone(), g.clone()]).unwrap();
    assert_eq!(load_graphs_json_bytes(&many).unwrap().len(), 2);

    assert!(load_graphs_json_bytes(b"{\"states\": 1}").is_err());
}
