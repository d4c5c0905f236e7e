// src/bin/convert_parser.rs
// Convert parser graphs (JSON IR) into a parser descriptor.
// Usage:
//   cargo run --bin convert_parser                         # converts a built-in demo parser
//   cargo run --bin convert_parser -- graph.json           # writes out/parser.json
//   cargo run --bin convert_parser -- graph.json out.json
//
// Env: BMV2_PRETTY=1 pretty-prints, BMV2_PARSER_NAME / BMV2_CHECK_REACHABLE tune conversion.

use std::{env, fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result, anyhow};
use bmv2_parser::{
    ConvertOptions, ProgramBuilder,
    config::env_flag_true,
    descriptor::{load_graphs_json_bytes, save_program_json},
    ir::{NextState, ParserGraph, Transition, build::*},
};

/// ethernet -> ipv4 on etherType 0x0800, everything else rejected.
fn demo_graph() -> ParserGraph {
    let ethernet = header_type(
        "ethernet_t",
        &[("dstAddr", bits(48)), ("srcAddr", bits(48)), ("etherType", bits(16))],
    );
    let ipv4 = header_type(
        "ipv4_t",
        &[("version", bits(4)), ("ihl", bits(4)), ("protocol", bits(8))],
    );
    let hdr = path("hdr", struct_type("headers_t", &[("ethernet", ethernet), ("ipv4", ipv4)]));

    let start = state(
        "start",
        vec![extract(member(hdr.clone(), "ethernet"))],
        Some(select(
            vec![member(member(hdr.clone(), "ethernet"), "etherType")],
            vec![case(vec![exact(0x0800)], goto(1))],
        )),
    );
    let parse_ipv4 = state(
        "parse_ipv4",
        vec![extract(member(hdr, "ipv4"))],
        Some(Transition::Direct(NextState::Accept)),
    );
    graph("demo", vec![start, parse_ipv4])
}

fn load_graphs() -> Result<Vec<ParserGraph>> {
    let Some(path) = env::args().nth(1) else {
        println!("[convert_parser] no input given; converting the demo parser");
        return Ok(vec![demo_graph()]);
    };
    let t0 = Instant::now();
    let data = fs::read(&path).with_context(|| format!("read {path}"))?;
    let graphs = load_graphs_json_bytes(&data).map_err(|e| anyhow!(e))?;
    println!(
        "[convert_parser] loaded {} graph(s) from {path} in {:.3} ms",
        graphs.len(),
        t0.elapsed().as_secs_f64() * 1e3
    );
    Ok(graphs)
}

fn main() -> Result<()> {
    let out = env::args()
        .nth(2)
        .unwrap_or_else(|| "out/parser.json".to_string());
    let out_path = PathBuf::from(out);

    let graphs = load_graphs()?;
    let mut builder = ProgramBuilder::new(ConvertOptions::from_env());
    for g in &graphs {
        let p = builder
            .add_parser(g)
            .with_context(|| format!("converting parser `{}`", g.name))?;
        println!(
            "[convert_parser] {}: {} state(s), init_state = {}",
            p.name,
            p.parse_states.len(),
            p.init_state
        );
    }
    let program = builder.finish();

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    save_program_json(&out_path, &program, env_flag_true("BMV2_PRETTY", false))
        .with_context(|| format!("write {}", out_path.display()))?;
    println!(
        "[convert_parser] wrote {} ({} value_set(s))",
        out_path.display(),
        program.parse_vsets.len()
    );
    Ok(())
}
