// src/descriptor/io.rs
use std::{
    io::{BufWriter, Write},
    path::Path,
    time::Instant,
};

use super::Program;
use crate::ir::ParserGraph;

pub fn save_program_json(path: &Path, program: &Program, pretty: bool) -> std::io::Result<()> {
    let instant = Instant::now();
    // Stream to disk to avoid a giant intermediate string.
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    if pretty {
        serde_json::to_writer_pretty(&mut w, program)?;
    } else {
        serde_json::to_writer(&mut w, program)?;
    }
    w.flush()?;
    log::debug!(
        "saved {} parser(s) to {} in {} ms",
        program.parsers.len(),
        path.display(),
        instant.elapsed().as_millis()
    );
    Ok(())
}

pub fn load_program_json_bytes(data: &[u8]) -> Result<Program, String> {
    serde_json::from_slice::<Program>(data).map_err(|e| format!("Failed to parse descriptor JSON: {e}"))
}

/// Input files hold either one graph or a list of graphs.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum GraphsDisk {
    One(ParserGraph),
    Many(Vec<ParserGraph>),
}

pub fn load_graphs_json_bytes(data: &[u8]) -> Result<Vec<ParserGraph>, String> {
    match serde_json::from_slice::<GraphsDisk>(data) {
        Ok(GraphsDisk::One(g)) => Ok(vec![g]),
        Ok(GraphsDisk::Many(gs)) => Ok(gs),
        Err(e) => Err(format!("Failed to parse parser graph JSON: {e}")),
    }
}
