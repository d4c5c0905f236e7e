// src/descriptor/mod.rs
//! Serializable parser descriptor consumed by the runtime engine.

pub mod io;

use hashbrown::HashMap;
use num_bigint::BigUint;
use num_traits::Num;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use io::{load_graphs_json_bytes, load_program_json_bytes, save_program_json};

/// Renders `value` as a `0x` hex string padded to the bytes spanned by `width` bits.
pub fn hex_str(value: &BigUint, width: u32) -> String {
    let digits = 2 * width.div_ceil(8).max(1) as usize;
    format!("0x{:0>digits$}", value.to_str_radix(16))
}

fn parse_hex(s: &str) -> Option<BigUint> {
    let digits = s.strip_prefix("0x")?;
    BigUint::from_str_radix(digits, 16).ok()
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Hexstr,
    ParseVset,
    Default,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    pub value: Option<String>,
    pub mask: Option<String>,
    pub next_state: String,
}

impl TransitionRecord {
    pub fn ternary(value: &BigUint, mask: &BigUint, width: u32, next_state: String) -> Self {
        Self {
            kind: TransitionKind::Hexstr,
            value: Some(hex_str(value, width)),
            mask: Some(hex_str(mask, width)),
            next_state,
        }
    }

    pub fn value_set(name: &str, next_state: String) -> Self {
        Self {
            kind: TransitionKind::ParseVset,
            value: Some(name.to_owned()),
            mask: None,
            next_state,
        }
    }

    /// Unconditional transition; also the shape of the fallback slot.
    pub fn always(next_state: String) -> Self {
        Self {
            kind: TransitionKind::Default,
            value: None,
            mask: None,
            next_state,
        }
    }

    /// Decoded `(value, mask)` of a `hexstr` transition.
    pub fn value_mask(&self) -> Option<(BigUint, BigUint)> {
        if self.kind != TransitionKind::Hexstr {
            return None;
        }
        let value = parse_hex(self.value.as_deref()?)?;
        let mask = parse_hex(self.mask.as_deref()?)?;
        Some((value, mask))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OpRecord {
    pub op: String,
    pub parameters: Vec<Value>,
}

impl OpRecord {
    pub fn new(op: &str, parameters: Vec<Value>) -> Self {
        Self {
            op: op.to_owned(),
            parameters,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StateRecord {
    pub name: String,
    pub id: u32,
    pub parser_ops: Vec<OpRecord>,
    pub transition_key: Vec<Value>,
    pub transitions: Vec<TransitionRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ParserDescriptor {
    pub name: String,
    pub id: u32,
    pub init_state: String,
    pub parse_states: Vec<StateRecord>,
}

impl ParserDescriptor {
    pub fn state(&self, name: &str) -> Option<&StateRecord> {
        self.parse_states.iter().find(|s| s.name == name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValueSetRecord {
    pub name: String,
    pub id: u32,
    pub compressed_bitwidth: u32,
    pub max_size: u32,
}

/// `parse_vsets` registry: one entry per name, ids in first-registration order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(from = "Vec<ValueSetRecord>", into = "Vec<ValueSetRecord>")]
pub struct ValueSetRegistry {
    records: Vec<ValueSetRecord>,
    by_name: HashMap<String, usize>,
}

/// A name already registered with a different width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthConflict {
    pub existing: u32,
    pub requested: u32,
}

impl ValueSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ValueSetRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[ValueSetRecord] {
        &self.records
    }

    /// Registers `name` once. Re-registering with the same width is a no-op
    /// and returns `Ok(false)`; a different width is rejected untouched.
    pub fn register(&mut self, name: &str, width: u32, capacity: u32) -> Result<bool, WidthConflict> {
        if let Some(existing) = self.get(name) {
            if existing.compressed_bitwidth != width {
                return Err(WidthConflict {
                    existing: existing.compressed_bitwidth,
                    requested: width,
                });
            }
            if existing.max_size != capacity {
                log::debug!(
                    "value_set `{name}` seen again with size {capacity}; keeping {}",
                    existing.max_size
                );
            }
            return Ok(false);
        }
        self.insert(name, width, capacity);
        Ok(true)
    }

    fn insert(&mut self, name: &str, width: u32, capacity: u32) {
        let id = self.records.len();
        self.records.push(ValueSetRecord {
            name: name.to_owned(),
            id: id as u32,
            compressed_bitwidth: width,
            max_size: capacity,
        });
        self.by_name.insert(name.to_owned(), id);
    }

    /// Adds every entry of `other` not yet present, keeping `other`'s order.
    /// Nothing is added when any shared name differs in width.
    pub fn merge<'a>(&mut self, other: &'a Self) -> Result<usize, (&'a str, WidthConflict)> {
        if let Some(conflict) = self.first_conflict(other) {
            return Err(conflict);
        }
        let mut added = 0;
        for r in &other.records {
            if !self.by_name.contains_key(&r.name) {
                self.insert(&r.name, r.compressed_bitwidth, r.max_size);
                added += 1;
            }
        }
        Ok(added)
    }

    /// First conflict `other` would hit when merged into `self`.
    pub fn first_conflict<'a>(&self, other: &'a Self) -> Option<(&'a str, WidthConflict)> {
        other.records.iter().find_map(|r| {
            let existing = self.get(&r.name)?;
            (existing.compressed_bitwidth != r.compressed_bitwidth).then(|| {
                (
                    r.name.as_str(),
                    WidthConflict {
                        existing: existing.compressed_bitwidth,
                        requested: r.compressed_bitwidth,
                    },
                )
            })
        })
    }
}

impl From<Vec<ValueSetRecord>> for ValueSetRegistry {
    fn from(records: Vec<ValueSetRecord>) -> Self {
        let by_name = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.clone(), i))
            .collect();
        Self { records, by_name }
    }
}

impl From<ValueSetRegistry> for Vec<ValueSetRecord> {
    fn from(r: ValueSetRegistry) -> Self {
        r.records
    }
}

/// The compilation-unit artifact parsers are merged into.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub parsers: Vec<ParserDescriptor>,
    pub parse_vsets: ValueSetRegistry,
}
