// src/convert/combine.rs
//! Folds the per-key patterns of one select case into a single ternary
//! `(value, mask)` over the concatenated key, or a value_set reference.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

use crate::ir::Pattern;

/// Shape of one select key as seen by the combiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub width: u32,
    pub signed: bool,
}

impl KeySpec {
    pub fn unsigned(width: u32) -> Self {
        Self {
            width,
            signed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombinedKey {
    /// Ternary match over `width` bits; the first key occupies the top bits.
    Ternary {
        value: BigUint,
        mask: BigUint,
        width: u32,
    },
    ValueSet { name: String },
}

/// Combiner failures; the selector emitter attaches the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombineError {
    Arity { patterns: usize, keys: usize },
    UnrepresentableRange { key: usize, lo: BigInt, hi: BigInt },
    /// A mask pattern constant with bits outside the key.
    ConstantOutOfRange { key: usize, value: BigInt, width: u32 },
    MixedCaseForm { detail: String },
}

/// All-ones mask of `width` bits.
pub fn ones(width: u32) -> BigUint {
    (BigUint::one() << width) - BigUint::one()
}

/// Two's complement image of `v` in `width` bits.
pub fn to_width(v: &BigInt, width: u32) -> BigUint {
    let modulus = BigInt::one() << width;
    let r = ((v % &modulus) + &modulus) % &modulus;
    r.into_parts().1
}

/// Bit image of a pattern constant in the key, or `None` when `v` does not
/// fit. Unsigned keys take `0..2^w`; signed keys also take `-2^(w-1)..0`,
/// stored as two's complement.
fn fit(v: &BigInt, spec: KeySpec) -> Option<BigUint> {
    let w = spec.width;
    let min = if spec.signed && w > 0 {
        -(BigInt::one() << (w - 1))
    } else {
        BigInt::zero()
    };
    if *v < min || *v > BigInt::from(ones(w)) {
        return None;
    }
    Some(to_width(v, w))
}

/// Reduces `[lo, hi]` to `(value, mask)` when it is an aligned block of
/// `2^k` values: `lo` is a multiple of the block size and `hi = lo + size - 1`.
pub fn range_to_ternary(lo: &BigUint, hi: &BigUint, width: u32) -> Option<(BigUint, BigUint)> {
    if lo > hi || hi > &ones(width) {
        return None;
    }
    let size: BigUint = hi - lo + BigUint::one();
    let low_bits = &size - BigUint::one();
    if !(&size & &low_bits).is_zero() || !(lo & &low_bits).is_zero() {
        return None;
    }
    let mask = ones(width) ^ low_bits;
    Some((lo.clone(), mask))
}

fn literal(key: usize, spec: KeySpec, pattern: &Pattern) -> Result<(BigUint, BigUint), CombineError> {
    let w = spec.width;
    match pattern {
        Pattern::Exact { value } => {
            let v = to_width(value, w);
            if !spec.signed && BigInt::from(v.clone()) != *value {
                log::warn!("key {key}: constant {value:#x} truncated to {w} bits");
            }
            Ok((v, ones(w)))
        }
        Pattern::Bool { value } => Ok((BigUint::from(*value as u8) & ones(w), ones(w))),
        Pattern::Mask { value, mask } => {
            let out_of_range = |c: &BigInt| CombineError::ConstantOutOfRange {
                key,
                value: c.clone(),
                width: w,
            };
            let m = fit(mask, spec).ok_or_else(|| out_of_range(mask))?;
            let v = fit(value, spec).ok_or_else(|| out_of_range(value))?;
            let kept = &v & &m;
            if kept != v {
                log::warn!("key {key}: value {value:#x} has bits outside mask {mask:#x}; ignoring them");
            }
            Ok((kept, m))
        }
        Pattern::Range { lo, hi } => {
            let unrepresentable = || CombineError::UnrepresentableRange {
                key,
                lo: lo.clone(),
                hi: hi.clone(),
            };
            let (l, h) = match (fit(lo, spec), fit(hi, spec)) {
                (Some(l), Some(h)) => (l, h),
                _ => return Err(unrepresentable()),
            };
            range_to_ternary(&l, &h, w).ok_or_else(unrepresentable)
        }
        Pattern::Wildcard => Ok((BigUint::zero(), BigUint::zero())),
        Pattern::ValueSet(vs) => Err(CombineError::MixedCaseForm {
            detail: format!("value_set `{}` mixed with literal patterns", vs.name),
        }),
    }
}

fn value_set_name(patterns: &[Pattern]) -> Result<Option<&str>, CombineError> {
    let mut name: Option<&str> = None;
    let mut literal_seen = false;
    for p in patterns {
        match p {
            Pattern::ValueSet(vs) => match name {
                Some(prev) if prev != vs.name => {
                    return Err(CombineError::MixedCaseForm {
                        detail: format!("value_sets `{prev}` and `{}` used in one case", vs.name),
                    });
                }
                _ => name = Some(&vs.name),
            },
            _ => literal_seen = true,
        }
    }
    match name {
        Some(n) if literal_seen => Err(CombineError::MixedCaseForm {
            detail: format!("value_set `{n}` mixed with literal patterns"),
        }),
        other => Ok(other),
    }
}

pub fn combine(keys: &[KeySpec], patterns: &[Pattern]) -> Result<CombinedKey, CombineError> {
    if keys.len() != patterns.len() {
        return Err(CombineError::Arity {
            patterns: patterns.len(),
            keys: keys.len(),
        });
    }
    if let Some(name) = value_set_name(patterns)? {
        return Ok(CombinedKey::ValueSet { name: name.to_owned() });
    }

    let mut value = BigUint::zero();
    let mut mask = BigUint::zero();
    let mut width = 0u32;
    for (i, (spec, pattern)) in keys.iter().zip(patterns).enumerate() {
        let (v, m) = literal(i, *spec, pattern)?;
        value = (value << spec.width) | v;
        mask = (mask << spec.width) | m;
        width += spec.width;
    }
    Ok(CombinedKey::Ternary { value, mask, width })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn aligned_blocks_reduce() {
        assert_eq!(range_to_ternary(&u(0x10), &u(0x1f), 8), Some((u(0x10), u(0xf0))));
        assert_eq!(range_to_ternary(&u(0x10), &u(0x17), 8), Some((u(0x10), u(0xf8))));
        assert_eq!(range_to_ternary(&u(7), &u(7), 8), Some((u(7), u(0xff))));
        assert_eq!(range_to_ternary(&u(0), &u(0xff), 8), Some((u(0), u(0))));
    }

    #[test]
    fn unaligned_or_odd_blocks_do_not_reduce() {
        assert_eq!(range_to_ternary(&u(0), &u(0x20), 8), None);
        assert_eq!(range_to_ternary(&u(0x08), &u(0x17), 8), None);
        assert_eq!(range_to_ternary(&u(5), &u(4), 8), None);
        assert_eq!(range_to_ternary(&u(0), &u(0x1ff), 8), None);
    }

    #[test]
    fn negative_constants_wrap_into_width() {
        assert_eq!(to_width(&BigInt::from(-1), 8), u(0xff));
        assert_eq!(to_width(&BigInt::from(-2), 4), u(0xe));
        assert_eq!(to_width(&BigInt::from(0x1234), 8), u(0x34));
    }
}
