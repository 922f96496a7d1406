//! Eager validation for labeled operations (spec.md §7: validate at lowering
//! time, before any kernel runs, so either the assignment completes
//! entirely or the target is left unchanged).

use std::collections::{HashMap, HashSet};

use crate::error::{EinsumError, EinsumResult};
use crate::label::Subscript;

/// Checks that a subscript's length matches a tensor's rank.
pub fn validate_rank(shape: &[usize], labels: &Subscript) -> EinsumResult<()> {
    if shape.len() != labels.len() {
        return Err(EinsumError::label(format!(
            "subscript '{labels}' has {} labels but the tensor has rank {}",
            labels.len(),
            shape.len()
        )));
    }
    Ok(())
}

/// Checks that any label repeated within a single subscript (a trace or
/// diagonal axis, spec.md §3) names axes of equal extent.
pub fn validate_repeats_consistent(shape: &[usize], labels: &Subscript) -> EinsumResult<()> {
    for (label, axes) in labels.occurrences() {
        if axes.len() < 2 {
            continue;
        }
        let expected = shape[axes[0]];
        for &axis in &axes[1..] {
            if shape[axis] != expected {
                return Err(EinsumError::shape(label, expected, shape[axis]));
            }
        }
    }
    Ok(())
}

/// Checks that `c` is a permutation of `a` (same multiset of labels).
pub fn validate_is_permutation(c: &[char], a: &[char]) -> EinsumResult<()> {
    if c.len() != a.len() {
        return Err(EinsumError::label(format!(
            "permute requires equal rank: target has {} labels, source has {}",
            c.len(),
            a.len()
        )));
    }
    let mut sorted_c: Vec<char> = c.to_vec();
    let mut sorted_a: Vec<char> = a.to_vec();
    sorted_c.sort_unstable();
    sorted_a.sort_unstable();
    if sorted_c != sorted_a {
        return Err(EinsumError::label(format!(
            "target labels '{}' are not a permutation of source labels '{}'",
            c.iter().collect::<String>(),
            a.iter().collect::<String>(),
        )));
    }
    Ok(())
}

/// Builds a label→extent map from a set of (shape, labels) operands,
/// failing with `shape-mismatch` the moment two operands disagree on the
/// extent of a shared label. Mirrors spec.md §3's invariant that every
/// internal label's extent must be consistent across all its occurrences.
pub fn build_extent_map(operands: &[(&[usize], &Subscript)]) -> EinsumResult<HashMap<char, usize>> {
    let mut map = HashMap::new();
    for (shape, labels) in operands {
        for (axis, label) in labels.iter().enumerate() {
            let extent = shape[axis];
            match map.get(&label) {
                Some(&existing) if existing != extent => {
                    return Err(EinsumError::shape(label, existing, extent));
                }
                _ => {
                    map.insert(label, extent);
                }
            }
        }
    }
    Ok(map)
}

/// Checks that every label in `output` is bound by at least one operand.
pub fn validate_output_bound(operands: &[&Subscript], output: &Subscript) -> EinsumResult<()> {
    let mut bound: HashSet<char> = HashSet::new();
    for sub in operands {
        bound.extend(sub.iter());
    }
    for label in output.iter() {
        if !bound.contains(&label) {
            return Err(EinsumError::label(format!(
                "output label '{label}' does not appear in any operand"
            )));
        }
    }
    Ok(())
}
