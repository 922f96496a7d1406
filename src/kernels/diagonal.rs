//! Self-contraction reduction for a single operand whose subscript repeats
//! a label (spec.md §9 open question): a repeated label is a
//! **diagonal extraction** when the target keeps that label, and a
//! **trace** (summed away) when the target does not.
//!
//! Both behaviors fall out of the same odometer pass: positions where the
//! repeated axes disagree contribute nothing, and positions where they
//! agree accumulate into the collapsed output. For a kept label the
//! collapsed output position is injective in the source position (pure
//! relabeling); for a dropped label many source positions collapse onto
//! one output position and their contributions sum (a trace).

use std::collections::HashMap;

use super::strides::{row_major_strides, Odometer};

/// Reduces `values` (shape `shape`, subscript `labels`) by collapsing every
/// repeated label into a single axis. Labels for which `keep` returns
/// `true` retain that axis (diagonal); labels for which it returns `false`
/// are summed away (trace).
///
/// Returns the reduced buffer, its shape, and its (now label-unique)
/// subscript, preserving the order of each label's first occurrence.
pub fn reduce_repeats(
    values: &[f64],
    shape: &[usize],
    labels: &[char],
    keep: impl Fn(char) -> bool,
) -> (Vec<f64>, Vec<usize>, Vec<char>) {
    let mut occurrences: HashMap<char, Vec<usize>> = HashMap::new();
    for (axis, &label) in labels.iter().enumerate() {
        occurrences.entry(label).or_default().push(axis);
    }

    let mut out_labels: Vec<char> = Vec::new();
    let mut out_axis_source: Vec<usize> = Vec::new();
    let mut seen: HashMap<char, ()> = HashMap::new();
    for &label in labels.iter() {
        if seen.contains_key(&label) {
            continue;
        }
        seen.insert(label, ());
        let repeated = occurrences[&label].len() > 1;
        if repeated && !keep(label) {
            continue;
        }
        out_labels.push(label);
        out_axis_source.push(*occurrences[&label].first().unwrap());
    }

    let out_shape: Vec<usize> = out_axis_source.iter().map(|&axis| shape[axis]).collect();
    let out_strides = row_major_strides(&out_shape);
    let in_strides = row_major_strides(shape);
    let mut out = vec![0.0f64; out_shape.iter().product()];

    let mut odo = Odometer::new(shape);
    loop {
        let idx = odo.current();
        let diagonal_ok = occurrences.values().all(|axes| {
            let first = idx[axes[0]];
            axes[1..].iter().all(|&axis| idx[axis] == first)
        });
        if diagonal_ok {
            let mut out_offset = 0usize;
            for (k, &src_axis) in out_axis_source.iter().enumerate() {
                out_offset += idx[src_axis] * out_strides[k];
            }
            let mut in_offset = 0usize;
            for (axis, &i) in idx.iter().enumerate() {
                in_offset += i * in_strides[axis];
            }
            out[out_offset] += values[in_offset];
        }
        if !odo.advance() {
            break;
        }
    }

    (out, out_shape, out_labels)
}
