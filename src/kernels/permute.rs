//! Generalized transpose: `C(Ci) <- alpha * A(Ai) + beta * C(Ci)` where `Ci`
//! is a permutation of `Ai` (spec.md §4.B "Permute"). Handles self-contraction
//! on `A` first (spec.md §9) so callers never need to pre-reduce repeated
//! labels themselves.

use rayon::prelude::*;

use crate::error::{EinsumError, EinsumResult};
use crate::label::validation::validate_is_permutation;

use super::diagonal::reduce_repeats;
use super::strides::{row_major_strides, Odometer};

/// Below this many output elements, the odometer loop runs on the calling
/// thread; splitting the outer axis across a `rayon` scope only pays for
/// itself once there is enough work per block to amortize the split.
const PARALLEL_ELEMENT_THRESHOLD: usize = 1 << 16;

/// Computes `c = alpha * permute(a) + beta * c` in place.
///
/// `a_labels` may repeat a label (a trace/diagonal axis); any label absent
/// from `c_labels` is summed away, any label present in both is kept as a
/// single axis. After that reduction, `c_labels` must be an exact
/// permutation of the reduced, label-unique subscript.
///
/// When `parallel` is set and the output is large enough, the outer axis of
/// `C` is split across a `rayon` thread pool (spec.md §5: "a faithful
/// implementation may also parallelize the permute odometer loop over its
/// outer axis"); each split owns a disjoint, contiguous slice of `c` since
/// row-major layout makes axis 0 the coarsest stride.
pub fn permute(
    c: &mut [f64],
    c_shape: &[usize],
    c_labels: &[char],
    a: &[f64],
    a_shape: &[usize],
    a_labels: &[char],
    alpha: f64,
    beta: f64,
    parallel: bool,
) -> EinsumResult<()> {
    let keep: std::collections::HashSet<char> = c_labels.iter().copied().collect();
    let (a_values, a_shape_reduced, a_labels_reduced) =
        reduce_repeats(a, a_shape, a_labels, |label| keep.contains(&label));

    validate_is_permutation(c_labels, &a_labels_reduced)?;

    if c_shape.is_empty() {
        if c.len() != 1 || a_values.len() != 1 {
            return Err(EinsumError::planning(
                "rank-0 permute requires both operands to hold exactly one element",
            ));
        }
        c[0] = if beta == 0.0 { alpha * a_values[0] } else { alpha * a_values[0] + beta * c[0] };
        return Ok(());
    }

    // axis_in_a[k] = the axis of the reduced `a` that supplies output axis k.
    let axis_in_a: Vec<usize> = c_labels
        .iter()
        .map(|&label| a_labels_reduced.iter().position(|&x| x == label).unwrap())
        .collect();

    let a_strides = row_major_strides(&a_shape_reduced);
    let c_strides = row_major_strides(c_shape);

    let outer = c_shape[0];
    let block = c_strides[0];
    let total = outer * block;

    if parallel && c_shape.len() > 1 && total >= PARALLEL_ELEMENT_THRESHOLD && outer > 1 {
        c.par_chunks_mut(block).enumerate().for_each(|(i0, block_out)| {
            permute_block(block_out, &c_shape[1..], &c_strides[1..], i0, &a_values, &a_strides, &axis_in_a, alpha, beta);
        });
    } else {
        permute_sequential(c, c_shape, &c_strides, &a_values, &a_strides, &axis_in_a, alpha, beta);
    }

    Ok(())
}

/// Sequential odometer over the whole output, used when parallelism is
/// disabled or not worth the split.
#[allow(clippy::too_many_arguments)]
fn permute_sequential(
    c: &mut [f64],
    c_shape: &[usize],
    c_strides: &[usize],
    a_values: &[f64],
    a_strides: &[usize],
    axis_in_a: &[usize],
    alpha: f64,
    beta: f64,
) {
    let overwrite = beta == 0.0;
    let mut odo = Odometer::new(c_shape);
    loop {
        let idx = odo.current();
        let mut a_offset = 0usize;
        let mut c_offset = 0usize;
        for (k, &i) in idx.iter().enumerate() {
            c_offset += i * c_strides[k];
            a_offset += i * a_strides[axis_in_a[k]];
        }
        // beta == 0 must overwrite, not read C: C may hold NaN (spec.md §3).
        c[c_offset] = if overwrite { alpha * a_values[a_offset] } else { alpha * a_values[a_offset] + beta * c[c_offset] };
        if !odo.advance() {
            break;
        }
    }
}

/// One outer-axis slice's worth of work: `block_out` is the contiguous
/// region of `c` for fixed outer index `i0`; `inner_shape`/`inner_strides`
/// describe the remaining axes.
#[allow(clippy::too_many_arguments)]
fn permute_block(
    block_out: &mut [f64],
    inner_shape: &[usize],
    inner_strides: &[usize],
    i0: usize,
    a_values: &[f64],
    a_strides: &[usize],
    axis_in_a: &[usize],
    alpha: f64,
    beta: f64,
) {
    let overwrite = beta == 0.0;
    let a_base = i0 * a_strides[axis_in_a[0]];
    if inner_shape.is_empty() {
        block_out[0] = if overwrite { alpha * a_values[a_base] } else { alpha * a_values[a_base] + beta * block_out[0] };
        return;
    }
    let mut odo = Odometer::new(inner_shape);
    loop {
        let idx = odo.current();
        let mut a_offset = a_base;
        let mut c_offset = 0usize;
        for (k, &i) in idx.iter().enumerate() {
            c_offset += i * inner_strides[k];
            a_offset += i * a_strides[axis_in_a[k + 1]];
        }
        // beta == 0 must overwrite, not read C: C may hold NaN (spec.md §3).
        block_out[c_offset] = if overwrite {
            alpha * a_values[a_offset]
        } else {
            alpha * a_values[a_offset] + beta * block_out[c_offset]
        };
        if !odo.advance() {
            break;
        }
    }
}
