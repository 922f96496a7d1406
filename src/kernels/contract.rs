//! General pairwise contraction `C(Ci) <- alpha * sum_K A(Ai) * B(Bi) + beta * C(Ci)`
//! (spec.md §4.B). Every pairwise step the planner emits, whatever its label
//! shape, reduces to one batched GEMM: labels are partitioned into Hadamard
//! (batch), contracted (summed), and per-operand-only axes, both operands
//! are materialized into a canonical `(batch, rows, inner)` / `(batch, inner,
//! cols)` layout via [`permute`], `cblas::dgemm` is invoked once per batch
//! index, and the `(batch, rows, cols)` result is permuted into `C`'s label
//! order with the caller's `alpha`/`beta`.

use cblas::{dgemm, Layout, Transpose};

use crate::error::EinsumResult;
use crate::label::classify_pair;

use super::diagonal::reduce_repeats;
use super::permute::permute;
use super::strides::element_count;

/// Computes `c = alpha * contract(a, b) + beta * c`.
///
/// `parallel` is forwarded to the canonicalizing [`permute`] calls that
/// materialize `a`/`b`/the GEMM output into the Hadamard-batch layout
/// (spec.md §5); the `dgemm` call itself parallelizes internally regardless.
#[allow(clippy::too_many_arguments)]
pub fn contract(
    c: &mut [f64],
    c_shape: &[usize],
    c_labels: &[char],
    a: &[f64],
    a_shape: &[usize],
    a_labels: &[char],
    b: &[f64],
    b_shape: &[usize],
    b_labels: &[char],
    alpha: f64,
    beta: f64,
    parallel: bool,
) -> EinsumResult<()> {
    let keep_a: std::collections::HashSet<char> =
        b_labels.iter().chain(c_labels.iter()).copied().collect();
    let (a_values, a_shape, a_labels) = reduce_repeats(a, a_shape, a_labels, |l| keep_a.contains(&l));
    let keep_b: std::collections::HashSet<char> =
        a_labels.iter().chain(c_labels.iter()).copied().collect();
    let (b_values, b_shape, b_labels) = reduce_repeats(b, b_shape, b_labels, |l| keep_b.contains(&l));

    let classification = classify_pair(&a_labels, &b_labels, c_labels)?;

    let extent_of = |label: char| -> usize {
        a_labels
            .iter()
            .position(|&x| x == label)
            .map(|axis| a_shape[axis])
            .or_else(|| b_labels.iter().position(|&x| x == label).map(|axis| b_shape[axis]))
            .expect("label classified from a/b must occur in one of them")
    };

    let batch_labels = classification.hadamard.clone();
    let inner_labels = classification.contracted.clone();
    let rows_labels = classification.only_a.clone();
    let cols_labels = classification.only_b.clone();

    let batch_shape: Vec<usize> = batch_labels.iter().map(|&l| extent_of(l)).collect();
    let rows_shape: Vec<usize> = rows_labels.iter().map(|&l| extent_of(l)).collect();
    let cols_shape: Vec<usize> = cols_labels.iter().map(|&l| extent_of(l)).collect();
    let inner_shape: Vec<usize> = inner_labels.iter().map(|&l| extent_of(l)).collect();

    let batch_count: usize = batch_shape.iter().product::<usize>().max(1);
    let rows: usize = rows_shape.iter().product::<usize>().max(1);
    let cols: usize = cols_shape.iter().product::<usize>().max(1);
    let inner: usize = inner_shape.iter().product::<usize>().max(1);

    let a_canon_labels: Vec<char> =
        batch_labels.iter().chain(rows_labels.iter()).chain(inner_labels.iter()).copied().collect();
    let a_canon_shape: Vec<usize> =
        batch_shape.iter().chain(rows_shape.iter()).chain(inner_shape.iter()).copied().collect();
    let b_canon_labels: Vec<char> =
        batch_labels.iter().chain(inner_labels.iter()).chain(cols_labels.iter()).copied().collect();
    let b_canon_shape: Vec<usize> =
        batch_shape.iter().chain(inner_shape.iter()).chain(cols_shape.iter()).copied().collect();
    let out_canon_labels: Vec<char> =
        batch_labels.iter().chain(rows_labels.iter()).chain(cols_labels.iter()).copied().collect();
    let out_canon_shape: Vec<usize> =
        batch_shape.iter().chain(rows_shape.iter()).chain(cols_shape.iter()).copied().collect();

    let mut a_canon = vec![0.0f64; element_count(&a_canon_shape).max(1)];
    permute(&mut a_canon, &a_canon_shape, &a_canon_labels, &a_values, &a_shape, &a_labels, 1.0, 0.0, parallel)?;
    let mut b_canon = vec![0.0f64; element_count(&b_canon_shape).max(1)];
    permute(&mut b_canon, &b_canon_shape, &b_canon_labels, &b_values, &b_shape, &b_labels, 1.0, 0.0, parallel)?;

    let mut out_canon = vec![0.0f64; element_count(&out_canon_shape).max(1)];
    for batch in 0..batch_count {
        let a_off = batch * rows * inner;
        let b_off = batch * inner * cols;
        let c_off = batch * rows * cols;
        unsafe {
            dgemm(
                Layout::RowMajor,
                Transpose::None,
                Transpose::None,
                rows as i32,
                cols as i32,
                inner as i32,
                1.0,
                &a_canon[a_off..a_off + rows * inner],
                inner.max(1) as i32,
                &b_canon[b_off..b_off + inner * cols],
                cols.max(1) as i32,
                0.0,
                &mut out_canon[c_off..c_off + rows * cols],
                cols.max(1) as i32,
            );
        }
    }

    permute(c, c_shape, c_labels, &out_canon, &out_canon_shape, &out_canon_labels, alpha, beta, parallel)
}
