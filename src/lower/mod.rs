//! The expression lowerer (spec.md §4.E, component E): accepts an
//! assignment of an AST node to a labeled target and emits a schedule of
//! primitive kernel calls, allocating temporaries and honoring the
//! `= / += / -=` accumulation discipline and scalar factors.
//!
//! Entry points are [`crate::LabeledTensor::assign`]/`accumulate`/
//! `subtract` and [`crate::SlicedTensor::assign`]/`accumulate`/`subtract`;
//! this module is otherwise internal.

use tracing::debug;

use crate::algebra::{Addition, AdditionTerm, Expr, LabeledTensor, Product, SlicedTensor};
use crate::error::{EinsumError, EinsumResult};
use crate::label::{validation, ProductShape, Subscript};
use crate::optimization::{branch_bound_path, greedy_path, optimal_path, ContractionPath, CostModel};
use crate::tensor::Tensor;

/// Kept alongside [`ExecutionConfig`]; the planner strategy enum is owned by
/// the optimization component (spec.md §4.D) and re-exported here since the
/// lowerer is the component that consumes it.
pub use crate::optimization::ContractionStrategy;

/// Largest N for which the exhaustive/DP contraction-order search runs
/// under [`ContractionStrategy::Auto`] (spec.md §4.D: "accepted for small N
/// (≤ 6)"). Above this, `Auto` falls back to the greedy heuristic.
const AUTO_EXHAUSTIVE_LIMIT: usize = 6;

/// Largest N for which an explicitly requested `Optimal`/`BranchBound`
/// strategy is honored before falling back to greedy, bounding the
/// exponential cost of either search when a caller opts in directly.
const EXPLICIT_STRATEGY_LIMIT: usize = 12;

/// Execution-time knobs the component design of spec.md assumes exist
/// (SPEC_FULL.md §12).
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Which pairwise ordering search to run for N-way products.
    pub strategy: ContractionStrategy,
    /// FLOPs/memory weighting used by the planner's cost metric.
    pub cost_model: CostModel,
    /// Eagerly validate shapes/labels before any kernel runs (spec.md §7).
    /// Disabling this trades safety for latency; kernels still fail on
    /// genuine mismatches, but the target may be partially mutated first.
    pub validate_shapes: bool,
    /// Whether the permute odometer's outer axis may be split across a
    /// `rayon` scope (spec.md §5).
    pub parallel_permute: bool,
    /// Optional cap on lowerer temporaries' combined byte size. `None`
    /// means unlimited.
    pub workspace_limit_bytes: Option<usize>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            strategy: ContractionStrategy::Auto,
            cost_model: CostModel::cpu(),
            validate_shapes: true,
            parallel_permute: true,
            workspace_limit_bytes: None,
        }
    }
}

impl ExecutionConfig {
    /// Minimal validation, greedy ordering: favors latency over safety.
    pub fn fast() -> Self {
        Self { strategy: ContractionStrategy::Greedy, validate_shapes: false, ..Self::default() }
    }

    /// Full validation, optimal ordering where feasible: favors
    /// correctness/predictability over latency.
    pub fn safe() -> Self {
        Self { strategy: ContractionStrategy::Auto, validate_shapes: true, ..Self::default() }
    }
}

/// Which accumulation discipline an assignment uses (spec.md §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`: overwrites the target. Lowers with `beta = 0`, which the
    /// kernels treat as an unconditional overwrite even over NaN (spec.md
    /// §3 invariant, §8 testable property 6).
    Assign,
    /// `+=`: accumulates onto the target (`beta = 1`).
    Accumulate,
    /// `-=`: negates the expression's top-level scalar factor and
    /// accumulates (`beta = 1`).
    Subtract,
}

impl AssignOp {
    fn beta(self) -> f64 {
        match self {
            AssignOp::Assign => 0.0,
            AssignOp::Accumulate | AssignOp::Subtract => 1.0,
        }
    }

    fn sign(self) -> f64 {
        match self {
            AssignOp::Subtract => -1.0,
            AssignOp::Assign | AssignOp::Accumulate => 1.0,
        }
    }
}

/// Entry point for `target(indices) op= expr` (spec.md §4.E).
pub(crate) fn lower_assignment(target: LabeledTensor, expr: Expr, op: AssignOp) -> EinsumResult<()> {
    lower_assignment_with(&ExecutionConfig::default(), target, expr, op)
}

/// As [`lower_assignment`], but against an explicit [`ExecutionConfig`].
pub fn lower_assignment_with(
    config: &ExecutionConfig,
    target: LabeledTensor,
    expr: Expr,
    op: AssignOp,
) -> EinsumResult<()> {
    let sign = op.sign();
    let beta = op.beta();
    debug!(target: "lower", target = %target.labels(), op = ?op, "lowering assignment");
    match expr {
        Expr::Labeled(source) => execute_labeled(config, &target, &source, sign, beta),
        Expr::Product(product) => execute_product(config, &target, &product, sign, beta),
        Expr::Addition(addition) => lower_addition(config, &target, &addition, sign, beta),
        Expr::Distributive(dist) => lower_addition(config, &target, &dist.expand(), sign, beta),
    }
}

/// Entry point for `target[Cranges] op= f · source[Aranges]` (spec.md §4.F).
pub(crate) fn lower_slice_assignment(
    target: SlicedTensor,
    source: SlicedTensor,
    op: AssignOp,
) -> EinsumResult<()> {
    let alpha = op.sign() * source.factor;
    let beta = op.beta();
    debug!(target: "lower", op = ?op, "lowering slice assignment");
    let src_storage = source.tensor.storage();
    target.tensor.storage_mut().slice(&target.ranges, &**src_storage, &source.ranges, alpha, beta)
}

fn lower_addition(
    config: &ExecutionConfig,
    target: &LabeledTensor,
    addition: &Addition,
    sign: f64,
    beta0: f64,
) -> EinsumResult<()> {
    let terms = addition.terms();
    if terms.is_empty() {
        return Err(EinsumError::planning("addition has no terms to lower"));
    }
    for (idx, term) in terms.iter().enumerate() {
        // The first term fuses the top-level op's beta (zeroing the target
        // for `=`); every later term accumulates onto what came before
        // (spec.md §4.E: "Lower each term in order with += into the
        // target; for =, zero the target first").
        let beta = if idx == 0 { beta0 } else { 1.0 };
        match term {
            AdditionTerm::Labeled(l) => execute_labeled(config, target, l, sign, beta)?,
            AdditionTerm::Product(p) => execute_product(config, target, p, sign, beta)?,
        }
    }
    Ok(())
}

/// Labeled ← Labeled (spec.md §4.E): a pure relabeling, including
/// self-contraction (trace/diagonal, spec.md §9) when `source`'s subscript
/// repeats a label.
fn execute_labeled(
    config: &ExecutionConfig,
    target: &LabeledTensor,
    source: &LabeledTensor,
    sign: f64,
    beta: f64,
) -> EinsumResult<()> {
    if config.validate_shapes {
        let shape = source.tensor().shape();
        validation::validate_rank(&shape, source.labels())?;
        validation::validate_repeats_consistent(&shape, source.labels())?;
    }

    let alpha = sign * source.factor();
    let c_labels = target.labels().as_slice();
    let a_labels = source.labels().as_slice();

    if target.tensor().is_same_storage(source.tensor()) {
        // Alias-safety (spec.md §5): write into a temporary, then combine
        // into the target via an identity permute that applies beta.
        let tmp = Tensor::new(
            target.tensor().backend_kind(),
            format!("{}$tmp", target.tensor().name()),
            &target.tensor().shape(),
        )?;
        {
            let src = source.tensor().storage();
            tmp.storage_mut().permute(c_labels, &**src, a_labels, alpha, 0.0, config.parallel_permute)?;
        }
        let tmp_storage = tmp.storage();
        target.tensor().storage_mut().permute(c_labels, &**tmp_storage, c_labels, 1.0, beta, config.parallel_permute)?;
    } else {
        let src = source.tensor().storage();
        target.tensor().storage_mut().permute(c_labels, &**src, a_labels, alpha, beta, config.parallel_permute)?;
    }
    Ok(())
}

/// Labeled ← Product (spec.md §4.E): plans the N-way product with the
/// contraction planner (spec.md §4.D), executes each pair-step into a
/// temporary, and writes the final pair-step into the target.
fn execute_product(
    config: &ExecutionConfig,
    target: &LabeledTensor,
    product: &Product,
    sign: f64,
    beta: f64,
) -> EinsumResult<()> {
    let terms = product.terms();
    if terms.is_empty() {
        return Err(EinsumError::planning("product has no terms to lower"));
    }

    if config.validate_shapes {
        validate_product_shapes(target, terms)?;
    }

    if terms.len() == 1 {
        let combined = terms[0].clone() * product.factor;
        return execute_labeled(config, target, &combined, sign, beta);
    }

    let mut operands: Vec<(Tensor, Vec<char>)> =
        terms.iter().map(|t| (t.tensor().clone(), t.labels().as_slice().to_vec())).collect();

    let product_shape = ProductShape::new(
        terms.iter().map(|t| t.labels().clone()).collect(),
        target.labels().clone(),
    );
    let shapes: Vec<Vec<usize>> = terms.iter().map(|t| t.tensor().shape()).collect();
    let shape_refs: Vec<&[usize]> = shapes.iter().map(|s| s.as_slice()).collect();

    let path = choose_path(config, &product_shape, &shape_refs);
    if path.is_empty() {
        return Err(EinsumError::planning("N-way product planner returned an empty path"));
    }
    debug!(
        target: "planner",
        n = terms.len(),
        steps = path.len(),
        flops = path.total_flops(),
        "planned N-way product"
    );

    let overall_alpha = sign * product.scalar_factor();
    let num_steps = path.len();

    for (step_idx, step) in path.steps().iter().enumerate() {
        let (i, j) = step.inputs;
        let a = operands[i].clone();
        let b = operands[j].clone();
        let result_labels = step.result_indices.clone();
        let is_last = step_idx + 1 == num_steps;

        let extent_of = |label: char| -> usize {
            a.1.iter()
                .position(|&c| c == label)
                .map(|axis| a.0.shape()[axis])
                .or_else(|| b.1.iter().position(|&c| c == label).map(|axis| b.0.shape()[axis]))
                .expect("planner-produced result label must be bound by one operand")
        };
        let result_shape: Vec<usize> = result_labels.iter().map(|&l| extent_of(l)).collect();

        // The planner is free to choose any label order for a step's result
        // (`step.result_indices`); only on the last step must that order be
        // reconciled with the target's declared subscript, since the
        // planner's choice need not match `target.labels()` (e.g. a greedy
        // path can emit "li" for a target declared "il").
        let reconcile_to_target = is_last && result_labels.as_slice() != target.labels().as_slice();
        let (step_alpha, step_beta, out) = if is_last && !reconcile_to_target {
            (overall_alpha, beta, target.tensor().clone())
        } else if is_last {
            let name = format!("{}$tfinal", target.tensor().name());
            (overall_alpha, 0.0, Tensor::new(target.tensor().backend_kind(), name, &result_shape)?)
        } else {
            let name = format!("{}$t{step_idx}", target.tensor().name());
            (1.0, 0.0, Tensor::new(target.tensor().backend_kind(), name, &result_shape)?)
        };

        debug!(
            target: "lower",
            step = step_idx,
            result = %result_labels.iter().collect::<String>(),
            "dispatching contract primitive"
        );

        if out.is_same_storage(&a.0) || out.is_same_storage(&b.0) {
            let tmp = Tensor::new(
                out.backend_kind(),
                format!("{}$alias{step_idx}", out.name()),
                &result_shape,
            )?;
            {
                let a_storage = a.0.storage();
                let b_storage = b.0.storage();
                tmp.storage_mut().contract(
                    &result_labels, &**a_storage, &a.1, &**b_storage, &b.1, step_alpha, 0.0, config.parallel_permute,
                )?;
            }
            let tmp_storage = tmp.storage();
            out.storage_mut().permute(&result_labels, &**tmp_storage, &result_labels, 1.0, step_beta, config.parallel_permute)?;
        } else {
            let a_storage = a.0.storage();
            let b_storage = b.0.storage();
            out.storage_mut().contract(
                &result_labels, &**a_storage, &a.1, &**b_storage, &b.1, step_alpha, step_beta, config.parallel_permute,
            )?;
        }

        if reconcile_to_target {
            // `out` holds the final contraction in `result_labels` order;
            // fold it into the target's own label order with an identity
            // permute, applying the real `beta` here since this is the
            // write that actually lands in the target (spec.md §3).
            let c_labels = target.labels().as_slice();
            let out_storage = out.storage();
            target.tensor().storage_mut().permute(c_labels, &**out_storage, &result_labels, 1.0, beta, config.parallel_permute)?;
            return Ok(());
        }

        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        operands.remove(hi);
        operands.remove(lo);
        operands.push((out, result_labels));
    }

    Ok(())
}

/// Eager validation for an N-way product (spec.md §7): builds the
/// label→extent map across every operand and the target, failing with
/// `shape-mismatch`/`label-mismatch` before any kernel runs.
fn validate_product_shapes(target: &LabeledTensor, terms: &[LabeledTensor]) -> EinsumResult<()> {
    let shapes: Vec<Vec<usize>> = terms.iter().map(|t| t.tensor().shape()).collect();
    let target_shape = target.tensor().shape();

    let mut pairs: Vec<(&[usize], &Subscript)> =
        terms.iter().zip(shapes.iter()).map(|(t, s)| (s.as_slice(), t.labels())).collect();
    pairs.push((target_shape.as_slice(), target.labels()));
    validation::build_extent_map(&pairs)?;

    let operand_labels: Vec<&Subscript> = terms.iter().map(|t| t.labels()).collect();
    validation::validate_output_bound(&operand_labels, target.labels())
}

fn choose_path(config: &ExecutionConfig, product: &ProductShape, shapes: &[&[usize]]) -> ContractionPath {
    let n = product.num_inputs();
    match config.strategy {
        ContractionStrategy::Greedy => greedy_path(product, shapes, &config.cost_model),
        ContractionStrategy::Optimal => {
            if n <= EXPLICIT_STRATEGY_LIMIT {
                optimal_path(product, shapes, &config.cost_model)
            } else {
                greedy_path(product, shapes, &config.cost_model)
            }
        }
        ContractionStrategy::BranchBound => {
            if n <= EXPLICIT_STRATEGY_LIMIT {
                branch_bound_path(product, shapes, &config.cost_model)
            } else {
                greedy_path(product, shapes, &config.cost_model)
            }
        }
        ContractionStrategy::Auto => {
            if n <= AUTO_EXHAUSTIVE_LIMIT {
                optimal_path(product, shapes, &config.cost_model)
            } else {
                greedy_path(product, shapes, &config.cost_model)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BackendKind;

    fn tensor(name: &str, shape: &[usize]) -> Tensor {
        Tensor::new(BackendKind::InCore, name, shape).unwrap()
    }

    #[test]
    fn assign_matmul_matches_reference() {
        let a = Tensor::from_values(BackendKind::InCore, "A", &[2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Tensor::from_values(BackendKind::InCore, "B", &[2, 2], vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let c = tensor("C", &[2, 2]);

        c.labeled("ij").unwrap().assign(a.labeled("ik").unwrap() * b.labeled("kj").unwrap()).unwrap();

        assert_eq!(c.buffer().unwrap(), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn trace_lowers_via_labeled_self_contraction() {
        let a = Tensor::from_values(BackendKind::InCore, "A", &[2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let s = tensor("s", &[]);
        s.labeled("").unwrap().assign(a.labeled("ii").unwrap()).unwrap();
        assert_eq!(s.buffer().unwrap(), vec![5.0]);
    }

    #[test]
    fn beta_zero_overwrites_nan_target() {
        let a = Tensor::from_values(BackendKind::InCore, "A", &[2], vec![1.0, 2.0]).unwrap();
        let c = Tensor::from_values(BackendKind::InCore, "C", &[2], vec![f64::NAN, f64::NAN]).unwrap();
        c.labeled("i").unwrap().assign(a.labeled("i").unwrap()).unwrap();
        assert_eq!(c.buffer().unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn self_transpose_does_not_corrupt_source() {
        let a = Tensor::from_values(BackendKind::InCore, "A", &[2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        a.labeled("ij").unwrap().assign(a.labeled("ji").unwrap()).unwrap();
        assert_eq!(a.buffer().unwrap(), vec![1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn three_way_product_chains_through_planner() {
        let identity = |n: usize| -> Vec<f64> {
            let mut v = vec![0.0; n * n];
            for i in 0..n {
                v[i * n + i] = 1.0;
            }
            v
        };
        let a = Tensor::from_values(BackendKind::InCore, "A", &[3, 3], identity(3)).unwrap();
        let b = Tensor::from_values(BackendKind::InCore, "B", &[3, 3], identity(3)).unwrap();
        let d = Tensor::from_values(BackendKind::InCore, "D", &[3, 3], identity(3)).unwrap();
        let c = tensor("C", &[3, 3]);

        c.labeled("il")
            .unwrap()
            .assign(a.labeled("ij").unwrap() * b.labeled("jk").unwrap() * d.labeled("kl").unwrap())
            .unwrap();

        assert_eq!(c.buffer().unwrap(), identity(3));
    }

    #[test]
    fn transposed_matmul_target_matches_reference() {
        // C("ji") = A("ik") * B("kj") — the target's declared order is the
        // transpose of the natural "ij" result, so whatever order the
        // planner emits for the (only) pair-step must be reconciled to
        // "ji" before it lands in C.
        let a = Tensor::from_values(BackendKind::InCore, "A", &[2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Tensor::from_values(BackendKind::InCore, "B", &[2, 2], vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let c = tensor("C", &[2, 2]);

        c.labeled("ji").unwrap().assign(a.labeled("ik").unwrap() * b.labeled("kj").unwrap()).unwrap();

        // A*B (ij order) = [[19,22],[43,50]]; C("ji") holds the transpose.
        assert_eq!(c.buffer().unwrap(), vec![19.0, 43.0, 22.0, 50.0]);
    }

    #[test]
    fn non_square_three_way_chain_with_reordered_target() {
        // A is 2x3, B is 3x4, D is 4x5; target is declared "li" (transposed
        // relative to the natural "il" chain result), so extents along the
        // mismatched axes (2 vs 5) would make a naive write into the target
        // at the planner's own result order panic out of bounds.
        let a = Tensor::from_values(
            BackendKind::InCore,
            "A",
            &[2, 3],
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        )
        .unwrap();
        let b = Tensor::from_values(
            BackendKind::InCore,
            "B",
            &[3, 4],
            vec![1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0],
        )
        .unwrap();
        let d = Tensor::from_values(
            BackendKind::InCore,
            "D",
            &[4, 5],
            vec![
                1.0, 0.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0, 0.0,
            ],
        )
        .unwrap();

        // Reference: il = sum_j sum_k A(ij) B(jk) D(kl), computed directly.
        let a_v = a.buffer().unwrap();
        let b_v = b.buffer().unwrap();
        let d_v = d.buffer().unwrap();
        let (n_i, n_j, n_k, n_l) = (2, 3, 4, 5);
        let mut reference = vec![0.0; n_i * n_l];
        for i in 0..n_i {
            for l in 0..n_l {
                let mut acc = 0.0;
                for j in 0..n_j {
                    for k in 0..n_k {
                        acc += a_v[i * n_j + j] * b_v[j * n_k + k] * d_v[k * n_l + l];
                    }
                }
                reference[i * n_l + l] = acc;
            }
        }

        let c = tensor("C", &[n_l, n_i]);
        c.labeled("li")
            .unwrap()
            .assign(a.labeled("ij").unwrap() * b.labeled("jk").unwrap() * d.labeled("kl").unwrap())
            .unwrap();

        let c_v = c.buffer().unwrap();
        for i in 0..n_i {
            for l in 0..n_l {
                assert_eq!(c_v[l * n_i + i], reference[i * n_l + l]);
            }
        }
    }

    #[test]
    fn distributive_matches_expanded_difference() {
        let d = Tensor::from_values(BackendKind::InCore, "D", &[2, 2], vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let j = Tensor::from_values(BackendKind::InCore, "J", &[2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let k = Tensor::from_values(BackendKind::InCore, "K", &[2, 2], vec![4.0, 3.0, 2.0, 1.0]).unwrap();

        let lhs = tensor("lhs", &[2, 2]);
        lhs.labeled("ij")
            .unwrap()
            .assign(d.labeled("ik").unwrap() * (j.labeled("kj").unwrap() - k.labeled("kj").unwrap()))
            .unwrap();

        let rhs = tensor("rhs", &[2, 2]);
        rhs.labeled("ij")
            .unwrap()
            .assign(d.labeled("ik").unwrap() * j.labeled("kj").unwrap())
            .unwrap();
        rhs.labeled("ij")
            .unwrap()
            .subtract(d.labeled("ik").unwrap() * k.labeled("kj").unwrap())
            .unwrap();

        assert_eq!(lhs.buffer().unwrap(), rhs.buffer().unwrap());
    }
}
