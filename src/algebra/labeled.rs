use std::ops::{Mul, Neg};

use crate::error::EinsumResult;
use crate::label::{validation, Subscript};
use crate::lower;
use crate::tensor::Tensor;

use super::{Addition, Distributive, Expr, Product};

/// A tensor paired with an index labeling and a scalar factor (spec.md §3):
/// the building block of the expression algebra. `labels.len() ==
/// tensor.rank()`; a label may repeat within one `LabeledTensor` only to
/// express a trace/diagonal over those axes (spec.md §9).
#[derive(Clone)]
pub struct LabeledTensor {
    pub(crate) tensor: Tensor,
    pub(crate) labels: Subscript,
    pub(crate) factor: f64,
}

impl LabeledTensor {
    pub(crate) fn new(tensor: Tensor, labels: Subscript) -> EinsumResult<Self> {
        let shape = tensor.shape();
        validation::validate_rank(&shape, &labels)?;
        validation::validate_repeats_consistent(&shape, &labels)?;
        Ok(Self { tensor, labels, factor: 1.0 })
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    pub fn labels(&self) -> &Subscript {
        &self.labels
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// `target(indices) = expr` (spec.md §4.E): overwrites the target.
    pub fn assign(self, expr: impl Into<Expr>) -> EinsumResult<()> {
        lower::lower_assignment(self, expr.into(), lower::AssignOp::Assign)
    }

    /// `target(indices) += expr`: accumulates onto the target.
    pub fn accumulate(self, expr: impl Into<Expr>) -> EinsumResult<()> {
        lower::lower_assignment(self, expr.into(), lower::AssignOp::Accumulate)
    }

    /// `target(indices) -= expr`: negates `expr`'s top-level scalar factor
    /// and accumulates.
    pub fn subtract(self, expr: impl Into<Expr>) -> EinsumResult<()> {
        lower::lower_assignment(self, expr.into(), lower::AssignOp::Subtract)
    }
}

impl Mul<f64> for LabeledTensor {
    type Output = LabeledTensor;
    fn mul(mut self, rhs: f64) -> LabeledTensor {
        self.factor *= rhs;
        self
    }
}

impl Mul<LabeledTensor> for f64 {
    type Output = LabeledTensor;
    fn mul(self, mut rhs: LabeledTensor) -> LabeledTensor {
        rhs.factor *= self;
        rhs
    }
}

impl Neg for LabeledTensor {
    type Output = LabeledTensor;
    fn neg(mut self) -> LabeledTensor {
        self.factor = -self.factor;
        self
    }
}

/// `LabeledTensor * LabeledTensor -> Product` (spec.md §4.C).
impl Mul<LabeledTensor> for LabeledTensor {
    type Output = Product;
    fn mul(self, rhs: LabeledTensor) -> Product {
        Product::from_terms(vec![self, rhs])
    }
}

/// `LabeledTensor * Addition -> Distributive` (spec.md §4.C): `L · Σ`.
impl Mul<Addition> for LabeledTensor {
    type Output = Distributive;
    fn mul(self, rhs: Addition) -> Distributive {
        Distributive::new(self, rhs)
    }
}

impl std::ops::Add<LabeledTensor> for LabeledTensor {
    type Output = Addition;
    fn add(self, rhs: LabeledTensor) -> Addition {
        Addition::from_first(self).add_labeled(rhs)
    }
}

impl std::ops::Sub<LabeledTensor> for LabeledTensor {
    type Output = Addition;
    fn sub(self, rhs: LabeledTensor) -> Addition {
        Addition::from_first(self).sub_labeled(rhs)
    }
}
