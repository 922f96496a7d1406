//! Distributed storage (behind the `distributed-backend` feature).
//!
//! As with [`super::disk`], true sharding across nodes is out of scope; this
//! backend stages the tensor in one in-core buffer and delegates every
//! arithmetic method to it, refusing raw buffer access since no single
//! shard holds the whole tensor in a real deployment.

use crate::error::{EinsumError, EinsumResult};
use crate::kernels::AxisRange;

use super::backend::{BackendKind, Storage};
use super::in_core::InCoreStorage;

/// Distributed tensor storage, staged in-core for this crate's purposes.
#[derive(Debug, Clone)]
pub struct DistributedStorage {
    staging: InCoreStorage,
}

impl DistributedStorage {
    pub fn zeros(shape: &[usize]) -> Self {
        Self { staging: InCoreStorage::zeros(shape) }
    }

    pub fn from_values(shape: &[usize], values: Vec<f64>) -> EinsumResult<Self> {
        Ok(Self { staging: InCoreStorage::from_values(shape, values)? })
    }

    fn unsupported(op: &str) -> EinsumError {
        EinsumError::unsupported(format!(
            "raw buffer access ({op}) is unavailable on the distributed backend"
        ))
    }
}

impl Storage for DistributedStorage {
    fn backend_kind(&self) -> BackendKind {
        BackendKind::Distributed
    }

    fn shape(&self) -> &[usize] {
        self.staging.shape()
    }

    fn dense(&self) -> EinsumResult<&[f64]> {
        Err(Self::unsupported("dense"))
    }

    fn dense_mut(&mut self) -> EinsumResult<&mut [f64]> {
        Err(Self::unsupported("dense_mut"))
    }

    fn zero(&mut self) -> EinsumResult<()> {
        self.staging.zero()
    }

    fn scale(&mut self, alpha: f64) -> EinsumResult<()> {
        self.staging.scale(alpha)
    }

    fn copy(&mut self, other: &dyn Storage, alpha: f64) -> EinsumResult<()> {
        self.staging.copy(other, alpha)
    }

    fn norm(&self, p: i32) -> EinsumResult<f64> {
        self.staging.norm(p)
    }

    fn dot(&self, other: &dyn Storage) -> EinsumResult<f64> {
        self.staging.dot(other)
    }

    fn pointwise_multiply(&mut self, other: &dyn Storage) -> EinsumResult<()> {
        self.staging.pointwise_multiply(other)
    }

    fn pointwise_divide(&mut self, other: &dyn Storage) -> EinsumResult<()> {
        self.staging.pointwise_divide(other)
    }

    fn permute(
        &mut self,
        c_labels: &[char],
        a: &dyn Storage,
        a_labels: &[char],
        alpha: f64,
        beta: f64,
        parallel: bool,
    ) -> EinsumResult<()> {
        self.staging.permute(c_labels, a, a_labels, alpha, beta, parallel)
    }

    fn contract(
        &mut self,
        c_labels: &[char],
        a: &dyn Storage,
        a_labels: &[char],
        b: &dyn Storage,
        b_labels: &[char],
        alpha: f64,
        beta: f64,
        parallel: bool,
    ) -> EinsumResult<()> {
        self.staging.contract(c_labels, a, a_labels, b, b_labels, alpha, beta, parallel)
    }

    fn slice(
        &mut self,
        cranges: &[AxisRange],
        a: &dyn Storage,
        aranges: &[AxisRange],
        alpha: f64,
        beta: f64,
    ) -> EinsumResult<()> {
        self.staging.slice(cranges, a, aranges, alpha, beta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_buffer_access_is_unsupported() {
        let s = DistributedStorage::zeros(&[2, 2]);
        assert!(s.dense_mut().is_err());
    }
}
