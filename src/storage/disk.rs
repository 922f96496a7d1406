//! Disk-backed storage (behind the `disk-backend` feature).
//!
//! Real paging is out of scope for this crate (spec.md's Non-goals exclude
//! an out-of-core execution engine); this backend stands in for one by
//! staging the whole tensor through an [`InCoreStorage`] and answering every
//! arithmetic method by delegating to it, while refusing raw buffer access
//! per spec.md §3 ("Buffer access is permitted only for the in-core
//! backend").

use crate::error::{EinsumError, EinsumResult};
use crate::kernels::AxisRange;

use super::backend::{BackendKind, Storage};
use super::in_core::InCoreStorage;

/// Disk-backed tensor storage. Holds its staged contents in an in-core
/// buffer; a real deployment would flush/fault this against a file.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    staging: InCoreStorage,
}

impl DiskStorage {
    pub fn zeros(shape: &[usize]) -> Self {
        Self { staging: InCoreStorage::zeros(shape) }
    }

    pub fn from_values(shape: &[usize], values: Vec<f64>) -> EinsumResult<Self> {
        Ok(Self { staging: InCoreStorage::from_values(shape, values)? })
    }

    fn unsupported(op: &str) -> EinsumError {
        EinsumError::unsupported(format!("raw buffer access ({op}) is unavailable on the disk backend"))
    }
}

impl Storage for DiskStorage {
    fn backend_kind(&self) -> BackendKind {
        BackendKind::Disk
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
