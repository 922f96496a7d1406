//! The backend contract (spec.md §4.A, §6): every tensor's data lives behind
//! a `Storage` implementation, and the algebra/lowering layers never care
//! which one they are talking to beyond its [`BackendKind`].

use std::fmt;

use crate::error::{EinsumError, EinsumResult};
use crate::kernels::{self, AxisRange};

/// Identifies which concrete storage a tensor is backed by.
///
/// Dense kernels are only ever invoked against the in-core backend; disk and
/// distributed backends page blocks in and delegate to it (spec.md §4.A,
/// "Non-in-core backends may implement operations by paging blocks in and
/// delegating to the in-core kernel").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Entire tensor lives in one contiguous row-major buffer.
    InCore,
    /// Tensor is paged to disk; operations page blocks through an in-core
    /// staging buffer.
    Disk,
    /// Tensor is sharded across a distributed in-core staging buffer.
    Distributed,
    /// No particular backend requested; defers to the library default
    /// (in-core).
    Agnostic,
}

/// Storage backend contract (spec.md §4.A).
///
/// Every method has a default implementation phrased in terms of
/// [`Storage::dense`] / [`Storage::dense_mut`], so a backend only has to
/// supply those two (and `shape`/`backend_kind`) to be fully functional.
/// Backends whose data does not live in one contiguous buffer (disk,
/// distributed) override the arithmetic methods directly and leave
/// `dense`/`dense_mut` erroring with [`EinsumError::BackendUnsupported`] —
/// raw buffer access is permitted only for the in-core backend.
pub trait Storage: fmt::Debug {
    /// Which backend this storage is.
    fn backend_kind(&self) -> BackendKind;

    /// Extents, outermost axis first.
    fn shape(&self) -> &[usize];

    /// Number of axes.
    fn rank(&self) -> usize {
        self.shape().len()
    }

    /// Total element count (1 for a rank-0 scalar).
    fn element_count(&self) -> usize {
        self.shape().iter().product()
    }

    /// Raw row-major buffer access. Only the in-core backend supports this.
    fn dense(&self) -> EinsumResult<&[f64]>;

    /// Mutable raw row-major buffer access. Only the in-core backend
    /// supports this.
    fn dense_mut(&mut self) -> EinsumResult<&mut [f64]>;

    /// Sets every element to zero.
    fn zero(&mut self) -> EinsumResult<()> {
        self.dense_mut()?.iter_mut().for_each(|x| *x = 0.0);
        Ok(())
    }

    /// Multiplies every element by `alpha` in place.
    fn scale(&mut self, alpha: f64) -> EinsumResult<()> {
        self.dense_mut()?.iter_mut().for_each(|x| *x *= alpha);
        Ok(())
    }

    /// `self <- alpha * other`, element for element. Shapes must already
    /// agree (label-level reconciliation happens above this layer).
    fn copy(&mut self, other: &dyn Storage, alpha: f64) -> EinsumResult<()> {
        let src = other.dense()?;
        let dst = self.dense_mut()?;
        if dst.len() != src.len() {
            return Err(EinsumError::label(format!(
                "copy: element count mismatch ({} vs {})",
                dst.len(),
                src.len()
            )));
        }
        for (d, s) in dst.iter_mut().zip(src) {
            *d = alpha * s;
        }
        Ok(())
    }

    /// p-norm of the buffer. `p == 0` means the max-abs (infinity) norm.
    fn norm(&self, p: i32) -> EinsumResult<f64> {
        let values = self.dense()?;
        Ok(match p {
            0 => values.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs())),
            1 => values.iter().map(|x| x.abs()).sum(),
            2 => values.iter().map(|x| x * x).sum::<f64>().sqrt(),
            p => values
                .iter()
                .map(|x| x.abs().powi(p))
                .sum::<f64>()
                .powf(1.0 / p as f64),
        })
    }

    /// Flat dot product against another buffer of equal element count.
    fn dot(&self, other: &dyn Storage) -> EinsumResult<f64> {
        let a = self.dense()?;
        let b = other.dense()?;
        if a.len() != b.len() {
            return Err(EinsumError::label(format!(
                "dot: element count mismatch ({} vs {})",
                a.len(),
                b.len()
            )));
        }
        Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
    }

    /// `self <- self .* other`, element for element.
    fn pointwise_multiply(&mut self, other: &dyn Storage) -> EinsumResult<()> {
        let src = other.dense()?;
        let dst = self.dense_mut()?;
        if dst.len() != src.len() {
            return Err(EinsumError::label(format!(
                "pointwise_multiply: element count mismatch ({} vs {})",
                dst.len(),
                src.len()
            )));
        }
        for (d, s) in dst.iter_mut().zip(src) {
            *d *= s;
        }
        Ok(())
    }

    /// `self <- self ./ other`, element for element.
    fn pointwise_divide(&mut self, other: &dyn Storage) -> EinsumResult<()> {
        let src = other.dense()?;
        let dst = self.dense_mut()?;
        if dst.len() != src.len() {
            return Err(EinsumError::label(format!(
                "pointwise_divide: element count mismatch ({} vs {})",
                dst.len(),
                src.len()
            )));
        }
        for (d, s) in dst.iter_mut().zip(src) {
            *d /= s;
        }
        Ok(())
    }

    /// `self(c_labels) <- alpha * a(a_labels) + beta * self(c_labels)`.
    ///
    /// `parallel` permits splitting the odometer loop's outer axis across a
    /// `rayon` thread pool for large permutes (spec.md §5); callers that
    /// only ever touch small tensors can safely pass `false`.
    fn permute(
        &mut self,
        c_labels: &[char],
        a: &dyn Storage,
        a_labels: &[char],
        alpha: f64,
        beta: f64,
        parallel: bool,
    ) -> EinsumResult<()> {
        let a_shape = a.shape().to_vec();
        let a_values = a.dense()?.to_vec();
        let c_shape = self.shape().to_vec();
        kernels::permute(
            self.dense_mut()?,
            &c_shape,
            c_labels,
            &a_values,
            &a_shape,
            a_labels,
            alpha,
            beta,
            parallel,
        )
    }

    /// `self(c_labels) <- alpha * sum_K a(a_labels) * b(b_labels) + beta * self(c_labels)`.
    #[allow(clippy::too_many_arguments)]
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
        let a_shape = a.shape().to_vec();
        let a_values = a.dense()?.to_vec();
        let b_shape = b.shape().to_vec();
        let b_values = b.dense()?.to_vec();
        let c_shape = self.shape().to_vec();
        kernels::contract(
            self.dense_mut()?,
            &c_shape,
            c_labels,
            &a_values,
            &a_shape,
            a_labels,
            &b_values,
            &b_shape,
            b_labels,
            alpha,
            beta,
            parallel,
        )
    }

    /// `self[cranges] <- alpha * a[aranges] + beta * self[cranges]`.
    fn slice(
        &mut self,
        cranges: &[AxisRange],
        a: &dyn Storage,
        aranges: &[AxisRange],
        alpha: f64,
        beta: f64,
    ) -> EinsumResult<()> {
        let a_shape = a.shape().to_vec();
        let a_values = a.dense()?.to_vec();
        let c_shape = self.shape().to_vec();
        kernels::slice(
            self.dense_mut()?,
            &c_shape,
            cranges,
            &a_values,
            &a_shape,
            aranges,
            alpha,
            beta,
        )
    }
}
