//! # tensorcontract
//!
//! A library for expressing and evaluating multilinear algebra over dense,
//! real-valued tensors of arbitrary rank. Tensor equations are written in
//! near-mathematical labeled-index notation:
//!
//! ```ignore
//! use tensorcontract::{BackendKind, Tensor};
//!
//! let a = Tensor::new(BackendKind::InCore, "A", &[4, 4])?;
//! let b = Tensor::new(BackendKind::InCore, "B", &[4, 4])?;
//! let c = Tensor::new(BackendKind::InCore, "C", &[4, 4])?;
//!
//! // C(ij) = A(ik) * B(kj)
//! c.labeled("ij")?.assign(a.labeled("ik")? * b.labeled("kj")?)?;
//!
//! // C(ij) += 0.5 * A(ik) * B(jk)
//! c.labeled("ij")?.accumulate((a.labeled("ik")? * b.labeled("jk")?) * 0.5)?;
//! ```
//!
//! The crate rewrites each expression into a minimal sequence of primitive
//! kernels (permute, contract, slice) dispatched against a pluggable
//! storage backend. The in-core backend executes those primitives directly,
//! reducing general contractions to calls into an external dense linear
//! algebra kernel (BLAS `dgemm`) whenever the index labeling permits it.

pub mod algebra;
pub mod error;
pub mod kernels;
pub mod label;
pub mod lifecycle;
pub mod lower;
pub mod optimization;
pub mod pattern;
pub mod storage;
pub mod tensor;

pub use algebra::{Addition, Distributive, IndexRange, LabeledTensor, Product, SlicedTensor};
pub use error::{EinsumError, EinsumResult};
pub use lower::{ContractionStrategy, ExecutionConfig};
pub use optimization::CostModel;
pub use storage::BackendKind;
pub use tensor::Tensor;
