//! Primitive in-core kernels (spec.md §4.B): the fixed set of buffer-level
//! operations every backend's `permute`/`contract`/`slice` calls lower to.
//!
//! * [`permute`] — generalized transpose, with self-contraction
//!   (trace/diagonal) handled as a pre-reduction.
//! * [`contract`] — pairwise Hadamard-batched GEMM.
//! * [`slice`] — axis-aligned hyper-rectangle copy.

mod diagonal;
pub mod strides;

mod contract;
mod permute;
mod slice;

pub use contract::contract;
pub use diagonal::reduce_repeats;
pub use permute::permute;
pub use slice::{slice, AxisRange};
