//! Pattern recognition for einsum fast paths.
//!
//! Recognizes common operations that can be dispatched to optimized kernels:
//! - Matrix multiplication
//! - Batched matrix multiplication
//! - Transpose
//! - Reduction (sum, prod, max, min)
//! - Hadamard (element-wise) product
//! - Outer product
//! - Dot product
//! - Trace

mod fast_path;
mod matmul;
mod unary;
mod binary;

pub use fast_path::FastPath;
pub use matmul::{is_matmul, is_batched_matmul, extract_matmul_config, MatmulConfig};
pub use unary::{is_transpose, is_reduction, is_trace, is_diagonal_extract};
pub use binary::{is_hadamard, is_outer_product, is_dot_product};

use crate::label::ProductShape;

/// Pattern matcher for einsum operations.
pub struct PatternMatcher;

impl PatternMatcher {
    /// Attempts to recognize a fast-path pattern.
    pub fn recognize(product: &ProductShape) -> Option<FastPath> {
        recognize_pattern(product)
    }
}

/// Main entry point for pattern recognition.
///
/// Tries to match the product against known patterns in order of specificity.
pub fn recognize_pattern(product: &ProductShape) -> Option<FastPath> {
    // Unary operations
    if product.is_unary() {
        // Check transpose first (most common)
        if let Some(perm) = is_transpose(product) {
            return Some(FastPath::Transpose { permutation: perm });
        }

        // Check trace
        if is_trace(product) {
            return Some(FastPath::Trace);
        }

        // Check diagonal extraction
        if is_diagonal_extract(product).is_some() {
            return Some(FastPath::DiagonalExtract);
        }

        // Check reduction
        if let Some((axes, _op)) = is_reduction(product) {
            return Some(FastPath::Reduce { axes, op: fast_path::ReduceOp::Sum });
        }
    }

    // Binary operations
    if product.is_binary() {
        // Check for batched matmul first (more specific)
        if let Some(config) = is_batched_matmul(product) {
            return Some(FastPath::BatchedMatmul {
                batch_dims: config.batch_dims,
                transpose_a: config.transpose_a,
                transpose_b: config.transpose_b,
            });
        }

        // Check for regular matmul
        if let Some(config) = is_matmul(product) {
            return Some(FastPath::Matmul {
                transpose_a: config.transpose_a,
                transpose_b: config.transpose_b,
            });
        }

        // Check Hadamard product
        if is_hadamard(product) {
            return Some(FastPath::Hadamard);
        }

        // Check outer product
        if is_outer_product(product) {
            return Some(FastPath::OuterProduct);
        }

        // Check dot product
        if is_dot_product(product) {
            return Some(FastPath::DotProduct);
        }
    }

    None
}
