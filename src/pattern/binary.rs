//! Binary operation pattern detection.

use std::collections::BTreeSet;

use crate::label::ProductShape;

/// Checks if the product represents a Hadamard (element-wise) product.
///
/// `ij,ij->ij` - same indices in both inputs and output.
pub fn is_hadamard(product: &ProductShape) -> bool {
    if !product.is_binary() {
        return false;
    }

    // Must have no contractions
    if !product.is_permutation_only() {
        return false;
    }

    let inputs = product.inputs();
    let output = product.output();

    let indices_a: BTreeSet<char> = inputs[0].iter().collect();
    let indices_b: BTreeSet<char> = inputs[1].iter().collect();
    let indices_out: BTreeSet<char> = output.iter().collect();

    // All three must have the same indices
    indices_a == indices_b && indices_a == indices_out
}

/// Checks if the product represents an outer product.
///
/// `i,j->ij` - disjoint indices, output is their concatenation.
pub fn is_outer_product(product: &ProductShape) -> bool {
    if !product.is_binary() {
        return false;
    }

    // Must have no contractions
    if !product.is_permutation_only() {
        return false;
    }

    let inputs = product.inputs();
    let output = product.output();

    let indices_a: BTreeSet<char> = inputs[0].iter().collect();
    let indices_b: BTreeSet<char> = inputs[1].iter().collect();
    let indices_out: BTreeSet<char> = output.iter().collect();

    // Inputs must be disjoint
    if !indices_a.is_disjoint(&indices_b) {
        return false;
    }

    // Output must be union of inputs
    let union: BTreeSet<char> = indices_a.union(&indices_b).copied().collect();
    union == indices_out
}

/// Checks if the product represents a dot product.
///
/// `i,i->` - same indices in both inputs, scalar output.
/// Also matches `ij,ij->` (Frobenius inner product).
pub fn is_dot_product(product: &ProductShape) -> bool {
    if !product.is_binary() {
        return false;
    }

    // Output must be scalar
    if !product.is_scalar_output() {
        return false;
    }

    let inputs = product.inputs();

    let indices_a: BTreeSet<char> = inputs[0].iter().collect();
    let indices_b: BTreeSet<char> = inputs[1].iter().collect();

    // Both inputs must have the same indices
    if indices_a != indices_b {
        return false;
    }

    // All indices must be contracted (since output is scalar)
    true
}
