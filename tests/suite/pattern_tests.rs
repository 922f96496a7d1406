//! Pattern recognition tests, exercised through the crate's public surface
//! rather than the inline unit tests already covering `pattern::mod`.

use tensorcontract::label::{ProductShape, Subscript};

use tensorcontract::pattern::{recognize_pattern, FastPath};

fn product(spec: &str) -> ProductShape {
    let (inputs, output) = spec.split_once("->").unwrap();
    ProductShape::new(
        inputs.split(',').map(|s| Subscript::parse(s).unwrap()).collect(),
        Subscript::parse(output).unwrap(),
    )
}

#[test]
fn matmul_transpose_a_is_recognized() {
    let pattern = recognize_pattern(&product("ji,jk->ik"));
    match pattern {
        Some(FastPath::Matmul { transpose_a, transpose_b }) => {
            assert!(transpose_a);
            assert!(!transpose_b);
        }
        other => panic!("expected a transposed matmul, got {other:?}"),
    }
}

#[test]
fn gram_matrix_transposes_only_b() {
    let pattern = recognize_pattern(&product("ik,jk->ij"));
    match pattern {
        Some(FastPath::Matmul { transpose_a, transpose_b }) => {
            assert!(!transpose_a);
            assert!(transpose_b);
        }
        other => panic!("expected a Gram-matrix matmul, got {other:?}"),
    }
}

#[test]
fn inner_product_matrix_transposes_only_a() {
    let pattern = recognize_pattern(&product("ki,kj->ij"));
    match pattern {
        Some(FastPath::Matmul { transpose_a, transpose_b }) => {
            assert!(transpose_a);
            assert!(!transpose_b);
        }
        other => panic!("expected A^T B, got {other:?}"),
    }
}

#[test]
fn batched_matmul_is_recognized() {
    let pattern = recognize_pattern(&product("bij,bjk->bik"));
    assert!(matches!(pattern, Some(FastPath::BatchedMatmul { .. })));
}

#[test]
fn relabeled_matmul_keeps_working_with_different_characters() {
    let pattern = recognize_pattern(&product("nm,md->nd"));
    assert!(matches!(pattern, Some(FastPath::Matmul { .. })), "got {pattern:?}");
}

#[test]
fn three_way_chain_has_no_fast_path() {
    let pattern = recognize_pattern(&product("ijk,jkl,klm->im"));
    assert!(pattern.is_none());
}

#[test]
fn diagonal_extract_is_distinct_from_trace() {
    let trace = recognize_pattern(&product("ii->"));
    let diagonal = recognize_pattern(&product("ii->i"));
    assert!(matches!(trace, Some(FastPath::Trace)));
    assert!(matches!(diagonal, Some(FastPath::DiagonalExtract)));
}
