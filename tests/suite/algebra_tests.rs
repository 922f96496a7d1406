//! Expression-algebra construction tests: the labeled-tensor combinators
//! build the right AST shape before any lowering happens.

use tensorcontract::storage::BackendKind;
use tensorcontract::Tensor;

fn tensor(name: &str, shape: &[usize]) -> Tensor {
    Tensor::new(BackendKind::InCore, name, shape).unwrap()
}

#[test]
fn labeled_tensor_exposes_rank_matching_labels() {
    let a = tensor("A", &[2, 3]);
    let labeled = a.labeled("ij").unwrap();
    assert_eq!(labeled.labels().len(), 2);
    assert_eq!(labeled.factor(), 1.0);
}

#[test]
fn rank_mismatched_labeling_is_rejected() {
    let a = tensor("A", &[2, 3, 4]);
    assert!(a.labeled("ij").is_err());
}

#[test]
fn repeated_label_requires_matching_extents() {
    let square = tensor("A", &[3, 3]);
    assert!(square.labeled("ii").is_ok());

    let rect = tensor("B", &[3, 4]);
    assert!(rect.labeled("ii").is_err());
}

#[test]
fn scalar_multiplication_scales_the_factor() {
    let a = tensor("A", &[2]);
    let labeled = a.labeled("i").unwrap() * 2.0;
    assert_eq!(labeled.factor(), 2.0);
    let labeled = -labeled;
    assert_eq!(labeled.factor(), -2.0);
}

#[test]
fn two_labeled_tensors_multiply_into_a_product() {
    let a = tensor("A", &[2, 3]);
    let b = tensor("B", &[3, 4]);
    let product = a.labeled("ij").unwrap() * b.labeled("jk").unwrap();
    assert_eq!(product.terms().len(), 2);
    assert_eq!(product.scalar_factor(), 1.0);
}

#[test]
fn product_may_be_extended_by_appending_a_term() {
    let a = tensor("A", &[2, 3]);
    let b = tensor("B", &[3, 4]);
    let d = tensor("D", &[4, 5]);
    let product = (a.labeled("ij").unwrap() * b.labeled("jk").unwrap()).append(d.labeled("kl").unwrap());
    assert_eq!(product.terms().len(), 3);
}

#[test]
fn addition_carries_sign_through_subtraction() {
    let a = tensor("A", &[2]);
    let b = tensor("B", &[2]);
    let sum = a.labeled("i").unwrap() - b.labeled("i").unwrap();
    assert_eq!(sum.terms().len(), 2);
}

#[test]
fn distributive_expands_into_a_sum_of_products() {
    let l = tensor("L", &[2, 2]);
    let j = tensor("J", &[2, 2]);
    let k = tensor("K", &[2, 2]);
    let sum = j.labeled("kj").unwrap() - k.labeled("kj").unwrap();
    let dist = l.labeled("ik").unwrap() * sum;
    let expanded = dist.expand();
    assert_eq!(expanded.terms().len(), 2);
}

#[test]
fn sum_of_two_products_builds_an_addition_of_two_terms() {
    let a = tensor("A", &[2, 2]);
    let b = tensor("B", &[2, 2]);
    let c = tensor("C", &[2, 2]);
    let d = tensor("D", &[2, 2]);
    let p1 = a.labeled("ik").unwrap() * b.labeled("kj").unwrap();
    let p2 = c.labeled("ik").unwrap() * d.labeled("kj").unwrap();
    let sum = p1 + p2;
    assert_eq!(sum.terms().len(), 2);
}
