//! Tests for chain contractions (multi-step operations).

use tensorcontract::label::{ProductShape, Subscript};
use tensorcontract::optimization::{create_plan, ContractionStrategy};

fn product(inputs: &[&str], output: &str) -> ProductShape {
    ProductShape::new(
        inputs.iter().map(|s| Subscript::parse(s).unwrap()).collect(),
        Subscript::parse(output).unwrap(),
    )
}

#[test]
fn chain_of_three_plans_two_steps() {
    let p = product(&["ij", "jk", "kl"], "il");
    let shapes: &[&[usize]] = &[&[10, 20], &[20, 30], &[30, 40]];

    let plan = create_plan(&p, shapes, ContractionStrategy::Auto);

    assert!(!plan.uses_fast_path());
    assert_eq!(plan.num_steps(), 2);
}

#[test]
fn chain_with_reduction_uses_fast_path() {
    let p = product(&["ij", "jk"], "i");
    let shapes: &[&[usize]] = &[&[10, 20], &[20, 30]];

    let plan = create_plan(&p, shapes, ContractionStrategy::Auto);

    assert!(plan.uses_fast_path());
}

#[test]
fn simple_chain_is_a_single_matmul_step() {
    let p = product(&["ij", "jk"], "ik");
    let shapes: &[&[usize]] = &[&[10, 20], &[20, 30]];

    let plan = create_plan(&p, shapes, ContractionStrategy::Auto);

    assert!(plan.uses_fast_path());
}

#[test]
fn chain_of_four_plans_three_steps() {
    let p = product(&["ij", "jk", "kl", "lm"], "im");
    let shapes: &[&[usize]] = &[&[10, 20], &[20, 30], &[30, 40], &[40, 50]];

    let plan = create_plan(&p, shapes, ContractionStrategy::Auto);

    assert!(!plan.uses_fast_path());
    assert_eq!(plan.num_steps(), 3);
}

#[test]
fn chain_step_labels_respect_what_downstream_operands_still_need() {
    // Contracting (ij, jk) first must keep 'i' and 'k' exposed, since 'k'
    // is still needed by the third operand and 'i' by the final output.
    let p = product(&["ij", "jk", "kl"], "il");
    let shapes: &[&[usize]] = &[&[10, 20], &[20, 30], &[30, 40]];
    let plan = create_plan(&p, shapes, ContractionStrategy::Greedy);
    let mut first_result: Vec<char> = match &plan.steps()[0] {
        tensorcontract::optimization::ExecutionStep::Contraction { result, .. } => result.clone(),
        other => panic!("expected a contraction step, got {other:?}"),
    };
    first_result.sort_unstable();
    assert!(first_result.contains(&'i') || first_result.contains(&'k'));
}
