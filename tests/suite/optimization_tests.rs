//! Contraction path optimization tests.

use tensorcontract::label::{ProductShape, Subscript};
use tensorcontract::optimization::{create_plan, greedy_path, optimal_path, ContractionStrategy, CostModel};

fn product(inputs: &[&str], output: &str) -> ProductShape {
    ProductShape::new(
        inputs.iter().map(|s| Subscript::parse(s).unwrap()).collect(),
        Subscript::parse(output).unwrap(),
    )
}

#[test]
fn greedy_two_tensors_is_one_step() {
    let p = product(&["ij", "jk"], "ik");
    let shapes: &[&[usize]] = &[&[100, 200], &[200, 300]];
    let path = greedy_path(&p, shapes, &CostModel::default());
    assert_eq!(path.len(), 1);
}

#[test]
fn greedy_three_tensors_is_two_steps() {
    let p = product(&["ij", "jk", "kl"], "il");
    let shapes: &[&[usize]] = &[&[10, 20], &[20, 30], &[30, 40]];
    let path = greedy_path(&p, shapes, &CostModel::default());
    assert_eq!(path.len(), 2);
}

#[test]
fn optimal_matches_greedy_step_count_on_a_simple_chain() {
    let p = product(&["ij", "jk", "kl"], "il");
    let shapes: &[&[usize]] = &[&[10, 20], &[20, 30], &[30, 40]];
    let path = optimal_path(&p, shapes, &CostModel::default());
    assert_eq!(path.len(), 2);
}

#[test]
fn cost_model_matches_matmul_flop_formula() {
    let model = CostModel::cpu();
    let cost = model.compute_pairwise_cost(&[100, 200], &[200, 300], &['i', 'j'], &['j', 'k'], &['j']);
    assert_eq!(cost.flops, 100 * 300 * 200 * 2);
}

#[test]
fn plan_uses_fast_path_for_matmul() {
    let p = product(&["ij", "jk"], "ik");
    let shapes: &[&[usize]] = &[&[100, 200], &[200, 300]];
    let plan = create_plan(&p, shapes, ContractionStrategy::Auto);
    assert!(plan.uses_fast_path());
}

#[test]
fn plan_has_no_fast_path_for_a_chain() {
    let p = product(&["ij", "jk", "kl"], "il");
    let shapes: &[&[usize]] = &[&[10, 20], &[20, 30], &[30, 40]];
    let plan = create_plan(&p, shapes, ContractionStrategy::Auto);
    assert!(!plan.uses_fast_path());
}

#[test]
fn plan_recognizes_relabeled_matmul() {
    let p = product(&["nm", "md"], "nd");
    let shapes: &[&[usize]] = &[&[4096, 4096], &[4096, 64]];
    let plan = create_plan(&p, shapes, ContractionStrategy::Auto);
    assert!(plan.uses_fast_path(), "nm,md->nd should use a fast path");
}

#[test]
fn plan_recognizes_gram_matrix() {
    let p = product(&["ik", "jk"], "ij");
    let shapes: &[&[usize]] = &[&[1024, 512], &[1024, 512]];
    let plan = create_plan(&p, shapes, ContractionStrategy::Auto);
    assert!(plan.uses_fast_path(), "ik,jk->ij should use a fast path");
}

#[test]
fn greedy_and_optimal_agree_on_total_flops_for_a_five_way_chain() {
    let p = product(&["ab", "bc", "cd", "de", "ef"], "af");
    let shapes: &[&[usize]] = &[&[4, 6], &[6, 8], &[8, 10], &[10, 12], &[12, 14]];
    let cost_model = CostModel::cpu();
    let greedy = greedy_path(&p, shapes, &cost_model);
    let optimal = optimal_path(&p, shapes, &cost_model);
    assert!(optimal.total_flops() <= greedy.total_flops());
}
