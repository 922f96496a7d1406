//! End-to-end assignment tests exercising the whole lowering pipeline
//! against hand-computed references.

use tensorcontract::storage::BackendKind;
use tensorcontract::{IndexRange, Tensor};

fn dense(name: &str, shape: &[usize], values: Vec<f64>) -> Tensor {
    Tensor::from_values(BackendKind::InCore, name, shape, values).unwrap()
}

fn zeros(name: &str, shape: &[usize]) -> Tensor {
    Tensor::new(BackendKind::InCore, name, shape).unwrap()
}

fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() <= tol * e.abs().max(1.0), "{a} != {e} (tol {tol})");
    }
}

#[test]
fn matrix_multiply() {
    let a = dense("A", &[2, 2], vec![1.0, 2.0, 3.0, 4.0]);
    let b = dense("B", &[2, 2], vec![5.0, 6.0, 7.0, 8.0]);
    let c = zeros("C", &[2, 2]);

    c.labeled("ij").unwrap().assign(a.labeled("ik").unwrap() * b.labeled("kj").unwrap()).unwrap();

    assert_eq!(c.buffer().unwrap(), vec![19.0, 22.0, 43.0, 50.0]);
}

#[test]
fn trace() {
    let a = dense("A", &[2, 2], vec![1.0, 2.0, 3.0, 4.0]);
    let s = zeros("s", &[]);

    s.labeled("").unwrap().assign(a.labeled("ii").unwrap()).unwrap();

    assert_eq!(s.buffer().unwrap(), vec![5.0]);
}

#[test]
fn transpose_add() {
    let a = dense("A", &[2, 2], vec![1.0, 2.0, 3.0, 4.0]);
    let c = zeros("C", &[2, 2]);

    c.labeled("ij").unwrap().assign(a.labeled("ij").unwrap() + a.labeled("ji").unwrap()).unwrap();

    assert_eq!(c.buffer().unwrap(), vec![2.0, 5.0, 5.0, 8.0]);
}

#[test]
fn rank_three_contraction_matches_a_reference_triple_loop() {
    let (ni, nj, nk, nl) = (2usize, 3usize, 4usize, 2usize);
    let mut a_values = vec![0.0; ni * nj * nk];
    for i in 0..ni {
        for j in 0..nj {
            for k in 0..nk {
                a_values[(i * nj + j) * nk + k] = (i + j + k) as f64;
            }
        }
    }
    let mut b_values = vec![0.0; nk * nl];
    for k in 0..nk {
        for l in 0..nl {
            b_values[k * nl + l] = (k * l) as f64;
        }
    }

    let a = dense("A", &[ni, nj, nk], a_values.clone());
    let b = dense("B", &[nk, nl], b_values.clone());
    let c = zeros("C", &[ni, nj, nl]);

    c.labeled("ijl").unwrap().assign(a.labeled("ijk").unwrap() * b.labeled("kl").unwrap()).unwrap();

    let mut expected = vec![0.0; ni * nj * nl];
    for i in 0..ni {
        for j in 0..nj {
            for l in 0..nl {
                let mut acc = 0.0;
                for k in 0..nk {
                    acc += a_values[(i * nj + j) * nk + k] * b_values[k * nl + l];
                }
                expected[(i * nj + j) * nl + l] = acc;
            }
        }
    }

    assert_eq!(c.buffer().unwrap(), expected);
}

#[test]
fn three_way_product_of_identities_is_identity() {
    let identity = |n: usize| -> Vec<f64> {
        let mut v = vec![0.0; n * n];
        for i in 0..n {
            v[i * n + i] = 1.0;
        }
        v
    };
    let a = dense("A", &[3, 3], identity(3));
    let b = dense("B", &[3, 3], identity(3));
    let d = dense("D", &[3, 3], identity(3));
    let c = zeros("C", &[3, 3]);

    c.labeled("il")
        .unwrap()
        .assign(a.labeled("ij").unwrap() * b.labeled("jk").unwrap() * d.labeled("kl").unwrap())
        .unwrap();

    assert_eq!(c.buffer().unwrap(), identity(3));
}

#[test]
fn slice_copy_writes_only_the_selected_block() {
    let a = dense("A", &[4, 4], vec![1.0; 16]);
    let c = zeros("C", &[4, 4]);

    let c_block = c.slice(&[IndexRange::new(1, 3), IndexRange::new(1, 3)]);
    let a_block = a.slice(&[IndexRange::new(0, 2), IndexRange::new(0, 2)]);
    c_block.accumulate(a_block).unwrap();

    let expected = {
        let mut v = vec![0.0; 16];
        for i in 1..3 {
            for j in 1..3 {
                v[i * 4 + j] = 1.0;
            }
        }
        v
    };
    assert_eq!(c.buffer().unwrap(), expected);
}

#[test]
fn permute_preserves_norm() {
    let a = dense("A", &[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let c = zeros("C", &[3, 2]);

    c.labeled("ji").unwrap().assign(a.labeled("ij").unwrap()).unwrap();

    let norm_a = a.norm(2).unwrap();
    let norm_c = c.norm(2).unwrap();
    assert!((norm_a - norm_c).abs() <= 1e-12 * norm_a);
}

#[test]
fn dot_equals_squared_norm() {
    let a = dense("A", &[4], vec![1.0, 2.0, 3.0, 4.0]);
    let dot = a.dot(&a).unwrap();
    let norm2 = a.norm(2).unwrap();
    assert!((dot - norm2 * norm2).abs() <= 1e-12 * dot.abs());
}

#[test]
fn contraction_associativity() {
    let a = dense("A", &[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let b = dense("B", &[3, 4], (0..12).map(|x| x as f64 * 0.5).collect());
    let d = dense("D", &[4, 5], (0..20).map(|x| x as f64 * 0.25).collect());

    let left = zeros("left", &[2, 5]);
    left.labeled("il")
        .unwrap()
        .assign((a.labeled("ij").unwrap() * b.labeled("jk").unwrap()) * d.labeled("kl").unwrap())
        .unwrap();

    let right = zeros("right", &[2, 5]);
    right
        .labeled("il")
        .unwrap()
        .assign(a.labeled("ij").unwrap() * (b.labeled("jk").unwrap() * d.labeled("kl").unwrap()))
        .unwrap();

    assert_close(&left.buffer().unwrap(), &right.buffer().unwrap(), 1e-10);
}

#[test]
fn distributive_lowering_matches_expanded_subtraction() {
    let d = dense("D", &[2, 2], vec![1.0, 2.0, 3.0, 4.0]);
    let j = dense("J", &[2, 2], vec![5.0, 6.0, 7.0, 8.0]);
    let k = dense("K", &[2, 2], vec![1.0, 1.0, 1.0, 1.0]);

    let lhs = zeros("lhs", &[2, 2]);
    lhs.labeled("ij")
        .unwrap()
        .assign(d.labeled("ik").unwrap() * (j.labeled("kj").unwrap() - k.labeled("kj").unwrap()))
        .unwrap();

    let rhs = zeros("rhs", &[2, 2]);
    rhs.labeled("ij").unwrap().assign(d.labeled("ik").unwrap() * j.labeled("kj").unwrap()).unwrap();
    rhs.labeled("ij").unwrap().subtract(d.labeled("ik").unwrap() * k.labeled("kj").unwrap()).unwrap();

    assert_close(&lhs.buffer().unwrap(), &rhs.buffer().unwrap(), 1e-12);
}

#[test]
fn beta_zero_overwrites_a_nan_filled_target() {
    let a = dense("A", &[3], vec![1.0, 2.0, 3.0]);
    let c = dense("C", &[3], vec![f64::NAN, f64::NAN, f64::NAN]);

    c.labeled("i").unwrap().assign(a.labeled("i").unwrap()).unwrap();

    assert!(c.buffer().unwrap().iter().all(|x| x.is_finite()));
}

#[test]
fn alias_safe_self_transpose() {
    let a = dense("A", &[3, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    a.labeled("ij").unwrap().assign(a.labeled("ji").unwrap()).unwrap();
    assert_eq!(a.buffer().unwrap(), vec![1.0, 4.0, 7.0, 2.0, 5.0, 8.0, 3.0, 6.0, 9.0]);
}

#[test]
fn out_of_bounds_slice_range_is_an_error() {
    let a = zeros("A", &[4, 4]);
    let c = zeros("C", &[4, 4]);
    let c_block = c.slice(&[IndexRange::new(0, 2), IndexRange::new(0, 2)]);
    let a_block = a.slice(&[IndexRange::new(0, 2), IndexRange::new(3, 6)]);
    assert!(c_block.assign(a_block).is_err());
}

#[test]
fn unbound_output_label_is_a_label_mismatch_error() {
    let a = zeros("A", &[2, 3]);
    let c = zeros("C", &[2, 5]);
    let result = c.labeled("il").unwrap().assign(a.labeled("ij").unwrap());
    assert!(result.is_err());
}
