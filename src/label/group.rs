//! Label-set analysis shared by the contraction planner and the per-pair
//! primitive selector (spec.md §4.B, §4.D).

use std::collections::{BTreeSet, HashSet};

use crate::error::{EinsumError, EinsumResult};
use crate::label::Subscript;

/// The label partition of one pairwise contraction `C(Ci) = A(Ai) * B(Bi)`.
///
/// * `hadamard` — appear in `A`, `B`, and `C`: elementwise (batch) axes.
/// * `contracted` — appear in both `A` and `B`, not in `C`: summed axes.
/// * `only_a` / `only_b` — appear in that operand and in `C` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairClassification {
    pub hadamard: Vec<char>,
    pub contracted: Vec<char>,
    pub only_a: Vec<char>,
    pub only_b: Vec<char>,
}

/// Classifies the labels of a binary contraction per spec.md §4.B.
///
/// Returns a `planning-failure` error if a label occurs in more than two of
/// `a`, `b`, `c` combined, or if a label appears in only one of `a`/`b` and
/// is absent from `c` (a unilateral reduction, which spec.md §4.B treats as
/// requiring an explicit prior reduction step rather than silent summation).
pub fn classify_pair(a: &[char], b: &[char], c: &[char]) -> EinsumResult<PairClassification> {
    let set_a: HashSet<char> = a.iter().copied().collect();
    let set_b: HashSet<char> = b.iter().copied().collect();
    let set_c: HashSet<char> = c.iter().copied().collect();

    for &label in a.iter().chain(b.iter()).chain(c.iter()) {
        let count =
            set_a.contains(&label) as u8 + set_b.contains(&label) as u8 + set_c.contains(&label) as u8;
        if count > 2 {
            return Err(EinsumError::planning(format!(
                "label '{label}' appears in more than two of A, B, C"
            )));
        }
    }

    let mut hadamard = Vec::new();
    let mut contracted = Vec::new();
    let mut only_a = Vec::new();
    let mut only_b = Vec::new();
    let mut seen = HashSet::new();

    for &label in a {
        if !seen.insert(label) {
            continue;
        }
        let in_b = set_b.contains(&label);
        let in_c = set_c.contains(&label);
        match (in_b, in_c) {
            (true, true) => hadamard.push(label),
            (true, false) => contracted.push(label),
            (false, true) => only_a.push(label),
            (false, false) => {
                return Err(EinsumError::planning(format!(
                    "label '{label}' appears only in A: unilateral reduction is not supported, reduce A first"
                )));
            }
        }
    }
    for &label in b {
        if set_a.contains(&label) {
            continue;
        }
        if set_c.contains(&label) {
            only_b.push(label);
        } else {
            return Err(EinsumError::planning(format!(
                "label '{label}' appears only in B: unilateral reduction is not supported, reduce B first"
            )));
        }
    }

    // Every output label must be accounted for by one of the operands.
    for &label in c {
        if !set_a.contains(&label) && !set_b.contains(&label) {
            return Err(EinsumError::label(format!(
                "output label '{label}' does not appear in either operand"
            )));
        }
    }

    Ok(PairClassification { hadamard, contracted, only_a, only_b })
}

/// The label shape of an N-way product: one `Subscript` per factor plus the
/// target output `Subscript`. Used by the contraction planner to compute
/// pairwise costs and by lowering to derive each step's exposed labels.
#[derive(Debug, Clone)]
pub struct ProductShape {
    inputs: Vec<Subscript>,
    output: Subscript,
}

impl ProductShape {
    pub fn new(inputs: Vec<Subscript>, output: Subscript) -> Self {
        Self { inputs, output }
    }

    pub fn inputs(&self) -> &[Subscript] {
        &self.inputs
    }

    pub fn output(&self) -> &Subscript {
        &self.output
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_unary(&self) -> bool {
        self.inputs.len() == 1
    }

    pub fn is_binary(&self) -> bool {
        self.inputs.len() == 2
    }

    pub fn is_scalar_output(&self) -> bool {
        self.output.is_empty()
    }

    /// True if no label is contracted away: every label appearing in any
    /// input also appears in the output (the product is a pure relabeling,
    /// e.g. a transpose or a Hadamard product).
    pub fn is_permutation_only(&self) -> bool {
        let output_set: HashSet<char> = self.output.iter().collect();
        self.inputs.iter().all(|sub| sub.iter().all(|label| output_set.contains(&label)))
    }

    /// Labels that must survive a contraction between inputs `i` and `j`:
    /// the union of their labels, minus whichever of those labels are
    /// purely internal to this pair (not needed by the final output or by
    /// any other operand still waiting to be contracted).
    pub fn pairwise_output(&self, i: usize, j: usize) -> Vec<char> {
        let indices_a: HashSet<char> = self.inputs[i].iter().collect();
        let indices_b: HashSet<char> = self.inputs[j].iter().collect();
        let common: HashSet<char> = indices_a.intersection(&indices_b).copied().collect();

        let mut kept_elsewhere: BTreeSet<char> = self.output.iter().collect();
        for (k, sub) in self.inputs.iter().enumerate() {
            if k != i && k != j {
                kept_elsewhere.extend(sub.iter());
            }
        }

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for &label in self.inputs[i].as_slice().iter().chain(self.inputs[j].as_slice()) {
            if seen.contains(&label) {
                continue;
            }
            seen.insert(label);
            let internal_to_pair = common.contains(&label) && !kept_elsewhere.contains(&label);
            if !internal_to_pair {
                out.push(label);
            }
        }
        out
    }
}
