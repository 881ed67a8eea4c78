//! Reversible functions as characteristic BDDs.
//!
//! A reversible function `f` on `n` lines is represented by the relation
//! `R(x, y) = (y == f(x))` over `2n` variables. Variables are interleaved,
//! most significant line first:
//!
//! ```text
//! x[n-1] < y[n-1] < x[n-2] < y[n-2] < ... < x[0] < y[0]
//! ```
//!
//! so a low-preferring walk over the `x` variables yields the numerically
//! smallest input pattern.

use std::collections::HashMap;

use log::debug;
use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::function::word;
use crate::gate::{Control, Gate};
use crate::permutation::{Permutation, MAX_LINES};
use crate::reference::Ref;

/// Largest number of lines a relation can have, limited by the pattern word.
pub const MAX_RELATION_LINES: usize = 63;

#[derive(Debug, Clone)]
pub struct Rcbdd<'a> {
    bdd: &'a Bdd,
    lines: usize,
    relation: Ref,
}

impl<'a> Rcbdd<'a> {
    /// Wrap an existing relation over the variables of [`Rcbdd::x_var`] and [`Rcbdd::y_var`].
    pub fn new(bdd: &'a Bdd, lines: usize, relation: Ref) -> Result<Self> {
        if lines > MAX_RELATION_LINES {
            return Err(Error::Capacity {
                required: lines,
                limit: MAX_RELATION_LINES,
            });
        }
        Ok(Self { bdd, lines, relation })
    }

    pub fn identity(bdd: &'a Bdd, lines: usize) -> Result<Self> {
        let mut rcbdd = Self::new(bdd, lines, bdd.one)?;
        rcbdd.relation = rcbdd.diagonal();
        Ok(rcbdd)
    }

    pub fn from_permutation(bdd: &'a Bdd, permutation: &Permutation) -> Result<Self> {
        let mut rcbdd = Self::new(bdd, permutation.num_lines(), bdd.zero)?;
        let x_vars = rcbdd.x_vars();
        let y_vars = rcbdd.y_vars();
        let mut relation = bdd.zero;
        for (x, y) in permutation.rows() {
            let row = bdd.apply_and(
                bdd.cube_from_bits(&x_vars, &rcbdd.msb_bits(x)),
                bdd.cube_from_bits(&y_vars, &rcbdd.msb_bits(y)),
            );
            relation = bdd.apply_or(relation, row);
        }
        rcbdd.relation = relation;
        debug!(
            "relation for {} lines has {} nodes",
            rcbdd.lines,
            bdd.size(relation)
        );
        Ok(rcbdd)
    }

    /// The relation computed by `circuit`.
    pub fn from_circuit(bdd: &'a Bdd, circuit: &Circuit) -> Result<Self> {
        let mut rcbdd = Self::identity(bdd, circuit.lines())?;
        for gate in circuit {
            rcbdd.apply_gate_output(gate);
        }
        Ok(rcbdd)
    }
}

impl<'a> Rcbdd<'a> {
    pub fn bdd(&self) -> &'a Bdd {
        self.bdd
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn relation(&self) -> Ref {
        self.relation
    }

    /// Input variable of `line`.
    pub fn x_var(&self, line: usize) -> u32 {
        assert!(line < self.lines);
        2 * (self.lines - 1 - line) as u32 + 1
    }

    /// Output variable of `line`.
    pub fn y_var(&self, line: usize) -> u32 {
        self.x_var(line) + 1
    }

    /// Input variables, most significant line first.
    pub fn x_vars(&self) -> Vec<u32> {
        (0..self.lines).rev().map(|i| self.x_var(i)).collect()
    }

    /// Output variables, most significant line first.
    pub fn y_vars(&self) -> Vec<u32> {
        (0..self.lines).rev().map(|i| self.y_var(i)).collect()
    }

    fn msb_bits(&self, word: u64) -> Vec<bool> {
        (0..self.lines).rev().map(|i| (word >> i) & 1 == 1).collect()
    }

    fn msb_word(bits: &[bool]) -> u64 {
        let mut lsb = bits.to_vec();
        lsb.reverse();
        word(&lsb)
    }

    /// `∧ (x_i ≡ y_i)`.
    fn diagonal(&self) -> Ref {
        self.bdd.apply_and_many(
            (0..self.lines).map(|i| self.bdd.apply_eq(self.bdd.mk_var(self.x_var(i)), self.bdd.mk_var(self.y_var(i)))),
        )
    }

    /// Every input pattern has an image.
    pub fn is_total(&self) -> bool {
        self.bdd.is_one(self.bdd.exists(self.relation, &self.y_vars()))
    }

    /// Every output pattern has a preimage.
    pub fn is_onto(&self) -> bool {
        self.bdd.is_one(self.bdd.exists(self.relation, &self.x_vars()))
    }

    /// Exactly one image per input and one preimage per output.
    pub fn is_permutation(&self) -> bool {
        let vars: Vec<u32> = (1..=2 * self.lines as u32).collect();
        self.is_total()
            && self.is_onto()
            && self.bdd.sat_count_over(self.relation, &vars) == BigUint::from(1u32) << self.lines
    }

    /// Output functions `f_j(x) = ∃y. R ∧ y_j`, line 0 first.
    pub fn output_functions(&self) -> Vec<Ref> {
        let y_vars = self.y_vars();
        (0..self.lines)
            .map(|j| {
                let f = self.bdd.apply_and(self.relation, self.bdd.mk_var(self.y_var(j)));
                self.bdd.exists(f, &y_vars)
            })
            .collect()
    }

    /// Smallest input pattern whose image differs from itself.
    pub fn smallest_mismatch(&self) -> Option<u64> {
        let mismatch = self.bdd.apply_and(self.relation, -self.diagonal());
        let rows = self.bdd.exists(mismatch, &self.y_vars());
        self.bdd
            .pick_min(rows, &self.x_vars())
            .map(|bits| Self::msb_word(&bits))
    }

    /// Image of input pattern `x`, if the relation has one.
    pub fn image_of(&self, x: u64) -> Option<u64> {
        let assignment: HashMap<u32, bool> = (0..self.lines)
            .map(|i| (self.x_var(i), (x >> i) & 1 == 1))
            .collect();
        let outputs = self.bdd.restrict(self.relation, &assignment);
        self.bdd
            .pick_min(outputs, &self.y_vars())
            .map(|bits| Self::msb_word(&bits))
    }

    /// Output-side substitution realizing `gate` on the `y` variables.
    fn gate_substitution(&self, gate: &Gate) -> HashMap<u32, Ref> {
        let bdd = self.bdd;
        let condition = bdd.apply_and_many(
            gate.controls()
                .iter()
                .map(|&Control { line, polarity }| bdd.mk_literal(self.y_var(line), polarity)),
        );
        let mut map = HashMap::new();
        match gate {
            Gate::Toffoli { target, .. } => {
                let y = bdd.mk_var(self.y_var(*target));
                map.insert(self.y_var(*target), bdd.apply_xor(y, condition));
            }
            Gate::Fredkin { targets: [a, b], .. } => {
                let ya = bdd.mk_var(self.y_var(*a));
                let yb = bdd.mk_var(self.y_var(*b));
                map.insert(self.y_var(*a), bdd.apply_ite(condition, yb, ya));
                map.insert(self.y_var(*b), bdd.apply_ite(condition, ya, yb));
            }
        }
        map
    }

    /// Replace `f` by `gate ∘ f`, i.e. `R'(x, y) = R(x, gate(y))`.
    pub fn apply_gate_output(&mut self, gate: &Gate) {
        assert!(gate.max_line() < self.lines, "{} does not fit", gate);
        let map = self.gate_substitution(gate);
        self.relation = self.bdd.vector_compose(self.relation, &map);
    }

    /// Tabulate the relation.
    pub fn to_permutation(&self) -> Result<Permutation> {
        if self.lines > MAX_LINES {
            return Err(Error::Capacity {
                required: self.lines,
                limit: MAX_LINES,
            });
        }
        let table = (0..1u64 << self.lines)
            .map(|x| {
                self.image_of(x)
                    .ok_or_else(|| Error::Inconsistent(format!("input {:#x} has no image", x)))
            })
            .collect::<Result<Vec<_>>>()?;
        Permutation::new(self.lines, table)
    }
}
