//! Exact synthesis of minimal Toffoli circuits by BDD quantification.
//!
//! Every gate position `k` owns a block of descriptor variables:
//!
//! ```text
//! p[0..n]        positive control on line i
//! q[0..n]        negative control on line i (only with `negative`)
//! t[0..nbits]    target line, binary, least significant bit first
//! ```
//!
//! Composing `k` symbolic gates yields output functions `c_j(x, descriptors)`.
//! A circuit of depth `k` exists iff
//!
//! ```text
//! F = ∀x. ∧_j (c_j ≡ f_j) ∧ W
//! ```
//!
//! is satisfiable, where `W` restricts every block to well-formed gates. Each
//! model of `F` over the descriptor variables is one minimal circuit.

use std::time::Instant;

use log::{debug, info};
use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::function::{BddFunction, BooleanFunction};
use crate::gate::{Control, Gate};
use crate::permutation::Permutation;
use crate::reference::Ref;
use crate::stats::ExactStatistics;
use crate::utils::bits_for;

/// Largest number of lines accepted by [`quantified_exact_synthesis`].
pub const MAX_EXACT_LINES: usize = 6;

#[derive(Debug, Clone)]
pub struct ExactSettings {
    /// Largest gate count to try.
    pub max_depth: usize,
    /// Allow negative controls.
    pub negative: bool,
    /// Decode every minimal circuit.
    pub all_solutions: bool,
    /// Circuit whose line names, constants and garbage flags are copied onto
    /// every decoded circuit.
    pub template: Option<Circuit>,
}

impl Default for ExactSettings {
    fn default() -> Self {
        Self {
            max_depth: 20,
            negative: false,
            all_solutions: false,
            template: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExactSolution {
    pub circuit: Circuit,
    /// Number of distinct minimal circuits.
    pub num_circuits: BigUint,
    /// Every minimal circuit, if requested.
    pub solutions: Option<Vec<Circuit>>,
    pub statistics: ExactStatistics,
}

#[derive(Debug, Clone)]
pub enum ExactOutcome {
    Found(ExactSolution),
    NotFound { max_depth: usize },
}

impl ExactOutcome {
    pub fn solution(&self) -> Option<&ExactSolution> {
        match self {
            ExactOutcome::Found(solution) => Some(solution),
            ExactOutcome::NotFound { .. } => None,
        }
    }

    pub fn into_solution(self) -> Option<ExactSolution> {
        match self {
            ExactOutcome::Found(solution) => Some(solution),
            ExactOutcome::NotFound { .. } => None,
        }
    }
}

/// Layout of the descriptor variables.
struct Encoding {
    lines: usize,
    negative: bool,
    cbits: usize,
    nbits: usize,
}

impl Encoding {
    fn new(lines: usize, negative: bool) -> Self {
        Self {
            lines,
            negative,
            cbits: if negative { 2 * lines } else { lines },
            nbits: bits_for(lines),
        }
    }

    fn block_size(&self) -> usize {
        self.cbits + self.nbits
    }

    /// First variable of block `k`. Input variables are `1..=lines`.
    fn block(&self, k: usize) -> u32 {
        (self.lines + k * self.block_size() + 1) as u32
    }

    fn inputs(&self) -> Vec<u32> {
        (1..=self.lines as u32).collect()
    }

    fn descriptors(&self, depth: usize) -> Vec<u32> {
        let first = self.block(0);
        (first..first + (depth * self.block_size()) as u32).collect()
    }

    /// `target == i` over the target bits of block `k`.
    fn is_target(&self, bdd: &Bdd, k: usize, i: usize) -> Ref {
        let t = self.block(k) + self.cbits as u32;
        bdd.cube((0..self.nbits).map(|j| {
            let v = (t + j as u32) as i32;
            if (i >> j) & 1 == 1 {
                v
            } else {
                -v
            }
        }))
    }

    /// Apply the symbolic gate of block `k` to `current`.
    fn perform_gate(&self, bdd: &Bdd, k: usize, current: &[Ref]) -> Vec<Ref> {
        let base = self.block(k);
        let mut matches = bdd.one;
        for (i, &x) in current.iter().enumerate() {
            let p = bdd.mk_var(base + i as u32);
            matches = bdd.apply_and(matches, bdd.apply_imply(p, x));
            if self.negative {
                let q = bdd.mk_var(base + (self.lines + i) as u32);
                matches = bdd.apply_and(matches, bdd.apply_imply(q, -x));
            }
        }
        current
            .iter()
            .enumerate()
            .map(|(i, &x)| bdd.apply_xor(x, bdd.apply_and(matches, self.is_target(bdd, k, i))))
            .collect()
    }

    /// Block `k` describes a valid Toffoli gate.
    fn well_formed(&self, bdd: &Bdd, k: usize) -> Ref {
        let base = self.block(k);
        let mut valid_target = bdd.zero;
        let mut constraint = bdd.one;
        for i in 0..self.lines {
            let is_target = self.is_target(bdd, k, i);
            valid_target = bdd.apply_or(valid_target, is_target);

            let p = bdd.mk_var(base + i as u32);
            let mut uncontrolled = -p;
            if self.negative {
                let q = bdd.mk_var(base + (self.lines + i) as u32);
                uncontrolled = bdd.apply_and(uncontrolled, -q);
                constraint = bdd.apply_and(constraint, -bdd.apply_and(p, q));
            }
            constraint = bdd.apply_and(constraint, bdd.apply_imply(is_target, uncontrolled));
        }
        bdd.apply_and(valid_target, constraint)
    }

    /// Decode a descriptor assignment (one value per descriptor variable).
    fn decode(&self, depth: usize, values: &[bool]) -> Result<Circuit> {
        let mut circuit = Circuit::new(self.lines);
        for block in values.chunks(self.block_size()).take(depth) {
            let mut controls = Vec::new();
            for i in 0..self.lines {
                if block[i] {
                    controls.push(Control::positive(i));
                }
                if self.negative && block[self.lines + i] {
                    controls.push(Control::negative(i));
                }
            }
            let target = block[self.cbits..]
                .iter()
                .enumerate()
                .fold(0, |t, (j, &b)| if b { t | (1 << j) } else { t });
            circuit.append_gate(Gate::toffoli(controls, target)?)?;
        }
        Ok(circuit)
    }
}

/// Find a circuit with the fewest Toffoli gates realizing `permutation`.
pub fn quantified_exact_synthesis(permutation: &Permutation, settings: &ExactSettings) -> Result<ExactOutcome> {
    let start = Instant::now();
    let n = permutation.num_lines();
    if n == 0 || n > MAX_EXACT_LINES {
        return Err(Error::Configuration(format!(
            "exact synthesis supports 1 to {} lines, got {}",
            MAX_EXACT_LINES, n
        )));
    }

    let bdd = Bdd::default();
    let encoding = Encoding::new(n, settings.negative);
    let xs = encoding.inputs();
    let function = BddFunction::from_function(&bdd, &BooleanFunction::from_permutation(permutation), 1).outputs;

    let with_metadata = |mut circuit: Circuit| -> Result<Circuit> {
        if let Some(template) = &settings.template {
            circuit.copy_metadata(template)?;
        }
        Ok(circuit)
    };

    let mut current: Vec<Ref> = xs.iter().map(|&v| bdd.mk_var(v)).collect();
    let mut well_formed = bdd.one;

    for depth in 0..=settings.max_depth {
        debug!("check for depth {}", depth);
        if depth > 0 {
            current = encoding.perform_gate(&bdd, depth - 1, &current);
            well_formed = bdd.apply_and(well_formed, encoding.well_formed(&bdd, depth - 1));
        }

        let agree = bdd.apply_and_many(current.iter().zip(&function).map(|(&c, &f)| bdd.apply_eq(c, f)));
        let f = bdd.apply_and(bdd.forall(agree, &xs), well_formed);
        if bdd.is_zero(f) {
            continue;
        }

        let descriptors = encoding.descriptors(depth);
        let values = bdd
            .pick_min(f, &descriptors)
            .ok_or_else(|| Error::Inconsistent("satisfiable result without a model".to_string()))?;
        let circuit = with_metadata(encoding.decode(depth, &values)?)?;
        let num_circuits = bdd.sat_count_over(f, &descriptors);

        let solutions = if settings.all_solutions {
            let solutions = bdd
                .all_sat(f, &descriptors)
                .iter()
                .map(|values| encoding.decode(depth, values).and_then(&with_metadata))
                .collect::<Result<Vec<_>>>()?;
            Some(solutions)
        } else {
            None
        };

        let statistics = ExactStatistics {
            runtime: start.elapsed(),
            depth,
            bdd_nodes: bdd.num_nodes(),
        };
        info!("found {} circuit(s) with {} gates: {}", num_circuits, depth, statistics);
        return Ok(ExactOutcome::Found(ExactSolution {
            circuit,
            num_circuits,
            solutions,
            statistics,
        }));
    }

    info!("no circuit with at most {} gates", settings.max_depth);
    Ok(ExactOutcome::NotFound {
        max_depth: settings.max_depth,
    })
}
