//! Irreversible (multi-output, possibly partial) Boolean functions.

use crate::bdd::Bdd;
use crate::error::{Error, Result};
use crate::permutation::{Permutation, MAX_LINES};
use crate::reference::Ref;

/// A multi-output Boolean function given by its truth table.
///
/// `rows[x]` is the output pattern of input `x`, or `None` if the row is
/// unspecified.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BooleanFunction {
    inputs: usize,
    outputs: usize,
    rows: Vec<Option<u64>>,
}

impl BooleanFunction {
    pub fn new(inputs: usize, outputs: usize, rows: Vec<Option<u64>>) -> Result<Self> {
        let widest = inputs.max(outputs);
        if widest > MAX_LINES {
            return Err(Error::Capacity {
                required: widest,
                limit: MAX_LINES,
            });
        }
        if rows.len() != 1 << inputs {
            return Err(Error::Configuration(format!(
                "a function with {} inputs needs {} rows, got {}",
                inputs,
                1usize << inputs,
                rows.len()
            )));
        }
        if let Some((x, y)) = rows
            .iter()
            .enumerate()
            .find_map(|(x, y)| y.filter(|&y| y >> outputs != 0).map(|y| (x, y)))
        {
            return Err(Error::Configuration(format!(
                "output {:#x} of row {:#x} does not fit into {} outputs",
                y, x, outputs
            )));
        }
        Ok(Self {
            inputs,
            outputs,
            rows,
        })
    }

    /// Tabulate `f` over all `2^inputs` input patterns.
    pub fn from_fn(inputs: usize, outputs: usize, f: impl Fn(u64) -> Option<u64>) -> Result<Self> {
        if inputs > MAX_LINES {
            return Err(Error::Capacity {
                required: inputs,
                limit: MAX_LINES,
            });
        }
        Self::new(inputs, outputs, (0..1u64 << inputs).map(f).collect())
    }

    pub fn from_permutation(permutation: &Permutation) -> Self {
        let lines = permutation.num_lines();
        Self {
            inputs: lines,
            outputs: lines,
            rows: permutation.table().iter().map(|&y| Some(y)).collect(),
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs
    }

    pub fn output(&self, x: u64) -> Option<u64> {
        self.rows[x as usize]
    }

    pub fn rows(&self) -> &[Option<u64>] {
        &self.rows
    }

    pub fn is_fully_specified(&self) -> bool {
        self.rows.iter().all(Option::is_some)
    }

    /// The function itself, if it already is a permutation.
    pub fn to_permutation(&self) -> Option<Permutation> {
        if self.inputs != self.outputs || !self.is_fully_specified() {
            return None;
        }
        let table = self.rows.iter().map(|y| y.unwrap_or_default()).collect();
        Permutation::new(self.inputs, table).ok()
    }
}

/// A multi-output Boolean function given by one BDD per output.
///
/// Inputs are BDD variables; `care` is the set of specified input patterns.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BddFunction {
    pub inputs: Vec<u32>,
    pub outputs: Vec<Ref>,
    pub care: Ref,
}

impl BddFunction {
    /// Fully specified function over `inputs`.
    pub fn new(bdd: &Bdd, inputs: Vec<u32>, outputs: Vec<Ref>) -> Self {
        Self {
            inputs,
            outputs,
            care: bdd.one,
        }
    }

    /// Build output BDDs for an explicit function over variables `first_var..`.
    pub fn from_function(bdd: &Bdd, function: &BooleanFunction, first_var: u32) -> Self {
        let inputs: Vec<u32> = (0..function.num_inputs() as u32).map(|i| first_var + i).collect();
        let mut outputs = vec![bdd.zero; function.num_outputs()];
        let mut care = bdd.zero;
        for (x, y) in function.rows().iter().enumerate() {
            let Some(y) = y else { continue };
            let cube = bdd.cube_from_bits(&inputs, &bits(x as u64, inputs.len()));
            care = bdd.apply_or(care, cube);
            for (j, output) in outputs.iter_mut().enumerate() {
                if (y >> j) & 1 == 1 {
                    *output = bdd.apply_or(*output, cube);
                }
            }
        }
        Self {
            inputs,
            outputs,
            care,
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Evaluate every output on input pattern `x`; `None` outside the care set.
    pub fn eval(&self, bdd: &Bdd, x: u64) -> Option<u64> {
        let assignment = self
            .inputs
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, (x >> i) & 1 == 1))
            .collect();
        if bdd.is_zero(bdd.restrict(self.care, &assignment)) {
            return None;
        }
        let mut y = 0;
        for (j, &output) in self.outputs.iter().enumerate() {
            if bdd.is_one(bdd.restrict(output, &assignment)) {
                y |= 1 << j;
            }
        }
        Some(y)
    }

    /// Materialize the truth table.
    pub fn to_boolean_function(&self, bdd: &Bdd) -> Result<BooleanFunction> {
        BooleanFunction::from_fn(self.num_inputs(), self.num_outputs(), |x| self.eval(bdd, x))
    }
}

/// Bits of `word`, line 0 first.
pub(crate) fn bits(word: u64, width: usize) -> Vec<bool> {
    (0..width).map(|i| (word >> i) & 1 == 1).collect()
}

/// Inverse of [`bits`].
pub(crate) fn word(bits: &[bool]) -> u64 {
    bits.iter()
        .enumerate()
        .fold(0, |w, (i, &b)| if b { w | (1 << i) } else { w })
}
