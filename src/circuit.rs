//! Reversible circuits: cascades of Toffoli and Fredkin gates.

use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};
use crate::gate::{Control, Gate, Line};
use crate::permutation::{Permutation, MAX_LINES};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Circuit {
    lines: usize,
    gates: Vec<Gate>,
    inputs: Vec<String>,
    outputs: Vec<String>,
    /// Constant input value per line, `None` for primary inputs.
    constants: Vec<Option<bool>>,
    /// Whether the output of a line is garbage.
    garbage: Vec<bool>,
    name: String,
}

impl Circuit {
    pub fn new(lines: usize) -> Self {
        Self {
            lines,
            gates: Vec::new(),
            inputs: (0..lines).map(|i| format!("i{}", i)).collect(),
            outputs: (0..lines).map(|i| format!("o{}", i)).collect(),
            constants: vec![None; lines],
            garbage: vec![false; lines],
            name: String::new(),
        }
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Gate> {
        self.gates.iter()
    }

    fn check(&self, gate: &Gate) -> Result<()> {
        if gate.max_line() >= self.lines {
            return Err(Error::InvalidGate(format!(
                "{} does not fit into a circuit with {} lines",
                gate, self.lines
            )));
        }
        Ok(())
    }

    pub fn append_gate(&mut self, gate: Gate) -> Result<()> {
        self.check(&gate)?;
        self.gates.push(gate);
        Ok(())
    }

    pub fn prepend_gate(&mut self, gate: Gate) -> Result<()> {
        self.insert_gate(0, gate)
    }

    pub fn insert_gate(&mut self, pos: usize, gate: Gate) -> Result<()> {
        self.check(&gate)?;
        self.gates.insert(pos, gate);
        Ok(())
    }

    pub fn remove_gate_at(&mut self, pos: usize) -> Gate {
        self.gates.remove(pos)
    }

    pub fn append_toffoli(&mut self, controls: impl IntoIterator<Item = Control>, target: Line) -> Result<()> {
        self.append_gate(Gate::toffoli(controls, target)?)
    }

    pub fn append_fredkin(&mut self, controls: impl IntoIterator<Item = Control>, a: Line, b: Line) -> Result<()> {
        self.append_gate(Gate::fredkin(controls, a, b)?)
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn constants(&self) -> &[Option<bool>] {
        &self.constants
    }

    pub fn garbage(&self) -> &[bool] {
        &self.garbage
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_inputs(&mut self, inputs: Vec<String>) -> Result<()> {
        self.check_len(inputs.len())?;
        self.inputs = inputs;
        Ok(())
    }

    pub fn set_outputs(&mut self, outputs: Vec<String>) -> Result<()> {
        self.check_len(outputs.len())?;
        self.outputs = outputs;
        Ok(())
    }

    pub fn set_constants(&mut self, constants: Vec<Option<bool>>) -> Result<()> {
        self.check_len(constants.len())?;
        self.constants = constants;
        Ok(())
    }

    pub fn set_garbage(&mut self, garbage: Vec<bool>) -> Result<()> {
        self.check_len(garbage.len())?;
        self.garbage = garbage;
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.lines {
            return Err(Error::LineMismatch {
                expected: self.lines,
                found: len,
            });
        }
        Ok(())
    }

    /// Copy names, constants and garbage flags from `other`.
    pub fn copy_metadata(&mut self, other: &Circuit) -> Result<()> {
        self.check_len(other.lines)?;
        self.inputs = other.inputs.clone();
        self.outputs = other.outputs.clone();
        self.constants = other.constants.clone();
        self.garbage = other.garbage.clone();
        self.name = other.name.clone();
        Ok(())
    }

    /// Apply every gate to `word` in order.
    pub fn simulate(&self, word: u64) -> u64 {
        self.gates.iter().fold(word, |w, gate| gate.apply(w))
    }

    /// Tabulate the circuit.
    pub fn to_permutation(&self) -> Result<Permutation> {
        if self.lines > MAX_LINES {
            return Err(Error::Capacity {
                required: self.lines,
                limit: MAX_LINES,
            });
        }
        let table = (0..1u64 << self.lines).map(|x| self.simulate(x)).collect();
        Permutation::new(self.lines, table)
    }

    /// Check that the circuit computes `permutation`.
    pub fn realizes(&self, permutation: &Permutation) -> bool {
        self.lines == permutation.num_lines()
            && permutation.rows().all(|(x, y)| self.simulate(x) == y)
    }

    /// The inverse circuit: every gate is self-inverse, so the order is reversed.
    pub fn reversed(&self) -> Circuit {
        let mut circuit = self.clone();
        circuit.gates.reverse();
        std::mem::swap(&mut circuit.inputs, &mut circuit.outputs);
        circuit
    }
}

impl<'a> IntoIterator for &'a Circuit {
    type Item = &'a Gate;
    type IntoIter = std::slice::Iter<'a, Gate>;

    fn into_iter(self) -> Self::IntoIter {
        self.gates.iter()
    }
}

impl Display for Circuit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "circuit {:?} on {} lines:", self.name, self.lines)?;
        for (i, gate) in self.gates.iter().enumerate() {
            writeln!(f, "  {:>3}: {}", i, gate)?;
        }
        Ok(())
    }
}
