//! Transformation-based synthesis (TBS).
//!
//! Rows are visited in increasing order. For the smallest row `x` whose
//! current image `y` differs from `x`, gates are chosen that move `y` towards
//! `x` without touching any smaller row. Gates applied to the outputs of the
//! function ("output side") end up reversed at the end of the circuit, gates
//! applied to its inputs ("input side") end up at the front, in order.
//!
//! Three realizations share the driving loop in [`run`]:
//!
//! - [`transformation_based_synthesis`] on an explicit truth table,
//! - [`symbolic_transformation_based_synthesis`] on a characteristic BDD,
//! - [`symbolic_transformation_based_synthesis_sat`] on a CNF encoding.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::gate::{Control, Gate, Line};
use crate::stats::TbsStatistics;
use crate::utils::ones;

mod explicit;
mod sat;
mod symbolic;

pub use self::explicit::{transformation_based_synthesis, TbsSettings};
pub use self::sat::{symbolic_transformation_based_synthesis_sat, SatInput, SatTbsSettings};
pub use self::symbolic::{symbolic_transformation_based_synthesis, SymbolicTbsSettings};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Side {
    Input,
    Output,
}

/// One gate chosen while resolving `row`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Step {
    pub side: Side,
    pub row: u64,
    pub gate: Gate,
}

pub trait TransformationStrategy {
    fn lines(&self) -> usize;

    /// Choose and apply the next gate, or `None` once the function is the identity.
    fn next_step(&mut self) -> Result<Option<Step>>;

    /// Fold each new gate into an earlier gate of its side when the gates in
    /// between commute with it, and merge `T(C+b; a) T(C+a; b) T(C+b; a)`
    /// into `Fredkin(C; a, b)`.
    fn fredkin_lookback(&self) -> bool {
        false
    }

    /// Metadata for the synthesized circuit.
    fn template(&self) -> Option<&Circuit> {
        None
    }

    /// Report the number of distinct rows that needed gates.
    fn counts_assignments(&self) -> bool {
        false
    }

    fn solving_time(&self) -> Option<Duration> {
        None
    }
}

/// Drive `strategy` to completion and assemble the circuit.
pub fn run(strategy: &mut dyn TransformationStrategy) -> Result<(Circuit, TbsStatistics)> {
    let start = Instant::now();
    let lines = strategy.lines();
    // Every row needs at most one gate per line.
    let limit = 1u128
        .checked_shl(lines as u32)
        .and_then(|rows| rows.checked_mul(lines as u128))
        .unwrap_or(u128::MAX);

    let mut input_gates = Vec::new();
    let mut output_gates = Vec::new();
    let mut num_steps: u128 = 0;
    let mut assignment_count = 0;
    let mut last_row = None;

    while let Some(step) = strategy.next_step()? {
        num_steps += 1;
        if num_steps > limit {
            return Err(Error::Inconsistent(format!(
                "no convergence after {} steps on {} lines",
                limit, lines
            )));
        }
        if last_row != Some(step.row) {
            assignment_count += 1;
            last_row = Some(step.row);
        }
        debug!("row {:#x}: {} on the {:?} side", step.row, step.gate, step.side);

        let gates = match step.side {
            Side::Input => &mut input_gates,
            Side::Output => &mut output_gates,
        };
        if strategy.fredkin_lookback() {
            let end = gates.len();
            lookback(gates, step.gate, end);
            merge_fredkin(gates);
        } else {
            gates.push(step.gate);
        }
    }

    let mut circuit = Circuit::new(lines);
    for gate in input_gates.into_iter().chain(output_gates.into_iter().rev()) {
        circuit.append_gate(gate)?;
    }
    if let Some(template) = strategy.template() {
        circuit.copy_metadata(template)?;
    }

    let statistics = TbsStatistics {
        runtime: start.elapsed(),
        assignment_count: strategy.counts_assignments().then_some(assignment_count),
        solving_time: strategy.solving_time(),
        num_gates: circuit.num_gates(),
    };
    info!("TBS on {} lines done: {}", lines, statistics);
    Ok((circuit, statistics))
}

/// Gate moving `y > x` one bit closer to `x`, leaving every row below `x` fixed.
pub fn resolving_gate(x: u64, y: u64) -> Gate {
    assert_ne!(x, y);
    let (controls, target) = if x & !y != 0 {
        (y, (x & !y).trailing_zeros())
    } else {
        (x, (y & !x).trailing_zeros())
    };
    Gate::Toffoli {
        controls: ones(controls).map(Control::positive).collect(),
        target: target as usize,
    }
}

/// `Fredkin(ones(x & y); a, b)` if `y` is `x` with bits `a` and `b` exchanged.
pub fn swapping_gate(x: u64, y: u64) -> Option<Gate> {
    let diff = x ^ y;
    if diff.count_ones() != 2 || (x & diff).count_ones() != 1 {
        return None;
    }
    let a = diff.trailing_zeros() as usize;
    let b = (u64::BITS - 1 - diff.leading_zeros()) as usize;
    Some(Gate::Fredkin {
        controls: ones(x & y).map(Control::positive).collect(),
        targets: [a, b],
    })
}

pub(crate) fn choose_gate(x: u64, y: u64, fredkin: bool) -> Gate {
    fredkin
        .then(|| swapping_gate(x, y))
        .flatten()
        .unwrap_or_else(|| resolving_gate(x, y))
}

/// Applying `g` then `h` gives the same function as `h` then `g`.
fn commutes(g: &Gate, h: &Gate) -> bool {
    // Opposite controls on one line: never active on the same pattern.
    let exclusive = g.controls().iter().any(|c| {
        h.controls().contains(&Control {
            line: c.line,
            polarity: !c.polarity,
        })
    });
    if exclusive {
        return true;
    }
    let reads = |gate: &Gate, line: Line| gate.controls().iter().any(|c| c.line == line);
    if g.targets().iter().any(|&t| reads(h, t)) || h.targets().iter().any(|&t| reads(g, t)) {
        return false;
    }
    let disjoint = g.targets().iter().all(|t| !h.targets().contains(t));
    disjoint || same_action(g, h)
}

/// Same kind of gate on the same targets.
fn same_action(g: &Gate, h: &Gate) -> bool {
    g.is_toffoli() == h.is_toffoli() && g.targets() == h.targets()
}

/// Controls of the cube `a xor b`, if it is a cube.
fn xor_cube(a: &[Control], b: &[Control]) -> Option<Vec<Control>> {
    let only_a: Vec<Control> = a.iter().copied().filter(|c| !b.contains(c)).collect();
    let only_b: Vec<Control> = b.iter().copied().filter(|c| !a.contains(c)).collect();
    let flipped = |c: Control| Control {
        line: c.line,
        polarity: !c.polarity,
    };
    let mut controls: Vec<Control> = match (only_a.as_slice(), only_b.as_slice()) {
        // C+l xor C-l = C
        ([x], [y]) if x.line == y.line => a.iter().copied().filter(|c| c.line != x.line).collect(),
        // C+l xor C = C-l
        ([x], []) => b.iter().copied().chain([flipped(*x)]).collect(),
        ([], [y]) => a.iter().copied().chain([flipped(*y)]).collect(),
        _ => return None,
    };
    controls.sort();
    Some(controls)
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Merged {
    Cancelled,
    Gate(Gate),
}

/// Single gate equal to `g` followed by `h`, if there is one.
fn merge(g: &Gate, h: &Gate) -> Option<Merged> {
    if !same_action(g, h) {
        return None;
    }
    if g.controls() == h.controls() {
        return Some(Merged::Cancelled);
    }
    let controls = xor_cube(g.controls(), h.controls())?;
    let gate = match g {
        Gate::Toffoli { target, .. } => Gate::Toffoli {
            controls,
            target: *target,
        },
        Gate::Fredkin { targets, .. } => Gate::Fredkin {
            controls,
            targets: *targets,
        },
    };
    Some(Merged::Gate(gate))
}

/// Insert `gate` at position `end` of `gates`, first moving it back over the
/// gates it commutes with and folding it into the first one it merges with.
/// A merged gate is placed again from the position it replaced.
fn lookback(gates: &mut Vec<Gate>, gate: Gate, end: usize) {
    let mut gate = gate;
    let mut end = end;
    loop {
        let mut found = None;
        for i in (0..end).rev() {
            if let Some(merged) = merge(&gates[i], &gate) {
                found = Some((i, merged));
                break;
            }
            if !commutes(&gates[i], &gate) {
                break;
            }
        }
        match found {
            None => {
                gates.insert(end, gate);
                return;
            }
            Some((i, Merged::Cancelled)) => {
                debug!("lookback: {} cancels {}", gate, gates[i]);
                gates.remove(i);
                return;
            }
            Some((i, Merged::Gate(merged))) => {
                debug!("lookback: {} and {} merged into {}", gates[i], gate, merged);
                gates.remove(i);
                gate = merged;
                end = i;
            }
        }
    }
}

fn merge_fredkin(gates: &mut Vec<Gate>) {
    let [.., g1, g2, g3] = gates.as_slice() else {
        return;
    };
    if g1 != g3 {
        return;
    }
    let (
        Gate::Toffoli {
            controls: c1,
            target: a,
        },
        Gate::Toffoli {
            controls: c2,
            target: b,
        },
    ) = (g1, g2)
    else {
        return;
    };
    let without = |controls: &[Control], line| -> Option<Vec<Control>> {
        controls.contains(&Control::positive(line)).then(|| {
            controls
                .iter()
                .copied()
                .filter(|c| c.line != line)
                .collect()
        })
    };
    let (Some(common), Some(other)) = (without(c1, *b), without(c2, *a)) else {
        return;
    };
    if common != other {
        return;
    }
    if let Ok(fredkin) = Gate::fredkin(common, *a, *b) {
        debug!("lookback: merged three Toffoli gates into {}", fredkin);
        gates.truncate(gates.len() - 3);
        gates.push(fredkin);
    }
}
