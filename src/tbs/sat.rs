use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;

use crate::aig::Aig;
use crate::circuit::Circuit;
use crate::cnf::Cnf;
use crate::error::{Error, Result};
use crate::function::word;
use crate::rcbdd::{Rcbdd, MAX_RELATION_LINES};
use crate::solver::{SatSolver, VarisatSolver};
use crate::stats::TbsStatistics;
use crate::tbs::{resolving_gate, run, Side, Step, TransformationStrategy};

/// Representation of the function handed to the SAT variant.
#[derive(Debug, Clone, Copy)]
pub enum SatInput<'a> {
    Relation(&'a Rcbdd<'a>),
    Circuit(&'a Circuit),
    Aig(&'a Aig),
}

#[derive(Debug, Clone, Default)]
pub struct SatTbsSettings {
    /// Encode a relation through an AIG of its output functions instead of
    /// its BDD nodes.
    pub cnf_from_aig: bool,
    /// Pass retired activation literals as assumptions on every call instead
    /// of asserting them as unit clauses.
    pub all_assumptions: bool,
    /// Circuit whose line names, constants and garbage flags are copied onto
    /// the result. A circuit input provides its own metadata otherwise.
    pub template: Option<Circuit>,
}

struct SatStrategy<S> {
    cnf: Cnf<S>,
    settings: SatTbsSettings,
    /// Input literals, line 0 first.
    xs: Vec<i32>,
    /// Output literals of the current layer.
    layer: Vec<i32>,
    /// Activation literal of the mismatch constraint on `layer`.
    active: i32,
    retired: Vec<i32>,
    x_model: Vec<bool>,
    y_model: Vec<bool>,
    solving_time: Duration,
}

impl<S: SatSolver> SatStrategy<S> {
    fn new(solver: S, input: SatInput<'_>, settings: &SatTbsSettings) -> Result<Self> {
        let mut cnf = Cnf::new(solver);

        let (xs, layer) = match input {
            SatInput::Relation(rcbdd) => {
                if !rcbdd.is_permutation() {
                    return Err(Error::Inconsistent(
                        "relation does not describe a permutation".to_string(),
                    ));
                }
                let lines = rcbdd.lines();
                let xs: Vec<i32> = (0..lines).map(|_| cnf.new_var()).collect();
                if settings.cnf_from_aig {
                    let inputs: Vec<u32> = (0..lines).map(|i| rcbdd.x_var(i)).collect();
                    let aig = Aig::from_bdd(rcbdd.bdd(), &rcbdd.output_functions(), &inputs);
                    debug!("relation converted to an AIG with {} nodes", aig.num_nodes());
                    let ys = cnf.encode_aig(&aig, &xs);
                    (xs, ys)
                } else {
                    let ys: Vec<i32> = (0..lines).map(|_| cnf.new_var()).collect();
                    let vars: HashMap<u32, i32> = (0..lines)
                        .flat_map(|i| [(rcbdd.x_var(i), xs[i]), (rcbdd.y_var(i), ys[i])])
                        .collect();
                    let root = cnf.encode_bdd(rcbdd.bdd(), rcbdd.relation(), &vars);
                    cnf.add_clause(&[root]);
                    (xs, ys)
                }
            }
            SatInput::Circuit(circuit) => {
                check_width(circuit.lines())?;
                let xs: Vec<i32> = (0..circuit.lines()).map(|_| cnf.new_var()).collect();
                let mut layer = xs.clone();
                for gate in circuit {
                    layer = cnf.encode_gate(gate, &layer);
                }
                (xs, layer)
            }
            SatInput::Aig(aig) => {
                if aig.num_inputs() != aig.num_outputs() {
                    return Err(Error::LineMismatch {
                        expected: aig.num_inputs(),
                        found: aig.num_outputs(),
                    });
                }
                check_width(aig.num_inputs())?;
                let xs: Vec<i32> = (0..aig.num_inputs()).map(|_| cnf.new_var()).collect();
                let ys = cnf.encode_aig(aig, &xs);
                check_injective(&mut cnf, aig, &xs, &ys)?;
                (xs, ys)
            }
        };
        debug!(
            "initial CNF: {} variables, {} clauses",
            cnf.solver().num_vars(),
            cnf.solver().num_clauses()
        );

        let mut settings = settings.clone();
        if let (None, SatInput::Circuit(circuit)) = (&settings.template, input) {
            let mut template = Circuit::new(circuit.lines());
            template.copy_metadata(circuit)?;
            settings.template = Some(template);
        }

        let lines = xs.len();
        let mut strategy = Self {
            cnf,
            settings,
            xs,
            layer,
            active: 0,
            retired: Vec::new(),
            x_model: vec![false; lines],
            y_model: vec![false; lines],
            solving_time: Duration::ZERO,
        };
        strategy.active = strategy.guard_layer();
        Ok(strategy)
    }

    /// Fresh activation literal `a` with `a -> (x != layer)`.
    fn guard_layer(&mut self) -> i32 {
        let a = self.cnf.new_var();
        let mismatch = self.cnf.encode_mismatch(&self.xs, &self.layer);
        self.cnf.add_clause(&[-a, mismatch]);
        a
    }

    fn solve(&mut self, assumptions: &[i32]) -> Result<bool> {
        let start = Instant::now();
        let sat = self.cnf.solver_mut().solve_with(assumptions)?;
        self.solving_time += start.elapsed();
        if sat {
            let solver = self.cnf.solver();
            let value = |l: i32| solver.value(l).unwrap_or(false);
            self.x_model = self.xs.iter().map(|&l| value(l)).collect();
            self.y_model = self.layer.iter().map(|&l| value(l)).collect();
        }
        Ok(sat)
    }

    fn base_assumptions(&self) -> Vec<i32> {
        let mut assumptions = vec![self.active];
        if self.settings.all_assumptions {
            assumptions.extend(self.retired.iter().map(|&a| -a));
        }
        assumptions
    }

    fn retire_layer(&mut self) {
        let old = self.active;
        if self.settings.all_assumptions {
            self.retired.push(old);
        } else {
            self.cnf.add_clause(&[-old]);
        }
        self.active = self.guard_layer();
    }
}

/// Row words are `u64`, so wider functions cannot be resolved.
fn check_width(lines: usize) -> Result<()> {
    if lines > MAX_RELATION_LINES {
        return Err(Error::Capacity {
            required: lines,
            limit: MAX_RELATION_LINES,
        });
    }
    Ok(())
}

/// Fail unless no two distinct inputs of `aig` share an output word.
///
/// A second copy of the AIG is encoded under a guard literal that is retired
/// afterwards, so the clauses left behind are only Tseitin definitions.
fn check_injective<S: SatSolver>(cnf: &mut Cnf<S>, aig: &Aig, xs: &[i32], ys: &[i32]) -> Result<()> {
    let guard = cnf.new_var();
    let others: Vec<i32> = xs.iter().map(|_| cnf.new_var()).collect();
    let other_ys = cnf.encode_aig(aig, &others);

    let inputs_differ = cnf.encode_mismatch(xs, &others);
    cnf.add_clause(&[-guard, inputs_differ]);
    let outputs_differ = cnf.encode_mismatch(ys, &other_ys);
    cnf.add_clause(&[-guard, -outputs_differ]);

    let collision = cnf.solver_mut().solve_with(&[guard])?;
    cnf.add_clause(&[-guard]);
    if collision {
        let solver = cnf.solver();
        let value = |lits: &[i32]| {
            let bits: Vec<bool> = lits.iter().map(|&l| solver.value(l).unwrap_or(false)).collect();
            word(&bits)
        };
        return Err(Error::Inconsistent(format!(
            "AIG is not injective: inputs {:#x} and {:#x} share an output",
            value(xs),
            value(&others)
        )));
    }
    Ok(())
}

impl<S: SatSolver> TransformationStrategy for SatStrategy<S> {
    fn lines(&self) -> usize {
        self.xs.len()
    }

    fn next_step(&mut self) -> Result<Option<Step>> {
        let mut assumptions = self.base_assumptions();
        if !self.solve(&assumptions)? {
            return Ok(None);
        }

        // Fix input bits to 0 from the most significant line down while the
        // mismatch stays satisfiable.
        for j in (0..self.xs.len()).rev() {
            let x = self.xs[j];
            if !self.x_model[j] {
                assumptions.push(-x);
                continue;
            }
            assumptions.push(-x);
            if !self.solve(&assumptions)? {
                assumptions.pop();
                assumptions.push(x);
            }
        }

        let x = word(&self.x_model);
        let y = word(&self.y_model);
        if x == y {
            return Err(Error::Inconsistent(format!(
                "solver reported a mismatch on row {:#x} without one",
                x
            )));
        }
        let gate = resolving_gate(x, y);

        self.layer = self.cnf.encode_gate(&gate, &self.layer);
        self.retire_layer();

        Ok(Some(Step {
            side: Side::Output,
            row: x,
            gate,
        }))
    }

    fn counts_assignments(&self) -> bool {
        true
    }

    fn solving_time(&self) -> Option<Duration> {
        Some(self.solving_time)
    }

    fn template(&self) -> Option<&Circuit> {
        self.settings.template.as_ref()
    }
}

/// Synthesize a circuit with TBS on a SAT encoding of `input`.
pub fn symbolic_transformation_based_synthesis_sat(
    input: SatInput<'_>,
    settings: &SatTbsSettings,
) -> Result<(Circuit, TbsStatistics)> {
    symbolic_transformation_based_synthesis_sat_with(VarisatSolver::new(), input, settings)
}

/// Same as [`symbolic_transformation_based_synthesis_sat`] on a caller-provided solver.
pub fn symbolic_transformation_based_synthesis_sat_with<S: SatSolver>(
    solver: S,
    input: SatInput<'_>,
    settings: &SatTbsSettings,
) -> Result<(Circuit, TbsStatistics)> {
    debug!("SAT-based TBS using {}", solver.name());
    let mut strategy = SatStrategy::new(solver, input, settings)?;
    run(&mut strategy)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::bdd::Bdd;
    use crate::gate::{Control, Gate};
    use crate::permutation::Permutation;
    use crate::tbs::{transformation_based_synthesis, TbsSettings};

    fn all_settings() -> Vec<SatTbsSettings> {
        let mut result = Vec::new();
        for cnf_from_aig in [false, true] {
            for all_assumptions in [false, true] {
                result.push(SatTbsSettings {
                    cnf_from_aig,
                    all_assumptions,
                    ..Default::default()
                });
            }
        }
        result
    }

    #[test]
    fn test_relation_matches_explicit() {
        let p = Permutation::new(3, vec![1, 0, 3, 2, 5, 7, 4, 6]).unwrap();
        let bdd = Bdd::default();
        let rcbdd = Rcbdd::from_permutation(&bdd, &p).unwrap();
        let (explicit, _) = transformation_based_synthesis(&p, &TbsSettings::default()).unwrap();

        for settings in all_settings() {
            let (circuit, stats) =
                symbolic_transformation_based_synthesis_sat(SatInput::Relation(&rcbdd), &settings).unwrap();
            assert_eq!(circuit, explicit, "{:?}", settings);
            assert!(stats.solving_time.is_some());
            assert!(stats.assignment_count.is_some());
        }
    }

    #[test]
    fn test_circuit_input() {
        let mut input = Circuit::new(3);
        input.append_toffoli([Control::positive(0), Control::positive(1)], 2).unwrap();
        input.append_fredkin([Control::negative(2)], 0, 1).unwrap();
        input.append_gate(Gate::not(0)).unwrap();
        let p = input.to_permutation().unwrap();

        input.set_name("mixed");
        input.set_constants(vec![None, None, Some(false)]).unwrap();

        let (circuit, _) =
            symbolic_transformation_based_synthesis_sat(SatInput::Circuit(&input), &SatTbsSettings::default()).unwrap();
        assert!(circuit.realizes(&p));
        assert_eq!(circuit.name(), "mixed");
        assert_eq!(circuit.constants(), input.constants());

        // An explicit template wins over the input's own metadata.
        let mut template = Circuit::new(3);
        template.set_name("renamed");
        let settings = SatTbsSettings {
            template: Some(template),
            ..Default::default()
        };
        let (circuit, _) = symbolic_transformation_based_synthesis_sat(SatInput::Circuit(&input), &settings).unwrap();
        assert_eq!(circuit.name(), "renamed");
        assert_eq!(circuit.constants(), &[None, None, None]);
    }

    #[test]
    fn test_aig_input() {
        // y0 = x0 ^ x1, y1 = x1
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let x = aig.xor(a, b);
        aig.add_output(x);
        aig.add_output(b);

        let (circuit, stats) =
            symbolic_transformation_based_synthesis_sat(SatInput::Aig(&aig), &SatTbsSettings::default()).unwrap();
        assert_eq!(circuit.gates(), &[Gate::cnot(1, 0).unwrap()]);
        assert_eq!(stats.assignment_count, Some(1));
    }

    #[test]
    fn test_aig_shape_mismatch() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        aig.add_output(a);
        aig.add_output(!a);
        assert!(matches!(
            symbolic_transformation_based_synthesis_sat(SatInput::Aig(&aig), &SatTbsSettings::default()),
            Err(Error::LineMismatch { .. })
        ));
    }

    #[test]
    fn test_non_injective_aig() {
        // y0 = x0 & x1, y1 = x1: inputs 00 and 01 collide.
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let x = aig.and(a, b);
        aig.add_output(x);
        aig.add_output(b);
        assert!(matches!(
            symbolic_transformation_based_synthesis_sat(SatInput::Aig(&aig), &SatTbsSettings::default()),
            Err(Error::Inconsistent(msg)) if msg.contains("not injective")
        ));
    }

    #[test]
    fn test_wide_inputs_rejected() {
        let mut circuit = Circuit::new(70);
        circuit.append_gate(Gate::not(65)).unwrap();
        assert!(matches!(
            symbolic_transformation_based_synthesis_sat(SatInput::Circuit(&circuit), &SatTbsSettings::default()),
            Err(Error::Capacity {
                required: 70,
                limit: MAX_RELATION_LINES
            })
        ));

        let mut aig = Aig::new();
        for _ in 0..MAX_RELATION_LINES + 1 {
            let x = aig.add_input();
            aig.add_output(x);
        }
        assert!(matches!(
            symbolic_transformation_based_synthesis_sat(SatInput::Aig(&aig), &SatTbsSettings::default()),
            Err(Error::Capacity { .. })
        ));

        // The widest supported circuit still goes through.
        let mut circuit = Circuit::new(MAX_RELATION_LINES);
        circuit.append_gate(Gate::not(MAX_RELATION_LINES - 1)).unwrap();
        let (result, _) =
            symbolic_transformation_based_synthesis_sat(SatInput::Circuit(&circuit), &SatTbsSettings::default())
                .unwrap();
        assert_eq!(result.gates(), &[Gate::not(MAX_RELATION_LINES - 1)]);
    }

    #[test]
    fn test_identity() {
        let circuit = Circuit::new(2);
        let (result, stats) =
            symbolic_transformation_based_synthesis_sat(SatInput::Circuit(&circuit), &SatTbsSettings::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!(stats.assignment_count, Some(0));
    }
}
