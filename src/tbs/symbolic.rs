use log::debug;

use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::rcbdd::Rcbdd;
use crate::stats::TbsStatistics;
use crate::tbs::{choose_gate, run, Side, Step, TransformationStrategy};

#[derive(Debug, Clone, Default)]
pub struct SymbolicTbsSettings {
    /// Emit a single Fredkin gate for rows whose image is a two-bit swap.
    pub fredkin: bool,
    /// Circuit whose line names, constants and garbage flags are copied onto
    /// the result, e.g. [`Embedding::circuit_template`](crate::embed::Embedding::circuit_template).
    pub template: Option<Circuit>,
}

/// TBS on the characteristic BDD; gates are applied on the output side only.
struct SymbolicStrategy<'a> {
    rcbdd: Rcbdd<'a>,
    settings: SymbolicTbsSettings,
}

impl TransformationStrategy for SymbolicStrategy<'_> {
    fn lines(&self) -> usize {
        self.rcbdd.lines()
    }

    fn next_step(&mut self) -> Result<Option<Step>> {
        let Some(x) = self.rcbdd.smallest_mismatch() else {
            return Ok(None);
        };
        let y = self
            .rcbdd
            .image_of(x)
            .ok_or_else(|| Error::Inconsistent(format!("row {:#x} has no image", x)))?;
        let gate = choose_gate(x, y, self.settings.fredkin);
        self.rcbdd.apply_gate_output(&gate);
        debug!(
            "relation has {} nodes after {}",
            self.rcbdd.bdd().size(self.rcbdd.relation()),
            gate
        );
        Ok(Some(Step {
            side: Side::Output,
            row: x,
            gate,
        }))
    }

    fn counts_assignments(&self) -> bool {
        true
    }

    fn template(&self) -> Option<&Circuit> {
        self.settings.template.as_ref()
    }
}

/// Synthesize a circuit for the reversible function represented by `rcbdd`.
pub fn symbolic_transformation_based_synthesis(
    rcbdd: &Rcbdd<'_>,
    settings: &SymbolicTbsSettings,
) -> Result<(Circuit, TbsStatistics)> {
    if !rcbdd.is_permutation() {
        return Err(Error::Inconsistent(
            "relation does not describe a permutation".to_string(),
        ));
    }
    let mut strategy = SymbolicStrategy {
        rcbdd: rcbdd.clone(),
        settings: settings.clone(),
    };
    run(&mut strategy)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::bdd::Bdd;
    use crate::gate::Gate;
    use crate::permutation::Permutation;
    use crate::tbs::{transformation_based_synthesis, TbsSettings};

    #[test]
    fn test_matches_explicit() {
        let tables = [
            vec![0, 3, 2, 1],
            vec![0, 2, 1, 3],
            vec![7, 0, 1, 2, 3, 4, 5, 6],
            vec![1, 0, 3, 2, 5, 7, 4, 6],
        ];
        for table in tables {
            let lines = table.len().trailing_zeros() as usize;
            let p = Permutation::new(lines, table).unwrap();
            let bdd = Bdd::default();
            let rcbdd = Rcbdd::from_permutation(&bdd, &p).unwrap();

            let (symbolic, stats) =
                symbolic_transformation_based_synthesis(&rcbdd, &SymbolicTbsSettings::default()).unwrap();
            let (explicit, _) = transformation_based_synthesis(&p, &TbsSettings::default()).unwrap();
            assert!(symbolic.realizes(&p), "{}", p);
            assert_eq!(symbolic, explicit, "{}", p);
            assert!(stats.assignment_count.unwrap() <= p.len());
        }
    }

    #[test]
    fn test_fredkin() {
        let bdd = Bdd::default();
        let p = Permutation::new(2, vec![0, 2, 1, 3]).unwrap();
        let rcbdd = Rcbdd::from_permutation(&bdd, &p).unwrap();
        let settings = SymbolicTbsSettings {
            fredkin: true,
            ..Default::default()
        };
        let (circuit, stats) = symbolic_transformation_based_synthesis(&rcbdd, &settings).unwrap();
        assert_eq!(circuit.gates(), &[Gate::fredkin([], 0, 1).unwrap()]);
        assert_eq!(stats.assignment_count, Some(1));
    }

    #[test]
    fn test_rejects_partial_relation() {
        let bdd = Bdd::default();
        let rcbdd = Rcbdd::new(&bdd, 1, bdd.cube([-1, -2])).unwrap();
        assert!(matches!(
            symbolic_transformation_based_synthesis(&rcbdd, &SymbolicTbsSettings::default()),
            Err(Error::Inconsistent(_))
        ));
    }

    #[test]
    fn test_rejects_non_functional_relation() {
        let bdd = Bdd::default();
        let rcbdd = Rcbdd::new(&bdd, 2, bdd.one).unwrap();
        assert!(matches!(
            symbolic_transformation_based_synthesis(&rcbdd, &SymbolicTbsSettings::default()),
            Err(Error::Inconsistent(_))
        ));
    }

    #[test]
    fn test_caller_relation_unchanged() {
        let bdd = Bdd::default();
        let p = Permutation::new(2, vec![1, 0, 3, 2]).unwrap();
        let rcbdd = Rcbdd::from_permutation(&bdd, &p).unwrap();
        let before = rcbdd.relation();
        symbolic_transformation_based_synthesis(&rcbdd, &SymbolicTbsSettings::default()).unwrap();
        assert_eq!(rcbdd.relation(), before);
    }
}
