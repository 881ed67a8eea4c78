//! End-to-end tests for embedding and synthesis.
//!
//! Every synthesis variant must produce a circuit that realizes its input, and
//! the variants that share the row order must agree gate by gate.

use num_bigint::BigUint;

use revsynth::bdd::Bdd;
use revsynth::embed::{calculate_additional_lines, embed, original_output, EmbedSettings, EmbedSource};
use revsynth::exact::{quantified_exact_synthesis, ExactOutcome, ExactSettings};
use revsynth::function::{BddFunction, BooleanFunction};
use revsynth::gate::Gate;
use revsynth::permutation::Permutation;
use revsynth::rcbdd::Rcbdd;
use revsynth::tbs::{
    symbolic_transformation_based_synthesis, symbolic_transformation_based_synthesis_sat,
    transformation_based_synthesis, SatInput, SatTbsSettings, SymbolicTbsSettings, TbsSettings,
};

/// Small deterministic generator for test inputs.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn permutation(&mut self, lines: usize) -> Permutation {
        let mut table: Vec<u64> = (0..1u64 << lines).collect();
        for i in (1..table.len()).rev() {
            let j = self.below(i as u64 + 1) as usize;
            table.swap(i, j);
        }
        Permutation::new(lines, table).unwrap()
    }
}

fn all_permutations(lines: usize) -> Vec<Permutation> {
    fn go(prefix: &mut Vec<u64>, rest: &mut Vec<u64>, out: &mut Vec<Vec<u64>>) {
        if rest.is_empty() {
            out.push(prefix.clone());
            return;
        }
        for i in 0..rest.len() {
            let v = rest.remove(i);
            prefix.push(v);
            go(prefix, rest, out);
            prefix.pop();
            rest.insert(i, v);
        }
    }
    let mut out = Vec::new();
    go(&mut Vec::new(), &mut (0..1u64 << lines).collect(), &mut out);
    out.into_iter().map(|t| Permutation::new(lines, t).unwrap()).collect()
}

// ─── Transformation-Based Synthesis ────────────────────────────────────────────

#[test]
fn tbs_variants_agree() {
    let mut rng = XorShift(0x9E3779B97F4A7C15);
    for lines in 1..=4 {
        for _ in 0..8 {
            let p = rng.permutation(lines);
            let bdd = Bdd::default();
            let rcbdd = Rcbdd::from_permutation(&bdd, &p).unwrap();

            let (explicit, _) = transformation_based_synthesis(&p, &TbsSettings::default()).unwrap();
            let (symbolic, symbolic_stats) =
                symbolic_transformation_based_synthesis(&rcbdd, &SymbolicTbsSettings::default()).unwrap();
            let (sat, sat_stats) =
                symbolic_transformation_based_synthesis_sat(SatInput::Relation(&rcbdd), &SatTbsSettings::default())
                    .unwrap();

            assert!(explicit.realizes(&p), "{}", p);
            assert_eq!(symbolic, explicit, "{}", p);
            assert_eq!(sat, explicit, "{}", p);
            assert_eq!(symbolic_stats.assignment_count, sat_stats.assignment_count);
        }
    }
}

#[test]
fn tbs_options_realize_permutation() {
    let mut rng = XorShift(0xDEADBEEF);
    for lines in 2..=4 {
        for _ in 0..6 {
            let p = rng.permutation(lines);
            for bits in 0..8 {
                let settings = TbsSettings {
                    bidirectional: bits & 1 != 0,
                    fredkin: bits & 2 != 0,
                    fredkin_lookback: bits & 6 == 6,
                    ..Default::default()
                };
                let (circuit, stats) = transformation_based_synthesis(&p, &settings).unwrap();
                assert!(circuit.realizes(&p), "{} with {:?}", p, settings);
                assert_eq!(stats.num_gates, circuit.num_gates());
            }

            let bdd = Bdd::default();
            let rcbdd = Rcbdd::from_permutation(&bdd, &p).unwrap();
            let (circuit, _) =
                symbolic_transformation_based_synthesis(&rcbdd, &SymbolicTbsSettings {
                    fredkin: true,
                    ..Default::default()
                }).unwrap();
            assert!(circuit.realizes(&p), "{}", p);

            for bits in 0..4 {
                let settings = SatTbsSettings {
                    cnf_from_aig: bits & 1 != 0,
                    all_assumptions: bits & 2 != 0,
                    ..Default::default()
                };
                let (circuit, _) =
                    symbolic_transformation_based_synthesis_sat(SatInput::Relation(&rcbdd), &settings).unwrap();
                assert!(circuit.realizes(&p), "{} with {:?}", p, settings);
            }
        }
    }
}

#[test]
fn tbs_lookback_shrinks_circuits() {
    let plain = TbsSettings {
        fredkin: true,
        ..Default::default()
    };
    let lookback = TbsSettings {
        fredkin_lookback: true,
        ..plain.clone()
    };
    for bidirectional in [false, true] {
        let plain = TbsSettings { bidirectional, ..plain.clone() };
        let lookback = TbsSettings { bidirectional, ..lookback.clone() };
        let mut total_plain = 0;
        let mut total_lookback = 0;
        for lines in 2..=3 {
            let perms = if lines == 2 {
                all_permutations(lines)
            } else {
                let mut rng = XorShift(0x5EED);
                (0..50).map(|_| rng.permutation(lines)).collect()
            };
            for p in perms {
                let (circuit, _) = transformation_based_synthesis(&p, &plain).unwrap();
                let (merged, _) = transformation_based_synthesis(&p, &lookback).unwrap();
                assert!(merged.realizes(&p), "{} with {:?}", p, lookback);
                assert!(merged.num_gates() <= circuit.num_gates(), "{}", p);
                total_plain += circuit.num_gates();
                total_lookback += merged.num_gates();
            }
        }
        assert!(
            total_lookback < total_plain,
            "bidirectional = {}: {} gates with lookback, {} without",
            bidirectional,
            total_lookback,
            total_plain
        );
    }
}

#[test]
fn tbs_from_circuit_round_trip() {
    let mut rng = XorShift(42);
    let p = rng.permutation(4);
    let (circuit, _) = transformation_based_synthesis(&p, &TbsSettings::default()).unwrap();

    let bdd = Bdd::default();
    let rcbdd = Rcbdd::from_circuit(&bdd, &circuit).unwrap();
    assert_eq!(rcbdd.to_permutation().unwrap(), p);

    let (again, _) =
        symbolic_transformation_based_synthesis_sat(SatInput::Circuit(&circuit), &SatTbsSettings::default()).unwrap();
    assert!(again.realizes(&p));
}

// ─── Embedding ─────────────────────────────────────────────────────────────────

fn random_function(rng: &mut XorShift, inputs: usize, outputs: usize, partial: bool) -> BooleanFunction {
    let rows = (0..1 << inputs)
        .map(|_| {
            if partial && rng.below(4) == 0 {
                None
            } else {
                Some(rng.below(1 << outputs))
            }
        })
        .collect();
    BooleanFunction::new(inputs, outputs, rows).unwrap()
}

#[test]
fn embedding_preserves_function() {
    let mut rng = XorShift(7);
    for (inputs, outputs) in [(1, 1), (2, 1), (3, 1), (3, 2), (2, 3), (4, 2)] {
        for partial in [false, true] {
            let f = random_function(&mut rng, inputs, outputs, partial);
            let embedding = embed(EmbedSource::Table(&f), &EmbedSettings::default()).unwrap();

            let additional = calculate_additional_lines(&f);
            assert_eq!(embedding.additional_lines, additional);
            assert_eq!(embedding.lines, inputs.max(outputs + additional));

            let p = embedding.permutation.unwrap();
            assert_eq!(p.num_lines(), embedding.lines);
            for (x, y) in f.rows().iter().enumerate() {
                if let Some(y) = y {
                    assert_eq!(original_output(p.apply(x as u64), outputs), *y);
                }
            }
        }
    }
}

#[test]
fn embedding_is_minimal() {
    // Every input maps to the same output: 2^n collisions.
    let f = BooleanFunction::from_fn(3, 1, |_| Some(1)).unwrap();
    assert_eq!(calculate_additional_lines(&f), 3);

    // AND: output 0 occurs three times.
    let f = BooleanFunction::from_fn(2, 1, |x| Some((x == 3) as u64)).unwrap();
    let embedding = embed(EmbedSource::Table(&f), &EmbedSettings::default()).unwrap();
    assert_eq!(embedding.additional_lines, 2);
    assert_eq!(embedding.lines, 3);

    // A permutation needs nothing.
    let f = BooleanFunction::from_permutation(&Permutation::new(2, vec![3, 1, 0, 2]).unwrap());
    assert_eq!(calculate_additional_lines(&f), 0);
}

#[test]
fn embedding_is_idempotent() {
    let mut rng = XorShift(99);
    let p = rng.permutation(3);
    let f = BooleanFunction::from_permutation(&p);
    let embedding = embed(EmbedSource::Table(&f), &EmbedSettings::default()).unwrap();
    assert_eq!(embedding.additional_lines, 0);
    assert_eq!(embedding.permutation.as_ref(), Some(&p));

    let f = random_function(&mut rng, 3, 1, false);
    let once = embed(EmbedSource::Table(&f), &EmbedSettings::default()).unwrap();
    let embedded = BooleanFunction::from_permutation(once.permutation.as_ref().unwrap());
    let twice = embed(EmbedSource::Table(&embedded), &EmbedSettings::default()).unwrap();
    assert_eq!(twice.additional_lines, 0);
    assert_eq!(twice.lines, once.lines);
    assert_eq!(twice.permutation, once.permutation);
}

#[test]
fn embedding_sources_agree() {
    let mut rng = XorShift(1234);
    for (inputs, outputs) in [(2, 1), (3, 2), (3, 3), (4, 1)] {
        let f = random_function(&mut rng, inputs, outputs, true);
        let bdd = Bdd::default();
        let g = BddFunction::from_function(&bdd, &f, 1);

        let table = embed(EmbedSource::Table(&f), &EmbedSettings::default()).unwrap();
        let symbolic = embed(EmbedSource::Bdd(&bdd, &g), &EmbedSettings::default()).unwrap();
        let lines_only = embed(EmbedSource::Bdd(&bdd, &g), &EmbedSettings { only_lines: true }).unwrap();

        assert_eq!(symbolic.additional_lines, table.additional_lines);
        assert_eq!(symbolic.permutation, table.permutation);
        assert_eq!(lines_only.lines, table.lines);
        assert!(lines_only.permutation.is_none());
    }
}

#[test]
fn embed_then_synthesize() {
    // Full adder: (a, b, c) -> (sum, carry)
    let f = BooleanFunction::from_fn(3, 2, |x| {
        let ones = x.count_ones() as u64;
        Some((ones & 1) | ((ones >> 1) << 1))
    })
    .unwrap();
    let embedding = embed(EmbedSource::Table(&f), &EmbedSettings::default()).unwrap();
    assert_eq!(embedding.lines, 4);

    let p = embedding.permutation.clone().unwrap();
    let template = Some(embedding.circuit_template().unwrap());

    let settings = TbsSettings {
        template: template.clone(),
        ..Default::default()
    };
    let (explicit, _) = transformation_based_synthesis(&p, &settings).unwrap();

    let bdd = Bdd::default();
    let rcbdd = Rcbdd::from_permutation(&bdd, &p).unwrap();
    let settings = SymbolicTbsSettings {
        template: template.clone(),
        ..Default::default()
    };
    let (symbolic, _) = symbolic_transformation_based_synthesis(&rcbdd, &settings).unwrap();

    let settings = SatTbsSettings {
        template: template.clone(),
        ..Default::default()
    };
    let (sat, _) = symbolic_transformation_based_synthesis_sat(SatInput::Relation(&rcbdd), &settings).unwrap();

    for circuit in [&explicit, &symbolic, &sat] {
        assert_eq!(circuit.constants(), &[None, None, None, Some(false)]);
        assert_eq!(circuit.garbage(), &[false, false, true, true]);
        for x in 0..8 {
            assert_eq!(original_output(circuit.simulate(x), 2), f.output(x).unwrap());
        }
    }
}

// ─── Exact Synthesis ───────────────────────────────────────────────────────────

#[test]
fn exact_is_minimal() {
    for p in all_permutations(2) {
        let solution = quantified_exact_synthesis(&p, &ExactSettings::default())
            .unwrap()
            .into_solution()
            .unwrap();
        let depth = solution.circuit.num_gates();
        assert!(solution.circuit.realizes(&p), "{}", p);
        assert_eq!(solution.statistics.depth, depth);

        let (tbs, _) = transformation_based_synthesis(&p, &TbsSettings::default()).unwrap();
        assert!(depth <= tbs.num_gates(), "{}", p);

        if depth > 0 {
            let settings = ExactSettings {
                max_depth: depth - 1,
                ..Default::default()
            };
            let outcome = quantified_exact_synthesis(&p, &settings).unwrap();
            assert!(matches!(outcome, ExactOutcome::NotFound { .. }), "{}", p);
        }
    }
}

#[test]
fn exact_all_solutions() {
    let tables = [vec![0, 2, 1, 3], vec![1, 2, 3, 0], vec![0, 1, 2, 3, 4, 5, 7, 6]];
    for table in tables {
        let lines = table.len().trailing_zeros() as usize;
        let p = Permutation::new(lines, table).unwrap();
        for negative in [false, true] {
            let settings = ExactSettings {
                negative,
                all_solutions: true,
                ..Default::default()
            };
            let solution = quantified_exact_synthesis(&p, &settings).unwrap().into_solution().unwrap();
            let solutions = solution.solutions.unwrap();

            assert_eq!(BigUint::from(solutions.len()), solution.num_circuits);
            assert!(solutions.contains(&solution.circuit));
            for (i, circuit) in solutions.iter().enumerate() {
                assert!(circuit.realizes(&p), "{}", p);
                assert_eq!(circuit.num_gates(), solution.statistics.depth);
                assert!(!solutions[..i].contains(circuit));
            }
        }
    }
}

#[test]
fn exact_swap() {
    let p = Permutation::new(2, vec![0, 2, 1, 3]).unwrap();
    let solution = quantified_exact_synthesis(&p, &ExactSettings::default())
        .unwrap()
        .into_solution()
        .unwrap();
    assert_eq!(solution.statistics.depth, 3);
    assert!(solution.circuit.gates().iter().all(Gate::is_toffoli));

    // A single Fredkin gate is found by TBS with Fredkin gates enabled.
    let settings = TbsSettings {
        fredkin: true,
        ..Default::default()
    };
    let (circuit, _) = transformation_based_synthesis(&p, &settings).unwrap();
    assert_eq!(circuit.gates(), &[Gate::fredkin([], 0, 1).unwrap()]);
}
