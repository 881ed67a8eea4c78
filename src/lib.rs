//! # revsynth: Reversible Logic Synthesis with BDDs and SAT
//!
//! **`revsynth`** turns Boolean functions into reversible circuits made of
//! multiple-controlled Toffoli and Fredkin gates.
//!
//! ## Pipeline
//!
//! 1. **Embedding**: an irreversible function `f: B^n -> B^m` is extended with
//!    additional lines and constant inputs into a permutation of `B^l`
//!    (see [`embed`]).
//! 2. **Synthesis**: the permutation is turned into a circuit.
//!    - [`tbs`] implements transformation-based synthesis on three
//!      representations: an explicit truth table, a characteristic BDD
//!      ([`Rcbdd`][crate::rcbdd::Rcbdd]) and a SAT encoding.
//!    - [`exact`] finds circuits with the fewest gates by quantifying over
//!      symbolic gate descriptors.
//!
//! All symbolic work goes through a single [`Bdd`][crate::bdd::Bdd] manager
//! with complement edges. SAT queries go through the
//! [`SatSolver`][crate::solver::SatSolver] trait, backed by `varisat`.
//!
//! ## Basic Usage
//!
//! ```rust
//! use revsynth::permutation::Permutation;
//! use revsynth::tbs::{transformation_based_synthesis, TbsSettings};
//!
//! // Swap the patterns 01 and 11.
//! let p = Permutation::new(2, vec![0, 3, 2, 1]).unwrap();
//!
//! let (circuit, stats) = transformation_based_synthesis(&p, &TbsSettings::default()).unwrap();
//! assert_eq!(circuit.num_gates(), 1);
//! assert!(circuit.realizes(&p));
//! println!("{}", stats);
//! ```
//!
//! ## Core Components
//!
//! - **[`bdd`]**: The BDD manager and its core algorithms.
//! - **[`circuit`]**, **[`gate`]**: Reversible circuits and their gates.
//! - **[`embed`]**: Embedding of irreversible functions.
//! - **[`tbs`]**: Transformation-based synthesis.
//! - **[`exact`]**: Exact synthesis.
//! - **[`cnf`]**, **[`solver`]**: CNF encodings and the SAT backend.

pub mod aig;
pub mod bdd;
pub mod cache;
pub mod circuit;
pub mod cnf;
pub mod embed;
pub mod error;
pub mod exact;
pub mod function;
pub mod gate;
pub mod permutation;
pub mod quant;
pub mod rcbdd;
pub mod reference;
pub mod sat;
pub mod signal;
pub mod solver;
pub mod stats;
pub mod table;
pub mod tbs;
pub mod utils;

pub use crate::error::{Error, Result};
