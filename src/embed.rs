//! Embedding of irreversible functions into permutations.
//!
//! A function with `n` inputs and `m` outputs whose most frequent output
//! pattern occurs `μ` times needs `⌈log2 μ⌉` additional output lines to tell
//! the colliding inputs apart. The embedding has `max(n, m + additional)`
//! lines: inputs beyond `n` are constant 0, outputs beyond `m` are garbage.

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, info};
use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::function::{BddFunction, BooleanFunction};
use crate::permutation::{Permutation, MAX_LINES};
use crate::stats::EmbedStatistics;
use crate::utils::bits_for;

#[derive(Debug, Clone, Default)]
pub struct EmbedSettings {
    /// Only compute the number of lines, do not build the permutation.
    pub only_lines: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum EmbedSource<'a> {
    Table(&'a BooleanFunction),
    Bdd(&'a Bdd, &'a BddFunction),
}

impl EmbedSource<'_> {
    fn num_inputs(&self) -> usize {
        match self {
            EmbedSource::Table(f) => f.num_inputs(),
            EmbedSource::Bdd(_, f) => f.num_inputs(),
        }
    }

    fn num_outputs(&self) -> usize {
        match self {
            EmbedSource::Table(f) => f.num_outputs(),
            EmbedSource::Bdd(_, f) => f.num_outputs(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Embedding {
    pub inputs: usize,
    pub outputs: usize,
    pub additional_lines: usize,
    pub lines: usize,
    /// `None` when only the line count was requested.
    pub permutation: Option<Permutation>,
    pub statistics: EmbedStatistics,
}

impl Embedding {
    /// An empty circuit on the embedding's lines with constant inputs and
    /// garbage outputs marked.
    pub fn circuit_template(&self) -> Result<Circuit> {
        let mut circuit = Circuit::new(self.lines);
        circuit.set_constants(
            (0..self.lines)
                .map(|i| if i < self.inputs { None } else { Some(false) })
                .collect(),
        )?;
        circuit.set_garbage((0..self.lines).map(|i| i >= self.outputs).collect())?;
        Ok(circuit)
    }
}

/// Additional lines needed to embed `function`.
pub fn calculate_additional_lines(function: &BooleanFunction) -> usize {
    let mut multiplicity: HashMap<u64, usize> = HashMap::new();
    for y in function.rows().iter().flatten() {
        *multiplicity.entry(*y).or_default() += 1;
    }
    let mu = multiplicity.values().copied().max().unwrap_or(0);
    debug!("max output multiplicity: {}", mu);
    bits_for(mu)
}

/// Additional lines needed to embed `function`, computed on the BDDs.
///
/// The outputs must depend on the input variables only.
pub fn calculate_additional_lines_bdd(bdd: &Bdd, function: &BddFunction) -> usize {
    let first_free = function
        .outputs
        .iter()
        .chain([&function.care])
        .flat_map(|&f| bdd.support(f))
        .chain(function.inputs.iter().copied())
        .max()
        .unwrap_or(0)
        + 1;
    let y_vars: Vec<u32> = (0..function.num_outputs() as u32).map(|j| first_free + j).collect();

    // χ(x, y) = care(x) ∧ ∧_j (y_j ≡ f_j(x))
    let chi = bdd.apply_and(
        function.care,
        bdd.apply_and_many(
            function
                .outputs
                .iter()
                .zip(&y_vars)
                .map(|(&f, &y)| bdd.apply_eq(bdd.mk_var(y), f)),
        ),
    );
    let image = bdd.exists(chi, &function.inputs);

    let mut mu = BigUint::ZERO;
    for pattern in bdd.all_sat(image, &y_vars) {
        let values = y_vars.iter().copied().zip(pattern).collect();
        let preimage = bdd.restrict(chi, &values);
        let count = bdd.sat_count_over(preimage, &function.inputs);
        if count > mu {
            mu = count;
        }
    }
    debug!("max output multiplicity: {}", mu);

    if mu <= BigUint::from(1u32) {
        0
    } else {
        (mu - 1u32).bits() as usize
    }
}

/// Embed `source` into a reversible function.
pub fn embed(source: EmbedSource<'_>, settings: &EmbedSettings) -> Result<Embedding> {
    let start = Instant::now();

    let materialized;
    let table = match source {
        EmbedSource::Table(f) => Some(f),
        EmbedSource::Bdd(bdd, f) if !settings.only_lines => {
            materialized = f.to_boolean_function(bdd)?;
            Some(&materialized)
        }
        EmbedSource::Bdd(..) => None,
    };

    let inputs = source.num_inputs();
    let outputs = source.num_outputs();
    let additional_lines = match (table, source) {
        (None, EmbedSource::Bdd(bdd, f)) => calculate_additional_lines_bdd(bdd, f),
        (Some(f), _) | (None, EmbedSource::Table(f)) => calculate_additional_lines(f),
    };
    let lines = inputs.max(outputs + additional_lines);
    info!(
        "embedding {} inputs and {} outputs into {} lines ({} additional)",
        inputs, outputs, lines, additional_lines
    );

    let permutation = match table {
        Some(f) if !settings.only_lines => {
            if lines > MAX_LINES {
                return Err(Error::Capacity {
                    required: lines,
                    limit: MAX_LINES,
                });
            }
            Some(Permutation::new(lines, embed_table(f, lines))?)
        }
        _ => None,
    };

    Ok(Embedding {
        inputs,
        outputs,
        additional_lines,
        lines,
        permutation,
        statistics: EmbedStatistics {
            runtime: start.elapsed(),
        },
    })
}

fn embed_table(function: &BooleanFunction, lines: usize) -> Vec<u64> {
    let m = function.num_outputs();
    let size = 1usize << lines;
    let mut table: Vec<Option<u64>> = vec![None; size];
    let mut used = vec![false; size];
    let mut suffix: HashMap<u64, u64> = HashMap::new();

    for (x, y) in function.rows().iter().enumerate() {
        let Some(y) = *y else { continue };
        let next = suffix.entry(y).or_default();
        let out = y | (*next << m);
        *next += 1;
        table[x] = Some(out);
        used[out as usize] = true;
    }

    let mut free = used.iter().enumerate().filter(|(_, &u)| !u).map(|(y, _)| y as u64);
    table
        .into_iter()
        .map(|out| out.or_else(|| free.next()).unwrap_or_default())
        .collect()
}

/// Original outputs of an embedded output word.
pub fn original_output(y: u64, outputs: usize) -> u64 {
    y & ((1 << outputs) - 1)
}
