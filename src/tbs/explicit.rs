use log::debug;

use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::permutation::Permutation;
use crate::stats::TbsStatistics;
use crate::tbs::{choose_gate, run, Side, Step, TransformationStrategy};

#[derive(Debug, Clone, Default)]
pub struct TbsSettings {
    /// Also consider gates on the input side, per row whichever is closer.
    pub bidirectional: bool,
    /// Emit a single Fredkin gate for rows whose image is a two-bit swap.
    pub fredkin: bool,
    /// Fold each emitted gate into an earlier one on its side where possible,
    /// and merge Toffoli triples into Fredkin gates. Requires `fredkin`.
    pub fredkin_lookback: bool,
    /// Circuit whose line names, constants and garbage flags are copied onto
    /// the result, e.g. [`Embedding::circuit_template`](crate::embed::Embedding::circuit_template).
    pub template: Option<Circuit>,
}

impl TbsSettings {
    pub fn validate(&self) -> Result<()> {
        if self.fredkin_lookback && !self.fredkin {
            return Err(Error::Configuration(
                "fredkin_lookback requires fredkin".to_string(),
            ));
        }
        Ok(())
    }
}

/// Truth-table TBS, optionally bidirectional.
struct ExplicitStrategy {
    lines: usize,
    table: Vec<u64>,
    inverse: Vec<u64>,
    settings: TbsSettings,
    row: u64,
    side: Option<Side>,
}

impl ExplicitStrategy {
    fn new(permutation: &Permutation, settings: &TbsSettings) -> Self {
        Self {
            lines: permutation.num_lines(),
            table: permutation.table().to_vec(),
            inverse: permutation.inverse().table().to_vec(),
            settings: settings.clone(),
            row: 0,
            side: None,
        }
    }

    fn rebuild_inverse(&mut self) {
        for (x, &y) in self.table.iter().enumerate() {
            self.inverse[y as usize] = x as u64;
        }
    }
}

impl TransformationStrategy for ExplicitStrategy {
    fn lines(&self) -> usize {
        self.lines
    }

    fn next_step(&mut self) -> Result<Option<Step>> {
        let size = self.table.len() as u64;
        while self.row < size && self.table[self.row as usize] == self.row {
            self.row += 1;
            self.side = None;
        }
        if self.row == size {
            return Ok(None);
        }

        let x = self.row;
        let y = self.table[x as usize];
        let preimage = self.inverse[x as usize];

        // The side is fixed once per row.
        let side = *self.side.get_or_insert_with(|| {
            let side = if self.settings.bidirectional && (x ^ preimage).count_ones() < (x ^ y).count_ones() {
                Side::Input
            } else {
                Side::Output
            };
            debug!("row {:#x}: image {:#x}, preimage {:#x}, {:?} side", x, y, preimage, side);
            side
        });

        let gate = match side {
            Side::Output => {
                let gate = choose_gate(x, y, self.settings.fredkin);
                for out in self.table.iter_mut() {
                    *out = gate.apply(*out);
                }
                gate
            }
            Side::Input => {
                let gate = choose_gate(x, preimage, self.settings.fredkin);
                let table = &self.table;
                self.table = (0..size).map(|z| table[gate.apply(z) as usize]).collect();
                gate
            }
        };
        self.rebuild_inverse();

        Ok(Some(Step { side, row: x, gate }))
    }

    fn fredkin_lookback(&self) -> bool {
        self.settings.fredkin_lookback
    }

    fn template(&self) -> Option<&Circuit> {
        self.settings.template.as_ref()
    }
}

/// Synthesize a circuit for `permutation` by transforming its truth table.
pub fn transformation_based_synthesis(
    permutation: &Permutation,
    settings: &TbsSettings,
) -> Result<(Circuit, TbsStatistics)> {
    settings.validate()?;
    let mut strategy = ExplicitStrategy::new(permutation, settings);
    run(&mut strategy)
}
