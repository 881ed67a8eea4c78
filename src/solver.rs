//! Incremental SAT solving behind a small trait.
//!
//! Literals are DIMACS-style `i32`: variable `v > 0` is the literal `v`, its
//! negation is `-v`.

use log::debug;
use varisat::{ExtendFormula, Lit, Solver};

use crate::error::{Error, Result};

pub trait SatSolver {
    fn name(&self) -> &'static str;

    /// Allocate a fresh variable and return its positive literal.
    fn new_var(&mut self) -> i32;

    fn add_clause(&mut self, clause: &[i32]);

    /// Solve under `assumptions`. `Ok(true)` means satisfiable; the model is
    /// then available through [`SatSolver::value`] until the next call.
    fn solve_with(&mut self, assumptions: &[i32]) -> Result<bool>;

    /// Value of `lit` in the last model.
    fn value(&self, lit: i32) -> Option<bool>;

    fn num_vars(&self) -> usize;

    fn num_clauses(&self) -> usize;

    fn solve(&mut self) -> Result<bool> {
        self.solve_with(&[])
    }
}

pub struct VarisatSolver {
    solver: Solver<'static>,
    num_vars: usize,
    num_clauses: usize,
    num_calls: usize,
    model: Vec<bool>,
}

impl Default for VarisatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl VarisatSolver {
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            num_vars: 0,
            num_clauses: 0,
            num_calls: 0,
            model: Vec::new(),
        }
    }

    pub fn num_calls(&self) -> usize {
        self.num_calls
    }
}

fn to_lit(lit: i32) -> Lit {
    assert_ne!(lit, 0, "Literal should not be zero");
    Lit::from_dimacs(lit as isize)
}

impl SatSolver for VarisatSolver {
    fn name(&self) -> &'static str {
        "varisat"
    }

    fn new_var(&mut self) -> i32 {
        let var = self.solver.new_var();
        self.num_vars += 1;
        var.to_dimacs() as i32
    }

    fn add_clause(&mut self, clause: &[i32]) {
        let lits: Vec<Lit> = clause.iter().map(|&l| to_lit(l)).collect();
        self.solver.add_clause(&lits);
        self.num_clauses += 1;
    }

    fn solve_with(&mut self, assumptions: &[i32]) -> Result<bool> {
        let lits: Vec<Lit> = assumptions.iter().map(|&l| to_lit(l)).collect();
        self.solver.assume(&lits);
        self.num_calls += 1;
        let sat = self
            .solver
            .solve()
            .map_err(|e| Error::Solver(e.to_string()))?;
        self.model.clear();
        if sat {
            let model = self
                .solver
                .model()
                .ok_or_else(|| Error::Solver("satisfiable, but no model".to_string()))?;
            self.model.resize(self.num_vars, false);
            for lit in model {
                if let Some(slot) = self.model.get_mut(lit.var().index()) {
                    *slot = lit.is_positive();
                }
            }
        }
        debug!(
            "{} call #{} with {} assumptions: {}",
            self.name(),
            self.num_calls,
            assumptions.len(),
            if sat { "SAT" } else { "UNSAT" }
        );
        Ok(sat)
    }

    fn value(&self, lit: i32) -> Option<bool> {
        let index = lit.unsigned_abs() as usize - 1;
        self.model.get(index).map(|&v| v == (lit > 0))
    }

    fn num_vars(&self) -> usize {
        self.num_vars
    }

    fn num_clauses(&self) -> usize {
        self.num_clauses
    }
}
