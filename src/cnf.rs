//! Tseitin encoding of BDDs, AIGs and reversible gates into a [`SatSolver`].

use std::collections::HashMap;

use crate::aig::Aig;
use crate::bdd::Bdd;
use crate::gate::Gate;
use crate::reference::Ref;
use crate::solver::SatSolver;

/// Clause builder on top of a solver, with a fixed `true` literal for constants.
pub struct Cnf<S> {
    solver: S,
    top: i32,
}

impl<S: SatSolver> Cnf<S> {
    pub fn new(mut solver: S) -> Self {
        let top = solver.new_var();
        solver.add_clause(&[top]);
        Self { solver, top }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn bottom(&self) -> i32 {
        -self.top
    }

    pub fn constant(&self, value: bool) -> i32 {
        if value {
            self.top
        } else {
            self.bottom()
        }
    }

    pub fn new_var(&mut self) -> i32 {
        self.solver.new_var()
    }

    pub fn add_clause(&mut self, clause: &[i32]) {
        self.solver.add_clause(clause);
    }

    // Original: X := and(A, B)
    // Tseitin: (-A | -B | +X) &
    //          (+A | -X) &
    //          (+B | -X)
    pub fn and(&mut self, a: i32, b: i32) -> i32 {
        if a == self.bottom() || b == self.bottom() || a == -b {
            return self.bottom();
        }
        if a == self.top || a == b {
            return b;
        }
        if b == self.top {
            return a;
        }
        let x = self.new_var();
        self.add_clause(&[-a, -b, x]);
        self.add_clause(&[a, -x]);
        self.add_clause(&[b, -x]);
        x
    }

    pub fn or(&mut self, a: i32, b: i32) -> i32 {
        -self.and(-a, -b)
    }

    // Original: X := xor(A, B)
    // Tseitin: (+A | +B | -X) &
    //          (+A | -B | +X) &
    //          (-A | +B | +X) &
    //          (-A | -B | -X)
    pub fn xor(&mut self, a: i32, b: i32) -> i32 {
        if a == self.bottom() {
            return b;
        }
        if b == self.bottom() {
            return a;
        }
        if a == self.top {
            return -b;
        }
        if b == self.top {
            return -a;
        }
        if a == b {
            return self.bottom();
        }
        if a == -b {
            return self.top;
        }
        let x = self.new_var();
        self.add_clause(&[a, b, -x]);
        self.add_clause(&[a, -b, x]);
        self.add_clause(&[-a, b, x]);
        self.add_clause(&[-a, -b, -x]);
        x
    }

    // Original: X := ite(C, T, E)
    // Tseitin: (-C | -T | +X) &
    //          (-C | +T | -X) &
    //          (+C | -E | +X) &
    //          (+C | +E | -X) &
    //          (-T | -E | +X) &
    //          (+T | +E | -X)
    pub fn ite(&mut self, c: i32, t: i32, e: i32) -> i32 {
        if c == self.top || t == e {
            return t;
        }
        if c == self.bottom() {
            return e;
        }
        if t == self.top && e == self.bottom() {
            return c;
        }
        if t == self.bottom() && e == self.top {
            return -c;
        }
        let x = self.new_var();
        self.add_clause(&[-c, -t, x]);
        self.add_clause(&[-c, t, -x]);
        self.add_clause(&[c, -e, x]);
        self.add_clause(&[c, e, -x]);
        self.add_clause(&[-t, -e, x]);
        self.add_clause(&[t, e, -x]);
        x
    }

    pub fn and_many(&mut self, lits: &[i32]) -> i32 {
        lits.iter().fold(self.top, |acc, &l| self.and(acc, l))
    }

    /// Fresh literal `X` with `X <-> (L1 | ... | Ln)`.
    pub fn or_many(&mut self, lits: &[i32]) -> i32 {
        if lits.iter().any(|&l| l == self.top) {
            return self.top;
        }
        let lits: Vec<i32> = lits.iter().copied().filter(|&l| l != self.bottom()).collect();
        match lits.as_slice() {
            [] => return self.bottom(),
            [l] => return *l,
            _ => {}
        }
        let x = self.new_var();
        let mut clause = lits.clone();
        clause.push(-x);
        self.add_clause(&clause);
        for &l in &lits {
            self.add_clause(&[-l, x]);
        }
        x
    }

    /// Literal of BDD `f`, one `ite` per node. `vars` maps BDD variables to literals.
    pub fn encode_bdd(&mut self, bdd: &Bdd, f: Ref, vars: &HashMap<u32, i32>) -> i32 {
        let mut cache = HashMap::new();
        self.encode_bdd_(bdd, f, vars, &mut cache)
    }

    fn encode_bdd_(&mut self, bdd: &Bdd, f: Ref, vars: &HashMap<u32, i32>, cache: &mut HashMap<Ref, i32>) -> i32 {
        if bdd.is_zero(f) {
            return self.bottom();
        }
        if bdd.is_one(f) {
            return self.top;
        }
        if f.is_negated() {
            return -self.encode_bdd_(bdd, -f, vars, cache);
        }
        if let Some(&lit) = cache.get(&f) {
            return lit;
        }

        let c = vars[&bdd.variable(f)];
        let low = self.encode_bdd_(bdd, bdd.low_node(f), vars, cache);
        let high = self.encode_bdd_(bdd, bdd.high_node(f), vars, cache);
        let lit = self.ite(c, high, low);
        cache.insert(f, lit);
        lit
    }

    /// Literals of every output of `aig` given literals of its inputs.
    pub fn encode_aig(&mut self, aig: &Aig, inputs: &[i32]) -> Vec<i32> {
        assert_eq!(inputs.len(), aig.num_inputs());
        let mut nodes: Vec<i32> = Vec::with_capacity(aig.num_nodes());
        let lit = |signal: crate::signal::Signal, nodes: &[i32], top: i32| {
            let l = if signal.is_const() {
                -top
            } else if signal.is_input() {
                inputs[signal.input() as usize]
            } else {
                nodes[signal.node() as usize]
            };
            if signal.is_negated() {
                -l
            } else {
                l
            }
        };
        for &[a, b] in aig.nodes() {
            let a = lit(a, &nodes, self.top);
            let b = lit(b, &nodes, self.top);
            let x = self.and(a, b);
            nodes.push(x);
        }
        aig.outputs()
            .iter()
            .map(|&out| lit(out, &nodes, self.top))
            .collect()
    }

    /// Next layer of line literals after applying `gate` to `layer`.
    pub fn encode_gate(&mut self, gate: &Gate, layer: &[i32]) -> Vec<i32> {
        let controls: Vec<i32> = gate
            .controls()
            .iter()
            .map(|c| if c.polarity { layer[c.line] } else { -layer[c.line] })
            .collect();
        let active = self.and_many(&controls);
        let mut next = layer.to_vec();
        match gate {
            Gate::Toffoli { target, .. } => {
                next[*target] = self.xor(layer[*target], active);
            }
            Gate::Fredkin { targets: [a, b], .. } => {
                next[*a] = self.ite(active, layer[*b], layer[*a]);
                next[*b] = self.ite(active, layer[*a], layer[*b]);
            }
        }
        next
    }

    /// Literal that is true iff the two words differ somewhere.
    pub fn encode_mismatch(&mut self, xs: &[i32], ys: &[i32]) -> i32 {
        assert_eq!(xs.len(), ys.len());
        let diffs: Vec<i32> = xs.iter().zip(ys).map(|(&x, &y)| self.xor(x, y)).collect();
        self.or_many(&diffs)
    }
}
