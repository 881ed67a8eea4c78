//! And-Inverter Graphs.

use std::collections::HashMap;

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::signal::Signal;

/// A structurally hashed AIG with primary inputs, two-input AND nodes and
/// primary outputs. Nodes are stored in topological order.
#[derive(Debug, Clone, Default)]
pub struct Aig {
    num_inputs: usize,
    nodes: Vec<[Signal; 2]>,
    outputs: Vec<Signal>,
    strash: HashMap<[Signal; 2], Signal>,
}

impl Aig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Fanins of AND node `node`.
    pub fn node(&self, node: u32) -> [Signal; 2] {
        self.nodes[node as usize]
    }

    pub fn nodes(&self) -> &[[Signal; 2]] {
        &self.nodes
    }

    pub fn outputs(&self) -> &[Signal] {
        &self.outputs
    }

    pub fn add_input(&mut self) -> Signal {
        let input = Signal::from_input(self.num_inputs as u32);
        self.num_inputs += 1;
        input
    }

    pub fn add_output(&mut self, output: Signal) {
        self.outputs.push(output);
    }

    pub fn and(&mut self, a: Signal, b: Signal) -> Signal {
        if a == Signal::zero() || b == Signal::zero() || a == !b {
            return Signal::zero();
        }
        if a == Signal::one() || a == b {
            return b;
        }
        if b == Signal::one() {
            return a;
        }

        let key = if a < b { [a, b] } else { [b, a] };
        if let Some(&signal) = self.strash.get(&key) {
            return signal;
        }
        let signal = Signal::from_node(self.nodes.len() as u32);
        self.nodes.push(key);
        self.strash.insert(key, signal);
        signal
    }

    pub fn or(&mut self, a: Signal, b: Signal) -> Signal {
        !self.and(!a, !b)
    }

    pub fn xor(&mut self, a: Signal, b: Signal) -> Signal {
        let left = self.and(a, !b);
        let right = self.and(!a, b);
        self.or(left, right)
    }

    /// `s ? t : e`
    pub fn mux(&mut self, s: Signal, t: Signal, e: Signal) -> Signal {
        let left = self.and(s, t);
        let right = self.and(!s, e);
        self.or(left, right)
    }

    /// Evaluate every output on input pattern `word` (bit `i` is input `i`).
    pub fn simulate(&self, word: u64) -> u64 {
        let mut values = Vec::with_capacity(self.nodes.len());
        let value = |signal: Signal, values: &[bool]| {
            let v = if signal.is_const() {
                false
            } else if signal.is_input() {
                (word >> signal.input()) & 1 == 1
            } else {
                values[signal.node() as usize]
            };
            v ^ signal.is_negated()
        };
        for &[a, b] in &self.nodes {
            let v = value(a, &values) && value(b, &values);
            values.push(v);
        }
        self.outputs
            .iter()
            .enumerate()
            .fold(0, |y, (j, &out)| if value(out, &values) { y | (1 << j) } else { y })
    }

    /// Build an AIG computing `functions`, one multiplexer per BDD node.
    ///
    /// `inputs[i]` is the BDD variable driven by primary input `i`.
    pub fn from_bdd(bdd: &Bdd, functions: &[Ref], inputs: &[u32]) -> Self {
        let mut aig = Aig::new();
        let signals: HashMap<u32, Signal> = inputs.iter().map(|&v| (v, aig.add_input())).collect();
        let mut cache = HashMap::new();
        for &f in functions {
            let out = aig.mux_tree(bdd, f, &signals, &mut cache);
            aig.add_output(out);
        }
        aig
    }

    fn mux_tree(&mut self, bdd: &Bdd, f: Ref, signals: &HashMap<u32, Signal>, cache: &mut HashMap<Ref, Signal>) -> Signal {
        if bdd.is_zero(f) {
            return Signal::zero();
        }
        if bdd.is_one(f) {
            return Signal::one();
        }
        if f.is_negated() {
            return !self.mux_tree(bdd, -f, signals, cache);
        }
        if let Some(&s) = cache.get(&f) {
            return s;
        }

        let v = bdd.variable(f);
        let s = signals[&v];
        let low = self.mux_tree(bdd, bdd.low_node(f), signals, cache);
        let high = self.mux_tree(bdd, bdd.high_node(f), signals, cache);
        let res = self.mux(s, high, low);
        cache.insert(f, res);
        res
    }

    /// BDDs of every output; primary input `i` is BDD variable `inputs[i]`.
    pub fn to_bdd(&self, bdd: &Bdd, inputs: &[u32]) -> Vec<Ref> {
        assert_eq!(inputs.len(), self.num_inputs);
        let mut nodes: Vec<Ref> = Vec::with_capacity(self.nodes.len());
        let encode = |signal: Signal, nodes: &[Ref]| {
            let f = if signal.is_const() {
                bdd.zero
            } else if signal.is_input() {
                bdd.mk_var(inputs[signal.input() as usize])
            } else {
                nodes[signal.node() as usize]
            };
            if signal.is_negated() {
                -f
            } else {
                f
            }
        };
        for &[a, b] in &self.nodes {
            let f = bdd.apply_and(encode(a, &nodes), encode(b, &nodes));
            nodes.push(f);
        }
        self.outputs.iter().map(|&out| encode(out, &nodes)).collect()
    }
}
