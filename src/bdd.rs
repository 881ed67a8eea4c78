//! The BDD manager.
//!
//! All nodes live in a single hash-consed [`Table`], referenced through
//! complemented [`Ref`] handles. Variables are 1-indexed and the variable
//! index doubles as its level: smaller indices are closer to the root.
//! There is no reordering and no garbage collection, since every synthesis
//! call owns a short-lived manager.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use log::debug;

use crate::cache::Cache;
use crate::reference::Ref;
use crate::table::Table;
use crate::utils::{pairing3, MyHash};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Node {
    variable: u32,
    low: Ref,
    high: Ref,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            variable: 0,
            low: Ref::positive(0),
            high: Ref::positive(0),
        }
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        pairing3(self.variable as u64, self.low.unsigned(), self.high.unsigned())
    }
}

#[derive(Debug, Eq, PartialEq, Clone)]
struct IteKey(Ref, Ref, Ref);

impl MyHash for IteKey {
    fn hash(&self) -> u64 {
        pairing3(self.0.unsigned(), self.1.unsigned(), self.2.unsigned())
    }
}

pub struct Bdd {
    storage: RefCell<Table<Node>>,
    cache: RefCell<Cache<IteKey, Ref>>,
    pub zero: Ref,
    pub one: Ref,
}

impl Bdd {
    pub fn new(storage_bits: usize) -> Self {
        assert!(
            storage_bits <= 30,
            "Storage bits should be in the range 0..=30"
        );

        let cache_bits = storage_bits.clamp(10, 20);

        let mut storage = Table::new(storage_bits);

        // Allocate the terminal node:
        let one = storage.put(Node::default());
        assert_eq!(one, 1); // Make sure the terminal node is (1).
        let one = Ref::positive(one as u32);
        let zero = -one;

        Self {
            storage: RefCell::new(storage),
            cache: RefCell::new(Cache::new(cache_bits)),
            zero,
            one,
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new(16)
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.borrow();
        let cache = self.cache.borrow();
        f.debug_struct("Bdd")
            .field("size", &storage.size())
            .field("buckets", &storage.num_buckets())
            .field("cache_hits", &cache.hits())
            .field("cache_misses", &cache.misses())
            .finish()
    }
}

impl Bdd {
    /// Number of allocated nodes (terminal included).
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().size()
    }

    /// Variable labelling the node, or 0 for the terminal.
    pub fn variable(&self, node: Ref) -> u32 {
        self.storage.borrow().value(node.index()).variable
    }

    /// Position of the node in the ordering; terminals sit below every variable.
    fn level(&self, node: Ref) -> u32 {
        if self.is_terminal(node) {
            u32::MAX
        } else {
            self.variable(node)
        }
    }

    pub fn low_node(&self, node: Ref) -> Ref {
        let low = self.storage.borrow().value(node.index()).low;
        if node.is_negated() {
            -low
        } else {
            low
        }
    }

    pub fn high_node(&self, node: Ref) -> Ref {
        let high = self.storage.borrow().value(node.index()).high;
        if node.is_negated() {
            -high
        } else {
            high
        }
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == self.zero
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == self.one
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        node.index() == self.one.index()
    }

    pub fn mk_node(&self, v: u32, low: Ref, high: Ref) -> Ref {
        assert_ne!(v, 0, "Variable index should not be zero");

        // Handle canonicity
        if high.is_negated() {
            return -self.mk_node(v, -low, -high);
        }

        // Handle duplicates
        if low == high {
            return low;
        }

        let i = self.storage.borrow_mut().put(Node {
            variable: v,
            low,
            high,
        });
        Ref::positive(i as u32)
    }

    pub fn mk_var(&self, v: u32) -> Ref {
        assert_ne!(v, 0, "Variable index should not be zero");
        self.mk_node(v, self.zero, self.one)
    }

    /// Variable `v` if `polarity` is set, its negation otherwise.
    pub fn mk_literal(&self, v: u32, polarity: bool) -> Ref {
        let x = self.mk_var(v);
        if polarity {
            x
        } else {
            -x
        }
    }

    /// Conjunction of DIMACS-style literals.
    pub fn cube(&self, literals: impl IntoIterator<Item = i32>) -> Ref {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_by_key(|&v| std::cmp::Reverse(v.unsigned_abs()));
        let mut current = self.one;
        for lit in literals {
            assert_ne!(lit, 0, "Variable index should not be zero");
            current = if lit < 0 {
                self.mk_node(lit.unsigned_abs(), current, self.zero)
            } else {
                self.mk_node(lit as u32, self.zero, current)
            };
        }
        current
    }

    /// Conjunction of `vars[i] == bits[i]`.
    pub fn cube_from_bits(&self, vars: &[u32], bits: &[bool]) -> Ref {
        assert_eq!(vars.len(), bits.len());
        self.cube(
            vars.iter()
                .zip(bits)
                .map(|(&v, &b)| if b { v as i32 } else { -(v as i32) }),
        )
    }

    pub fn top_cofactors(&self, node: Ref, v: u32) -> (Ref, Ref) {
        assert_ne!(v, 0, "Variable index should not be zero");

        if self.is_terminal(node) || v < self.variable(node) {
            return (node, node);
        }
        assert_eq!(v, self.variable(node));
        (self.low_node(node), self.high_node(node))
    }

    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ITE(x, y, z) = (x ∧ y) ∨ (¬x ∧ z)
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use revsynth::bdd::Bdd;
    ///
    /// let bdd = Bdd::default();
    /// let x = bdd.mk_var(1);
    /// let y = bdd.mk_var(2);
    /// let z = bdd.mk_var(3);
    /// let f = bdd.apply_ite(x, y, z);
    /// let x_and_y = bdd.apply_and(x, y);
    /// let not_x_and_z = bdd.apply_and(-x, z);
    /// assert_eq!(f, bdd.apply_or(x_and_y, not_x_and_z));
    /// ```
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        if self.is_one(f) {
            return g;
        }
        if self.is_zero(f) {
            return h;
        }

        // More base cases:
        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,~F) => ite(F,G,1)
        let g = if g == f {
            self.one
        } else if g == -f {
            self.zero
        } else {
            g
        };
        let h = if h == f {
            self.zero
        } else if h == -f {
            self.one
        } else {
            h
        };
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }

        // ite(~F,G,H) => ite(F,H,G)
        let (f, g, h) = if f.is_negated() { (-f, h, g) } else { (f, g, h) };

        // ite(F,~G,H) => ~ite(F,G,~H)
        let (g, h, n) = if g.is_negated() {
            (-g, -h, true)
        } else {
            (g, h, false)
        };

        let key = IteKey(f, g, h);
        if let Some(&res) = self.cache.borrow().get(&key) {
            return if n { -res } else { res };
        }

        // Determine the top variable:
        let m = self.level(f).min(self.level(g)).min(self.level(h));
        assert_ne!(m, u32::MAX);

        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let e = self.apply_ite(f0, g0, h0);
        let t = self.apply_ite(f1, g1, h1);

        let res = self.mk_node(m, e, t);
        self.cache.borrow_mut().insert(key, res);

        if n {
            -res
        } else {
            res
        }
    }

    pub fn apply_not(&self, f: Ref) -> Ref {
        -f
    }

    pub fn apply_and(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.zero)
    }

    pub fn apply_or(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, self.one, v)
    }

    pub fn apply_xor(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, -v, v)
    }

    pub fn apply_eq(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, -v)
    }

    pub fn apply_imply(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.one)
    }

    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.one;
        for node in nodes {
            res = self.apply_and(res, node);
            if self.is_zero(res) {
                break;
            }
        }
        res
    }

    pub fn apply_or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.zero;
        for node in nodes {
            res = self.apply_or(res, node);
            if self.is_one(res) {
                break;
            }
        }
        res
    }

    /// Cofactor `f` with respect to the given partial assignment.
    pub fn restrict(&self, f: Ref, values: &HashMap<u32, bool>) -> Ref {
        let mut cache = HashMap::new();
        self.restrict_(f, values, &mut cache)
    }

    fn restrict_(&self, f: Ref, values: &HashMap<u32, bool>, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) || values.is_empty() {
            return f;
        }

        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let i = self.variable(f);
        let res = match values.get(&i) {
            Some(true) => self.restrict_(self.high_node(f), values, cache),
            Some(false) => self.restrict_(self.low_node(f), values, cache),
            None => {
                let low = self.restrict_(self.low_node(f), values, cache);
                let high = self.restrict_(self.high_node(f), values, cache);
                self.mk_node(i, low, high)
            }
        };
        cache.insert(f, res);
        res
    }

    /// Simultaneous substitution `f[v <- g_v]` for every `(v, g_v)` in `map`.
    pub fn vector_compose(&self, f: Ref, map: &HashMap<u32, Ref>) -> Ref {
        let mut cache = HashMap::new();
        self.vector_compose_(f, map, &mut cache)
    }

    fn vector_compose_(&self, f: Ref, map: &HashMap<u32, Ref>, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) {
            return f;
        }

        // Complemented references share the result of their regular node.
        if f.is_negated() {
            return -self.vector_compose_(-f, map, cache);
        }

        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let v = self.variable(f);
        let low = self.vector_compose_(self.low_node(f), map, cache);
        let high = self.vector_compose_(self.high_node(f), map, cache);
        let selector = match map.get(&v) {
            Some(&g) => g,
            None => self.mk_var(v),
        };
        let res = self.apply_ite(selector, high, low);
        cache.insert(f, res);
        res
    }

    /// Variables `f` depends on, in ascending order.
    pub fn support(&self, f: Ref) -> Vec<u32> {
        let mut vars = HashSet::new();
        for index in self.descendants([f]) {
            let v = self.storage.borrow().value(index).variable;
            if v != 0 {
                vars.insert(v);
            }
        }
        let mut vars: Vec<u32> = vars.into_iter().collect();
        vars.sort_unstable();
        vars
    }

    fn descendants(&self, nodes: impl IntoIterator<Item = Ref>) -> HashSet<usize> {
        let mut visited = HashSet::new();
        let mut stack: Vec<Ref> = nodes.into_iter().collect();

        while let Some(node) = stack.pop() {
            if visited.insert(node.index()) && !self.is_terminal(node) {
                stack.push(self.low_node(node));
                stack.push(self.high_node(node));
            }
        }

        visited
    }

    /// Number of nodes reachable from `f`, terminal included.
    pub fn size(&self, f: Ref) -> usize {
        let size = self.descendants([f]).len();
        debug!("size({}) = {}", f, size);
        size
    }
}
