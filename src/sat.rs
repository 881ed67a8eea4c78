use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::reference::Ref;

impl Bdd {
    /// Returns one satisfying path of the BDD as DIMACS-style literals, if any exists.
    ///
    /// Variables not on the path are left out (don't cares).
    pub fn one_sat(&self, node: Ref) -> Option<Vec<i32>> {
        if self.is_zero(node) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = node;

        // Walk down the BDD, always picking a satisfying branch
        while !self.is_one(current) {
            let var = self.variable(current) as i32;
            let high = self.high_node(current);
            let low = self.low_node(current);

            // Prefer high branch if satisfiable, otherwise take low
            if !self.is_zero(high) {
                path.push(var);
                current = high;
            } else {
                path.push(-var);
                current = low;
            }
        }

        Some(path)
    }

    /// Returns the smallest satisfying assignment of `vars`, if any.
    ///
    /// `false < true`, and `vars[0]` is the most significant position, so the
    /// result is lexicographically minimal whenever `vars` is sorted and `f`
    /// depends on nothing but `vars`. Variables outside `vars` encountered on the
    /// way are resolved low-first and not reported.
    pub fn pick_min(&self, f: Ref, vars: &[u32]) -> Option<Vec<bool>> {
        if self.is_zero(f) {
            return None;
        }

        let mut assignment = Vec::with_capacity(vars.len());
        let mut current = f;

        for &v in vars {
            while !self.is_terminal(current) && self.variable(current) < v {
                current = self.low_or_high(current);
            }
            if !self.is_terminal(current) && self.variable(current) == v {
                let low = self.low_node(current);
                if self.is_zero(low) {
                    assignment.push(true);
                    current = self.high_node(current);
                } else {
                    assignment.push(false);
                    current = low;
                }
            } else {
                assignment.push(false);
            }
        }

        Some(assignment)
    }

    fn low_or_high(&self, node: Ref) -> Ref {
        let low = self.low_node(node);
        if self.is_zero(low) {
            self.high_node(node)
        } else {
            low
        }
    }

    /// Enumerates every satisfying assignment of `vars`, don't cares expanded.
    ///
    /// Variables outside `vars` are existentially abstracted. Each assignment
    /// lists the values of `vars` in the given order, and assignments are
    /// produced in ascending order with `vars[0]` most significant.
    pub fn all_sat(&self, f: Ref, vars: &[u32]) -> Vec<Vec<bool>> {
        let mut sorted = vars.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let others: Vec<u32> = self
            .support(f)
            .into_iter()
            .filter(|v| sorted.binary_search(v).is_err())
            .collect();
        let f = self.exists(f, &others);

        let mut models = Vec::new();
        let mut current = Vec::with_capacity(sorted.len());
        self.all_sat_(f, &sorted, &mut current, &mut models);

        // Recursion follows the variable order; map back to the caller's order.
        let positions: Vec<usize> = vars
            .iter()
            .filter_map(|v| sorted.binary_search(v).ok())
            .collect();
        let mut result: Vec<Vec<bool>> = models
            .into_iter()
            .map(|model| positions.iter().map(|&i| model[i]).collect())
            .collect();
        result.sort_unstable();
        result
    }

    fn all_sat_(&self, f: Ref, vars: &[u32], current: &mut Vec<bool>, result: &mut Vec<Vec<bool>>) {
        if self.is_zero(f) {
            return;
        }
        let Some((&v, rest)) = vars.split_first() else {
            assert!(self.is_one(f));
            result.push(current.clone());
            return;
        };

        let (f0, f1) = self.top_cofactors(f, v);
        for (value, cofactor) in [(false, f0), (true, f1)] {
            current.push(value);
            self.all_sat_(cofactor, rest, current, result);
            current.pop();
        }
    }

    /// Number of satisfying assignments over variables `1..=num_vars`.
    pub fn sat_count(&self, node: Ref, num_vars: usize) -> BigUint {
        let mut cache = HashMap::new();
        let max = BigUint::from(1u32) << num_vars;
        self._sat_count(node, &max, &mut cache)
    }

    /// Number of satisfying assignments of `vars`.
    ///
    /// `f` must not depend on variables outside `vars`.
    pub fn sat_count_over(&self, f: Ref, vars: &[u32]) -> BigUint {
        let mut vars = vars.to_vec();
        vars.sort_unstable();
        vars.dedup();
        debug_assert!(self.support(f).iter().all(|v| vars.binary_search(v).is_ok()));
        let max_var = vars.last().copied().unwrap_or(0) as usize;
        self.sat_count(f, max_var) >> (max_var - vars.len())
    }

    fn _sat_count(&self, node: Ref, max: &BigUint, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::ZERO;
        } else if self.is_one(node) {
            return max.clone();
        }

        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        let low = self.low_node(node.regular());
        let high = self.high_node(node.regular());

        let count_low = self._sat_count(low, max, cache);
        let count_high = self._sat_count(high, max, cache);

        let count: BigUint = (count_low + count_high) >> 1;
        let count = if node.is_negated() { max - count } else { count };

        cache.insert(node, count.clone());
        count
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_one_sat() {
        let bdd = Bdd::default();

        let f = bdd.cube([1, -2, -3]);
        let model = bdd.one_sat(f);
        assert_eq!(model, Some(vec![1, -2, -3]));

        let g = bdd.apply_and(f, -bdd.cube(model.unwrap()));
        assert_eq!(bdd.one_sat(g), None);
    }

    #[test]
    fn test_pick_min() {
        let bdd = Bdd::default();

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);

        // x1 ∨ (x2 ∧ x3): smallest model is 011
        let f = bdd.apply_or(x1, bdd.apply_and(x2, x3));
        assert_eq!(bdd.pick_min(f, &[1, 2, 3]), Some(vec![false, true, true]));

        // Variables missing from the BDD are set to false.
        assert_eq!(bdd.pick_min(x3, &[1, 2, 3]), Some(vec![false, false, true]));
        assert_eq!(bdd.pick_min(bdd.one, &[1, 2]), Some(vec![false, false]));
        assert_eq!(bdd.pick_min(bdd.zero, &[1, 2]), None);
    }

    #[test]
    fn test_all_sat() {
        let bdd = Bdd::default();

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);

        let f = bdd.apply_xor(x1, x2);
        assert_eq!(
            bdd.all_sat(f, &[1, 2]),
            vec![vec![false, true], vec![true, false]]
        );

        // Don't cares are expanded.
        assert_eq!(bdd.all_sat(x1, &[1, 2]).len(), 2);
        assert_eq!(bdd.all_sat(bdd.one, &[1, 2, 3]).len(), 8);
        assert!(bdd.all_sat(bdd.zero, &[1]).is_empty());

        // Variables outside the list are abstracted away.
        assert_eq!(bdd.all_sat(f, &[1]), vec![vec![false], vec![true]]);
    }

    #[test]
    fn test_all_sat_keeps_caller_order() {
        let bdd = Bdd::default();

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);

        let f = bdd.apply_and(x1, -x2);
        assert_eq!(bdd.all_sat(f, &[2, 1]), vec![vec![false, true]]);

        // x2 is the most significant position here.
        assert_eq!(
            bdd.all_sat(x1, &[2, 1]),
            vec![vec![false, true], vec![true, true]]
        );
        assert_eq!(
            bdd.all_sat(bdd.apply_or(x1, x2), &[2, 1]),
            vec![vec![false, true], vec![true, false], vec![true, true]]
        );
    }

    #[test]
    fn test_sat_count_terminal() {
        let bdd = Bdd::default();

        assert_eq!(bdd.sat_count(bdd.zero, 3), BigUint::from(0u32));
        assert_eq!(bdd.sat_count(bdd.one, 1), BigUint::from(2u32));
        assert_eq!(bdd.sat_count(bdd.one, 3), BigUint::from(8u32));
    }

    #[test]
    fn test_sat_count_cube_and_clause() {
        let bdd = Bdd::default();

        let f = bdd.cube([1, 2]);
        assert_eq!(bdd.sat_count(f, 2), BigUint::from(1u32));
        assert_eq!(bdd.sat_count(f, 4), BigUint::from(4u32));

        let g = bdd.apply_or(bdd.mk_var(1), bdd.mk_var(2));
        assert_eq!(bdd.sat_count(g, 2), BigUint::from(3u32));
        assert_eq!(bdd.sat_count(-f, 3), BigUint::from(6u32));
    }

    #[test]
    fn test_sat_count_over() {
        let bdd = Bdd::default();

        // x2 ∨ x5 over {2, 5}: three models, independent of the gap.
        let f = bdd.apply_or(bdd.mk_var(2), bdd.mk_var(5));
        assert_eq!(bdd.sat_count_over(f, &[2, 5]), BigUint::from(3u32));
        assert_eq!(bdd.sat_count_over(f, &[5, 2, 7]), BigUint::from(6u32));
        assert_eq!(bdd.sat_count_over(bdd.one, &[]), BigUint::from(1u32));
    }
}
