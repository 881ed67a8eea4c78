//! Existential and universal quantification.

use std::collections::HashMap;

use crate::bdd::Bdd;
use crate::reference::Ref;

impl Bdd {
    /// Existentially quantify `vars` out of `f`.
    ///
    /// ```text
    /// ∃v. f = f|v=0 ∨ f|v=1
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use revsynth::bdd::Bdd;
    ///
    /// let bdd = Bdd::default();
    /// let x1 = bdd.mk_var(1);
    /// let x2 = bdd.mk_var(2);
    /// let f = bdd.apply_and(x1, x2);
    /// assert_eq!(bdd.exists(f, &[1]), x2);
    /// assert_eq!(bdd.exists(f, &[1, 2]), bdd.one);
    /// ```
    pub fn exists(&self, f: Ref, vars: &[u32]) -> Ref {
        let mut vars = vars.to_vec();
        vars.sort_unstable();
        vars.dedup();
        let mut cache = HashMap::new();
        self.exists_(f, &vars, &mut cache)
    }

    fn exists_(&self, f: Ref, vars: &[u32], cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) {
            return f;
        }

        let v = self.variable(f);
        // Quantified variables above `v` do not occur in `f`.
        let vars = &vars[vars.partition_point(|&u| u < v)..];
        if vars.is_empty() {
            return f;
        }

        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let low = self.exists_(self.low_node(f), vars, cache);
        let res = if vars[0] == v {
            if self.is_one(low) {
                low
            } else {
                let high = self.exists_(self.high_node(f), vars, cache);
                self.apply_or(low, high)
            }
        } else {
            let high = self.exists_(self.high_node(f), vars, cache);
            self.mk_node(v, low, high)
        };
        cache.insert(f, res);
        res
    }

    /// Universally quantify `vars` out of `f`.
    ///
    /// ```text
    /// ∀v. f = ¬∃v. ¬f
    /// ```
    pub fn forall(&self, f: Ref, vars: &[u32]) -> Ref {
        -self.exists(-f, vars)
    }
}
