use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::reference::Ref;

impl Bdd {
    /// Returns one satisfying path of the BDD, if any exists.
    ///
    /// The path is a vector of DIMACS-style literals, ordered from the root.
    /// Variables absent from the path are don't-cares.
    ///
    /// Returns `None` if the BDD represents the constant false function.
    pub fn one_sat(&self, node: Ref) -> Option<Vec<i32>> {
        if self.is_zero(node) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = node;

        // Walk down the BDD, always picking a satisfying branch
        while !self.is_one(current) {
            let var = self.variable(current.index()) as i32;
            let high = self.high_node(current);
            let low = self.low_node(current);

            // Prefer low branch if satisfiable, otherwise take high
            if !self.is_zero(low) {
                path.push(-var);
                current = low;
            } else {
                path.push(var);
                current = high;
            }
        }

        Some(path)
    }

    /// Number of satisfying assignments over variables `1..=num_vars`.
    pub fn sat_count(&self, node: Ref, num_vars: usize) -> BigUint {
        let mut cache = HashMap::new();
        let max = BigUint::from(1u8) << num_vars;
        self.sat_count_(node, &max, &mut cache)
    }

    fn sat_count_(&self, node: Ref, max: &BigUint, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::ZERO;
        } else if self.is_one(node) {
            return max.clone();
        }

        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        let low = self.low(node.index());
        let high = self.high(node.index());

        let count_low = self.sat_count_(low, max, cache);
        let count_high = self.sat_count_(high, max, cache);

        // Each branch fixes one more variable: halve the sum.
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
    fn test_one_sat_many() {
        let bdd = Bdd::default();

        for &s1 in &[1, -1] {
            for &s2 in &[1, -1] {
                for &s3 in &[1, -1] {
                    let cube = [s1, 2 * s2, 3 * s3];
                    let f = bdd.cube(cube);
                    assert_eq!(bdd.one_sat(f), Some(cube.to_vec()));
                }
            }
        }
    }

    #[test]
    fn test_one_sat_prefers_low() {
        let bdd = Bdd::default();

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let f = bdd.apply_or(x1, x2);
        assert_eq!(bdd.one_sat(f), Some(vec![-1, 2]));
        assert_eq!(bdd.one_sat(bdd.one), Some(vec![]));
    }

    #[test]
    fn test_sat_count_terminal() {
        let bdd = Bdd::default();

        assert_eq!(bdd.sat_count(bdd.zero, 3), BigUint::from(0u32));
        assert_eq!(bdd.sat_count(bdd.one, 1), BigUint::from(2u32));
        assert_eq!(bdd.sat_count(bdd.one, 3), BigUint::from(8u32));
    }

    #[test]
    fn test_sat_count_var() {
        let bdd = Bdd::default();

        let x1 = bdd.mk_var(1);
        assert_eq!(bdd.sat_count(x1, 1), BigUint::from(1u32));
        assert_eq!(bdd.sat_count(x1, 3), BigUint::from(4u32));
        assert_eq!(bdd.sat_count(-x1, 3), BigUint::from(4u32));
    }

    #[test]
    fn test_sat_count_cube_and_clause() {
        let bdd = Bdd::default();

        let f = bdd.cube([1, 2]);
        assert_eq!(bdd.sat_count(f, 2), BigUint::from(1u32));
        assert_eq!(bdd.sat_count(f, 5), BigUint::from(8u32));

        let g = -bdd.cube([-1, -2]);
        assert_eq!(bdd.sat_count(g, 2), BigUint::from(3u32));
        assert_eq!(bdd.sat_count(g, 4), BigUint::from(12u32));
    }

    #[test]
    fn test_sat_count_wide() {
        let bdd = Bdd::default();

        // Nothing constrained over 100 variables.
        let x = bdd.mk_var(100);
        let expected = BigUint::from(1u8) << 99;
        assert_eq!(bdd.sat_count(x, 100), expected);
    }
}
