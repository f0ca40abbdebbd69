//! The BDD manager.
//!
//! All functions are built through a single [`Bdd`] manager, which owns the
//! hash-consed node table and the computed table. Nodes are referenced by
//! [`Ref`] handles with complement edges: negation is free, and the high edge
//! of a stored node is never complemented (canonical form).
//!
//! Variable indices are 1-based and double as the variable order: smaller
//! indices are closer to the root. Callers that care about the order (see
//! [`crate::order`]) pick indices accordingly.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;

use log::{debug, trace};

use crate::cache::{Cache, OpKey};
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
        pairing3(self.variable as u64, self.low.as_lit(), self.high.as_lit())
    }
}

pub struct Bdd {
    storage: RefCell<Table<Node>>,
    cache: RefCell<Cache<OpKey, Ref>>,
    pub zero: Ref,
    pub one: Ref,
}

impl Bdd {
    pub fn new(bucket_bits: usize) -> Self {
        let mut storage = Table::new(bucket_bits);

        // Allocate the terminal node:
        let one = storage.add(Node::default());
        assert_eq!(one, 1); // Make sure the terminal node is (1).
        let one = Ref::positive(one as u32);
        let zero = -one;

        Self {
            storage: RefCell::new(storage),
            cache: RefCell::new(Cache::new(bucket_bits.min(16))),
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
            .field("nodes", &storage.size())
            .field("buckets", &storage.num_buckets())
            .field("cache_hits", &cache.hits())
            .field("cache_misses", &cache.misses())
            .finish()
    }
}

impl Bdd {
    /// Total number of allocated nodes, terminal included.
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().size()
    }

    pub fn cache_hits(&self) -> usize {
        self.cache.borrow().hits()
    }

    pub fn cache_misses(&self) -> usize {
        self.cache.borrow().misses()
    }

    pub fn variable(&self, index: u32) -> u32 {
        self.storage.borrow().value(index as usize).variable
    }
    pub fn low(&self, index: u32) -> Ref {
        self.storage.borrow().value(index as usize).low
    }
    pub fn high(&self, index: u32) -> Ref {
        self.storage.borrow().value(index as usize).high
    }

    pub fn low_node(&self, node: Ref) -> Ref {
        let low = self.low(node.index());
        if node.is_negated() {
            -low
        } else {
            low
        }
    }
    pub fn high_node(&self, node: Ref) -> Ref {
        let high = self.high(node.index());
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
        self.is_zero(node) || self.is_one(node)
    }

    pub fn mk_node(&self, v: u32, low: Ref, high: Ref) -> Ref {
        trace!("mk(v = {}, low = {}, high = {})", v, low, high);

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

    /// Conjunction of DIMACS-style literals.
    pub fn cube(&self, literals: impl IntoIterator<Item = i32>) -> Ref {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_by_key(|&v| v.abs());
        debug!("cube(literals = {:?})", literals);
        literals.reverse();
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

    pub fn top_cofactors(&self, node: Ref, v: u32) -> (Ref, Ref) {
        assert_ne!(v, 0, "Variable index should not be zero");

        let i = node.index();
        if self.is_terminal(node) || v < self.variable(i) {
            return (node, node);
        }
        assert_eq!(v, self.variable(i));
        if node.is_negated() {
            (-self.low(i), -self.high(i))
        } else {
            (self.low(i), self.high(i))
        }
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
    /// use lcg_seed::bdd::Bdd;
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
        trace!("apply_ite(f = {}, g = {}, h = {})", f, g, h);

        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        if self.is_one(f) {
            return g;
        }
        if self.is_zero(f) {
            return h;
        }

        // From now on, F is known not to be a constant

        // More base cases:
        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        //   ite(F,1,~F) => 1
        //   ite(F,F,1) => 1
        //   ite(F,~F,0) => 0
        //   ite(F,0,F) => 0
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }
        if self.is_one(g) && h == -f {
            return self.one;
        }
        if g == f && self.is_one(h) {
            return self.one;
        }
        if g == -f && self.is_zero(h) {
            return self.zero;
        }
        if self.is_zero(g) && h == f {
            return self.zero;
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,~F) => ite(F,G,1)
        if g == f {
            return self.apply_ite(f, self.one, h);
        }
        if h == f {
            return self.apply_ite(f, g, self.zero);
        }
        if g == -f {
            return self.apply_ite(f, self.zero, h);
        }
        if h == -f {
            return self.apply_ite(f, g, self.one);
        }

        let i = self.variable(f.index());
        let j = self.variable(g.index());
        let k = self.variable(h.index());
        assert_ne!(i, 0);

        // Equivalent pairs:
        //   ite(F,1,H) == ite(H,1,F) == F ∨ H
        //   ite(F,G,0) == ite(G,F,0) == F ∧ G
        //   ite(F,G,1) == ite(~G,~F,1) == F -> G
        //   ite(F,0,H) == ite(~H,0,~F) == ~F ∧ H
        //   ite(F,G,~G) == ite(G,F,~F)
        // (choose the one with the lowest variable)
        if self.is_one(g) && k != 0 && k < i {
            return self.apply_ite(h, self.one, f);
        }
        if self.is_zero(h) && j != 0 && j < i {
            return self.apply_ite(g, f, self.zero);
        }
        if self.is_one(h) && j != 0 && j < i {
            return self.apply_ite(-g, -f, self.one);
        }
        if self.is_zero(g) && k != 0 && k < i {
            return self.apply_ite(-h, self.zero, -f);
        }
        if g == -h && j != 0 && j < i {
            return self.apply_ite(g, f, -f);
        }

        // Make sure the first two pointers (f and g) are regular (not negated)
        let (mut f, mut g, mut h) = (f, g, h);

        // ite(~F,G,H) => ite(F,H,G)
        if f.is_negated() {
            f = -f;
            std::mem::swap(&mut g, &mut h);
        }

        // ite(F,~G,H) => ~ite(F,G,~H)
        let mut n = false;
        if g.is_negated() {
            n = true;
            g = -g;
            h = -h;
        }

        let (f, g, h) = (f, g, h); // make immutable

        let key = OpKey::Ite(f, g, h);
        if let Some(res) = self.cache.borrow_mut().get(&key) {
            trace!("cache: apply_ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
            return if n { -res } else { res };
        }

        // Determine the top variable:
        let mut m = i;
        if j != 0 {
            m = m.min(j);
        }
        if k != 0 {
            m = m.min(k);
        }

        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let e = self.apply_ite(f0, g0, h0);
        let t = self.apply_ite(f1, g1, h1);

        let res = self.mk_node(m, e, t);
        trace!("computed: apply_ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
        self.cache.borrow_mut().insert(key, res);

        if n {
            -res
        } else {
            res
        }
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

    /// Cofactor `f` by a cube given as DIMACS-style literals.
    ///
    /// With a literal for every variable in the support of `f`, the result is a terminal.
    pub fn cofactor_cube(&self, f: Ref, cube: &[i32]) -> Ref {
        let mut cube = cube.to_vec();
        cube.sort_by_key(|lit| lit.unsigned_abs());
        let mut cache = HashMap::new();
        self.cofactor_cube_(f, &cube, &mut cache)
    }

    fn cofactor_cube_(&self, f: Ref, cube: &[i32], cache: &mut HashMap<(Ref, usize), Ref>) -> Ref {
        if self.is_terminal(f) || cube.is_empty() {
            return f;
        }
        let key = (f, cube.len());
        if let Some(&res) = cache.get(&key) {
            return res;
        }

        let t = self.variable(f.index());
        let lit = cube[0];
        let u = lit.unsigned_abs();

        let res = if u < t {
            self.cofactor_cube_(f, &cube[1..], cache)
        } else if u == t {
            let (f0, f1) = self.top_cofactors(f, t);
            let branch = if lit > 0 { f1 } else { f0 };
            self.cofactor_cube_(branch, &cube[1..], cache)
        } else {
            let (f0, f1) = self.top_cofactors(f, t);
            let low = self.cofactor_cube_(f0, cube, cache);
            let high = self.cofactor_cube_(f1, cube, cache);
            self.mk_node(t, low, high)
        };
        cache.insert(key, res);
        res
    }

    /// Existential quantification: `∃ vars. f`.
    pub fn exists(&self, f: Ref, vars: &HashSet<u32>) -> Ref {
        let mut cache = HashMap::new();
        self.exists_(f, vars, &mut cache)
    }

    fn exists_(&self, f: Ref, vars: &HashSet<u32>, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) {
            return f;
        }
        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let v = self.variable(f.index());
        let low = self.exists_(self.low_node(f), vars, cache);
        let high = self.exists_(self.high_node(f), vars, cache);
        let res = if vars.contains(&v) {
            self.apply_or(low, high)
        } else {
            self.mk_node(v, low, high)
        };
        cache.insert(f, res);
        res
    }

    /// Indices of all nodes reachable from `nodes`, the terminal included.
    pub fn descendants(&self, nodes: impl IntoIterator<Item = Ref>) -> HashSet<u32> {
        let mut visited = HashSet::new();
        visited.insert(self.one.index());
        let mut queue = VecDeque::from_iter(nodes);

        while let Some(node) = queue.pop_front() {
            let i = node.index();
            if visited.insert(i) {
                queue.push_back(self.low(i));
                queue.push_back(self.high(i));
            }
        }

        visited
    }

    pub fn size(&self, f: Ref) -> u64 {
        self.descendants([f]).len() as u64
    }

    /// Variables `f` depends on, in ascending order.
    pub fn support(&self, f: Ref) -> Vec<u32> {
        let mut vars: Vec<u32> = self
            .descendants([f])
            .into_iter()
            .map(|i| self.variable(i))
            .filter(|&v| v != 0)
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }
}
