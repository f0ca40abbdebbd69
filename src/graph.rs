//! Ordered state slots of the generator and their structural links.
//!
//! The first `roots` slots are free. Every later slot `i` is the state
//! reached by stepping once from slot `i - roots`.

use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};
use crate::lcg::{next, next_term};
use crate::term::{BoolTerm, BvTerm, VarId};

/// Number of slots in the fixed script.
pub const SCRIPT_SLOTS: usize = 24;
/// Number of free slots in the fixed script.
pub const SCRIPT_ROOTS: usize = 10;

/// Handle of one state slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Slot(usize);

impl Slot {
    pub fn index(self) -> usize {
        self.0
    }

    /// The solver variable holding this slot's state.
    pub fn var(self) -> VarId {
        self.0
    }

    pub fn term(self) -> BvTerm {
        BvTerm::var(self.var())
    }

    /// The value consumed by the decision at this slot: one step past the state.
    pub fn advanced(self) -> BvTerm {
        next_term(self.term())
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Definition {
    Root,
    Derived { source: Slot },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StateGraph {
    slots: usize,
    roots: usize,
}

impl StateGraph {
    pub fn new(slots: usize, roots: usize) -> Result<Self> {
        if roots == 0 {
            return Err(Error::InvalidGraph("at least one root slot is required".to_string()));
        }
        if roots > slots {
            return Err(Error::InvalidGraph(format!(
                "{} roots do not fit in {} slots",
                roots, slots
            )));
        }
        Ok(Self { slots, roots })
    }

    pub fn script() -> Self {
        Self {
            slots: SCRIPT_SLOTS,
            roots: SCRIPT_ROOTS,
        }
    }

    pub fn num_slots(&self) -> usize {
        self.slots
    }

    pub fn num_roots(&self) -> usize {
        self.roots
    }

    pub fn slot(&self, index: usize) -> Result<Slot> {
        if index < self.slots {
            Ok(Slot(index))
        } else {
            Err(Error::InvalidGraph(format!(
                "slot {} out of range for {} slots",
                index, self.slots
            )))
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot> {
        (0..self.slots).map(Slot)
    }

    pub fn roots(&self) -> impl Iterator<Item = Slot> {
        (0..self.roots).map(Slot)
    }

    pub fn derived(&self) -> impl Iterator<Item = Slot> {
        (self.roots..self.slots).map(Slot)
    }

    pub fn source_of(&self, slot: Slot) -> Definition {
        if slot.0 < self.roots {
            Definition::Root
        } else {
            Definition::Derived {
                source: Slot(slot.0 - self.roots),
            }
        }
    }

    /// `(derived, source)` pairs, in slot order.
    pub fn relations(&self) -> impl Iterator<Item = (Slot, Slot)> + '_ {
        self.derived().map(move |d| (d, Slot(d.0 - self.roots)))
    }

    /// Structural constraints `slot[d] == next(slot[s])`, one per relation.
    pub fn relation_terms(&self) -> Vec<BoolTerm> {
        self.relations()
            .map(|(d, s)| d.term().eq(s.advanced()))
            .collect()
    }

    /// Concrete value of every slot, given the roots.
    pub fn resolve(&self, roots: &[u8]) -> Result<Vec<u8>> {
        if roots.len() != self.roots {
            return Err(Error::InvalidGraph(format!(
                "expected {} root values, got {}",
                self.roots,
                roots.len()
            )));
        }
        let mut values = Vec::with_capacity(self.slots);
        values.extend_from_slice(roots);
        for i in self.roots..self.slots {
            values.push(next(values[i - self.roots]));
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcg::advance;

    #[test]
    fn test_new_rejects_bad_shapes() {
        assert!(matches!(StateGraph::new(5, 0), Err(Error::InvalidGraph(_))));
        assert!(matches!(StateGraph::new(3, 4), Err(Error::InvalidGraph(_))));
        assert!(StateGraph::new(4, 4).is_ok());
    }

    #[test]
    fn test_script_shape() {
        let g = StateGraph::script();
        assert_eq!(g.num_slots(), 24);
        assert_eq!(g.roots().count(), 10);
        assert_eq!(g.derived().count(), 14);
        assert_eq!(g.source_of(Slot(3)), Definition::Root);
        assert_eq!(g.source_of(Slot(13)), Definition::Derived { source: Slot(3) });
        assert_eq!(g.source_of(Slot(23)), Definition::Derived { source: Slot(13) });
        assert_eq!(
            g.slot(24),
            Err(Error::InvalidGraph("slot 24 out of range for 24 slots".to_string()))
        );
    }

    #[test]
    fn test_each_slot_has_one_definition() {
        let g = StateGraph::script();
        let mut defined = vec![0; g.num_slots()];
        for r in g.roots() {
            defined[r.index()] += 1;
        }
        for (d, s) in g.relations() {
            assert!(s < d);
            defined[d.index()] += 1;
        }
        assert!(defined.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_resolve_follows_chains() {
        let g = StateGraph::script();
        let roots: Vec<u8> = (0..10).map(|i| i * 17).collect();
        let values = g.resolve(&roots).unwrap();
        assert_eq!(values.len(), 24);
        assert_eq!(&values[..10], &roots[..]);
        assert_eq!(values[12], next(roots[2]));
        assert_eq!(values[22], advance(roots[2], 2));
        assert!(matches!(g.resolve(&[1, 2]), Err(Error::InvalidGraph(_))));
    }

    #[test]
    fn test_relation_terms_hold_on_resolved_values() {
        let g = StateGraph::script();
        let values = g.resolve(&[9, 8, 7, 6, 5, 4, 3, 2, 1, 0]).unwrap();
        for t in g.relation_terms() {
            assert!(t.eval(&|v| values[v]), "{}", t);
        }
    }

    #[test]
    fn test_slot_display() {
        assert_eq!(Slot(7).to_string(), "s7");
        assert_eq!(Slot(1).advanced().to_string(), "(bvadd (bvmul v1 #x05) #x01)");
    }
}
