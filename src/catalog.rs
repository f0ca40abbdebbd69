//! Labeled behavioral predicates over advanced slot values.
//!
//! Every predicate constrains `a = next(slot)`, the value the decision at
//! that slot consumes. Constants are the raw table values the script was
//! written against and are kept as they are.

use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};
use crate::graph::{Slot, StateGraph};
use crate::lcg::prev;
use crate::term::{BoolTerm, BvTerm};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Family {
    Threshold,
    SelfHitAvoidance,
    MaskedDuration,
    RotatedThreshold,
    ExactSelection,
    MaskedHitCount,
}

impl Display for Family {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Family::Threshold => "threshold",
            Family::SelfHitAvoidance => "self-hit avoidance",
            Family::MaskedDuration => "masked duration",
            Family::RotatedThreshold => "rotated threshold",
            Family::ExactSelection => "exact selection",
            Family::MaskedHitCount => "masked hit count",
        };
        write!(f, "{}", name)
    }
}

/// Unsigned comparison against a constant.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Bound {
    Below(u8),
    AtMost(u8),
    AtLeast(u8),
    Exactly(u8),
}

impl Bound {
    pub fn apply(self, t: BvTerm) -> BoolTerm {
        match self {
            Bound::Below(c) => t.ult(BvTerm::constant(c)),
            Bound::AtMost(c) => t.ule(BvTerm::constant(c)),
            Bound::AtLeast(c) => t.uge(BvTerm::constant(c)),
            Bound::Exactly(c) => t.eq(BvTerm::constant(c)),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Rotation {
    Left(u32),
    Right(u32),
}

/// Probability of a self-hit under confusion is one half.
const SELF_HIT: u8 = 128;
const COUNT_MASK: u8 = 3;
const COUNT_BASE: u8 = 2;

fn masked_count(a: BvTerm) -> BvTerm {
    a.and(BvTerm::constant(COUNT_MASK)).add(BvTerm::constant(COUNT_BASE))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    slot: Slot,
    label: String,
    family: Family,
    term: BoolTerm,
}

impl Predicate {
    fn new(slot: Slot, label: &str, family: Family, term: BoolTerm) -> Self {
        Self {
            slot,
            label: label.to_string(),
            family,
            term,
        }
    }

    /// `a` at, or strictly below, a probability cutoff.
    pub fn threshold(slot: Slot, label: &str, bound: Bound) -> Self {
        Self::new(slot, label, Family::Threshold, bound.apply(slot.advanced()))
    }

    pub fn self_hit_avoidance(slot: Slot, label: &str) -> Self {
        Self::new(
            slot,
            label,
            Family::SelfHitAvoidance,
            Bound::Below(SELF_HIT).apply(slot.advanced()),
        )
    }

    /// The status lands (`hit`) and, optionally, `(a & 3) + 2` meets `length`.
    pub fn masked_duration(slot: Slot, label: &str, hit: Bound, length: Option<Bound>) -> Self {
        let a = slot.advanced();
        let term = match length {
            None => hit.apply(a),
            Some(length) => BoolTerm::and(vec![hit.apply(a.clone()), length.apply(masked_count(a))]),
        };
        Self::new(slot, label, Family::MaskedDuration, term)
    }

    pub fn rotated(slot: Slot, label: &str, rotation: Rotation, bound: Bound) -> Self {
        let a = slot.advanced();
        let rotated = match rotation {
            Rotation::Left(k) => a.rotate_left(k),
            Rotation::Right(k) => a.rotate_right(k),
        };
        Self::new(slot, label, Family::RotatedThreshold, bound.apply(rotated))
    }

    /// `a` picks one specific entry out of a table.
    pub fn exact(slot: Slot, label: &str, value: u8) -> Self {
        Self::new(
            slot,
            label,
            Family::ExactSelection,
            Bound::Exactly(value).apply(slot.advanced()),
        )
    }

    pub fn first_hitcount(slot: Slot, label: &str) -> Self {
        let term = Bound::AtLeast(COUNT_BASE).apply(slot.advanced().and(BvTerm::constant(COUNT_MASK)));
        Self::new(slot, label, Family::MaskedHitCount, term)
    }

    pub fn max_hitcount(slot: Slot, label: &str) -> Self {
        let term = Bound::Exactly(COUNT_MASK + COUNT_BASE).apply(masked_count(slot.advanced()));
        Self::new(slot, label, Family::MaskedHitCount, term)
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn term(&self) -> &BoolTerm {
        &self.term
    }

    /// Evaluate against concrete values of every slot.
    pub fn evaluate(&self, values: &[u8]) -> bool {
        self.term.eval(&|v| values.get(v).copied().unwrap_or_default())
    }

    /// Whether the advanced value `a` of this predicate's slot satisfies it.
    ///
    /// Only the predicate's own slot is bound; any other slot reads as 0.
    /// Use [`Predicate::evaluate`] with resolved values for predicates that
    /// span several slots.
    pub fn holds(&self, a: u8) -> bool {
        let state = prev(a);
        let own = self.slot.var();
        self.term.eval(&|v| if v == own { state } else { 0 })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    predicates: Vec<Predicate>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: Predicate) -> Result<()> {
        if self.predicates.iter().any(|p| p.label == predicate.label) {
            return Err(Error::DuplicateLabel(predicate.label));
        }
        self.predicates.push(predicate);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter()
    }

    /// Predicates attached to `slot`, in catalog order.
    pub fn at(&self, slot: Slot) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter().filter(move |p| p.slot == slot)
    }

    /// The three-turn double Fury Swipes script.
    pub fn script(graph: &StateGraph) -> Result<Self> {
        use Bound::*;
        use Predicate as P;
        use Rotation::*;

        let s = |i| graph.slot(i);
        let mut catalog = Catalog::new();
        for p in [
            P::threshold(s(0)?, "Turn 1: P1 Leech Seed hit", AtMost(228)),
            P::threshold(s(1)?, "Turn 1: P2 Leech Seed hit", AtMost(228)),
            P::threshold(s(2)?, "Turn 2: P1 Confuse Ray hit", Below(253)),
            P::masked_duration(s(3)?, "Turn 2: P2 confusion duration (any)", Below(253), Some(AtLeast(3))),
            P::self_hit_avoidance(s(4)?, "Turn 2: P2 avoid confusion self-hit"),
            P::threshold(s(5)?, "Turn 2: P2 Confuse Ray hit", Below(253)),
            P::masked_duration(s(6)?, "Turn 2: P1 confusion duration (any)", Below(253), None),
            P::self_hit_avoidance(s(7)?, "Turn 3: P1 avoid confusion self-hit"),
            P::threshold(s(8)?, "Turn 3: P1 Metronome crit (any)", Below(253)),
            P::exact(s(9)?, "Turn 3: P1 Metronome proc Fury Swipes", 154),
            P::rotated(s(10)?, "Turn 3: P1 Fury Swipes crits", Left(3), Below(65)),
            P::rotated(s(11)?, "Turn 3: P1 Fury Swipes damage roll", Right(1), AtLeast(217)),
            P::threshold(s(12)?, "Turn 3: P1 Fury Swipes hit", AtMost(203)),
            P::first_hitcount(s(13)?, "Turn 3: P1 Fury Swipes first hitcount"),
            P::max_hitcount(s(14)?, "Turn 3: P1 Fury Swipes max hitcount"),
            P::self_hit_avoidance(s(15)?, "Turn 3: P2 avoid confusion self-hit"),
            P::threshold(s(16)?, "Turn 3: P2 Metronome crit (any)", Below(255)),
            P::exact(s(17)?, "Turn 3: P2 Metronome proc Mirror Move", 119),
            P::threshold(s(18)?, "Turn 3: P2 Mirror Move crit (any)", Below(255)),
            P::rotated(s(19)?, "Turn 3: P2 Fury Swipes crits", Left(3), Below(65)),
            P::rotated(s(20)?, "Turn 3: P2 Fury Swipes damage roll", Right(1), AtLeast(217)),
            P::threshold(s(21)?, "Turn 3: P2 Fury Swipes hit", AtMost(203)),
            P::first_hitcount(s(22)?, "Turn 3: P2 Fury Swipes first hitcount"),
            P::max_hitcount(s(23)?, "Turn 3: P2 Fury Swipes max hitcount"),
        ] {
            catalog.push(p)?;
        }
        Ok(catalog)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcg::next;

    fn script() -> Catalog {
        Catalog::script(&StateGraph::script()).unwrap()
    }

    fn by_label<'a>(catalog: &'a Catalog, label: &str) -> &'a Predicate {
        catalog.iter().find(|p| p.label() == label).unwrap()
    }

    #[test]
    fn test_script_covers_every_slot_once() {
        let catalog = script();
        let graph = StateGraph::script();
        assert_eq!(catalog.len(), 24);
        for slot in graph.slots() {
            assert_eq!(catalog.at(slot).count(), 1, "{}", slot);
        }
    }

    #[test]
    fn test_script_needs_enough_slots() {
        let small = StateGraph::new(12, 10).unwrap();
        assert_eq!(
            Catalog::script(&small),
            Err(Error::InvalidGraph("slot 12 out of range for 12 slots".to_string()))
        );
    }

    #[test]
    fn test_script_predicates_read_only_their_slot() {
        let catalog = script();
        let graph = StateGraph::script();
        let values = graph.resolve(&[14, 28, 32, 96, 5, 7, 9, 25, 11, 133]).unwrap();
        for p in &catalog {
            assert_eq!(p.term().vars(), vec![p.slot().var()], "{}", p.label());
            let a = next(values[p.slot().index()]);
            assert_eq!(p.holds(a), p.evaluate(&values), "{}", p.label());
        }
    }

    #[test]
    fn test_holds_binds_only_own_slot() {
        let graph = StateGraph::script();
        let own = graph.slot(0).unwrap();
        let other = graph.slot(10).unwrap();
        let p = Predicate::new(
            own,
            "spans two slots",
            Family::ExactSelection,
            own.advanced().eq(other.term()),
        );
        // Slot 10 is read as 0, so only a == 0 passes through `holds`.
        assert!(p.holds(0));
        assert!(!p.holds(1));

        let values = graph.resolve(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(values[10], next(0));
        assert!(p.evaluate(&values));
    }

    #[test]
    fn test_threshold_boundaries() {
        let catalog = script();
        let leech = by_label(&catalog, "Turn 1: P1 Leech Seed hit");
        assert!(leech.holds(228));
        assert!(!leech.holds(229));

        let confuse = by_label(&catalog, "Turn 2: P1 Confuse Ray hit");
        assert!(confuse.holds(252));
        assert!(!confuse.holds(253));
        assert_eq!(confuse.family(), Family::Threshold);
    }

    #[test]
    fn test_masked_families() {
        let catalog = script();
        let duration = by_label(&catalog, "Turn 2: P2 confusion duration (any)");
        assert!(duration.holds(0b01));
        assert!(!duration.holds(0b00));
        assert!(!duration.holds(253));

        let first = by_label(&catalog, "Turn 3: P1 Fury Swipes first hitcount");
        let max = by_label(&catalog, "Turn 3: P1 Fury Swipes max hitcount");
        let accepted_first: Vec<u8> = (0..4).filter(|&a| first.holds(a)).collect();
        let accepted_max: Vec<u8> = (0..4).filter(|&a| max.holds(a)).collect();
        assert_eq!(accepted_first, vec![2, 3]);
        assert_eq!(accepted_max, vec![3]);
    }

    #[test]
    fn test_rotated_thresholds() {
        let catalog = script();
        let crits = by_label(&catalog, "Turn 3: P1 Fury Swipes crits");
        let roll = by_label(&catalog, "Turn 3: P1 Fury Swipes damage roll");
        for a in 0..=255u8 {
            assert_eq!(crits.holds(a), a.rotate_left(3) < 65);
            assert_eq!(roll.holds(a), a.rotate_right(1) >= 217);
        }
        assert_eq!(crits.family(), Family::RotatedThreshold);
    }

    #[test]
    fn test_exact_selection_has_one_preimage() {
        let catalog = script();
        let proc = by_label(&catalog, "Turn 3: P1 Metronome proc Fury Swipes");
        let accepted: Vec<u8> = (0..=255u8).filter(|&a| proc.holds(a)).collect();
        assert_eq!(accepted, vec![154]);
    }

    #[test]
    fn test_evaluate_uses_advanced_value() {
        let catalog = script();
        let self_hit = by_label(&catalog, "Turn 2: P2 avoid confusion self-hit");
        let mut values = vec![0u8; 24];
        values[4] = 25;
        assert_eq!(next(25), 126);
        assert!(self_hit.evaluate(&values));
        values[4] = 26;
        assert!(!self_hit.evaluate(&values));
    }

    #[test]
    fn test_duplicate_label() {
        let graph = StateGraph::script();
        let mut catalog = Catalog::new();
        let slot = graph.slot(0).unwrap();
        catalog.push(Predicate::exact(slot, "pick", 1)).unwrap();
        assert_eq!(
            catalog.push(Predicate::exact(slot, "pick", 2)),
            Err(Error::DuplicateLabel("pick".to_string()))
        );
        assert_eq!(catalog.len(), 1);
    }
}
