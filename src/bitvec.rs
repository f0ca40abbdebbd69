//! Bit-blasting of fixed-width unsigned vectors into BDDs.
//!
//! A [`BitVec`] holds one BDD function per bit, least significant bit first.
//! Arithmetic is truncated to the vector width, which gives the usual
//! modulo-`2^width` semantics.

use crate::bdd::Bdd;
use crate::reference::Ref;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVec {
    bits: Vec<Ref>,
}

impl BitVec {
    /// Constant vector of the given width.
    pub fn constant(bdd: &Bdd, value: u64, width: usize) -> Self {
        let bits = (0..width)
            .map(|i| {
                if i < 64 && (value >> i) & 1 == 1 {
                    bdd.one
                } else {
                    bdd.zero
                }
            })
            .collect();
        Self { bits }
    }

    /// Vector of fresh BDD variables, `vars[0]` being the least significant bit.
    pub fn from_vars(bdd: &Bdd, vars: &[u32]) -> Self {
        Self {
            bits: vars.iter().map(|&v| bdd.mk_var(v)).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    pub fn bits(&self) -> &[Ref] {
        &self.bits
    }

    fn check_width(&self, other: &BitVec) {
        assert_eq!(
            self.width(),
            other.width(),
            "Bit-vector width mismatch: {} vs {}",
            self.width(),
            other.width()
        );
    }

    /// Ripple-carry addition.
    pub fn add(&self, bdd: &Bdd, other: &BitVec) -> BitVec {
        self.check_width(other);
        let mut carry = bdd.zero;
        let mut bits = Vec::with_capacity(self.width());
        for (&a, &b) in self.bits.iter().zip(&other.bits) {
            let a_xor_b = bdd.apply_xor(a, b);
            bits.push(bdd.apply_xor(a_xor_b, carry));
            // carry' = (a ∧ b) ∨ (carry ∧ (a ⊕ b))
            carry = bdd.apply_ite(a_xor_b, carry, a);
        }
        BitVec { bits }
    }

    /// Shift-and-add multiplication.
    pub fn mul(&self, bdd: &Bdd, other: &BitVec) -> BitVec {
        self.check_width(other);
        let width = self.width();
        let mut acc = BitVec::constant(bdd, 0, width);
        for (i, &b) in other.bits.iter().enumerate() {
            if bdd.is_zero(b) {
                continue;
            }
            let partial = BitVec {
                bits: (0..width)
                    .map(|j| {
                        if j < i {
                            bdd.zero
                        } else {
                            bdd.apply_and(self.bits[j - i], b)
                        }
                    })
                    .collect(),
            };
            acc = acc.add(bdd, &partial);
        }
        acc
    }

    pub fn and(&self, bdd: &Bdd, other: &BitVec) -> BitVec {
        self.check_width(other);
        BitVec {
            bits: self
                .bits
                .iter()
                .zip(&other.bits)
                .map(|(&a, &b)| bdd.apply_and(a, b))
                .collect(),
        }
    }

    /// Rotate towards the most significant bit.
    pub fn rotate_left(&self, amount: u32) -> BitVec {
        let width = self.width();
        if width == 0 {
            return self.clone();
        }
        let k = amount as usize % width;
        BitVec {
            bits: (0..width).map(|i| self.bits[(i + width - k) % width]).collect(),
        }
    }

    /// Rotate towards the least significant bit.
    pub fn rotate_right(&self, amount: u32) -> BitVec {
        let width = self.width();
        if width == 0 {
            return self.clone();
        }
        let k = amount as usize % width;
        BitVec {
            bits: (0..width).map(|i| self.bits[(i + k) % width]).collect(),
        }
    }

    pub fn eq(&self, bdd: &Bdd, other: &BitVec) -> Ref {
        self.check_width(other);
        bdd.apply_and_many(
            self.bits
                .iter()
                .zip(&other.bits)
                .map(|(&a, &b)| bdd.apply_eq(a, b)),
        )
    }

    /// Unsigned `self < other`.
    pub fn ult(&self, bdd: &Bdd, other: &BitVec) -> Ref {
        self.compare(bdd, other, bdd.zero)
    }

    /// Unsigned `self <= other`.
    pub fn ule(&self, bdd: &Bdd, other: &BitVec) -> Ref {
        self.compare(bdd, other, bdd.one)
    }

    /// Unsigned `self >= other`.
    pub fn uge(&self, bdd: &Bdd, other: &BitVec) -> Ref {
        other.ule(bdd, self)
    }

    // Scans from the least significant bit: the highest differing bit decides,
    // `on_equal` is the verdict when all bits agree.
    fn compare(&self, bdd: &Bdd, other: &BitVec, on_equal: Ref) -> Ref {
        self.check_width(other);
        let mut res = on_equal;
        for (&a, &b) in self.bits.iter().zip(&other.bits) {
            let same = bdd.apply_eq(a, b);
            res = bdd.apply_ite(same, res, b);
        }
        res
    }
}
