use std::fmt::{Display, Formatter};
use std::ops::Neg;

use crate::utils::MyHash;

/// Handle to a BDD node, possibly complemented.
///
/// The magnitude is the node index in the manager's unique table,
/// the sign encodes a complement edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Ref(i32);

impl Ref {
    pub const fn positive(index: u32) -> Self {
        Self(index as i32)
    }

    pub const fn is_negated(&self) -> bool {
        self.0 < 0
    }

    pub const fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Return the internal representation of the reference.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Return the index of the referenced node.
    pub const fn index(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Strip the complement bit.
    pub const fn regular(self) -> Self {
        Self(self.0.abs())
    }

    /// Encode as an unsigned literal (`2*index + sign`), suitable for hashing.
    pub(crate) fn as_lit(self) -> u64 {
        signed_to_lit(self.0)
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}",
            if self.is_negated() { "~" } else { "" },
            self.index()
        )
    }
}

impl MyHash for Ref {
    fn hash(&self) -> u64 {
        self.as_lit()
    }
}

pub(crate) fn signed_to_lit(value: i32) -> u64 {
    ((value.unsigned_abs() as u64) << 1) + (value < 0) as u64
}
