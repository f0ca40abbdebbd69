//! Backend-agnostic bit-vector and boolean terms.
//!
//! All bit-vector terms have the fixed width [`WIDTH`]. Arithmetic wraps
//! modulo `2^WIDTH`, and concrete evaluation uses `u8` wrapping operations,
//! so the evaluator and any bit-blasted encoding agree bit for bit.

use std::fmt::{Display, Formatter};

/// Width of every bit-vector term, in bits.
pub const WIDTH: u32 = 8;

/// Identifier of a declared bit-vector variable.
pub type VarId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BvTerm {
    Var(VarId),
    Const(u8),
    Add(Box<BvTerm>, Box<BvTerm>),
    Mul(Box<BvTerm>, Box<BvTerm>),
    And(Box<BvTerm>, Box<BvTerm>),
    RotateLeft(Box<BvTerm>, u32),
    RotateRight(Box<BvTerm>, u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoolTerm {
    Eq(BvTerm, BvTerm),
    Ult(BvTerm, BvTerm),
    Ule(BvTerm, BvTerm),
    Uge(BvTerm, BvTerm),
    And(Vec<BoolTerm>),
    Or(Vec<BoolTerm>),
    Not(Box<BoolTerm>),
}

#[allow(clippy::should_implement_trait)]
impl BvTerm {
    pub fn var(id: VarId) -> Self {
        BvTerm::Var(id)
    }

    pub fn constant(value: u8) -> Self {
        BvTerm::Const(value)
    }

    pub fn add(self, other: BvTerm) -> Self {
        BvTerm::Add(Box::new(self), Box::new(other))
    }

    pub fn mul(self, other: BvTerm) -> Self {
        BvTerm::Mul(Box::new(self), Box::new(other))
    }

    pub fn and(self, other: BvTerm) -> Self {
        BvTerm::And(Box::new(self), Box::new(other))
    }

    pub fn rotate_left(self, amount: u32) -> Self {
        BvTerm::RotateLeft(Box::new(self), amount)
    }

    pub fn rotate_right(self, amount: u32) -> Self {
        BvTerm::RotateRight(Box::new(self), amount)
    }

    pub fn eq(self, other: BvTerm) -> BoolTerm {
        BoolTerm::Eq(self, other)
    }

    pub fn ult(self, other: BvTerm) -> BoolTerm {
        BoolTerm::Ult(self, other)
    }

    pub fn ule(self, other: BvTerm) -> BoolTerm {
        BoolTerm::Ule(self, other)
    }

    pub fn uge(self, other: BvTerm) -> BoolTerm {
        BoolTerm::Uge(self, other)
    }

    /// Evaluate under a concrete assignment of variables.
    pub fn eval<F>(&self, env: &F) -> u8
    where
        F: Fn(VarId) -> u8,
    {
        match self {
            BvTerm::Var(id) => env(*id),
            BvTerm::Const(c) => *c,
            BvTerm::Add(a, b) => a.eval(env).wrapping_add(b.eval(env)),
            BvTerm::Mul(a, b) => a.eval(env).wrapping_mul(b.eval(env)),
            BvTerm::And(a, b) => a.eval(env) & b.eval(env),
            BvTerm::RotateLeft(a, k) => a.eval(env).rotate_left(*k),
            BvTerm::RotateRight(a, k) => a.eval(env).rotate_right(*k),
        }
    }

    /// Push every variable mentioned by the term into `out`.
    pub fn collect_vars(&self, out: &mut Vec<VarId>) {
        match self {
            BvTerm::Var(id) => out.push(*id),
            BvTerm::Const(_) => {}
            BvTerm::Add(a, b) | BvTerm::Mul(a, b) | BvTerm::And(a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
            BvTerm::RotateLeft(a, _) | BvTerm::RotateRight(a, _) => a.collect_vars(out),
        }
    }
}

#[allow(clippy::should_implement_trait)]
impl BoolTerm {
    pub fn and(terms: Vec<BoolTerm>) -> Self {
        BoolTerm::And(terms)
    }

    pub fn or(terms: Vec<BoolTerm>) -> Self {
        BoolTerm::Or(terms)
    }

    pub fn not(self) -> Self {
        BoolTerm::Not(Box::new(self))
    }

    pub fn eval<F>(&self, env: &F) -> bool
    where
        F: Fn(VarId) -> u8,
    {
        match self {
            BoolTerm::Eq(a, b) => a.eval(env) == b.eval(env),
            BoolTerm::Ult(a, b) => a.eval(env) < b.eval(env),
            BoolTerm::Ule(a, b) => a.eval(env) <= b.eval(env),
            BoolTerm::Uge(a, b) => a.eval(env) >= b.eval(env),
            BoolTerm::And(ts) => ts.iter().all(|t| t.eval(env)),
            BoolTerm::Or(ts) => ts.iter().any(|t| t.eval(env)),
            BoolTerm::Not(t) => !t.eval(env),
        }
    }

    /// Variables the term depends on, sorted and deduplicated.
    pub fn vars(&self) -> Vec<VarId> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out.sort_unstable();
        out.dedup();
        out
    }

    fn collect_vars(&self, out: &mut Vec<VarId>) {
        match self {
            BoolTerm::Eq(a, b) | BoolTerm::Ult(a, b) | BoolTerm::Ule(a, b) | BoolTerm::Uge(a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
            BoolTerm::And(ts) | BoolTerm::Or(ts) => {
                for t in ts {
                    t.collect_vars(out);
                }
            }
            BoolTerm::Not(t) => t.collect_vars(out),
        }
    }
}

// SMT-LIB flavoured rendering, used in logs.
impl Display for BvTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BvTerm::Var(id) => write!(f, "v{}", id),
            BvTerm::Const(c) => write!(f, "#x{:02x}", c),
            BvTerm::Add(a, b) => write!(f, "(bvadd {} {})", a, b),
            BvTerm::Mul(a, b) => write!(f, "(bvmul {} {})", a, b),
            BvTerm::And(a, b) => write!(f, "(bvand {} {})", a, b),
            BvTerm::RotateLeft(a, k) => write!(f, "((_ rotate_left {}) {})", k, a),
            BvTerm::RotateRight(a, k) => write!(f, "((_ rotate_right {}) {})", k, a),
        }
    }
}

impl Display for BoolTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BoolTerm::Eq(a, b) => write!(f, "(= {} {})", a, b),
            BoolTerm::Ult(a, b) => write!(f, "(bvult {} {})", a, b),
            BoolTerm::Ule(a, b) => write!(f, "(bvule {} {})", a, b),
            BoolTerm::Uge(a, b) => write!(f, "(bvuge {} {})", a, b),
            BoolTerm::And(ts) | BoolTerm::Or(ts) => {
                let op = if matches!(self, BoolTerm::And(_)) { "and" } else { "or" };
                write!(f, "({}", op)?;
                for t in ts {
                    write!(f, " {}", t)?;
                }
                write!(f, ")")
            }
            BoolTerm::Not(t) => write!(f, "(not {})", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(values: &[u8]) -> impl Fn(VarId) -> u8 + '_ {
        move |id| values[id]
    }

    #[test]
    fn test_eval_wraps() {
        let t = BvTerm::var(0).mul(BvTerm::constant(5)).add(BvTerm::constant(1));
        assert_eq!(t.eval(&env(&[0])), 1);
        assert_eq!(t.eval(&env(&[51])), 0);
        assert_eq!(t.eval(&env(&[255])), 252);
    }

    #[test]
    fn test_eval_rotations() {
        let x = BvTerm::var(0);
        assert_eq!(x.clone().rotate_left(3).eval(&env(&[0b1110_0001])), 0b0000_1111);
        assert_eq!(x.rotate_right(1).eval(&env(&[0b0000_0011])), 0b1000_0001);
    }

    #[test]
    fn test_rotation_roundtrip_all_values() {
        let t = BvTerm::var(0).rotate_right(1).rotate_left(1);
        for x in 0..=255u8 {
            assert_eq!(t.eval(&env(&[x])), x);
        }
    }

    #[test]
    fn test_eval_comparisons() {
        let x = BvTerm::var(0);
        let le = x.clone().ule(BvTerm::constant(228));
        assert!(le.eval(&env(&[228])));
        assert!(!le.eval(&env(&[229])));

        let lt = x.clone().ult(BvTerm::constant(253));
        assert!(lt.eval(&env(&[252])));
        assert!(!lt.eval(&env(&[253])));

        let ge = x.uge(BvTerm::constant(217));
        assert!(ge.eval(&env(&[217])));
        assert!(!ge.eval(&env(&[216])));
    }

    #[test]
    fn test_eval_connectives() {
        let x = BvTerm::var(0);
        let y = BvTerm::var(1);
        let t = BoolTerm::and(vec![
            x.clone().eq(BvTerm::constant(3)),
            BoolTerm::or(vec![y.clone().eq(BvTerm::constant(1)), y.eq(BvTerm::constant(2))]),
        ]);
        assert!(t.eval(&env(&[3, 2])));
        assert!(!t.eval(&env(&[3, 4])));
        assert!(t.clone().not().eval(&env(&[4, 1])));
        assert!(BoolTerm::and(vec![]).eval(&env(&[])));
        assert!(!BoolTerm::or(vec![]).eval(&env(&[])));
    }

    #[test]
    fn test_vars() {
        let t = BvTerm::var(7)
            .add(BvTerm::var(2))
            .eq(BvTerm::var(7).and(BvTerm::constant(3)));
        assert_eq!(t.vars(), vec![2, 7]);
    }

    #[test]
    fn test_display() {
        let t = BvTerm::var(0)
            .mul(BvTerm::constant(5))
            .add(BvTerm::constant(1))
            .ule(BvTerm::constant(228));
        assert_eq!(t.to_string(), "(bvule (bvadd (bvmul v0 #x05) #x01) #xe4)");
        let r = BvTerm::var(1).rotate_left(3).ult(BvTerm::constant(65));
        assert_eq!(r.to_string(), "(bvult ((_ rotate_left 3) v1) #x41)");
    }
}
