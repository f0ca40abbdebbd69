//! The 8-bit linear congruential generator.
//!
//! ```text
//! next(x) = (5·x + 1) mod 256
//! ```
//!
//! The multiplier is odd and the increment is 1, so the step is a bijection
//! on `0..=255` with full period. Its inverse is `prev(x) = 205·(x - 1)`,
//! since `5·205 ≡ 1 (mod 256)`.

use crate::term::BvTerm;

pub const MULTIPLIER: u8 = 5;
pub const INCREMENT: u8 = 1;

/// Multiplicative inverse of [`MULTIPLIER`] modulo 256.
pub const INVERSE_MULTIPLIER: u8 = 205;

/// One generator step.
pub const fn next(x: u8) -> u8 {
    x.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT)
}

/// Inverse of [`next`].
pub const fn prev(x: u8) -> u8 {
    x.wrapping_sub(INCREMENT).wrapping_mul(INVERSE_MULTIPLIER)
}

/// `k` consecutive steps.
pub fn advance(x: u8, k: usize) -> u8 {
    (0..k).fold(x, |s, _| next(s))
}

/// The step applied to a symbolic term.
pub fn next_term(x: BvTerm) -> BvTerm {
    x.mul(BvTerm::constant(MULTIPLIER))
        .add(BvTerm::constant(INCREMENT))
}

/// Generator register, yielding each successive state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Lcg {
    state: u8,
}

impl Lcg {
    pub fn new(state: u8) -> Self {
        Self { state }
    }

    pub fn state(&self) -> u8 {
        self.state
    }
}

impl Iterator for Lcg {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.state = next(self.state);
        Some(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_is_bijection() {
        let mut seen = [false; 256];
        for x in 0..=255u8 {
            let y = next(x) as usize;
            assert!(!seen[y], "next({}) = {} collides", x, y);
            seen[y] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_prev_inverts_next() {
        for x in 0..=255u8 {
            assert_eq!(prev(next(x)), x);
            assert_eq!(next(prev(x)), x);
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(next(0), 1);
        assert_eq!(next(1), 6);
        assert_eq!(next(51), 0);
        assert_eq!(next(255), 252);
        assert_eq!(advance(0, 3), 31);
        assert_eq!(advance(7, 0), 7);
    }

    #[test]
    fn test_full_period() {
        let mut lcg = Lcg::new(0);
        let period = lcg.position(|s| s == 0).map(|i| i + 1);
        assert_eq!(period, Some(256));
    }

    #[test]
    fn test_iterator_matches_advance() {
        let states: Vec<u8> = Lcg::new(42).take(5).collect();
        for (k, &s) in states.iter().enumerate() {
            assert_eq!(s, advance(42, k + 1));
        }
    }

    #[test]
    fn test_next_term_agrees() {
        let t = next_term(BvTerm::var(0));
        for x in 0..=255u8 {
            assert_eq!(t.eval(&|_| x), next(x));
        }
    }
}
