//! BDD-backed decision procedure for 8-bit bit-vector constraints.
//!
//! Terms are collected as they are asserted and bit-blasted only at
//! [`Backend::check`] time, once the full variable order is known.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use log::{debug, info};
use num_bigint::BigUint;

use crate::backend::{check_deadline, Backend, SatResult};
use crate::bdd::Bdd;
use crate::bitvec::BitVec;
use crate::error::{Error, Result};
use crate::order;
use crate::reference::Ref;
use crate::term::{BoolTerm, BvTerm, VarId, WIDTH};

#[derive(Debug)]
enum State {
    Unchecked,
    Sat {
        root: Ref,
        levels: HashMap<VarId, Vec<u32>>,
    },
    Unsat {
        hard: Ref,
        tracked: Vec<Ref>,
    },
}

#[derive(Debug)]
pub struct BddSolver {
    bdd: Bdd,
    names: Vec<(VarId, String)>,
    hard: Vec<BoolTerm>,
    tracked: Vec<(String, BoolTerm)>,
    deadline: Option<Instant>,
    state: State,
}

impl Default for BddSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl BddSolver {
    pub fn new() -> Self {
        Self {
            bdd: Bdd::default(),
            names: Vec::new(),
            hard: Vec::new(),
            tracked: Vec::new(),
            deadline: None,
            state: State::Unchecked,
        }
    }

    /// The manager holding the most recent check.
    pub fn bdd(&self) -> &Bdd {
        &self.bdd
    }

    fn is_declared(&self, var: VarId) -> bool {
        self.names.iter().any(|(v, _)| *v == var)
    }

    fn check_declared(&self, term: &BoolTerm) -> Result<()> {
        match term.vars().into_iter().find(|&v| !self.is_declared(v)) {
            Some(v) => Err(Error::UnknownVariable(v)),
            None => Ok(()),
        }
    }

    fn sat_levels(&self) -> Result<(Ref, &HashMap<VarId, Vec<u32>>)> {
        match &self.state {
            State::Sat { root, levels } => Ok((*root, levels)),
            _ => Err(Error::Backend("no satisfiable check to read a model from".to_string())),
        }
    }
}

fn blast_bv(bdd: &Bdd, env: &HashMap<VarId, BitVec>, term: &BvTerm) -> Result<BitVec> {
    let width = WIDTH as usize;
    Ok(match term {
        BvTerm::Var(id) => env.get(id).cloned().ok_or(Error::UnknownVariable(*id))?,
        BvTerm::Const(c) => BitVec::constant(bdd, *c as u64, width),
        BvTerm::Add(a, b) => blast_bv(bdd, env, a)?.add(bdd, &blast_bv(bdd, env, b)?),
        BvTerm::Mul(a, b) => blast_bv(bdd, env, a)?.mul(bdd, &blast_bv(bdd, env, b)?),
        BvTerm::And(a, b) => blast_bv(bdd, env, a)?.and(bdd, &blast_bv(bdd, env, b)?),
        BvTerm::RotateLeft(a, k) => blast_bv(bdd, env, a)?.rotate_left(*k),
        BvTerm::RotateRight(a, k) => blast_bv(bdd, env, a)?.rotate_right(*k),
    })
}

fn blast(bdd: &Bdd, env: &HashMap<VarId, BitVec>, term: &BoolTerm) -> Result<Ref> {
    Ok(match term {
        BoolTerm::Eq(a, b) => blast_bv(bdd, env, a)?.eq(bdd, &blast_bv(bdd, env, b)?),
        BoolTerm::Ult(a, b) => blast_bv(bdd, env, a)?.ult(bdd, &blast_bv(bdd, env, b)?),
        BoolTerm::Ule(a, b) => blast_bv(bdd, env, a)?.ule(bdd, &blast_bv(bdd, env, b)?),
        BoolTerm::Uge(a, b) => blast_bv(bdd, env, a)?.uge(bdd, &blast_bv(bdd, env, b)?),
        BoolTerm::And(ts) => {
            let mut res = bdd.one;
            for t in ts {
                res = bdd.apply_and(res, blast(bdd, env, t)?);
            }
            res
        }
        BoolTerm::Or(ts) => {
            let mut res = bdd.zero;
            for t in ts {
                res = bdd.apply_or(res, blast(bdd, env, t)?);
            }
            res
        }
        BoolTerm::Not(t) => -blast(bdd, env, t)?,
    })
}

impl Backend for BddSolver {
    fn declare_var(&mut self, var: VarId, name: &str) -> Result<()> {
        if self.is_declared(var) {
            return Err(Error::Backend(format!("variable v{} declared twice", var)));
        }
        self.names.push((var, name.to_string()));
        self.state = State::Unchecked;
        Ok(())
    }

    fn assert(&mut self, term: &BoolTerm) -> Result<()> {
        self.check_declared(term)?;
        self.hard.push(term.clone());
        self.state = State::Unchecked;
        Ok(())
    }

    fn assert_and_track(&mut self, term: &BoolTerm, label: &str) -> Result<()> {
        self.check_declared(term)?;
        if self.tracked.iter().any(|(l, _)| l == label) {
            return Err(Error::DuplicateLabel(label.to_string()));
        }
        self.tracked.push((label.to_string(), term.clone()));
        self.state = State::Unchecked;
        Ok(())
    }

    fn check(&mut self, deadline: Option<Instant>) -> Result<SatResult> {
        self.deadline = deadline;
        self.state = State::Unchecked;
        check_deadline(deadline)?;

        let vars: Vec<VarId> = self.names.iter().map(|(v, _)| *v).collect();
        let supports: Vec<Vec<VarId>> = self
            .hard
            .iter()
            .chain(self.tracked.iter().map(|(_, t)| t))
            .map(|t| t.vars())
            .collect();
        let clusters = order::clusters(&vars, &supports);
        debug!("{} variables in {} clusters", vars.len(), clusters.len());
        let levels = order::assign_levels(&clusters, WIDTH as usize);

        let bdd = Bdd::default();
        let env: HashMap<VarId, BitVec> = levels
            .iter()
            .map(|(&v, bits)| (v, BitVec::from_vars(&bdd, bits)))
            .collect();

        let mut hard = bdd.one;
        for term in &self.hard {
            check_deadline(deadline)?;
            let f = blast(&bdd, &env, term)?;
            hard = bdd.apply_and(hard, f);
        }

        let mut root = hard;
        let mut tracked = Vec::with_capacity(self.tracked.len());
        for (label, term) in &self.tracked {
            check_deadline(deadline)?;
            let f = blast(&bdd, &env, term)?;
            debug!("{:?}: {} nodes", label, bdd.size(f));
            tracked.push(f);
            root = bdd.apply_and(root, f);
        }

        info!(
            "conjoined {} hard and {} tracked constraints, root size {}, {} nodes total, cache {} hits / {} misses",
            self.hard.len(),
            self.tracked.len(),
            bdd.size(root),
            bdd.num_nodes(),
            bdd.cache_hits(),
            bdd.cache_misses()
        );

        let result = if bdd.is_zero(root) {
            self.state = State::Unsat { hard, tracked };
            SatResult::Unsat
        } else {
            self.state = State::Sat { root, levels };
            SatResult::Sat
        };
        self.bdd = bdd;
        Ok(result)
    }

    fn model(&self, vars: &[VarId]) -> Result<Vec<u8>> {
        let (root, levels) = self.sat_levels()?;
        let path = self
            .bdd
            .one_sat(root)
            .ok_or_else(|| Error::Backend("satisfiable root has no path".to_string()))?;
        let positive: HashSet<u32> = path.iter().filter(|&&lit| lit > 0).map(|&lit| lit as u32).collect();

        vars.iter()
            .map(|var| {
                let bits = levels.get(var).ok_or(Error::UnknownVariable(*var))?;
                // Don't-care bits are read as zero.
                Ok(bits
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| positive.contains(*v))
                    .fold(0u8, |acc, (i, _)| acc | (1 << i)))
            })
            .collect()
    }

    fn unsat_core(&mut self) -> Result<Vec<String>> {
        let (hard, tracked) = match &self.state {
            State::Unsat { hard, tracked } => (*hard, tracked.clone()),
            _ => return Err(Error::Backend("no unsatisfiable check to explain".to_string())),
        };
        let bdd = &self.bdd;

        if bdd.is_zero(hard) {
            info!("hard constraints alone are infeasible");
            return Ok(Vec::new());
        }

        let mut keep = vec![true; tracked.len()];
        for i in 0..tracked.len() {
            check_deadline(self.deadline)?;
            keep[i] = false;
            let rest = bdd.apply_and_many(
                std::iter::once(hard).chain(tracked.iter().zip(&keep).filter(|(_, &k)| k).map(|(&f, _)| f)),
            );
            if !bdd.is_zero(rest) {
                keep[i] = true;
            } else {
                debug!("dropped {:?} from the core", self.tracked[i].0);
            }
        }

        let core: Vec<String> = self
            .tracked
            .iter()
            .zip(&keep)
            .filter(|(_, &k)| k)
            .map(|((label, _), _)| label.clone())
            .collect();
        info!("unsat core of {} out of {} labels", core.len(), tracked.len());
        Ok(core)
    }

    fn count_models(&self, vars: &[VarId]) -> Result<BigUint> {
        let (root, levels) = self.sat_levels()?;

        let mut kept: HashSet<u32> = HashSet::new();
        for var in vars {
            let bits = levels.get(var).ok_or(Error::UnknownVariable(*var))?;
            kept.extend(bits.iter().copied());
        }
        let total: usize = levels.values().map(|bits| bits.len()).sum();
        let quantified: HashSet<u32> = (1..=total as u32).filter(|v| !kept.contains(v)).collect();

        let projected = self.bdd.exists(root, &quantified);
        let count = self.bdd.sat_count(projected, total) >> quantified.len();
        debug!("projected onto {} bits: {} models", kept.len(), count);
        Ok(count)
    }
}
