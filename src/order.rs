//! Static variable ordering for bit-blasted constraints.
//!
//! BDD size depends heavily on the variable order: related bits should sit
//! close together. Before blasting, variables that share a constraint are
//! grouped into clusters (connected components of the "appears together"
//! relation). Each cluster occupies a contiguous block of BDD levels, and
//! inside a block the bits of its members are interleaved from the least
//! significant bit upwards, which keeps ripple-carry arithmetic narrow.
//!
//! Independent clusters then conjoin without interaction, so the size of the
//! final BDD is the sum of the cluster sizes rather than their product.

use std::collections::HashMap;

use crate::term::VarId;

/// Disjoint-set forest over `0..n`.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Keep the earliest member as the representative.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Group `vars` into clusters of variables connected through `supports`.
///
/// Clusters are ordered by their first member in `vars`, members keep
/// their relative order from `vars`. Variables outside `vars` are ignored.
pub fn clusters(vars: &[VarId], supports: &[Vec<VarId>]) -> Vec<Vec<VarId>> {
    let position: HashMap<VarId, usize> = vars.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let mut uf = UnionFind::new(vars.len());

    for support in supports {
        let mut members = support.iter().filter_map(|v| position.get(v).copied());
        if let Some(first) = members.next() {
            for other in members {
                uf.union(first, other);
            }
        }
    }

    let mut groups: Vec<Vec<VarId>> = Vec::new();
    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    for (i, &v) in vars.iter().enumerate() {
        let root = uf.find(i);
        let g = *group_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[g].push(v);
    }
    groups
}

/// Assign BDD variable indices (1-based) to every bit of every variable.
///
/// Returns, per variable, its bit indices from least to most significant.
pub fn assign_levels(clusters: &[Vec<VarId>], width: usize) -> HashMap<VarId, Vec<u32>> {
    let mut levels: HashMap<VarId, Vec<u32>> = HashMap::new();
    let mut next: u32 = 1;
    for cluster in clusters {
        for _ in 0..width {
            for &v in cluster {
                levels.entry(v).or_insert_with(|| Vec::with_capacity(width)).push(next);
                next += 1;
            }
        }
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clusters_follow_shared_constraints() {
        let vars: Vec<VarId> = (0..6).collect();
        let supports = vec![vec![0, 3], vec![3, 5], vec![1], vec![2, 4]];
        let groups = clusters(&vars, &supports);
        assert_eq!(groups, vec![vec![0, 3, 5], vec![1], vec![2, 4]]);
    }

    #[test]
    fn test_unconstrained_vars_are_singletons() {
        let vars: Vec<VarId> = vec![4, 2, 9];
        let groups = clusters(&vars, &[]);
        assert_eq!(groups, vec![vec![4], vec![2], vec![9]]);
    }

    #[test]
    fn test_unknown_vars_in_supports_are_ignored() {
        let vars: Vec<VarId> = vec![0, 1];
        let groups = clusters(&vars, &[vec![0, 42, 1]]);
        assert_eq!(groups, vec![vec![0, 1]]);
    }

    #[test]
    fn test_assign_levels_interleaves_bits() {
        let groups = vec![vec![0, 1], vec![2]];
        let levels = assign_levels(&groups, 3);
        assert_eq!(levels[&0], vec![1, 3, 5]);
        assert_eq!(levels[&1], vec![2, 4, 6]);
        assert_eq!(levels[&2], vec![7, 8, 9]);
    }
}
