use serde::Serialize;

use crate::model::FrequencyModel;

/// Parent-vector slot for a mutation that has not been placed yet.
pub const UNPLACED: i32 = -1;

/// A rooted clonal tree over a subset of the mutations.
///
/// Parent relationships are held as a parent vector indexed by mutation,
/// with `n` (the mutation count) as the root sentinel. Each placed node
/// carries the frequency mass assigned to it at placement time (`phi`) and
/// the mass still assignable beneath it (`headroom`); the root starts with
/// headroom 1.0 in every sample. Candidate trees are value copies, so no
/// state is shared between rounds or between beam entries.
#[derive(Debug, Clone)]
pub struct PartialTree {
    parent: Vec<i32>,
    /// Flattened node x sample, mass assigned at placement.
    phi: Vec<f64>,
    /// Flattened node x sample over n + 1 nodes; row n is the root.
    headroom: Vec<f64>,
    n_samples: usize,
    n_placed: usize,
    root_children: usize,
    score: f64,
}

impl PartialTree {
    pub fn empty(n_mutations: usize, n_samples: usize) -> Self {
        let mut headroom = vec![0.0; (n_mutations + 1) * n_samples];
        for s in 0..n_samples {
            headroom[n_mutations * n_samples + s] = 1.0;
        }
        PartialTree {
            parent: vec![UNPLACED; n_mutations],
            phi: vec![0.0; n_mutations * n_samples],
            headroom,
            n_samples,
            n_placed: 0,
            root_children: 0,
            score: 0.0,
        }
    }

    /// Node index of the root sentinel.
    pub fn root(&self) -> usize {
        self.parent.len()
    }

    pub fn n_mutations(&self) -> usize {
        self.parent.len()
    }

    pub fn is_placed(&self, mutation: usize) -> bool {
        self.parent[mutation] != UNPLACED
    }

    pub fn n_placed(&self) -> usize {
        self.n_placed
    }

    pub fn is_complete(&self) -> bool {
        self.n_placed == self.parent.len()
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn root_child_count(&self) -> usize {
        self.root_children
    }

    pub fn parent_vector(&self) -> &[i32] {
        &self.parent
    }

    /// Placed mutations plus the root, i.e. every legal attachment point.
    pub fn attachment_points(&self) -> impl Iterator<Item = usize> + '_ {
        let root = self.root();
        (0..self.parent.len())
            .filter(move |&j| self.parent[j] != UNPLACED)
            .chain(std::iter::once(root))
    }

    pub fn headroom(&self, node: usize, sample: usize) -> f64 {
        self.headroom[node * self.n_samples + sample]
    }

    pub fn phi(&self, mutation: usize, sample: usize) -> f64 {
        self.phi[mutation * self.n_samples + sample]
    }

    /// Per-sample mass that `mutation` would receive under `parent`: its
    /// observed frequency, capped by the parent's remaining headroom.
    pub fn assignable(&self, parent: usize, mutation: usize, model: &FrequencyModel) -> Vec<f64> {
        (0..self.n_samples)
            .map(|s| model.freq(s, mutation).min(self.headroom(parent, s)))
            .collect()
    }

    /// Value copy of this tree with `mutation` attached under `parent`.
    /// `phi_hat` must come from [`assignable`] on the same tree, and
    /// `score_delta` from the scorer for that assignment.
    pub fn attach(
        &self,
        mutation: usize,
        parent: usize,
        phi_hat: &[f64],
        score_delta: f64,
    ) -> PartialTree {
        debug_assert_eq!(self.parent[mutation], UNPLACED);
        debug_assert_eq!(phi_hat.len(), self.n_samples);
        let mut next = self.clone();
        next.parent[mutation] = parent as i32;
        for (s, &p) in phi_hat.iter().enumerate() {
            next.headroom[parent * self.n_samples + s] -= p;
            next.headroom[mutation * self.n_samples + s] = p;
            next.phi[mutation * self.n_samples + s] = p;
        }
        next.n_placed += 1;
        if parent == self.root() {
            next.root_children += 1;
        }
        next.score += score_delta;
        next
    }

    pub fn into_completed(self, instance: usize, seed: u64) -> CompletedTree {
        debug_assert!(self.is_complete());
        let n = self.parent.len();
        let phi = (0..n)
            .map(|j| self.phi[j * self.n_samples..(j + 1) * self.n_samples].to_vec())
            .collect();
        CompletedTree {
            parents: self.parent,
            phi,
            score: self.score,
            instance,
            seed,
        }
    }
}

/// A fully built tree: every mutation placed exactly once. Immutable, and
/// carries the instance and derived seed that produced it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletedTree {
    /// Parent of each mutation; the value n (mutation count) is the root.
    pub parents: Vec<i32>,
    /// Frequency mass assigned to each mutation per sample.
    pub phi: Vec<Vec<f64>>,
    pub score: f64,
    pub instance: usize,
    pub seed: u64,
}

impl CompletedTree {
    pub fn n_mutations(&self) -> usize {
        self.parents.len()
    }

    /// Parent node of a mutation, with `n_mutations()` meaning the root.
    pub fn parent_of(&self, mutation: usize) -> usize {
        self.parents[mutation] as usize
    }

    /// True when every node is placed and every lineage terminates at the
    /// root without revisiting a node.
    pub fn is_valid_topology(&self) -> bool {
        let n = self.parents.len();
        for start in 0..n {
            let mut node = start;
            let mut steps = 0;
            loop {
                let p = self.parents[node];
                if p < 0 || p > n as i32 {
                    return false;
                }
                if p == n as i32 {
                    break;
                }
                node = p as usize;
                steps += 1;
                if steps > n {
                    return false; // cycle
                }
            }
        }
        true
    }

    pub fn root_child_count(&self) -> usize {
        let n = self.parents.len() as i32;
        self.parents.iter().filter(|&&p| p == n).count()
    }
}
