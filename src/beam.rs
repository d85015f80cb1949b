use rand::{Rng, RngCore};

use crate::config::SearchMode;
use crate::tree::PartialTree;

/// Selection policy: keep `width` trees out of a round's candidate set.
/// Candidates arrive in generation order, which is the tie-break everywhere.
pub trait Select {
    fn select(
        &self,
        candidates: Vec<PartialTree>,
        width: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<PartialTree>;
}

pub fn selector(mode: SearchMode) -> Box<dyn Select> {
    match mode {
        SearchMode::Deterministic => Box::new(TopKSelect),
        SearchMode::Stochastic => Box::new(GumbelSelect),
    }
}

/// Deterministic beam search: top `width` by score, earlier-generated
/// candidate wins ties.
pub struct TopKSelect;

impl Select for TopKSelect {
    fn select(
        &self,
        mut candidates: Vec<PartialTree>,
        width: usize,
        _rng: &mut dyn RngCore,
    ) -> Vec<PartialTree> {
        // Stable sort keeps generation order within equal scores.
        candidates.sort_by(|a, b| b.score().total_cmp(&a.score()));
        candidates.truncate(width);
        candidates
    }
}

/// Stochastic beam search: sample `width` candidates without replacement with
/// probability proportional to exp(score), by perturbing each score with
/// Gumbel noise and keeping the top keys. One draw is consumed per candidate
/// in generation order, so a fixed seed reproduces the same selection.
pub struct GumbelSelect;

impl Select for GumbelSelect {
    fn select(
        &self,
        candidates: Vec<PartialTree>,
        width: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<PartialTree> {
        let mut keyed: Vec<(f64, PartialTree)> = candidates
            .into_iter()
            .map(|tree| {
                let u: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
                let gumbel = -(-u.ln()).ln();
                let key = if tree.score() == f64::NEG_INFINITY {
                    f64::NEG_INFINITY
                } else {
                    tree.score() + gumbel
                };
                (key, tree)
            })
            .collect();
        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
        keyed.truncate(width);
        keyed.into_iter().map(|(_, tree)| tree).collect()
    }
}

/// One round's surviving trees. Rebuilt from scratch every round; rounds
/// never share tree state.
#[derive(Debug)]
pub struct Beam {
    trees: Vec<PartialTree>,
}

impl Beam {
    pub fn start(n_mutations: usize, n_samples: usize) -> Self {
        Beam {
            trees: vec![PartialTree::empty(n_mutations, n_samples)],
        }
    }

    pub fn from_selection(trees: Vec<PartialTree>) -> Self {
        Beam { trees }
    }

    pub fn trees(&self) -> &[PartialTree] {
        &self.trees
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn into_trees(self) -> Vec<PartialTree> {
        self.trees
    }
}
