use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::beam::{selector, Beam, Select};
use crate::config::{NodeOrder, SearchConfig};
use crate::error::InstanceError;
use crate::model::FrequencyModel;
use crate::placement::{Counters, PlacementGenerator};
use crate::tree::CompletedTree;

/// Lifecycle of one search chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    Initialized,
    Searching,
    /// Every surviving tree has all mutations placed.
    Done,
    /// The beam emptied before all mutations were placed. A legitimate
    /// terminal state: the instance contributes zero trees.
    Exhausted,
}

/// What one instance hands back to the scheduler.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Completed trees in descending score order.
    pub trees: Vec<CompletedTree>,
    pub branches_explored: u64,
    pub branches_cut: u64,
}

/// One independent run of (stochastic) beam search from an empty tree to a
/// terminal state. Owns its beam, its random stream, and its counters;
/// shares nothing mutable with sibling instances.
pub struct SearchInstance<'a> {
    model: &'a FrequencyModel,
    config: &'a SearchConfig,
    index: usize,
    seed: u64,
    rng: ChaCha8Rng,
    node_order: Vec<usize>,
    state: InstanceState,
}

impl<'a> SearchInstance<'a> {
    /// `seed` is this instance's derived seed, not the global one.
    pub fn new(
        model: &'a FrequencyModel,
        config: &'a SearchConfig,
        index: usize,
        seed: u64,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let node_order = node_order(model, config.node_order, &mut rng);
        SearchInstance {
            model,
            config,
            index,
            seed,
            rng,
            node_order,
            state: InstanceState::Initialized,
        }
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn node_order(&self) -> &[usize] {
        &self.node_order
    }

    /// Runs the instance to a terminal state. A scorer fault terminates
    /// only this instance; the caller decides what to do with the error.
    pub fn run(&mut self) -> Result<SearchResult, InstanceError> {
        let generator = PlacementGenerator::new(self.model, self.config, self.index);
        let select: Box<dyn Select> = selector(self.config.mode);
        let mut counters = Counters::default();
        let mut beam = Beam::start(self.model.n_mutations(), self.model.n_samples());

        self.state = InstanceState::Searching;
        for round in 0..self.node_order.len() {
            let mutation = self.node_order[round];
            let candidates =
                generator.round(&beam, mutation, self.config.beam_width, &mut counters)?;
            let n_candidates = candidates.len();
            let kept = select.select(candidates, self.config.beam_width, &mut self.rng);
            counters.cut += (n_candidates - kept.len()) as u64;
            if kept.is_empty() {
                self.state = InstanceState::Exhausted;
                return Ok(SearchResult {
                    trees: Vec::new(),
                    branches_explored: counters.explored,
                    branches_cut: counters.cut,
                });
            }
            beam = Beam::from_selection(kept);
        }
        self.state = InstanceState::Done;

        let mut trees: Vec<CompletedTree> = beam
            .into_trees()
            .into_iter()
            .map(|t| t.into_completed(self.index, self.seed))
            .collect();
        trees.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(SearchResult {
            trees,
            branches_explored: counters.explored,
            branches_cut: counters.cut,
        })
    }
}

fn node_order(model: &FrequencyModel, policy: NodeOrder, rng: &mut ChaCha8Rng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..model.n_mutations()).collect();
    match policy {
        NodeOrder::Input => {}
        NodeOrder::Frequency => {
            // Descending total frequency, index ascending on ties.
            order.sort_by(|&a, &b| model.freq_sum(b).total_cmp(&model.freq_sum(a)));
        }
        NodeOrder::Random => order.shuffle(rng),
    }
    order
}
