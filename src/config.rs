use clap::ValueEnum;

use crate::error::ConfigError;
use crate::scorer::LossFunction;

/// Mutation visitation order within one search instance. Held constant for
/// the whole instance; `Random` reshuffles per instance seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NodeOrder {
    /// Descending total frequency across samples (default).
    Frequency,
    /// Fixed input column order.
    Input,
    /// Shuffled from the instance's private random stream.
    Random,
}

/// Beam selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchMode {
    /// Keep the top beam_width candidates by score.
    Deterministic,
    /// Sample beam_width candidates without replacement, weighted by score.
    Stochastic,
}

/// Everything a run needs beyond the frequency data. Threaded explicitly
/// into the scheduler and copied per instance; there is no ambient global
/// state.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Max partial trees kept per placement round.
    pub beam_width: usize,
    /// Max candidate parents considered per tree per placement.
    pub branching_factor: usize,
    /// Candidate budget multiplier: at most expansion_factor * beam_width
    /// candidates are evaluated per round.
    pub expansion_factor: usize,
    /// Drop placements whose likelihood contribution is exactly zero.
    pub ignore_zero_probs: bool,
    /// Allow the root at most one child (single clonal origin).
    pub force_monoprimary: bool,
    /// Hard cap on candidates evaluated per round. 0 is legal and yields no
    /// candidates at all, so every instance exhausts immediately.
    pub max_placements: usize,
    pub loss: LossFunction,
    pub node_order: NodeOrder,
    pub mode: SearchMode,
    /// Number of independent search chains.
    pub num_instances: usize,
    /// Worker-pool concurrency bound.
    pub poolsize: usize,
    /// Global seed; per-instance seeds are derived from it.
    pub seed: u64,
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.beam_width == 0 {
            return Err(ConfigError::BeamWidth);
        }
        if self.branching_factor == 0 {
            return Err(ConfigError::BranchingFactor);
        }
        if self.expansion_factor == 0 {
            return Err(ConfigError::ExpansionFactor);
        }
        if self.num_instances == 0 {
            return Err(ConfigError::NumInstances);
        }
        if self.poolsize == 0 {
            return Err(ConfigError::Poolsize);
        }
        if self.max_placements != 0 && self.max_placements < self.beam_width {
            return Err(ConfigError::MaxPlacements {
                max_placements: self.max_placements,
                beam_width: self.beam_width,
            });
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            beam_width: 10,
            branching_factor: 20,
            expansion_factor: 4,
            ignore_zero_probs: false,
            force_monoprimary: false,
            max_placements: 10_000,
            loss: LossFunction::Binomial,
            node_order: NodeOrder::Frequency,
            mode: SearchMode::Deterministic,
            num_instances: 1,
            poolsize: 1,
            seed: 0,
        }
    }
}
