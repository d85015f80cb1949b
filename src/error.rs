use thiserror::Error;

/// Rejected configurations. All of these are detected before any search
/// instance is dispatched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("beam_width must be at least 1")]
    BeamWidth,

    #[error("branching_factor must be at least 1")]
    BranchingFactor,

    #[error("expansion_factor must be at least 1")]
    ExpansionFactor,

    #[error("num_instances must be at least 1")]
    NumInstances,

    #[error("poolsize must be at least 1")]
    Poolsize,

    #[error("max_placements ({max_placements}) must be 0 or at least beam_width ({beam_width})")]
    MaxPlacements {
        max_placements: usize,
        beam_width: usize,
    },
}

/// Malformed frequency data, caught when the model is built.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("frequency model has no mutations")]
    NoMutations,

    #[error("frequency model has no samples")]
    NoSamples,

    #[error("matrix shapes disagree: var_reads {var:?}, total_reads {total:?}, omega {omega:?}")]
    ShapeMismatch {
        var: (usize, usize),
        total: (usize, usize),
        omega: (usize, usize),
    },

    #[error("non-finite or negative value at sample {sample}, mutation {mutation}")]
    BadValue { sample: usize, mutation: usize },

    #[error("var_reads exceed total_reads at sample {sample}, mutation {mutation}")]
    ExcessVarReads { sample: usize, mutation: usize },
}

/// A failure inside a single search instance. The scheduler recovers these
/// locally; they never terminate the run on their own.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("instance {instance}: non-finite score while placing mutation {mutation}")]
    NonFiniteScore { instance: usize, mutation: usize },
}

/// Run-level failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error(
        "no valid trees found across {instances} instances \
         ({explored} branches explored, {cut} cut); consider increasing \
         beam_width or max_placements, or disabling force_monoprimary"
    )]
    NoValidTrees {
        instances: usize,
        explored: u64,
        cut: u64,
    },
}
