use std::sync::Arc;

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::SearchConfig;
use crate::error::{InstanceError, RunError};
use crate::model::FrequencyModel;
use crate::search::{SearchInstance, SearchResult};
use crate::tree::CompletedTree;

/// Per-instance seeds are reduced modulo this bound.
pub const MAX_SEED: u64 = 1 << 32;

/// Deterministic per-instance seed: a function of the global seed and the
/// instance index only, so results do not depend on worker count or
/// completion order.
pub fn derived_seed(global_seed: u64, instance: usize) -> u64 {
    global_seed.wrapping_add(instance as u64 + 1) % MAX_SEED
}

/// Final candidate pool: every instance's completed trees concatenated and
/// sorted by score, with summed counters. No deduplication is performed;
/// structurally identical trees from different instances appear repeatedly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedResult {
    pub trees: Vec<CompletedTree>,
    pub branches_explored: u64,
    pub branches_cut: u64,
    /// The global seed the run was launched with.
    pub seed: u64,
    /// Indices of instances that failed and were recovered as zero-tree
    /// results.
    pub failed_instances: Vec<usize>,
}

/// Runs `num_instances` independent search chains across a worker pool of
/// `poolsize` threads and aggregates their results. Instance failures are
/// logged and recovered; only an all-instances-empty outcome is fatal.
pub fn run_search(
    model: &FrequencyModel,
    config: &SearchConfig,
) -> Result<AggregatedResult, RunError> {
    config.validate()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.poolsize)
        .build()?;
    let progress = Arc::new(ProgressBar::new(config.num_instances as u64));

    let results: Vec<Result<SearchResult, InstanceError>> = pool.install(|| {
        (0..config.num_instances)
            .into_par_iter()
            .map(|i| {
                let mut instance =
                    SearchInstance::new(model, config, i, derived_seed(config.seed, i));
                let result = instance.run();
                progress.inc(1);
                result
            })
            .collect()
    });
    progress.finish_and_clear();

    aggregate(results, config.seed, config.num_instances)
}

/// Merges per-instance outcomes into the final pool. Public so failure
/// isolation can be exercised without contriving a faulting model.
pub fn aggregate(
    results: Vec<Result<SearchResult, InstanceError>>,
    seed: u64,
    num_instances: usize,
) -> Result<AggregatedResult, RunError> {
    let mut trees: Vec<CompletedTree> = Vec::new();
    let mut branches_explored = 0u64;
    let mut branches_cut = 0u64;
    let mut failed_instances = Vec::new();

    for (i, result) in results.into_iter().enumerate() {
        match result {
            Ok(r) => {
                trees.extend(r.trees);
                branches_explored += r.branches_explored;
                branches_cut += r.branches_cut;
            }
            Err(e) => {
                log::warn!("search instance {} failed: {}", i, e);
                failed_instances.push(i);
            }
        }
    }

    if trees.is_empty() {
        return Err(RunError::NoValidTrees {
            instances: num_instances,
            explored: branches_explored,
            cut: branches_cut,
        });
    }

    // Stable sort on a deterministic concatenation order keeps the final
    // ranking reproducible across runs.
    trees.sort_by(|a, b| b.score.total_cmp(&a.score));
    log::info!(
        "aggregated {} trees from {} instances ({} explored, {} cut)",
        trees.len(),
        num_instances,
        branches_explored,
        branches_cut
    );

    Ok(AggregatedResult {
        trees,
        branches_explored,
        branches_cut,
        seed,
        failed_instances,
    })
}
