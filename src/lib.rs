//! Reconstruction of tumor clonal phylogenies from mutation frequency data.
//!
//! Mutations are placed one at a time onto a growing rooted tree; at each
//! placement round only the most promising partial trees survive (beam
//! search, optionally stochastic). Many independently seeded search chains
//! run in parallel and their completed trees are pooled into the final
//! candidate set.

pub mod beam;
pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod parallel;
pub mod placement;
pub mod scorer;
pub mod search;
pub mod tree;

pub use config::{NodeOrder, SearchConfig, SearchMode};
pub use error::{ConfigError, InstanceError, ModelError, RunError};
pub use model::FrequencyModel;
pub use parallel::{run_search, AggregatedResult};
pub use scorer::LossFunction;
pub use search::{InstanceState, SearchInstance, SearchResult};
pub use tree::{CompletedTree, PartialTree};
