use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use bosque::input;
use bosque::parallel::{run_search, AggregatedResult};
use bosque::{LossFunction, NodeOrder, SearchConfig, SearchMode};

#[derive(Debug, Parser)]
#[clap(name = "bosque")]
#[clap(about = "Reconstruction of tumor clonal phylogenies by parallel beam search.", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for clonal trees explaining the observed mutation frequencies
    #[clap(arg_required_else_help = true)]
    Search {
        /// input path for the variant read-count csv (mutations x samples)
        #[clap(short, long, value_parser, required = true)]
        var_reads: PathBuf,

        /// input path for the total read-count csv (mutations x samples)
        #[clap(short, long, value_parser, required = true)]
        total_reads: PathBuf,

        /// output path for the result json
        #[clap(short, long, value_parser, required = true)]
        output: PathBuf,

        /// variant read probability applied to every mutation
        #[clap(long, value_parser, default_value_t = 0.5)]
        omega: f64,

        /// depth-normalize frequencies by omega before searching
        #[clap(long, value_parser, default_value_t = false)]
        rescale_depth: bool,

        /// max partial trees kept per placement round
        #[clap(short, long, value_parser, default_value_t = 10)]
        beam_width: usize,

        /// max parent candidates considered per tree
        #[clap(long, value_parser, default_value_t = 20)]
        branching_factor: usize,

        /// candidate budget multiplier per round
        #[clap(long, value_parser, default_value_t = 4)]
        expansion_factor: usize,

        /// drop placements with exactly zero likelihood
        #[clap(long, value_parser, default_value_t = false)]
        ignore_zero_probs: bool,

        /// restrict the root to a single child
        #[clap(long, value_parser, default_value_t = false)]
        force_monoprimary: bool,

        /// hard cap on candidates evaluated per round
        #[clap(long, value_parser, default_value_t = 10000)]
        max_placements: usize,

        /// scoring strategy
        #[clap(long, value_enum, default_value = "binomial")]
        loss_function: LossFunction,

        /// mutation visitation order
        #[clap(long, value_enum, default_value = "frequency")]
        node_order: NodeOrder,

        /// beam selection policy
        #[clap(long, value_enum, default_value = "deterministic")]
        mode: SearchMode,

        /// number of independent search chains
        #[clap(short, long, value_parser, default_value_t = 10)]
        num_instances: usize,

        /// worker pool concurrency
        #[clap(short, long, value_parser, default_value_t = 4)]
        poolsize: usize,

        /// global reproducibility seed
        #[clap(short, long, value_parser, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    mutation_ids: &'a [String],
    sample_ids: &'a [String],
    #[serde(flatten)]
    result: &'a AggregatedResult,
}

fn search(
    var_reads: &PathBuf,
    total_reads: &PathBuf,
    output: &PathBuf,
    omega: f64,
    rescale_depth: bool,
    config: SearchConfig,
) -> Result<(), Box<dyn Error>> {
    let model = input::load_model(var_reads, total_reads, omega, rescale_depth)?;
    log::info!(
        "loaded {} mutations across {} samples",
        model.n_mutations(),
        model.n_samples()
    );
    let result = run_search(&model, &config)?;
    let out = SearchOutput {
        mutation_ids: model.mutation_ids(),
        sample_ids: model.sample_ids(),
        result: &result,
    };
    serde_json::to_writer_pretty(File::create(output)?, &out)?;
    println!(
        "wrote {} trees to {} (best score {:.4})",
        result.trees.len(),
        output.display(),
        result.trees[0].score
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Cli::parse();
    match args.command {
        Commands::Search {
            var_reads,
            total_reads,
            output,
            omega,
            rescale_depth,
            beam_width,
            branching_factor,
            expansion_factor,
            ignore_zero_probs,
            force_monoprimary,
            max_placements,
            loss_function,
            node_order,
            mode,
            num_instances,
            poolsize,
            seed,
        } => {
            let config = SearchConfig {
                beam_width,
                branching_factor,
                expansion_factor,
                ignore_zero_probs,
                force_monoprimary,
                max_placements,
                loss: loss_function,
                node_order,
                mode,
                num_instances,
                poolsize,
                seed,
            };
            if let Err(e) = search(
                &var_reads,
                &total_reads,
                &output,
                omega,
                rescale_depth,
                config,
            ) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
