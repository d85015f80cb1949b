use crate::beam::Beam;
use crate::config::SearchConfig;
use crate::error::InstanceError;
use crate::model::FrequencyModel;
use crate::scorer::LossFunction;
use crate::tree::PartialTree;

/// Per-instance search accounting. `explored` counts every candidate
/// placement that was scored; `cut` counts explored candidates later
/// rejected by the branching limit, the monoprimary constraint, or beam
/// truncation. Zero-probability placements skipped under
/// `ignore_zero_probs` are never materialized and touch neither counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct Counters {
    pub explored: u64,
    pub cut: u64,
}

/// Enumerates candidate attachments of one mutation across every tree in
/// the beam, applying the pruning policies in order: branching limit,
/// round budget (expansion factor and max-placements cap), zero-probability
/// filter, monoprimary constraint.
pub struct PlacementGenerator<'a> {
    model: &'a FrequencyModel,
    loss: LossFunction,
    instance: usize,
    branching_factor: usize,
    expansion_factor: usize,
    ignore_zero_probs: bool,
    force_monoprimary: bool,
    max_placements: usize,
}

impl<'a> PlacementGenerator<'a> {
    pub fn new(model: &'a FrequencyModel, config: &SearchConfig, instance: usize) -> Self {
        PlacementGenerator {
            model,
            loss: config.loss,
            instance,
            branching_factor: config.branching_factor,
            expansion_factor: config.expansion_factor,
            ignore_zero_probs: config.ignore_zero_probs,
            force_monoprimary: config.force_monoprimary,
            max_placements: config.max_placements,
        }
    }

    /// One placement round: every tree in the beam times every ranked
    /// attachment point, bounded by the round budget. Returns the
    /// materialized candidates in generation order.
    pub fn round(
        &self,
        beam: &Beam,
        mutation: usize,
        width: usize,
        counters: &mut Counters,
    ) -> Result<Vec<PartialTree>, InstanceError> {
        let budget = self
            .expansion_factor
            .saturating_mul(width)
            .min(self.max_placements);
        let mut candidates = Vec::new();
        let mut evaluated = 0usize;

        'round: for tree in beam.trees() {
            // Rank attachment points by how much of the mutation's observed
            // frequency they can actually absorb. Stable sort leaves equal
            // suitabilities in node order, root last.
            let mut parents: Vec<(usize, f64)> = tree
                .attachment_points()
                .map(|p| {
                    let suit: f64 = (0..self.model.n_samples())
                        .map(|s| self.model.freq(s, mutation).min(tree.headroom(p, s)))
                        .sum();
                    (p, suit)
                })
                .collect();
            parents.sort_by(|a, b| b.1.total_cmp(&a.1));

            for (rank, &(parent, _)) in parents.iter().enumerate() {
                if evaluated == budget {
                    break 'round;
                }
                let phi_hat = tree.assignable(parent, mutation, self.model);
                let delta = self.loss.placement_score(self.model, mutation, &phi_hat);
                if delta.is_nan() {
                    return Err(InstanceError::NonFiniteScore {
                        instance: self.instance,
                        mutation,
                    });
                }
                if self.ignore_zero_probs && delta == f64::NEG_INFINITY {
                    continue;
                }
                evaluated += 1;
                counters.explored += 1;
                if rank >= self.branching_factor {
                    counters.cut += 1;
                    continue;
                }
                if self.force_monoprimary
                    && parent == tree.root()
                    && tree.root_child_count() >= 1
                {
                    counters.cut += 1;
                    continue;
                }
                candidates.push(tree.attach(mutation, parent, &phi_hat, delta));
            }
        }
        Ok(candidates)
    }
}
