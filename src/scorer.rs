use clap::ValueEnum;
use statrs::function::gamma::ln_gamma;

use crate::model::FrequencyModel;

/// Closed set of scoring strategies. Selected once per run; every instance
/// resolves the same variant at configuration time. Higher scores mean a
/// more plausible tree throughout the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LossFunction {
    /// Binomial log-likelihood of the variant reads at success probability
    /// omega * phi. Exactly-zero likelihoods map to negative infinity.
    Binomial,
    /// Negative squared frequency deficit, scaled by read depth. Always
    /// finite, so it never triggers the zero-probability filter.
    Gaussian,
}

impl LossFunction {
    /// Log-likelihood contribution of assigning `phi_hat` (one value per
    /// sample) to `mutation`. Pure and deterministic: identical inputs give
    /// bit-identical results.
    pub fn placement_score(&self, model: &FrequencyModel, mutation: usize, phi_hat: &[f64]) -> f64 {
        let mut total = 0.0;
        for (s, &phi) in phi_hat.iter().enumerate() {
            total += match self {
                LossFunction::Binomial => binomial_term(
                    model.var_reads(s, mutation),
                    model.total_reads(s, mutation),
                    (model.omega(s, mutation) * phi).clamp(0.0, 1.0),
                ),
                LossFunction::Gaussian => {
                    let deficit = model.freq(s, mutation) - phi;
                    -deficit * deficit * (model.total_reads(s, mutation) + 1.0) / 2.0
                }
            };
        }
        total
    }

    /// True when the placement's likelihood is exactly zero. Such a
    /// placement can never improve a tree's score.
    pub fn is_zero_probability(
        &self,
        model: &FrequencyModel,
        mutation: usize,
        phi_hat: &[f64],
    ) -> bool {
        self.placement_score(model, mutation, phi_hat) == f64::NEG_INFINITY
    }
}

/// Binomial log-pmf of `v` successes in `n` trials at probability `p`,
/// generalized to fractional counts through the gamma function.
fn binomial_term(v: f64, n: f64, p: f64) -> f64 {
    if p == 0.0 {
        return if v > 0.0 { f64::NEG_INFINITY } else { 0.0 };
    }
    if p == 1.0 {
        return if v < n { f64::NEG_INFINITY } else { 0.0 };
    }
    ln_choose(n, v) + v * p.ln() + (n - v) * (1.0 - p).ln()
}

fn ln_choose(n: f64, k: f64) -> f64 {
    ln_gamma(n + 1.0) - ln_gamma(k + 1.0) - ln_gamma(n - k + 1.0)
}
