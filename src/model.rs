use ndarray::Array2;

use crate::error::ModelError;

/// Immutable view of the observed mutation frequencies and read counts,
/// one row per sample and one column per mutation. Built once by the
/// loader and shared read-only by every search instance.
#[derive(Debug, Clone)]
pub struct FrequencyModel {
    freqs: Array2<f64>,
    var_reads: Array2<f64>,
    total_reads: Array2<f64>,
    omega: Array2<f64>,
    mutation_ids: Vec<String>,
    sample_ids: Vec<String>,
}

impl FrequencyModel {
    /// Builds the model from read-count matrices. When `rescale_depth` is
    /// set, frequencies are depth-normalized as `v / (omega * n)`; otherwise
    /// the raw `v / n` ratio is used. Either way the values are clamped to
    /// [0, 1] and fixed for the lifetime of the model.
    pub fn new(
        var_reads: Array2<f64>,
        total_reads: Array2<f64>,
        omega: Array2<f64>,
        mutation_ids: Vec<String>,
        sample_ids: Vec<String>,
        rescale_depth: bool,
    ) -> Result<Self, ModelError> {
        if var_reads.shape() != total_reads.shape() || var_reads.shape() != omega.shape() {
            return Err(ModelError::ShapeMismatch {
                var: var_reads.dim(),
                total: total_reads.dim(),
                omega: omega.dim(),
            });
        }
        let (n_samples, n_mutations) = var_reads.dim();
        if n_mutations == 0 {
            return Err(ModelError::NoMutations);
        }
        if n_samples == 0 {
            return Err(ModelError::NoSamples);
        }

        for s in 0..n_samples {
            for j in 0..n_mutations {
                let v = var_reads[[s, j]];
                let n = total_reads[[s, j]];
                let w = omega[[s, j]];
                if !v.is_finite() || !n.is_finite() || !w.is_finite() || v < 0.0 || n < 0.0 || w < 0.0
                {
                    return Err(ModelError::BadValue {
                        sample: s,
                        mutation: j,
                    });
                }
                if v > n {
                    return Err(ModelError::ExcessVarReads {
                        sample: s,
                        mutation: j,
                    });
                }
            }
        }

        let mut freqs = Array2::zeros((n_samples, n_mutations));
        for s in 0..n_samples {
            for j in 0..n_mutations {
                let v = var_reads[[s, j]];
                let n = total_reads[[s, j]];
                let w = omega[[s, j]];
                let f = if n == 0.0 {
                    0.0
                } else if rescale_depth {
                    if w == 0.0 {
                        0.0
                    } else {
                        v / (w * n)
                    }
                } else {
                    v / n
                };
                freqs[[s, j]] = f.clamp(0.0, 1.0);
            }
        }

        Ok(FrequencyModel {
            freqs,
            var_reads,
            total_reads,
            omega,
            mutation_ids,
            sample_ids,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.freqs.nrows()
    }

    pub fn n_mutations(&self) -> usize {
        self.freqs.ncols()
    }

    pub fn freq(&self, sample: usize, mutation: usize) -> f64 {
        self.freqs[[sample, mutation]]
    }

    pub fn var_reads(&self, sample: usize, mutation: usize) -> f64 {
        self.var_reads[[sample, mutation]]
    }

    pub fn total_reads(&self, sample: usize, mutation: usize) -> f64 {
        self.total_reads[[sample, mutation]]
    }

    pub fn omega(&self, sample: usize, mutation: usize) -> f64 {
        self.omega[[sample, mutation]]
    }

    /// Total observed frequency of a mutation across all samples. Drives the
    /// default descending-frequency node order.
    pub fn freq_sum(&self, mutation: usize) -> f64 {
        self.freqs.column(mutation).sum()
    }

    pub fn mutation_ids(&self) -> &[String] {
        &self.mutation_ids
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }
}
