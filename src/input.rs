use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::Reader;
use ndarray::Array2;

use crate::model::FrequencyModel;

/// Reads a read-count matrix: one row per mutation, first column the
/// mutation name, remaining columns one per sample (sample names in the
/// header). Returns (sample names, mutation names, per-mutation rows).
pub fn read_counts<R: Read>(
    reader: R,
) -> Result<(Vec<String>, Vec<String>, Vec<Vec<f64>>), Box<dyn Error>> {
    let mut rdr = Reader::from_reader(reader);
    let sample_ids: Vec<String> = rdr.headers()?.iter().skip(1).map(|s| s.to_string()).collect();
    let mut mutation_ids = Vec::new();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let name = record
            .get(0)
            .ok_or("missing mutation name column")?
            .to_string();
        let values = record
            .iter()
            .skip(1)
            .map(|x| x.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()?;
        if values.len() != sample_ids.len() {
            return Err(format!(
                "mutation {}: expected {} sample columns, found {}",
                name,
                sample_ids.len(),
                values.len()
            )
            .into());
        }
        mutation_ids.push(name);
        rows.push(values);
    }
    Ok((sample_ids, mutation_ids, rows))
}

pub fn read_counts_file(
    path: &Path,
) -> Result<(Vec<String>, Vec<String>, Vec<Vec<f64>>), Box<dyn Error>> {
    read_counts(File::open(path)?)
}

/// Builds the frequency model from variant and total read-count files, with
/// a constant variant-read probability. Depth rescaling, when requested,
/// happens here and never again.
pub fn load_model(
    var_path: &Path,
    total_path: &Path,
    omega: f64,
    rescale_depth: bool,
) -> Result<FrequencyModel, Box<dyn Error>> {
    let (sample_ids, mutation_ids, var_rows) = read_counts_file(var_path)?;
    let (total_samples, total_mutations, total_rows) = read_counts_file(total_path)?;
    if sample_ids != total_samples || mutation_ids != total_mutations {
        return Err("var_reads and total_reads files disagree on samples or mutations".into());
    }

    let n_samples = sample_ids.len();
    let n_mutations = mutation_ids.len();
    // Input rows are per mutation; the model is samples x mutations.
    let mut var = Array2::zeros((n_samples, n_mutations));
    let mut total = Array2::zeros((n_samples, n_mutations));
    for j in 0..n_mutations {
        for s in 0..n_samples {
            var[[s, j]] = var_rows[j][s];
            total[[s, j]] = total_rows[j][s];
        }
    }
    let omega = Array2::from_elem((n_samples, n_mutations), omega);

    Ok(FrequencyModel::new(
        var,
        total,
        omega,
        mutation_ids,
        sample_ids,
        rescale_depth,
    )?)
}
