use std::path::Path;

use anyhow::{Context, Result};

use super::model::MethodDataset;

/// Write every method's samples as one tidy CSV table
/// (`q,freq,method,branch`), in method then branch order.
pub fn write_branch_table(path: &Path, datasets: &[MethodDataset]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut rows = 0;
    for record in datasets.iter().flat_map(MethodDataset::to_records) {
        writer.serialize(&record).context("writing branch row")?;
        rows += 1;
    }
    writer.flush().context("flushing branch table")?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::phonon::read_branches_from_str;

    #[test]
    fn table_has_header_and_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("branches.csv");
        let dft = read_branches_from_str("0.0 1.0\n0.5 2.0\n\n0.0 3.0\n", "DFT");
        let dp = read_branches_from_str("0.0 1.1\n", "DP");

        let rows = write_branch_table(&path, &[dft, dp]).unwrap();
        assert_eq!(rows, 4);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "q,freq,method,branch");
        assert_eq!(lines[3], "0.0,3.0,DFT,1");
        assert_eq!(lines[4], "0.0,1.1,DP,0");
    }
}
