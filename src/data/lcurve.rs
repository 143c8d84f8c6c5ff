use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::LossTable;

/// Errors raised while loading or querying a training log.
#[derive(Debug, Error)]
pub enum LossCurveError {
    #[error("cannot read training log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("training log has no header line")]
    MissingHeader,

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("column '{name}' is not in the training log header")]
    MissingColumn { name: String },
}

/// Load a DeePMD style `lcurve.out`.
pub fn read_loss_table(path: &Path) -> Result<LossTable, LossCurveError> {
    let text = std::fs::read_to_string(path).map_err(|source| LossCurveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_loss_table(&text)
}

/// The first line is the header: its first token (the comment marker) is
/// dropped and the rest name the columns. Every later non-blank line, with
/// `#` comments stripped, must hold one float per column.
pub fn parse_loss_table(text: &str) -> Result<LossTable, LossCurveError> {
    let mut lines = text.lines().enumerate();
    let (_, header) = lines.next().ok_or(LossCurveError::MissingHeader)?;
    let columns: Vec<String> = header.split_whitespace().skip(1).map(str::to_string).collect();
    if columns.is_empty() {
        return Err(LossCurveError::MissingHeader);
    }

    let mut rows = Vec::new();
    for (idx, raw) in lines {
        let line_no = idx + 1;
        let data = raw.split('#').next().unwrap_or("").trim();
        if data.is_empty() {
            continue;
        }
        let row = data
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>().map_err(|_| LossCurveError::Parse {
                    line: line_no,
                    reason: format!("'{tok}' is not a number"),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        if row.len() != columns.len() {
            return Err(LossCurveError::Parse {
                line: line_no,
                reason: format!("expected {} values, found {}", columns.len(), row.len()),
            });
        }
        rows.push(row);
    }

    Ok(LossTable { columns, rows })
}

impl LossTable {
    /// Check that every requested column exists before anything is drawn.
    pub fn require_columns<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), LossCurveError> {
        for name in names {
            if self.column_index(name).is_none() {
                return Err(LossCurveError::MissingColumn {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// `(step, value)` pairs for each requested column.
    pub fn series_against(
        &self,
        step_column: &str,
        columns: &[String],
    ) -> Result<Vec<(String, Vec<(f64, f64)>)>, LossCurveError> {
        self.require_columns(std::iter::once(step_column).chain(columns.iter().map(String::as_str)))?;
        let steps = self.column(step_column).unwrap_or_default();
        Ok(columns
            .iter()
            .map(|name| {
                let values = self.column(name).unwrap_or_default();
                let points = steps.iter().copied().zip(values).collect();
                (name.clone(), points)
            })
            .collect())
    }
}
