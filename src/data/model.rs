use serde::Serialize;

// ---------------------------------------------------------------------------
// FrequencySample – one (q, frequency) point of a dispersion curve
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencySample {
    /// Distance along the wavevector path.
    pub q: f64,
    /// Phonon frequency (THz).
    pub freq: f64,
}

// ---------------------------------------------------------------------------
// Branch – a blank-line delimited run of samples
// ---------------------------------------------------------------------------

/// One dispersion segment, numbered by its position in the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub method: String,
    /// Zero-based position of occurrence.
    pub index: usize,
    pub samples: Vec<FrequencySample>,
}

impl Branch {
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.samples.iter().map(|s| (s.q, s.freq)).collect()
    }
}

// ---------------------------------------------------------------------------
// MethodDataset – everything read from one method's file
// ---------------------------------------------------------------------------

/// All branches plus the high-symmetry points of one computation method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodDataset {
    pub method: String,
    pub branches: Vec<Branch>,
    pub high_symmetry_points: Vec<f64>,
}

/// Flat row of the tidy branch table: one per sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchRecord {
    pub q: f64,
    pub freq: f64,
    pub method: String,
    pub branch: usize,
}

impl MethodDataset {
    /// Total number of samples over all branches.
    pub fn sample_count(&self) -> usize {
        self.branches.iter().map(|b| b.samples.len()).sum()
    }

    pub fn samples(&self) -> impl Iterator<Item = &FrequencySample> {
        self.branches.iter().flat_map(|b| b.samples.iter())
    }

    /// `(min, max)` over finite frequencies, `None` when there are none.
    pub fn frequency_bounds(&self) -> Option<(f64, f64)> {
        finite_bounds(self.samples().map(|s| s.freq))
    }

    /// `(min, max)` over finite wavevector coordinates.
    pub fn q_bounds(&self) -> Option<(f64, f64)> {
        finite_bounds(self.samples().map(|s| s.q))
    }

    /// Flatten into `(q, freq, method, branch)` rows.
    pub fn to_records(&self) -> Vec<BranchRecord> {
        self.branches
            .iter()
            .flat_map(|b| {
                b.samples.iter().map(move |s| BranchRecord {
                    q: s.q,
                    freq: s.freq,
                    method: b.method.clone(),
                    branch: b.index,
                })
            })
            .collect()
    }
}

/// Min/max of the finite values of an iterator.
pub fn finite_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

// ---------------------------------------------------------------------------
// LossTable – parsed training log
// ---------------------------------------------------------------------------

/// Column names from the header plus one row of values per training step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl LossTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
