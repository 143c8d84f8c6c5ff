//! Run configuration.
//!
//! Every command reads its section of [`Config`]. Values come from built-in
//! defaults, optionally overridden by a JSON file (`--config`), then by
//! command-line flags.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::color::{default_styles, StyleSpec};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub phonon: PhononConfig,
    pub lcurve: LossCurveConfig,
    pub split: SplitConfig,
}

impl Config {
    /// Load a JSON config file; missing sections and fields keep defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Figure geometry
// ---------------------------------------------------------------------------

/// Physical figure size; pixel size is `inches × dpi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FigureConfig {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl FigureConfig {
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round().max(1.0) as u32,
            (self.height_in * self.dpi as f64).round().max(1.0) as u32,
        )
    }

    /// Pixels per typographic point.
    pub fn px_per_pt(&self) -> f64 {
        self.dpi as f64 / 72.0
    }
}

/// A `figure` section as written in the file; absent fields fall back to
/// the owning section's geometry.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FigurePatch {
    width_in: Option<f64>,
    height_in: Option<f64>,
    dpi: Option<u32>,
}

impl FigurePatch {
    fn over(self, base: FigureConfig) -> FigureConfig {
        FigureConfig {
            width_in: self.width_in.unwrap_or(base.width_in),
            height_in: self.height_in.unwrap_or(base.height_in),
            dpi: self.dpi.unwrap_or(base.dpi),
        }
    }
}

fn phonon_figure<'de, D: Deserializer<'de>>(d: D) -> Result<FigureConfig, D::Error> {
    Ok(FigurePatch::deserialize(d)?.over(PhononConfig::FIGURE))
}

fn lcurve_figure<'de, D: Deserializer<'de>>(d: D) -> Result<FigureConfig, D::Error> {
    Ok(FigurePatch::deserialize(d)?.over(LossCurveConfig::FIGURE))
}

// ---------------------------------------------------------------------------
// Phonon comparison
// ---------------------------------------------------------------------------

/// `NAME=PATH` pair naming one method's dispersion file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSource {
    pub name: String,
    pub path: PathBuf,
}

impl FromStr for MethodSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=PATH, got '{s}'"))?;
        let name = name.trim();
        if name.is_empty() || path.is_empty() {
            return Err(format!("expected NAME=PATH, got '{s}'"));
        }
        Ok(MethodSource {
            name: name.to_string(),
            path: PathBuf::from(path),
        })
    }
}

impl fmt::Display for MethodSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.path.display())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhononConfig {
    /// Methods in plotting order; the first one provides the ticks.
    pub methods: Vec<MethodSource>,
    /// High-symmetry point names, matched to points by position.
    pub labels: Vec<String>,
    pub output: PathBuf,
    /// Optional tidy CSV dump of every parsed sample.
    pub table: Option<PathBuf>,
    #[serde(deserialize_with = "phonon_figure")]
    pub figure: FigureConfig,
    pub styles: BTreeMap<String, StyleSpec>,
    pub show: bool,
}

impl PhononConfig {
    pub const FIGURE: FigureConfig = FigureConfig {
        width_in: 12.0,
        height_in: 8.0,
        dpi: 600,
    };
}

impl Default for PhononConfig {
    fn default() -> Self {
        Self {
            methods: vec![
                MethodSource {
                    name: "DFT".into(),
                    path: PathBuf::from("phonon_vasp.out"),
                },
                MethodSource {
                    name: "DP".into(),
                    path: PathBuf::from("phonon1.out"),
                },
            ],
            labels: ["Γ", "M", "K", "Γ"].iter().map(|s| s.to_string()).collect(),
            output: PathBuf::from("phonon_branches.svg"),
            table: None,
            figure: Self::FIGURE,
            styles: default_styles(),
            show: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Loss curve
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossCurveConfig {
    pub input: PathBuf,
    pub step_column: String,
    pub columns: Vec<String>,
    pub output: PathBuf,
    #[serde(deserialize_with = "lcurve_figure")]
    pub figure: FigureConfig,
    pub show: bool,
}

impl LossCurveConfig {
    pub const FIGURE: FigureConfig = FigureConfig {
        width_in: 6.4,
        height_in: 4.8,
        dpi: 100,
    };
}

impl Default for LossCurveConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("lcurve.out"),
            step_column: "step".into(),
            columns: ["rmse_e_val", "rmse_e_trn", "rmse_f_val", "rmse_f_trn"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            output: PathBuf::from("lcurve.svg"),
            figure: Self::FIGURE,
            show: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset split
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Directory whose sub-directories each hold one simulation output.
    pub root: PathBuf,
    /// File name looked up in every sub-directory.
    pub outcar_name: String,
    pub training_dir: PathBuf,
    pub test_dir: PathBuf,
    /// Fraction of frames assigned to the test set.
    pub test_fraction: f64,
    /// Fixed seed for a reproducible split; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Frames per `set.NNN` directory.
    pub set_size: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            outcar_name: "OUTCAR".into(),
            training_dir: PathBuf::from("training_data"),
            test_dir: PathBuf::from("test_data"),
            test_fraction: 0.2,
            seed: None,
            set_size: 5000,
        }
    }
}
