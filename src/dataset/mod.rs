//! Dataset layer: labeled simulation frames, train/test split, export.
//!
//! Architecture:
//! ```text
//!  root/*/OUTCAR
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  outcar   │  parse ionic steps → LabeledSystem
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ MultiSystems  │  group by formula, pool into one system
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  split    │  random test subset, complement for training
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  deepmd   │  type.raw, type_map.raw, set.NNN/*.npy
//!   └──────────┘
//! ```

use std::path::PathBuf;

use crate::config::SplitConfig;

pub mod deepmd;
pub mod error;
pub mod outcar;
pub mod split;
pub mod system;

pub use error::{Result, SplitError};

/// What a split run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitReport {
    pub training_frames: usize,
    pub test_frames: usize,
    pub training_dir: PathBuf,
    pub test_dir: PathBuf,
    pub seed: u64,
}

/// Collect every sub-system under `cfg.root`, split the pooled frames and
/// export both subsets.
pub fn run_split(cfg: &SplitConfig) -> Result<SplitReport> {
    let multi = system::MultiSystems::from_dir(&cfg.root, &cfg.outcar_name)?;
    for sys in multi.systems() {
        log::info!("system {}: {} frames", sys.formula(), sys.len());
    }
    log::info!(
        "collected {} frames in {} systems",
        multi.frame_count(),
        multi.systems().len()
    );

    let pooled = multi.into_pooled()?;
    if pooled.is_empty() {
        return Err(SplitError::NoFrames {
            root: cfg.root.clone(),
        });
    }

    let (mut rng, seed) = split::split_rng(cfg.seed);
    log::info!("splitting {} frames with seed {seed}", pooled.len());
    let assignment = split::split_indices(pooled.len(), cfg.test_fraction, &mut rng)?;

    let training = pooled.sub_system(&assignment.training);
    let test = pooled.sub_system(&assignment.test);
    deepmd::export_npy(&training, &cfg.training_dir, cfg.set_size)?;
    deepmd::export_npy(&test, &cfg.test_dir, cfg.set_size)?;

    Ok(SplitReport {
        training_frames: training.len(),
        test_frames: test.len(),
        training_dir: cfg.training_dir.clone(),
        test_dir: cfg.test_dir.clone(),
        seed,
    })
}
