use anyhow::{Context, Result};

use crate::app;
use crate::config::{FigureConfig, LossCurveConfig, PhononConfig, SplitConfig};
use crate::data::export::write_branch_table;
use crate::data::lcurve::read_loss_table;
use crate::dataset::{self, SplitReport};
use crate::figure::lcurve::build_loss_figure;
use crate::figure::phonon::build_comparison;
use crate::figure::Figure;
use crate::render::write_svg;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Phonon comparison
// ---------------------------------------------------------------------------

/// Overlay every configured method, save the figure and optionally show it.
/// A missing reference file ends the run without output.
pub fn run_phonon(cfg: &PhononConfig) -> Result<()> {
    let Some(comparison) = build_comparison(&cfg.methods, &cfg.labels, &cfg.styles)? else {
        return Ok(());
    };

    let written = write_svg(&comparison.figure, &cfg.output, &cfg.figure)?;
    log::info!("phonon figure saved to {}", written.display());

    if let Some(table) = &cfg.table {
        let rows = write_branch_table(table, &comparison.datasets)
            .with_context(|| format!("writing branch table {}", table.display()))?;
        log::info!("wrote {rows} samples to {}", table.display());
    }

    if cfg.show {
        show(comparison.figure, cfg.figure);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Loss curve
// ---------------------------------------------------------------------------

pub fn run_lcurve(cfg: &LossCurveConfig) -> Result<()> {
    let table = read_loss_table(&cfg.input)?;
    log::info!("read {} rows from {}", table.len(), cfg.input.display());

    let figure = build_loss_figure(&table, cfg)?;
    let written = write_svg(&figure, &cfg.output, &cfg.figure)?;
    log::info!("loss curve saved to {}", written.display());

    if cfg.show {
        show(figure, cfg.figure);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dataset split
// ---------------------------------------------------------------------------

pub fn run_split(cfg: &SplitConfig) -> dataset::Result<SplitReport> {
    let report = dataset::run_split(cfg)?;
    println!(
        "exported {} training frames to {}",
        report.training_frames,
        report.training_dir.display()
    );
    println!(
        "exported {} test frames to {}",
        report.test_frames,
        report.test_dir.display()
    );
    Ok(report)
}

/// The figure file is already on disk, so a viewer failure only warns.
fn show(figure: Figure, geometry: FigureConfig) {
    if let Err(e) = app::show(ViewerState::new(figure, geometry)) {
        log::warn!("could not open viewer: {e:#}");
    }
}
