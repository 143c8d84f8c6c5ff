//! Phonon dispersion comparison, training-loss curves and DeePMD dataset
//! splitting for machine-learned interatomic potentials.

pub mod app;
pub mod color;
pub mod commands;
pub mod config;
pub mod data;
pub mod dataset;
pub mod figure;
pub mod render;
pub mod state;
pub mod ui;
