//! Export in the DeePMD-kit `deepmd/npy` layout:
//!
//! ```text
//! out/
//! ├── type.raw         atom type index per atom, one per line
//! ├── type_map.raw     element name per type, one per line
//! ├── set.000/
//! │   ├── box.npy      (nframes, 9)
//! │   ├── coord.npy    (nframes, natoms * 3)
//! │   ├── energy.npy   (nframes,)
//! │   ├── force.npy    (nframes, natoms * 3)
//! │   └── virial.npy   (nframes, 9), only when every frame has one
//! └── set.001/ ...
//! ```
//!
//! Arrays are C-ordered little-endian float64 NumPy files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::{Array1, Array2};
use ndarray_npy::WriteNpyExt;

use super::error::{Result, SplitError};
use super::system::{Frame, LabeledSystem};

/// Write `system` under `dir`, `set_size` frames per set directory.
/// Returns the number of set directories written.
pub fn export_npy(system: &LabeledSystem, dir: &Path, set_size: usize) -> Result<usize> {
    std::fs::create_dir_all(dir).map_err(|e| SplitError::export(dir, e))?;
    remove_stale_sets(dir)?;

    let types: String = system.atom_types.iter().map(|t| format!("{t}\n")).collect();
    write_text(&dir.join("type.raw"), &types)?;
    let type_map: String = system.atom_names.iter().map(|n| format!("{n}\n")).collect();
    write_text(&dir.join("type_map.raw"), &type_map)?;

    let with_virial = !system.frames.is_empty() && system.frames.iter().all(|f| f.virial.is_some());
    let natoms = system.natoms();
    let mut sets = 0;
    for (k, chunk) in system.frames.chunks(set_size.max(1)).enumerate() {
        let set_dir = dir.join(format!("set.{k:03}"));
        std::fs::create_dir_all(&set_dir).map_err(|e| SplitError::export(&set_dir, e))?;

        let cell = frame_rows(chunk, 9, |f| f.cell.iter().flatten().copied().collect());
        write_npy(&set_dir.join("box.npy"), &cell)?;
        let coord = frame_rows(chunk, natoms * 3, |f| f.coords.iter().flatten().copied().collect());
        write_npy(&set_dir.join("coord.npy"), &coord)?;
        let energy = Array1::from_iter(chunk.iter().map(|f| f.energy));
        write_npy(&set_dir.join("energy.npy"), &energy)?;
        let force = frame_rows(chunk, natoms * 3, |f| f.forces.iter().flatten().copied().collect());
        write_npy(&set_dir.join("force.npy"), &force)?;
        if with_virial {
            let virial = frame_rows(chunk, 9, |f| {
                f.virial.iter().flat_map(|v| v.iter().flatten().copied()).collect()
            });
            write_npy(&set_dir.join("virial.npy"), &virial)?;
        }
        sets += 1;
    }
    log::debug!("{}: {} frames in {sets} sets", dir.display(), system.len());
    Ok(sets)
}

/// One row per frame, `width` columns.
fn frame_rows(frames: &[Frame], width: usize, fill: impl Fn(&Frame) -> Vec<f64>) -> Array2<f64> {
    let mut data = Array2::<f64>::zeros((frames.len(), width));
    for (mut row, frame) in data.rows_mut().into_iter().zip(frames) {
        for (slot, value) in row.iter_mut().zip(fill(frame)) {
            *slot = value;
        }
    }
    data
}

fn write_npy<A: WriteNpyExt>(path: &Path, array: &A) -> Result<()> {
    let file = File::create(path).map_err(|e| SplitError::export(path, e))?;
    let mut writer = BufWriter::new(file);
    array.write_npy(&mut writer).map_err(|source| SplitError::Npy {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| SplitError::export(path, e))
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|e| SplitError::export(path, e))
}

/// Drop `set.*` directories left by an earlier export.
fn remove_stale_sets(dir: &Path) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| SplitError::export(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| SplitError::export(dir, e))?;
        let path = entry.path();
        let is_set = entry.file_name().to_string_lossy().starts_with("set.");
        if is_set && path.is_dir() {
            std::fs::remove_dir_all(&path).map_err(|e| SplitError::export(&path, e))?;
        }
    }
    Ok(())
}
