use std::path::Path;

use super::error::{Result, SplitError};
use super::system::{determinant, Frame, LabeledSystem, Matrix3};

/// kBar·Å³ → eV
const KBAR_A3_PER_EV: f64 = 1602.176621;

const FORCE_HEADER: &str = "TOTAL-FORCE (eV/Angst)";
const ENERGY_MARKER: &str = "free  energy   TOTEN";

/// Read every completed ionic step of a VASP `OUTCAR`.
pub fn read_outcar(path: &Path) -> Result<LabeledSystem> {
    let text = std::fs::read_to_string(path).map_err(|e| SplitError::io(path, e))?;
    parse_outcar(&text, path)
}

/// A frame is emitted when the final `free  energy   TOTEN` line follows a
/// `TOTAL-FORCE` block. The cell is the last `direct lattice vectors` block
/// seen before it; the virial comes from the last `in kB` stress line.
pub fn parse_outcar(text: &str, path: &Path) -> Result<LabeledSystem> {
    let lines: Vec<&str> = text.lines().collect();

    let mut titel_names = Vec::new();
    let mut vrhfin_names = Vec::new();
    let mut counts: Option<(usize, Vec<usize>)> = None;
    let mut cell: Option<Matrix3> = None;
    let mut stress: Option<Matrix3> = None;
    let mut pending: Option<(Vec<[f64; 3]>, Vec<[f64; 3]>)> = None;
    let mut frames = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let line_no = i + 1;

        if line.contains("TITEL") {
            if let Some(name) = titel_element(line) {
                titel_names.push(name);
            }
        } else if line.contains("VRHFIN") {
            if let Some(name) = vrhfin_element(line) {
                vrhfin_names.push(name);
            }
        } else if line.contains("ions per type") {
            let rhs = line.split_once('=').map(|(_, r)| r).unwrap_or("");
            let numbs = rhs
                .split_whitespace()
                .map(|t| t.parse::<usize>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| SplitError::parse(path, line_no, "bad 'ions per type' line"))?;
            counts = Some((line_no, numbs));
        } else if line.contains("direct lattice vectors") {
            let mut m = [[0.0; 3]; 3];
            for (row, slot) in m.iter_mut().enumerate() {
                let idx = i + 1 + row;
                let row = lattice_row(lines.get(idx).copied().unwrap_or(""));
                let values = floats(&row, path, idx + 1)?;
                *slot = first_three(&values, path, idx + 1)?;
            }
            cell = Some(m);
            i += 3;
        } else if line.trim_start().starts_with("in kB") {
            stress = Some(parse_stress(line, path, line_no)?);
        } else if line.contains(FORCE_HEADER) {
            let natoms = match &counts {
                Some((_, numbs)) => numbs.iter().sum::<usize>(),
                None => {
                    return Err(SplitError::parse(
                        path,
                        line_no,
                        "force block before 'ions per type'",
                    ))
                }
            };
            // Skip the dashed rule under the header.
            let first = i + 2;
            let mut coords = Vec::with_capacity(natoms);
            let mut forces = Vec::with_capacity(natoms);
            for idx in first..first + natoms {
                let values = floats(lines.get(idx).copied().unwrap_or(""), path, idx + 1)?;
                if values.len() < 6 {
                    return Err(SplitError::parse(path, idx + 1, "expected position and force columns"));
                }
                coords.push([values[0], values[1], values[2]]);
                forces.push([values[3], values[4], values[5]]);
            }
            pending = Some((coords, forces));
            i = first + natoms;
            continue;
        } else if line.contains(ENERGY_MARKER) {
            if let Some((coords, forces)) = pending.take() {
                let energy = line
                    .split_whitespace()
                    .nth(4)
                    .and_then(|t| t.parse::<f64>().ok())
                    .ok_or_else(|| SplitError::parse(path, line_no, "bad energy line"))?;
                let cell = cell.ok_or_else(|| {
                    SplitError::parse(path, line_no, "ionic step without lattice vectors")
                })?;
                let volume = determinant(&cell);
                let virial = stress
                    .take()
                    .map(|s| s.map(|row| row.map(|v| v * volume / KBAR_A3_PER_EV)));
                frames.push(Frame {
                    cell,
                    coords,
                    forces,
                    energy,
                    virial,
                });
            }
        }
        i += 1;
    }

    let (counts_line, numbs) = counts.ok_or_else(|| {
        SplitError::parse(path, lines.len(), "missing 'ions per type' line")
    })?;
    let names = if titel_names.len() == numbs.len() {
        titel_names
    } else if vrhfin_names.len() == numbs.len() {
        vrhfin_names
    } else {
        return Err(SplitError::parse(
            path,
            counts_line,
            format!(
                "{} atom types but {} element names",
                numbs.len(),
                titel_names.len()
            ),
        ));
    };

    let mut system = LabeledSystem::new(names, numbs);
    system.frames = frames;
    Ok(system)
}

/// `TITEL  = PAW_PBE In_d 06Sep2000` → `In`
fn titel_element(line: &str) -> Option<String> {
    let (_, rhs) = line.split_once('=')?;
    let mut tokens = rhs.split_whitespace();
    let first = tokens.next()?;
    let symbol = tokens.next().unwrap_or(first);
    symbol.split('_').next().map(str::to_string)
}

/// `VRHFIN =In: 4d5s5p` → `In`
fn vrhfin_element(line: &str) -> Option<String> {
    let (_, rhs) = line.split_once('=')?;
    let name = rhs.split(':').next()?.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// `in kB  xx yy zz xy yz zx` as a symmetric tensor.
fn parse_stress(line: &str, path: &Path, line_no: usize) -> Result<Matrix3> {
    let tokens: Vec<&str> = line.split_whitespace().skip(2).take(6).collect();
    let v = tokens
        .iter()
        .map(|t| t.parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .ok()
        .filter(|v| v.len() == 6)
        .ok_or_else(|| SplitError::parse(path, line_no, "bad stress line"))?;
    Ok([[v[0], v[3], v[5]], [v[3], v[1], v[4]], [v[5], v[4], v[2]]])
}

/// Fixed-width lattice columns can run together (`-12.3456789-10.0000000`);
/// every minus sign starts a new number.
fn lattice_row(line: &str) -> String {
    line.replace('-', " -")
}

fn floats(line: &str, path: &Path, line_no: usize) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| SplitError::parse(path, line_no, format!("'{t}' is not a number")))
        })
        .collect()
}

fn first_three(values: &[f64], path: &Path, line_no: usize) -> Result<[f64; 3]> {
    match values {
        [a, b, c, ..] => Ok([*a, *b, *c]),
        _ => Err(SplitError::parse(path, line_no, "expected three lattice components")),
    }
}

/// Render frames in the subset of OUTCAR layout read by [`parse_outcar`].
pub fn format_outcar(system: &LabeledSystem) -> String {
    let rule = format!(" {}\n", "-".repeat(83));
    let mut out = String::new();
    for name in &system.atom_names {
        out.push_str(&format!("   VRHFIN ={name}: s2p1\n"));
        out.push_str(&format!("   TITEL  = PAW_PBE {name} 08Apr2002\n"));
    }
    let counts: Vec<String> = system.atom_numbs.iter().map(|n| n.to_string()).collect();
    out.push_str(&format!("   ions per type =               {}\n", counts.join("   ")));

    for frame in &system.frames {
        if let Some(virial) = &frame.virial {
            let volume = determinant(&frame.cell);
            let s = virial.map(|row| row.map(|v| v * KBAR_A3_PER_EV / volume));
            out.push_str(&format!(
                "  in kB {:12.5} {:12.5} {:12.5} {:12.5} {:12.5} {:12.5}\n",
                s[0][0], s[1][1], s[2][2], s[0][1], s[1][2], s[0][2]
            ));
        }
        out.push_str("      direct lattice vectors                 reciprocal lattice vectors\n");
        for row in &frame.cell {
            out.push_str(&format!(
                "    {:14.9} {:14.9} {:14.9}     0.000000000  0.000000000  0.000000000\n",
                row[0], row[1], row[2]
            ));
        }
        out.push_str(&format!(" POSITION                                       {FORCE_HEADER}\n"));
        out.push_str(&rule);
        for (c, f) in frame.coords.iter().zip(&frame.forces) {
            out.push_str(&format!(
                "   {:12.5} {:12.5} {:12.5}   {:14.6} {:14.6} {:14.6}\n",
                c[0], c[1], c[2], f[0], f[1], f[2]
            ));
        }
        out.push_str(&rule);
        out.push_str("  FREE ENERGIE OF THE ION-ELECTRON SYSTEM (eV)\n");
        out.push_str(&format!("  {ENERGY_MARKER}  = {:20.8} eV\n", frame.energy));
    }
    out
}
