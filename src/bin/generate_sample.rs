use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rusty_phonon::dataset::outcar::format_outcar;
use rusty_phonon::dataset::system::{Frame, LabeledSystem};

/// Path length of each Γ–M–K–Γ leg.
const SEGMENTS: [f64; 3] = [0.5774, 0.3333, 0.6667];
const SAMPLES_PER_SEGMENT: usize = 20;

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

// ---------------------------------------------------------------------------
// Phonon dispersion
// ---------------------------------------------------------------------------

fn segment_ends() -> Vec<f64> {
    let mut ends = vec![0.0];
    for len in SEGMENTS {
        ends.push(ends[ends.len() - 1] + len);
    }
    ends
}

/// Three acoustic branches vanishing at Γ, three flat-ish optical ones.
fn branch_frequency(branch: usize, q: f64, q_max: f64) -> f64 {
    let phase = std::f64::consts::PI * q / q_max;
    match branch {
        0..=2 => (2.0 + 1.5 * branch as f64) * phase.sin().abs(),
        _ => 14.0 + 1.2 * branch as f64 + 0.6 * (2.0 * phase).cos(),
    }
}

fn phonon_text(scale: f64, noise: f64, rng: &mut StdRng) -> String {
    let ends = segment_ends();
    let q_max = ends[ends.len() - 1];
    let n = SAMPLES_PER_SEGMENT * SEGMENTS.len();

    let mut out = String::new();
    out.push_str("# End points of segments:\n");
    let joined: Vec<String> = ends.iter().map(|e| format!("{e:.8e}")).collect();
    out.push_str(&format!("#   {}\n", joined.join("  ")));
    for branch in 0..6 {
        for i in 0..=n {
            let q = q_max * i as f64 / n as f64;
            let f = branch_frequency(branch, q, q_max) * scale;
            out.push_str(&format!("{q:12.8} {:14.8}\n", f + gauss(rng, 0.0, noise)));
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Training log
// ---------------------------------------------------------------------------

fn lcurve_text(rng: &mut StdRng) -> String {
    let mut out = String::new();
    out.push_str(
        "#  step      rmse_val    rmse_trn    rmse_e_val  rmse_e_trn    rmse_f_val  rmse_f_trn         lr\n",
    );
    for step in (0..=100_000u32).step_by(1000) {
        let decay = (1.0 + step as f64 / 1000.0).powf(-0.6);
        let mut jitter = || (1.0 + gauss(rng, 0.0, 0.05)).abs();
        let e_val = 0.5 * decay * jitter();
        let e_trn = 0.45 * decay * jitter();
        let f_val = 0.8 * decay * jitter();
        let f_trn = 0.75 * decay * jitter();
        let lr = 1e-3 * 0.95f64.powf(step as f64 / 5000.0);
        out.push_str(&format!(
            "{step:7} {:11.2e} {:11.2e} {e_val:11.2e} {e_trn:11.2e} {f_val:11.2e} {f_trn:11.2e} {lr:10.1e}\n",
            e_val + f_val,
            e_trn + f_trn
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// Labeled frames
// ---------------------------------------------------------------------------

fn thermal_system(frames: usize, amplitude: f64, rng: &mut StdRng) -> LabeledSystem {
    let mut system = LabeledSystem::new(vec!["In".into(), "N".into()], vec![2, 2]);
    let a = 3.54;
    let c = 5.70;
    let cell = [[a, 0.0, 0.0], [-0.5 * a, 0.866_025_4 * a, 0.0], [0.0, 0.0, c]];
    let lattice = [
        [0.0, 2.044, 0.0],
        [1.77, 1.022, 2.85],
        [0.0, 2.044, 2.16],
        [1.77, 1.022, 5.01],
    ];

    for _ in 0..frames {
        let coords: Vec<[f64; 3]> = lattice
            .iter()
            .map(|p| p.map(|x| x + gauss(rng, 0.0, amplitude)))
            .collect();
        let forces: Vec<[f64; 3]> = coords
            .iter()
            .zip(&lattice)
            .map(|(r, r0)| [0, 1, 2].map(|k| -4.0 * (r[k] - r0[k])))
            .collect();
        let strain: f64 = coords
            .iter()
            .zip(&lattice)
            .flat_map(|(r, r0)| (0..3).map(move |k| (r[k] - r0[k]).powi(2)))
            .sum();
        let diag = -0.1 * strain;
        system.frames.push(Frame {
            cell,
            coords,
            forces,
            energy: -24.0 + 2.0 * strain,
            virial: Some([[diag, 0.0, 0.0], [0.0, diag, 0.0], [0.0, 0.0, diag]]),
        });
    }
    system
}

fn write(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    let mut rng = StdRng::seed_from_u64(42);

    write(&out_dir.join("phonon_vasp.out"), &phonon_text(1.0, 0.0, &mut rng))?;
    write(&out_dir.join("phonon1.out"), &phonon_text(0.97, 0.05, &mut rng))?;
    write(&out_dir.join("lcurve.out"), &lcurve_text(&mut rng))?;

    let runs = [("In2N2_300K", 12, 0.03), ("In2N2_600K", 8, 0.06)];
    let mut frames = 0;
    for (name, count, amplitude) in runs {
        let system = thermal_system(count, amplitude, &mut rng);
        write(&out_dir.join("outcars").join(name).join("OUTCAR"), &format_outcar(&system))?;
        frames += system.len();
    }

    println!(
        "Wrote phonon_vasp.out, phonon1.out, lcurve.out and {} OUTCAR frames in {} runs to {}",
        frames,
        runs.len(),
        out_dir.display()
    );
    Ok(())
}
