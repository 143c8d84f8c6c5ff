use std::path::Path;

use super::error::{Result, SplitError};
use super::outcar::read_outcar;

pub type Matrix3 = [[f64; 3]; 3];

// ---------------------------------------------------------------------------
// Frame – one labeled configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Lattice vectors as rows (Å).
    pub cell: Matrix3,
    /// Cartesian positions (Å), one row per atom.
    pub coords: Vec<[f64; 3]>,
    /// Forces (eV/Å), one row per atom.
    pub forces: Vec<[f64; 3]>,
    /// Total free energy (eV).
    pub energy: f64,
    /// Virial tensor (eV), when the stress was printed.
    pub virial: Option<Matrix3>,
}

pub fn determinant(m: &Matrix3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

// ---------------------------------------------------------------------------
// LabeledSystem – frames sharing one atom list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledSystem {
    /// Element names, the type map.
    pub atom_names: Vec<String>,
    /// Atom count per element.
    pub atom_numbs: Vec<usize>,
    /// Type index of every atom, in file order.
    pub atom_types: Vec<usize>,
    pub frames: Vec<Frame>,
}

impl LabeledSystem {
    pub fn new(atom_names: Vec<String>, atom_numbs: Vec<usize>) -> Self {
        let atom_types = atom_numbs
            .iter()
            .enumerate()
            .flat_map(|(t, &n)| std::iter::repeat(t).take(n))
            .collect();
        Self {
            atom_names,
            atom_numbs,
            atom_types,
            frames: Vec::new(),
        }
    }

    pub fn natoms(&self) -> usize {
        self.atom_types.len()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Chemical formula, e.g. `In2N2`.
    pub fn formula(&self) -> String {
        self.atom_names
            .iter()
            .zip(&self.atom_numbs)
            .map(|(name, n)| format!("{name}{n}"))
            .collect()
    }

    /// Append another system's frames. An empty, atom-less system adopts
    /// the other's atoms; otherwise names and per-atom types must match.
    pub fn append(&mut self, other: LabeledSystem) -> Result<()> {
        if self.atom_names.is_empty() && self.frames.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.atom_names != other.atom_names || self.atom_types != other.atom_types {
            return Err(SplitError::Incompatible {
                reason: format!(
                    "{} and {} have different atoms",
                    self.formula(),
                    other.formula()
                ),
            });
        }
        self.frames.extend(other.frames);
        Ok(())
    }

    /// Order elements alphabetically and atoms by element, so one
    /// composition read with different POTCAR orders compares equal.
    pub fn sort_atoms(&mut self) {
        let mut order: Vec<usize> = (0..self.atom_names.len()).collect();
        order.sort_by(|&a, &b| self.atom_names[a].cmp(&self.atom_names[b]));
        let mut rank = vec![0; order.len()];
        for (new, &old) in order.iter().enumerate() {
            rank[old] = new;
        }
        self.atom_names = order.iter().map(|&t| self.atom_names[t].clone()).collect();
        self.atom_numbs = order.iter().map(|&t| self.atom_numbs[t]).collect();
        for t in &mut self.atom_types {
            *t = rank[*t];
        }

        let mut atoms: Vec<usize> = (0..self.atom_types.len()).collect();
        atoms.sort_by_key(|&i| self.atom_types[i]);
        if atoms.iter().enumerate().all(|(i, &a)| i == a) {
            return;
        }
        self.atom_types = atoms.iter().map(|&i| self.atom_types[i]).collect();
        for frame in &mut self.frames {
            frame.coords = atoms.iter().map(|&i| frame.coords[i]).collect();
            frame.forces = atoms.iter().map(|&i| frame.forces[i]).collect();
        }
    }

    /// New system holding the frames at `indices`, in that order.
    pub fn sub_system(&self, indices: &[usize]) -> LabeledSystem {
        LabeledSystem {
            atom_names: self.atom_names.clone(),
            atom_numbs: self.atom_numbs.clone(),
            atom_types: self.atom_types.clone(),
            frames: indices.iter().map(|&i| self.frames[i].clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// MultiSystems – sub-systems grouped by formula
// ---------------------------------------------------------------------------

/// Systems keyed by formula in first-seen order; systems sharing a formula
/// are merged.
#[derive(Debug, Clone, Default)]
pub struct MultiSystems {
    systems: Vec<LabeledSystem>,
}

impl MultiSystems {
    /// Read `root/*/file_name` for every immediate sub-directory, sorted by
    /// name.
    pub fn from_dir(root: &Path, file_name: &str) -> Result<Self> {
        let entries = std::fs::read_dir(root).map_err(|e| SplitError::io(root, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SplitError::io(root, e))?;
            let candidate = entry.path().join(file_name);
            if entry.path().is_dir() && candidate.is_file() {
                files.push(candidate);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(SplitError::NoSystems {
                root: root.to_path_buf(),
                file_name: file_name.to_string(),
            });
        }

        let mut multi = MultiSystems::default();
        for file in &files {
            let system = read_outcar(file)?;
            if system.is_empty() {
                log::warn!("{}: no complete ionic steps, skipped", file.display());
                continue;
            }
            log::debug!("{}: {} frames of {}", file.display(), system.len(), system.formula());
            multi.push(system)?;
        }
        Ok(multi)
    }

    pub fn push(&mut self, mut system: LabeledSystem) -> Result<()> {
        system.sort_atoms();
        let formula = system.formula();
        match self.systems.iter_mut().find(|s| s.formula() == formula) {
            Some(existing) => existing.append(system),
            None => {
                self.systems.push(system);
                Ok(())
            }
        }
    }

    pub fn systems(&self) -> &[LabeledSystem] {
        &self.systems
    }

    pub fn frame_count(&self) -> usize {
        self.systems.iter().map(LabeledSystem::len).sum()
    }

    /// Pool every group into one system, preserving order.
    pub fn into_pooled(self) -> Result<LabeledSystem> {
        let mut pooled = LabeledSystem::default();
        for system in self.systems {
            pooled.append(system)?;
        }
        Ok(pooled)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn frame(energy: f64, natoms: usize) -> Frame {
        Frame {
            cell: [[3.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]],
            coords: vec![[0.0, 0.0, energy]; natoms],
            forces: vec![[0.1, -0.1, 0.0]; natoms],
            energy,
            virial: None,
        }
    }

    pub(crate) fn system(names: &[&str], numbs: &[usize], energies: &[f64]) -> LabeledSystem {
        let mut s = LabeledSystem::new(names.iter().map(|n| n.to_string()).collect(), numbs.to_vec());
        let natoms = s.natoms();
        s.frames = energies.iter().map(|&e| frame(e, natoms)).collect();
        s
    }

    #[test]
    fn types_follow_counts() {
        let s = LabeledSystem::new(vec!["In".into(), "N".into()], vec![2, 1]);
        assert_eq!(s.atom_types, vec![0, 0, 1]);
        assert_eq!(s.formula(), "In2N1");
    }

    #[test]
    fn empty_system_adopts_appended_atoms() {
        let mut pooled = LabeledSystem::default();
        pooled.append(system(&["Al", "N"], &[1, 1], &[-1.0])).unwrap();
        pooled.append(system(&["Al", "N"], &[1, 1], &[-2.0, -3.0])).unwrap();
        assert_eq!(pooled.len(), 3);
        assert_eq!(pooled.atom_names, vec!["Al", "N"]);
    }

    #[test]
    fn different_atoms_cannot_be_appended() {
        let mut pooled = system(&["Al", "N"], &[1, 1], &[-1.0]);
        let err = pooled.append(system(&["Ga", "N"], &[1, 1], &[-2.0])).unwrap_err();
        assert!(matches!(err, SplitError::Incompatible { .. }));
    }

    #[test]
    fn sub_system_keeps_index_order() {
        let s = system(&["Al"], &[1], &[0.0, 1.0, 2.0, 3.0]);
        let sub = s.sub_system(&[3, 1]);
        let energies: Vec<f64> = sub.frames.iter().map(|f| f.energy).collect();
        assert_eq!(energies, vec![3.0, 1.0]);
        assert_eq!(sub.atom_types, s.atom_types);
    }

    #[test]
    fn same_formula_groups_merge_in_first_seen_order() {
        let mut multi = MultiSystems::default();
        multi.push(system(&["Al", "N"], &[1, 1], &[1.0])).unwrap();
        multi.push(system(&["Al", "N"], &[2, 2], &[2.0])).unwrap();
        multi.push(system(&["Al", "N"], &[1, 1], &[3.0])).unwrap();
        assert_eq!(multi.systems().len(), 2);
        assert_eq!(multi.systems()[0].len(), 2);
        assert_eq!(multi.frame_count(), 3);
        // Al1N1 and Al2N2 differ in atom count, so they cannot be pooled.
        assert!(multi.into_pooled().is_err());
    }

    #[test]
    fn reversed_element_order_joins_the_same_group() {
        let mut reversed = system(&["N", "In"], &[1, 2], &[2.0]);
        reversed.frames[0].coords = vec![[9.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        reversed.frames[0].forces = vec![[-9.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [-2.0, 0.0, 0.0]];

        let mut multi = MultiSystems::default();
        multi.push(system(&["In", "N"], &[2, 1], &[1.0])).unwrap();
        multi.push(reversed).unwrap();
        assert_eq!(multi.systems().len(), 1);

        let pooled = multi.into_pooled().unwrap();
        assert_eq!(pooled.atom_names, vec!["In", "N"]);
        assert_eq!(pooled.atom_numbs, vec![2, 1]);
        assert_eq!(pooled.atom_types, vec![0, 0, 1]);
        assert_eq!(pooled.len(), 2);
        // The N atom moves behind both In atoms.
        assert_eq!(pooled.frames[1].coords[2], [9.0, 0.0, 0.0]);
        assert_eq!(pooled.frames[1].forces[0], [-1.0, 0.0, 0.0]);
    }

    #[test]
    fn sorted_system_is_left_alone() {
        let mut s = system(&["Al", "N"], &[1, 1], &[1.0]);
        let before = s.clone();
        s.sort_atoms();
        assert_eq!(s, before);
    }

    #[test]
    fn determinant_of_cubic_cell_is_volume() {
        assert!((determinant(&frame(0.0, 1).cell) - 27.0).abs() < 1e-12);
    }
}
