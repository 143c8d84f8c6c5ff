use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusty_phonon::color::default_styles;
use rusty_phonon::commands::run_phonon;
use rusty_phonon::config::{FigureConfig, MethodSource, PhononConfig};
use rusty_phonon::data::export::write_branch_table;
use rusty_phonon::figure::phonon::build_comparison;
use rusty_phonon::render::write_svg;

const DFT: &str = "\
# End points of segments:
#   0.0  0.5  1.0
0.0 0.0
0.5 2.0
1.0 0.0

0.0 5.0
0.5 6.0
1.0 5.0
";

const DP: &str = "\
0.0 0.1
0.5 2.1
1.0 0.1
";

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn source(name: &str, path: PathBuf) -> MethodSource {
    MethodSource {
        name: name.into(),
        path,
    }
}

fn labels() -> Vec<String> {
    ["Γ", "M", "Γ"].iter().map(|s| s.to_string()).collect()
}

#[test]
fn one_method_two_branches_gives_one_legend_entry() {
    let dir = tempfile::tempdir().unwrap();
    let dft = write(dir.path(), "dft.out", DFT);

    let cmp = build_comparison(&[source("DFT", dft)], &labels(), &default_styles())
        .unwrap()
        .unwrap();

    assert_eq!(cmp.figure.series.len(), 2);
    let legend = cmp.figure.legend_entries();
    assert_eq!(legend.len(), 1);
    assert_eq!(legend[0].0, "DFT");
    assert_eq!(cmp.figure.guides, vec![0.0, 0.5, 1.0]);
    let ticks: Vec<&str> = cmp.figure.x_ticks.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(ticks, vec!["Γ", "M", "Γ"]);
}

#[test]
fn reference_points_come_from_first_method() {
    let dir = tempfile::tempdir().unwrap();
    let dft = write(dir.path(), "dft.out", DFT);
    let dp = write(dir.path(), "dp.out", DP);

    let cmp = build_comparison(
        &[source("DFT", dft), source("DP", dp)],
        &labels(),
        &default_styles(),
    )
    .unwrap()
    .unwrap();

    assert_eq!(cmp.datasets.len(), 2);
    assert!(cmp.datasets[1].high_symmetry_points.is_empty());
    assert_eq!(cmp.figure.guides.len(), 3);
    assert_eq!(cmp.figure.legend_entries().len(), 2);
    // DP keeps its own dashed style.
    assert!(cmp.figure.series.last().unwrap().dashed);
}

#[test]
fn missing_reference_produces_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let dp = write(dir.path(), "dp.out", DP);

    let cmp = build_comparison(
        &[source("DFT", dir.path().join("absent.out")), source("DP", dp)],
        &labels(),
        &BTreeMap::new(),
    )
    .unwrap();
    assert!(cmp.is_none());
}

#[test]
fn missing_secondary_method_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let dft = write(dir.path(), "dft.out", DFT);

    let cmp = build_comparison(
        &[source("DFT", dft), source("DP", dir.path().join("absent.out"))],
        &labels(),
        &default_styles(),
    )
    .unwrap()
    .unwrap();
    assert_eq!(cmp.datasets.len(), 1);
    assert!(cmp.figure.series.iter().all(|s| s.group == "DFT"));
}

#[test]
fn figure_and_table_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let dft = write(dir.path(), "dft.out", DFT);
    let dp = write(dir.path(), "dp.out", DP);
    let cmp = build_comparison(
        &[source("DFT", dft), source("DP", dp)],
        &labels(),
        &default_styles(),
    )
    .unwrap()
    .unwrap();

    let geometry = FigureConfig {
        width_in: 4.0,
        height_in: 3.0,
        dpi: 100,
    };
    let written = write_svg(&cmp.figure, &dir.path().join("out/branches.png"), &geometry).unwrap();
    assert_eq!(written.extension().unwrap(), "svg");
    let svg = std::fs::read_to_string(&written).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("DFT"));

    let table = dir.path().join("branches.csv");
    let rows = write_branch_table(&table, &cmp.datasets).unwrap();
    assert_eq!(rows, 9);
    let text = std::fs::read_to_string(&table).unwrap();
    assert_eq!(text.lines().count(), 10);
}

fn small_figure() -> FigureConfig {
    FigureConfig {
        width_in: 4.0,
        height_in: 3.0,
        dpi: 100,
    }
}

#[test]
fn run_without_reference_writes_no_figure() {
    let dir = tempfile::tempdir().unwrap();
    let dp = write(dir.path(), "dp.out", DP);
    let cfg = PhononConfig {
        methods: vec![source("DFT", dir.path().join("absent.out")), source("DP", dp)],
        labels: labels(),
        output: dir.path().join("phonon.svg"),
        table: Some(dir.path().join("phonon.csv")),
        figure: small_figure(),
        show: false,
        ..PhononConfig::default()
    };

    run_phonon(&cfg).unwrap();
    assert!(!cfg.output.exists());
    assert!(!dir.path().join("phonon.csv").exists());
}

#[test]
fn run_writes_figure_and_branch_table() {
    let dir = tempfile::tempdir().unwrap();
    let dft = write(dir.path(), "dft.out", DFT);
    let dp = write(dir.path(), "dp.out", DP);
    let table = dir.path().join("phonon.csv");
    let cfg = PhononConfig {
        methods: vec![source("DFT", dft), source("DP", dp)],
        labels: labels(),
        output: dir.path().join("plots/phonon.svg"),
        table: Some(table.clone()),
        figure: small_figure(),
        show: false,
        ..PhononConfig::default()
    };

    run_phonon(&cfg).unwrap();
    let svg = std::fs::read_to_string(&cfg.output).unwrap();
    assert!(svg.contains("DP"));
    let text = std::fs::read_to_string(&table).unwrap();
    assert_eq!(text.lines().count(), 10);
}
