use std::path::Path;

use anyhow::{Context, Result};

use super::model::{Branch, FrequencySample, MethodDataset};

/// Comment annotation that opens the high-symmetry point block.
const SEGMENT_LABEL: &str = "End points of segments";
const COMMENT: char = '#';

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read a blank-line segmented `q freq` file (phonopy `band.out` style).
///
/// Only I/O failures are errors; malformed data lines are dropped.
pub fn read_branches(path: &Path, method: &str) -> Result<MethodDataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading phonon file {}", path.display()))?;
    let dataset = read_branches_from_str(&text, method);
    log::debug!(
        "{}: {} branches, {} samples, {} high-symmetry points",
        path.display(),
        dataset.branches.len(),
        dataset.sample_count(),
        dataset.high_symmetry_points.len()
    );
    Ok(dataset)
}

/// Parse phonon branch text already held in memory.
///
/// * blank line → closes the current branch (if it has samples)
/// * `# End points of segments: a b c` → starts the point block; numbers
///   after the colon and on following comment lines are collected
/// * any other line → two floats `(q, freq)`, or silently skipped
pub fn read_branches_from_str(text: &str, method: &str) -> MethodDataset {
    let mut parser = BranchParser::new(method);
    for (line_no, raw) in text.lines().enumerate() {
        parser.feed(line_no + 1, raw.trim());
    }
    parser.finish()
}

// ---------------------------------------------------------------------------
// Line-oriented state machine
// ---------------------------------------------------------------------------

struct BranchParser {
    method: String,
    branches: Vec<Branch>,
    current: Vec<FrequencySample>,
    points: Vec<f64>,
    reading_points: bool,
}

impl BranchParser {
    fn new(method: &str) -> Self {
        Self {
            method: method.to_string(),
            branches: Vec::new(),
            current: Vec::new(),
            points: Vec::new(),
            reading_points: false,
        }
    }

    fn feed(&mut self, line_no: usize, line: &str) {
        if line.is_empty() {
            self.flush();
            return;
        }

        if let Some(body) = line.strip_prefix(COMMENT) {
            self.comment(line_no, line, body);
            return;
        }

        self.reading_points = false;
        match parse_sample(line) {
            Some(sample) => self.current.push(sample),
            None => log::trace!("line {line_no}: skipped malformed data line {line:?}"),
        }
    }

    fn comment(&mut self, line_no: usize, line: &str, body: &str) {
        if line.contains(SEGMENT_LABEL) {
            self.reading_points = true;
            if let Some(inline) = line.split(':').nth(1) {
                self.collect_points(line_no, inline);
            }
            return;
        }
        if self.reading_points {
            self.collect_points(line_no, body.trim_start_matches(COMMENT));
        }
    }

    /// Append the numbers of one annotation line. A line with any
    /// non-numeric token ends the block and contributes nothing.
    fn collect_points(&mut self, line_no: usize, text: &str) {
        let parsed: Result<Vec<f64>, _> = text.split_whitespace().map(str::parse::<f64>).collect();
        match parsed {
            Ok(values) => self.points.extend(values),
            Err(_) => {
                log::warn!("line {line_no}: non-numeric high-symmetry annotation {text:?}, block closed");
                self.reading_points = false;
            }
        }
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let samples = std::mem::take(&mut self.current);
        self.branches.push(Branch {
            method: self.method.clone(),
            index: self.branches.len(),
            samples,
        });
    }

    fn finish(mut self) -> MethodDataset {
        self.flush();
        MethodDataset {
            method: self.method,
            branches: self.branches,
            high_symmetry_points: self.points,
        }
    }
}

/// Exactly two whitespace-separated floats.
fn parse_sample(line: &str) -> Option<FrequencySample> {
    let mut tokens = line.split_whitespace();
    let q = tokens.next()?.parse().ok()?;
    let freq = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some(FrequencySample { q, freq })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BRANCHES: &str = "\
# End points of segments: 0.0 1.0 2.0
0.0 0.0
0.5 1.5
1.0 2.0

0.0 4.0
1.0 4.5
2.0 5.0
";

    #[test]
    fn blank_lines_delimit_branches_in_order() {
        let ds = read_branches_from_str(TWO_BRANCHES, "DFT");
        assert_eq!(ds.branches.len(), 2);
        assert_eq!(ds.branches[0].index, 0);
        assert_eq!(ds.branches[1].index, 1);
        assert_eq!(ds.branches[0].samples.len(), 3);
        assert_eq!(ds.branches[1].samples[2], FrequencySample { q: 2.0, freq: 5.0 });
        assert!(ds.branches.iter().all(|b| b.method == "DFT"));
    }

    #[test]
    fn inline_segment_points_are_read() {
        let ds = read_branches_from_str(TWO_BRANCHES, "DFT");
        assert_eq!(ds.high_symmetry_points, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn segment_points_continue_on_following_comments() {
        let text = "\
# End points of segments:
#   0.0000  0.1130
#   0.1783  0.3088
0.0 0.1
0.1 0.2
";
        let ds = read_branches_from_str(text, "DP");
        assert_eq!(ds.high_symmetry_points, vec![0.0, 0.1130, 0.1783, 0.3088]);
        assert_eq!(ds.sample_count(), 2);
    }

    #[test]
    fn data_line_ends_the_point_block() {
        let text = "\
# End points of segments: 0.0
0.0 1.0
# 5.0 6.0
0.1 1.1
";
        let ds = read_branches_from_str(text, "DP");
        assert_eq!(ds.high_symmetry_points, vec![0.0]);
        assert_eq!(ds.sample_count(), 2);
    }

    #[test]
    fn textual_comment_closes_the_point_block() {
        let text = "\
# End points of segments: 0.0 0.5
# q-distance, frequency
# 9.0
0.0 1.0
";
        let ds = read_branches_from_str(text, "DP");
        assert_eq!(ds.high_symmetry_points, vec![0.0, 0.5]);
    }

    #[test]
    fn no_annotation_gives_no_points() {
        let ds = read_branches_from_str("0.0 1.0\n0.1 1.2\n", "DP");
        assert!(ds.high_symmetry_points.is_empty());
    }

    #[test]
    fn file_without_blank_lines_is_one_branch() {
        let ds = read_branches_from_str("0.0 1.0\n0.1 1.2\n0.2 1.4", "DP");
        assert_eq!(ds.branches.len(), 1);
        assert_eq!(ds.sample_count(), 3);
    }

    #[test]
    fn malformed_lines_are_skipped_without_aborting() {
        let text = "0.0 1.0\nnot a number\n0.1\n0.2 1.4 9.9\n0.3 abc\n0.4 1.8\n";
        let ds = read_branches_from_str(text, "DP");
        assert_eq!(ds.branches.len(), 1);
        let qs: Vec<f64> = ds.samples().map(|s| s.q).collect();
        assert_eq!(qs, vec![0.0, 0.4]);
    }

    #[test]
    fn repeated_blank_lines_do_not_create_empty_branches() {
        let text = "\n\n0.0 1.0\n\n\n\n0.0 2.0\n\n";
        let ds = read_branches_from_str(text, "DP");
        assert_eq!(ds.branches.len(), 2);
        assert_eq!(ds.branches[1].index, 1);
    }

    #[test]
    fn sample_count_matches_parseable_lines() {
        let mut text = String::new();
        let mut expected = 0;
        for seg in 0..4 {
            for i in 0..(seg + 2) {
                text.push_str(&format!("{} {}\n", i as f64 * 0.1, seg as f64 + i as f64));
                expected += 1;
            }
            text.push('\n');
        }
        let ds = read_branches_from_str(&text, "DP");
        assert_eq!(ds.branches.len(), 4);
        assert_eq!(ds.sample_count(), expected);
    }
}
