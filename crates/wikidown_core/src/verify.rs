//! Line comparison of translated pages against reference Markdown.

use serde::Serialize;
use similar::{Algorithm, DiffTag, capture_diff_slices};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    /// Collapse whitespace runs and skip blank lines on both sides.
    pub ignore_whitespace: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignore_whitespace: true,
        }
    }
}

/// One differing line. `line` is 1-based and refers to the expected side
/// when it has a line there, to the obtained side otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiff {
    pub line: usize,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Identical,
    Mismatch(Vec<LineDiff>),
}

impl Comparison {
    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical)
    }

    pub fn diffs(&self) -> &[LineDiff] {
        match self {
            Self::Identical => &[],
            Self::Mismatch(diffs) => diffs,
        }
    }
}

struct Side<'a> {
    keys: Vec<String>,
    lines: Vec<(usize, &'a str)>,
}

impl<'a> Side<'a> {
    fn new<S: AsRef<str>>(lines: &'a [S], options: &CompareOptions) -> Self {
        let mut keys = Vec::with_capacity(lines.len());
        let mut kept = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let key = if options.ignore_whitespace {
                let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
                if collapsed.is_empty() {
                    continue;
                }
                collapsed
            } else {
                line.to_string()
            };
            keys.push(key);
            kept.push((index + 1, line));
        }
        Self { keys, lines: kept }
    }

    fn get(&self, index: usize) -> Option<(usize, String)> {
        self.lines
            .get(index)
            .map(|(number, text)| (*number, (*text).to_string()))
    }
}

pub fn compare<A: AsRef<str>, E: AsRef<str>>(
    actual: &[A],
    expected: &[E],
    options: &CompareOptions,
) -> Comparison {
    let expected = Side::new(expected, options);
    let actual = Side::new(actual, options);
    if expected.keys == actual.keys {
        return Comparison::Identical;
    }

    let mut diffs = Vec::new();
    for op in capture_diff_slices(
        Algorithm::Myers,
        expected.keys.as_slice(),
        actual.keys.as_slice(),
    ) {
        let (tag, old, new) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            continue;
        }
        for offset in 0..old.len().max(new.len()) {
            let left = (offset < old.len())
                .then(|| expected.get(old.start + offset))
                .flatten();
            let right = (offset < new.len())
                .then(|| actual.get(new.start + offset))
                .flatten();
            let line = match (&left, &right) {
                (Some((number, _)), _) | (None, Some((number, _))) => *number,
                (None, None) => continue,
            };
            diffs.push(LineDiff {
                line,
                expected: left.map(|(_, text)| text),
                actual: right.map(|(_, text)| text),
            });
        }
    }
    Comparison::Mismatch(diffs)
}

#[derive(Debug, Clone, Copy)]
pub struct SideBySideTitles<'a> {
    pub left: &'a str,
    pub right: &'a str,
}

impl Default for SideBySideTitles<'_> {
    fn default() -> Self {
        Self {
            left: "verification (expected)",
            right: "converted (obtained)",
        }
    }
}

const GUTTER: usize = 6;
const MIN_COLUMN: usize = 12;

/// Two-column report: expected text on the left, obtained on the right.
/// Long lines wrap inside their column. Markers between the columns are
/// `|` for a changed line, `<` for a line only expected and `>` for a line
/// only obtained.
pub fn render_side_by_side(diffs: &[LineDiff], width: usize, titles: SideBySideTitles<'_>) -> String {
    let column = (width.saturating_sub(GUTTER + 3) / 2).max(MIN_COLUMN);
    let mut out = String::new();
    out.push_str(&format!(
        "{:>gutter$} {:<column$} | {}\n",
        "line",
        titles.left,
        titles.right,
        gutter = GUTTER - 1
    ));
    out.push_str(&format!(
        "{}+{}+{}\n",
        "-".repeat(GUTTER),
        "-".repeat(column + 2),
        "-".repeat(column + 1)
    ));

    for diff in diffs {
        let marker = match (&diff.expected, &diff.actual) {
            (Some(_), Some(_)) => '|',
            (Some(_), None) => '<',
            _ => '>',
        };
        let left = wrap(diff.expected.as_deref().unwrap_or(""), column);
        let right = wrap(diff.actual.as_deref().unwrap_or(""), column);
        for row in 0..left.len().max(right.len()) {
            let number = if row == 0 {
                diff.line.to_string()
            } else {
                String::new()
            };
            let left_row = left.get(row).map(String::as_str).unwrap_or("");
            let right_row = right.get(row).map(String::as_str).unwrap_or("");
            let line = format!(
                "{number:>gutter$} {left_row:<column$} {marker} {right_row}",
                gutter = GUTTER - 1
            );
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let chars = text.chars().collect::<Vec<_>>();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}
