use serde::{Deserialize, Serialize};

use crate::dialect::{
    ANCHOR_PREFIX, BACKTICK_FENCE, BULLET_MARKER, CELL_DELIMITER, CODE_TICK, ESCAPE_CHAR,
    HEADING_MARKER, HORIZONTAL_RULE_MIN, MAX_HEADING_LEVEL, ORDERED_SUFFIX, PRE_OPEN,
    REGION_CLOSE, SPACES_PER_INDENT_UNIT, TABLE_OPEN,
};

/// How list depth jumps of more than one level are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListDepthPolicy {
    /// Take each line's depth at face value.
    #[default]
    Preserve,
    /// Never go more than one level deeper than the previous list line.
    Clamp,
}

impl ListDepthPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preserve => "preserve",
            Self::Clamp => "clamp",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "preserve" => Some(Self::Preserve),
            "clamp" => Some(Self::Clamp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    /// `<<` ... `>>`
    Angle,
    /// A backtick fence; closes on a run at least this long.
    Backtick(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Blank,
    Paragraph,
    Heading { level: usize },
    UnorderedItem { depth: usize },
    OrderedItem { depth: usize, number: String },
    HorizontalRule,
    Anchor,
    /// `<<|`, `>>` and blank lines inside a framed table. Emit nothing.
    TableFrame,
    TableRow { header: bool },
    PreformattedOpen(FenceKind),
    Preformatted,
    PreformattedClose(FenceKind),
}

impl BlockKind {
    pub fn is_preformatted(&self) -> bool {
        matches!(
            self,
            Self::PreformattedOpen(_) | Self::Preformatted | Self::PreformattedClose(_)
        )
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, Self::UnorderedItem { .. } | Self::OrderedItem { .. })
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Self::TableRow { .. } | Self::TableFrame)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Paragraph => "paragraph",
            Self::Heading { .. } => "heading",
            Self::UnorderedItem { .. } => "unordered-item",
            Self::OrderedItem { .. } => "ordered-item",
            Self::HorizontalRule => "horizontal-rule",
            Self::Anchor => "anchor",
            Self::TableFrame => "table-frame",
            Self::TableRow { .. } => "table-row",
            Self::PreformattedOpen(_) => "preformatted-open",
            Self::Preformatted => "preformatted",
            Self::PreformattedClose(_) => "preformatted-close",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// 1-based position in the source page.
    pub line_number: usize,
    pub kind: BlockKind,
    /// The line with its block marker removed. Verbatim for preformatted lines.
    pub content: String,
}

/// The open block region. Exactly one is active at any line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    Paragraph,
    Heading,
    List { ordered: bool, depth: usize },
    Table { framed: bool, rows: usize },
    Preformatted(FenceKind),
}

/// Line classifier state machine. The open region is the only state carried
/// from one line to the next.
#[derive(Debug, Clone)]
pub struct Classifier {
    region: Region,
    policy: ListDepthPolicy,
    line_number: usize,
}

impl Classifier {
    pub fn new(policy: ListDepthPolicy) -> Self {
        Self {
            region: Region::Paragraph,
            policy,
            line_number: 0,
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn step(&mut self, raw: &str) -> ClassifiedLine {
        self.line_number += 1;
        let line = raw.trim_end_matches(['\r', '\n']);
        let (kind, content, next) = self.transition(line);
        self.region = next;
        ClassifiedLine {
            line_number: self.line_number,
            kind,
            content,
        }
    }

    fn transition(&self, line: &str) -> (BlockKind, String, Region) {
        match &self.region {
            Region::Preformatted(fence) => {
                if closes_fence(line, *fence) {
                    return (
                        BlockKind::PreformattedClose(*fence),
                        line.trim().to_string(),
                        Region::Paragraph,
                    );
                }
                (
                    BlockKind::Preformatted,
                    line.to_string(),
                    Region::Preformatted(*fence),
                )
            }
            Region::Table { framed: true, rows } => {
                let trimmed = line.trim();
                if trimmed == REGION_CLOSE {
                    return (BlockKind::TableFrame, String::new(), Region::Paragraph);
                }
                if trimmed.is_empty() {
                    return (
                        BlockKind::TableFrame,
                        String::new(),
                        Region::Table {
                            framed: true,
                            rows: *rows,
                        },
                    );
                }
                (
                    BlockKind::TableRow { header: *rows == 0 },
                    trimmed.to_string(),
                    Region::Table {
                        framed: true,
                        rows: rows + 1,
                    },
                )
            }
            _ => self.classify_fresh(line),
        }
    }

    fn classify_fresh(&self, line: &str) -> (BlockKind, String, Region) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return (BlockKind::Blank, String::new(), Region::Paragraph);
        }

        if trimmed.starts_with(TABLE_OPEN) {
            return (
                BlockKind::TableFrame,
                String::new(),
                Region::Table {
                    framed: true,
                    rows: 0,
                },
            );
        }
        if trimmed == PRE_OPEN {
            return (
                BlockKind::PreformattedOpen(FenceKind::Angle),
                String::new(),
                Region::Preformatted(FenceKind::Angle),
            );
        }
        if trimmed.starts_with(BACKTICK_FENCE) {
            let ticks = trimmed.chars().take_while(|ch| *ch == CODE_TICK).count();
            let fence = FenceKind::Backtick(ticks);
            return (
                BlockKind::PreformattedOpen(fence),
                trimmed.to_string(),
                Region::Preformatted(fence),
            );
        }

        if let Some((level, text)) = parse_heading(line) {
            return (
                BlockKind::Heading { level },
                text.to_string(),
                Region::Heading,
            );
        }
        if is_horizontal_rule(line) {
            return (BlockKind::HorizontalRule, String::new(), Region::Paragraph);
        }
        if let Some(name) = parse_anchor(trimmed) {
            return (BlockKind::Anchor, name.to_string(), Region::Paragraph);
        }
        if let Some(item) = parse_list_item(line) {
            let depth = self.apply_depth_policy(item.depth);
            let kind = match item.number {
                Some(number) => BlockKind::OrderedItem {
                    depth,
                    number: number.to_string(),
                },
                None => BlockKind::UnorderedItem { depth },
            };
            return (
                kind,
                item.text.to_string(),
                Region::List {
                    ordered: item.number.is_some(),
                    depth,
                },
            );
        }
        if is_bare_table_row(trimmed) {
            let rows = match self.region {
                Region::Table { framed: false, rows } => rows,
                _ => 0,
            };
            return (
                BlockKind::TableRow { header: rows == 0 },
                trimmed.to_string(),
                Region::Table {
                    framed: false,
                    rows: rows + 1,
                },
            );
        }

        (
            BlockKind::Paragraph,
            line.trim_start().to_string(),
            Region::Paragraph,
        )
    }

    fn apply_depth_policy(&self, depth: usize) -> usize {
        match self.policy {
            ListDepthPolicy::Preserve => depth,
            ListDepthPolicy::Clamp => match self.region {
                Region::List {
                    depth: previous, ..
                } => depth.min(previous + 1),
                _ => 0,
            },
        }
    }
}

/// Classifies a whole page. Never fails; unrecognized lines are paragraphs
/// and unterminated regions simply run to the end of the input.
pub fn classify<S: AsRef<str>>(lines: &[S], policy: ListDepthPolicy) -> Vec<ClassifiedLine> {
    let mut classifier = Classifier::new(policy);
    lines
        .iter()
        .map(|line| classifier.step(line.as_ref()))
        .collect()
}

fn closes_fence(line: &str, fence: FenceKind) -> bool {
    let trimmed = line.trim();
    match fence {
        FenceKind::Angle => trimmed == REGION_CLOSE,
        FenceKind::Backtick(ticks) => {
            let run = trimmed.chars().take_while(|ch| *ch == CODE_TICK).count();
            run >= ticks && run == trimmed.len()
        }
    }
}

fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let markers = line
        .chars()
        .take_while(|ch| *ch == HEADING_MARKER)
        .count();
    if markers == 0 {
        return None;
    }
    let text = line[markers..].trim();
    if text.is_empty() {
        return None;
    }
    Some((markers.min(MAX_HEADING_LEVEL), text))
}

fn is_horizontal_rule(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.len() >= HORIZONTAL_RULE_MIN && trimmed.chars().all(|ch| ch == '-')
}

fn parse_anchor(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix(ANCHOR_PREFIX)?.trim();
    let name = rest.split_whitespace().next()?;
    if name.len() != rest.len() {
        return None;
    }
    Some(name)
}

#[derive(Debug)]
struct ListItem<'a> {
    depth: usize,
    number: Option<&'a str>,
    text: &'a str,
}

fn parse_list_item(line: &str) -> Option<ListItem<'_>> {
    let mut units = 0usize;
    let mut spaces = 0usize;
    let mut offset = 0usize;
    for ch in line.chars() {
        match ch {
            '\t' => {
                units += 1;
                spaces = 0;
            }
            ' ' => {
                spaces += 1;
                if spaces == SPACES_PER_INDENT_UNIT {
                    units += 1;
                    spaces = 0;
                }
            }
            _ => break,
        }
        offset += ch.len_utf8();
    }
    let rest = &line[offset..];

    let stars = rest.chars().take_while(|ch| *ch == BULLET_MARKER).count();
    if stars > 0 {
        let after = &rest[stars..];
        let text = after.trim_start();
        if starts_with_whitespace(after) && !text.is_empty() {
            return Some(ListItem {
                depth: units + stars - 1,
                number: None,
                text: text.trim_end(),
            });
        }
        return None;
    }

    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && rest[digits..].starts_with(ORDERED_SUFFIX) {
        let after = &rest[digits + 1..];
        let text = after.trim_start();
        if starts_with_whitespace(after) && !text.is_empty() {
            return Some(ListItem {
                depth: units,
                number: Some(&rest[..digits]),
                text: text.trim_end(),
            });
        }
    }
    None
}

fn starts_with_whitespace(value: &str) -> bool {
    value.chars().next().is_some_and(char::is_whitespace)
}

/// A row outside a `<<|` frame: either bordered (`| a |`) or carrying at
/// least two cell delimiters (`a | b | c`).
fn is_bare_table_row(trimmed: &str) -> bool {
    let bordered = trimmed.len() >= 3
        && trimmed.starts_with(CELL_DELIMITER)
        && trimmed.ends_with(CELL_DELIMITER);
    bordered || cell_delimiters(trimmed).len() >= 2
}

/// Byte offsets of the `|` characters that separate table cells. A `|`
/// escaped, inside brackets or inside a code span separates nothing.
pub fn cell_delimiters(row: &str) -> Vec<usize> {
    let mut delimiters = Vec::new();
    let mut brackets = 0usize;
    let mut in_code = false;
    let mut chars = row.char_indices();
    while let Some((index, ch)) = chars.next() {
        match ch {
            ESCAPE_CHAR => {
                chars.next();
            }
            CODE_TICK => in_code = !in_code,
            '[' if !in_code => brackets += 1,
            ']' if !in_code => brackets = brackets.saturating_sub(1),
            CELL_DELIMITER if !in_code && brackets == 0 => delimiters.push(index),
            _ => {}
        }
    }
    delimiters
}

#[cfg(test)]
mod tests {
    use super::{
        BlockKind, ClassifiedLine, Classifier, FenceKind, ListDepthPolicy, Region,
        cell_delimiters, classify,
    };

    fn kinds(lines: &[&str], policy: ListDepthPolicy) -> Vec<BlockKind> {
        classify(lines, policy)
            .into_iter()
            .map(|line| line.kind)
            .collect()
    }

    #[test]
    fn headings_take_depth_from_marker_count() {
        let out = classify(&["+ One", "+++Three", "++++++++ Deep"], ListDepthPolicy::Preserve);
        assert_eq!(out[0].kind, BlockKind::Heading { level: 1 });
        assert_eq!(out[0].content, "One");
        assert_eq!(out[1].kind, BlockKind::Heading { level: 3 });
        assert_eq!(out[1].content, "Three");
        assert_eq!(out[2].kind, BlockKind::Heading { level: 6 });
    }

    #[test]
    fn lone_plus_is_paragraph_text() {
        assert_eq!(
            kinds(&["+", "+++   "], ListDepthPolicy::Preserve),
            vec![BlockKind::Paragraph, BlockKind::Paragraph]
        );
    }

    #[test]
    fn list_depth_comes_from_indentation_and_marker_repetition() {
        let out = classify(
            &["* top", "\t* tab", "        * eight", "** doubled", "1. first", "\t12. nested"],
            ListDepthPolicy::Preserve,
        );
        assert_eq!(out[0].kind, BlockKind::UnorderedItem { depth: 0 });
        assert_eq!(out[0].content, "top");
        assert_eq!(out[1].kind, BlockKind::UnorderedItem { depth: 1 });
        assert_eq!(out[2].kind, BlockKind::UnorderedItem { depth: 2 });
        assert_eq!(out[3].kind, BlockKind::UnorderedItem { depth: 1 });
        assert_eq!(
            out[4].kind,
            BlockKind::OrderedItem {
                depth: 0,
                number: "1".to_string()
            }
        );
        assert_eq!(
            out[5].kind,
            BlockKind::OrderedItem {
                depth: 1,
                number: "12".to_string()
            }
        );
        assert_eq!(out[5].content, "nested");
    }

    #[test]
    fn bold_at_line_start_is_not_a_bullet() {
        assert_eq!(
            kinds(&["**bold** text", "*", "1.5 litres"], ListDepthPolicy::Preserve),
            vec![
                BlockKind::Paragraph,
                BlockKind::Paragraph,
                BlockKind::Paragraph
            ]
        );
    }

    #[test]
    fn depth_jumps_pass_through_by_default() {
        assert_eq!(
            kinds(&["* a", "\t\t\t* d"], ListDepthPolicy::Preserve),
            vec![
                BlockKind::UnorderedItem { depth: 0 },
                BlockKind::UnorderedItem { depth: 3 }
            ]
        );
    }

    #[test]
    fn clamp_policy_limits_jumps_to_one_level() {
        assert_eq!(
            kinds(
                &["\t\t* starts deep", "* a", "\t\t\t* d", "\t\t\t* e", "\t* back"],
                ListDepthPolicy::Clamp
            ),
            vec![
                BlockKind::UnorderedItem { depth: 0 },
                BlockKind::UnorderedItem { depth: 0 },
                BlockKind::UnorderedItem { depth: 1 },
                BlockKind::UnorderedItem { depth: 2 },
                BlockKind::UnorderedItem { depth: 1 },
            ]
        );
    }

    #[test]
    fn angle_block_absorbs_lines_until_close() {
        let out = classify(
            &["<<", "++ not a heading", "* not a list", ">>", "after"],
            ListDepthPolicy::Preserve,
        );
        assert_eq!(out[0].kind, BlockKind::PreformattedOpen(FenceKind::Angle));
        assert_eq!(out[1].kind, BlockKind::Preformatted);
        assert_eq!(out[1].content, "++ not a heading");
        assert_eq!(out[2].kind, BlockKind::Preformatted);
        assert_eq!(out[3].kind, BlockKind::PreformattedClose(FenceKind::Angle));
        assert_eq!(out[4].kind, BlockKind::Paragraph);
    }

    #[test]
    fn fence_markers_must_match() {
        let out = classify(&["```", ">>", "``", "```"], ListDepthPolicy::Preserve);
        assert_eq!(out[0].kind, BlockKind::PreformattedOpen(FenceKind::Backtick(3)));
        assert_eq!(out[1].kind, BlockKind::Preformatted);
        assert_eq!(out[2].kind, BlockKind::Preformatted);
        assert_eq!(out[3].kind, BlockKind::PreformattedClose(FenceKind::Backtick(3)));

        let out = classify(&["<<", "```", ">>"], ListDepthPolicy::Preserve);
        assert_eq!(out[1].kind, BlockKind::Preformatted);
        assert_eq!(out[2].kind, BlockKind::PreformattedClose(FenceKind::Angle));
    }

    #[test]
    fn unterminated_block_runs_to_end_of_page() {
        let mut classifier = Classifier::new(ListDepthPolicy::Preserve);
        for line in ["text", "<<", "code", "+ still code"] {
            classifier.step(line);
        }
        assert_eq!(
            classifier.region(),
            &Region::Preformatted(FenceKind::Angle)
        );
    }

    #[test]
    fn framed_table_marks_header_and_frame_lines() {
        assert_eq!(
            kinds(
                &["<<|", "a | b", "", "c | d", ">>", "text"],
                ListDepthPolicy::Preserve
            ),
            vec![
                BlockKind::TableFrame,
                BlockKind::TableRow { header: true },
                BlockKind::TableFrame,
                BlockKind::TableRow { header: false },
                BlockKind::TableFrame,
                BlockKind::Paragraph,
            ]
        );
    }

    #[test]
    fn bare_table_rows_group_until_another_block() {
        assert_eq!(
            kinds(
                &["| a | b |", "| 1 | 2 |", "text", "| x | y |"],
                ListDepthPolicy::Preserve
            ),
            vec![
                BlockKind::TableRow { header: true },
                BlockKind::TableRow { header: false },
                BlockKind::Paragraph,
                BlockKind::TableRow { header: true },
            ]
        );
    }

    #[test]
    fn borderless_rows_need_two_live_delimiters() {
        assert_eq!(
            kinds(
                &[
                    "a | b | c",
                    "1 | 2 | 3",
                    "",
                    "a | b",
                    "[[A|one]] and [[B|two]]",
                    "`x|y|z` \\| w",
                ],
                ListDepthPolicy::Preserve
            ),
            vec![
                BlockKind::TableRow { header: true },
                BlockKind::TableRow { header: false },
                BlockKind::Blank,
                BlockKind::Paragraph,
                BlockKind::Paragraph,
                BlockKind::Paragraph,
            ]
        );
        assert_eq!(cell_delimiters("a | [b|c] | `d|e` \\| f"), vec![2, 10]);
    }

    #[test]
    fn rules_anchors_and_blanks() {
        let out = classify(
            &["----", "---", "anchor: intro", "anchor: two words", "   "],
            ListDepthPolicy::Preserve,
        );
        assert_eq!(out[0].kind, BlockKind::HorizontalRule);
        assert_eq!(out[1].kind, BlockKind::Paragraph);
        assert_eq!(out[2].kind, BlockKind::Anchor);
        assert_eq!(out[2].content, "intro");
        assert_eq!(out[3].kind, BlockKind::Paragraph);
        assert_eq!(out[4].kind, BlockKind::Blank);
    }

    #[test]
    fn paragraph_lines_lose_leading_indentation_only() {
        let out = classify(&["    indented text  "], ListDepthPolicy::Preserve);
        assert_eq!(
            out,
            vec![ClassifiedLine {
                line_number: 1,
                kind: BlockKind::Paragraph,
                content: "indented text  ".to_string(),
            }]
        );
    }

    #[test]
    fn empty_page_classifies_to_nothing() {
        let lines: [&str; 0] = [];
        assert!(classify(&lines, ListDepthPolicy::Preserve).is_empty());
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(ListDepthPolicy::parse("Clamp"), Some(ListDepthPolicy::Clamp));
        assert_eq!(
            ListDepthPolicy::parse(" preserve "),
            Some(ListDepthPolicy::Preserve)
        );
        assert_eq!(ListDepthPolicy::parse("flatten"), None);
    }
}
