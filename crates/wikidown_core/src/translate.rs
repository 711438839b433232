use log::{debug, trace};
use serde::Serialize;

use crate::classify::{
    BlockKind, ClassifiedLine, Classifier, FenceKind, ListDepthPolicy, Region, cell_delimiters,
};
use crate::dialect::{BACKTICK_FENCE, CELL_DELIMITER, CODE_TICK, MARKDOWN_LIST_INDENT};
use crate::inline::{LinkTarget, rewrite_with_links};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    pub list_depth: ListDepthPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub lines: Vec<String>,
    /// Internal link targets in order of appearance, duplicates included.
    pub links: Vec<LinkTarget>,
}

impl Translation {
    /// The page as one document, each line terminated by `\n`.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// One wiki page. The title is the source file stem.
#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    pub source: Vec<String>,
    pub reference: Option<Vec<String>>,
    translation: Option<Translation>,
}

impl Page {
    pub fn from_source(title: impl Into<String>, text: &str) -> Self {
        Self {
            title: title.into(),
            source: split_lines(text),
            reference: None,
            translation: None,
        }
    }

    pub fn with_reference(mut self, text: &str) -> Self {
        self.reference = Some(split_lines(text));
        self
    }

    /// Translates the page on first call; later calls return the same output.
    pub fn translate(&mut self, options: &TranslateOptions) -> &Translation {
        let title = &self.title;
        let source = &self.source;
        self.translation.get_or_insert_with(|| {
            let translation = translate_lines(source, options);
            debug!(
                "translated {title}: {} source lines -> {} markdown lines, {} links",
                source.len(),
                translation.lines.len(),
                translation.links.len()
            );
            translation
        })
    }

    pub fn translation(&self) -> Option<&Translation> {
        self.translation.as_ref()
    }
}

pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

pub fn split_lines(text: &str) -> Vec<String> {
    normalize_line_endings(text)
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn translate_text(text: &str, options: &TranslateOptions) -> Translation {
    translate_lines(&split_lines(text), options)
}

pub fn translate_lines<S: AsRef<str>>(lines: &[S], options: &TranslateOptions) -> Translation {
    let mut classifier = Classifier::new(options.list_depth);
    let mut emitter = Emitter::default();
    for line in lines {
        let before = classifier.region().clone();
        let classified = classifier.step(line.as_ref());
        if *classifier.region() != before {
            trace!(
                "line {}: {:?} -> {:?}",
                classified.line_number,
                before,
                classifier.region()
            );
        }
        emitter.emit(classified);
    }
    if let Region::Preformatted(fence) = classifier.region() {
        debug!("closing preformatted block left open at end of page");
        match fence {
            FenceKind::Angle => emitter.close_angle_block(),
            FenceKind::Backtick(ticks) => emitter.lines.push(tick_run(*ticks)),
        }
    }
    emitter.finish()
}

#[derive(Debug, Default)]
struct Emitter {
    lines: Vec<String>,
    links: Vec<LinkTarget>,
    previous: Option<BlockKind>,
    table_open: bool,
    /// Interior of an open `<<` block; fenced once its longest backtick run
    /// is known.
    angle_block: Option<Vec<String>>,
}

impl Emitter {
    fn emit(&mut self, line: ClassifiedLine) {
        let ClassifiedLine { kind, content, .. } = line;

        if self.table_open && !kind.is_table() {
            self.table_open = false;
            self.push_blank();
        }

        match &kind {
            BlockKind::Blank => self.push_blank(),
            BlockKind::Paragraph => {
                if self.previous.as_ref().is_some_and(BlockKind::is_list_item) {
                    self.push_blank();
                }
                let text = self.inline(&content, &kind);
                self.lines.push(text);
            }
            BlockKind::Heading { level } => {
                let text = self.inline(&content, &kind);
                self.lines.push(format!("{} {text}", "#".repeat(*level)));
            }
            BlockKind::UnorderedItem { depth } => {
                self.separate_list_from_paragraph();
                let text = self.inline(&content, &kind);
                self.lines
                    .push(format!("{}* {text}", MARKDOWN_LIST_INDENT.repeat(*depth)));
            }
            BlockKind::OrderedItem { depth, number } => {
                self.separate_list_from_paragraph();
                let text = self.inline(&content, &kind);
                self.lines.push(format!(
                    "{}{number}. {text}",
                    MARKDOWN_LIST_INDENT.repeat(*depth)
                ));
            }
            BlockKind::HorizontalRule => {
                // `---` under a text line would read as a setext heading.
                self.push_blank();
                self.lines.push("---".to_string());
            }
            BlockKind::Anchor => {
                self.lines.push(format!(
                    "<a name=\"{}\"></a>",
                    html_escape::encode_double_quoted_attribute(&content)
                ));
            }
            BlockKind::TableFrame => {}
            BlockKind::TableRow { header } => self.emit_table_row(&content, *header, &kind),
            BlockKind::PreformattedOpen(FenceKind::Angle) => self.angle_block = Some(Vec::new()),
            BlockKind::PreformattedClose(FenceKind::Angle) => self.close_angle_block(),
            BlockKind::Preformatted => match self.angle_block.as_mut() {
                Some(body) => body.push(content),
                None => self.lines.push(content),
            },
            BlockKind::PreformattedOpen(FenceKind::Backtick(_))
            | BlockKind::PreformattedClose(FenceKind::Backtick(_)) => self.lines.push(content),
        }

        self.previous = Some(kind);
    }

    fn inline(&mut self, text: &str, kind: &BlockKind) -> String {
        let (out, links) = rewrite_with_links(text, kind);
        self.links.extend(links);
        out
    }

    fn separate_list_from_paragraph(&mut self) {
        if matches!(self.previous, Some(BlockKind::Paragraph)) {
            self.push_blank();
        }
    }

    fn emit_table_row(&mut self, row: &str, header: bool, kind: &BlockKind) {
        let cells = split_cells(row)
            .iter()
            .map(|cell| self.inline(cell, kind))
            .collect::<Vec<_>>();
        if header {
            self.push_blank();
            self.table_open = true;
        }
        self.lines.push(format!("| {} |", cells.join(" | ")));
        if header {
            self.lines
                .push(format!("|{}", " --- |".repeat(cells.len().max(1))));
        }
    }

    fn close_angle_block(&mut self) {
        let Some(body) = self.angle_block.take() else {
            return;
        };
        let fence = fence_for(&body);
        self.lines.push(fence.clone());
        self.lines.extend(body);
        self.lines.push(fence);
    }

    fn push_blank(&mut self) {
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn finish(mut self) -> Translation {
        while self.lines.last().is_some_and(|line| line.trim().is_empty()) {
            self.lines.pop();
        }
        Translation {
            lines: self.lines,
            links: self.links,
        }
    }
}

fn tick_run(ticks: usize) -> String {
    CODE_TICK.to_string().repeat(ticks)
}

/// A backtick fence one tick longer than any backtick run in `body`, and
/// never shorter than ```` ``` ````, so no interior line can close it.
fn fence_for(body: &[String]) -> String {
    let longest = body
        .iter()
        .flat_map(|line| line.split(|ch: char| ch != CODE_TICK))
        .map(str::len)
        .max()
        .unwrap_or(0);
    tick_run((longest + 1).max(BACKTICK_FENCE.len()))
}

/// Splits a table row into trimmed cells. Border pipes are optional; a `|`
/// escaped, inside brackets or inside a code span does not split.
pub fn split_cells(row: &str) -> Vec<String> {
    let mut row = row.trim();
    if let Some(rest) = row.strip_prefix(CELL_DELIMITER) {
        row = rest;
    }
    if row.ends_with(CELL_DELIMITER) && !row.ends_with("\\|") {
        row = &row[..row.len() - 1];
    }

    let mut cells = Vec::new();
    let mut start = 0usize;
    for delimiter in cell_delimiters(row) {
        cells.push(row[start..delimiter].trim().to_string());
        start = delimiter + CELL_DELIMITER.len_utf8();
    }
    cells.push(row[start..].trim().to_string());
    cells
}
