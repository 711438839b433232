//! Static WikidPad -> Markdown marker table.
//!
//! Both the line classifier and the inline rewriter read their markers from
//! here, so the mapping lives in one explicit place instead of being spread
//! over conditionals.

pub const MAX_HEADING_LEVEL: usize = 6;

/// Leading spaces that make up one list indentation unit in the source.
pub const SPACES_PER_INDENT_UNIT: usize = 4;

/// Markdown indentation emitted per list nesting level. Four spaces nest
/// under both `* ` and `N. ` parents.
pub const MARKDOWN_LIST_INDENT: &str = "    ";

pub const HEADING_MARKER: char = '+';
pub const BULLET_MARKER: char = '*';
pub const ORDERED_SUFFIX: char = '.';
pub const HORIZONTAL_RULE_MIN: usize = 4;
pub const ANCHOR_PREFIX: &str = "anchor:";
pub const PRE_OPEN: &str = "<<";
pub const TABLE_OPEN: &str = "<<|";
pub const REGION_CLOSE: &str = ">>";
pub const BACKTICK_FENCE: &str = "```";
pub const ESCAPE_CHAR: char = '\\';
pub const CODE_TICK: char = '`';
pub const CELL_DELIMITER: char = '|';
pub const LINK_ALIAS: char = '|';
pub const LINK_ANCHOR_BANG: char = '!';
pub const LINK_FRAGMENT: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmphasisKind {
    Strong,
    Italic,
}

impl EmphasisKind {
    pub fn markdown(self) -> &'static str {
        match self {
            Self::Strong => "**",
            Self::Italic => "*",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Italic => "italic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmphasisMarker {
    pub token: &'static str,
    pub kind: EmphasisKind,
}

/// Emphasis markers; the same token opens and closes a span.
pub const EMPHASIS_MARKERS: [EmphasisMarker; 3] = [
    EmphasisMarker {
        token: "**",
        kind: EmphasisKind::Strong,
    },
    EmphasisMarker {
        token: "''",
        kind: EmphasisKind::Italic,
    },
    EmphasisMarker {
        token: "//",
        kind: EmphasisKind::Italic,
    },
];

/// Returns the emphasis marker starting at byte `pos`, if any.
///
/// `//` directly after `:` is part of a URL scheme and never a marker.
pub fn emphasis_marker_at(text: &str, pos: usize) -> Option<EmphasisMarker> {
    let rest = text.get(pos..)?;
    let marker = EMPHASIS_MARKERS
        .iter()
        .find(|marker| rest.starts_with(marker.token))
        .copied()?;
    if marker.token == "//" && text[..pos].ends_with(':') {
        return None;
    }
    Some(marker)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRuleKind {
    Heading,
    Bullet,
    Ordered,
    HorizontalRule,
    Anchor,
    Preformatted,
    BacktickFence,
    FramedTable,
    BareTableRow,
}

/// One row of the block-level mapping: a sample source line and the
/// Markdown it produces on its own.
#[derive(Debug, Clone, Copy)]
pub struct BlockRule {
    pub kind: BlockRuleKind,
    pub source: &'static str,
    pub markdown: &'static str,
}

pub const BLOCK_RULES: [BlockRule; 9] = [
    BlockRule {
        kind: BlockRuleKind::Heading,
        source: "++ Title",
        markdown: "## Title",
    },
    BlockRule {
        kind: BlockRuleKind::Bullet,
        source: "\t* item",
        markdown: "    * item",
    },
    BlockRule {
        kind: BlockRuleKind::Ordered,
        source: "2. item",
        markdown: "2. item",
    },
    BlockRule {
        kind: BlockRuleKind::HorizontalRule,
        source: "-----",
        markdown: "---",
    },
    BlockRule {
        kind: BlockRuleKind::Anchor,
        source: "anchor: intro",
        markdown: "<a name=\"intro\"></a>",
    },
    BlockRule {
        kind: BlockRuleKind::Preformatted,
        source: "<<",
        markdown: "```",
    },
    BlockRule {
        kind: BlockRuleKind::BacktickFence,
        source: "```rust",
        markdown: "```rust",
    },
    BlockRule {
        kind: BlockRuleKind::FramedTable,
        source: "<<|",
        markdown: "",
    },
    BlockRule {
        kind: BlockRuleKind::BareTableRow,
        source: "| a | b |",
        markdown: "| a | b |",
    },
];

/// Characters a Markdown renderer or wiki host could read as HTML.
pub const HTML_SENSITIVE: [char; 3] = ['<', '>', '&'];

pub fn is_html_sensitive(ch: char) -> bool {
    HTML_SENSITIVE.contains(&ch)
}

/// Characters Markdown reads as emphasis. Left as literal text they are
/// backslash-escaped.
pub const MARKDOWN_ACTIVE: [char; 1] = ['*'];

pub fn is_markdown_active(ch: char) -> bool {
    MARKDOWN_ACTIVE.contains(&ch)
}

/// Whether `\` followed by `ch` is an escaped literal in the dialect.
pub fn is_escapable(ch: char) -> bool {
    ch.is_ascii_punctuation()
}
