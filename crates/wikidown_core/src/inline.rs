//! Inline rewriter: turns one line of dialect text into Markdown.
//!
//! Constructs are recognized left to right in a fixed precedence:
//! escaped literal, inline code, link, emphasis. Any character not claimed
//! by a construct is copied through, with `<`, `>` and `&` entity-escaped
//! and a literal `*` backslash-escaped.
//! Nothing here can fail; a construct that does not fully match is left as
//! literal text.

use std::borrow::Cow;
use std::ops::Range;

use serde::Serialize;

use crate::classify::BlockKind;
use crate::dialect::{
    CELL_DELIMITER, CODE_TICK, ESCAPE_CHAR, EmphasisKind, EmphasisMarker, LINK_ALIAS,
    LINK_ANCHOR_BANG, LINK_FRAGMENT, emphasis_marker_at, is_escapable, is_html_sensitive,
    is_markdown_active,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Text,
    Strong,
    Italic,
    Code,
    Link,
    Escaped,
    HtmlEscaped,
}

/// A rewritten piece of a line. `source` ranges of consecutive spans are
/// adjacent and together cover the whole input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub source: Range<usize>,
    pub output: String,
}

/// A page reference found while rewriting a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTarget {
    /// Target exactly as written; also the stem of the sibling `.md` file.
    pub page: String,
    /// Percent-decoded target, usable as a page title.
    pub title: String,
    pub anchor: Option<String>,
}

pub fn rewrite(text: &str, kind: &BlockKind) -> String {
    rewrite_with_links(text, kind).0
}

pub fn rewrite_spans(text: &str, kind: &BlockKind) -> Vec<Span> {
    let mut links = Vec::new();
    spans_for(text, kind, &mut links)
}

/// Rewrites `text` and returns the internal link targets it references.
pub fn rewrite_with_links(text: &str, kind: &BlockKind) -> (String, Vec<LinkTarget>) {
    let mut links = Vec::new();
    let spans = spans_for(text, kind, &mut links);
    (concat(&spans), links)
}

/// Percent-decodes a page name. Invalid sequences are kept as written.
pub fn decode_page_name(name: &str) -> String {
    match urlencoding::decode(name) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => name.to_string(),
    }
}

fn spans_for(text: &str, kind: &BlockKind, links: &mut Vec<LinkTarget>) -> Vec<Span> {
    if kind.is_preformatted() {
        return vec![Span {
            kind: SpanKind::Text,
            source: 0..text.len(),
            output: text.to_string(),
        }];
    }
    let context = Context {
        table: matches!(kind, BlockKind::TableRow { .. }),
        links: true,
        strong_open: false,
        italic_open: false,
    };
    scan(text, context, links)
}

#[derive(Debug, Clone, Copy)]
struct Context {
    table: bool,
    links: bool,
    strong_open: bool,
    italic_open: bool,
}

impl Context {
    fn can_open(self, kind: EmphasisKind) -> bool {
        match kind {
            EmphasisKind::Strong => !self.strong_open,
            EmphasisKind::Italic => !self.italic_open,
        }
    }

    fn inside(self, kind: EmphasisKind) -> Self {
        match kind {
            EmphasisKind::Strong => Self {
                strong_open: true,
                ..self
            },
            EmphasisKind::Italic => Self {
                italic_open: true,
                ..self
            },
        }
    }

    fn without_links(self) -> Self {
        Self {
            links: false,
            ..self
        }
    }
}

#[derive(Debug)]
enum Construct<'a> {
    Escape(char),
    Code(&'a str),
    Link(ParsedLink<'a>),
    Emphasis {
        marker: EmphasisMarker,
        body: &'a str,
    },
}

#[derive(Debug)]
struct Match<'a> {
    construct: Construct<'a>,
    end: usize,
}

#[derive(Debug)]
struct ParsedLink<'a> {
    target: &'a str,
    label: Option<&'a str>,
    anchor: Option<&'a str>,
}

fn scan(text: &str, context: Context, links: &mut Vec<LinkTarget>) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut pos = 0usize;
    let mut plain_start = 0usize;

    while pos < text.len() {
        if let Some(found) = recognize(text, pos, context) {
            flush_plain(text, plain_start..pos, &mut spans);
            let (kind, output) = emit(found.construct, context, links);
            spans.push(Span {
                kind,
                source: pos..found.end,
                output,
            });
            pos = found.end;
            plain_start = pos;
            continue;
        }

        let Some(ch) = text[pos..].chars().next() else {
            break;
        };
        let width = ch.len_utf8();
        if is_html_sensitive(ch) {
            flush_plain(text, plain_start..pos, &mut spans);
            spans.push(Span {
                kind: SpanKind::HtmlEscaped,
                source: pos..pos + width,
                output: html_escape_char(ch),
            });
            plain_start = pos + width;
        } else if context.table && ch == CELL_DELIMITER {
            flush_plain(text, plain_start..pos, &mut spans);
            spans.push(Span {
                kind: SpanKind::Escaped,
                source: pos..pos + width,
                output: "\\|".to_string(),
            });
            plain_start = pos + width;
        } else if let Some(marker) = emphasis_marker_at(text, pos) {
            // An unmatched marker stays literal as a whole token.
            let end = pos + marker.token.len();
            if marker.token.contains(is_markdown_active) {
                flush_plain(text, plain_start..pos, &mut spans);
                spans.push(Span {
                    kind: SpanKind::Escaped,
                    source: pos..end,
                    output: escape_markdown_active(marker.token),
                });
                plain_start = end;
            }
            pos = end;
            continue;
        } else if is_markdown_active(ch) {
            flush_plain(text, plain_start..pos, &mut spans);
            spans.push(Span {
                kind: SpanKind::Escaped,
                source: pos..pos + width,
                output: format!("{ESCAPE_CHAR}{ch}"),
            });
            plain_start = pos + width;
        }
        pos += width;
    }

    flush_plain(text, plain_start..text.len(), &mut spans);
    spans
}

fn flush_plain(text: &str, range: Range<usize>, spans: &mut Vec<Span>) {
    if range.is_empty() {
        return;
    }
    spans.push(Span {
        kind: SpanKind::Text,
        output: text[range.clone()].to_string(),
        source: range,
    });
}

fn concat(spans: &[Span]) -> String {
    let capacity = spans.iter().map(|span| span.output.len()).sum();
    let mut out = String::with_capacity(capacity);
    for span in spans {
        out.push_str(&span.output);
    }
    out
}

fn recognize(text: &str, pos: usize, context: Context) -> Option<Match<'_>> {
    recognize_atomic(text, pos, context).or_else(|| recognize_emphasis(text, pos, context))
}

/// Constructs that emphasis closers never look inside.
fn recognize_atomic(text: &str, pos: usize, context: Context) -> Option<Match<'_>> {
    recognize_escape(text, pos)
        .or_else(|| recognize_code(text, pos))
        .or_else(|| {
            if context.links {
                recognize_link(text, pos)
            } else {
                None
            }
        })
}

fn recognize_escape(text: &str, pos: usize) -> Option<Match<'_>> {
    let mut chars = text[pos..].chars();
    if chars.next()? != ESCAPE_CHAR {
        return None;
    }
    let escaped = chars.next().filter(|ch| is_escapable(*ch))?;
    Some(Match {
        construct: Construct::Escape(escaped),
        end: pos + ESCAPE_CHAR.len_utf8() + escaped.len_utf8(),
    })
}

fn recognize_code(text: &str, pos: usize) -> Option<Match<'_>> {
    let rest = &text[pos..];
    if !rest.starts_with(CODE_TICK) {
        return None;
    }
    let close = rest[1..].find(CODE_TICK)?;
    let body = &rest[1..1 + close];
    if body.is_empty() {
        return None;
    }
    Some(Match {
        construct: Construct::Code(body),
        end: pos + close + 2,
    })
}

fn recognize_link(text: &str, pos: usize) -> Option<Match<'_>> {
    let rest = &text[pos..];
    if let Some(after_open) = rest.strip_prefix("[[") {
        let close = after_open.find("]]")?;
        let inner = &after_open[..close];
        let (target, label) = split_link_inner(inner)?;
        return Some(Match {
            construct: Construct::Link(ParsedLink {
                target,
                label,
                anchor: None,
            }),
            end: pos + 2 + close + 2,
        });
    }

    let after_open = rest.strip_prefix('[')?;
    let close = after_open.find(']')?;
    let inner = &after_open[..close];
    let (target, label) = split_link_inner(inner)?;
    let mut end = pos + 1 + close + 1;

    let mut anchor = None;
    if let Some(after_bang) = text[end..].strip_prefix(LINK_ANCHOR_BANG) {
        let length = after_bang
            .char_indices()
            .find(|(_, ch)| !is_anchor_char(*ch))
            .map(|(index, _)| index)
            .unwrap_or(after_bang.len());
        if length > 0 {
            anchor = Some(&after_bang[..length]);
            end += 1 + length;
        }
    }

    // A bare `[word]` is not a link in the dialect.
    if label.is_none() && anchor.is_none() {
        return None;
    }
    Some(Match {
        construct: Construct::Link(ParsedLink {
            target,
            label,
            anchor,
        }),
        end,
    })
}

fn split_link_inner(inner: &str) -> Option<(&str, Option<&str>)> {
    if inner.contains(['[', ']', '\n']) {
        return None;
    }
    let (target, label) = match inner.split_once(LINK_ALIAS) {
        Some((target, label)) => (target, Some(label.trim()).filter(|l| !l.is_empty())),
        None => (inner, None),
    };
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    Some((target, label))
}

fn is_anchor_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

fn recognize_emphasis(text: &str, pos: usize, context: Context) -> Option<Match<'_>> {
    let marker = emphasis_marker_at(text, pos)?;
    if !context.can_open(marker.kind) {
        return None;
    }
    let body_start = pos + marker.token.len();
    let close = find_closer(text, body_start, marker, context)?;
    let body = &text[body_start..close];
    let first = body.chars().next()?;
    let last = body.chars().next_back()?;
    if first.is_whitespace() || last.is_whitespace() {
        return None;
    }
    Some(Match {
        construct: Construct::Emphasis { marker, body },
        end: close + marker.token.len(),
    })
}

/// Nearest closing token of the same marker, skipping over escapes, code
/// spans and links so that markers inside them never close anything.
fn find_closer(text: &str, from: usize, marker: EmphasisMarker, context: Context) -> Option<usize> {
    let mut pos = from;
    while pos < text.len() {
        if let Some(found) = recognize_atomic(text, pos, context) {
            pos = found.end;
            continue;
        }
        if text[pos..].starts_with(marker.token)
            && emphasis_marker_at(text, pos).is_some_and(|m| m.token == marker.token)
        {
            return Some(pos);
        }
        pos += text[pos..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

fn emit(construct: Construct<'_>, context: Context, links: &mut Vec<LinkTarget>) -> (SpanKind, String) {
    match construct {
        Construct::Escape(ch) => (SpanKind::Escaped, escape_literal(ch, context)),
        Construct::Code(body) => {
            let body: Cow<'_, str> = if context.table {
                Cow::Owned(body.replace(CELL_DELIMITER, "\\|"))
            } else {
                Cow::Borrowed(body)
            };
            (SpanKind::Code, format!("`{body}`"))
        }
        Construct::Link(link) => (SpanKind::Link, emit_link(&link, context, links)),
        Construct::Emphasis { marker, body } => {
            let inner = concat(&scan(body, context.inside(marker.kind), links));
            let delimiter = marker.kind.markdown();
            let kind = match marker.kind {
                EmphasisKind::Strong => SpanKind::Strong,
                EmphasisKind::Italic => SpanKind::Italic,
            };
            (kind, format!("{delimiter}{inner}{delimiter}"))
        }
    }
}

fn emit_link(link: &ParsedLink<'_>, context: Context, links: &mut Vec<LinkTarget>) -> String {
    let external = is_external(link.target);
    let (page, anchor) = if external {
        (link.target, None)
    } else {
        match link.target.split_once(LINK_FRAGMENT) {
            Some((page, fragment)) => (page.trim_end(), Some(fragment.trim())),
            None => (link.target, None),
        }
    };
    let anchor = link.anchor.or(anchor).filter(|a| !a.is_empty());

    let default_label;
    let label = match link.label {
        Some(label) => label,
        None => {
            default_label = if external {
                link.target.to_string()
            } else {
                decode_page_name(link.target)
            };
            default_label.as_str()
        }
    };
    let label = concat(&scan(label, context.without_links(), links));

    let destination = if external {
        escape_destination(page)
    } else {
        let mut destination = String::new();
        if !page.is_empty() {
            destination.push_str(&escape_destination(page));
            destination.push_str(".md");
            links.push(LinkTarget {
                page: page.to_string(),
                title: decode_page_name(page),
                anchor: anchor.map(str::to_string),
            });
        }
        if let Some(anchor) = anchor {
            destination.push(LINK_FRAGMENT);
            destination.push_str(&escape_destination(anchor));
        }
        destination
    };
    format!("[{label}]({destination})")
}

fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:")
}

/// Percent-encodes the characters that would end or break a Markdown link
/// destination.
pub fn escape_destination(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            ' ' => out.push_str("%20"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '|' => out.push_str("%7C"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_literal(ch: char, context: Context) -> String {
    if is_html_sensitive(ch) {
        html_escape_char(ch)
    } else if context.table && ch == CELL_DELIMITER {
        "\\|".to_string()
    } else {
        format!("\\{ch}")
    }
}

fn escape_markdown_active(token: &str) -> String {
    let mut out = String::with_capacity(token.len() * 2);
    for ch in token.chars() {
        if is_markdown_active(ch) {
            out.push(ESCAPE_CHAR);
        }
        out.push(ch);
    }
    out
}

fn html_escape_char(ch: char) -> String {
    let mut buffer = [0u8; 4];
    html_escape::encode_text(ch.encode_utf8(&mut buffer)).into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::{LinkTarget, SpanKind, decode_page_name, rewrite, rewrite_spans, rewrite_with_links};
    use crate::classify::{BlockKind, FenceKind};
    use crate::dialect::EMPHASIS_MARKERS;
    use crate::render::render_html;

    fn para(text: &str) -> String {
        rewrite(text, &BlockKind::Paragraph)
    }

    #[test]
    fn emphasis_markers_map_onto_markdown() {
        assert_eq!(
            para("This is **bold** and ''italic''."),
            "This is **bold** and *italic*."
        );
        assert_eq!(para("a //slanted// word"), "a *slanted* word");
    }

    #[test]
    fn bare_wiki_link_points_at_sibling_file() {
        assert_eq!(para("[[SomePage]]"), "[SomePage](SomePage.md)");
    }

    #[test]
    fn html_sensitive_characters_are_entity_escaped() {
        assert_eq!(
            para("Use <tag> & \"quotes\""),
            "Use &lt;tag&gt; &amp; \"quotes\""
        );
    }

    #[test]
    fn plain_safe_text_is_unchanged() {
        let text = "Nothing to see here, just words: 1, 2 and 3 (maybe).";
        assert_eq!(para(text), text);
    }

    #[test]
    fn escaped_delimiters_stay_literal() {
        assert_eq!(para(r"\*\*not bold\*\*"), r"\*\*not bold\*\*");
        assert_eq!(para(r"\**not bold\**"), r"\*\*not bold\*\*");
        assert_eq!(para("a *single* star"), r"a \*single\* star");
        assert_eq!(para(r"\''not italic''"), r"\''not italic''");
        assert_eq!(para(r"\<b\>"), "&lt;b&gt;");
        assert_eq!(para(r"\[[NoLink]]"), r"\[[NoLink]]");
    }

    #[test]
    fn backslash_before_letter_is_plain_text() {
        assert_eq!(para(r"C:\temp"), r"C:\temp");
    }

    #[test]
    fn code_spans_are_not_rewritten() {
        assert_eq!(para("run `a **b** <c>` now"), "run `a **b** <c>` now");
        assert_eq!(para("lonely ` tick"), "lonely ` tick");
    }

    #[test]
    fn emphasis_nests_one_level() {
        assert_eq!(para("**bold ''and italic''**"), "**bold *and italic***");
        assert_eq!(para("''italic **and bold**''"), "*italic **and bold***");
        assert_eq!(
            para("**a ''b //c// b'' a**"),
            "**a *b //c// b* a**"
        );
    }

    #[test]
    fn unmatched_and_asymmetric_markers_stay_literal() {
        assert_eq!(para("''unclosed"), "''unclosed");
        assert_eq!(para("**unclosed"), r"\*\*unclosed");
        assert_eq!(para("''left** right''"), r"*left\*\* right*");
        assert_eq!(para("** spaced **"), r"\*\* spaced \*\*");
        assert_eq!(para("****"), r"\*\*\*\*");
    }

    #[test]
    fn urls_keep_their_slashes() {
        assert_eq!(
            para("see http://example.org/a and //this//"),
            "see http://example.org/a and *this*"
        );
    }

    #[test]
    fn link_forms() {
        assert_eq!(para("[[Page|The Title]]"), "[The Title](Page.md)");
        assert_eq!(para("[Page|The Title]"), "[The Title](Page.md)");
        assert_eq!(para("[Page]!intro"), "[Page](Page.md#intro)");
        assert_eq!(para("[[Page#intro]]"), "[Page#intro](Page.md#intro)");
        assert_eq!(para("[[My Page]]"), "[My Page](My%20Page.md)");
        assert_eq!(para("[[#top]]"), "[#top](#top)");
        assert_eq!(
            para("[https://example.org/x|site]"),
            "[site](https://example.org/x)"
        );
    }

    #[test]
    fn bare_single_brackets_are_not_links() {
        assert_eq!(para("see [1] and [x]"), "see [1] and [x]");
        assert_eq!(para("[[]]"), "[[]]");
        assert_eq!(para("[[a]b]]"), "[[a]b]]");
    }

    #[test]
    fn link_targets_are_percent_decoded_for_titles() {
        let (out, links) = rewrite_with_links("go [[Notes%2FDaily]] now", &BlockKind::Paragraph);
        assert_eq!(out, "go [Notes/Daily](Notes%2FDaily.md) now");
        assert_eq!(
            links,
            vec![LinkTarget {
                page: "Notes%2FDaily".to_string(),
                title: "Notes/Daily".to_string(),
                anchor: None,
            }]
        );
    }

    #[test]
    fn external_links_are_not_reported_as_pages() {
        let (_, links) =
            rewrite_with_links("[[https://example.org]] [Other|o]", &BlockKind::Paragraph);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].page, "Other");
    }

    #[test]
    fn link_wins_over_emphasis_inside_its_target() {
        // Markers inside a link target never close the surrounding emphasis.
        assert_eq!(
            para("**[[Page**X]]**"),
            r"**[Page\*\*X](Page**X.md)**"
        );
        assert_eq!(
            para("[[Page|''nice'' label]]"),
            "[*nice* label](Page.md)"
        );
    }

    #[test]
    fn nested_link_brackets_fall_back_to_inner_link() {
        assert_eq!(
            para("[[A|see [[B]]]]"),
            "[[A|see [B](B.md)]]"
        );
    }

    #[test]
    fn table_cells_escape_pipes() {
        let kind = BlockKind::TableRow { header: false };
        assert_eq!(rewrite("a | b", &kind), "a \\| b");
        assert_eq!(rewrite("`x|y`", &kind), "`x\\|y`");
        assert_eq!(rewrite(r"\|", &kind), "\\|");
    }

    #[test]
    fn preformatted_text_is_never_rewritten() {
        let text = "**x** [[Y]] <z> & ''w''";
        for kind in [
            BlockKind::Preformatted,
            BlockKind::PreformattedOpen(FenceKind::Angle),
            BlockKind::PreformattedClose(FenceKind::Backtick(3)),
        ] {
            assert_eq!(rewrite(text, &kind), text);
        }
    }

    #[test]
    fn spans_cover_the_line_in_order() {
        let text = "a **b** [[C]] <d> \\* `e`";
        let spans = rewrite_spans(text, &BlockKind::Paragraph);
        let mut cursor = 0;
        for span in &spans {
            assert_eq!(span.source.start, cursor);
            cursor = span.source.end;
        }
        assert_eq!(cursor, text.len());
        let kinds = spans.iter().map(|span| span.kind).collect::<Vec<_>>();
        assert!(kinds.contains(&SpanKind::Strong));
        assert!(kinds.contains(&SpanKind::Link));
        assert!(kinds.contains(&SpanKind::HtmlEscaped));
        assert!(kinds.contains(&SpanKind::Escaped));
        assert!(kinds.contains(&SpanKind::Code));
    }

    #[test]
    fn decode_keeps_invalid_sequences() {
        assert_eq!(decode_page_name("A%20B"), "A B");
        assert_eq!(decode_page_name("bad%FFbyte"), "bad%FFbyte");
    }

    fn plain_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ,.;:?()\"-]{0,60}"
    }

    fn any_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 *'/`<>&|\\[\\]\\\\#!:.-]{0,60}"
    }

    fn marker_free_text() -> impl Strategy<Value = String> {
        // No spaces: link targets and labels are trimmed.
        "[a-zA-Z0-9`<>&|\\[\\]\\\\#!:.%-]{0,60}"
    }

    proptest! {
        #[test]
        fn safe_plain_text_round_trips(text in plain_text()) {
            prop_assert_eq!(para(&text), text);
        }

        #[test]
        fn escaped_markers_never_become_active(
            index in 0..EMPHASIS_MARKERS.len(),
            body in "[a-z]{1,10}",
        ) {
            let token = EMPHASIS_MARKERS[index].token;
            let first = token.chars().next().unwrap();
            let escaped = format!("\\{first}{}{body}\\{first}{}", &token[1..], &token[1..]);
            let spans = rewrite_spans(&escaped, &BlockKind::Paragraph);
            prop_assert!(spans.iter().all(|span| span.kind != SpanKind::Strong && span.kind != SpanKind::Italic));
            let out = para(&escaped);
            let expected_prefix = format!("\\{first}");
            prop_assert!(out.starts_with(&expected_prefix));
            let html = render_html(&out);
            prop_assert!(!html.contains("<em>") && !html.contains("<strong>"), "{}", html);
            prop_assert!(html.contains(&body));
        }

        #[test]
        fn spans_always_cover_input(text in any_text()) {
            let spans = rewrite_spans(&text, &BlockKind::Paragraph);
            let mut cursor = 0;
            for span in &spans {
                prop_assert_eq!(span.source.start, cursor);
                cursor = span.source.end;
            }
            prop_assert_eq!(cursor, text.len());
        }

        #[test]
        fn marker_free_output_never_shrinks(text in marker_free_text()) {
            for span in rewrite_spans(&text, &BlockKind::Paragraph) {
                let source_len = span.source.end - span.source.start;
                prop_assert!(span.output.len() >= source_len, "{:?}", span);
            }
        }

        #[test]
        fn rewriting_terminates_on_marker_soup(
            tokens in proptest::collection::vec(
                prop_oneof![
                    Just("**"), Just("''"), Just("//"), Just("`"), Just("[["),
                    Just("]]"), Just("["), Just("]"), Just("|"), Just("\\"), Just("x"), Just(" "),
                ],
                0..40,
            )
        ) {
            let text = tokens.concat();
            for span in rewrite_spans(&text, &BlockKind::Paragraph) {
                let delimiter = match span.kind {
                    SpanKind::Strong => "**",
                    SpanKind::Italic => "*",
                    _ => continue,
                };
                prop_assert!(span.output.starts_with(delimiter));
                prop_assert!(span.output.ends_with(delimiter));
            }
        }
    }
}
