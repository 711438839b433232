use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

/// Renders translated Markdown to an XHTML fragment. The same fragment is
/// used for `--render` output and as the hosted-wiki page body.
pub fn render_html(markdown: &str) -> String {
    render_html_with_links(markdown, |_| None)
}

/// Like [`render_html`], but every link destination is offered to
/// `resolve`; `None` keeps it as written. Text in code spans and code
/// blocks is never offered.
pub fn render_html_with_links<F>(markdown: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let parser = Parser::new_ext(markdown, parser_options()).map(|event| match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = match resolve(&dest_url) {
                Some(resolved) => CowStr::from(resolved),
                None => dest_url,
            };
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
