use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};

use crate::batch::{PageJob, PageSink};
use crate::inline::decode_page_name;
use crate::render::render_html;
use crate::translate::{Page, Translation, normalize_line_endings};

pub const PAGE_EXTENSION: &str = "wiki";
pub const MARKDOWN_EXTENSION: &str = "md";
pub const HTML_EXTENSION: &str = "html";

/// Expands `pattern` into the sorted list of `.wiki` files it matches.
pub fn discover_pages(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries =
        glob::glob(pattern).with_context(|| format!("invalid input pattern: {pattern}"))?;
    let mut pages = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("failed to expand {pattern}"))?;
        if path.is_file() && has_page_extension(&path) {
            pages.push(path);
        }
    }
    pages.sort();
    debug!("{} page(s) match {pattern}", pages.len());
    Ok(pages)
}

fn has_page_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension == PAGE_EXTENSION)
}

/// File name with the `.wiki` suffix removed, e.g. `kiwi.wiki` -> `kiwi`.
pub fn page_title(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("page path has no UTF-8 file name: {}", display_path(path)))?;
    let title = name
        .strip_suffix(PAGE_EXTENSION)
        .and_then(|stem| stem.strip_suffix('.'))
        .unwrap_or(name);
    if title.is_empty() {
        bail!("page file has an empty title: {}", display_path(path));
    }
    Ok(title.to_string())
}

/// Percent-decoded title, e.g. `Notes%2FDaily` -> `Notes/Daily`.
pub fn decode_title(stem: &str) -> String {
    decode_page_name(stem)
}

pub fn read_page_text(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", display_path(path)))?;
    Ok(normalize_line_endings(&text))
}

pub fn reference_path(verify_dir: &Path, title: &str) -> PathBuf {
    verify_dir.join(format!("{title}.{MARKDOWN_EXTENSION}"))
}

/// Reference Markdown for `title`, or `None` when the verify directory has
/// no file for it.
pub fn load_reference(verify_dir: &Path, title: &str) -> Result<Option<String>> {
    let path = reference_path(verify_dir, title);
    if !path.is_file() {
        warn!(
            "no reference for {title} at {}; page will not be verified",
            display_path(&path)
        );
        return Ok(None);
    }
    read_page_text(&path).map(Some)
}

/// One job per page. A page that cannot be read still yields a job that
/// carries the failure, so the batch decides whether it is fatal.
pub fn load_jobs(pages: &[PathBuf], verify_dir: Option<&Path>) -> Vec<PageJob> {
    pages.iter().map(|path| load_job(path, verify_dir)).collect()
}

fn load_job(path: &Path, verify_dir: Option<&Path>) -> PageJob {
    let title = match page_title(path) {
        Ok(title) => title,
        Err(error) => return unreadable(display_path(path), error),
    };
    let loaded = read_page_text(path).and_then(|source| {
        let reference = match verify_dir {
            Some(dir) => load_reference(dir, &title)?,
            None => None,
        };
        Ok((source, reference))
    });
    match loaded {
        Ok((source, reference)) => PageJob::new(title, source, reference),
        Err(error) => unreadable(title, error),
    }
}

fn unreadable(title: String, error: anyhow::Error) -> PageJob {
    warn!("cannot load {title}: {error:#}");
    PageJob::unreadable(title, &error)
}

/// Writes `<out>/<title>.md` and, when enabled, `<out>/<title>.html`.
#[derive(Debug, Clone)]
pub struct FileSink {
    out_dir: PathBuf,
    render_html: bool,
    written: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(out_dir: impl Into<PathBuf>, render_html: bool) -> Self {
        Self {
            out_dir: out_dir.into(),
            render_html,
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_file(&mut self, path: PathBuf, contents: &str) -> Result<()> {
        fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", display_path(&path)))?;
        info!("wrote {}", display_path(&path));
        self.written.push(path);
        Ok(())
    }
}

impl PageSink for FileSink {
    fn write_page(&mut self, page: &Page, translation: &Translation) -> Result<()> {
        fs::create_dir_all(&self.out_dir).with_context(|| {
            format!(
                "failed to create output directory {}",
                display_path(&self.out_dir)
            )
        })?;
        let markdown = translation.to_markdown();
        let markdown_path = self
            .out_dir
            .join(format!("{}.{MARKDOWN_EXTENSION}", page.title));
        self.write_file(markdown_path, &markdown)?;

        if self.render_html {
            let html_path = self
                .out_dir
                .join(format!("{}.{HTML_EXTENSION}", page.title));
            self.write_file(html_path, &render_html(&markdown))?;
        }
        Ok(())
    }
}

pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

pub fn display_path(path: &Path) -> String {
    normalize_separators(&path.to_string_lossy())
}
