use std::ops::ControlFlow;
use std::sync::{Mutex, mpsc};
use std::thread;

use anyhow::Result;
use log::{debug, warn};
use serde::Serialize;

use crate::translate::{Page, TranslateOptions, Translation};
use crate::verify::{CompareOptions, Comparison, LineDiff, compare};

#[derive(Debug, Clone)]
pub struct PageJob {
    pub title: String,
    /// Page text, or why it could not be read.
    pub source: Result<String, String>,
    pub reference: Option<String>,
}

impl PageJob {
    pub fn new(title: impl Into<String>, source: impl Into<String>, reference: Option<String>) -> Self {
        Self {
            title: title.into(),
            source: Ok(source.into()),
            reference,
        }
    }

    pub fn unreadable(title: impl Into<String>, error: &anyhow::Error) -> Self {
        Self {
            title: title.into(),
            source: Err(format!("{error:#}")),
            reference: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub translate: TranslateOptions,
    pub compare: CompareOptions,
    pub strict: bool,
    pub jobs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            translate: TranslateOptions::default(),
            compare: CompareOptions::default(),
            strict: false,
            jobs: 1,
        }
    }
}

/// Receives each translated page in input order: writes files, renders,
/// uploads.
pub trait PageSink {
    fn write_page(&mut self, page: &Page, translation: &Translation) -> Result<()>;
}

/// Hands each page to every inner sink in order; stops at the first error.
#[derive(Default)]
pub struct FanoutSink<'a> {
    sinks: Vec<&'a mut dyn PageSink>,
}

impl<'a> FanoutSink<'a> {
    pub fn push(&mut self, sink: &'a mut dyn PageSink) {
        self.sinks.push(sink);
    }
}

impl PageSink for FanoutSink<'_> {
    fn write_page(&mut self, page: &Page, translation: &Translation) -> Result<()> {
        for sink in &mut self.sinks {
            sink.write_page(page, translation)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Converted,
    Verified,
    Mismatch,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub title: String,
    pub status: PageStatus,
    pub markdown_lines: usize,
    pub links: usize,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageMismatch {
    pub title: String,
    pub diffs: Vec<LineDiff>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub success: bool,
    pub strict: bool,
    /// Strict mode stopped before every page was examined.
    pub aborted: bool,
    pub requested_pages: usize,
    pub converted: usize,
    pub verified: usize,
    pub pages: Vec<PageResult>,
    pub mismatches: Vec<PageMismatch>,
    pub errors: Vec<String>,
}

impl BatchReport {
    fn new(requested_pages: usize, strict: bool) -> Self {
        Self {
            success: false,
            strict,
            aborted: false,
            requested_pages,
            converted: 0,
            verified: 0,
            pages: Vec::new(),
            mismatches: Vec::new(),
            errors: Vec::new(),
        }
    }
}

pub fn run_batch(jobs: Vec<PageJob>, options: &BatchOptions, sink: &mut dyn PageSink) -> BatchReport {
    let mut report = BatchReport::new(jobs.len(), options.strict);

    let prepared: Box<dyn Iterator<Item = Prepared> + '_> =
        if options.strict || options.jobs <= 1 || jobs.len() <= 1 {
            Box::new(jobs.into_iter().map(|job| prepare(job, &options.translate)))
        } else {
            Box::new(translate_parallel(jobs, options).into_iter())
        };
    for item in prepared {
        if finish_page(item, options, sink, &mut report).is_break() {
            report.aborted = true;
            break;
        }
    }

    report.success = !report.aborted && report.mismatches.is_empty() && report.errors.is_empty();
    debug!(
        "batch finished: {} of {} pages converted, {} verified, {} mismatches, {} errors",
        report.converted,
        report.requested_pages,
        report.verified,
        report.mismatches.len(),
        report.errors.len()
    );
    report
}

/// A translated page, or the title and reason of a page that never loaded.
type Prepared = Result<Page, (String, String)>;

fn prepare(job: PageJob, options: &TranslateOptions) -> Prepared {
    let source = match job.source {
        Ok(source) => source,
        Err(error) => return Err((job.title, error)),
    };
    let page = Page::from_source(job.title, &source);
    let mut page = match job.reference {
        Some(reference) => page.with_reference(&reference),
        None => page,
    };
    page.translate(options);
    Ok(page)
}

/// Translates on a fixed pool of scoped workers and returns the pages in
/// input order.
fn translate_parallel(jobs: Vec<PageJob>, options: &BatchOptions) -> Vec<Prepared> {
    let total = jobs.len();
    let workers = options.jobs.clamp(1, total.max(1));
    let queue = Mutex::new(jobs.into_iter().enumerate());
    let (sender, receiver) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let sender = sender.clone();
            let queue = &queue;
            scope.spawn(move || {
                loop {
                    let next = match queue.lock() {
                        Ok(mut queue) => queue.next(),
                        Err(_) => None,
                    };
                    let Some((index, job)) = next else {
                        break;
                    };
                    if sender.send((index, prepare(job, &options.translate))).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(sender);

    let mut slots = (0..total).map(|_| None).collect::<Vec<Option<Prepared>>>();
    for (index, prepared) in receiver {
        slots[index] = Some(prepared);
    }
    slots.into_iter().flatten().collect()
}

fn finish_page(
    prepared: Prepared,
    options: &BatchOptions,
    sink: &mut dyn PageSink,
    report: &mut BatchReport,
) -> ControlFlow<()> {
    let mut page = match prepared {
        Ok(page) => page,
        Err((title, error)) => {
            let result = PageResult {
                title: title.clone(),
                status: PageStatus::Failed,
                markdown_lines: 0,
                links: 0,
                detail: None,
            };
            return record_failure(report, result, &title, error, options.strict);
        }
    };
    let translation = page.translate(&options.translate).clone();
    let mut result = PageResult {
        title: page.title.clone(),
        status: PageStatus::Converted,
        markdown_lines: translation.lines.len(),
        links: translation.links.len(),
        detail: None,
    };

    let mismatch = page.reference.as_ref().and_then(|reference| {
        match compare(&translation.lines, reference, &options.compare) {
            Comparison::Identical => None,
            Comparison::Mismatch(diffs) => Some(diffs),
        }
    });

    // Strict mode never hands a page that failed verification to the sink.
    match mismatch {
        Some(diffs) if options.strict => {
            record_mismatch(report, result, &page.title, diffs);
            ControlFlow::Break(())
        }
        mismatch => {
            if let Err(error) = sink.write_page(&page, &translation) {
                return record_failure(
                    report,
                    result,
                    &page.title,
                    format!("{error:#}"),
                    options.strict,
                );
            }
            report.converted += 1;
            match mismatch {
                Some(diffs) => record_mismatch(report, result, &page.title, diffs),
                None => {
                    if page.reference.is_some() {
                        result.status = PageStatus::Verified;
                        report.verified += 1;
                    }
                    report.pages.push(result);
                }
            }
            ControlFlow::Continue(())
        }
    }
}

fn record_mismatch(report: &mut BatchReport, mut result: PageResult, title: &str, diffs: Vec<LineDiff>) {
    warn!("{title} differs from its reference in {} line(s)", diffs.len());
    result.status = PageStatus::Mismatch;
    result.detail = Some(format!("{} differing line(s)", diffs.len()));
    report.mismatches.push(PageMismatch {
        title: title.to_string(),
        diffs,
    });
    report.pages.push(result);
}

fn record_failure(
    report: &mut BatchReport,
    mut result: PageResult,
    title: &str,
    detail: String,
    strict: bool,
) -> ControlFlow<()> {
    warn!("failed to convert {title}: {detail}");
    result.status = PageStatus::Failed;
    report.errors.push(format!("{title}: {detail}"));
    result.detail = Some(detail);
    report.pages.push(result);
    if strict {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}
