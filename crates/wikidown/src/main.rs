use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use log::LevelFilter;
use wikidown_core::batch::{BatchReport, FanoutSink, run_batch};
use wikidown_core::classify::ListDepthPolicy;
use wikidown_core::config::load_config;
use wikidown_core::filesystem::{
    FileSink, discover_pages, display_path, load_jobs, normalize_separators, page_title,
    read_page_text,
};
use wikidown_core::render::render_html;
use wikidown_core::runtime::{
    ConvertOverrides, InitOptions, PathOverrides, ResolutionContext, ResolvedPaths,
    init_project, resolve_convert_settings, resolve_paths,
};
use wikidown_core::translate::{TranslateOptions, translate_text};
use wikidown_core::upload::{ConfluenceClient, ConfluenceClientConfig, UploadOptions, UploadSink};
use wikidown_core::verify::{SideBySideTitles, render_side_by_side};

const DEFAULT_REPORT_WIDTH: usize = 120;

#[derive(Debug, Parser)]
#[command(name = "wikidown", version, about = "WikidPad to Markdown converter")]
struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    project_root: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    diagnostics: bool,
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity (-v debug, -vv trace)")]
    verbose: u8,
    #[arg(long, global = true, value_name = "PATH", help = "Also write log records to this file (recreated each run)")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone)]
struct RuntimeOptions {
    project_root: Option<PathBuf>,
    config: Option<PathBuf>,
    diagnostics: bool,
}

impl RuntimeOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            project_root: cli.project_root.clone(),
            config: cli.config.clone(),
            diagnostics: cli.diagnostics,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Write a default wikidown.toml into the project root")]
    Init(InitArgs),
    #[command(about = "Convert pages, verify them against references and optionally upload")]
    Convert(ConvertArgs),
    #[command(about = "Print the Markdown translation of one page")]
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
struct InitArgs {
    #[arg(long, help = "Overwrite an existing config file")]
    force: bool,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    #[arg(long, value_name = "GLOB", help = "Pages to convert (default *.wiki)")]
    input: Option<String>,
    #[arg(long = "out", value_name = "DIR", help = "Output directory for .md files")]
    output_dir: Option<PathBuf>,
    #[arg(long = "verify", value_name = "DIR", help = "Directory of expected .md files")]
    verify_dir: Option<PathBuf>,
    #[arg(long, help = "Also write an .html rendering next to each .md file")]
    render: bool,
    #[arg(long, help = "Stop at the first mismatch or failure")]
    strict: bool,
    #[arg(long, value_name = "N", help = "Translate pages on N worker threads")]
    jobs: Option<usize>,
    #[arg(long, value_name = "POLICY", value_parser = parse_list_depth, help = "preserve or clamp")]
    list_depth: Option<ListDepthPolicy>,
    #[arg(long, help = "Publish each converted page to Confluence")]
    upload: bool,
    #[arg(long, value_name = "COLUMNS", default_value_t = DEFAULT_REPORT_WIDTH)]
    width: usize,
    #[arg(long, help = "Print the batch report as JSON")]
    json: bool,
}

#[derive(Debug, Args)]
struct PreviewArgs {
    file: PathBuf,
    #[arg(long, value_name = "POLICY", value_parser = parse_list_depth)]
    list_depth: Option<ListDepthPolicy>,
    #[arg(long, help = "Print rendered HTML instead of Markdown")]
    html: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let runtime = RuntimeOptions::from_cli(&cli);

    match cli.command {
        Some(Commands::Init(args)) => run_init(&runtime, args),
        Some(Commands::Convert(args)) => run_convert(&runtime, args),
        Some(Commands::Preview(args)) => run_preview(&runtime, args),
        None => {
            let mut command = Cli::command();
            command.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn run_init(runtime: &RuntimeOptions, args: InitArgs) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;
    let report = init_project(&paths, &InitOptions { force: args.force })?;

    println!("Initialized wikidown project");
    println!("project_root: {}", display_path(&paths.project_root));
    println!("config_path: {}", display_path(&report.config_path));
    println!("wrote_config: {}", format_flag(report.wrote_config));
    if !report.wrote_config {
        println!("hint: pass --force to overwrite the existing config");
    }
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }
    Ok(())
}

fn run_convert(runtime: &RuntimeOptions, args: ConvertArgs) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;
    let config = load_config(&paths.config_path)?;
    let settings = resolve_convert_settings(
        &paths,
        &config,
        &ConvertOverrides {
            input: args.input,
            output_dir: args.output_dir,
            verify_dir: args.verify_dir,
            render_html: args.render,
            strict: args.strict,
            jobs: args.jobs,
            list_depth: args.list_depth,
        },
    );

    let pages = discover_pages(&settings.input)?;
    let jobs = load_jobs(&pages, settings.verify_dir.as_deref());

    let mut files = FileSink::new(&settings.output_dir, settings.render_html);
    let mut uploader = if args.upload {
        let client = ConfluenceClient::new(ConfluenceClientConfig::from_config(&config)?)?;
        Some(UploadSink::new(client, UploadOptions::from_config(&config)?))
    } else {
        None
    };

    let report = {
        let mut sink = FanoutSink::default();
        sink.push(&mut files);
        if let Some(uploader) = uploader.as_mut() {
            sink.push(uploader);
        }
        run_batch(jobs, &settings.batch_options(), &mut sink)
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize batch report")?
        );
    } else {
        print_mismatches(&report, args.width);
        println!("wikidown convert");
        println!("input: {}", normalize_separators(&settings.input));
        println!("output_dir: {}", display_path(&settings.output_dir));
        println!("pages.requested: {}", report.requested_pages);
        println!("pages.converted: {}", report.converted);
        println!("pages.verified: {}", report.verified);
        println!("pages.mismatched: {}", report.mismatches.len());
        println!("pages.failed: {}", report.errors.len());
        println!("files.written: {}", files.written().len());
        if let Some(uploader) = uploader.as_ref() {
            println!("upload.published: {}", uploader.outcomes().len());
            println!("upload.requests: {}", uploader.request_count());
        }
        println!("strict: {}", format_flag(report.strict));
        println!("aborted: {}", format_flag(report.aborted));
        for error in &report.errors {
            println!("error: {error}");
        }
    }
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}\n{}", paths.diagnostics(), settings.diagnostics());
    }

    if report.aborted || !report.errors.is_empty() {
        bail!(
            "conversion failed: {} mismatched, {} failed",
            report.mismatches.len(),
            report.errors.len()
        );
    }
    Ok(())
}

fn run_preview(runtime: &RuntimeOptions, args: PreviewArgs) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;
    let config = load_config(&paths.config_path)?;
    let file = if args.file.is_absolute() {
        args.file
    } else {
        paths.project_root.join(args.file)
    };

    let title = page_title(&file)?;
    let text = read_page_text(&file)?;
    let options = TranslateOptions {
        list_depth: args
            .list_depth
            .or(config.convert.list_depth)
            .unwrap_or_default(),
    };
    let translation = translate_text(&text, &options);
    log::debug!("previewing {title}: {} lines", translation.lines.len());

    let markdown = translation.to_markdown();
    if args.html {
        print!("{}", render_html(&markdown));
    } else {
        print!("{markdown}");
    }
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }
    Ok(())
}

fn print_mismatches(report: &BatchReport, width: usize) {
    for mismatch in &report.mismatches {
        println!("[mismatch] {}", mismatch.title);
        print!(
            "{}",
            render_side_by_side(&mismatch.diffs, width, SideBySideTitles::default())
        );
        println!();
    }
}

fn resolve_runtime_paths(runtime: &RuntimeOptions) -> Result<ResolvedPaths> {
    dotenvy::dotenv().ok();

    let context = ResolutionContext::from_process()?;
    let overrides = PathOverrides {
        project_root: runtime.project_root.clone(),
        config: runtime.config.clone(),
    };

    let initial = resolve_paths(&context, &overrides)?;
    let project_env = initial.project_root.join(".env");
    if project_env.exists() {
        let _ = dotenvy::from_path_override(&project_env);
    }

    resolve_paths(&context, &overrides)
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
    }
    builder.try_init().context("failed to initialize logging")?;
    Ok(())
}

/// Copies every log record to stderr and the log file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn parse_list_depth(value: &str) -> Result<ListDepthPolicy, String> {
    ListDepthPolicy::parse(value).ok_or_else(|| format!("unknown list depth policy: {value}"))
}

fn format_flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
