use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::batch::BatchOptions;
use crate::classify::ListDepthPolicy;
use crate::config::{
    CONFIG_FILENAME, DEFAULT_INPUT, DEFAULT_OUTPUT_DIR, WikidownConfig, render_default_config,
};
use crate::filesystem::{display_path, normalize_separators};
use crate::translate::TranslateOptions;
use crate::verify::CompareOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Flag,
    Env,
    Config,
    Heuristic,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Env => "env",
            Self::Config => "config",
            Self::Heuristic => "heuristic",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub project_root: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub cwd: PathBuf,
    pub executable_dir: Option<PathBuf>,
}

impl ResolutionContext {
    pub fn from_process() -> Result<Self> {
        let cwd = env::current_dir().context("failed to read current directory")?;
        let executable_dir = env::current_exe()
            .ok()
            .and_then(|path| path.parent().map(Path::to_path_buf));
        Ok(Self {
            cwd,
            executable_dir,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub project_root: PathBuf,
    pub config_path: PathBuf,
    pub root_source: ValueSource,
    pub config_source: ValueSource,
}

impl ResolvedPaths {
    pub fn diagnostics(&self) -> String {
        format!(
            "project_root={} ({})\nconfig_path={} ({}, {})",
            display_path(&self.project_root),
            self.root_source.as_str(),
            display_path(&self.config_path),
            self.config_source.as_str(),
            if self.config_path.exists() {
                "present"
            } else {
                "missing"
            }
        )
    }
}

pub fn resolve_paths(
    context: &ResolutionContext,
    overrides: &PathOverrides,
) -> Result<ResolvedPaths> {
    resolve_paths_with_lookup(context, overrides, |key| env::var(key).ok())
}

fn resolve_paths_with_lookup<F>(
    context: &ResolutionContext,
    overrides: &PathOverrides,
    lookup_env: F,
) -> Result<ResolvedPaths>
where
    F: Fn(&str) -> Option<String>,
{
    let (project_root, root_source) = resolve_project_root(context, overrides, &lookup_env);

    let (config_path, config_source) = if let Some(path) = overrides.config.as_deref() {
        (absolutize(path, &context.cwd), ValueSource::Flag)
    } else if let Some(value) = non_empty(lookup_env("WIKIDOWN_CONFIG")) {
        (
            absolutize(Path::new(&value), &project_root),
            ValueSource::Env,
        )
    } else {
        (project_root.join(CONFIG_FILENAME), ValueSource::Default)
    };

    Ok(ResolvedPaths {
        project_root,
        config_path,
        root_source,
        config_source,
    })
}

fn resolve_project_root<F>(
    context: &ResolutionContext,
    overrides: &PathOverrides,
    lookup_env: &F,
) -> (PathBuf, ValueSource)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = overrides.project_root.as_deref() {
        return (absolutize(path, &context.cwd), ValueSource::Flag);
    }

    if let Some(value) = non_empty(lookup_env("WIKIDOWN_PROJECT_ROOT")) {
        return (
            absolutize(Path::new(&value), &context.cwd),
            ValueSource::Env,
        );
    }

    match detect_project_root_heuristic(&context.cwd, context.executable_dir.as_deref()) {
        Some(root) => (root, ValueSource::Heuristic),
        None => (context.cwd.clone(), ValueSource::Default),
    }
}

/// Nearest ancestor of the working directory (then of the executable) that
/// holds a `wikidown.toml`.
fn detect_project_root_heuristic(cwd: &Path, executable_dir: Option<&Path>) -> Option<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = ancestors(cwd);
    if let Some(exe_dir) = executable_dir {
        candidates.extend(ancestors(exe_dir));
    }
    candidates.into_iter().find(|candidate| {
        seen.insert(display_path(candidate)) && candidate.join(CONFIG_FILENAME).is_file()
    })
}

fn ancestors(path: &Path) -> Vec<PathBuf> {
    path.ancestors().map(Path::to_path_buf).collect()
}

/// Explicit convert settings from the command line. `None` and `false`
/// mean "not given".
#[derive(Debug, Clone, Default)]
pub struct ConvertOverrides {
    pub input: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub verify_dir: Option<PathBuf>,
    pub render_html: bool,
    pub strict: bool,
    pub jobs: Option<usize>,
    pub list_depth: Option<ListDepthPolicy>,
}

#[derive(Debug, Clone)]
pub struct ConvertSettings {
    pub input: String,
    pub input_source: ValueSource,
    pub output_dir: PathBuf,
    pub output_source: ValueSource,
    pub verify_dir: Option<PathBuf>,
    pub verify_source: ValueSource,
    pub render_html: bool,
    pub strict: bool,
    pub jobs: usize,
    pub list_depth: ListDepthPolicy,
    pub ignore_whitespace: bool,
}

impl ConvertSettings {
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            translate: TranslateOptions {
                list_depth: self.list_depth,
            },
            compare: CompareOptions {
                ignore_whitespace: self.ignore_whitespace,
            },
            strict: self.strict,
            jobs: self.jobs,
        }
    }

    pub fn diagnostics(&self) -> String {
        format!(
            "input={} ({})\noutput_dir={} ({})\nverify_dir={} ({})\nrender_html={}\nstrict={}\njobs={}\nlist_depth={}\nignore_whitespace={}",
            normalize_separators(&self.input),
            self.input_source.as_str(),
            display_path(&self.output_dir),
            self.output_source.as_str(),
            self.verify_dir
                .as_deref()
                .map(display_path)
                .unwrap_or_else(|| "<none>".to_string()),
            self.verify_source.as_str(),
            self.render_html,
            self.strict,
            self.jobs,
            self.list_depth.as_str(),
            self.ignore_whitespace
        )
    }
}

pub fn resolve_convert_settings(
    paths: &ResolvedPaths,
    config: &WikidownConfig,
    overrides: &ConvertOverrides,
) -> ConvertSettings {
    resolve_convert_settings_with_lookup(paths, config, overrides, |key| env::var(key).ok())
}

fn resolve_convert_settings_with_lookup<F>(
    paths: &ResolvedPaths,
    config: &WikidownConfig,
    overrides: &ConvertOverrides,
    lookup_env: F,
) -> ConvertSettings
where
    F: Fn(&str) -> Option<String>,
{
    let section = &config.convert;
    let root = &paths.project_root;

    let (input, input_source) = pick(
        overrides.input.clone(),
        non_empty(lookup_env("WIKIDOWN_INPUT")),
        section.input.clone(),
    )
    .unwrap_or_else(|| (DEFAULT_INPUT.to_string(), ValueSource::Default));
    let input = if Path::new(&input).is_absolute() {
        input
    } else {
        root.join(&input).to_string_lossy().into_owned()
    };

    let (output_dir, output_source) = pick(
        overrides.output_dir.clone(),
        non_empty(lookup_env("WIKIDOWN_OUTPUT_DIR")).map(PathBuf::from),
        section.output_dir.clone().map(PathBuf::from),
    )
    .unwrap_or_else(|| (PathBuf::from(DEFAULT_OUTPUT_DIR), ValueSource::Default));

    let (verify_dir, verify_source) = match pick(
        overrides.verify_dir.clone(),
        non_empty(lookup_env("WIKIDOWN_VERIFY_DIR")).map(PathBuf::from),
        section.verify_dir.clone().map(PathBuf::from),
    ) {
        Some((dir, source)) => (Some(absolutize(&dir, root)), source),
        None => (None, ValueSource::Default),
    };

    let jobs = overrides
        .jobs
        .or_else(|| lookup_env("WIKIDOWN_JOBS").and_then(|value| value.trim().parse().ok()))
        .or(section.jobs)
        .unwrap_or(1)
        .max(1);

    ConvertSettings {
        input,
        input_source,
        output_dir: absolutize(&output_dir, root),
        output_source,
        verify_dir,
        verify_source,
        render_html: overrides.render_html || section.render_html.unwrap_or(false),
        strict: overrides.strict || section.strict.unwrap_or(false),
        jobs,
        list_depth: overrides
            .list_depth
            .or(section.list_depth)
            .unwrap_or_default(),
        ignore_whitespace: section.ignore_whitespace.unwrap_or(true),
    }
}

fn pick<T>(flag: Option<T>, env: Option<T>, config: Option<T>) -> Option<(T, ValueSource)> {
    flag.map(|value| (value, ValueSource::Flag))
        .or_else(|| env.map(|value| (value, ValueSource::Env)))
        .or_else(|| config.map(|value| (value, ValueSource::Config)))
}

#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct InitReport {
    pub config_path: PathBuf,
    pub wrote_config: bool,
}

pub fn init_project(paths: &ResolvedPaths, options: &InitOptions) -> Result<InitReport> {
    let wrote_config = write_text_file(&paths.config_path, &render_default_config(), options.force)?;
    Ok(InitReport {
        config_path: paths.config_path.clone(),
        wrote_config,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn write_text_file(path: &Path, content: &str, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }

    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create parent directory {}", parent.display()))?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
