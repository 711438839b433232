use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::classify::ListDepthPolicy;

pub const DEFAULT_USER_AGENT: &str = "wikidown/0.1";
pub const CONFIG_FILENAME: &str = "wikidown.toml";
pub const DEFAULT_INPUT: &str = "*.wiki";
pub const DEFAULT_OUTPUT_DIR: &str = "out";
pub const TOKEN_ENV: &str = "CONFLUENCE_API_TOKEN";

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct WikidownConfig {
    #[serde(default)]
    pub convert: ConvertSection,
    #[serde(default)]
    pub confluence: ConfluenceSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ConvertSection {
    pub input: Option<String>,
    pub output_dir: Option<String>,
    pub verify_dir: Option<String>,
    pub render_html: Option<bool>,
    pub strict: Option<bool>,
    pub jobs: Option<usize>,
    pub list_depth: Option<ListDepthPolicy>,
    pub ignore_whitespace: Option<bool>,
}

/// Hosted wiki settings. The API token is never read from this file.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ConfluenceSection {
    pub url: Option<String>,
    pub space: Option<String>,
    pub user: Option<String>,
    pub parent_id: Option<String>,
    pub overwrite: Option<bool>,
    pub user_agent: Option<String>,
}

impl WikidownConfig {
    /// Resolve the Confluence base URL: env CONFLUENCE_URL > config.
    pub fn confluence_url(&self) -> Option<String> {
        env_override("CONFLUENCE_URL")
            .or_else(|| self.confluence.url.clone())
            .map(|url| url.trim_end_matches('/').to_string())
    }

    /// Resolve the target space key: env CONFLUENCE_SPACE > config.
    pub fn confluence_space(&self) -> Option<String> {
        env_override("CONFLUENCE_SPACE").or_else(|| self.confluence.space.clone())
    }

    /// Resolve the account name: env CONFLUENCE_USER > config.
    pub fn confluence_user(&self) -> Option<String> {
        env_override("CONFLUENCE_USER").or_else(|| self.confluence.user.clone())
    }

    pub fn confluence_parent_id(&self) -> Option<String> {
        env_override("CONFLUENCE_PARENT_ID").or_else(|| self.confluence.parent_id.clone())
    }

    pub fn overwrite(&self) -> bool {
        self.confluence.overwrite.unwrap_or(true)
    }

    /// Resolve user agent: env WIKIDOWN_USER_AGENT > config > DEFAULT_USER_AGENT.
    pub fn user_agent(&self) -> String {
        env_override("WIKIDOWN_USER_AGENT")
            .or_else(|| self.confluence.user_agent.clone())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }
}

/// The Confluence API token, from the environment (or `.env`) only.
pub fn confluence_token() -> Option<String> {
    env_override(TOKEN_ENV)
}

fn env_override(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Load and parse a WikidownConfig from a TOML file. Returns default if the
/// file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<WikidownConfig> {
    if !config_path.exists() {
        return Ok(WikidownConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: WikidownConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

/// Commented starter config written by `wikidown init`.
pub fn render_default_config() -> String {
    format!(
        "# wikidown configuration (materialized by `wikidown init`)\n\
# Command-line flags override environment variables, which override this file.\n\
\n\
[convert]\n\
input = \"{DEFAULT_INPUT}\"\n\
output_dir = \"{DEFAULT_OUTPUT_DIR}\"\n\
# verify_dir = \"expected\"\n\
render_html = false\n\
strict = false\n\
jobs = 1\n\
list_depth = \"preserve\"\n\
ignore_whitespace = true\n\
\n\
[confluence]\n\
# url = \"https://your-site.atlassian.net\"\n\
# space = \"DOCS\"\n\
# user = \"you@example.com\"\n\
# parent_id = \"12345\"\n\
overwrite = true\n\
# user_agent = \"{DEFAULT_USER_AGENT}\"\n\
# The API token is read from {TOKEN_ENV} (environment or .env), never from this file.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_has_no_sections_set() {
        let config = WikidownConfig::default();
        assert!(config.convert.input.is_none());
        assert!(config.confluence.url.is_none());
        assert!(config.overwrite());
    }

    #[test]
    fn load_config_returns_default_for_missing_file() {
        let config = load_config(Path::new("/nonexistent/wikidown.toml")).expect("load config");
        assert_eq!(config, WikidownConfig::default());
    }

    #[test]
    fn load_config_parses_both_sections() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &config_path,
            r#"
[convert]
input = "pages/*.wiki"
output_dir = "md"
verify_dir = "expected"
render_html = true
strict = true
jobs = 4
list_depth = "clamp"
ignore_whitespace = false

[confluence]
url = "https://example.atlassian.net/"
space = "DOCS"
user = "me@example.com"
parent_id = "12345"
overwrite = false
"#,
        )
        .expect("write config");

        let config = load_config(&config_path).expect("load config");
        assert_eq!(config.convert.input.as_deref(), Some("pages/*.wiki"));
        assert_eq!(config.convert.output_dir.as_deref(), Some("md"));
        assert_eq!(config.convert.verify_dir.as_deref(), Some("expected"));
        assert_eq!(config.convert.render_html, Some(true));
        assert_eq!(config.convert.strict, Some(true));
        assert_eq!(config.convert.jobs, Some(4));
        assert_eq!(config.convert.list_depth, Some(ListDepthPolicy::Clamp));
        assert_eq!(config.convert.ignore_whitespace, Some(false));
        assert_eq!(config.confluence.space.as_deref(), Some("DOCS"));
        assert_eq!(config.confluence.parent_id.as_deref(), Some("12345"));
        assert!(!config.overwrite());
    }

    #[test]
    fn load_config_tolerates_partial_toml() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "[convert]\njobs = 2\n").expect("write config");

        let config = load_config(&config_path).expect("load config");
        assert_eq!(config.convert.jobs, Some(2));
        assert!(config.confluence.url.is_none());
    }

    #[test]
    fn load_config_rejects_unknown_list_policy() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "[convert]\nlist_depth = \"flatten\"\n").expect("write config");
        let error = load_config(&config_path).expect_err("must fail");
        assert!(error.to_string().contains("failed to parse"));
    }

    #[test]
    fn load_config_returns_error_for_invalid_toml() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "[convert\ninput = \"oops\"").expect("write config");
        let error = load_config(&config_path).expect_err("must fail");
        assert!(error.to_string().contains("failed to parse"));
    }

    #[test]
    fn default_config_template_parses_to_defaults() {
        let parsed: WikidownConfig =
            toml::from_str(&render_default_config()).expect("template parses");
        assert_eq!(parsed.convert.input.as_deref(), Some(DEFAULT_INPUT));
        assert_eq!(parsed.convert.output_dir.as_deref(), Some(DEFAULT_OUTPUT_DIR));
        assert_eq!(parsed.convert.list_depth, Some(ListDepthPolicy::Preserve));
        assert!(parsed.confluence.url.is_none());
        assert_eq!(parsed.confluence.overwrite, Some(true));
    }
}
