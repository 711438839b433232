use std::collections::BTreeMap;
use std::env;
use std::thread::sleep;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::batch::PageSink;
use crate::config::{TOKEN_ENV, WikidownConfig, confluence_token};
use crate::filesystem::decode_title;
use crate::inline::{LinkTarget, escape_destination};
use crate::dialect::LINK_FRAGMENT;
use crate::render::render_html_with_links;
use crate::translate::{Page, Translation};

const CONTENT_API_PATH: &str = "/wiki/rest/api/content";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemotePage {
    pub id: String,
    pub title: String,
    pub version: u64,
    pub url: Option<String>,
}

pub trait PagePublisher {
    fn find_page(&mut self, space: &str, title: &str) -> Result<Option<RemotePage>>;
    fn create_page(
        &mut self,
        space: &str,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<RemotePage>;
    /// Replaces the body of page `id`; `version` is the new version number.
    fn update_page(
        &mut self,
        id: &str,
        space: &str,
        title: &str,
        body: &str,
        version: u64,
    ) -> Result<RemotePage>;
    fn request_count(&self) -> usize;
}

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub space: String,
    pub parent_id: Option<String>,
    pub overwrite: bool,
}

impl UploadOptions {
    pub fn from_config(config: &WikidownConfig) -> Result<Self> {
        let Some(space) = config.confluence_space() else {
            bail!("upload needs a space key: set [confluence] space or CONFLUENCE_SPACE");
        };
        Ok(Self {
            space,
            parent_id: config.confluence_parent_id(),
            overwrite: config.overwrite(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub title: String,
    /// Storage-format (XHTML) body.
    pub body: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PublishAction {
    Created,
    Updated,
    SkippedExisting,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub title: String,
    pub action: PublishAction,
    pub page_id: String,
    pub url: Option<String>,
}

pub fn publish_page(
    api: &mut dyn PagePublisher,
    options: &UploadOptions,
    request: &PublishRequest,
) -> Result<PublishOutcome> {
    let existing = api
        .find_page(&options.space, &request.title)
        .with_context(|| format!("failed to look up {} in space {}", request.title, options.space))?;

    let (action, page) = match existing {
        Some(existing) if options.overwrite => {
            let page = api
                .update_page(
                    &existing.id,
                    &options.space,
                    &request.title,
                    &request.body,
                    existing.version + 1,
                )
                .with_context(|| format!("failed to update {}", request.title))?;
            (PublishAction::Updated, page)
        }
        Some(existing) => {
            warn!(
                "{} already exists in space {} and overwrite is disabled; skipping",
                request.title, options.space
            );
            (PublishAction::SkippedExisting, existing)
        }
        None => {
            let page = api
                .create_page(
                    &options.space,
                    &request.title,
                    &request.body,
                    options.parent_id.as_deref(),
                )
                .with_context(|| format!("failed to create {}", request.title))?;
            (PublishAction::Created, page)
        }
    };

    Ok(PublishOutcome {
        title: request.title.clone(),
        action,
        page_id: page.id,
        url: page.url,
    })
}

/// Renders the page body with `Target.md` link destinations pointed at
/// hosted pages. Each target is resolved once; targets the resolver does not
/// know keep their relative destination.
pub fn render_with_hosted_links<F>(markdown: &str, links: &[LinkTarget], mut resolver: F) -> String
where
    F: FnMut(&LinkTarget) -> Option<String>,
{
    let mut hosted = BTreeMap::<&str, Option<String>>::new();
    render_html_with_links(markdown, |destination| {
        let (path, fragment) = match destination.split_once(LINK_FRAGMENT) {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (destination, None),
        };
        let link = links
            .iter()
            .find(|link| path.strip_suffix(".md") == Some(escape_destination(&link.page).as_str()))?;
        let url = hosted
            .entry(link.page.as_str())
            .or_insert_with(|| resolver(link))
            .clone()?;
        Some(match fragment {
            Some(fragment) => format!("{url}{LINK_FRAGMENT}{fragment}"),
            None => url,
        })
    })
}

/// Publishes each page after it is written, rewriting links to pages that
/// already exist in the target space.
pub struct UploadSink<P: PagePublisher> {
    api: P,
    options: UploadOptions,
    known_urls: BTreeMap<String, Option<String>>,
    outcomes: Vec<PublishOutcome>,
}

impl<P: PagePublisher> UploadSink<P> {
    pub fn new(api: P, options: UploadOptions) -> Self {
        Self {
            api,
            options,
            known_urls: BTreeMap::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn outcomes(&self) -> &[PublishOutcome] {
        &self.outcomes
    }

    pub fn request_count(&self) -> usize {
        self.api.request_count()
    }

    fn lookup_url(&mut self, title: &str) -> Option<String> {
        if let Some(url) = self.known_urls.get(title) {
            return url.clone();
        }
        let url = match self.api.find_page(&self.options.space, title) {
            Ok(page) => page.and_then(|page| page.url),
            Err(error) => {
                warn!("failed to resolve link target {title}: {error:#}");
                None
            }
        };
        self.known_urls.insert(title.to_string(), url.clone());
        url
    }
}

impl<P: PagePublisher> PageSink for UploadSink<P> {
    fn write_page(&mut self, page: &Page, translation: &Translation) -> Result<()> {
        let markdown = translation.to_markdown();
        let body = render_with_hosted_links(&markdown, &translation.links, |link| {
            self.lookup_url(&link.title)
        });
        let request = PublishRequest {
            title: decode_title(&page.title),
            body,
        };
        let outcome = publish_page(&mut self.api, &self.options, &request)?;
        info!(
            "{:?} {} -> {}",
            outcome.action,
            outcome.title,
            outcome.url.as_deref().unwrap_or("<no url>")
        );
        self.known_urls
            .insert(outcome.title.clone(), outcome.url.clone());
        self.outcomes.push(outcome);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfluenceClientConfig {
    pub base_url: String,
    pub user: String,
    pub token: String,
    pub user_agent: String,
    pub timeout_ms: u64,
    pub rate_limit_ms: u64,
    pub max_retries: usize,
    pub max_write_retries: usize,
    pub retry_delay_ms: u64,
}

impl ConfluenceClientConfig {
    pub fn from_config(config: &WikidownConfig) -> Result<Self> {
        Self::from_parts(
            config.confluence_url(),
            config.confluence_user(),
            confluence_token(),
            config.user_agent(),
        )
    }

    fn from_parts(
        base_url: Option<String>,
        user: Option<String>,
        token: Option<String>,
        user_agent: String,
    ) -> Result<Self> {
        let Some(base_url) = base_url else {
            bail!("upload needs a Confluence URL: set [confluence] url or CONFLUENCE_URL");
        };
        let Some(user) = user else {
            bail!("upload needs a Confluence user: set [confluence] user or CONFLUENCE_USER");
        };
        let Some(token) = token else {
            bail!("upload needs an API token in {TOKEN_ENV} (environment or .env)");
        };
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user,
            token,
            user_agent,
            timeout_ms: env_value_u64("WIKIDOWN_HTTP_TIMEOUT_MS", 30_000),
            rate_limit_ms: env_value_u64("WIKIDOWN_RATE_LIMIT_MS", 500),
            max_retries: env_value_usize("WIKIDOWN_HTTP_RETRIES", 2),
            max_write_retries: env_value_usize("WIKIDOWN_HTTP_WRITE_RETRIES", 1),
            retry_delay_ms: env_value_u64("WIKIDOWN_HTTP_RETRY_DELAY_MS", 500),
        })
    }
}

pub struct ConfluenceClient {
    client: Client,
    config: ConfluenceClientConfig,
    last_request_at: Option<Instant>,
    request_count: usize,
}

impl ConfluenceClient {
    pub fn new(config: ConfluenceClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("failed to build Confluence HTTP client")?;

        Ok(Self {
            client,
            config,
            last_request_at: None,
            request_count: 0,
        })
    }

    fn request_json(
        &mut self,
        method: Method,
        suffix: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let endpoint = format!("{}{CONTENT_API_PATH}{suffix}", self.config.base_url);
        let url = Url::parse(&endpoint)
            .with_context(|| format!("invalid Confluence URL: {endpoint}"))?;
        let is_write = method != Method::GET;
        let max_retries = if is_write {
            self.config.max_write_retries
        } else {
            self.config.max_retries
        };

        for attempt in 0..=max_retries {
            self.apply_rate_limit();
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .basic_auth(&self.config.user, Some(&self.config.token))
                .header("User-Agent", self.config.user_agent.clone())
                .header("Accept", "application/json")
                .query(query);
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send() {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        if attempt < max_retries && is_retryable_status(status) {
                            warn!("Confluence returned HTTP {status} for {method} {endpoint}; retrying");
                            self.wait_before_retry(attempt, is_write);
                            continue;
                        }
                        let detail = response
                            .json::<Value>()
                            .ok()
                            .and_then(|payload| {
                                payload
                                    .get("message")
                                    .and_then(Value::as_str)
                                    .map(str::to_string)
                            })
                            .unwrap_or_else(|| "no message".to_string());
                        bail!("Confluence API request failed with HTTP {status}: {detail}");
                    }
                    return response
                        .json()
                        .context("failed to decode Confluence API JSON response");
                }
                Err(error) => {
                    if attempt < max_retries && is_retryable_error(&error) {
                        warn!("Confluence request {method} {endpoint} failed: {error}; retrying");
                        self.wait_before_retry(attempt, is_write);
                        continue;
                    }
                    return Err(error).context("failed to call Confluence API");
                }
            }
        }

        bail!("Confluence API request exhausted retry budget")
    }

    fn apply_rate_limit(&mut self) {
        let delay = Duration::from_millis(self.config.rate_limit_ms);
        if let Some(last) = self.last_request_at {
            let elapsed = last.elapsed();
            if elapsed < delay {
                sleep(delay - elapsed);
            }
        }
        self.last_request_at = Some(Instant::now());
        self.request_count += 1;
    }

    fn wait_before_retry(&self, attempt: usize, is_write: bool) {
        let exponent = u32::try_from(attempt).unwrap_or(16);
        let base = self
            .config
            .retry_delay_ms
            .saturating_mul(2u64.saturating_pow(exponent));
        let jitter = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| u64::from(duration.subsec_millis() % 100))
            .unwrap_or(0);
        let multiplier = if is_write { 2u64 } else { 1u64 };
        sleep(Duration::from_millis(
            base.saturating_mul(multiplier).saturating_add(jitter),
        ));
    }

    fn default_links_base(&self) -> String {
        format!("{}/wiki", self.config.base_url)
    }
}

impl PagePublisher for ConfluenceClient {
    fn find_page(&mut self, space: &str, title: &str) -> Result<Option<RemotePage>> {
        let payload = self.request_json(
            Method::GET,
            "",
            &[
                ("spaceKey", space.to_string()),
                ("title", title.to_string()),
                ("expand", "version".to_string()),
            ],
            None,
        )?;
        let parsed: ContentSearchResponse =
            serde_json::from_value(payload).context("failed to decode content search response")?;
        let base = parsed
            .links
            .base
            .clone()
            .unwrap_or_else(|| self.default_links_base());
        debug!("search for {title} in {space}: {} result(s)", parsed.results.len());
        Ok(parsed
            .results
            .into_iter()
            .next()
            .map(|content| content.into_remote_page(&base)))
    }

    fn create_page(
        &mut self,
        space: &str,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<RemotePage> {
        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": { "key": space },
            "body": { "storage": { "value": body, "representation": "storage" } },
        });
        if let Some(parent_id) = parent_id {
            payload["ancestors"] = json!([{ "id": parent_id }]);
        }
        let response = self.request_json(Method::POST, "", &[], Some(&payload))?;
        self.decode_content(response)
    }

    fn update_page(
        &mut self,
        id: &str,
        space: &str,
        title: &str,
        body: &str,
        version: u64,
    ) -> Result<RemotePage> {
        let payload = json!({
            "id": id,
            "type": "page",
            "title": title,
            "space": { "key": space },
            "version": { "number": version },
            "body": { "storage": { "value": body, "representation": "storage" } },
        });
        let response = self.request_json(Method::PUT, &format!("/{id}"), &[], Some(&payload))?;
        self.decode_content(response)
    }

    fn request_count(&self) -> usize {
        self.request_count
    }
}

impl ConfluenceClient {
    fn decode_content(&self, payload: Value) -> Result<RemotePage> {
        let content: ContentPayload =
            serde_json::from_value(payload).context("failed to decode content response")?;
        let base = content
            .links
            .base
            .clone()
            .unwrap_or_else(|| self.default_links_base());
        Ok(content.into_remote_page(&base))
    }
}

fn env_value_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_value_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

#[derive(Debug, Deserialize, Default)]
struct ContentSearchResponse {
    #[serde(default)]
    results: Vec<ContentPayload>,
    #[serde(default, rename = "_links")]
    links: LinksPayload,
}

#[derive(Debug, Deserialize)]
struct ContentPayload {
    id: String,
    title: String,
    #[serde(default)]
    version: Option<VersionPayload>,
    #[serde(default, rename = "_links")]
    links: LinksPayload,
}

impl ContentPayload {
    fn into_remote_page(self, base: &str) -> RemotePage {
        let url = self
            .links
            .webui
            .map(|webui| format!("{}{webui}", base.trim_end_matches('/')));
        RemotePage {
            id: self.id,
            title: self.title,
            version: self.version.map(|version| version.number).unwrap_or(1),
            url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VersionPayload {
    number: u64,
}

#[derive(Debug, Deserialize, Default)]
struct LinksPayload {
    base: Option<String>,
    webui: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use reqwest::StatusCode;
    use serde_json::json;

    use super::{
        ConfluenceClientConfig, ContentSearchResponse, PagePublisher, PublishAction,
        PublishRequest, RemotePage, UploadOptions, UploadSink, is_retryable_status,
        publish_page, render_with_hosted_links,
    };
    use crate::batch::{BatchOptions, PageJob, PageSink, run_batch};
    use crate::inline::LinkTarget;
    use crate::translate::{Page, TranslateOptions};

    #[derive(Default)]
    struct MockPublisher {
        pages: BTreeMap<String, RemotePage>,
        created: Vec<(String, Option<String>)>,
        updated: Vec<(String, u64)>,
        bodies: BTreeMap<String, String>,
        request_count: usize,
    }

    impl MockPublisher {
        fn with_page(mut self, title: &str, id: &str, version: u64) -> Self {
            self.pages.insert(
                title.to_string(),
                RemotePage {
                    id: id.to_string(),
                    title: title.to_string(),
                    version,
                    url: Some(format!("https://wiki.example/pages/{id}")),
                },
            );
            self
        }
    }

    impl PagePublisher for MockPublisher {
        fn find_page(&mut self, _space: &str, title: &str) -> anyhow::Result<Option<RemotePage>> {
            self.request_count += 1;
            Ok(self.pages.get(title).cloned())
        }

        fn create_page(
            &mut self,
            _space: &str,
            title: &str,
            body: &str,
            parent_id: Option<&str>,
        ) -> anyhow::Result<RemotePage> {
            self.request_count += 1;
            let id = format!("{}", 100 + self.created.len());
            let page = RemotePage {
                id: id.clone(),
                title: title.to_string(),
                version: 1,
                url: Some(format!("https://wiki.example/pages/{id}")),
            };
            self.created
                .push((title.to_string(), parent_id.map(str::to_string)));
            self.bodies.insert(title.to_string(), body.to_string());
            self.pages.insert(title.to_string(), page.clone());
            Ok(page)
        }

        fn update_page(
            &mut self,
            id: &str,
            _space: &str,
            title: &str,
            body: &str,
            version: u64,
        ) -> anyhow::Result<RemotePage> {
            self.request_count += 1;
            self.updated.push((id.to_string(), version));
            self.bodies.insert(title.to_string(), body.to_string());
            let page = RemotePage {
                id: id.to_string(),
                title: title.to_string(),
                version,
                url: Some(format!("https://wiki.example/pages/{id}")),
            };
            self.pages.insert(title.to_string(), page.clone());
            Ok(page)
        }

        fn request_count(&self) -> usize {
            self.request_count
        }
    }

    fn options(overwrite: bool) -> UploadOptions {
        UploadOptions {
            space: "DOCS".to_string(),
            parent_id: Some("42".to_string()),
            overwrite,
        }
    }

    fn request(title: &str) -> PublishRequest {
        PublishRequest {
            title: title.to_string(),
            body: "<p>hi</p>".to_string(),
        }
    }

    #[test]
    fn publish_creates_missing_pages_under_parent() {
        let mut api = MockPublisher::default();
        let outcome = publish_page(&mut api, &options(true), &request("Home")).expect("publish");
        assert_eq!(outcome.action, PublishAction::Created);
        assert_eq!(outcome.url.as_deref(), Some("https://wiki.example/pages/100"));
        assert_eq!(api.created, vec![("Home".to_string(), Some("42".to_string()))]);
        assert_eq!(api.request_count(), 2);
    }

    #[test]
    fn publish_updates_existing_pages_with_next_version() {
        let mut api = MockPublisher::default().with_page("Home", "7", 4);
        let outcome = publish_page(&mut api, &options(true), &request("Home")).expect("publish");
        assert_eq!(outcome.action, PublishAction::Updated);
        assert_eq!(outcome.page_id, "7");
        assert_eq!(api.updated, vec![("7".to_string(), 5)]);
    }

    #[test]
    fn publish_skips_existing_pages_without_overwrite() {
        let mut api = MockPublisher::default().with_page("Home", "7", 4);
        let outcome = publish_page(&mut api, &options(false), &request("Home")).expect("publish");
        assert_eq!(outcome.action, PublishAction::SkippedExisting);
        assert!(api.updated.is_empty());
        assert!(api.created.is_empty());
    }

    #[test]
    fn hosted_links_replace_known_targets_only() {
        let markdown = "[A](Page%20One.md#x) and [B](Other.md) and [C](Page%20One.md)\n\n\
                        `[D](Page%20One.md)`\n";
        let links = vec![
            LinkTarget {
                page: "Page One".to_string(),
                title: "Page One".to_string(),
                anchor: Some("x".to_string()),
            },
            LinkTarget {
                page: "Other".to_string(),
                title: "Other".to_string(),
                anchor: None,
            },
            LinkTarget {
                page: "Page One".to_string(),
                title: "Page One".to_string(),
                anchor: None,
            },
        ];
        let mut asked = Vec::new();
        let body = render_with_hosted_links(markdown, &links, |link| {
            asked.push(link.page.clone());
            (link.page == "Page One").then(|| "https://wiki.example/pages/1".to_string())
        });
        assert!(body.contains("<a href=\"https://wiki.example/pages/1#x\">A</a>"), "{body}");
        assert!(body.contains("<a href=\"Other.md\">B</a>"));
        assert!(body.contains("<a href=\"https://wiki.example/pages/1\">C</a>"));
        assert!(body.contains("<code>[D](Page%20One.md)</code>"));
        assert_eq!(asked, vec!["Page One", "Other"]);
    }

    #[test]
    fn upload_sink_links_to_previously_published_pages() {
        let api = MockPublisher::default();
        let mut sink = UploadSink::new(api, options(true));
        let options = TranslateOptions::default();

        let mut first = Page::from_source("Notes%2FDaily", "+ Daily");
        let translation = first.translate(&options).clone();
        sink.write_page(&first, &translation).expect("first");

        let mut second = Page::from_source("Home", "see [[Notes%2FDaily]]");
        let translation = second.translate(&options).clone();
        sink.write_page(&second, &translation).expect("second");

        let outcomes = sink.outcomes();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].title, "Notes/Daily");
        let home_body = sink.api.bodies.get("Home").expect("home body");
        assert!(home_body.contains("href=\"https://wiki.example/pages/100\""));
    }

    #[test]
    fn strict_batch_never_publishes_a_mismatching_page() {
        let mut sink = UploadSink::new(MockPublisher::default(), options(true));
        let jobs = vec![
            PageJob::new("A", "+ A", Some("# A".to_string())),
            PageJob::new("B", "+ B\nbody", Some("# B\nother".to_string())),
            PageJob::new("C", "+ C", None),
        ];
        let batch = BatchOptions {
            strict: true,
            ..BatchOptions::default()
        };
        let report = run_batch(jobs, &batch, &mut sink);

        assert!(report.aborted);
        let published = sink
            .outcomes()
            .iter()
            .map(|outcome| outcome.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(published, vec!["A"]);
        assert!(!sink.api.bodies.contains_key("B"));
    }

    #[test]
    fn client_config_requires_url_user_and_token() {
        let missing_token = ConfluenceClientConfig::from_parts(
            Some("https://x.atlassian.net/".to_string()),
            Some("me".to_string()),
            None,
            "ua".to_string(),
        )
        .expect_err("must fail");
        assert!(missing_token.to_string().contains("CONFLUENCE_API_TOKEN"));

        let config = ConfluenceClientConfig::from_parts(
            Some("https://x.atlassian.net/".to_string()),
            Some("me".to_string()),
            Some("secret".to_string()),
            "ua".to_string(),
        )
        .expect("config");
        assert_eq!(config.base_url, "https://x.atlassian.net");
    }

    #[test]
    fn search_payload_decodes_to_remote_page() {
        let payload = json!({
            "results": [{
                "id": "123",
                "title": "Home",
                "version": { "number": 3 },
                "_links": { "webui": "/spaces/DOCS/pages/123/Home" }
            }],
            "_links": { "base": "https://x.atlassian.net/wiki" }
        });
        let parsed: ContentSearchResponse = serde_json::from_value(payload).expect("decode");
        let base = parsed.links.base.clone().expect("base");
        let page = parsed
            .results
            .into_iter()
            .next()
            .expect("result")
            .into_remote_page(&base);
        assert_eq!(page.version, 3);
        assert_eq!(
            page.url.as_deref(),
            Some("https://x.atlassian.net/wiki/spaces/DOCS/pages/123/Home")
        );
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
    }
}
