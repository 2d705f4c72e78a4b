use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{Encyclopedia, Page, WikiError};
use crate::config::Config;

const BASE_PARAMS: &[(&str, &str)] = &[("format", "json"), ("formatversion", "2")];
const SEARCH_LIMIT: &str = "10";
const BASE_BACKOFF_MS: u64 = 1000;

// First wiki link on a line: target, then optional `|label`.
static WIKI_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]|]+)(?:\|[^\[\]]*)?\]\]").unwrap());
static NAMESPACED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:file|image|media|category|template|help|wikt|wiktionary|wp|wikipedia|portal|special):").unwrap()
});

/// MediaWiki Action API client for one Wikipedia edition.
pub struct WikipediaClient {
    http: reqwest::Client,
    api_url: String,
    max_retries: u32,
}

impl WikipediaClient {
    pub fn new(config: &Config) -> Result<Self, WikiError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        Ok(WikipediaClient {
            http,
            api_url: config.api_url.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<QueryBody, WikiError> {
        let body = self.get_with_retry(params).await?;
        parse_query(&body)
    }

    async fn get_with_retry(&self, params: &[(&str, &str)]) -> Result<String, WikiError> {
        let mut attempt = 0;
        loop {
            let response = self
                .http
                .get(&self.api_url)
                .query(BASE_PARAMS)
                .query(params)
                .send()
                .await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.text().await?);
            }

            let Some(backoff) = retry_delay(status, attempt, self.max_retries) else {
                return Err(WikiError::Status(status.as_u16()));
            };
            warn!(
                "HTTP {} from {} (attempt {}/{}), backing off {:.1}s",
                status.as_u16(),
                self.api_url,
                attempt + 1,
                self.max_retries,
                backoff.as_secs_f64()
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    /// Titles a disambiguation page lists, in page order.
    async fn disambiguation_options(&self, title: &str) -> Result<Vec<String>, WikiError> {
        let query = self
            .query(&[
                ("action", "query"),
                ("prop", "revisions"),
                ("rvprop", "content"),
                ("rvslots", "main"),
                ("titles", title),
            ])
            .await?;
        Ok(bullet_links(&page_wikitext(query)))
    }

    async fn extract(&self, title: &str, extra: &[(&str, &str)]) -> Result<String, WikiError> {
        let mut params = vec![
            ("action", "query"),
            ("prop", "extracts"),
            ("explaintext", "1"),
            ("redirects", "1"),
            ("titles", title),
        ];
        params.extend_from_slice(extra);
        let query = self.query(&params).await?;
        extract_text(query, title)
    }
}

impl Encyclopedia for WikipediaClient {
    async fn search(&self, query: &str) -> Result<Vec<String>, WikiError> {
        info!("Searching {} for: {}", self.api_url, query);
        let body = self
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", SEARCH_LIMIT),
                ("srprop", ""),
            ])
            .await?;
        let titles = search_titles(body);
        debug!("{} search results", titles.len());
        Ok(titles)
    }

    async fn page(&self, title: &str) -> Result<Page, WikiError> {
        let query = self
            .query(&[
                ("action", "query"),
                ("prop", "info|pageprops"),
                ("ppprop", "disambiguation"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        match resolve_page(query, title)? {
            Resolved::Article(page) => Ok(page),
            Resolved::Disambiguation(title) => {
                let options = self.disambiguation_options(&title).await?;
                info!("\"{}\" is a disambiguation page ({} options)", title, options.len());
                Err(WikiError::Disambiguation { title, options })
            }
        }
    }

    async fn summary(&self, title: &str, sentences: usize) -> Result<String, WikiError> {
        if sentences > 0 {
            let n = sentences.to_string();
            self.extract(title, &[("exsentences", n.as_str())]).await
        } else {
            self.extract(title, &[("exintro", "1")]).await
        }
    }

    async fn content(&self, title: &str) -> Result<String, WikiError> {
        self.extract(title, &[]).await
    }
}

// ── Response parsing ──

#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<QueryBody>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBody {
    #[serde(default)]
    search: Vec<TitleRef>,
    #[serde(default)]
    pages: Vec<PageBody>,
}

#[derive(Debug, Deserialize)]
struct TitleRef {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    pageprops: Option<PageProps>,
    extract: Option<String>,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    slots: Slots,
}

#[derive(Debug, Deserialize)]
struct Slots {
    main: Slot,
}

#[derive(Debug, Deserialize)]
struct Slot {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    disambiguation: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Resolved {
    Article(Page),
    Disambiguation(String),
}

fn parse_query(body: &str) -> Result<QueryBody, WikiError> {
    let response: ApiResponse = serde_json::from_str(body)?;
    if let Some(err) = response.error {
        return Err(WikiError::Api {
            code: err.code,
            info: err.info,
        });
    }
    Ok(response.query.unwrap_or_default())
}

fn search_titles(query: QueryBody) -> Vec<String> {
    query.search.into_iter().map(|hit| hit.title).collect()
}

fn resolve_page(query: QueryBody, requested: &str) -> Result<Resolved, WikiError> {
    let page = query
        .pages
        .into_iter()
        .next()
        .ok_or_else(|| WikiError::PageNotFound(requested.to_string()))?;

    if page.missing || page.invalid {
        return Err(WikiError::PageNotFound(requested.to_string()));
    }

    let is_disambiguation = page
        .pageprops
        .map(|props| props.disambiguation.is_some())
        .unwrap_or(false);
    if is_disambiguation {
        Ok(Resolved::Disambiguation(page.title))
    } else {
        Ok(Resolved::Article(Page { title: page.title }))
    }
}

/// Delay before retrying a failed request, or `None` to give up.
///
/// Only 429 and 5xx are retried, `BASE_BACKOFF_MS * 2^attempt` apart.
fn retry_delay(status: StatusCode, attempt: u32, max_retries: u32) -> Option<Duration> {
    let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
    if !retryable || attempt >= max_retries {
        return None;
    }
    let factor = 2u64.saturating_pow(attempt);
    Some(Duration::from_millis(BASE_BACKOFF_MS.saturating_mul(factor)))
}

fn page_wikitext(query: QueryBody) -> String {
    query
        .pages
        .into_iter()
        .flat_map(|page| page.revisions)
        .next()
        .map(|revision| revision.slots.main.content)
        .unwrap_or_default()
}

/// First article link of every `*` bullet, top to bottom.
///
/// `[[Target#Section|label]]` yields `Target`; links into other namespaces
/// (files, categories, wiktionary) are passed over.
fn bullet_links(wikitext: &str) -> Vec<String> {
    wikitext
        .lines()
        .filter(|line| line.trim_start().starts_with('*'))
        .filter_map(|line| {
            WIKI_LINK_RE.captures_iter(line).find_map(|caps| {
                let target = caps[1].trim().trim_start_matches(':');
                let target = target.split('#').next().unwrap_or_default().trim();
                if target.is_empty() || NAMESPACED_RE.is_match(target) {
                    None
                } else {
                    Some(target.replace('_', " "))
                }
            })
        })
        .collect()
}

fn extract_text(query: QueryBody, requested: &str) -> Result<String, WikiError> {
    let page = query
        .pages
        .into_iter()
        .next()
        .filter(|page| !page.missing && !page.invalid)
        .ok_or_else(|| WikiError::PageNotFound(requested.to_string()))?;
    Ok(page.extract.unwrap_or_default())
}

// ── Tests ──
