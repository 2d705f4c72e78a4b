use tracing::{info, warn};

use super::{Encyclopedia, Page, WikiError};
use crate::clean::clean_wikipedia_text;
use crate::config::OutputFormat;

const CONTENT_RULE_WIDTH: usize = 60;

/// A cleaned article, not yet given its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub body: String,
    pub format: OutputFormat,
}

/// Which title header an article is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// `## Title` / `=== Title ===`
    Summary,
    /// `# Title` / title between two rules
    Content,
}

impl Article {
    pub fn render(&self, style: HeaderStyle) -> String {
        format!("{}{}", header(&self.title, self.format, style), self.body)
    }
}

pub fn header(title: &str, format: OutputFormat, style: HeaderStyle) -> String {
    match (style, format) {
        (HeaderStyle::Summary, OutputFormat::Jupyter) => format!("## {title}\n\n"),
        (HeaderStyle::Summary, OutputFormat::Plain) => format!("=== {title} ===\n\n"),
        (HeaderStyle::Content, OutputFormat::Jupyter) => format!("# {title}\n\n"),
        (HeaderStyle::Content, OutputFormat::Plain) => {
            let rule = "=".repeat(CONTENT_RULE_WIDTH);
            format!("{rule}\n{title}\n{rule}\n\n")
        }
    }
}

/// Search for `query` and resolve the best hit to an article.
///
/// A disambiguation page is replaced by the first title it lists.
pub async fn resolve_first<E: Encyclopedia>(wiki: &E, query: &str) -> Result<Page, WikiError> {
    let results = wiki.search(query).await?;
    let first = results
        .first()
        .ok_or_else(|| WikiError::NoResults(query.to_string()))?;

    match wiki.page(first).await {
        Err(WikiError::Disambiguation { title, options }) => match options.first() {
            Some(option) => {
                info!("Resolving \"{}\" to first option \"{}\"", title, option);
                wiki.page(option).await
            }
            None => Err(WikiError::Disambiguation { title, options }),
        },
        resolved => resolved,
    }
}

/// Fetch and clean an article's lead section (`sentences == 0` for all of it).
pub async fn fetch_summary<E: Encyclopedia>(
    wiki: &E,
    query: &str,
    sentences: usize,
    format: OutputFormat,
) -> Result<Article, WikiError> {
    let page = resolve_first(wiki, query).await?;
    let raw = wiki.summary(&page.title, sentences).await?;
    Ok(Article {
        body: clean_wikipedia_text(&raw, format),
        title: page.title,
        format,
    })
}

/// Fetch and clean an article's full text.
pub async fn fetch_content<E: Encyclopedia>(
    wiki: &E,
    query: &str,
    format: OutputFormat,
) -> Result<Article, WikiError> {
    let page = resolve_first(wiki, query).await?;
    let raw = wiki.content(&page.title).await?;
    Ok(Article {
        body: clean_wikipedia_text(&raw, format),
        title: page.title,
        format,
    })
}

/// Summary of the best match for `query`, formatted for display.
///
/// Never fails: problems are reported in the returned text.
pub async fn wiki_fetch<E: Encyclopedia>(
    wiki: &E,
    query: &str,
    sentences: usize,
    format: OutputFormat,
) -> String {
    match fetch_summary(wiki, query, sentences, format).await {
        Ok(article) => article.render(HeaderStyle::Summary),
        Err(WikiError::NoResults(_)) => format!("No Wikipedia results found for: {query}"),
        Err(WikiError::PageNotFound(_)) => format!("Wikipedia page not found for: {query}"),
        Err(e) => {
            warn!("Fetching \"{}\" failed: {}", query, e);
            format!("Error fetching Wikipedia content: {e}")
        }
    }
}

/// Full text of the best match for `query`, formatted for display.
pub async fn wiki_content<E: Encyclopedia>(wiki: &E, query: &str, format: OutputFormat) -> String {
    match fetch_content(wiki, query, format).await {
        Ok(article) => article.render(HeaderStyle::Content),
        Err(WikiError::NoResults(_)) => format!("No Wikipedia results found for: {query}"),
        Err(e) => {
            warn!("Fetching \"{}\" failed: {}", query, e);
            format!("Error fetching Wikipedia content: {e}")
        }
    }
}

// ── Tests ──

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::*;

    pub(crate) enum Entry {
        Article(String),
        Missing,
        Disambiguation(Vec<String>),
    }

    /// In-memory encyclopedia keyed by title.
    #[derive(Default)]
    pub(crate) struct FakeWiki {
        pub results: Vec<String>,
        pub entries: HashMap<String, Entry>,
        pub search_status: Option<u16>,
    }

    impl FakeWiki {
        pub fn with_article(title: &str, text: &str) -> Self {
            let mut wiki = FakeWiki {
                results: vec![title.to_string()],
                ..Default::default()
            };
            wiki.entries.insert(title.to_string(), Entry::Article(text.to_string()));
            wiki
        }

        fn text(&self, title: &str) -> Result<&str, WikiError> {
            match self.entries.get(title) {
                Some(Entry::Article(text)) => Ok(text.as_str()),
                _ => Err(WikiError::PageNotFound(title.to_string())),
            }
        }
    }

    impl Encyclopedia for FakeWiki {
        async fn search(&self, _query: &str) -> Result<Vec<String>, WikiError> {
            match self.search_status {
                Some(status) => Err(WikiError::Status(status)),
                None => Ok(self.results.clone()),
            }
        }

        async fn page(&self, title: &str) -> Result<Page, WikiError> {
            match self.entries.get(title) {
                Some(Entry::Article(_)) => Ok(Page {
                    title: title.to_string(),
                }),
                Some(Entry::Disambiguation(options)) => Err(WikiError::Disambiguation {
                    title: title.to_string(),
                    options: options.clone(),
                }),
                Some(Entry::Missing) | None => Err(WikiError::PageNotFound(title.to_string())),
            }
        }

        async fn summary(&self, title: &str, sentences: usize) -> Result<String, WikiError> {
            let text = self.text(title)?;
            if sentences == 0 {
                return Ok(text.to_string());
            }
            Ok(text.split_inclusive(". ").take(sentences).collect())
        }

        async fn content(&self, title: &str) -> Result<String, WikiError> {
            Ok(format!("{}\n\n\n\nHistory\n\nIt has one.", self.text(title)?))
        }
    }

    #[tokio::test]
    async fn no_results_message() {
        let wiki = FakeWiki::default();
        let out = wiki_fetch(&wiki, "xyzzy plugh", 0, OutputFormat::Plain).await;
        assert_eq!(out, "No Wikipedia results found for: xyzzy plugh");
        assert!(out.contains("No Wikipedia results found"));
    }

    #[tokio::test]
    async fn no_results_is_structured() {
        let wiki = FakeWiki::default();
        let err = fetch_summary(&wiki, "xyzzy", 0, OutputFormat::Plain).await.unwrap_err();
        assert!(matches!(err, WikiError::NoResults(q) if q == "xyzzy"));
    }

    #[tokio::test]
    async fn plain_header() {
        let wiki = FakeWiki::with_article("Matrix (mathematics)", "A matrix is a rectangular array.");
        let out = wiki_fetch(&wiki, "matrix", 0, OutputFormat::Plain).await;
        assert_eq!(out, "=== Matrix (mathematics) ===\n\nA matrix is a rectangular array.");
    }

    #[tokio::test]
    async fn jupyter_header() {
        let wiki = FakeWiki::with_article("Matrix (mathematics)", "A matrix is a rectangular array.");
        let out = wiki_fetch(&wiki, "matrix", 0, OutputFormat::Jupyter).await;
        assert!(out.starts_with("## Matrix (mathematics)\n\n"));
    }

    #[tokio::test]
    async fn sentences_limit_summary() {
        let wiki = FakeWiki::with_article("Gustav I of Sweden", "He was king. He died in 1560. He had ten children.");
        let out = wiki_fetch(&wiki, "Gustav Vasa", 2, OutputFormat::Plain).await;
        assert_eq!(out, "=== Gustav I of Sweden ===\n\nHe was king. He died in 1560.");
    }

    #[tokio::test]
    async fn disambiguation_takes_first_option() {
        let mut wiki = FakeWiki {
            results: vec!["Mercury".to_string()],
            ..Default::default()
        };
        wiki.entries.insert(
            "Mercury".to_string(),
            Entry::Disambiguation(vec!["Mercury (planet)".to_string(), "Mercury (element)".to_string()]),
        );
        wiki.entries.insert(
            "Mercury (planet)".to_string(),
            Entry::Article("Mercury is the closest planet to the Sun.".to_string()),
        );
        wiki.entries.insert(
            "Mercury (element)".to_string(),
            Entry::Article("Mercury is a chemical element.".to_string()),
        );

        let out = wiki_fetch(&wiki, "mercury", 0, OutputFormat::Plain).await;
        assert_eq!(out, "=== Mercury (planet) ===\n\nMercury is the closest planet to the Sun.");
    }

    #[tokio::test]
    async fn empty_disambiguation_is_an_error() {
        let mut wiki = FakeWiki {
            results: vec!["Mercury".to_string()],
            ..Default::default()
        };
        wiki.entries.insert("Mercury".to_string(), Entry::Disambiguation(vec![]));

        let out = wiki_fetch(&wiki, "mercury", 0, OutputFormat::Plain).await;
        assert!(out.starts_with("Error fetching Wikipedia content: \"Mercury\" may refer to"));
    }

    #[tokio::test]
    async fn missing_page_message() {
        let mut wiki = FakeWiki {
            results: vec!["Ghost".to_string()],
            ..Default::default()
        };
        wiki.entries.insert("Ghost".to_string(), Entry::Missing);

        let out = wiki_fetch(&wiki, "ghost page", 0, OutputFormat::Plain).await;
        assert_eq!(out, "Wikipedia page not found for: ghost page");
    }

    #[tokio::test]
    async fn other_failures_become_text() {
        let wiki = FakeWiki {
            search_status: Some(503),
            ..Default::default()
        };
        let out = wiki_fetch(&wiki, "matrix", 0, OutputFormat::Jupyter).await;
        assert_eq!(out, "Error fetching Wikipedia content: HTTP status 503");
    }

    #[tokio::test]
    async fn content_plain_header() {
        let wiki = FakeWiki::with_article("Matrix", "Intro.");
        let out = wiki_content(&wiki, "matrix", OutputFormat::Plain).await;
        let rule = "=".repeat(60);
        assert_eq!(out, format!("{rule}\nMatrix\n{rule}\n\nIntro. History It has one."));
    }

    #[tokio::test]
    async fn content_jupyter_keeps_paragraphs() {
        let wiki = FakeWiki::with_article("Matrix", "Intro.");
        let out = wiki_content(&wiki, "matrix", OutputFormat::Jupyter).await;
        assert_eq!(out, "# Matrix\n\nIntro.\n\nHistory\n\nIt has one.");
    }

    #[tokio::test]
    async fn content_missing_page_is_generic_error() {
        let mut wiki = FakeWiki {
            results: vec!["Ghost".to_string()],
            ..Default::default()
        };
        wiki.entries.insert("Ghost".to_string(), Entry::Missing);

        let out = wiki_content(&wiki, "ghost", OutputFormat::Plain).await;
        assert_eq!(
            out,
            "Error fetching Wikipedia content: Page id \"Ghost\" does not match any pages. Try another id!"
        );
    }

    #[tokio::test]
    async fn real_extract_through_pipeline() {
        let body = std::fs::read_to_string("tests/fixtures/extract.json").unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let extract = json["query"]["pages"][0]["extract"].as_str().unwrap();
        let wiki = FakeWiki::with_article("Singular value decomposition", extract);

        let plain = wiki_fetch(&wiki, "svd", 0, OutputFormat::Plain).await;
        assert!(plain.starts_with("=== Singular value decomposition ===\n\nIn linear algebra"));
        assert!(!plain.contains("displaystyle"));
        assert!(!plain.contains('\u{2060}'));

        let jupyter = wiki_fetch(&wiki, "svd", 0, OutputFormat::Jupyter).await;
        assert!(jupyter.starts_with("## Singular value decomposition\n\n"));
        assert!(jupyter.contains('$'));
        assert!(!jupyter.contains('\u{2060}'));
    }
}
