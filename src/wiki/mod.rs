pub mod client;
pub mod fetch;

use thiserror::Error;

/// A resolved article title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
}

#[derive(Debug, Error)]
pub enum WikiError {
    #[error("no search results for \"{0}\"")]
    NoResults(String),
    #[error("Page id \"{0}\" does not match any pages. Try another id!")]
    PageNotFound(String),
    #[error("\"{title}\" may refer to: {}", .options.join(", "))]
    Disambiguation { title: String, options: Vec<String> },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("API error {code}: {info}")]
    Api { code: String, info: String },
    #[error("unexpected API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The encyclopedia operations the fetch layer needs.
#[allow(async_fn_in_trait)]
pub trait Encyclopedia {
    /// Candidate titles for `query`, best match first.
    async fn search(&self, query: &str) -> Result<Vec<String>, WikiError>;

    /// Resolve `title` to an article, following redirects.
    ///
    /// Disambiguation pages yield `WikiError::Disambiguation` carrying the
    /// titles they link to.
    async fn page(&self, title: &str) -> Result<Page, WikiError>;

    /// Plain-text lead section, cut to `sentences` sentences when non-zero.
    async fn summary(&self, title: &str, sentences: usize) -> Result<String, WikiError>;

    /// Plain-text body of the whole article.
    async fn content(&self, title: &str) -> Result<String, WikiError>;
}
