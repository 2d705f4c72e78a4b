use std::io::{self, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::OutputFormat;
use crate::wiki::fetch::wiki_fetch;
use crate::wiki::Encyclopedia;

/// Fetch a summary and show it: a markdown display block for notebooks,
/// plain text otherwise.
pub async fn wiki_math<E: Encyclopedia, W: Write>(
    wiki: &E,
    query: &str,
    sentences: usize,
    format: OutputFormat,
    out: &mut W,
) -> io::Result<()> {
    let spinner = fetch_spinner(query);
    let content = wiki_fetch(wiki, query, sentences, format).await;
    spinner.finish_and_clear();
    show(&content, format, out)
}

pub fn show<W: Write>(content: &str, format: OutputFormat, out: &mut W) -> io::Result<()> {
    match format {
        OutputFormat::Jupyter => display_markdown(content, out),
        OutputFormat::Plain => writeln!(out, "{content}"),
    }
}

/// Emit `markdown` as an evcxr rich-output block, rendered by the notebook.
pub fn display_markdown<W: Write>(markdown: &str, out: &mut W) -> io::Result<()> {
    writeln!(out, "EVCXR_BEGIN_CONTENT text/markdown")?;
    writeln!(out, "{markdown}")?;
    writeln!(out, "EVCXR_END_CONTENT")?;
    out.flush()
}

/// Spinner on stderr while a request is in flight. Hidden when stderr is not a terminal.
pub fn fetch_spinner(query: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching \"{query}\""));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

// ── Tests ──
