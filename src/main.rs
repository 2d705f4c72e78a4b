mod clean;
mod config;
mod render;
mod wiki;

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use config::{Config, ConfigArgs};
use wiki::client::WikipediaClient;
use wiki::fetch;

const DEMO_QUERY: &str = "When did Gustav Vasa die";
const DEMO_SENTENCES: usize = 5;

#[derive(Parser)]
#[command(
    name = "wikimath",
    about = "Fetch Wikipedia articles with readable math (MathJax or Unicode)"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a summary and display it (markdown block for notebooks, text otherwise)
    Math {
        query: String,
        /// Sentences of summary to keep (default: whole lead section)
        #[arg(short = 'n', long, default_value = "0")]
        sentences: usize,
    },
    /// Print the formatted summary string
    Fetch {
        query: String,
        /// Sentences of summary to keep (default: whole lead section)
        #[arg(short = 'n', long, default_value = "0")]
        sentences: usize,
    },
    /// Print the full formatted article
    Content { query: String },
    /// Clean extract text from a file (or stdin) without fetching anything
    Clean { path: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_args(&cli.config);
    let format = config.format;
    let mut out = io::stdout().lock();

    match cli.command {
        None => {
            writeln!(out, "Fetching {} from Wikipedia...\n", DEMO_QUERY)?;
            let wiki = WikipediaClient::new(&config)?;
            render::wiki_math(&wiki, DEMO_QUERY, DEMO_SENTENCES, format, &mut out).await?;
        }
        Some(Commands::Math { query, sentences }) => {
            let wiki = WikipediaClient::new(&config)?;
            render::wiki_math(&wiki, &query, sentences, format, &mut out).await?;
        }
        Some(Commands::Fetch { query, sentences }) => {
            let wiki = WikipediaClient::new(&config)?;
            let spinner = render::fetch_spinner(&query);
            let text = fetch::wiki_fetch(&wiki, &query, sentences, format).await;
            spinner.finish_and_clear();
            writeln!(out, "{}", text)?;
        }
        Some(Commands::Content { query }) => {
            let wiki = WikipediaClient::new(&config)?;
            let spinner = render::fetch_spinner(&query);
            let text = fetch::wiki_content(&wiki, &query, format).await;
            spinner.finish_and_clear();
            writeln!(out, "{}", text)?;
        }
        Some(Commands::Clean { path }) => {
            let raw = match path {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };
            writeln!(out, "{}", clean::clean_wikipedia_text(&raw, format))?;
        }
    }

    Ok(())
}
