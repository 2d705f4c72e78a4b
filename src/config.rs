use std::time::Duration;

use clap::{Args, ValueEnum};

const MAX_RETRIES: i64 = 10;
const DEFAULT_USER_AGENT: &str = concat!("wikimath/", env!("CARGO_PKG_VERSION"), " (command-line article reader)");

/// Target syntax for cleaned article text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// MathJax `$...$` markup inside a markdown display block.
    Jupyter,
    /// Unicode math for a terminal.
    #[default]
    Plain,
}

/// Global options, each with an environment fallback.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Output syntax
    #[arg(long, global = true, value_enum, env = "WIKIMATH_FORMAT", default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// Wikipedia language edition (e.g. "en", "de")
    #[arg(long, global = true, env = "WIKIMATH_LANG", default_value = "en")]
    pub lang: String,

    /// Full api.php endpoint; overrides --lang
    #[arg(long, global = true, env = "WIKIMATH_API_URL")]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "WIKIMATH_TIMEOUT", default_value = "30")]
    pub timeout: u64,

    /// Retries on HTTP 429 / 5xx responses (at most 10)
    #[arg(
        long,
        global = true,
        env = "WIKIMATH_RETRIES",
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(0..=MAX_RETRIES)
    )]
    pub retries: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub format: OutputFormat,
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Config {
    pub fn from_args(args: &ConfigArgs) -> Self {
        let api_url = args
            .api_url
            .clone()
            .unwrap_or_else(|| api_url_for(&args.lang));
        Config {
            format: args.format,
            api_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(args.timeout),
            max_retries: args.retries,
        }
    }
}

fn api_url_for(lang: &str) -> String {
    format!("https://{}.wikipedia.org/w/api.php", lang.trim().to_lowercase())
}

// ── Tests ──
