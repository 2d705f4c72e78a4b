pub mod latex;
pub mod plain;
pub mod stacked;

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::OutputFormat;

const WORD_JOINER: char = '\u{2060}';
/// Longest bare run (in chars) folded into a neighbouring displaystyle block.
const MAX_DUPLICATE_CHARS: usize = 20;

static DUPLICATE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S+)\s+\{\\displaystyle\s+(\S+)\s*\}").unwrap());
static DUPLICATE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9×÷±≤≥≠≈∈∉⊂⊃∪∩∞Σσαβγδλμπθφω\s\*\^]+)\s+\{\\displaystyle\s+[^}]*\}").unwrap()
});
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Clean raw extract text for display in the given format.
///
/// collapse stacked math → strip word joiners → de-duplicate → convert
/// (MathJax for notebooks, Unicode for terminals) → tidy blank lines.
pub fn clean_wikipedia_text(text: &str, format: OutputFormat) -> String {
    let text = stacked::collapse_stacked_math(text);
    let text = text.replace(WORD_JOINER, "");
    let text = dedupe_math(&text);

    let text = match format {
        OutputFormat::Jupyter => {
            let text = latex::convert_displaystyle_latex(&text);
            let text = latex::convert_inline_latex_fragments(&text);
            latex::unicode_to_latex(&text)
        }
        OutputFormat::Plain => plain::normalize_plain_math(&text),
    };

    BLANK_LINES_RE.replace_all(&text, "\n\n").trim().to_string()
}

/// Drop the bare copy of an expression that Wikipedia also emits as
/// `{\displaystyle ...}` right after it.
///
/// `M {\displaystyle M}` becomes `{\displaystyle M}`. A short run of math-ish
/// characters in front of any displaystyle block replaces the block's
/// content; runs longer than `MAX_DUPLICATE_CHARS` are left alone.
pub fn dedupe_math(text: &str) -> String {
    let text = DUPLICATE_TOKEN_RE.replace_all(text, |caps: &Captures| {
        let (token, latex) = (&caps[1], &caps[2]);
        match token.strip_suffix(latex) {
            Some(prefix) => format!("{prefix}{{\\displaystyle {latex}}}"),
            None => caps[0].to_string(),
        }
    });

    DUPLICATE_RUN_RE
        .replace_all(&text, |caps: &Captures| {
            let run = caps[1].trim();
            if run.chars().count() <= MAX_DUPLICATE_CHARS {
                format!("{{\\displaystyle {run}}}")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

// ── Tests ──
