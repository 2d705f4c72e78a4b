use std::sync::LazyLock;

use regex::Regex;

static DISPLAYSTYLE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\\displaystyle[^}]*\}").unwrap());
// Applied one after another; a wrapper nested in another is unwrapped by the later pass.
static WRAPPER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["mathbf", "mathit", "mathrm", "text"]
        .iter()
        .map(|name| Regex::new(&format!(r"\\{name}\s*\{{([^}}]*)\}}")).unwrap())
        .collect()
});
static STAR_SUPERSCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\^\{?\*\}?").unwrap());
static SUPERSCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\^\{([^}]*)\}").unwrap());
static SUBSCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_\{([^}]*)\}").unwrap());
static TRAILING_COMMA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m),\s*$").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// LaTeX commands rendered as Unicode in terminal output.
///
/// Prefix substitution with no word boundary, so `\infty` must come before `\in`.
const LATEX_TO_UNICODE: &[(&str, &str)] = &[
    (r"\times", "×"),
    (r"\cdot", "·"),
    (r"\Sigma", "Σ"),
    (r"\sigma", "σ"),
    (r"\alpha", "α"),
    (r"\beta", "β"),
    (r"\gamma", "γ"),
    (r"\delta", "δ"),
    (r"\lambda", "λ"),
    (r"\mu", "μ"),
    (r"\pi", "π"),
    (r"\theta", "θ"),
    (r"\phi", "φ"),
    (r"\omega", "ω"),
    (r"\infty", "∞"),
    (r"\leq", "≤"),
    (r"\geq", "≥"),
    (r"\neq", "≠"),
    (r"\approx", "≈"),
    (r"\in", "∈"),
    (r"\subset", "⊂"),
    (r"\supset", "⊃"),
    (r"\pm", "±"),
];

/// Reduce Wikipedia's math markup to readable Unicode text.
///
/// `{\displaystyle ...}` blocks are dropped outright: the extract already
/// carries a Unicode rendering of the same expression next to them.
/// All whitespace, newlines included, collapses to single spaces.
pub fn normalize_plain_math(text: &str) -> String {
    let text = DISPLAYSTYLE_BLOCK_RE.replace_all(text, "");
    let mut text = text.into_owned();
    for re in WRAPPER_RES.iter() {
        text = re.replace_all(&text, "${1}").into_owned();
    }
    for &(command, glyph) in LATEX_TO_UNICODE {
        if text.contains(command) {
            text = text.replace(command, glyph);
        }
    }

    let text = STAR_SUPERSCRIPT_RE.replace_all(&text, "*");
    let text = SUPERSCRIPT_RE.replace_all(&text, "^${1}");
    let text = SUBSCRIPT_RE.replace_all(&text, "_${1}");
    let text = text.replace('}', "");
    let text = TRAILING_COMMA_RE.replace_all(&text, "");
    WHITESPACE_RE.replace_all(&text, " ").into_owned()
}

// ── Tests ──
