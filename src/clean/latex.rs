use std::sync::LazyLock;

use regex::{Captures, Regex};

// `{\displaystyle ...}` with at most one level of nested braces inside.
static DISPLAYSTYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\\displaystyle\s+([^{}]*(?:\{[^{}]*\}[^{}]*)*)\}").unwrap()
});
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static MATHBF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\mathbf\{[^}]+\}").unwrap());
static MATHIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\mathit\{[^}]+\}").unwrap());
static MATHRM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\mathrm\{[^}]+\}").unwrap());
static COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[A-Za-z]+(?:\{[^}]*\})?").unwrap());

static DOUBLE_DOLLAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\$([^$]+)\$\$").unwrap());
static EMPTY_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\s*\$").unwrap());

/// Unicode glyphs rewritten to LaTeX in notebook output. Order matters.
const UNICODE_TO_LATEX: &[(char, &str)] = &[
    ('×', r" \times "),
    ('÷', r" \div "),
    ('±', r" \pm "),
    ('≤', r" \leq "),
    ('≥', r" \geq "),
    ('≠', r" \neq "),
    ('≈', r" \approx "),
    ('∈', r" \in "),
    ('∉', r" \notin "),
    ('⊂', r" \subset "),
    ('⊃', r" \supset "),
    ('∪', r" \cup "),
    ('∩', r" \cap "),
    ('∞', r"\infty"),
    ('∑', r"\sum"),
    ('∏', r"\prod"),
    ('∫', r"\int"),
    ('√', r"\sqrt"),
    ('∂', r"\partial"),
    ('∇', r"\nabla"),
];

/// Rewrite `{\displaystyle ...}` fragments as `$...$` MathJax.
///
/// `{\displaystyle m\times n}` becomes `$m \times n$`. Fragments nested
/// deeper than one brace level are left as they are.
pub fn convert_displaystyle_latex(text: &str) -> String {
    DISPLAYSTYLE_RE
        .replace_all(text, |caps: &Captures| {
            let content = caps[1]
                .trim()
                .replace(r"\times", r" \times ")
                .replace(r"\cdot", r" \cdot ");
            let content = WHITESPACE_RE.replace_all(&content, " ");
            format!("${}$", content.trim())
        })
        .into_owned()
}

/// Wrap bare LaTeX commands (`\mathbf{M}`, `\alpha`, ...) in `$...$`.
///
/// A command touching a `$` on either side counts as already delimited.
/// Heuristic only: nothing tracks whether a match sits inside an existing
/// `$...$` span.
pub fn convert_inline_latex_fragments(text: &str) -> String {
    let text = wrap_unguarded(text, &MATHBF_RE, false);
    let text = wrap_unguarded(&text, &MATHIT_RE, false);
    let text = wrap_unguarded(&text, &MATHRM_RE, false);
    let text = wrap_unguarded(&text, &COMMAND_RE, true);

    let text = DOUBLE_DOLLAR_RE.replace_all(&text, |caps: &Captures| format!("${}$", &caps[1]));
    EMPTY_PAIR_RE.replace_all(&text, " ").into_owned()
}

/// Substitute LaTeX for the Unicode math glyphs in `UNICODE_TO_LATEX`.
///
/// Applied to the whole string, prose included.
pub fn unicode_to_latex(text: &str) -> String {
    UNICODE_TO_LATEX
        .iter()
        .fold(text.to_string(), |acc, (glyph, latex)| {
            if acc.contains(*glyph) {
                acc.replace(*glyph, latex)
            } else {
                acc
            }
        })
}

/// Wrap every match of `re` in `$...$` unless it is preceded or followed by `$`.
///
/// With `shrink`, a `COMMAND_RE` match followed by `$` is retried shorter
/// (brace group dropped, then trailing letters) the way a backtracking
/// engine honoring `(?!\$)` would.
fn wrap_unguarded(text: &str, re: &Regex, shrink: bool) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut copied = 0;
    let mut pos = 0;

    while let Some(m) = re.find_at(text, pos) {
        let start = m.start();
        // Every pattern starts with an ASCII backslash, so start + 1 is a char boundary.
        if text[..start].ends_with('$') {
            pos = start + 1;
            continue;
        }

        let end = if shrink {
            longest_unguarded_end(text, start, m.end())
        } else {
            Some(m.end()).filter(|&e| !text[e..].starts_with('$'))
        };

        match end {
            Some(end) => {
                out.push_str(&text[copied..start]);
                out.push('$');
                out.push_str(&text[start..end]);
                out.push('$');
                copied = end;
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    out.push_str(&text[copied..]);
    out
}

fn longest_unguarded_end(text: &str, start: usize, end: usize) -> Option<usize> {
    let letters_end = start
        + 1
        + text[start + 1..]
            .bytes()
            .take_while(u8::is_ascii_alphabetic)
            .count();

    std::iter::once(end)
        .filter(|&e| e > letters_end)
        .chain((start + 2..=letters_end).rev())
        .find(|&e| !text[e..].starts_with('$'))
}

// ── Tests ──
