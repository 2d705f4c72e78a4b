use std::sync::LazyLock;

use regex::Regex;

static MATH_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9×÷±∓≤≥≠≈∈∉⊂⊃∪∩∧∨¬→←↔∀∃∂∇∫∑∏√∞αβγδεζηθικλμνξπρστυφχψωΓΔΘΛΞΠΣΦΨΩ=+\-*/^().,]+$").unwrap()
});

/// Longest trimmed line (in chars) still treated as a stacked token.
const MAX_TOKEN_CHARS: usize = 3;
/// Shortest run of tokens that gets collapsed.
const MIN_RUN: usize = 3;

/// Collapse vertically stacked math tokens into one inline expression.
///
/// Wikipedia's plain-text extracts sometimes break `m × n` into
///
/// ```text
/// m
/// ×
/// n
/// ```
///
/// Runs of `MIN_RUN` or more such lines are joined with single spaces.
/// Everything else is copied through untouched.
pub fn collapse_stacked_math(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        if is_math_token(lines[i].trim()) {
            let run_end = lines[i + 1..]
                .iter()
                .position(|l| !is_math_token(l.trim()))
                .map(|offset| i + 1 + offset)
                .unwrap_or(lines.len());

            if run_end - i >= MIN_RUN {
                let joined = lines[i..run_end]
                    .iter()
                    .map(|l| l.trim())
                    .collect::<Vec<_>>()
                    .join(" ");
                out.push(joined);
                i = run_end;
                continue;
            }
        }

        out.push(lines[i].to_string());
        i += 1;
    }

    out.join("\n")
}

fn is_math_token(line: &str) -> bool {
    line.chars().count() <= MAX_TOKEN_CHARS && MATH_TOKEN_RE.is_match(line)
}

// ── Tests ──
