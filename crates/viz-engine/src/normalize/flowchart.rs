//! Flowchart label quoting
//!
//! Node labels are rewritten to exactly one level of double quotes so that
//! punctuation inside them cannot break the renderer: `A[Save (draft)]`
//! becomes `A["Save (draft)"]` and `A[""Done""]` becomes `A["Done"]`.

/// Node shapes as (opening delimiter, accepted closing delimiters), longest
/// opening delimiter first so `(((` wins over `((` and `(`. Parallelogram
/// and trapezoid shapes may close with either slant.
const SHAPES: [(&str, &[&str]); 11] = [
    ("(((", &[")))"]),
    ("((", &["))"]),
    ("([", &["])"]),
    ("[[", &["]]"]),
    ("[(", &[")]"]),
    ("{{", &["}}"]),
    ("[/", &["/]", "\\]"]),
    ("[\\", &["\\]", "/]"]),
    ("[", &["]"]),
    ("(", &[")"]),
    ("{", &["}"]),
];

/// Quote node labels on every line after the header. Idempotent.
pub fn normalize_flowchart_labels(source: &str) -> String {
    let mut seen_header = false;

    source
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            if !seen_header {
                if !trimmed.is_empty() {
                    seen_header = true;
                }
                return line.to_string();
            }
            if trimmed.starts_with("%%") {
                return line.to_string();
            }
            quote_line_labels(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn quote_line_labels(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut rest = line;
    let mut prev: Option<char> = None;

    while let Some(ch) = rest.chars().next() {
        // Edge label text between pipes is copied as written
        if ch == '|' {
            if let Some(end) = rest[1..].find('|') {
                let label_len = end + 2;
                out.push_str(&rest[..label_len]);
                rest = &rest[label_len..];
                prev = Some('|');
                continue;
            }
        }

        if prev.is_some_and(is_ident_char) {
            if let Some((open, label, close, tail)) = match_shape(rest) {
                out.push_str(open);
                out.push_str(&quote_label(label));
                out.push_str(close);
                rest = tail;
                prev = close.chars().last();
                continue;
            }
        }

        out.push(ch);
        rest = &rest[ch.len_utf8()..];
        prev = Some(ch);
    }

    out
}

/// First shape that both opens at the start of `text` and closes on this
/// line, as (open, label, close, remaining text)
fn match_shape(text: &str) -> Option<(&'static str, &str, &'static str, &str)> {
    SHAPES
        .iter()
        .filter(|(open, _)| text.starts_with(open))
        .find_map(|(open, closes)| {
            let body = &text[open.len()..];
            let (end, close) = find_close(body, open, closes)?;
            Some((*open, &body[..end], close, &body[end + close.len()..]))
        })
}

/// Byte offset and text of the closing delimiter, skipping quoted text and
/// nested pairs of the shape's bracket, e.g. the `()` in `A(Call foo())`.
fn find_close(body: &str, open: &str, closes: &[&'static str]) -> Option<(usize, &'static str)> {
    let (inner_open, inner_close) = open.chars().rev().find_map(|ch| match ch {
        '(' => Some(('(', ')')),
        '[' => Some(('[', ']')),
        '{' => Some(('{', '}')),
        _ => None,
    })?;
    let mut depth = 0usize;
    let mut in_quotes = false;

    for (idx, ch) in body.char_indices() {
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if depth == 0 {
            if let Some(close) = closes.iter().find(|close| body[idx..].starts_with(*close)) {
                return Some((idx, *close));
            }
        }
        if ch == inner_open {
            depth += 1;
        } else if ch == inner_close {
            depth = depth.saturating_sub(1);
        }
    }

    None
}

/// Wrap a label in one pair of double quotes. Surrounding quote layers are
/// collapsed; quotes inside the text are kept as written.
fn quote_label(raw: &str) -> String {
    let text = raw.trim().trim_matches('"').trim();
    if text.is_empty() {
        return raw.to_string();
    }
    format!("\"{text}\"")
}
