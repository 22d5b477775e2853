//! Whitespace normalization for model input.

/// Normalize a request string before tokenization.
///
/// Every ASCII space becomes an ideographic space (U+3000) and line breaks
/// (`\n`, `\r`) are removed outright. All other characters pass through
/// unchanged. The rewrite only touches ASCII, so it is equivalent to the
/// byte-wise form on any valid UTF-8 input.
///
/// Pure and infallible; empty input yields empty output.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' ' => out.push('\u{3000}'),
            '\n' | '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
