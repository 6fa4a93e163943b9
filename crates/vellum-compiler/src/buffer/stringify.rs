//! String literal encoding for generated code.

/// Encodes `text` as a double-quoted JavaScript string literal.
///
/// On top of JSON quoting, line and paragraph separators are escaped (they
/// end a line in older engines) and so are `<`, `>` and `/`, which keeps the
/// generated code safe to embed in an HTML `<script>` element.
pub fn js_stringify(text: &str) -> String {
    let json = serde_json::to_string(text).unwrap_or_else(|_| format!("{text:?}"));
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '/' => out.push_str("\\u002F"),
            c => out.push(c),
        }
    }
    out
}
