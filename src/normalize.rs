//! Cleans raw model output down to the bare translated text.
//!
//! The prompt asks for the translation wrapped in `❮` / `❯`. Models do not always
//! comply, so the fallbacks below strip the usual framing instead.

/// Opening boundary sentinel.
pub const OPEN_SENTINEL: char = '❮';

/// Closing boundary sentinel.
pub const CLOSE_SENTINEL: char = '❯';

/// Lead-ins models put before the translation, lowercase.
const PREFIX_MARKERS: [&str; 3] = ["translation:", "translated text:", "here is the translation:"];

/// Extracts the translated text from a raw model response.
///
/// 1. Text strictly between the first `❮` and the first `❯` after it, unmodified.
/// 2. Otherwise the trimmed remainder after the last prefix marker, unwrapped as in 3.
/// 3. Otherwise the text with `string("…")` framing, escaped quotes, stray
///    sentinels and one layer of surrounding quotes removed.
///
/// Whitespace inside the translation is never touched.
///
/// Applying it twice gives the same text, except when the sentinel pair itself
/// contains a prefix marker: `❮Translation: Hola❯` gives `Translation: Hola`,
/// which a second pass reduces to `Hola`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    if let Some(inner) = between_sentinels(raw) {
        return inner.to_string();
    }
    if let Some(rest) = after_prefix_marker(raw) {
        return unwrap_framing(rest.trim());
    }
    unwrap_framing(raw)
}

/// `❮` と `❯` に挟まれた部分
fn between_sentinels(raw: &str) -> Option<&str> {
    let start = raw.find(OPEN_SENTINEL)? + OPEN_SENTINEL.len_utf8();
    let rest = raw.get(start..)?;
    let end = rest.find(CLOSE_SENTINEL)?;
    rest.get(..end)
}

/// 大文字小文字を無視して、最後に現れたマーカーの後ろを返す
fn after_prefix_marker(raw: &str) -> Option<&str> {
    // ASCII のみ小文字化するのでバイト位置は変わらない
    let lowered = raw.to_ascii_lowercase();
    let end = PREFIX_MARKERS
        .iter()
        .filter_map(|marker| lowered.rfind(marker).map(|start| start + marker.len()))
        .max()?;
    raw.get(end..)
}

/// Strips `string("…")`, escapes, stray sentinels and quotes.
fn unwrap_framing(text: &str) -> String {
    let inner = text
        .strip_prefix("string(\"")
        .and_then(|rest| rest.strip_suffix("\")"))
        .filter(|inner| !inner.is_empty())
        .unwrap_or(text);

    let unescaped = inner.replace("\\'", "'").replace("\\\"", "\"");
    let stripped = unescaped.trim_matches(|c| c == OPEN_SENTINEL || c == CLOSE_SENTINEL);

    strip_quotes(stripped).to_string()
}

/// Removes one layer of matching `"…"` or `“…”`.
fn strip_quotes(text: &str) -> &str {
    [('"', '"'), ('“', '”')]
        .iter()
        .find_map(|&(open, close)| text.strip_prefix(open)?.strip_suffix(close))
        .unwrap_or(text)
}
