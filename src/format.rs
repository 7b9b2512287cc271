//! Flattens comment HTML into single-line notification text

use regex::Regex;

/// Strip HTML markup from comment text for use as a notification body.
///
/// Tables are replaced with a `(table)` marker, block closers become line
/// breaks, every other tag is dropped, and the two entities the tracker
/// actually emits (`&nbsp;`, `&amp;`) are decoded.
pub fn strip_html(html: &str) -> String {
    let text = html.replace("\r\n", "\n").replace('\n', " ");

    let text = Regex::new(r"\s{2,}").unwrap().replace_all(&text, " ");
    let text = Regex::new(r"<table.*?</table>")
        .unwrap()
        .replace_all(&text, "(table)\n");
    let text = Regex::new(r"</(?:div|p)>").unwrap().replace_all(&text, "\n");
    let text = Regex::new(r"(?s)<.*?>").unwrap().replace_all(&text, "");

    text.replace("&nbsp;", " ").replace("&amp;", "&")
}
