//! Small helpers shared by the per-area renderers. Graph payloads are
//! plucked field by field; anything missing degrades to a placeholder
//! instead of failing the render.

use serde_json::Value;

/// Graph collection responses carry their items under `value`.
pub(crate) fn items(response: &Value) -> &[Value] {
    response
        .get("value")
        .and_then(|v| v.as_array())
        .map(|a| a.as_slice())
        .unwrap_or(&[])
}

pub(crate) fn str_at<'a>(v: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = v;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str()
}

/// Flatten an HTML fragment (Teams message bodies) into one line of plain
/// text: tags dropped, entities decoded, whitespace collapsed.
pub(crate) fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    let decoded = html_escape::decode_html_entities(&out);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn str_at_walks_nested_objects() {
        let v = json!({"from": {"emailAddress": {"address": "ada@contoso.com"}}});
        assert_eq!(
            str_at(&v, &["from", "emailAddress", "address"]),
            Some("ada@contoso.com")
        );
        assert_eq!(str_at(&v, &["from", "name"]), None);
    }

    #[test]
    fn plain_text_strips_tags_and_decodes_entities() {
        assert_eq!(
            plain_text("<p>Hello&nbsp;<b>world</b> &amp; team</p>"),
            "Hello world & team"
        );
    }

    #[test]
    fn truncate_keeps_short_strings_intact() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("0123456789abc", 10), "0123456789…");
    }
}
