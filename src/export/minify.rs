//! Body minification for export.

use std::sync::LazyLock;

use regex::Regex;

struct HtmlPatterns {
    strip: Vec<Regex>,
    whitespace: Regex,
    between_tags: Regex,
}

static HTML: LazyLock<HtmlPatterns> = LazyLock::new(|| {
    let strip = [
        r"(?s)<!--.*?-->",
        r"(?is)<style[^>]*>.*?</style>",
        r"(?is)<script[^>]*>.*?</script>",
        r#"(?i)<link[^>]*rel\s*=\s*["']stylesheet["'][^>]*/?>"#,
        r#"(?i)\s*style\s*=\s*"[^"]*""#,
        r#"(?i)\s*style\s*=\s*'[^']*'"#,
        r#"(?i)\s*class\s*=\s*"[^"]*""#,
        r#"(?i)\s*class\s*=\s*'[^']*'"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static html pattern"))
    .collect();
    HtmlPatterns {
        strip,
        whitespace: Regex::new(r"\s+").expect("static whitespace pattern"),
        between_tags: Regex::new(r">\s+<").expect("static tag gap pattern"),
    }
});

/// Strip comments, style/script blocks, stylesheet links and presentational
/// attributes, then collapse whitespace.
pub fn minify_html(html: &str) -> String {
    let patterns = &*HTML;
    let mut out = html.to_string();
    for re in &patterns.strip {
        out = re.replace_all(&out, "").into_owned();
    }
    out = patterns.whitespace.replace_all(&out, " ").into_owned();
    out = patterns.between_tags.replace_all(&out, "><").into_owned();
    out.trim().to_string()
}

/// Compact re-serialization keeping key order. Text that is not JSON is
/// returned unchanged.
pub fn minify_json(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}

/// Looser than the `html` tag: any MIME mentioning html is minified.
pub fn is_html_body(mime: &str) -> bool {
    let m = mime.to_lowercase();
    m.contains("html") || m.contains("xhtml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_is_reduced_to_structure() {
        let html = r#"<!DOCTYPE html>
<html>
  <head>
    <!-- build 42 -->
    <style>body { color: red }</style>
    <link rel="stylesheet" href="/app.css">
    <SCRIPT type="text/javascript">var x = 1;</SCRIPT>
  </head>
  <body class="dark">
    <div style='margin:0' id="main">Hello   <b>world</b></div>
  </body>
</html>
"#;
        assert_eq!(
            minify_html(html),
            r#"<!DOCTYPE html><html><head></head><body><div id="main">Hello <b>world</b></div></body></html>"#
        );
    }

    #[test]
    fn json_keeps_key_order() {
        assert_eq!(
            minify_json("{\n  \"b\": 1,\n  \"a\": [1, 2, {\"z\": null}]\n}"),
            r#"{"b":1,"a":[1,2,{"z":null}]}"#
        );
        assert_eq!(minify_json("{not json"), "{not json");
    }

    #[test]
    fn mime_checks() {
        assert!(is_html_body("text/html; charset=utf-8"));
        assert!(is_html_body("application/xhtml+xml"));
        assert!(is_html_body("application/vnd.html-fragment"));
        assert!(!is_html_body("text/plain"));
    }
}
