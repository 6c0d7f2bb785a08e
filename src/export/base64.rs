//! Detection and elision of base64 payloads inside body text.

const MIN_LEN: usize = 100;
const SAMPLE_LEN: usize = 1000;
const MIN_SAMPLE: usize = 200;

/// `data:<mime>;base64,` with a non-empty mime.
fn has_data_uri_prefix(text: &str) -> bool {
    let Some(rest) = text.strip_prefix("data:") else {
        return false;
    };
    match rest.find(';') {
        Some(i) if i > 0 => rest[i + 1..].starts_with("base64,"),
        _ => false,
    }
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='
}

/// Heuristic: short text never counts; a `data:<mime>;base64,` prefix always
/// does; otherwise the first 1000 characters (whitespace removed) must hold
/// at least 200 characters with under 5% outside the base64 alphabet.
pub fn is_base64_content(text: &str) -> bool {
    if text.chars().take(MIN_LEN).count() < MIN_LEN {
        return false;
    }
    if has_data_uri_prefix(text) {
        return true;
    }

    let sample: Vec<char> = text
        .chars()
        .take(SAMPLE_LEN)
        .filter(|c| !c.is_whitespace())
        .collect();
    if sample.len() < MIN_SAMPLE {
        return false;
    }
    let residue = sample.iter().filter(|c| !is_base64_char(**c)).count();
    residue * 20 < sample.len()
}

/// `[base64-data: <KB>KB <mime>]`, sized from the encoded length.
pub fn placeholder(text: &str, mime: Option<&str>) -> String {
    let len = text.chars().count() as f64;
    let kb = (len * 3.0 / 4.0 / 1024.0).round() as u64;
    let mime = mime.filter(|m| !m.is_empty()).unwrap_or("unknown");
    format!("[base64-data: {}KB {}]", kb, mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(n: usize) -> String {
        "QUJD".repeat(n / 4 + 1)[..n].to_string()
    }

    #[test]
    fn short_text_is_never_base64() {
        assert!(!is_base64_content(&b64(50)));
        assert!(!is_base64_content(&b64(99)));
        assert!(!is_base64_content("data:image/png;base64,AAAA"));
    }

    #[test]
    fn data_uri_prefix_always_counts() {
        let text = format!("data:image/png;base64,{}", "!".repeat(100));
        assert!(is_base64_content(&text));
        let no_mime = format!("data:;base64,{}", "!".repeat(100));
        assert!(!is_base64_content(&no_mime));
    }

    #[test]
    fn sample_rules() {
        // Long enough to pass the length gate, too short a sample.
        assert!(!is_base64_content(&b64(150)));
        assert!(is_base64_content(&b64(200)));
        assert!(is_base64_content(&b64(4000)));

        let wrapped: String = b64(400)
            .as_bytes()
            .chunks(76)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(is_base64_content(&wrapped));

        let json = r#"{"id": 1, "name": "widget"},"#.repeat(20);
        assert!(!is_base64_content(&json));
    }

    #[test]
    fn placeholder_format() {
        assert_eq!(placeholder(&b64(4096), Some("image/png")), "[base64-data: 3KB image/png]");
        assert_eq!(placeholder(&b64(100), None), "[base64-data: 0KB unknown]");
        assert_eq!(placeholder(&b64(100), Some("")), "[base64-data: 0KB unknown]");
    }
}
