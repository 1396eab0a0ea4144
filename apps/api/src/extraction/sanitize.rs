//! Response sanitization: models routinely wrap their JSON payload in
//! markdown code fences despite instructions not to. Stripping happens before
//! parsing and must never touch the payload interior.

/// Strips leading ```` ```json ````/```` ``` ```` and trailing ```` ``` ````
/// markers and trims surrounding whitespace, repeating until the text is
/// stable so the result is a fixed point.
///
/// Idempotent: sanitizing already-sanitized text is a no-op. A JSON payload
/// cannot itself begin with a fence marker, so the interior is never altered.
pub fn strip_code_fences(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let next = strip_once(current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or_else(|| stripped.trim())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or_else(|| stripped.trim())
    } else {
        text
    }
}
