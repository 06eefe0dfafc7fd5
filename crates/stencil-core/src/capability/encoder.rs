//! Output encoders for the markup families.

/// Escapes text for the output family a template belongs to.
///
/// Used by localization substitution and by the `*_encoded` value setters. A
/// family without an encoder passes text through unchanged.
pub trait Encoder: Send + Sync + std::fmt::Debug {
    /// Escape every special character.
    fn encode(&self, text: &str) -> String;

    /// Escape like [`encode`](Self::encode) but leave well-formed entity
    /// references untouched, so already-encoded text is not encoded twice.
    fn encode_defensive(&self, text: &str) -> String {
        self.encode(text)
    }
}

/// HTML escaping of `& < > " '`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEncoder;

/// XML escaping of `& < > " '` using the predefined XML entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlEncoder;

/// JSON string-content escaping (no surrounding quotes).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for HtmlEncoder {
    fn encode(&self, text: &str) -> String {
        escape_markup(text, "&#39;", false)
    }

    fn encode_defensive(&self, text: &str) -> String {
        escape_markup(text, "&#39;", true)
    }
}

impl Encoder for XmlEncoder {
    fn encode(&self, text: &str) -> String {
        escape_markup(text, "&apos;", false)
    }

    fn encode_defensive(&self, text: &str) -> String {
        escape_markup(text, "&apos;", true)
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{08}' => out.push_str("\\b"),
                '\u{0C}' => out.push_str("\\f"),
                c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        out
    }
}

fn escape_markup(text: &str, apostrophe: &str, keep_entities: bool) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for (i, c) in text.char_indices() {
        match c {
            '&' if keep_entities && entity_len(&text[i..]).is_some() => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str(apostrophe),
            c => out.push(c),
        }
    }
    out
}

/// Length of a well-formed entity reference at the start of `text`
/// (`&name;`, `&#123;` or `&#x7B;`).
fn entity_len(text: &str) -> Option<usize> {
    let body = text.strip_prefix('&')?;
    let end = body.find(';')?;
    let name = &body[..end];
    let valid = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
    } else if let Some(dec) = name.strip_prefix('#') {
        !dec.is_empty() && dec.chars().all(|c| c.is_ascii_digit())
    } else {
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
    };
    valid.then_some(end + 2)
}
