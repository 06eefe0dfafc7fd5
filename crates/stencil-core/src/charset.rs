//! Output charsets supported by the content writers.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::TemplateError;

/// Charset used when writing content to a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl Charset {
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
        }
    }

    /// Encode `text`, failing on the first character the charset cannot represent.
    pub fn encode<'a>(self, text: &'a str) -> Result<Cow<'a, [u8]>, TemplateError> {
        let limit = match self {
            Charset::Utf8 => return Ok(Cow::Borrowed(text.as_bytes())),
            Charset::Latin1 => 0xFF,
            Charset::Ascii => 0x7F,
        };
        if text.is_ascii() {
            return Ok(Cow::Borrowed(text.as_bytes()));
        }

        let mut bytes = Vec::with_capacity(text.len());
        for character in text.chars() {
            let code = character as u32;
            if code > limit {
                return Err(TemplateError::Unmappable {
                    charset: self.name().to_string(),
                    character,
                });
            }
            bytes.push(code as u8);
        }
        Ok(Cow::Owned(bytes))
    }
}

impl FromStr for Charset {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(Charset::Utf8),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" => Ok(Charset::Latin1),
            "US-ASCII" | "ASCII" => Ok(Charset::Ascii),
            _ => Err(TemplateError::UnsupportedCharset(s.to_string())),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("utf-8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("iso-8859-1".parse::<Charset>().unwrap(), Charset::Latin1);
        assert_eq!("ASCII".parse::<Charset>().unwrap(), Charset::Ascii);
        assert!(matches!(
            "EBCDIC".parse::<Charset>(),
            Err(TemplateError::UnsupportedCharset(_))
        ));
    }

    #[test]
    fn test_latin1_maps_high_characters() {
        let bytes = Charset::Latin1.encode("café").unwrap();
        assert_eq!(bytes.as_ref(), &[b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn test_ascii_rejects_non_ascii() {
        let err = Charset::Ascii.encode("naïve").unwrap_err();
        assert!(matches!(err, TemplateError::Unmappable { character: 'ï', .. }));
    }

    #[test]
    fn test_utf8_borrows() {
        assert!(matches!(Charset::Utf8.encode("€"), Ok(Cow::Borrowed(_))));
    }
}
