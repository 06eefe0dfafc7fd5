//! Tokenizer for the `{{...}}` tag syntax.
//!
//! A `{{` that does not start a recognised tag is plain text. Comments are
//! dropped here and never reach the parser.

use std::sync::Arc;

use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Text(String),
    /// `{{v NAME/}}` when `short`, else the opening `{{v NAME}}` of a default.
    Value { name: String, short: bool },
    ValueEnd,
    Block { name: String },
    BlockEnd,
    BlockValue { name: String },
    BlockValueEnd,
    Include { name: String },
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Source text of the tag, used as fallback output.
    pub raw: String,
    /// Template the token was read from.
    pub origin: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}

enum Tag {
    Token(TokenKind),
    Comment,
}

const COMMENT_END: &str = "{{/c}}";

pub(crate) fn tokenize(origin: &str, source: &str) -> Result<Vec<Token>, CompileError> {
    Lexer::new(origin, source).run()
}

struct Lexer<'a> {
    origin: Arc<str>,
    source: &'a str,
    line_starts: Vec<usize>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(origin: &str, source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            origin: Arc::from(origin),
            source,
            line_starts,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, CompileError> {
        let mut pos = 0;
        let mut text_start = 0;

        while let Some(found) = self.source[pos..].find("{{") {
            let start = pos + found;
            let Some((tag, end)) = self.tag_at(start)? else {
                pos = start + 2;
                continue;
            };
            self.push_text(text_start, start);

            match tag {
                Tag::Comment => {
                    let close = self.source[end..]
                        .find(COMMENT_END)
                        .ok_or_else(|| self.error(start, "unterminated comment"))?;
                    pos = end + close + COMMENT_END.len();
                }
                Tag::Token(kind) => {
                    let (line, column) = self.position(start);
                    self.tokens.push(Token {
                        kind,
                        raw: self.source[start..end].to_string(),
                        origin: Arc::clone(&self.origin),
                        line,
                        column,
                    });
                    pos = end;
                }
            }
            text_start = pos;
        }

        self.push_text(text_start, self.source.len());
        Ok(self.tokens)
    }

    fn push_text(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let (line, column) = self.position(start);
        let text = &self.source[start..end];
        self.tokens.push(Token {
            kind: TokenKind::Text(text.to_string()),
            raw: text.to_string(),
            origin: Arc::clone(&self.origin),
            line,
            column,
        });
    }

    /// Recognise a tag starting at `start` (which points at `{{`), returning
    /// the tag and the offset just past it.
    fn tag_at(&self, start: usize) -> Result<Option<(Tag, usize)>, CompileError> {
        let rest = &self.source[start + 2..];
        let closers = [
            ("/bv}}", TokenKind::BlockValueEnd),
            ("/b}}", TokenKind::BlockEnd),
            ("/v}}", TokenKind::ValueEnd),
        ];
        for (literal, kind) in closers {
            if rest.starts_with(literal) {
                return Ok(Some((Tag::Token(kind), start + 2 + literal.len())));
            }
        }
        if rest.starts_with("/c}}") {
            return Err(self.error(start, "closing comment tag without an opening {{c}}"));
        }
        if rest.starts_with("c}}") {
            return Ok(Some((Tag::Comment, start + 5)));
        }

        for keyword in ["bv", "b", "v", "i"] {
            let Some(after) = rest.strip_prefix(keyword) else {
                continue;
            };
            if !after.starts_with(char::is_whitespace) {
                continue;
            }
            let name_start = start + 2 + keyword.len();
            let (name, short, end) = self.named_tag(start, name_start)?;
            let kind = match keyword {
                "bv" if !short => TokenKind::BlockValue { name },
                "b" if !short => TokenKind::Block { name },
                "v" => TokenKind::Value { name, short },
                "i" if short => TokenKind::Include { name },
                "i" => return Err(self.error(start, "include tag must be self-closing")),
                _ => return Err(self.error(start, format!("block tag '{keyword}' cannot be self-closing"))),
            };
            return Ok(Some((Tag::Token(kind), end)));
        }
        Ok(None)
    }

    /// Parse ` NAME}}` or ` NAME/}}` starting at `offset`.
    fn named_tag(&self, tag_start: usize, offset: usize) -> Result<(String, bool, usize), CompileError> {
        let mut pos = skip_whitespace(self.source, offset);
        let rest = &self.source[pos..];

        let name = match rest.chars().next() {
            Some(quote @ ('\'' | '"')) => {
                let close = rest[1..]
                    .find(quote)
                    .ok_or_else(|| self.error(tag_start, "unterminated quoted name"))?;
                pos += close + 2;
                &rest[1..close + 1]
            }
            _ => {
                let len = rest
                    .find(|c: char| c.is_whitespace() || "/{}'\"".contains(c))
                    .unwrap_or(rest.len());
                pos += len;
                &rest[..len]
            }
        };
        if name.is_empty() {
            return Err(self.error(tag_start, "tag name must not be empty"));
        }

        pos = skip_whitespace(self.source, pos);
        let rest = &self.source[pos..];
        if rest.starts_with("/}}") {
            Ok((name.to_string(), true, pos + 3))
        } else if rest.starts_with("}}") {
            Ok((name.to_string(), false, pos + 2))
        } else {
            Err(self.error(tag_start, "unterminated tag"))
        }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&s| s <= offset);
        let line_start = self.line_starts[line - 1];
        let column = self.source[line_start..offset].chars().count() + 1;
        (line, column)
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> CompileError {
        CompileError::syntax(&self.origin, self.position(offset), message)
    }
}

fn skip_whitespace(source: &str, offset: usize) -> usize {
    let rest = &source[offset..];
    offset + (rest.len() - rest.trim_start().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize("t", source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_text_and_values() {
        assert_eq!(
            kinds("Hi {{v name/}}!"),
            vec![
                TokenKind::Text("Hi ".into()),
                TokenKind::Value {
                    name: "name".into(),
                    short: true
                },
                TokenKind::Text("!".into()),
            ]
        );
    }

    #[test]
    fn test_quoted_names_and_defaults() {
        assert_eq!(
            kinds("{{v 'a b'}}x{{/v}}"),
            vec![
                TokenKind::Value {
                    name: "a b".into(),
                    short: false
                },
                TokenKind::Text("x".into()),
                TokenKind::ValueEnd,
            ]
        );
    }

    #[test]
    fn test_blocks_and_includes() {
        assert_eq!(
            kinds("{{b row}}{{/b}}{{bv menu}}{{/bv}}{{i common.header/}}"),
            vec![
                TokenKind::Block { name: "row".into() },
                TokenKind::BlockEnd,
                TokenKind::BlockValue { name: "menu".into() },
                TokenKind::BlockValueEnd,
                TokenKind::Include {
                    name: "common.header".into()
                },
            ]
        );
    }

    #[test]
    fn test_unknown_braces_are_text() {
        let tokens = tokenize("t", "function() {{ return 1; }}").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Text("function() {{ return 1; }}".into()));
    }

    #[test]
    fn test_comments_are_dropped() {
        assert_eq!(
            kinds("a{{c}} {{v hidden/}} {{/c}}b"),
            vec![TokenKind::Text("a".into()), TokenKind::Text("b".into())]
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = tokenize("t", "line one\n  {{v x/}}").unwrap();
        assert_eq!(tokens[1].position(), (2, 3));
        assert_eq!(tokens[1].raw, "{{v x/}}");
    }

    #[test]
    fn test_syntax_errors_carry_position() {
        let err = tokenize("page", "ok\n{{v name").unwrap_err();
        match err {
            CompileError::Syntax {
                template,
                line,
                column,
                ..
            } => {
                assert_eq!(template, "page");
                assert_eq!((line, column), (2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(tokenize("t", "{{v ''/}}").is_err());
        assert!(tokenize("t", "{{c}} never closed").is_err());
        assert!(tokenize("t", "{{i header}}").is_err());
        assert!(tokenize("t", "{{b row/}}").is_err());
    }
}
