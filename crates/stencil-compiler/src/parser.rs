//! Builds a [`ContentTree`] from an include-expanded token stream.

use std::sync::Arc;

use stencil_core::{Block, BlockPart, ContentTree, ContentTreeBuilder, ROOT_BLOCK};

use crate::error::CompileError;
use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Block,
    BlockValue,
}

/// A block under construction.
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    id: String,
    parts: Vec<BlockPart>,
    opened_at: Option<Token>,
}

impl Frame {
    fn new(kind: FrameKind, id: &str, opened_at: Option<Token>) -> Self {
        Self {
            kind,
            id: id.to_string(),
            parts: Vec::new(),
            opened_at,
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // Comments and includes split text; keep adjacent runs together.
        if let Some(BlockPart::Text { text: last }) = self.parts.last_mut() {
            let mut joined = String::with_capacity(last.len() + text.len());
            joined.push_str(last);
            joined.push_str(text);
            *last = Arc::from(joined);
        } else {
            self.parts.push(BlockPart::Text { text: text.into() });
        }
    }

    fn push_value(&mut self, id: &str, tag: &str) {
        self.parts.push(BlockPart::Value {
            id: id.into(),
            tag: tag.into(),
        });
    }
}

pub(crate) fn parse(tokens: Vec<Token>) -> Result<ContentTree, CompileError> {
    let mut builder = ContentTree::builder();
    let mut stack = vec![Frame::new(FrameKind::Root, ROOT_BLOCK, None)];
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        match &token.kind {
            TokenKind::Text(text) => top(&mut stack).push_text(text),
            TokenKind::Value { name, short: true } => {
                builder.declare_value(name);
                top(&mut stack).push_value(name, &token.raw);
            }
            TokenKind::Value { name, short: false } => {
                let mut default = String::new();
                let mut closed = false;
                for inner in tokens.by_ref() {
                    match inner.kind {
                        TokenKind::Text(text) => default.push_str(&text),
                        TokenKind::ValueEnd => {
                            closed = true;
                            break;
                        }
                        _ => return Err(error_at(&inner, "tags are not allowed inside a value default")),
                    }
                }
                if !closed {
                    return Err(error_at(&token, format!("value '{name}' is never closed")));
                }
                let tag = format!("{}{default}{{{{/v}}}}", token.raw);
                builder.default_value(name, default);
                top(&mut stack).push_value(name, &tag);
            }
            TokenKind::Block { name } => {
                stack.push(Frame::new(FrameKind::Block, name, Some(token.clone())));
            }
            TokenKind::BlockValue { name } => {
                stack.push(Frame::new(FrameKind::BlockValue, name, Some(token.clone())));
            }
            TokenKind::BlockEnd => close_block(&mut stack, &mut builder, &token, FrameKind::Block)?,
            TokenKind::BlockValueEnd => {
                close_block(&mut stack, &mut builder, &token, FrameKind::BlockValue)?
            }
            TokenKind::ValueEnd => return Err(error_at(&token, "closing value tag without an opening tag")),
            TokenKind::Include { name } => {
                return Err(error_at(&token, format!("include '{name}' was not expanded")));
            }
        }
    }

    let root = match stack.pop() {
        Some(frame) if frame.kind == FrameKind::Root => frame,
        Some(frame) => {
            let message = format!("block '{}' is never closed", frame.id);
            return Err(match &frame.opened_at {
                Some(open) => error_at(open, message),
                None => CompileError::syntax("", (1, 1), message),
            });
        }
        None => return Err(CompileError::syntax("", (1, 1), "empty block stack")),
    };
    builder.add_block(Block::new(ROOT_BLOCK, root.parts));
    Ok(builder.build())
}

fn top(stack: &mut [Frame]) -> &mut Frame {
    let last = stack.len() - 1;
    &mut stack[last]
}

fn close_block(
    stack: &mut Vec<Frame>,
    builder: &mut ContentTreeBuilder,
    closing: &Token,
    expected: FrameKind,
) -> Result<(), CompileError> {
    let open = stack.last().map(|f| f.kind);
    if open != Some(expected) {
        let message = match stack.last() {
            Some(frame) if frame.kind != FrameKind::Root => format!(
                "'{}' does not close block '{}' opened at line {}",
                closing.raw,
                frame.id,
                frame.opened_at.as_ref().map_or(0, |t| t.line)
            ),
            _ => format!("'{}' has no matching opening tag", closing.raw),
        };
        return Err(error_at(closing, message));
    }

    let Some(frame) = stack.pop() else {
        return Err(error_at(closing, "empty block stack"));
    };
    let opened_at = frame.opened_at.as_ref().unwrap_or(closing);
    if !builder.add_block(Block::new(frame.id.clone(), frame.parts)) {
        return Err(error_at(opened_at, format!("block '{}' is defined twice", frame.id)));
    }

    if frame.kind == FrameKind::BlockValue {
        builder.block_value(&frame.id);
        top(stack).push_value(&frame.id, &opened_at.raw);
    }
    Ok(())
}

fn error_at(token: &Token, message: impl Into<String>) -> CompileError {
    CompileError::syntax(&token.origin, token.position(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn tree(source: &str) -> ContentTree {
        parse(tokenize("t", source).unwrap()).unwrap()
    }

    fn parse_err(source: &str) -> String {
        parse(tokenize("t", source).unwrap()).unwrap_err().to_string()
    }

    #[test]
    fn test_blocks_are_extracted_from_root() {
        let tree = tree("<ul>{{b row}}<li>{{v item/}}</li>{{/b}}{{v rows/}}</ul>");
        assert_eq!(tree.root().unwrap().literal_text(), "<ul></ul>");
        assert_eq!(tree.block("row").unwrap().literal_text(), "<li></li>");
        assert_eq!(tree.value_ids(), &["item".to_string(), "rows".to_string()]);
    }

    #[test]
    fn test_nested_block_definitions() {
        let tree = tree("{{b outer}}a{{b inner}}b{{/b}}c{{/b}}");
        assert_eq!(tree.block("outer").unwrap().literal_text(), "ac");
        assert_eq!(tree.block("inner").unwrap().literal_text(), "b");
        assert_eq!(tree.blocks().len(), 3);
    }

    #[test]
    fn test_first_default_wins() {
        let tree = tree("{{v title}}One{{/v}} {{v title}}Two{{/v}}");
        assert_eq!(tree.default_value("title").map(|t| t.as_ref()), Some("One"));
        assert_eq!(tree.value_ids().len(), 1);
    }

    #[test]
    fn test_block_value_places_placeholder() {
        let tree = tree("[{{bv menu}}m{{/bv}}]");
        assert!(tree.is_block_value("menu"));
        assert!(tree.has_default_value("menu"));
        let root_ids: Vec<&str> = tree.root().unwrap().value_ids().collect();
        assert_eq!(root_ids, vec!["menu"]);
        assert_eq!(tree.block("menu").unwrap().literal_text(), "m");
    }

    #[test]
    fn test_text_around_comments_is_merged() {
        let tree = tree("a{{c}}x{{/c}}b");
        assert_eq!(tree.root().unwrap().parts().len(), 1);
    }

    #[test]
    fn test_structural_errors() {
        assert!(parse_err("{{b a}}x").contains("never closed"));
        assert!(parse_err("x{{/b}}").contains("no matching opening tag"));
        assert!(parse_err("{{b a}}{{/bv}}").contains("does not close block 'a'"));
        assert!(parse_err("{{b a}}{{/b}}{{b a}}{{/b}}").contains("defined twice"));
        assert!(parse_err("{{v a}}x{{v b/}}{{/v}}").contains("not allowed inside a value default"));
        assert!(parse_err("{{v a}}x").contains("never closed"));
        assert!(parse_err("{{/v}}").contains("without an opening tag"));
    }

    #[test]
    fn test_duplicate_block_error_points_at_second_definition() {
        let err = parse(tokenize("t", "{{b a}}{{/b}}\n{{b a}}{{/b}}").unwrap()).unwrap_err();
        assert!(matches!(err, CompileError::Syntax { line: 2, column: 1, .. }));
    }
}
