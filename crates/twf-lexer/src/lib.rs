//! Tokenizer for TWF source text.
//!
//! The lexer is a byte-level scanner that tracks indentation the way a
//! Python-style tokenizer does: it maintains a stack of indent widths and
//! synthesizes `INDENT`/`DEDENT` tokens as the width changes between
//! consecutive non-blank lines, plus an epilogue of `DEDENT`s and an `EOF`
//! at end of input. It never rejects a byte — unrecognized bytes become
//! single-byte `RAW_TEXT` tokens, and statement-level parsing is tolerant
//! of whatever falls through.

use std::collections::VecDeque;

use twf_common::token::keyword_from_str;
use twf_common::{Position, Token, TokenKind};

/// Tokenizes TWF source text on demand.
///
/// Construct with [`Lexer::new`] and pull tokens via the `Iterator`
/// implementation, or use [`Lexer::tokenize`] to materialize the whole
/// stream at once.
pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    line: u32,
    column: u32,
    at_line_start: bool,
    indent_stack: Vec<u32>,
    pending: VecDeque<Token>,
    eof_emitted: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            at_line_start: true,
            indent_stack: vec![0],
            pending: VecDeque::new(),
            eof_emitted: false,
        }
    }

    /// Tokenize the entire source in one pass.
    pub fn tokenize(source: &'src str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance_byte(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Process indentation at the start of a line. Returns the first
    /// queued structural token (if any); remaining ones are left on
    /// `pending`. Returns `None` for a blank line (fully consumed, no
    /// token emitted) or for same-width non-blank lines (nothing queued).
    fn handle_line_start(&mut self) -> Option<Token> {
        let mut width: u32 = 0;
        while self.peek_byte() == Some(b' ') {
            self.advance_byte();
            width += 1;
        }

        match self.peek_byte() {
            None => None,
            Some(b'\n') => {
                self.advance_byte();
                None
            }
            _ => {
                self.at_line_start = false;
                let content_pos = Position::new(self.line, width + 1);
                let top = *self.indent_stack.last().unwrap();
                if width > top {
                    self.indent_stack.push(width);
                    self.pending
                        .push_back(Token::new(TokenKind::Indent, "", content_pos));
                } else if width < top {
                    while *self.indent_stack.last().unwrap() > width {
                        self.indent_stack.pop();
                        self.pending
                            .push_back(Token::new(TokenKind::Dedent, "", content_pos));
                    }
                    // If `width` falls strictly between two previously pushed
                    // levels, we stop at the nearest level <= width without
                    // pushing a new one for `width` itself (see §9).
                }
                self.pending.pop_front()
            }
        }
    }

    /// Scan one token from inside a line (not at line start). Returns
    /// `None` once the scan runs into end-of-input, letting the caller
    /// fall through to the end-of-file epilogue.
    fn scan_token(&mut self) -> Option<Token> {
        while self.peek_byte() == Some(b' ') {
            self.advance_byte();
        }
        if self.pos >= self.bytes.len() {
            return None;
        }

        let pos = self.position();
        let b = self.peek_byte().unwrap();
        Some(match b {
            b'\n' => {
                self.advance_byte();
                self.at_line_start = true;
                Token::new(TokenKind::Newline, "", pos)
            }
            b'#' => self.lex_comment(pos),
            b'(' => self.lex_args(pos),
            b'"' => self.lex_string(pos),
            b':' => {
                self.advance_byte();
                Token::new(TokenKind::Colon, ":", pos)
            }
            b'-' if self.peek_byte_at(1) == Some(b'>') => {
                self.advance_byte();
                self.advance_byte();
                Token::new(TokenKind::Arrow, "->", pos)
            }
            _ if is_ident_start(b) => self.lex_ident(pos),
            _ => {
                self.advance_byte();
                Token::new(TokenKind::RawText, (b as char).to_string(), pos)
            }
        })
    }

    fn lex_comment(&mut self, pos: Position) -> Token {
        let start = self.pos;
        self.advance_byte(); // '#'
        while let Some(b) = self.peek_byte() {
            if b == b'\n' {
                break;
            }
            self.advance_byte();
        }
        Token::new(TokenKind::Comment, &self.source[start..self.pos], pos)
    }

    /// Captures the content of a single top-level paren layer, stopping at
    /// the first `)` regardless of any parens nested inside (§9).
    fn lex_args(&mut self, pos: Position) -> Token {
        self.advance_byte(); // '('
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b == b')' {
                break;
            }
            self.advance_byte();
        }
        let text = self.source[start..self.pos].to_string();
        if self.peek_byte() == Some(b')') {
            self.advance_byte();
        }
        Token::new(TokenKind::Args, text, pos)
    }

    fn lex_string(&mut self, pos: Position) -> Token {
        self.advance_byte(); // opening quote
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b == b'"' {
                break;
            }
            self.advance_byte();
        }
        let text = self.source[start..self.pos].to_string();
        if self.peek_byte() == Some(b'"') {
            self.advance_byte();
        }
        Token::new(TokenKind::String, text, pos)
    }

    fn lex_ident(&mut self, pos: Position) -> Token {
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if is_ident_continue(b) {
                self.advance_byte();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        Token::new(kind, text, pos)
    }

    fn handle_eof(&mut self) {
        if self.eof_emitted {
            return;
        }
        self.eof_emitted = true;
        let pos = self.position();
        if !self.source.is_empty() && !self.source.ends_with('\n') {
            self.pending.push_back(Token::new(TokenKind::Newline, "", pos));
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.pending.push_back(Token::new(TokenKind::Dedent, "", pos));
        }
        self.pending.push_back(Token::new(TokenKind::Eof, "", pos));
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(tok) = self.pending.pop_front() {
                return Some(tok);
            }
            if self.eof_emitted {
                return None;
            }
            if self.at_line_start {
                if let Some(tok) = self.handle_line_start() {
                    return Some(tok);
                }
                if self.pos >= self.bytes.len() {
                    self.handle_eof();
                }
                continue;
            }
            if self.pos >= self.bytes.len() {
                self.handle_eof();
                continue;
            }
            if let Some(tok) = self.scan_token() {
                return Some(tok);
            }
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn minimal_workflow() {
        let source = "workflow Foo(x: int) -> (Result):\n    return x\n";
        let toks = Lexer::tokenize(source);
        use TokenKind::*;
        let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                Workflow, Ident, Args, Arrow, Args, Colon, Newline, Indent, Return, Ident,
                Newline, Dedent, Eof,
            ]
        );
    }

    #[test]
    fn blank_lines_do_not_affect_indentation() {
        let source = "workflow A():\n    return\n\n    \nactivity B():\n    return\n";
        let toks = Lexer::tokenize(source);
        // Exactly one INDENT/DEDENT pair per definition; blank lines are silent.
        let indents = toks.iter().filter(|t| t.kind == TokenKind::Indent).count();
        let dedents = toks.iter().filter(|t| t.kind == TokenKind::Dedent).count();
        assert_eq!(indents, 2);
        assert_eq!(dedents, 2);
    }

    #[test]
    fn file_without_trailing_newline_still_parses() {
        let source = "workflow A():\n    return x";
        let toks = Lexer::tokenize(source);
        let last_three: Vec<_> = toks[toks.len() - 3..].iter().map(|t| t.kind).collect();
        assert_eq!(
            last_three,
            vec![TokenKind::Newline, TokenKind::Dedent, TokenKind::Eof]
        );
    }

    #[test]
    fn indent_dedent_balance() {
        let source = "workflow A():\n    if (x):\n        return x\n    return\n";
        let toks = Lexer::tokenize(source);
        let indents = toks.iter().filter(|t| t.kind == TokenKind::Indent).count();
        let dedents = toks.iter().filter(|t| t.kind == TokenKind::Dedent).count();
        assert_eq!(indents, dedents);
        assert_eq!(indents, 2);
    }

    #[test]
    fn args_capture_first_unmatched_paren_only() {
        let toks = Lexer::tokenize("workflow A(x: (Nested)):\n    return\n");
        let args = toks.iter().find(|t| t.kind == TokenKind::Args).unwrap();
        assert_eq!(args.text, "x: (Nested");
    }

    #[test]
    fn args_span_newlines() {
        let source = "workflow A(x: int,\n    y: int):\n    return\n";
        let toks = Lexer::tokenize(source);
        let args = toks.iter().find(|t| t.kind == TokenKind::Args).unwrap();
        assert_eq!(args.text, "x: int,\n    y: int");
    }

    #[test]
    fn string_literal() {
        let toks = Lexer::tokenize("workflow A():\n    nexus \"prod\"\n");
        let s = toks.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(s.text, "prod");
    }

    #[test]
    fn comment_captures_to_end_of_line() {
        let toks = Lexer::tokenize("# a top-level comment\nworkflow A():\n    return\n");
        let c = toks.iter().find(|t| t.kind == TokenKind::Comment).unwrap();
        assert_eq!(c.text, "# a top-level comment");
    }

    #[test]
    fn keyword_vs_identifier() {
        assert_eq!(kinds("workflow\n")[0], TokenKind::Workflow);
        assert_eq!(kinds("workflowish\n")[0], TokenKind::Ident);
    }

    #[test]
    fn raw_text_single_byte() {
        // No NUMBER token kind exists; every non-recognized byte (including
        // digits, since there is no numeric-literal lexing) becomes its own
        // single-byte RAW_TEXT token.
        let toks = Lexer::tokenize("workflow A():\n    x = 1\n");
        let raw: Vec<_> = toks
            .iter()
            .filter(|t| t.kind == TokenKind::RawText)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(raw, vec!["=", "1"]);
    }

    #[test]
    fn positions_are_one_based() {
        let toks = Lexer::tokenize("workflow A():\n    return\n");
        assert_eq!(toks[0].position, Position::new(1, 1));
    }
}
