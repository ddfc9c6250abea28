//! `textDocument/semanticTokens/full` (§4.7, §6.4).
//!
//! Re-lexes the document text and assigns a token type per the rules below,
//! then delta-encodes the stream the way the LSP protocol requires. The
//! legend is fixed: types
//! `["keyword","function","method","event","string","comment","operator","parameter"]`,
//! modifiers `["declaration"]`.
//!
//! `ARGS`/`STRING` tokens carry their payload without the surrounding
//! delimiter characters, so their length adds two; `COMMENT` tokens already
//! include the leading `#` in their payload (see the lexer), so no
//! adjustment is needed there.

use tower_lsp::lsp_types::{SemanticToken, SemanticTokenModifier, SemanticTokenType, SemanticTokensLegend};

use twf_common::{Token, TokenKind};
use twf_lexer::Lexer;

pub const TOKEN_TYPES: &[SemanticTokenType] = &[
    SemanticTokenType::KEYWORD,
    SemanticTokenType::FUNCTION,
    SemanticTokenType::METHOD,
    SemanticTokenType::EVENT,
    SemanticTokenType::STRING,
    SemanticTokenType::COMMENT,
    SemanticTokenType::OPERATOR,
    SemanticTokenType::PARAMETER,
];

pub const TOKEN_MODIFIERS: &[SemanticTokenModifier] = &[SemanticTokenModifier::DECLARATION];

const DECLARATION_BIT: u32 = 1;

const KEYWORD: u32 = 0;
const FUNCTION: u32 = 1;
const METHOD: u32 = 2;
const EVENT: u32 = 3;
const STRING: u32 = 4;
const COMMENT: u32 = 5;
const OPERATOR: u32 = 6;
const PARAMETER: u32 = 7;

pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: TOKEN_TYPES.to_vec(),
        token_modifiers: TOKEN_MODIFIERS.to_vec(),
    }
}

pub fn semantic_tokens(source: &str) -> Vec<SemanticToken> {
    let tokens = Lexer::tokenize(source);
    let mut out = Vec::with_capacity(tokens.len());
    let mut prev_line = 0u32;
    let mut prev_start = 0u32;
    let mut prev_kind: Option<TokenKind> = None;
    let mut depth: i32 = 0;

    for tok in &tokens {
        match tok.kind {
            TokenKind::Indent => depth += 1,
            TokenKind::Dedent => depth -= 1,
            _ => {}
        }
        let classified = classify(tok, prev_kind, depth);
        prev_kind = Some(tok.kind);
        let Some((token_type, modifiers)) = classified else { continue };

        let (start_col, length) = span(tok);
        let line0 = tok.position.line - 1;
        let col0 = start_col - 1;
        let delta_line = line0 - prev_line;
        let delta_start = if delta_line == 0 { col0 - prev_start } else { col0 };

        out.push(SemanticToken {
            delta_line,
            delta_start,
            length,
            token_type,
            token_modifiers_bitset: modifiers,
        });
        prev_line = line0;
        prev_start = col0;
    }
    out
}

fn span(tok: &Token) -> (u32, u32) {
    match tok.kind {
        TokenKind::Args | TokenKind::String => (tok.position.column, tok.text.chars().count() as u32 + 2),
        TokenKind::Arrow => (tok.position.column, 2),
        _ => (tok.position.column, tok.text.chars().count().max(1) as u32),
    }
}

/// `depth` is the INDENT/DEDENT nesting level of `tok` itself -- used to
/// restrict the `declaration` modifier on a `workflow`/`activity` name to
/// depth 0 (its header), since a nested `spawn workflow Foo()` call names a
/// reference, not a declaration, even though it follows the same keyword.
fn classify(tok: &Token, prev: Option<TokenKind>, depth: i32) -> Option<(u32, u32)> {
    match tok.kind {
        TokenKind::Newline | TokenKind::Eof | TokenKind::Indent | TokenKind::Dedent => None,
        TokenKind::String => Some((STRING, 0)),
        TokenKind::Comment => Some((COMMENT, 0)),
        TokenKind::Colon | TokenKind::Arrow => Some((OPERATOR, 0)),
        TokenKind::Args => Some((PARAMETER, 0)),
        TokenKind::Ident => match prev {
            Some(TokenKind::Workflow) | Some(TokenKind::Activity) => {
                let modifiers = if depth == 0 { DECLARATION_BIT } else { 0 };
                Some((FUNCTION, modifiers))
            }
            Some(TokenKind::Signal) => Some((EVENT, DECLARATION_BIT)),
            Some(TokenKind::Query) | Some(TokenKind::Update) => Some((METHOD, DECLARATION_BIT)),
            _ => Some((FUNCTION, 0)),
        },
        k if k.is_keyword() => Some((KEYWORD, 0)),
        TokenKind::RawText => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(source: &str) -> Vec<(u32, u32, u32, u32, u32)> {
        semantic_tokens(source)
            .into_iter()
            .map(|t| (t.delta_line, t.delta_start, t.length, t.token_type, t.token_modifiers_bitset))
            .collect()
    }

    #[test]
    fn workflow_declaration_gets_function_type_and_declaration_modifier() {
        let tokens = decode("workflow Foo():\n    return\n");
        assert_eq!(tokens[0], (0, 0, 8, KEYWORD, 0));
        assert_eq!(tokens[1], (0, 9, 3, FUNCTION, DECLARATION_BIT));
    }

    #[test]
    fn signal_declaration_gets_event_type() {
        let tokens = decode("workflow A():\n    signal Cancel():\n    return\n");
        let signal_name = tokens.iter().find(|t| t.3 == EVENT).unwrap();
        assert_eq!(signal_name.4, DECLARATION_BIT);
    }

    #[test]
    fn args_token_length_adds_two_for_parens() {
        let tokens = decode("activity A(x: int):\n    return\n");
        let args = tokens.iter().find(|t| t.3 == PARAMETER).unwrap();
        assert_eq!(args.2, "x: int".len() as u32 + 2);
    }

    #[test]
    fn comment_length_already_includes_hash_delimiter() {
        let tokens = decode("# hi\nactivity A():\n    return\n");
        let comment = tokens.iter().find(|t| t.3 == COMMENT).unwrap();
        assert_eq!(comment.2, "# hi".len() as u32);
    }

    #[test]
    fn nested_workflow_call_is_function_without_declaration_modifier() {
        let tokens = decode("workflow A():\n    spawn workflow B()\nworkflow B():\n    return\n");
        let functions: Vec<_> = tokens.iter().filter(|t| t.3 == FUNCTION).collect();
        // A's own declaration (depth 0) carries the modifier; the nested
        // call to B inside A's body (depth 1) does not.
        assert_eq!(functions[0].4, DECLARATION_BIT);
        assert_eq!(functions[1].4, 0);
    }

    #[test]
    fn structural_tokens_emit_nothing() {
        let tokens = semantic_tokens("activity A():\n    return\n");
        assert!(tokens.len() < Lexer::tokenize("activity A():\n    return\n").len());
    }
}
