use serde::Serialize;

use crate::position::Position;

/// The kind of a lexical token.
///
/// Mirrors §3 of the language spec: structural markers synthesized by the
/// indent tracker, the fixed keyword set, two punctuation marks, and the
/// value-bearing kinds (`IDENT`, `STRING`, `ARGS`, `COMMENT`, `RAW_TEXT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    // Structural
    Eof,
    Newline,
    Indent,
    Dedent,

    // Keywords
    Workflow,
    Activity,
    Signal,
    Query,
    Update,
    Spawn,
    Detach,
    Nexus,
    Timer,
    Options,
    Await,
    All,
    One,
    Or,
    Parallel,
    Select,
    Switch,
    Case,
    If,
    Else,
    For,
    In,
    Return,
    Close,
    Completed,
    Failed,
    ContinueAsNew,
    Break,
    Continue,

    // Punctuation
    Colon,
    Arrow,

    // Values
    Ident,
    String,
    Args,
    Comment,
    RawText,
}

impl TokenKind {
    /// Whether this kind is one of the fixed keywords.
    pub fn is_keyword(self) -> bool {
        keyword_text(self).is_some()
    }
}

/// A single lexical token: its kind, literal payload (empty for structural
/// kinds and keywords), and the 1-based position of its first character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }
}

/// Look up the keyword `TokenKind` for an identifier-shaped literal, or
/// `None` if it is a plain identifier.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match s {
        "workflow" => Workflow,
        "activity" => Activity,
        "signal" => Signal,
        "query" => Query,
        "update" => Update,
        "spawn" => Spawn,
        "detach" => Detach,
        "nexus" => Nexus,
        "timer" => Timer,
        "options" => Options,
        "await" => Await,
        "all" => All,
        "one" => One,
        "or" => Or,
        "parallel" => Parallel,
        "select" => Select,
        "switch" => Switch,
        "case" => Case,
        "if" => If,
        "else" => Else,
        "for" => For,
        "in" => In,
        "return" => Return,
        "close" => Close,
        "completed" => Completed,
        "failed" => Failed,
        "continue_as_new" => ContinueAsNew,
        "break" => Break,
        "continue" => Continue,
        _ => return None,
    })
}

/// Inverse of [`keyword_from_str`] for keyword kinds; `None` for non-keyword
/// kinds.
fn keyword_text(kind: TokenKind) -> Option<&'static str> {
    use TokenKind::*;
    Some(match kind {
        Workflow => "workflow",
        Activity => "activity",
        Signal => "signal",
        Query => "query",
        Update => "update",
        Spawn => "spawn",
        Detach => "detach",
        Nexus => "nexus",
        Timer => "timer",
        Options => "options",
        Await => "await",
        All => "all",
        One => "one",
        Or => "or",
        Parallel => "parallel",
        Select => "select",
        Switch => "switch",
        Case => "case",
        If => "if",
        Else => "else",
        For => "for",
        In => "in",
        Return => "return",
        Close => "close",
        Completed => "completed",
        Failed => "failed",
        ContinueAsNew => "continue_as_new",
        Break => "break",
        Continue => "continue",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_round_trips() {
        for kw in [
            "workflow", "activity", "signal", "query", "update", "spawn", "detach", "nexus",
            "timer", "options", "await", "all", "one", "or", "parallel", "select", "switch",
            "case", "if", "else", "for", "in", "return", "close", "completed", "failed",
            "continue_as_new", "break", "continue",
        ] {
            let kind = keyword_from_str(kw).unwrap_or_else(|| panic!("{kw} should be a keyword"));
            assert!(kind.is_keyword());
            assert_eq!(keyword_text(kind), Some(kw));
        }
    }

    #[test]
    fn non_keyword_identifier_is_none() {
        assert_eq!(keyword_from_str("Foo"), None);
        assert_eq!(keyword_from_str("x"), None);
        assert_eq!(keyword_from_str(""), None);
    }

    #[test]
    fn structural_and_value_kinds_are_not_keywords() {
        assert!(!TokenKind::Ident.is_keyword());
        assert!(!TokenKind::Eof.is_keyword());
        assert!(!TokenKind::Args.is_keyword());
    }
}
