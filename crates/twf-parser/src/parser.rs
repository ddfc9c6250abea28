//! Hand-written recursive-descent parser over a pre-materialized token
//! slice with one-token lookahead.
//!
//! Exposes two entry points, matching the error-handling policy: a strict
//! parse that stops at the first error, and a tolerant parse that always
//! returns a (possibly partial) `File` plus an ordered list of parse
//! errors, resynchronizing at the next top-level `workflow`/`activity`
//! boundary after each one.

use twf_common::{ParseError, Position, Token, TokenKind};
use twf_lexer::Lexer;

use crate::ast::*;

/// Parse tolerantly: always returns a `File`, resynchronizing at
/// definition boundaries after each error.
pub fn parse_tolerant(source: &str) -> (File, Vec<ParseError>) {
    let tokens = Lexer::tokenize(source);
    let mut parser = Parser::new(&tokens);
    let mut definitions = Vec::new();

    loop {
        parser.skip_blank_newlines();
        if parser.at(TokenKind::Eof) {
            break;
        }
        match parser.parse_definition() {
            Ok(def) => definitions.push(def),
            Err(err) => {
                parser.errors.push(err);
                parser.resync_to_top_level();
            }
        }
    }

    (File { definitions }, parser.errors)
}

/// Parse strictly: returns the first error encountered, with no recovery.
pub fn parse_strict(source: &str) -> Result<File, ParseError> {
    let tokens = Lexer::tokenize(source);
    let mut parser = Parser::new(&tokens);
    let mut definitions = Vec::new();

    loop {
        parser.skip_blank_newlines();
        if parser.at(TokenKind::Eof) {
            break;
        }
        definitions.push(parser.parse_definition()?);
    }

    Ok(File { definitions })
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Running INDENT/DEDENT balance, used to find indentation-0 positions
    /// during tolerant-parse resynchronization.
    depth: i32,
    errors: Vec<ParseError>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Indent => self.depth += 1,
            TokenKind::Dedent => self.depth -= 1,
            _ => {}
        }
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn skip_blank_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Discards tokens until a `workflow`/`activity` keyword appears at
    /// indentation 0, or `EOF` is reached.
    fn resync_to_top_level(&mut self) {
        loop {
            if self.at(TokenKind::Eof) {
                return;
            }
            if self.depth <= 0 && (self.at(TokenKind::Workflow) || self.at(TokenKind::Activity)) {
                return;
            }
            self.advance();
        }
    }

    fn error_here(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(msg, self.peek().position)
    }

    fn error_at(&self, pos: Position, msg: impl Into<String>) -> ParseError {
        ParseError::new(msg, pos)
    }

    fn expect(&mut self, kind: TokenKind, msg: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(msg.to_string()))
        }
    }

    fn expect_ident(&mut self, msg: &str) -> Result<(String, Position), ParseError> {
        if self.at(TokenKind::Ident) {
            let t = self.advance();
            Ok((t.text, t.position))
        } else {
            Err(self.error_here(msg.to_string()))
        }
    }

    fn expect_args(&mut self, msg: &str) -> Result<String, ParseError> {
        if self.at(TokenKind::Args) {
            Ok(self.advance().text)
        } else {
            Err(self.error_here(msg.to_string()))
        }
    }

    fn expect_string(&mut self, msg: &str) -> Result<String, ParseError> {
        if self.at(TokenKind::String) {
            Ok(self.advance().text)
        } else {
            Err(self.error_here(msg.to_string()))
        }
    }

    /// `[ "->" "(" RET ")" ]` — used by workflow/activity headers and
    /// query/update declarations.
    fn parse_optional_return_type(&mut self) -> Result<Option<String>, ParseError> {
        if self.at(TokenKind::Arrow) {
            self.advance();
            Ok(Some(self.expect_args("expected return type")?))
        } else {
            Ok(None)
        }
    }

    /// `[ "->" IDENT ]` — the plain-identifier result binding used by
    /// ActivityCall and WorkflowCall (as opposed to the signal/update
    /// `Binding` form, which also accepts a parenthesized group).
    fn parse_arrow_ident(&mut self) -> Result<Option<String>, ParseError> {
        if self.at(TokenKind::Arrow) {
            self.advance();
            let (name, _) = self.expect_ident("expected identifier after '->'")?;
            Ok(Some(name))
        } else {
            Ok(None)
        }
    }

    /// `Binding := IDENT | "(" IDENTS ")"`.
    fn parse_binding(&mut self) -> Result<Option<String>, ParseError> {
        if !self.at(TokenKind::Arrow) {
            return Ok(None);
        }
        self.advance();
        if self.at(TokenKind::Ident) {
            Ok(Some(self.advance().text))
        } else if self.at(TokenKind::Args) {
            Ok(Some(self.advance().text))
        } else {
            Err(self.error_here("expected binding identifier or parenthesized group".to_string()))
        }
    }

    /// The optional `options(...)` statement absorbed as the first body
    /// line of a definition or immediately following a call.
    fn parse_optional_options(&mut self) -> Result<Option<String>, ParseError> {
        self.skip_blank_newlines();
        if self.at(TokenKind::Options) {
            self.advance();
            let args = self.expect_args("expected options argument list")?;
            self.expect(TokenKind::Newline, "expected newline after options")?;
            Ok(Some(args))
        } else {
            Ok(None)
        }
    }

    /// Joins every token up to (not including) the next `NEWLINE`/`EOF`
    /// with single spaces — the inverse of the lexer's literal-concatenation
    /// round-trip property, used to recover "opaque rest of line" text.
    fn capture_rest_of_line(&mut self) -> String {
        let mut parts = Vec::new();
        while !self.at(TokenKind::Newline) && !self.at(TokenKind::Eof) {
            parts.push(self.advance().text);
        }
        parts.join(" ")
    }

    /// Like `capture_rest_of_line`, but stops before a trailing `:` as well
    /// -- used for opaque values that are themselves followed by a colon on
    /// the same line (e.g. a `case` value), rather than running to EOL.
    fn capture_value_until_colon(&mut self) -> String {
        let mut parts = Vec::new();
        while !self.at(TokenKind::Colon) && !self.at(TokenKind::Newline) && !self.at(TokenKind::Eof) {
            parts.push(self.advance().text);
        }
        parts.join(" ")
    }

    fn parse_definition(&mut self) -> Result<Definition, ParseError> {
        match self.peek_kind() {
            TokenKind::Workflow => self.parse_workflow_def().map(Definition::Workflow),
            TokenKind::Activity => self.parse_activity_def().map(Definition::Activity),
            _ => Err(self.error_here("expected 'workflow' or 'activity' definition".to_string())),
        }
    }

    fn parse_workflow_def(&mut self) -> Result<WorkflowDef, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'workflow'
        let (name, name_position) = self.expect_ident("expected workflow name")?;
        let params = self.expect_args("expected parameter list")?;
        let return_type = self.parse_optional_return_type()?;
        self.expect(TokenKind::Colon, "expected ':' after workflow header")?;
        self.expect(TokenKind::Newline, "expected newline after ':'")?;
        self.expect(TokenKind::Indent, "expected indented workflow body")?;
        let options = self.parse_optional_options()?;

        let mut signals = Vec::new();
        let mut queries = Vec::new();
        let mut updates = Vec::new();
        let mut body = Vec::new();
        loop {
            self.skip_blank_newlines();
            if self.at(TokenKind::Dedent) || self.at(TokenKind::Eof) {
                break;
            }
            match self.peek_kind() {
                TokenKind::Signal => signals.push(self.parse_signal_decl()?),
                TokenKind::Query => queries.push(self.parse_query_decl()?),
                TokenKind::Update => updates.push(self.parse_update_decl()?),
                _ => body.push(self.parse_statement(true)?),
            }
        }
        self.expect(TokenKind::Dedent, "expected dedent to close workflow body")?;

        Ok(WorkflowDef {
            name,
            position,
            name_position,
            params,
            return_type,
            options,
            signals,
            queries,
            updates,
            body,
        })
    }

    fn parse_activity_def(&mut self) -> Result<ActivityDef, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'activity'
        let (name, name_position) = self.expect_ident("expected activity name")?;
        let params = self.expect_args("expected parameter list")?;
        let return_type = self.parse_optional_return_type()?;
        self.expect(TokenKind::Colon, "expected ':' after activity header")?;
        self.expect(TokenKind::Newline, "expected newline after ':'")?;
        self.expect(TokenKind::Indent, "expected indented activity body")?;
        let options = self.parse_optional_options()?;
        let body = self.parse_statement_list(false)?;
        self.expect(TokenKind::Dedent, "expected dedent to close activity body")?;

        Ok(ActivityDef {
            name,
            position,
            name_position,
            params,
            return_type,
            options,
            body,
        })
    }

    fn parse_signal_decl(&mut self) -> Result<SignalDecl, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'signal'
        let (name, name_position) = self.expect_ident("expected signal name")?;
        let params = self.expect_args("expected parameter list")?;
        let body = self.parse_optional_decl_body()?;
        Ok(SignalDecl {
            name,
            position,
            name_position,
            params,
            body,
        })
    }

    fn parse_query_decl(&mut self) -> Result<QueryDecl, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'query'
        let (name, name_position) = self.expect_ident("expected query name")?;
        let params = self.expect_args("expected parameter list")?;
        let return_type = self.parse_optional_return_type()?;
        let body = self.parse_optional_decl_body()?;
        Ok(QueryDecl {
            name,
            position,
            name_position,
            params,
            return_type,
            body,
        })
    }

    fn parse_update_decl(&mut self) -> Result<UpdateDecl, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'update'
        let (name, name_position) = self.expect_ident("expected update name")?;
        let params = self.expect_args("expected parameter list")?;
        let return_type = self.parse_optional_return_type()?;
        let body = self.parse_optional_decl_body()?;
        Ok(UpdateDecl {
            name,
            position,
            name_position,
            params,
            return_type,
            body,
        })
    }

    /// `[ ":" INDENT Body DEDENT ]` — the colon itself, and the body
    /// behind it, are both optional for signal/query/update declarations.
    /// A colon with no indented block behind it (an empty body) collapses
    /// to `None`, the same as no colon at all: both are a bodiless handler.
    fn parse_optional_decl_body(&mut self) -> Result<Option<Vec<Statement>>, ParseError> {
        if self.at(TokenKind::Colon) {
            self.advance();
            let body = self.parse_body_after_colon(true)?;
            Ok(if body.is_empty() { None } else { Some(body) })
        } else {
            self.expect(TokenKind::Newline, "expected newline after declaration")?;
            Ok(None)
        }
    }

    /// Parses `NEWLINE [INDENT Body DEDENT]` immediately after a `:` that
    /// has already been consumed. The indented block is optional: if the
    /// next line is not more indented, the body is empty (§4.2).
    fn parse_body_after_colon(&mut self, allow_durable: bool) -> Result<Vec<Statement>, ParseError> {
        self.expect(TokenKind::Newline, "expected newline after ':'")?;
        if self.at(TokenKind::Indent) {
            self.advance();
            let body = self.parse_statement_list(allow_durable)?;
            self.expect(TokenKind::Dedent, "expected dedent to close body")?;
            Ok(body)
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_statement_list(&mut self, allow_durable: bool) -> Result<Vec<Statement>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_blank_newlines();
            if self.at(TokenKind::Dedent) || self.at(TokenKind::Eof) {
                break;
            }
            stmts.push(self.parse_statement(allow_durable)?);
        }
        Ok(stmts)
    }

    fn disallowed_in_activity(&self) -> Option<&'static str> {
        match self.peek_kind() {
            TokenKind::Await => Some("await"),
            TokenKind::Signal => Some("signal"),
            TokenKind::Query => Some("query"),
            TokenKind::Update => Some("update"),
            TokenKind::Spawn => Some("spawn"),
            TokenKind::Detach => Some("detach"),
            TokenKind::Nexus => Some("nexus"),
            TokenKind::ContinueAsNew => Some("continue_as_new"),
            _ => None,
        }
    }

    fn parse_statement(&mut self, allow_durable: bool) -> Result<Statement, ParseError> {
        if self.at(TokenKind::Timer) {
            return Err(self.error_here("timer must be used with await".to_string()));
        }
        if !allow_durable {
            if let Some(word) = self.disallowed_in_activity() {
                return Err(self.error_here(format!(
                    "'{word}' is not allowed inside an activity body"
                )));
            }
        }

        match self.peek_kind() {
            TokenKind::Activity => self.parse_activity_call_stmt().map(Statement::ActivityCall),
            TokenKind::Workflow | TokenKind::Spawn | TokenKind::Detach | TokenKind::Nexus => {
                self.parse_workflow_call_stmt().map(Statement::WorkflowCall)
            }
            TokenKind::Await => self.parse_await_stmt_or_block(),
            TokenKind::Switch => self.parse_switch(allow_durable).map(Statement::Switch),
            TokenKind::If => self.parse_if(allow_durable).map(Statement::If),
            TokenKind::For => self.parse_for(allow_durable).map(Statement::For),
            TokenKind::Return => self.parse_return().map(Statement::Return),
            TokenKind::Close => self.parse_close().map(Statement::Close),
            TokenKind::ContinueAsNew => self.parse_continue_as_new().map(Statement::ContinueAsNew),
            TokenKind::Break => self.parse_break(),
            TokenKind::Continue => self.parse_continue(),
            TokenKind::Comment => self.parse_comment().map(Statement::Comment),
            _ => self.parse_raw_stmt().map(Statement::Raw),
        }
    }

    fn parse_activity_call_head(&mut self) -> Result<ActivityCall, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'activity'
        let (name, name_position) = self.expect_ident("expected activity name")?;
        let args = self.expect_args("expected argument list")?;
        let result = self.parse_arrow_ident()?;
        Ok(ActivityCall {
            name,
            position,
            name_position,
            args,
            result,
            options: None,
            resolved: None,
        })
    }

    fn parse_activity_call_stmt(&mut self) -> Result<ActivityCall, ParseError> {
        let mut call = self.parse_activity_call_head()?;
        self.expect(TokenKind::Newline, "expected newline after activity call")?;
        call.options = self.parse_optional_options()?;
        Ok(call)
    }

    fn parse_workflow_call_head(&mut self) -> Result<WorkflowCall, ParseError> {
        let position = self.peek().position;
        let mode = match self.peek_kind() {
            TokenKind::Spawn => {
                self.advance();
                CallMode::Spawn
            }
            TokenKind::Detach => {
                self.advance();
                CallMode::Detach
            }
            _ => CallMode::Child,
        };
        let namespace = if self.at(TokenKind::Nexus) {
            self.advance();
            Some(self.expect_string("expected nexus namespace string")?)
        } else {
            None
        };
        self.expect(TokenKind::Workflow, "expected 'workflow'")?;
        let (name, name_position) = self.expect_ident("expected workflow name")?;
        let args = self.expect_args("expected argument list")?;
        let result = self.parse_arrow_ident()?;
        if mode == CallMode::Detach && result.is_some() {
            return Err(self.error_at(
                position,
                "a detach workflow call must not bind a result".to_string(),
            ));
        }
        Ok(WorkflowCall {
            mode,
            namespace,
            name,
            position,
            name_position,
            args,
            result,
            resolved: None,
        })
    }

    fn parse_workflow_call_stmt(&mut self) -> Result<WorkflowCall, ParseError> {
        let call = self.parse_workflow_call_head()?;
        self.expect(TokenKind::Newline, "expected newline after workflow call")?;
        Ok(call)
    }

    fn parse_await_target(&mut self) -> Result<AwaitTarget, ParseError> {
        match self.peek_kind() {
            TokenKind::Timer => {
                let position = self.peek().position;
                self.advance();
                let duration = self.expect_args("expected timer duration")?;
                Ok(AwaitTarget::Timer { duration, position })
            }
            TokenKind::Signal => {
                let position = self.peek().position;
                self.advance();
                let (name, name_position) = self.expect_ident("expected signal name")?;
                let binding = self.parse_binding()?;
                Ok(AwaitTarget::Signal {
                    name,
                    position,
                    name_position,
                    binding,
                    resolved: None,
                })
            }
            TokenKind::Update => {
                let position = self.peek().position;
                self.advance();
                let (name, name_position) = self.expect_ident("expected update name")?;
                let binding = self.parse_binding()?;
                Ok(AwaitTarget::Update {
                    name,
                    position,
                    name_position,
                    binding,
                    resolved: None,
                })
            }
            TokenKind::Activity => Ok(AwaitTarget::Activity(self.parse_activity_call_head()?)),
            TokenKind::Workflow | TokenKind::Spawn | TokenKind::Detach | TokenKind::Nexus => {
                Ok(AwaitTarget::Workflow(self.parse_workflow_call_head()?))
            }
            _ => Err(self.error_here(
                "expected await target (timer, signal, update, activity, or workflow)".to_string(),
            )),
        }
    }

    fn parse_await_stmt_or_block(&mut self) -> Result<Statement, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'await'
        match self.peek_kind() {
            TokenKind::All => {
                self.advance();
                self.expect(TokenKind::Colon, "expected ':' after 'await all'")?;
                let body = self.parse_body_after_colon(true)?;
                Ok(Statement::AwaitAll(AwaitAllBlock { body, position }))
            }
            TokenKind::One => {
                self.advance();
                self.expect(TokenKind::Colon, "expected ':' after 'await one'")?;
                self.expect(TokenKind::Newline, "expected newline after ':'")?;
                self.expect(TokenKind::Indent, "expected indented 'await one' body")?;
                let mut cases = Vec::new();
                loop {
                    self.skip_blank_newlines();
                    if self.at(TokenKind::Dedent) || self.at(TokenKind::Eof) {
                        break;
                    }
                    cases.push(self.parse_await_one_case()?);
                }
                self.expect(TokenKind::Dedent, "expected dedent to close 'await one' body")?;
                Ok(Statement::AwaitOne(AwaitOneBlock { cases, position }))
            }
            _ => {
                let target = self.parse_await_target()?;
                self.expect(TokenKind::Newline, "expected newline after await statement")?;
                Ok(Statement::Await(AwaitStmt { target, position }))
            }
        }
    }

    fn parse_await_one_case(&mut self) -> Result<AwaitOneCase, ParseError> {
        let position = self.peek().position;
        if self.at(TokenKind::Await) {
            self.advance();
            self.expect(TokenKind::All, "expected 'all' after nested 'await'")?;
            self.expect(TokenKind::Colon, "expected ':' after nested 'await all'")?;
            let body = self.parse_body_after_colon(true)?;
            return Ok(AwaitOneCase::NestedAwaitAll { body, position });
        }
        let target = self.parse_await_target()?;
        self.expect(TokenKind::Colon, "expected ':' after await-one case target")?;
        let body = self.parse_body_after_colon(true)?;
        Ok(AwaitOneCase::Target {
            target,
            body,
            position,
        })
    }

    fn parse_switch(&mut self, allow_durable: bool) -> Result<SwitchBlock, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'switch'
        let discriminant = self.expect_args("expected switch discriminant")?;
        self.expect(TokenKind::Colon, "expected ':' after switch header")?;
        self.expect(TokenKind::Newline, "expected newline after ':'")?;
        self.expect(TokenKind::Indent, "expected indented switch body")?;

        let mut cases = Vec::new();
        let mut default = None;
        loop {
            self.skip_blank_newlines();
            if self.at(TokenKind::Dedent) || self.at(TokenKind::Eof) {
                break;
            }
            if self.at(TokenKind::Case) {
                let case_position = self.peek().position;
                self.advance();
                // A case value is either a parenthesized `ARGS` group or an
                // opaque value (bare identifier, number, etc) running up to
                // the colon (§4: `case ARGS-or-opaque COLON`).
                let value = if self.at(TokenKind::Args) {
                    self.advance().text
                } else {
                    self.capture_value_until_colon()
                };
                self.expect(TokenKind::Colon, "expected ':' after case value")?;
                let body = self.parse_body_after_colon(allow_durable)?;
                cases.push(SwitchCase {
                    value,
                    body,
                    position: case_position,
                });
            } else if self.at(TokenKind::Else) {
                self.advance();
                self.expect(TokenKind::Colon, "expected ':' after else")?;
                default = Some(self.parse_body_after_colon(allow_durable)?);
            } else {
                return Err(self.error_here("expected 'case' or 'else' in switch body".to_string()));
            }
        }
        self.expect(TokenKind::Dedent, "expected dedent to close switch body")?;

        if cases.is_empty() {
            return Err(self.error_at(position, "switch must have at least one case".to_string()));
        }

        Ok(SwitchBlock {
            discriminant,
            cases,
            default,
            position,
        })
    }

    fn parse_if(&mut self, allow_durable: bool) -> Result<IfStmt, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'if'
        let condition = self.expect_args("expected if condition")?;
        self.expect(TokenKind::Colon, "expected ':' after if condition")?;
        let body = self.parse_body_after_colon(allow_durable)?;

        let else_body = if self.at(TokenKind::Else) {
            self.advance();
            self.expect(TokenKind::Colon, "expected ':' after else")?;
            Some(self.parse_body_after_colon(allow_durable)?)
        } else {
            None
        };

        Ok(IfStmt {
            condition,
            body,
            else_body,
            position,
        })
    }

    fn parse_for(&mut self, allow_durable: bool) -> Result<ForStmt, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'for'
        let variant = if self.at(TokenKind::Colon) {
            ForVariant::Infinite
        } else {
            let args = self.expect_args("expected for condition")?;
            match split_in_field(&args) {
                Some((variable, iterable)) => ForVariant::Iteration { variable, iterable },
                None => ForVariant::Conditional { condition: args },
            }
        };
        self.expect(TokenKind::Colon, "expected ':' after for header")?;
        let body = self.parse_body_after_colon(allow_durable)?;
        Ok(ForStmt {
            variant,
            body,
            position,
        })
    }

    fn parse_return(&mut self) -> Result<ReturnStmt, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'return'
        let text = self.capture_rest_of_line();
        self.expect(TokenKind::Newline, "expected newline after return")?;
        Ok(ReturnStmt {
            value: none_if_empty(text),
            position,
        })
    }

    fn parse_close(&mut self) -> Result<CloseStmt, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'close'
        let reason = match self.peek_kind() {
            TokenKind::Completed => {
                self.advance();
                CloseReason::Completed
            }
            TokenKind::Failed => {
                self.advance();
                CloseReason::Failed
            }
            _ => CloseReason::Default,
        };
        let text = self.capture_rest_of_line();
        self.expect(TokenKind::Newline, "expected newline after close")?;
        Ok(CloseStmt {
            reason,
            value: none_if_empty(text),
            position,
        })
    }

    fn parse_continue_as_new(&mut self) -> Result<ContinueAsNewStmt, ParseError> {
        let position = self.peek().position;
        self.advance(); // 'continue_as_new'
        let args = self.expect_args("expected continue_as_new arguments")?;
        self.expect(TokenKind::Newline, "expected newline after continue_as_new")?;
        Ok(ContinueAsNewStmt { args, position })
    }

    fn parse_break(&mut self) -> Result<Statement, ParseError> {
        let position = self.peek().position;
        self.advance();
        self.expect(TokenKind::Newline, "expected newline after break")?;
        Ok(Statement::Break(position))
    }

    fn parse_continue(&mut self) -> Result<Statement, ParseError> {
        let position = self.peek().position;
        self.advance();
        self.expect(TokenKind::Newline, "expected newline after continue")?;
        Ok(Statement::Continue(position))
    }

    fn parse_comment(&mut self) -> Result<CommentNode, ParseError> {
        let position = self.peek().position;
        let text = self.advance().text;
        self.expect(TokenKind::Newline, "expected newline after comment")?;
        Ok(CommentNode { text, position })
    }

    fn parse_raw_stmt(&mut self) -> Result<RawStmt, ParseError> {
        let position = self.peek().position;
        let text = self.capture_rest_of_line();
        self.expect(TokenKind::Newline, "expected newline after statement")?;
        Ok(RawStmt { text, position })
    }
}

fn none_if_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Splits `for` header content into `(variable, iterable)` around a
/// standalone (word-boundary-delimited) `in`, without disturbing the
/// original spacing on either side.
fn split_in_field(args: &str) -> Option<(String, String)> {
    let bytes = args.as_bytes();
    let mut i = 0;
    while i + 2 <= bytes.len() {
        if &bytes[i..i + 2] == b"in" {
            let before_ok = i == 0 || !is_word_byte(bytes[i - 1]);
            let after_ok = i + 2 == bytes.len() || !is_word_byte(bytes[i + 2]);
            if before_ok && after_ok {
                let variable = args[..i].trim().to_string();
                let iterable = args[i + 2..].trim().to_string();
                if !variable.is_empty() && !iterable.is_empty() {
                    return Some((variable, iterable));
                }
            }
        }
        i += 1;
    }
    None
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
