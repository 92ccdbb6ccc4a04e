//! Recursive-descent parser.
//!
//! Never aborts: on unexpected input it reports a diagnostic and recovers
//! with one of [`Recovery::DoNothing`], [`Recovery::SkipToSemicolon`], or
//! [`Recovery::SkipToClosingBrace`], then keeps going so the rest of the
//! file still gets analyzed. [`Recorder`] is the speculative-parse
//! checkpoint used to resolve the namespace-member/statement ambiguity at
//! the top of a declaration (see `namespace_member_or_statement`).

use glint_base::{DiagnosticId, DiagnosticSink, Interner, SourceLocation};

use crate::ast::{
    AstArena, BinaryOp, Decl, DeclKind, Expr, ExprKind, FieldInit, KeywordUnaryOp, ListOp, Modifier,
    Modifiers, Name, Param, SourceUnit, Stmt, StmtKind, SwitchCase, SwitchLabel, TypeAnnotation, UnaryOp,
};
use crate::lexer::Lexer;
use crate::source::SourceCursor;
use crate::token::{Keyword, LexMode, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    DoNothing,
    SkipToSemicolon,
    SkipToClosingBrace,
}

/// A saved parser position. Rewinding restores the token stream but never
/// un-reports diagnostics already emitted along the speculative path — that
/// is intentional (§5): partially observed syntax still yields useful
/// errors.
pub struct Recorder {
    cursor: SourceCursor,
    pending: Token,
}

pub struct Parser<'ast> {
    lexer: Lexer,
    arena: &'ast AstArena,
    current: Token,
    sink_errors_reported: bool,
}

impl<'ast> Parser<'ast> {
    pub fn new(mut lexer: Lexer, arena: &'ast AstArena, interner: &mut Interner, sink: &mut DiagnosticSink) -> Self {
        let current = lexer.read(LexMode::Normal, interner, sink);
        Parser {
            lexer,
            arena,
            current,
            sink_errors_reported: false,
        }
    }

    pub fn into_source(self) -> crate::source::SourceBuffer {
        self.lexer.into_source()
    }

    // ---- token stream plumbing -------------------------------------------------

    fn bump(&mut self, interner: &mut Interner, sink: &mut DiagnosticSink) -> Token {
        std::mem::replace(&mut self.current, self.lexer.read(LexMode::Normal, interner, sink))
    }

    fn checkpoint(&self) -> Recorder {
        Recorder {
            cursor: self.lexer.save_cursor(),
            pending: self.current.clone(),
        }
    }

    fn rewind(&mut self, r: Recorder) {
        self.lexer.restore_cursor(r.cursor);
        self.current = r.pending;
    }

    fn loc(&self) -> SourceLocation {
        self.current.location.clone()
    }

    fn at_eof(&self) -> bool {
        self.current.is_eof()
    }

    fn describe_current(&self) -> String {
        format!("{:?}", self.current.kind)
    }

    fn expect(
        &mut self,
        pred: impl Fn(&TokenKind) -> bool,
        expected: &str,
        sink: &mut DiagnosticSink,
        interner: &mut Interner,
        recovery: Recovery,
    ) -> Token {
        if pred(&self.current.kind) {
            return self.bump(interner, sink);
        }
        sink.report(DiagnosticId::ParserExpectedToken, self.loc())
            .arg(expected)
            .arg(self.describe_current());
        self.sink_errors_reported = true;
        self.recover(sink, interner, recovery);
        self.current.clone()
    }

    fn recover(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner, recovery: Recovery) {
        match recovery {
            Recovery::DoNothing => {}
            Recovery::SkipToSemicolon => {
                while !matches!(self.current.kind, TokenKind::Semicolon | TokenKind::EndOfFile) {
                    self.bump(interner, sink);
                }
                if matches!(self.current.kind, TokenKind::Semicolon) {
                    self.bump(interner, sink);
                }
            }
            Recovery::SkipToClosingBrace => {
                let mut depth = 0i32;
                loop {
                    match self.current.kind {
                        TokenKind::LBrace => {
                            depth += 1;
                            self.bump(interner, sink);
                        }
                        TokenKind::RBrace => {
                            self.bump(interner, sink);
                            depth -= 1;
                            if depth <= 0 {
                                break;
                            }
                        }
                        TokenKind::EndOfFile => break,
                        _ => {
                            self.bump(interner, sink);
                        }
                    }
                }
            }
        }
    }

    fn error_expr(&self, at: SourceLocation) -> &'ast Expr<'ast> {
        self.arena.alloc(Expr {
            kind: ExprKind::Error,
            start: at.clone(),
            end: at,
        })
    }

    fn expect_identifier(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> (glint_base::StringId, SourceLocation) {
        let loc = self.loc();
        if let TokenKind::Identifier(id) = self.current.kind {
            self.bump(interner, sink);
            (id, loc)
        } else {
            sink.report(DiagnosticId::ParserExpectedName, loc.clone())
                .arg(self.describe_current());
            let placeholder = interner.put("<error>");
            (placeholder, loc)
        }
    }

    // ---- names and types --------------------------------------------------------

    fn parse_name(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> Name {
        let start = self.loc();
        let rooted = matches!(self.current.kind, TokenKind::ColonColon);
        if rooted {
            self.bump(interner, sink);
        }
        let mut segments = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::Identifier(id) => {
                    segments.push(id);
                    self.bump(interner, sink);
                }
                _ => {
                    if segments.is_empty() {
                        sink.report(DiagnosticId::ParserExpectedName, start.clone())
                            .arg(self.describe_current());
                        return Name::invalid(start);
                    }
                    break;
                }
            }
            if matches!(self.current.kind, TokenKind::ColonColon) {
                self.bump(interner, sink);
            } else {
                break;
            }
        }
        let end = self.loc();
        Name { rooted, segments, start, end }
    }

    fn parse_type(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> TypeAnnotation {
        match self.current.kind {
            TokenKind::Star => {
                self.bump(interner, sink);
                let name = self.parse_name(sink, interner);
                if name.is_invalid() {
                    TypeAnnotation::Invalid
                } else {
                    TypeAnnotation::Asterisk(name)
                }
            }
            TokenKind::Identifier(_) | TokenKind::ColonColon => {
                let name = self.parse_name(sink, interner);
                if name.is_invalid() {
                    TypeAnnotation::Invalid
                } else {
                    TypeAnnotation::Basic(name)
                }
            }
            TokenKind::Keyword(kw) if builtin_type_keyword(kw) => {
                let loc = self.loc();
                let spelling = builtin_type_spelling(kw);
                self.bump(interner, sink);
                TypeAnnotation::Basic(Name::simple(interner.put(spelling), loc))
            }
            _ => TypeAnnotation::Implicit,
        }
    }

    fn starts_type(&self) -> bool {
        matches!(self.current.kind, TokenKind::Star | TokenKind::Identifier(_) | TokenKind::ColonColon)
            || matches!(self.current.kind, TokenKind::Keyword(kw) if builtin_type_keyword(kw))
    }

    // ---- modifiers ----------------------------------------------------------------

    fn parse_modifiers(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> Modifiers {
        let mut mods = Modifiers::empty();
        loop {
            let m = match self.current.kind {
                TokenKind::Keyword(kw) => match kw.as_modifier() {
                    Some(m) => m,
                    None => break,
                },
                _ => break,
            };
            let loc = self.loc();
            self.bump(interner, sink);
            if mods.set(m) {
                sink.report(DiagnosticId::ParserModifierGivenTwice, loc)
                    .arg(format!("{m:?}"));
            }
        }
        mods
    }

    // ---- top level ------------------------------------------------------------

    pub fn parse_source_unit(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> SourceUnit<'ast> {
        let mut members = Vec::new();
        let mut statements = Vec::new();
        while !self.at_eof() {
            if matches!(self.current.kind, TokenKind::Keyword(Keyword::Module)) {
                self.bump(interner, sink);
                self.expect_identifier(sink, interner);
                self.expect(|k| matches!(k, TokenKind::LBrace), "'{'", sink, interner, Recovery::DoNothing);
                self.recover(sink, interner, Recovery::SkipToClosingBrace);
                sink.report(DiagnosticId::ParserModuleIgnored, self.loc()).arg("module");
                continue;
            }
            match self.try_namespace_member(true, sink, interner) {
                Some(decl) => members.push(&*decl),
                None => {
                    let stmt = self.parse_statement(sink, interner);
                    statements.push(&*stmt);
                }
            }
        }
        SourceUnit {
            members: self.arena.alloc_slice(members),
            statements: self.arena.alloc_slice(statements),
        }
    }

    /// Attempts to parse a namespace member starting at the current token,
    /// using a [`Recorder`] checkpoint to speculatively commit to one
    /// interpretation of the grammar's locally ambiguous prefix. Returns
    /// `None` (after rewinding) if the current token cannot start a member,
    /// letting the caller fall back to statement parsing.
    fn try_namespace_member(
        &mut self,
        top_level: bool,
        sink: &mut DiagnosticSink,
        interner: &mut Interner,
    ) -> Option<&'ast Decl<'ast>> {
        let recorder = self.checkpoint();
        let start = self.loc();
        let mods = self.parse_modifiers(sink, interner);

        match self.current.kind {
            TokenKind::Keyword(Keyword::Namespace) => Some(self.parse_namespace(start, mods, sink, interner)),
            TokenKind::Keyword(Keyword::Our) => Some(self.parse_global_variable(start, mods, sink, interner)),
            TokenKind::Keyword(Keyword::Const) => Some(self.parse_constant(start, mods, sink, interner)),
            TokenKind::Keyword(Keyword::Class) => Some(self.parse_class(start, mods, sink, interner)),
            TokenKind::Keyword(Keyword::Sub) => {
                self.bump(interner, sink);
                if matches!(self.current.kind, TokenKind::Identifier(_) | TokenKind::ColonColon) {
                    let name = self.parse_name(sink, interner);
                    Some(self.parse_function_after_name(start, mods, TypeAnnotation::Implicit, name, sink, interner))
                } else {
                    // No name after `sub` -> a closure; not a namespace member.
                    self.rewind(recorder);
                    None
                }
            }
            TokenKind::Keyword(kw) if builtin_type_keyword(kw) => {
                let ty = self.parse_type(sink, interner);
                if matches!(self.current.kind, TokenKind::Keyword(Keyword::Sub)) {
                    self.bump(interner, sink);
                    if matches!(self.current.kind, TokenKind::Identifier(_) | TokenKind::ColonColon) {
                        let name = self.parse_name(sink, interner);
                        return Some(self.parse_function_after_name(start, mods, ty, name, sink, interner));
                    }
                    self.rewind(recorder);
                    return None;
                } else if matches!(self.current.kind, TokenKind::Identifier(_) | TokenKind::ColonColon) {
                    let name = self.parse_name(sink, interner);
                    if matches!(self.current.kind, TokenKind::LParen) {
                        return Some(self.parse_function_after_name(start, mods, ty, name, sink, interner));
                    }
                    // A builtin-typed name not followed by '(' is a local
                    // variable declaration statement, not a member.
                    self.rewind(recorder);
                    None
                } else {
                    self.rewind(recorder);
                    None
                }
            }
            TokenKind::Identifier(_) | TokenKind::ColonColon if self.starts_type() => {
                let type_or_name = self.parse_name(sink, interner);
                if matches!(self.current.kind, TokenKind::Keyword(Keyword::Sub)) {
                    self.bump(interner, sink);
                    if matches!(self.current.kind, TokenKind::Identifier(_) | TokenKind::ColonColon) {
                        let name = self.parse_name(sink, interner);
                        return Some(self.parse_function_after_name(
                            start,
                            mods,
                            TypeAnnotation::Basic(type_or_name),
                            name,
                            sink,
                            interner,
                        ));
                    }
                    self.rewind(recorder);
                    return None;
                } else if matches!(self.current.kind, TokenKind::Identifier(_) | TokenKind::ColonColon) {
                    let name = self.parse_name(sink, interner);
                    if matches!(self.current.kind, TokenKind::LParen) {
                        return Some(self.parse_function_after_name(
                            start,
                            mods,
                            TypeAnnotation::Basic(type_or_name),
                            name,
                            sink,
                            interner,
                        ));
                    }
                    // Two names not followed by '(' -> a local variable
                    // declaration statement, not a member.
                    self.rewind(recorder);
                    None
                } else if matches!(self.current.kind, TokenKind::LParen) {
                    if top_level {
                        // Ambiguous with a bare call-statement; the core
                        // never allows a typeless, sub-less top-level
                        // function, so this is always a statement.
                        self.rewind(recorder);
                        None
                    } else {
                        Some(self.parse_function_after_name(
                            start,
                            mods,
                            TypeAnnotation::Implicit,
                            type_or_name,
                            sink,
                            interner,
                        ))
                    }
                } else {
                    self.rewind(recorder);
                    None
                }
            }
            _ => {
                self.rewind(recorder);
                None
            }
        }
    }

    fn parse_namespace(
        &mut self,
        start: SourceLocation,
        modifiers: Modifiers,
        sink: &mut DiagnosticSink,
        interner: &mut Interner,
    ) -> &'ast Decl<'ast> {
        let _ = modifiers;
        self.bump(interner, sink); // `namespace`
        let name = self.parse_name(sink, interner);
        let (members, end) = if matches!(self.current.kind, TokenKind::LBrace) {
            self.bump(interner, sink);
            let mut members = Vec::new();
            loop {
                if matches!(self.current.kind, TokenKind::RBrace) {
                    let end = self.loc();
                    self.bump(interner, sink);
                    break (members, end);
                }
                if self.at_eof() {
                    sink.report(DiagnosticId::ParserUnendedNamespaceDecl, self.loc())
                        .arg(spell_name(&name, interner));
                    break (members, self.loc());
                }
                match self.try_namespace_member(false, sink, interner) {
                    Some(decl) => members.push(&*decl),
                    None => {
                        sink.report(DiagnosticId::ParserExpectedNamespaceMember, self.loc())
                            .arg(self.describe_current());
                        self.recover(sink, interner, Recovery::SkipToClosingBrace);
                        break (members, self.loc());
                    }
                }
            }
        } else {
            let end = self
                .expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::DoNothing)
                .location;
            (Vec::new(), end)
        };
        self.arena.alloc(Decl {
            kind: DeclKind::Namespace {
                name,
                members: self.arena.alloc_slice(members),
            },
            start,
            end,
        })
    }

    fn parse_global_variable(
        &mut self,
        start: SourceLocation,
        _modifiers: Modifiers,
        sink: &mut DiagnosticSink,
        interner: &mut Interner,
    ) -> &'ast Decl<'ast> {
        self.bump(interner, sink); // `our`
        let ty = self.parse_type(sink, interner);
        let (name, _) = self.expect_identifier(sink, interner);
        let init = if matches!(self.current.kind, TokenKind::Eq) {
            self.bump(interner, sink);
            Some(self.parse_expression(sink, interner))
        } else {
            None
        };
        let end = self
            .expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::SkipToSemicolon)
            .location;
        self.arena.alloc(Decl {
            kind: DeclKind::GlobalVariable { ty, name, init },
            start,
            end,
        })
    }

    fn parse_constant(
        &mut self,
        start: SourceLocation,
        _modifiers: Modifiers,
        sink: &mut DiagnosticSink,
        interner: &mut Interner,
    ) -> &'ast Decl<'ast> {
        self.bump(interner, sink); // `const`
        let (name, _) = self.expect_identifier(sink, interner);
        self.expect(|k| matches!(k, TokenKind::Eq), "'='", sink, interner, Recovery::DoNothing);
        let value = self.parse_expression(sink, interner);
        let end = self
            .expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::SkipToSemicolon)
            .location;
        self.arena.alloc(Decl {
            kind: DeclKind::Constant { name, value },
            start,
            end,
        })
    }

    fn parse_function_after_name(
        &mut self,
        start: SourceLocation,
        modifiers: Modifiers,
        return_type: TypeAnnotation,
        name: Name,
        sink: &mut DiagnosticSink,
        interner: &mut Interner,
    ) -> &'ast Decl<'ast> {
        let params = self.parse_param_list(sink, interner);
        let body = if matches!(self.current.kind, TokenKind::LBrace) {
            Some(self.parse_compound_statement(sink, interner))
        } else {
            self.expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::DoNothing);
            None
        };
        let end = body.map(|b| b.end.clone()).unwrap_or_else(|| self.loc());
        self.arena.alloc(Decl {
            kind: DeclKind::Function {
                name,
                modifiers,
                params: self.arena.alloc_slice(params),
                return_type,
                body,
            },
            start,
            end,
        })
    }

    fn parse_param_list(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> Vec<Param<'ast>> {
        self.expect(|k| matches!(k, TokenKind::LParen), "'('", sink, interner, Recovery::DoNothing);
        let mut params = Vec::new();
        if !matches!(self.current.kind, TokenKind::RParen) {
            loop {
                let ty = self.parse_type(sink, interner);
                let (name, _) = self.expect_identifier(sink, interner);
                let default = if matches!(self.current.kind, TokenKind::Eq) {
                    self.bump(interner, sink);
                    Some(self.parse_expression(sink, interner))
                } else {
                    None
                };
                params.push(Param { name, ty, default });
                if matches!(self.current.kind, TokenKind::Comma) {
                    self.bump(interner, sink);
                } else {
                    break;
                }
            }
        }
        self.expect(|k| matches!(k, TokenKind::RParen), "')'", sink, interner, Recovery::DoNothing);
        params
    }

    fn parse_class(
        &mut self,
        start: SourceLocation,
        modifiers: Modifiers,
        sink: &mut DiagnosticSink,
        interner: &mut Interner,
    ) -> &'ast Decl<'ast> {
        self.bump(interner, sink); // `class`
        let (name, _) = self.expect_identifier(sink, interner);
        let mut superclasses = Vec::new();
        if matches!(self.current.kind, TokenKind::Keyword(Keyword::Inherits)) {
            self.bump(interner, sink);
            loop {
                let super_mods = self.parse_modifiers(sink, interner);
                let super_name = self.parse_name(sink, interner);
                superclasses.push((super_mods, super_name));
                if matches!(self.current.kind, TokenKind::Comma) {
                    self.bump(interner, sink);
                } else {
                    break;
                }
            }
        }
        self.expect(|k| matches!(k, TokenKind::LBrace), "'{'", sink, interner, Recovery::DoNothing);
        let mut members = Vec::new();
        loop {
            if matches!(self.current.kind, TokenKind::RBrace) {
                self.bump(interner, sink);
                break;
            }
            if self.at_eof() {
                sink.report(DiagnosticId::ParserExpectedClassMember, self.loc())
                    .arg("<eof>");
                break;
            }
            members.push(&*self.parse_class_member(sink, interner));
        }
        let end = self.loc();
        self.arena.alloc(Decl {
            kind: DeclKind::Class {
                name,
                modifiers,
                superclasses: self.arena.alloc_slice(superclasses),
                members: self.arena.alloc_slice(members),
            },
            start,
            end,
        })
    }

    fn parse_class_member(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Decl<'ast> {
        let start = self.loc();
        let modifiers = self.parse_modifiers(sink, interner);

        if matches!(self.current.kind, TokenKind::Keyword(Keyword::Const)) {
            self.bump(interner, sink);
            let (name, _) = self.expect_identifier(sink, interner);
            self.expect(|k| matches!(k, TokenKind::Eq), "'='", sink, interner, Recovery::DoNothing);
            let value = self.parse_expression(sink, interner);
            let end = self
                .expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::SkipToSemicolon)
                .location;
            return self.arena.alloc(Decl {
                kind: DeclKind::Constant { name, value },
                start,
                end,
            });
        }

        if matches!(self.current.kind, TokenKind::LBrace) {
            self.bump(interner, sink);
            let mut members = Vec::new();
            loop {
                if matches!(self.current.kind, TokenKind::RBrace) {
                    self.bump(interner, sink);
                    break;
                }
                if self.at_eof() {
                    break;
                }
                members.push(&*self.parse_class_member(sink, interner));
            }
            let end = self.loc();
            return self.arena.alloc(Decl {
                kind: DeclKind::MemberGroup {
                    modifiers,
                    members: self.arena.alloc_slice(members),
                },
                start,
                end,
            });
        }

        let return_type_or_field_type = if matches!(self.current.kind, TokenKind::Keyword(Keyword::Sub)) {
            self.bump(interner, sink);
            TypeAnnotation::Implicit
        } else {
            self.parse_type(sink, interner)
        };
        let (name, _) = self.expect_identifier(sink, interner);

        if matches!(self.current.kind, TokenKind::LParen) {
            let params = self.parse_param_list(sink, interner);
            let body = if matches!(self.current.kind, TokenKind::LBrace) {
                Some(self.parse_compound_statement(sink, interner))
            } else {
                self.expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::DoNothing);
                None
            };
            let end = body.map(|b| b.end.clone()).unwrap_or_else(|| self.loc());
            return self.arena.alloc(Decl {
                kind: DeclKind::Method {
                    name,
                    modifiers,
                    params: self.arena.alloc_slice(params),
                    return_type: return_type_or_field_type,
                    body,
                },
                start,
                end,
            });
        }

        let init = if matches!(self.current.kind, TokenKind::Eq) {
            self.bump(interner, sink);
            Some(FieldInit::Expr(self.parse_expression(sink, interner)))
        } else if matches!(self.current.kind, TokenKind::LParen) {
            Some(FieldInit::Args(self.arena.alloc_slice(self.parse_arg_list(sink, interner))))
        } else {
            None
        };
        let end = self
            .expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::SkipToSemicolon)
            .location;
        self.arena.alloc(Decl {
            kind: DeclKind::Field {
                name,
                modifiers,
                ty: return_type_or_field_type,
                init,
            },
            start,
            end,
        })
    }

    // ---- statements -----------------------------------------------------------

    fn parse_statement(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Stmt<'ast> {
        let start = self.loc();
        match self.current.kind {
            TokenKind::Semicolon => {
                self.bump(interner, sink);
                self.arena.alloc(Stmt { kind: StmtKind::Empty, start: start.clone(), end: start })
            }
            TokenKind::LBrace => self.parse_compound_statement(sink, interner),
            TokenKind::Keyword(Keyword::Return) => {
                self.bump(interner, sink);
                let value = if matches!(self.current.kind, TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression(sink, interner))
                };
                let end = self
                    .expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::SkipToSemicolon)
                    .location;
                self.arena.alloc(Stmt { kind: StmtKind::Return(value), start, end })
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if(start, sink, interner),
            TokenKind::Keyword(Keyword::Try) => self.parse_try(start, sink, interner),
            TokenKind::Keyword(Keyword::Throw) => {
                self.bump(interner, sink);
                let expr = self.parse_expression(sink, interner);
                let end = self
                    .expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::SkipToSemicolon)
                    .location;
                self.arena.alloc(Stmt { kind: StmtKind::Throw(expr), start, end })
            }
            TokenKind::Keyword(Keyword::Break) => self.simple_keyword_statement(start, StmtKind::Break, sink, interner),
            TokenKind::Keyword(Keyword::Continue) => self.simple_keyword_statement(start, StmtKind::Continue, sink, interner),
            TokenKind::Keyword(Keyword::Rethrow) => self.simple_keyword_statement(start, StmtKind::Rethrow, sink, interner),
            TokenKind::Keyword(Keyword::ThreadExit) => {
                self.simple_keyword_statement(start, StmtKind::ThreadExit, sink, interner)
            }
            TokenKind::Keyword(Keyword::OnExit) => {
                self.bump(interner, sink);
                let inner = self.parse_statement(sink, interner);
                let end = inner.end.clone();
                self.arena.alloc(Stmt { kind: StmtKind::ScopeGuard(inner), start, end })
            }
            TokenKind::Keyword(Keyword::While) => self.parse_while(start, sink, interner),
            TokenKind::Keyword(Keyword::Do) => self.parse_do_while(start, sink, interner),
            TokenKind::Keyword(Keyword::For) => self.parse_for(start, sink, interner),
            TokenKind::Keyword(Keyword::Foreach) => self.parse_foreach(start, sink, interner),
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch(start, sink, interner),
            _ => {
                let expr = self.parse_expression(sink, interner);
                let end = self
                    .expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::SkipToSemicolon)
                    .location;
                self.arena.alloc(Stmt { kind: StmtKind::Expression(expr), start, end })
            }
        }
    }

    fn simple_keyword_statement(
        &mut self,
        start: SourceLocation,
        kind: StmtKind<'ast>,
        sink: &mut DiagnosticSink,
        interner: &mut Interner,
    ) -> &'ast Stmt<'ast> {
        self.bump(interner, sink);
        let end = self
            .expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::SkipToSemicolon)
            .location;
        self.arena.alloc(Stmt { kind, start, end })
    }

    fn parse_compound_statement(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Stmt<'ast> {
        let start = self.loc();
        self.expect(|k| matches!(k, TokenKind::LBrace), "'{'", sink, interner, Recovery::DoNothing);
        let mut stmts = Vec::new();
        while !matches!(self.current.kind, TokenKind::RBrace) && !self.at_eof() {
            stmts.push(&*self.parse_statement(sink, interner));
        }
        let end = self.loc();
        self.expect(|k| matches!(k, TokenKind::RBrace), "'}'", sink, interner, Recovery::DoNothing);
        self.arena.alloc(Stmt {
            kind: StmtKind::Compound(self.arena.alloc_slice(stmts)),
            start,
            end,
        })
    }

    fn parse_if(&mut self, start: SourceLocation, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Stmt<'ast> {
        self.bump(interner, sink);
        self.expect(|k| matches!(k, TokenKind::LParen), "'('", sink, interner, Recovery::DoNothing);
        let cond = self.parse_expression(sink, interner);
        self.expect(|k| matches!(k, TokenKind::RParen), "')'", sink, interner, Recovery::DoNothing);
        let then_branch = self.parse_statement(sink, interner);
        let (else_branch, end) = if matches!(self.current.kind, TokenKind::Keyword(Keyword::Else)) {
            self.bump(interner, sink);
            let e = self.parse_statement(sink, interner);
            (Some(e), e.end.clone())
        } else {
            (None, then_branch.end.clone())
        };
        self.arena.alloc(Stmt {
            kind: StmtKind::If { cond, then_branch, else_branch },
            start,
            end,
        })
    }

    fn parse_try(&mut self, start: SourceLocation, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Stmt<'ast> {
        self.bump(interner, sink);
        let body = self.parse_compound_statement(sink, interner);
        self.expect(|k| matches!(k, TokenKind::Keyword(Keyword::Catch)), "'catch'", sink, interner, Recovery::DoNothing);
        let catch_var = if matches!(self.current.kind, TokenKind::LParen) {
            self.bump(interner, sink);
            let (name, _) = self.expect_identifier(sink, interner);
            self.expect(|k| matches!(k, TokenKind::RParen), "')'", sink, interner, Recovery::DoNothing);
            Some(name)
        } else {
            None
        };
        let catch_body = self.parse_compound_statement(sink, interner);
        let end = catch_body.end.clone();
        self.arena.alloc(Stmt {
            kind: StmtKind::Try { body, catch_var, catch_body },
            start,
            end,
        })
    }

    fn parse_while(&mut self, start: SourceLocation, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Stmt<'ast> {
        self.bump(interner, sink);
        self.expect(|k| matches!(k, TokenKind::LParen), "'('", sink, interner, Recovery::DoNothing);
        let cond = self.parse_expression(sink, interner);
        self.expect(|k| matches!(k, TokenKind::RParen), "')'", sink, interner, Recovery::DoNothing);
        let body = self.parse_statement(sink, interner);
        let end = body.end.clone();
        self.arena.alloc(Stmt { kind: StmtKind::While { cond, body }, start, end })
    }

    fn parse_do_while(&mut self, start: SourceLocation, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Stmt<'ast> {
        self.bump(interner, sink);
        let body = self.parse_statement(sink, interner);
        self.expect(|k| matches!(k, TokenKind::Keyword(Keyword::While)), "'while'", sink, interner, Recovery::DoNothing);
        self.expect(|k| matches!(k, TokenKind::LParen), "'('", sink, interner, Recovery::DoNothing);
        let cond = self.parse_expression(sink, interner);
        self.expect(|k| matches!(k, TokenKind::RParen), "')'", sink, interner, Recovery::DoNothing);
        let end = self
            .expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::SkipToSemicolon)
            .location;
        self.arena.alloc(Stmt { kind: StmtKind::DoWhile { body, cond }, start, end })
    }

    fn parse_for(&mut self, start: SourceLocation, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Stmt<'ast> {
        self.bump(interner, sink);
        self.expect(|k| matches!(k, TokenKind::LParen), "'('", sink, interner, Recovery::DoNothing);
        let init = if matches!(self.current.kind, TokenKind::Semicolon) {
            None
        } else {
            let s = self.loc();
            let e = self.parse_expression(sink, interner);
            Some(&*self.arena.alloc(Stmt { kind: StmtKind::Expression(e), start: s, end: e.end.clone() }))
        };
        self.expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::DoNothing);
        let cond = if matches!(self.current.kind, TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(sink, interner))
        };
        self.expect(|k| matches!(k, TokenKind::Semicolon), "';'", sink, interner, Recovery::DoNothing);
        let step = if matches!(self.current.kind, TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression(sink, interner))
        };
        self.expect(|k| matches!(k, TokenKind::RParen), "')'", sink, interner, Recovery::DoNothing);
        let body = self.parse_statement(sink, interner);
        let end = body.end.clone();
        self.arena.alloc(Stmt { kind: StmtKind::For { init, cond, step, body }, start, end })
    }

    fn parse_foreach(&mut self, start: SourceLocation, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Stmt<'ast> {
        self.bump(interner, sink);
        self.expect(|k| matches!(k, TokenKind::LParen), "'('", sink, interner, Recovery::DoNothing);
        let var = self.parse_prefix(sink, interner);
        self.expect(|k| matches!(k, TokenKind::Keyword(Keyword::In)), "'in'", sink, interner, Recovery::DoNothing);
        let iterable = self.parse_expression(sink, interner);
        self.expect(|k| matches!(k, TokenKind::RParen), "')'", sink, interner, Recovery::DoNothing);
        let body = self.parse_statement(sink, interner);
        let end = body.end.clone();
        self.arena.alloc(Stmt { kind: StmtKind::Foreach { var, iterable, body }, start, end })
    }

    fn parse_switch(&mut self, start: SourceLocation, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Stmt<'ast> {
        self.bump(interner, sink);
        self.expect(|k| matches!(k, TokenKind::LParen), "'('", sink, interner, Recovery::DoNothing);
        let scrutinee = self.parse_expression(sink, interner);
        self.expect(|k| matches!(k, TokenKind::RParen), "')'", sink, interner, Recovery::DoNothing);
        self.expect(|k| matches!(k, TokenKind::LBrace), "'{'", sink, interner, Recovery::DoNothing);
        let mut cases = Vec::new();
        while matches!(
            self.current.kind,
            TokenKind::Keyword(Keyword::Case) | TokenKind::Keyword(Keyword::Default)
        ) {
            let label = if matches!(self.current.kind, TokenKind::Keyword(Keyword::Case)) {
                self.bump(interner, sink);
                let e = self.parse_expression(sink, interner);
                SwitchLabel::Case(e)
            } else {
                self.bump(interner, sink);
                SwitchLabel::Default
            };
            self.expect(|k| matches!(k, TokenKind::Colon), "':'", sink, interner, Recovery::DoNothing);
            let mut body = Vec::new();
            while !matches!(
                self.current.kind,
                TokenKind::Keyword(Keyword::Case) | TokenKind::Keyword(Keyword::Default) | TokenKind::RBrace
            ) && !self.at_eof()
            {
                body.push(&*self.parse_statement(sink, interner));
            }
            cases.push(SwitchCase { label, body: self.arena.alloc_slice(body) });
        }
        let end = self.loc();
        self.expect(|k| matches!(k, TokenKind::RBrace), "'}'", sink, interner, Recovery::DoNothing);
        self.arena.alloc(Stmt {
            kind: StmtKind::Switch { scrutinee, cases: self.arena.alloc_slice(cases) },
            start,
            end,
        })
    }

    // ---- expressions -----------------------------------------------------------

    pub fn parse_expression(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        self.parse_assignment(sink, interner)
    }

    fn parse_assignment(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        let lhs = self.parse_conditional(sink, interner);
        let op = match self.current.kind {
            TokenKind::Eq => Some(None),
            TokenKind::PlusEq => Some(Some(BinaryOp::Add)),
            TokenKind::MinusEq => Some(Some(BinaryOp::Sub)),
            TokenKind::StarEq => Some(Some(BinaryOp::Mul)),
            TokenKind::SlashEq => Some(Some(BinaryOp::Div)),
            TokenKind::PercentEq => Some(Some(BinaryOp::Mod)),
            TokenKind::AmpEq => Some(Some(BinaryOp::BitAnd)),
            TokenKind::CaretEq => Some(Some(BinaryOp::BitXor)),
            TokenKind::PipeEq => Some(Some(BinaryOp::BitOr)),
            TokenKind::ShlEq => Some(Some(BinaryOp::Shl)),
            TokenKind::ShrEq => Some(Some(BinaryOp::Shr)),
            _ => None,
        };
        match op {
            Some(op) => {
                self.bump(interner, sink);
                let rhs = self.parse_assignment(sink, interner);
                self.arena.alloc(Expr {
                    start: lhs.start.clone(),
                    end: rhs.end.clone(),
                    kind: ExprKind::Assignment { op, lhs, rhs },
                })
            }
            None => lhs,
        }
    }

    fn parse_conditional(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        let cond = self.parse_coalescing(sink, interner);
        if matches!(self.current.kind, TokenKind::Question) {
            self.bump(interner, sink);
            let then_expr = self.parse_expression(sink, interner);
            self.expect(|k| matches!(k, TokenKind::Colon), "':'", sink, interner, Recovery::DoNothing);
            let else_expr = self.parse_conditional(sink, interner);
            return self.arena.alloc(Expr {
                start: cond.start.clone(),
                end: else_expr.end.clone(),
                kind: ExprKind::Conditional { cond, then_expr, else_expr },
            });
        }
        cond
    }

    fn parse_coalescing(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        let lhs = self.parse_logical_or(sink, interner);
        match self.current.kind {
            TokenKind::QuestionQuestion | TokenKind::QuestionStar => {
                let op = if matches!(self.current.kind, TokenKind::QuestionQuestion) {
                    BinaryOp::Coalesce
                } else {
                    BinaryOp::CoalesceAsterisk
                };
                self.bump(interner, sink);
                let rhs = self.parse_coalescing(sink, interner);
                self.binary(lhs, op, rhs)
            }
            _ => lhs,
        }
    }

    fn binary(&self, lhs: &'ast Expr<'ast>, op: BinaryOp, rhs: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        self.arena.alloc(Expr {
            start: lhs.start.clone(),
            end: rhs.end.clone(),
            kind: ExprKind::Binary { op, lhs, rhs },
        })
    }

    fn parse_left_assoc(
        &mut self,
        sink: &mut DiagnosticSink,
        interner: &mut Interner,
        next: fn(&mut Self, &mut DiagnosticSink, &mut Interner) -> &'ast Expr<'ast>,
        ops: &[(TokenKind, BinaryOp)],
    ) -> &'ast Expr<'ast> {
        let mut lhs = next(self, sink, interner);
        loop {
            let matched = ops.iter().find(|(tok, _)| std::mem::discriminant(tok) == std::mem::discriminant(&self.current.kind));
            match matched {
                Some((_, op)) => {
                    self.bump(interner, sink);
                    let rhs = next(self, sink, interner);
                    lhs = self.binary(lhs, *op, rhs);
                }
                None => break,
            }
        }
        lhs
    }

    fn parse_logical_or(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        self.parse_left_assoc(sink, interner, Self::parse_logical_and, &[(TokenKind::OrOr, BinaryOp::Or)])
    }

    fn parse_logical_and(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        self.parse_left_assoc(sink, interner, Self::parse_bit_or, &[(TokenKind::AndAnd, BinaryOp::And)])
    }

    fn parse_bit_or(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        self.parse_left_assoc(sink, interner, Self::parse_bit_xor, &[(TokenKind::Pipe, BinaryOp::BitOr)])
    }

    fn parse_bit_xor(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        self.parse_left_assoc(sink, interner, Self::parse_bit_and, &[(TokenKind::Caret, BinaryOp::BitXor)])
    }

    fn parse_bit_and(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        self.parse_left_assoc(sink, interner, Self::parse_equality, &[(TokenKind::Amp, BinaryOp::BitAnd)])
    }

    fn parse_equality(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        self.parse_left_assoc(
            sink,
            interner,
            Self::parse_instanceof,
            &[
                (TokenKind::EqEq, BinaryOp::Eq),
                (TokenKind::NotEq, BinaryOp::Ne),
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::LtEq, BinaryOp::Le),
                (TokenKind::Gt, BinaryOp::Gt),
                (TokenKind::GtEq, BinaryOp::Ge),
                (TokenKind::RegexMatch, BinaryOp::RegexMatch),
                (TokenKind::RegexNotMatch, BinaryOp::RegexNotMatch),
            ],
        )
    }

    fn parse_instanceof(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        let mut lhs = self.parse_shift(sink, interner);
        while matches!(self.current.kind, TokenKind::Keyword(Keyword::Instanceof)) {
            self.bump(interner, sink);
            let class_name = self.parse_name(sink, interner);
            lhs = self.arena.alloc(Expr {
                start: lhs.start.clone(),
                end: class_name.end.clone(),
                kind: ExprKind::Instanceof { expr: lhs, class_name },
            });
        }
        lhs
    }

    fn parse_shift(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        self.parse_left_assoc(
            sink,
            interner,
            Self::parse_additive,
            &[(TokenKind::Shl, BinaryOp::Shl), (TokenKind::Shr, BinaryOp::Shr)],
        )
    }

    fn parse_additive(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        self.parse_left_assoc(
            sink,
            interner,
            Self::parse_multiplicative,
            &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
        )
    }

    fn parse_multiplicative(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        self.parse_left_assoc(
            sink,
            interner,
            Self::parse_prefix,
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Mod),
            ],
        )
    }

    fn parse_prefix(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        let start = self.loc();
        let unary_op = match self.current.kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Backslash => Some(UnaryOp::Ref),
            TokenKind::PlusPlus => Some(UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = unary_op {
            self.bump(interner, sink);
            let operand = self.parse_prefix(sink, interner);
            return self.arena.alloc(Expr {
                start,
                end: operand.end.clone(),
                kind: ExprKind::Unary { op, operand },
            });
        }
        if let Some(kw_op) = keyword_unary_op(&self.current.kind) {
            self.bump(interner, sink);
            let takes_operand = !matches!(self.current.kind, TokenKind::Semicolon | TokenKind::RParen | TokenKind::Comma);
            let operand = if takes_operand {
                Some(self.parse_prefix(sink, interner))
            } else {
                None
            };
            let end = operand.as_ref().map(|e| e.end.clone()).unwrap_or_else(|| self.loc());
            return self.arena.alloc(Expr {
                start,
                end,
                kind: ExprKind::KeywordUnary { op: kw_op, operand },
            });
        }
        if let Some(list_op) = list_op_keyword(&self.current.kind) {
            self.bump(interner, sink);
            let args = self.parse_arg_list(sink, interner);
            let end = self.loc();
            return self.arena.alloc(Expr {
                start,
                end,
                kind: ExprKind::ListOperation { op: list_op, args: self.arena.alloc_slice(args) },
            });
        }
        self.parse_postfix(sink, interner)
    }

    fn parse_postfix(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        let mut expr = self.parse_primary(sink, interner);
        loop {
            match self.current.kind {
                TokenKind::LParen => {
                    let args = self.parse_arg_list(sink, interner);
                    let end = self.loc();
                    expr = self.arena.alloc(Expr {
                        start: expr.start.clone(),
                        end,
                        kind: ExprKind::Call { callee: expr, args: self.arena.alloc_slice(args) },
                    });
                }
                TokenKind::LBracket => {
                    self.bump(interner, sink);
                    let index = self.parse_expression(sink, interner);
                    let end = self
                        .expect(|k| matches!(k, TokenKind::RBracket), "']'", sink, interner, Recovery::DoNothing)
                        .location;
                    expr = self.arena.alloc(Expr {
                        start: expr.start.clone(),
                        end,
                        kind: ExprKind::Index { base: expr, index },
                    });
                }
                TokenKind::Dot => {
                    self.bump(interner, sink);
                    let (member, member_loc) = self.expect_identifier(sink, interner);
                    expr = self.arena.alloc(Expr {
                        start: expr.start.clone(),
                        end: member_loc,
                        kind: ExprKind::Access { base: expr, member },
                    });
                }
                TokenKind::PlusPlus => {
                    let end = self.loc();
                    self.bump(interner, sink);
                    expr = self.arena.alloc(Expr {
                        start: expr.start.clone(),
                        end,
                        kind: ExprKind::Unary { op: UnaryOp::PostInc, operand: expr },
                    });
                }
                TokenKind::MinusMinus => {
                    let end = self.loc();
                    self.bump(interner, sink);
                    expr = self.arena.alloc(Expr {
                        start: expr.start.clone(),
                        end,
                        kind: ExprKind::Unary { op: UnaryOp::PostDec, operand: expr },
                    });
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_arg_list(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> Vec<&'ast Expr<'ast>> {
        self.expect(|k| matches!(k, TokenKind::LParen), "'('", sink, interner, Recovery::DoNothing);
        let mut args = Vec::new();
        if !matches!(self.current.kind, TokenKind::RParen) {
            loop {
                args.push(&*self.parse_expression(sink, interner));
                if matches!(self.current.kind, TokenKind::Comma) {
                    self.bump(interner, sink);
                } else {
                    break;
                }
            }
        }
        self.expect(|k| matches!(k, TokenKind::RParen), "')'", sink, interner, Recovery::DoNothing);
        args
    }

    fn parse_primary(&mut self, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        let start = self.loc();
        match self.current.kind {
            TokenKind::IntLiteral(v) => {
                self.bump(interner, sink);
                self.arena.alloc(Expr { start: start.clone(), end: start, kind: ExprKind::IntLiteral(v) })
            }
            TokenKind::FloatLiteral(v) => {
                self.bump(interner, sink);
                self.arena.alloc(Expr { start: start.clone(), end: start, kind: ExprKind::FloatLiteral(v) })
            }
            TokenKind::StringLiteral(id) => {
                self.bump(interner, sink);
                self.arena.alloc(Expr { start: start.clone(), end: start, kind: ExprKind::StringLiteral(id) })
            }
            TokenKind::BinaryLiteral(id) => {
                self.bump(interner, sink);
                self.arena.alloc(Expr { start: start.clone(), end: start, kind: ExprKind::BinaryLiteral(id) })
            }
            TokenKind::DateLiteral(id) => {
                self.bump(interner, sink);
                self.arena.alloc(Expr { start: start.clone(), end: start, kind: ExprKind::DateLiteral(id) })
            }
            TokenKind::RegexLiteral(id) => {
                self.bump(interner, sink);
                self.arena.alloc(Expr {
                    start: start.clone(),
                    end: start,
                    kind: ExprKind::Regex { pattern: id, negated: false },
                })
            }
            TokenKind::Keyword(Keyword::Nothing) => {
                self.bump(interner, sink);
                self.arena.alloc(Expr { start: start.clone(), end: start, kind: ExprKind::NothingLiteral })
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.bump(interner, sink);
                self.arena.alloc(Expr { start: start.clone(), end: start, kind: ExprKind::NullLiteral })
            }
            TokenKind::Keyword(Keyword::True) => {
                self.bump(interner, sink);
                self.arena.alloc(Expr { start: start.clone(), end: start, kind: ExprKind::BoolLiteral(true) })
            }
            TokenKind::Keyword(Keyword::False) => {
                self.bump(interner, sink);
                self.arena.alloc(Expr { start: start.clone(), end: start, kind: ExprKind::BoolLiteral(false) })
            }
            TokenKind::Keyword(Keyword::SelfKw) => {
                self.bump(interner, sink);
                self.arena.alloc(Expr { start: start.clone(), end: start, kind: ExprKind::SelfExpr })
            }
            TokenKind::Keyword(Keyword::Cast) => {
                self.bump(interner, sink);
                self.expect(|k| matches!(k, TokenKind::Lt), "'<'", sink, interner, Recovery::DoNothing);
                let ty = self.parse_type(sink, interner);
                self.expect(|k| matches!(k, TokenKind::Gt), "'>'", sink, interner, Recovery::DoNothing);
                self.expect(|k| matches!(k, TokenKind::LParen), "'('", sink, interner, Recovery::DoNothing);
                let expr = self.parse_expression(sink, interner);
                let end = self
                    .expect(|k| matches!(k, TokenKind::RParen), "')'", sink, interner, Recovery::DoNothing)
                    .location;
                self.arena.alloc(Expr { start, end, kind: ExprKind::Cast { ty, expr } })
            }
            TokenKind::Keyword(Keyword::New) => {
                self.bump(interner, sink);
                let class_name = self.parse_name(sink, interner);
                let args = self.parse_arg_list(sink, interner);
                let end = self.loc();
                self.arena.alloc(Expr {
                    start,
                    end,
                    kind: ExprKind::New { class_name, args: self.arena.alloc_slice(args) },
                })
            }
            TokenKind::Keyword(Keyword::Sub) => self.parse_closure(start, sink, interner),
            TokenKind::LParen => {
                self.bump(interner, sink);
                let expr = self.parse_expression(sink, interner);
                self.expect(|k| matches!(k, TokenKind::RParen), "')'", sink, interner, Recovery::DoNothing);
                expr
            }
            TokenKind::LBracket => {
                self.bump(interner, sink);
                let mut items = Vec::new();
                if !matches!(self.current.kind, TokenKind::RBracket) {
                    loop {
                        items.push(&*self.parse_expression(sink, interner));
                        if matches!(self.current.kind, TokenKind::Comma) {
                            self.bump(interner, sink);
                        } else {
                            break;
                        }
                    }
                }
                let end = self
                    .expect(|k| matches!(k, TokenKind::RBracket), "']'", sink, interner, Recovery::DoNothing)
                    .location;
                self.arena.alloc(Expr { start, end, kind: ExprKind::List(self.arena.alloc_slice(items)) })
            }
            TokenKind::LBrace => {
                self.bump(interner, sink);
                let mut pairs = Vec::new();
                if !matches!(self.current.kind, TokenKind::RBrace) {
                    loop {
                        let key = self.parse_expression(sink, interner);
                        self.expect(|k| matches!(k, TokenKind::Colon), "':'", sink, interner, Recovery::DoNothing);
                        let value = self.parse_expression(sink, interner);
                        pairs.push((key, value));
                        if matches!(self.current.kind, TokenKind::Comma) {
                            self.bump(interner, sink);
                        } else {
                            break;
                        }
                    }
                }
                let end = self
                    .expect(|k| matches!(k, TokenKind::RBrace), "'}'", sink, interner, Recovery::DoNothing)
                    .location;
                self.arena.alloc(Expr { start, end, kind: ExprKind::Hash(self.arena.alloc_slice(pairs)) })
            }
            TokenKind::Identifier(_) | TokenKind::ColonColon => {
                // A type followed by an identifier is a local variable
                // declaration expression (`T x`); otherwise it's a name
                // reference.
                let recorder = self.checkpoint();
                let name = self.parse_name(sink, interner);
                if matches!(self.current.kind, TokenKind::Identifier(_)) {
                    self.rewind(recorder);
                    return self.parse_var_decl(start, sink, interner);
                }
                self.arena.alloc(Expr {
                    start: start.clone(),
                    end: name.end.clone(),
                    kind: ExprKind::Name(name),
                })
            }
            TokenKind::Keyword(kw) if builtin_type_keyword(kw) => self.parse_var_decl(start, sink, interner),
            TokenKind::Star => self.parse_var_decl(start, sink, interner),
            _ => {
                sink.report(DiagnosticId::ParserExpectedPrimaryExpression, start.clone())
                    .arg(self.describe_current());
                self.bump(interner, sink);
                self.error_expr(start)
            }
        }
    }

    fn parse_var_decl(&mut self, start: SourceLocation, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        let ty = self.parse_type(sink, interner);
        if !matches!(self.current.kind, TokenKind::Identifier(_)) {
            sink.report(DiagnosticId::ParserExpectedVariableName, self.loc())
                .arg(self.describe_current());
            return self.error_expr(start);
        }
        let (name, end) = self.expect_identifier(sink, interner);
        self.arena.alloc(Expr { start, end, kind: ExprKind::VarDecl { ty, name } })
    }

    fn parse_closure(&mut self, start: SourceLocation, sink: &mut DiagnosticSink, interner: &mut Interner) -> &'ast Expr<'ast> {
        self.bump(interner, sink); // `sub`
        let params = self.parse_param_list(sink, interner);
        let return_type = TypeAnnotation::Implicit;
        let body = self.parse_compound_statement(sink, interner);
        let end = body.end.clone();
        self.arena.alloc(Expr {
            start,
            end,
            kind: ExprKind::Closure { params: self.arena.alloc_slice(params), return_type, body },
        })
    }
}

fn builtin_type_keyword(kw: Keyword) -> bool {
    matches!(
        kw,
        Keyword::Int | Keyword::StringTy | Keyword::Bool | Keyword::Any | Keyword::SoftInt | Keyword::SoftString | Keyword::SoftBool
    )
}

fn builtin_type_spelling(kw: Keyword) -> &'static str {
    match kw {
        Keyword::Int => "int",
        Keyword::StringTy => "string",
        Keyword::Bool => "bool",
        Keyword::Any => "any",
        Keyword::SoftInt => "softint",
        Keyword::SoftString => "softstring",
        Keyword::SoftBool => "softbool",
        _ => unreachable!("not a builtin type keyword"),
    }
}

fn keyword_unary_op(kind: &TokenKind) -> Option<KeywordUnaryOp> {
    let TokenKind::Keyword(kw) = kind else { return None };
    Some(match kw {
        Keyword::Elements => KeywordUnaryOp::Elements,
        Keyword::Keys => KeywordUnaryOp::Keys,
        Keyword::Shift => KeywordUnaryOp::Shift,
        Keyword::Pop => KeywordUnaryOp::Pop,
        Keyword::Chomp => KeywordUnaryOp::Chomp,
        Keyword::Trim => KeywordUnaryOp::Trim,
        Keyword::Background => KeywordUnaryOp::Background,
        Keyword::Delete => KeywordUnaryOp::Delete,
        Keyword::Remove => KeywordUnaryOp::Remove,
        Keyword::Exists => KeywordUnaryOp::Exists,
        _ => return None,
    })
}

fn list_op_keyword(kind: &TokenKind) -> Option<ListOp> {
    let TokenKind::Keyword(kw) = kind else { return None };
    Some(match kw {
        Keyword::Unshift => ListOp::Unshift,
        Keyword::Push => ListOp::Push,
        Keyword::Splice => ListOp::Splice,
        Keyword::Extract => ListOp::Extract,
        Keyword::Map => ListOp::Map,
        Keyword::Foldr => ListOp::Foldr,
        Keyword::Foldl => ListOp::Foldl,
        Keyword::Select => ListOp::Select,
        _ => return None,
    })
}

fn spell_name(name: &Name, interner: &Interner) -> String {
    let mut out = String::new();
    if name.rooted {
        out.push_str("::");
    }
    for (i, seg) in name.segments.iter().enumerate() {
        if i > 0 {
            out.push_str("::");
        }
        out.push_str(interner.get(*seg));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_base::SourceInfo;

    fn parse(text: &str) -> (SourceUnit<'static>, bool) {
        let arena = Box::leak(Box::new(AstArena::new()));
        let src = crate::source::SourceBuffer::new(SourceInfo::new("t", "t"), text.as_bytes()).unwrap();
        let mut interner = Interner::new();
        let mut sink = DiagnosticSink::new();
        let lexer = Lexer::new(src);
        let mut parser = Parser::new(lexer, arena, &mut interner, &mut sink);
        let unit = parser.parse_source_unit(&mut sink, &mut interner);
        (unit, sink.had_error())
    }

    #[test]
    fn parses_call_statement() {
        let (unit, had_error) = parse("print(\"hello\");\n");
        assert!(!had_error);
        assert_eq!(unit.statements.len(), 1);
        assert!(matches!(unit.statements[0].kind, StmtKind::Expression(_)));
    }

    #[test]
    fn parses_global_variable_and_assignment() {
        let (unit, had_error) = parse("our int x; x = 5;");
        assert!(!had_error);
        assert_eq!(unit.members.len(), 1);
        assert!(matches!(unit.members[0].kind, DeclKind::GlobalVariable { .. }));
        assert_eq!(unit.statements.len(), 1);
    }

    #[test]
    fn parses_local_var_decl_with_conversion_needed() {
        let (unit, had_error) = parse("string s = 1;");
        assert!(!had_error);
        assert_eq!(unit.statements.len(), 1);
        if let StmtKind::Expression(e) = &unit.statements[0].kind {
            assert!(matches!(e.kind, ExprKind::Assignment { .. }));
        } else {
            panic!("expected expression statement");
        }
    }

    #[test]
    fn parses_nested_namespace_merge_candidates() {
        let (unit, had_error) = parse("namespace A { class C {} }\nnamespace A { our int v; }\n");
        assert!(!had_error);
        assert_eq!(unit.members.len(), 2);
        assert!(unit.members.iter().all(|m| matches!(m.kind, DeclKind::Namespace { .. })));
    }

    #[test]
    fn parses_try_catch() {
        let (unit, had_error) = parse("try { throw 1; } catch (e) { print(e); }");
        assert!(!had_error);
        assert_eq!(unit.statements.len(), 1);
        assert!(matches!(unit.statements[0].kind, StmtKind::Try { .. }));
    }

    #[test]
    fn parses_function_declaration() {
        let (unit, had_error) = parse("int add(int a, int b) { return a + b; }");
        assert!(!had_error);
        assert_eq!(unit.members.len(), 1);
        assert!(matches!(unit.members[0].kind, DeclKind::Function { .. }));
    }

    #[test]
    fn parses_class_with_inherits_and_field() {
        let (unit, had_error) = parse("class C inherits B { private int x = 1; }");
        assert!(!had_error);
        assert_eq!(unit.members.len(), 1);
        if let DeclKind::Class { superclasses, members, .. } = &unit.members[0].kind {
            assert_eq!(superclasses.len(), 1);
            assert_eq!(members.len(), 1);
        } else {
            panic!("expected class");
        }
    }

    #[test]
    fn recovers_from_bad_token_and_keeps_parsing() {
        let (unit, had_error) = parse("our int ; print(1);");
        assert!(had_error);
        // recovery must still let the next statement parse
        assert!(unit.statements.len() + unit.members.len() >= 1);
    }

    #[test]
    fn parses_unary_and_binary_precedence() {
        let (unit, had_error) = parse("1 + 2 * 3;");
        assert!(!had_error);
        if let StmtKind::Expression(e) = &unit.statements[0].kind {
            if let ExprKind::Binary { op: BinaryOp::Add, rhs, .. } = &e.kind {
                assert!(matches!(rhs.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
            } else {
                panic!("expected top-level add");
            }
        } else {
            panic!("expected expression statement");
        }
    }
}
