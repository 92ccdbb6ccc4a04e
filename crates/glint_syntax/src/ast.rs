//! Untyped syntax tree produced by the parser.
//!
//! Every node is bump-allocated out of one [`AstArena`] per compilation
//! unit; children are referenced by arena-lifetime `&'a` pointers instead
//! of the shared-pointer/enable-shared-from-this graph a naive port would
//! reach for. There is no back-pointer to a node's parent — anything that
//! needs one (name resolution's enclosing-scope walk) carries it
//! explicitly as a separate value instead.

use bumpalo::Bump;
use glint_base::{SourceLocation, StringId};

/// Owns the bump allocator backing one parsed source unit. Every `&'a`
/// reference produced by the parser borrows from this arena.
pub struct AstArena {
    bump: Bump,
}

impl AstArena {
    pub fn new() -> Self {
        AstArena { bump: Bump::new() }
    }

    pub fn alloc<T>(&self, value: T) -> &T {
        self.bump.alloc(value)
    }

    pub fn alloc_slice<T>(&self, items: Vec<T>) -> &[T] {
        self.bump.alloc_slice_fill_iter(items)
    }
}

impl Default for AstArena {
    fn default() -> Self {
        Self::new()
    }
}

/// A bit set over the seven declaration modifiers. The parser reports a
/// duplicate-modifier diagnostic on repeat but keeps every bit the user
/// wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Abstract = 1 << 0,
    Deprecated = 1 << 1,
    Final = 1 << 2,
    Private = 1 << 3,
    Public = 1 << 4,
    Static = 1 << 5,
    Synchronized = 1 << 6,
}

impl Modifiers {
    pub fn empty() -> Self {
        Modifiers(0)
    }

    /// Sets `m`, returning whether it was already set (the caller uses this
    /// to decide whether to report a duplicate-modifier diagnostic).
    pub fn set(&mut self, m: Modifier) -> bool {
        let bit = m as u8;
        let was_set = self.0 & bit != 0;
        self.0 |= bit;
        was_set
    }

    pub fn has(&self, m: Modifier) -> bool {
        self.0 & (m as u8) != 0
    }
}

/// A possibly-qualified identifier path, e.g. `A::B::c` or `::A::c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub rooted: bool,
    pub segments: Vec<StringId>,
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl Name {
    /// An empty, invalid name carrying only its start location (per the
    /// parser's error-recovery contract).
    pub fn invalid(start: SourceLocation) -> Self {
        Name {
            rooted: false,
            segments: Vec::new(),
            start: start.clone(),
            end: start,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn simple(segment: StringId, loc: SourceLocation) -> Self {
        Name {
            rooted: false,
            segments: vec![segment],
            start: loc.clone(),
            end: loc,
        }
    }

    /// The single segment this name consists of, if it is unqualified and
    /// not root-anchored.
    pub fn as_simple(&self) -> Option<StringId> {
        if !self.rooted && self.segments.len() == 1 {
            Some(self.segments[0])
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeAnnotation {
    Implicit,
    Invalid,
    Basic(Name),
    Asterisk(Name),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    Ref,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    RegexMatch,
    RegexNotMatch,
    Coalesce,
    CoalesceAsterisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOp {
    Unshift,
    Push,
    Splice,
    Extract,
    Map,
    Foldr,
    Foldl,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordUnaryOp {
    Elements,
    Keys,
    Shift,
    Pop,
    Chomp,
    Trim,
    Background,
    Delete,
    Remove,
    Exists,
}

pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub start: SourceLocation,
    pub end: SourceLocation,
}

pub enum ExprKind<'a> {
    Error,
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(StringId),
    BoolLiteral(bool),
    NothingLiteral,
    NullLiteral,
    DateLiteral(StringId),
    BinaryLiteral(StringId),
    SelfExpr,
    Name(Name),
    List(&'a [&'a Expr<'a>]),
    Hash(&'a [(&'a Expr<'a>, &'a Expr<'a>)]),
    VarDecl {
        ty: TypeAnnotation,
        name: StringId,
    },
    Cast {
        ty: TypeAnnotation,
        expr: &'a Expr<'a>,
    },
    Call {
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    },
    Unary {
        op: UnaryOp,
        operand: &'a Expr<'a>,
    },
    KeywordUnary {
        op: KeywordUnaryOp,
        operand: Option<&'a Expr<'a>>,
    },
    Index {
        base: &'a Expr<'a>,
        index: &'a Expr<'a>,
    },
    Access {
        base: &'a Expr<'a>,
        member: StringId,
    },
    New {
        class_name: Name,
        args: &'a [&'a Expr<'a>],
    },
    Binary {
        op: BinaryOp,
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
    },
    Instanceof {
        expr: &'a Expr<'a>,
        class_name: Name,
    },
    Conditional {
        cond: &'a Expr<'a>,
        then_expr: &'a Expr<'a>,
        else_expr: &'a Expr<'a>,
    },
    Assignment {
        /// `None` for plain `=`; `Some(op)` for `op=` compound assignment.
        op: Option<BinaryOp>,
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
    },
    ListOperation {
        op: ListOp,
        args: &'a [&'a Expr<'a>],
    },
    Regex {
        pattern: StringId,
        negated: bool,
    },
    Closure {
        params: &'a [Param<'a>],
        return_type: TypeAnnotation,
        body: &'a Stmt<'a>,
    },
}

pub struct Param<'a> {
    pub name: StringId,
    pub ty: TypeAnnotation,
    pub default: Option<&'a Expr<'a>>,
}

pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub start: SourceLocation,
    pub end: SourceLocation,
}

pub enum StmtKind<'a> {
    Empty,
    Expression(&'a Expr<'a>),
    Compound(&'a [&'a Stmt<'a>]),
    Return(Option<&'a Expr<'a>>),
    If {
        cond: &'a Expr<'a>,
        then_branch: &'a Stmt<'a>,
        else_branch: Option<&'a Stmt<'a>>,
    },
    Try {
        body: &'a Stmt<'a>,
        catch_var: Option<StringId>,
        catch_body: &'a Stmt<'a>,
    },
    Foreach {
        var: &'a Expr<'a>,
        iterable: &'a Expr<'a>,
        body: &'a Stmt<'a>,
    },
    Throw(&'a Expr<'a>),
    Break,
    Continue,
    Rethrow,
    ThreadExit,
    ScopeGuard(&'a Stmt<'a>),
    While {
        cond: &'a Expr<'a>,
        body: &'a Stmt<'a>,
    },
    DoWhile {
        body: &'a Stmt<'a>,
        cond: &'a Expr<'a>,
    },
    For {
        init: Option<&'a Stmt<'a>>,
        cond: Option<&'a Expr<'a>>,
        step: Option<&'a Expr<'a>>,
        body: &'a Stmt<'a>,
    },
    Switch {
        scrutinee: &'a Expr<'a>,
        cases: &'a [SwitchCase<'a>],
    },
}

pub enum SwitchLabel<'a> {
    Case(&'a Expr<'a>),
    Default,
}

pub struct SwitchCase<'a> {
    pub label: SwitchLabel<'a>,
    pub body: &'a [&'a Stmt<'a>],
}

pub struct Decl<'a> {
    pub kind: DeclKind<'a>,
    pub start: SourceLocation,
    pub end: SourceLocation,
}

pub enum FieldInit<'a> {
    Expr(&'a Expr<'a>),
    Args(&'a [&'a Expr<'a>]),
}

pub enum DeclKind<'a> {
    Namespace {
        name: Name,
        members: &'a [&'a Decl<'a>],
    },
    Class {
        name: StringId,
        modifiers: Modifiers,
        superclasses: &'a [(Modifiers, Name)],
        members: &'a [&'a Decl<'a>],
    },
    GlobalVariable {
        ty: TypeAnnotation,
        name: StringId,
        init: Option<&'a Expr<'a>>,
    },
    Function {
        name: Name,
        modifiers: Modifiers,
        params: &'a [Param<'a>],
        return_type: TypeAnnotation,
        body: Option<&'a Stmt<'a>>,
    },
    Constant {
        name: StringId,
        value: &'a Expr<'a>,
    },
    Method {
        name: StringId,
        modifiers: Modifiers,
        params: &'a [Param<'a>],
        return_type: TypeAnnotation,
        body: Option<&'a Stmt<'a>>,
    },
    Field {
        name: StringId,
        modifiers: Modifiers,
        ty: TypeAnnotation,
        init: Option<FieldInit<'a>>,
    },
    MemberGroup {
        modifiers: Modifiers,
        members: &'a [&'a Decl<'a>],
    },
}

/// The parsed root of one source unit: namespace-level members plus any
/// free-floating top-level statements, in source order.
pub struct SourceUnit<'a> {
    pub members: &'a [&'a Decl<'a>],
    pub statements: &'a [&'a Stmt<'a>],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_set_reports_duplicate() {
        let mut m = Modifiers::empty();
        assert!(!m.set(Modifier::Static));
        assert!(m.set(Modifier::Static));
        assert!(m.has(Modifier::Static));
    }

    #[test]
    fn invalid_name_has_no_segments() {
        let name = Name::invalid(SourceLocation::invalid());
        assert!(name.is_invalid());
        assert!(name.as_simple().is_none());
    }

    #[test]
    fn simple_name_round_trips_segment() {
        let name = Name::simple(StringId::default(), SourceLocation::invalid());
        assert_eq!(name.as_simple(), Some(StringId::default()));
    }

    #[test]
    fn arena_alloc_returns_usable_reference() {
        let arena = AstArena::new();
        let expr = arena.alloc(Expr {
            kind: ExprKind::IntLiteral(42),
            start: SourceLocation::invalid(),
            end: SourceLocation::invalid(),
        });
        assert!(matches!(expr.kind, ExprKind::IntLiteral(42)));
    }
}
