//! Token vocabulary produced by the lexer and consumed by the parser.
//!
//! ## Token Categories
//!
//! | Category | Examples |
//! |----------|----------|
//! | **Keywords** | `class`, `namespace`, `try`, `catch`, `our` |
//! | **Literals** | integers, floats, dates, binary blobs, strings |
//! | **Operators** | the full compound-assignment and comparison set |
//! | **Punctuation** | `( ) { } [ ] , ; :: .` |

use glint_base::{SourceLocation, StringId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Namespace,
    Class,
    Inherits,
    Our,
    New,
    SelfKw,
    Cast,
    Instanceof,
    Try,
    Catch,
    Throw,
    Return,
    If,
    Else,
    Foreach,
    In,
    While,
    Do,
    For,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Rethrow,
    ThreadExit,
    OnExit,
    Module,
    Const,
    Sub,

    // Modifiers
    Abstract,
    Deprecated,
    Final,
    Private,
    Public,
    Static,
    Synchronized,

    // Literal keywords
    Nothing,
    True,
    False,
    Null,

    // Type keywords
    Int,
    StringTy,
    Bool,
    Any,
    SoftInt,
    SoftString,
    SoftBool,

    // Prefix/list-operation keyword-operators
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
    Unshift,
    Push,
    Splice,
    Extract,
    Map,
    Foldr,
    Foldl,
    Select,
}

impl Keyword {
    /// Lexer table of `(spelling, keyword)`, longest-match irrelevant since
    /// keywords are matched only after a full identifier has been scanned.
    pub const TABLE: &'static [(&'static str, Keyword)] = &[
        ("namespace", Keyword::Namespace),
        ("class", Keyword::Class),
        ("inherits", Keyword::Inherits),
        ("our", Keyword::Our),
        ("new", Keyword::New),
        ("self", Keyword::SelfKw),
        ("cast", Keyword::Cast),
        ("instanceof", Keyword::Instanceof),
        ("try", Keyword::Try),
        ("catch", Keyword::Catch),
        ("throw", Keyword::Throw),
        ("return", Keyword::Return),
        ("if", Keyword::If),
        ("else", Keyword::Else),
        ("foreach", Keyword::Foreach),
        ("in", Keyword::In),
        ("while", Keyword::While),
        ("do", Keyword::Do),
        ("for", Keyword::For),
        ("switch", Keyword::Switch),
        ("case", Keyword::Case),
        ("default", Keyword::Default),
        ("break", Keyword::Break),
        ("continue", Keyword::Continue),
        ("rethrow", Keyword::Rethrow),
        ("thread_exit", Keyword::ThreadExit),
        ("on_exit", Keyword::OnExit),
        ("module", Keyword::Module),
        ("const", Keyword::Const),
        ("sub", Keyword::Sub),
        ("abstract", Keyword::Abstract),
        ("deprecated", Keyword::Deprecated),
        ("final", Keyword::Final),
        ("private", Keyword::Private),
        ("public", Keyword::Public),
        ("static", Keyword::Static),
        ("synchronized", Keyword::Synchronized),
        ("nothing", Keyword::Nothing),
        ("true", Keyword::True),
        ("false", Keyword::False),
        ("null", Keyword::Null),
        ("int", Keyword::Int),
        ("string", Keyword::StringTy),
        ("bool", Keyword::Bool),
        ("any", Keyword::Any),
        ("softint", Keyword::SoftInt),
        ("softstring", Keyword::SoftString),
        ("softbool", Keyword::SoftBool),
        ("elements", Keyword::Elements),
        ("keys", Keyword::Keys),
        ("shift", Keyword::Shift),
        ("pop", Keyword::Pop),
        ("chomp", Keyword::Chomp),
        ("trim", Keyword::Trim),
        ("background", Keyword::Background),
        ("delete", Keyword::Delete),
        ("remove", Keyword::Remove),
        ("exists", Keyword::Exists),
        ("unshift", Keyword::Unshift),
        ("push", Keyword::Push),
        ("splice", Keyword::Splice),
        ("extract", Keyword::Extract),
        ("map", Keyword::Map),
        ("foldr", Keyword::Foldr),
        ("foldl", Keyword::Foldl),
        ("select", Keyword::Select),
    ];

    pub fn lookup(ident: &str) -> Option<Keyword> {
        Keyword::TABLE.iter().find(|(s, _)| *s == ident).map(|(_, k)| *k)
    }

    /// A bit-settable modifier, or `None` if this keyword is not one of the
    /// modifier set.
    pub fn as_modifier(self) -> Option<crate::ast::Modifier> {
        use crate::ast::Modifier;
        match self {
            Keyword::Abstract => Some(Modifier::Abstract),
            Keyword::Deprecated => Some(Modifier::Deprecated),
            Keyword::Final => Some(Modifier::Final),
            Keyword::Private => Some(Modifier::Private),
            Keyword::Public => Some(Modifier::Public),
            Keyword::Static => Some(Modifier::Static),
            Keyword::Synchronized => Some(Modifier::Synchronized),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(StringId),
    Keyword(Keyword),

    IntLiteral(i64),
    FloatLiteral(f64),
    /// Arbitrary-precision numeric literal, kept as its original digit text.
    NumberLiteral(StringId),
    DateLiteral(StringId),
    /// Binary literal `<abcd>`: decoded byte payload, interned as raw bytes
    /// via the string table (the value is not meant to be valid UTF-8).
    BinaryLiteral(StringId),
    /// Escape-decoded double-quoted string.
    StringLiteral(StringId),
    /// Raw backquoted (shell) string, not escape-decoded.
    BackquoteLiteral(StringId),
    /// Regular-expression literal body, only produced in `Regex` lexer mode.
    RegexLiteral(StringId),

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    ColonColon,
    Colon,
    Dot,
    Backslash,

    // Assignment family
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    CaretEq,
    PipeEq,
    ShlEq,
    ShrEq,

    // Conditional / coalescing
    Question,
    QuestionQuestion,
    QuestionStar,

    // Logical
    OrOr,
    AndAnd,
    Not,

    // Bitwise
    Pipe,
    Caret,
    Amp,

    // Relational / equality / regex match
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,
    RegexMatch,
    RegexNotMatch,

    // Shift
    Shl,
    Shr,

    // Additive / multiplicative
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Increment / decrement
    PlusPlus,
    MinusMinus,

    /// Error placeholder: lexer could not classify the input at this
    /// position. Carries no payload; recovery is the parser's job.
    None,
    EndOfFile,
}

/// A lexer mode. `Regex` is entered explicitly by the parser right before
/// reading the right-hand side of `=~`/`!~`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexMode {
    Normal,
    Regex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
    pub length: u32,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation, length: u32) -> Self {
        Token { kind, location, length }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfFile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_finds_known_keyword() {
        assert_eq!(Keyword::lookup("class"), Some(Keyword::Class));
        assert_eq!(Keyword::lookup("not_a_keyword"), None);
    }

    #[test]
    fn modifier_keywords_map_to_modifier_flags() {
        assert!(Keyword::Static.as_modifier().is_some());
        assert!(Keyword::Class.as_modifier().is_none());
    }

    #[test]
    fn token_is_eof_detects_eof_kind() {
        let t = Token::new(TokenKind::EndOfFile, SourceLocation::invalid(), 0);
        assert!(t.is_eof());
    }
}
