//! Converts [`SourceBuffer`] bytes into a [`Token`] stream.
//!
//! The lexer has two modes (§4.4): `Normal`, used for everything, and
//! `Regex`, entered by the parser immediately after consuming the `/` (or
//! `=~`/`!~` operator) that opens a regular-expression literal so the body
//! is read as an opaque pattern rather than re-tokenized.
//!
//! The lexer holds no reference to the interner or diagnostic sink: both
//! are threaded through as call parameters instead, since the parser needs
//! its own concurrent access to the same interner and sink while driving
//! the lexer.

use glint_base::{DiagnosticId, DiagnosticSink, Interner, SourceLocation};

use crate::source::SourceBuffer;
use crate::token::{Keyword, LexMode, Token, TokenKind};

pub struct Lexer {
    source: SourceBuffer,
}

impl Lexer {
    pub fn new(source: SourceBuffer) -> Self {
        Lexer { source }
    }

    pub fn into_source(self) -> SourceBuffer {
        self.source
    }

    pub fn save_cursor(&self) -> crate::source::SourceCursor {
        self.source.save_cursor()
    }

    pub fn restore_cursor(&mut self, cursor: crate::source::SourceCursor) {
        self.source.restore_cursor(cursor);
    }

    /// Reads the next token in the given mode.
    pub fn read(&mut self, mode: LexMode, interner: &mut Interner, sink: &mut DiagnosticSink) -> Token {
        self.skip_trivia();
        let start = self.source.current_location();
        self.source.set_mark();

        if self.source.at_end() {
            return Token::new(TokenKind::EndOfFile, start, 0);
        }

        if mode == LexMode::Regex {
            return self.read_regex_literal(start, interner);
        }

        let c = self.source.peek();
        let kind = if is_ident_start(c) {
            self.read_identifier_or_keyword(interner)
        } else if c.is_ascii_digit() {
            self.read_number(interner)
        } else if c == b'"' {
            self.read_string_literal(interner, sink)
        } else if c == b'`' {
            self.read_backquote_literal(interner)
        } else if c == b'<' && self.peek_binary_open() {
            self.read_binary_literal(interner)
        } else {
            self.read_operator_or_punct()
        };

        let len = self.source.marked_len() as u32;
        Token::new(kind, start, len)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.source.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.source.read();
                }
                b'#' => {
                    while self.source.peek() != b'\n' && !self.source.at_end() {
                        self.source.read();
                    }
                }
                b'/' if self.peek_at(1) == Some(b'/') => {
                    while self.source.peek() != b'\n' && !self.source.at_end() {
                        self.source.read();
                    }
                }
                b'/' if self.peek_at(1) == Some(b'*') => {
                    self.source.read();
                    self.source.read();
                    loop {
                        if self.source.at_end() {
                            break;
                        }
                        if self.source.peek() == b'*' && self.peek_at(1) == Some(b'/') {
                            self.source.read();
                            self.source.read();
                            break;
                        }
                        self.source.read();
                    }
                }
                _ => break,
            }
        }
    }

    /// Looks `ahead` bytes past the cursor; `None` once that falls at or
    /// past the terminator.
    fn peek_at(&self, ahead: usize) -> Option<u8> {
        let b = self.source.peek_at(ahead);
        if b == 0 {
            None
        } else {
            Some(b)
        }
    }

    fn peek_binary_open(&self) -> bool {
        // `<abcd>` binary literal vs. `<` as a future operator: the core
        // language has no bare `<` binary-lead ambiguity beyond this, since
        // relational `<` is handled by `read_operator_or_punct` when this
        // lookahead fails.
        let mut i = 1;
        loop {
            match self.peek_at(i) {
                Some(b) if b.is_ascii_hexdigit() => i += 1,
                Some(b'>') if i > 1 => return true,
                _ => return false,
            }
        }
    }

    fn read_identifier_or_keyword(&mut self, interner: &mut Interner) -> TokenKind {
        while is_ident_continue(self.source.peek()) {
            self.source.read();
        }
        let text = self.source.marked_string();
        if let Some(kw) = Keyword::lookup(&text) {
            TokenKind::Keyword(kw)
        } else {
            TokenKind::Identifier(interner.put(&text))
        }
    }

    fn read_number(&mut self, interner: &mut Interner) -> TokenKind {
        while self.source.peek().is_ascii_digit() {
            self.source.read();
        }
        let mut is_float = false;
        if self.source.peek() == b'.' && self.peek_at(1).map(|b| b.is_ascii_digit()).unwrap_or(false) {
            is_float = true;
            self.source.read();
            while self.source.peek().is_ascii_digit() {
                self.source.read();
            }
        }
        if matches!(self.source.peek(), b'e' | b'E') {
            is_float = true;
            self.source.read();
            if matches!(self.source.peek(), b'+' | b'-') {
                self.source.read();
            }
            while self.source.peek().is_ascii_digit() {
                self.source.read();
            }
        }
        // A trailing `Z`/date-separator `-`/`T` marks a date literal, e.g.
        // `2024-01-01T00:00:00`.
        if self.source.peek() == b'-' && self.looks_like_date_tail() {
            while matches!(self.source.peek(), b'-' | b':' | b'T' | b'Z') || self.source.peek().is_ascii_digit() {
                self.source.read();
            }
            let text = self.source.marked_string();
            return TokenKind::DateLiteral(interner.put(&text));
        }
        let text = self.source.marked_string();
        if is_float {
            match text.parse::<f64>() {
                Ok(v) => TokenKind::FloatLiteral(v),
                Err(_) => TokenKind::NumberLiteral(interner.put(&text)),
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => TokenKind::IntLiteral(v),
                Err(_) => TokenKind::NumberLiteral(interner.put(&text)),
            }
        }
    }

    fn looks_like_date_tail(&self) -> bool {
        self.peek_at(1).map(|b| b.is_ascii_digit()).unwrap_or(false)
    }

    fn read_string_literal(&mut self, interner: &mut Interner, sink: &mut DiagnosticSink) -> TokenKind {
        self.source.read(); // opening quote
        let mut decoded = String::new();
        loop {
            if self.source.at_end() {
                sink.report(DiagnosticId::ParserUnterminatedString, self.source.current_location());
                break;
            }
            let c = self.source.read();
            match c {
                b'"' => break,
                b'\\' => decoded.push(self.read_escape() as char),
                _ => decoded.push(c as char),
            }
        }
        TokenKind::StringLiteral(interner.put(&decoded))
    }

    fn read_escape(&mut self) -> u8 {
        let c = self.source.read();
        match c {
            b'n' => b'\n',
            b't' => b'\t',
            b'r' => b'\r',
            b'0' => 0,
            b'\\' => b'\\',
            b'"' => b'"',
            other => other,
        }
    }

    fn read_backquote_literal(&mut self, interner: &mut Interner) -> TokenKind {
        self.source.read(); // opening backquote
        while self.source.peek() != b'`' && !self.source.at_end() {
            self.source.read();
        }
        if !self.source.at_end() {
            self.source.read();
        }
        let full = self.source.marked_string();
        let inner = full
            .strip_prefix('`')
            .and_then(|s| s.strip_suffix('`'))
            .unwrap_or(&full)
            .to_string();
        TokenKind::BackquoteLiteral(interner.put(&inner))
    }

    fn read_binary_literal(&mut self, interner: &mut Interner) -> TokenKind {
        self.source.read(); // '<'
        while self.source.peek() != b'>' && !self.source.at_end() {
            self.source.read();
        }
        if !self.source.at_end() {
            self.source.read();
        }
        let full = self.source.marked_string();
        let inner = full
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .unwrap_or(&full)
            .to_string();
        TokenKind::BinaryLiteral(interner.put(&inner))
    }

    fn read_regex_literal(&mut self, _start: SourceLocation, interner: &mut Interner) -> Token {
        let mark_start = self.source.current_location();
        self.source.set_mark();
        loop {
            if self.source.at_end() || self.source.peek() == b'/' {
                break;
            }
            if self.source.peek() == b'\\' {
                self.source.read();
                if !self.source.at_end() {
                    self.source.read();
                }
                continue;
            }
            self.source.read();
        }
        let text = self.source.marked_string();
        let len = self.source.marked_len() as u32;
        Token::new(TokenKind::RegexLiteral(interner.put(&text)), mark_start, len)
    }

    fn read_operator_or_punct(&mut self) -> TokenKind {
        let c = self.source.read();
        macro_rules! two {
            ($second:expr, $two_kind:expr, $one_kind:expr) => {
                if self.source.peek() == $second {
                    self.source.read();
                    $two_kind
                } else {
                    $one_kind
                }
            };
        }
        match c {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'.' => TokenKind::Dot,
            b'\\' => TokenKind::Backslash,
            b':' => two!(b':', TokenKind::ColonColon, TokenKind::Colon),
            b'+' => {
                if self.source.peek() == b'+' {
                    self.source.read();
                    TokenKind::PlusPlus
                } else {
                    two!(b'=', TokenKind::PlusEq, TokenKind::Plus)
                }
            }
            b'-' => {
                if self.source.peek() == b'-' {
                    self.source.read();
                    TokenKind::MinusMinus
                } else {
                    two!(b'=', TokenKind::MinusEq, TokenKind::Minus)
                }
            }
            b'*' => two!(b'=', TokenKind::StarEq, TokenKind::Star),
            b'/' => two!(b'=', TokenKind::SlashEq, TokenKind::Slash),
            b'%' => two!(b'=', TokenKind::PercentEq, TokenKind::Percent),
            b'&' => {
                if self.source.peek() == b'&' {
                    self.source.read();
                    TokenKind::AndAnd
                } else {
                    two!(b'=', TokenKind::AmpEq, TokenKind::Amp)
                }
            }
            b'|' => {
                if self.source.peek() == b'|' {
                    self.source.read();
                    TokenKind::OrOr
                } else {
                    two!(b'=', TokenKind::PipeEq, TokenKind::Pipe)
                }
            }
            b'^' => two!(b'=', TokenKind::CaretEq, TokenKind::Caret),
            b'=' => {
                if self.source.peek() == b'=' {
                    self.source.read();
                    TokenKind::EqEq
                } else if self.source.peek() == b'~' {
                    self.source.read();
                    TokenKind::RegexMatch
                } else {
                    TokenKind::Eq
                }
            }
            b'!' => {
                if self.source.peek() == b'=' {
                    self.source.read();
                    TokenKind::NotEq
                } else if self.source.peek() == b'~' {
                    self.source.read();
                    TokenKind::RegexNotMatch
                } else {
                    TokenKind::Not
                }
            }
            b'<' => {
                if self.source.peek() == b'<' {
                    self.source.read();
                    two!(b'=', TokenKind::ShlEq, TokenKind::Shl)
                } else {
                    two!(b'=', TokenKind::LtEq, TokenKind::Lt)
                }
            }
            b'>' => {
                if self.source.peek() == b'>' {
                    self.source.read();
                    two!(b'=', TokenKind::ShrEq, TokenKind::Shr)
                } else {
                    two!(b'=', TokenKind::GtEq, TokenKind::Gt)
                }
            }
            b'?' => {
                if self.source.peek() == b'?' {
                    self.source.read();
                    TokenKind::QuestionQuestion
                } else if self.source.peek() == b'*' {
                    self.source.read();
                    TokenKind::QuestionStar
                } else {
                    TokenKind::Question
                }
            }
            _ => TokenKind::None,
        }
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_base::SourceInfo;

    fn lex_all(text: &str) -> Vec<TokenKind> {
        let src = SourceBuffer::new(SourceInfo::new("t", "t"), text.as_bytes()).unwrap();
        let mut interner = Interner::new();
        let mut sink = DiagnosticSink::new();
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.read(LexMode::Normal, &mut interner, &mut sink);
            let is_eof = tok.is_eof();
            out.push(tok.kind);
            if is_eof {
                break;
            }
        }
        out
    }

    #[test]
    fn lexes_keyword_and_identifier() {
        let toks = lex_all("class Foo");
        assert_eq!(toks[0], TokenKind::Keyword(Keyword::Class));
        assert!(matches!(toks[1], TokenKind::Identifier(_)));
    }

    #[test]
    fn lexes_int_literal() {
        let toks = lex_all("42");
        assert_eq!(toks[0], TokenKind::IntLiteral(42));
    }

    #[test]
    fn lexes_float_literal() {
        let toks = lex_all("3.25");
        assert_eq!(toks[0], TokenKind::FloatLiteral(3.25));
    }

    #[test]
    fn lexes_compound_assignment_operators() {
        let toks = lex_all("+= -= *= /= %= &= ^= |= <<= >>=");
        assert_eq!(
            toks,
            vec![
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::StarEq,
                TokenKind::SlashEq,
                TokenKind::PercentEq,
                TokenKind::AmpEq,
                TokenKind::CaretEq,
                TokenKind::PipeEq,
                TokenKind::ShlEq,
                TokenKind::ShrEq,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn lexes_double_quoted_string_with_escapes() {
        let src = SourceBuffer::new(SourceInfo::new("t", "t"), b"\"a\\nb\"").unwrap();
        let mut interner = Interner::new();
        let mut sink = DiagnosticSink::new();
        let mut lexer = Lexer::new(src);
        let tok = lexer.read(LexMode::Normal, &mut interner, &mut sink);
        match tok.kind {
            TokenKind::StringLiteral(id) => assert_eq!(interner.get(id), "a\nb"),
            other => panic!("expected string literal, got {other:?}"),
        }
    }

    #[test]
    fn skips_line_and_block_comments() {
        let toks = lex_all("// comment\n/* block */ 1");
        assert_eq!(toks[0], TokenKind::IntLiteral(1));
    }

    #[test]
    fn lexes_colon_colon_vs_colon() {
        let toks = lex_all(":: :");
        assert_eq!(toks[0], TokenKind::ColonColon);
        assert_eq!(toks[1], TokenKind::Colon);
    }

    #[test]
    fn lexes_binary_literal() {
        let toks = lex_all("<ab12>");
        assert!(matches!(toks[0], TokenKind::BinaryLiteral(_)));
    }

    #[test]
    fn lexes_backquote_literal() {
        let toks = lex_all("`ls -la`");
        assert!(matches!(toks[0], TokenKind::BackquoteLiteral(_)));
    }
}
