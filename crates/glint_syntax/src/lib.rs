//! Source buffer, lexer, and recursive-descent parser.
//!
//! This crate turns raw source bytes into an arena-allocated [`ast::SourceUnit`].
//! Nothing here resolves names or checks types — that is `glint-sema`'s job.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod token;

pub use ast::{AstArena, SourceUnit};
pub use lexer::Lexer;
pub use parser::{Parser, Recovery};
pub use source::{SourceBuffer, SourceCursor, SourceError};
pub use token::{Keyword, LexMode, Token, TokenKind};

use glint_base::{DiagnosticSink, Interner, SourceInfo};

/// Parses one source unit end to end: lexes and parses `text` under the
/// given source identity, reporting diagnostics to `sink` and interning
/// identifiers/literals into `interner`.
///
/// The returned tree borrows from `arena`, which the caller must keep alive
/// for as long as the tree (and anything built from it, such as a resolved
/// symbol graph) is in use.
pub fn parse_source<'ast>(
    info: SourceInfo,
    text: &[u8],
    arena: &'ast AstArena,
    interner: &mut Interner,
    sink: &mut DiagnosticSink,
) -> Result<ast::SourceUnit<'ast>, SourceError> {
    let buffer = SourceBuffer::new(info, text)?;
    let lexer = Lexer::new(buffer);
    let mut parser = Parser::new(lexer, arena, interner, sink);
    Ok(parser.parse_source_unit(sink, interner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_source_round_trips_a_trivial_program() {
        let arena = AstArena::new();
        let mut interner = Interner::new();
        let mut sink = DiagnosticSink::new();
        let unit = parse_source(
            SourceInfo::new("t.gl", "t.gl"),
            b"our int x = 1;",
            &arena,
            &mut interner,
            &mut sink,
        )
        .unwrap();
        assert!(!sink.had_error());
        assert_eq!(unit.members.len(), 1);
    }
}
