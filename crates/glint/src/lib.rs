//! Pipeline driver tying the four compiler-core crates together: parse,
//! resolve, lower, and hand back a finished [`glint_ir::Script`] plus every
//! diagnostic the run produced.
//!
//! The compiler core itself (`glint-syntax`/`glint-sema`/`glint-ir`) never
//! logs and never touches the filesystem. This crate is where the ambient
//! concerns the core has no business owning — reading source off disk,
//! loading `glint.toml`, and reporting pass boundaries to `log` — live.

pub mod config;

pub use config::{ConfigError, DiagnosticsConfig, GlintConfig};

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use glint_base::{Diagnostic, DiagnosticProcessor, DiagnosticSink, Interner, SourceInfo};
use glint_syntax::{parse_source, AstArena, SourceError};
use thiserror::Error;

pub use glint_ir::Script;

/// Errors that originate outside the compiler core proper. Distinct from
/// the three in-core error classes, which never surface as a `Result` — a
/// malformed source buffer or an unreadable file never reaches
/// `DiagnosticSink`.
#[derive(Debug, Error)]
pub enum GlintError {
    #[error("failed to read source file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid source buffer: {0}")]
    Source(#[from] SourceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything one `compile` call produces: the `Script`, if the compilation
/// reported no `Error`-level diagnostic (per I8), and the full diagnostic
/// list regardless of outcome.
#[derive(Debug)]
pub struct CompileOutput {
    pub script: Option<Script>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn had_error(&self) -> bool {
        self.script.is_none()
    }
}

/// Forwards every diagnostic into a shared, externally readable buffer. The
/// pipeline driver needs the list back after `DiagnosticSink` is done with
/// it, which a plain [`CollectingProcessor`] registered by value cannot give
/// back once moved into the sink.
struct SharedCollector(Rc<RefCell<Vec<Diagnostic>>>);

impl DiagnosticProcessor for SharedCollector {
    fn process(&mut self, diagnostic: &Diagnostic) {
        self.0.borrow_mut().push(diagnostic.clone());
    }
}

/// Compiles `text` (identified by `short_name` for diagnostic rendering)
/// end to end: lex, parse, resolve names and types, lower to IR.
pub fn compile_str(short_name: &str, text: &str) -> CompileOutput {
    let info = SourceInfo::new(short_name, short_name);
    compile_bytes(info, text.as_bytes())
}

/// Reads `path` off disk and compiles its contents.
pub fn compile_file(path: impl AsRef<Path>) -> Result<CompileOutput, GlintError> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .map_err(|source| GlintError::Io { path: path.display().to_string(), source })?;
    let short_name =
        path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string());
    let info = SourceInfo::new(short_name, path.display().to_string());
    Ok(compile_bytes(info, &bytes))
}

fn compile_bytes(info: SourceInfo, bytes: &[u8]) -> CompileOutput {
    let collected = Rc::new(RefCell::new(Vec::new()));
    let arena = AstArena::new();
    let mut interner = Interner::new();
    let mut sink = DiagnosticSink::new();
    sink.register(Box::new(SharedCollector(Rc::clone(&collected))));

    log::debug!("lexing and parsing {}", info.short_name());
    let unit = match parse_source(info, bytes, &arena, &mut interner, &mut sink) {
        Ok(unit) => unit,
        Err(_) => {
            // A malformed source buffer (e.g. an embedded terminator byte)
            // never reaches the parser; nothing downstream can run.
            let diagnostics = Rc::try_unwrap(collected).map(RefCell::into_inner).unwrap_or_default();
            return CompileOutput { script: None, diagnostics };
        }
    };

    log::debug!("parse complete: {} top-level members", unit.members.len());

    let (graph, mut types) = glint_sema::analyze(&unit, &interner, &mut sink);
    log::debug!("symbol graph built: {} globals", graph.globals().count());

    let script = glint_ir::lower(&unit, &graph, &mut types, &interner, &mut sink);
    log::debug!("ir lowering complete, produced a script: {}", script.is_some());

    drop(sink);
    let diagnostics = Rc::try_unwrap(collected).map(RefCell::into_inner).unwrap_or_default();
    CompileOutput { script, diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_clean_program_compiles_to_a_script_with_no_diagnostics() {
        let out = compile_str("t.gl", "our int x = 0;");
        assert!(out.script.is_some());
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn a_duplicate_declaration_reports_a_diagnostic_and_yields_no_script() {
        let out = compile_str("t.gl", "our int x = 0; our string x = \"dup\";");
        assert!(out.script.is_none());
        assert!(!out.diagnostics.is_empty());
        assert!(out.had_error());
    }

    #[test]
    fn compile_file_reads_a_real_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.gl");
        fs::write(&path, "int f() { return 1; }").unwrap();
        let out = compile_file(&path).unwrap();
        assert!(out.script.is_some());
    }

    #[test]
    fn compile_file_reports_an_unreadable_path() {
        let err = compile_file("/nonexistent/does-not-exist.gl").unwrap_err();
        assert!(matches!(err, GlintError::Io { .. }));
    }
}
