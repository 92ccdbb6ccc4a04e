//! Pure structural atoms shared across the glint front-end: string
//! interning, source identity, and the diagnostic sink.
//!
//! Nothing in this crate knows about tokens, syntax, or types. It exists so
//! that `glint-syntax`, `glint-sema`, and `glint-ir` can share one
//! definition of "where did this come from" and "how do we report a
//! problem" without depending on each other.

pub mod diagnostic;
pub mod intern;
pub mod source_info;

pub use diagnostic::{
    CollectingProcessor, Diagnostic, DiagnosticBuilder, DiagnosticId, DiagnosticProcessor,
    DiagnosticSink, Level, SuppressGuard,
};
pub use intern::{Interner, StringId};
pub use source_info::{SourceInfo, SourceLocation};
