//! Diagnostic sink: reported compiler messages with a builder-style
//! emission API.
//!
//! Callers never build a [`Diagnostic`] by hand. Instead they call
//! [`DiagnosticSink::report`] with a stable [`DiagnosticId`] and a location,
//! stream `%s` arguments into the returned builder, and let the builder's
//! `Drop` impl hand the assembled record to every registered processor. A
//! processor that panics cannot bring down compilation: the panic is caught
//! and discarded at the call site.
//!
//! ```
//! use glint_base::diagnostic::{DiagnosticSink, DiagnosticId, Level};
//! use glint_base::SourceLocation;
//!
//! let mut sink = DiagnosticSink::new();
//! sink.report(DiagnosticId::ParserExpectedName, SourceLocation::invalid())
//!     .arg("class")
//!     .arg("123");
//! assert!(sink.had_error());
//! ```

use crate::source_info::SourceLocation;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Error,
    Warning,
    Info,
}

/// The full, compile-time-fixed set of diagnostics the core can emit.
///
/// Each id carries a stable short code and a message template whose `%s`
/// placeholders are filled, in order, by the arguments streamed into the
/// [`DiagnosticBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticId {
    // --- Lexer / parser ---
    ParserExpectedName,
    ParserExpectedPrimaryExpression,
    ParserExpectedVariableName,
    ParserExpectedClassMember,
    ParserExpectedNamespaceMember,
    ParserExpectedToken,
    ParserModifierGivenTwice,
    ParserModuleIgnored,
    ParserUnendedNamespaceDecl,
    ParserInvalidMemberAccess,
    ParserUnterminatedString,
    ParserInvalidNumericLiteral,

    // --- Name / type resolution ---
    SemaDuplicateClassName,
    SemaNamespaceNotFound,
    SemaUnresolvedClass,
    SemaAmbiguousClass,
    SemaInvalidNamespaceMemberName,
    SemaDuplicateGlobalVariableName,
    SemaPreviousDeclaration,
    SemaDuplicateVariableName,

    // --- Expression / statement lowering ---
    SemaCannotConvert,
    SemaInvalidLvalue,
    SemaInvalidOperands,
    SemaReturnTypeMismatch,
    SemaVoidReturnRequiresNothing,
    SemaUnknownIdentifier,
    SemaUnsupportedConstruct,
}

impl DiagnosticId {
    /// Stable short code, independent of message wording.
    pub fn code(self) -> &'static str {
        use DiagnosticId::*;
        match self {
            ParserExpectedName => "P0001",
            ParserExpectedPrimaryExpression => "P0002",
            ParserExpectedVariableName => "P0003",
            ParserExpectedClassMember => "P0004",
            ParserExpectedNamespaceMember => "P0005",
            ParserExpectedToken => "P0006",
            ParserModifierGivenTwice => "P0007",
            ParserModuleIgnored => "P0008",
            ParserUnendedNamespaceDecl => "P0009",
            ParserInvalidMemberAccess => "P0010",
            ParserUnterminatedString => "P0011",
            ParserInvalidNumericLiteral => "P0012",
            SemaDuplicateClassName => "S0001",
            SemaNamespaceNotFound => "S0002",
            SemaUnresolvedClass => "S0003",
            SemaAmbiguousClass => "S0004",
            SemaInvalidNamespaceMemberName => "S0005",
            SemaDuplicateGlobalVariableName => "S0006",
            SemaPreviousDeclaration => "S0007",
            SemaDuplicateVariableName => "S0008",
            SemaCannotConvert => "S0009",
            SemaInvalidLvalue => "S0010",
            SemaInvalidOperands => "S0011",
            SemaReturnTypeMismatch => "S0012",
            SemaVoidReturnRequiresNothing => "S0013",
            SemaUnknownIdentifier => "S0014",
            SemaUnsupportedConstruct => "S0015",
        }
    }

    pub fn level(self) -> Level {
        use DiagnosticId::*;
        match self {
            ParserModifierGivenTwice | ParserModuleIgnored | SemaPreviousDeclaration => {
                Level::Warning
            }
            _ => Level::Error,
        }
    }

    /// Message template. `%s` is a positional placeholder, filled in order
    /// by [`DiagnosticBuilder::arg`] calls.
    pub fn template(self) -> &'static str {
        use DiagnosticId::*;
        match self {
            ParserExpectedName => "expected a name, found '%s'",
            ParserExpectedPrimaryExpression => "expected a primary expression, found '%s'",
            ParserExpectedVariableName => "expected a variable name, found '%s'",
            ParserExpectedClassMember => "expected a class member, found '%s'",
            ParserExpectedNamespaceMember => "expected a namespace member, found '%s'",
            ParserExpectedToken => "expected '%s', found '%s'",
            ParserModifierGivenTwice => "modifier '%s' given twice",
            ParserModuleIgnored => "module declaration '%s' is accepted but not linked",
            ParserUnendedNamespaceDecl => "namespace '%s' is missing a closing brace",
            ParserInvalidMemberAccess => "invalid member access on '%s'",
            ParserUnterminatedString => "unterminated string literal",
            ParserInvalidNumericLiteral => "invalid numeric literal '%s'",
            SemaDuplicateClassName => "'%s' is already declared in namespace '%s'",
            SemaNamespaceNotFound => "no namespace named '%s' in scope '%s'",
            SemaUnresolvedClass => "cannot resolve class '%s' from scope '%s'",
            SemaAmbiguousClass => "class '%s' is ambiguous from scope '%s'",
            SemaInvalidNamespaceMemberName => "'%s' is not a valid namespace member name",
            SemaDuplicateGlobalVariableName => "'%s' is already declared in namespace '%s'",
            SemaPreviousDeclaration => "previous declaration of '%s' is here",
            SemaDuplicateVariableName => "'%s' is already declared in this scope",
            SemaCannotConvert => "cannot convert '%s' to '%s'",
            SemaInvalidLvalue => "expression is not assignable",
            SemaInvalidOperands => "invalid operand types '%s' and '%s' for operator '%s'",
            SemaReturnTypeMismatch => "cannot return '%s' from a function declared to return '%s'",
            SemaVoidReturnRequiresNothing => "'return' with no value requires a 'nothing' return type",
            SemaUnknownIdentifier => "unknown identifier '%s'",
            SemaUnsupportedConstruct => "'%s' is not supported by the IR lowering core",
        }
    }
}

/// One assembled diagnostic record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: DiagnosticId,
    pub code: &'static str,
    pub level: Level,
    pub message: String,
    pub location: SourceLocation,
}

/// Receives finished [`Diagnostic`] records. Implementations are expected to
/// format and forward them (to a terminal, a log, an LSP client, ...); the
/// core only produces records, it never renders them.
pub trait DiagnosticProcessor {
    fn process(&mut self, diagnostic: &Diagnostic);
}

/// Collects reported diagnostics in memory. The default processor used by
/// tests and by callers that just want the list back.
#[derive(Default)]
pub struct CollectingProcessor {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticProcessor for CollectingProcessor {
    fn process(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }
}

/// Central diagnostic sink. Owns the suppression counter and the list of
/// registered processors; every compilation unit has exactly one.
pub struct DiagnosticSink {
    processors: Vec<Box<dyn DiagnosticProcessor>>,
    suppress_depth: u32,
    had_error: bool,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        DiagnosticSink {
            processors: Vec::new(),
            suppress_depth: 0,
            had_error: false,
        }
    }

    pub fn register(&mut self, processor: Box<dyn DiagnosticProcessor>) {
        self.processors.push(processor);
    }

    /// `true` once at least one `Error`-level diagnostic has been reported,
    /// suppressed diagnostics excluded. Per the core's contract, a
    /// compilation in this state must not produce an IR `Script`.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// Begin a builder-style emission. The record is dispatched when the
    /// returned builder is dropped.
    pub fn report(&mut self, id: DiagnosticId, location: SourceLocation) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            sink: self,
            id,
            location,
            args: Vec::new(),
        }
    }

    /// Increments the suppression counter for the lifetime of the returned
    /// guard. Suppression nests: diagnostics are dropped silently while the
    /// counter is nonzero.
    pub fn suppress(&mut self) -> SuppressGuard<'_> {
        self.suppress_depth += 1;
        SuppressGuard { sink: self }
    }

    fn dispatch(&mut self, diagnostic: Diagnostic) {
        if self.suppress_depth > 0 {
            return;
        }
        if diagnostic.level == Level::Error {
            self.had_error = true;
        }
        for processor in self.processors.iter_mut() {
            // A processor must never be able to fail compilation; swallow
            // panics at the call boundary.
            let _ = std::panic::catch_unwind(AssertUnwindSafe(|| processor.process(&diagnostic)));
        }
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII suppression scope. Dropping the guard decrements the sink's
/// suppression counter.
pub struct SuppressGuard<'a> {
    sink: &'a mut DiagnosticSink,
}

impl<'a> SuppressGuard<'a> {
    /// Nest another suppression scope inside this one.
    pub fn suppress(&mut self) -> SuppressGuard<'_> {
        self.sink.suppress()
    }
}

impl Drop for SuppressGuard<'_> {
    fn drop(&mut self) {
        self.sink.suppress_depth -= 1;
    }
}

impl<'a> std::ops::Deref for SuppressGuard<'a> {
    type Target = DiagnosticSink;
    fn deref(&self) -> &DiagnosticSink {
        self.sink
    }
}

impl<'a> std::ops::DerefMut for SuppressGuard<'a> {
    fn deref_mut(&mut self) -> &mut DiagnosticSink {
        self.sink
    }
}

/// Builder-style diagnostic emission. Accumulates `%s` arguments; the record
/// is assembled and dispatched when the builder is dropped.
pub struct DiagnosticBuilder<'a> {
    sink: &'a mut DiagnosticSink,
    id: DiagnosticId,
    location: SourceLocation,
    args: Vec<String>,
}

impl<'a> DiagnosticBuilder<'a> {
    /// Streams one more `%s` argument into the message template.
    pub fn arg(mut self, value: impl ToString) -> Self {
        self.args.push(value.to_string());
        self
    }
}

impl Drop for DiagnosticBuilder<'_> {
    fn drop(&mut self) {
        let message = render_template(self.id.template(), &self.args);
        let diagnostic = Diagnostic {
            id: self.id,
            code: self.id.code(),
            level: self.id.level(),
            message,
            location: self.location.clone(),
        };
        self.sink.dispatch(diagnostic);
    }
}

fn render_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next_arg = args.iter();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' && chars.peek() == Some(&'s') {
            chars.next();
            if let Some(arg) = next_arg.next() {
                out.push_str(arg);
            } else {
                out.push_str("%s");
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_info::SourceLocation;

    #[test]
    fn report_dispatches_to_processors() {
        let mut sink = DiagnosticSink::new();
        sink.register(Box::new(CollectingProcessor::default()));
        sink.report(DiagnosticId::ParserExpectedName, SourceLocation::invalid())
            .arg("foo");
        assert!(sink.had_error());
    }

    #[test]
    fn collecting_processor_receives_rendered_message() {
        let mut sink = DiagnosticSink::new();
        let collector = Box::<CollectingProcessor>::default();
        let collector_ptr: *const CollectingProcessor = &*collector;
        sink.register(collector);
        sink.report(DiagnosticId::ParserExpectedName, SourceLocation::invalid())
            .arg("class");
        let collected = unsafe { &*collector_ptr };
        assert_eq!(collected.diagnostics.len(), 1);
        assert_eq!(collected.diagnostics[0].message, "expected a name, found 'class'");
    }

    #[test]
    fn suppressed_diagnostics_are_dropped() {
        let mut sink = DiagnosticSink::new();
        {
            let mut _guard = sink.suppress();
            _guard.report(DiagnosticId::ParserExpectedName, SourceLocation::invalid());
        }
        assert!(!sink.had_error());
    }

    #[test]
    fn suppression_nests() {
        let mut sink = DiagnosticSink::new();
        {
            let mut outer = sink.suppress();
            {
                let _inner = outer.suppress();
            }
            // outer guard still active here
        }
        sink.report(DiagnosticId::ParserExpectedName, SourceLocation::invalid());
        assert!(sink.had_error());
    }

    #[test]
    fn warnings_do_not_set_had_error() {
        let mut sink = DiagnosticSink::new();
        sink.report(DiagnosticId::ParserModifierGivenTwice, SourceLocation::invalid())
            .arg("static");
        assert!(!sink.had_error());
    }

    #[test]
    fn render_template_fills_placeholders_in_order() {
        assert_eq!(
            render_template("cannot convert %s to %s", &["int".into(), "string".into()]),
            "cannot convert int to string"
        );
    }

    #[test]
    fn render_template_leaves_unfilled_placeholder_literal() {
        assert_eq!(render_template("missing %s", &[]), "missing %s");
    }

    struct PanickingProcessor;
    impl DiagnosticProcessor for PanickingProcessor {
        fn process(&mut self, _diagnostic: &Diagnostic) {
            panic!("processor exploded");
        }
    }

    #[test]
    fn panicking_processor_does_not_propagate() {
        let mut sink = DiagnosticSink::new();
        sink.register(Box::new(PanickingProcessor));
        sink.report(DiagnosticId::ParserExpectedName, SourceLocation::invalid());
        // Reaching here means the panic was swallowed.
        assert!(sink.had_error());
    }
}
