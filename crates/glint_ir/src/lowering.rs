//! Shared state threaded through one routine's lowering: the already-built
//! symbol graph and type registry to resolve names against, the emitter
//! filling in one function body, and the fresh local-variable bookkeeping
//! that body owns.

use glint_base::{DiagnosticSink, Interner};
use glint_sema::{NamespaceId, ScopeStack, SymbolGraph, TypeId, TypeRegistry};

use crate::emitter::{FunctionBuilder, StringPool};

/// One function, method, or the synthesized entry point's lowering context.
/// Everything here except `scope`/`builder` is borrowed from the
/// compilation-wide state `lib.rs` owns; `scope` and `builder` are fresh
/// for every routine.
pub(crate) struct Lowering<'a> {
    pub graph: &'a SymbolGraph,
    pub types: &'a mut TypeRegistry,
    pub interner: &'a Interner,
    pub sink: &'a mut DiagnosticSink,
    pub strings: &'a mut StringPool,
    /// The namespace this routine is declared in, used to resolve
    /// unqualified global and class names.
    pub ns: NamespaceId,
    /// The declared return type of the routine currently being lowered;
    /// `return` statements convert to this type, and a `return;` with no
    /// value is only legal when it is `nothing`.
    pub return_type: TypeId,
    pub scope: ScopeStack,
    pub builder: FunctionBuilder,
}

impl<'a> Lowering<'a> {
    pub fn new(
        graph: &'a SymbolGraph,
        types: &'a mut TypeRegistry,
        interner: &'a Interner,
        sink: &'a mut DiagnosticSink,
        strings: &'a mut StringPool,
        ns: NamespaceId,
        return_type: TypeId,
    ) -> Self {
        Lowering {
            graph,
            types,
            interner,
            sink,
            strings,
            ns,
            return_type,
            scope: ScopeStack::new(),
            builder: FunctionBuilder::new(),
        }
    }
}
