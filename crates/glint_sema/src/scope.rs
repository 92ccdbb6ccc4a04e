//! Lexical scope stack for local variables.
//!
//! Grounded on the same shape the original front-end uses for a routine's
//! activation frame: entering a block pushes a fresh name table, and
//! leaving it walks the block's declarations in reverse to emit cleanup in
//! the order C++ destructors would run. Here "emit cleanup" is the caller's
//! job (the statement analyzer turns the returned `LocalId` list into
//! `LifetimeEnd` instructions); this module only tracks what would need
//! cleaning up and in what order.

use std::collections::HashMap;

use glint_base::{DiagnosticId, DiagnosticSink, Interner, SourceLocation, StringId};
use serde::{Deserialize, Serialize};

use crate::types::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(u32);

impl LocalId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

pub struct LocalVar {
    pub id: LocalId,
    pub name: StringId,
    pub ty: TypeId,
    pub location: SourceLocation,
}

struct Frame {
    /// Declarations in this block, in declaration order.
    declared: Vec<LocalId>,
    /// Shadowing lookup table for just this block, so a redeclaration is
    /// detected against the innermost scope only.
    by_name: HashMap<StringId, LocalId>,
}

/// One routine's (function, method, or closure body's) local-variable
/// bookkeeping: a stack of lexical blocks plus the dense index table every
/// declaration draws from.
pub struct ScopeStack {
    frames: Vec<Frame>,
    locals: Vec<LocalVar>,
}

impl ScopeStack {
    /// Starts fresh bookkeeping for one routine. Each function/method/
    /// closure body gets its own `ScopeStack` so local indices stay dense
    /// per containing routine, not per compilation.
    pub fn new() -> Self {
        ScopeStack { frames: Vec::new(), locals: Vec::new() }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(Frame { declared: Vec::new(), by_name: HashMap::new() });
    }

    /// Closes the innermost scope, returning the `LocalId`s declared in it
    /// in **reverse declaration order** — the order `LifetimeEnd`
    /// instructions must be emitted in.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open.
    pub fn pop_scope(&mut self) -> Vec<LocalId> {
        let frame = self.frames.pop().expect("pop_scope with no open scope");
        let mut ids = frame.declared;
        ids.reverse();
        ids
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Declares a new local in the innermost open scope, allocating the
    /// next dense index for the routine. A same-name redeclaration within
    /// the same block is diagnosed but still shadows (matching the data
    /// model's "re-declarations are diagnosed but the new declaration
    /// shadows" rule); it is never an error to shadow an *outer* scope's
    /// variable of the same name.
    pub fn declare(
        &mut self,
        name: StringId,
        ty: TypeId,
        location: SourceLocation,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> LocalId {
        let id = LocalId(self.locals.len() as u32);
        self.locals.push(LocalVar { id, name, ty, location: location.clone() });

        let frame = self.frames.last_mut().expect("declare with no open scope");
        if frame.by_name.contains_key(&name) {
            sink.report(DiagnosticId::SemaDuplicateVariableName, location)
                .arg(interner.get(name));
        }
        frame.declared.push(id);
        frame.by_name.insert(name, id);
        id
    }

    /// Looks up `name` from the innermost scope outward.
    pub fn lookup(&self, name: StringId) -> Option<LocalId> {
        self.frames.iter().rev().find_map(|f| f.by_name.get(&name).copied())
    }

    pub fn local(&self, id: LocalId) -> &LocalVar {
        &self.locals[id.index()]
    }

    /// Total number of locals declared in this routine so far — the size
    /// the activation frame's slot table must be allocated to.
    pub fn local_count(&self) -> usize {
        self.locals.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRegistry;

    fn setup() -> (ScopeStack, TypeRegistry, Interner, DiagnosticSink) {
        (ScopeStack::new(), TypeRegistry::new(), Interner::new(), DiagnosticSink::new())
    }

    #[test]
    fn declarations_get_dense_increasing_indices() {
        let (mut scope, types, mut interner, mut sink) = setup();
        scope.push_scope();
        let x = interner.put("x");
        let y = interner.put("y");
        let a = scope.declare(x, types.int(), SourceLocation::invalid(), &interner, &mut sink);
        let b = scope.declare(y, types.int(), SourceLocation::invalid(), &interner, &mut sink);
        assert_eq!(a.index() + 1, b.index());
        assert_eq!(scope.local_count(), 2);
    }

    #[test]
    fn pop_scope_returns_reverse_declaration_order() {
        let (mut scope, types, mut interner, mut sink) = setup();
        scope.push_scope();
        let x = interner.put("x");
        let y = interner.put("y");
        let z = interner.put("z");
        let a = scope.declare(x, types.int(), SourceLocation::invalid(), &interner, &mut sink);
        let b = scope.declare(y, types.int(), SourceLocation::invalid(), &interner, &mut sink);
        let c = scope.declare(z, types.int(), SourceLocation::invalid(), &interner, &mut sink);
        assert_eq!(scope.pop_scope(), vec![c, b, a]);
    }

    #[test]
    fn redeclaration_in_same_scope_is_diagnosed_but_shadows() {
        let (mut scope, types, mut interner, mut sink) = setup();
        scope.push_scope();
        let x = interner.put("x");
        let first = scope.declare(x, types.int(), SourceLocation::invalid(), &interner, &mut sink);
        let second = scope.declare(x, types.string(), SourceLocation::invalid(), &interner, &mut sink);
        assert!(sink.had_error());
        assert_ne!(first, second);
        assert_eq!(scope.lookup(x), Some(second));
    }

    #[test]
    fn shadowing_an_outer_scope_is_not_diagnosed() {
        let (mut scope, types, mut interner, mut sink) = setup();
        scope.push_scope();
        let x = interner.put("x");
        let outer = scope.declare(x, types.int(), SourceLocation::invalid(), &interner, &mut sink);
        scope.push_scope();
        let inner = scope.declare(x, types.int(), SourceLocation::invalid(), &interner, &mut sink);
        assert!(!sink.had_error());
        assert_eq!(scope.lookup(x), Some(inner));
        scope.pop_scope();
        assert_eq!(scope.lookup(x), Some(outer));
    }

    #[test]
    fn lookup_walks_outward_through_nested_scopes() {
        let (mut scope, types, mut interner, mut sink) = setup();
        scope.push_scope();
        let x = interner.put("x");
        let outer = scope.declare(x, types.int(), SourceLocation::invalid(), &interner, &mut sink);
        scope.push_scope();
        let y = interner.put("y");
        scope.declare(y, types.int(), SourceLocation::invalid(), &interner, &mut sink);
        assert_eq!(scope.lookup(x), Some(outer));
        assert_eq!(scope.lookup(y).is_some(), true);
    }
}
