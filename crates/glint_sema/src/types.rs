//! Hash-consed semantic types.
//!
//! Mirrors the "resolve an AST type node into a canonical reference" shape
//! of the original front-end's type registry, but trades shared-pointer
//! caches for a flat arena indexed by [`TypeId`]: structural hash-consing is
//! a `HashMap` lookup keyed on [`TypeKind`] instead of a pointer map keyed
//! on the class or inner type being wrapped. Reference equality of the
//! original becomes `TypeId` equality here.

use std::collections::HashMap;

use glint_base::{DiagnosticSink, Interner};
use glint_syntax::ast::{Name, TypeAnnotation};
use serde::{Deserialize, Serialize};

use crate::symbols::{ClassId, NamespaceId, SymbolGraph};

/// A canonical reference to a semantic type. Two expressions have the same
/// type if and only if their `TypeId`s compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// Produced when resolution fails; propagates silently to avoid
    /// cascading diagnostics.
    Error,
    /// No syntactic type annotation was present.
    Implicit,
    Any,
    Nothing,
    Bool,
    SoftBool,
    Int,
    SoftInt,
    String,
    SoftString,
    Class(ClassId),
    /// `*T`: `T` or `Nothing`. Applying this to `Int`/`String` yields the
    /// types the data model calls `IntOpt`/`StringOpt`; they are not a
    /// separate enum variant here since hash-consing already gives every
    /// distinct `Optional(t)` its own stable identity.
    Optional(TypeId),
}

struct TypeData {
    kind: TypeKind,
    accepts_nothing: bool,
    is_ref_counted: bool,
}

/// Caches the built-in types at construction and hash-conses every class and
/// optional type resolved afterward.
pub struct TypeRegistry {
    types: Vec<TypeData>,
    by_kind: HashMap<TypeKind, TypeId>,
    error: TypeId,
    implicit: TypeId,
    any: TypeId,
    nothing: TypeId,
    bool_ty: TypeId,
    soft_bool: TypeId,
    int: TypeId,
    soft_int: TypeId,
    string: TypeId,
    soft_string: TypeId,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut reg = TypeRegistry {
            types: Vec::new(),
            by_kind: HashMap::new(),
            error: TypeId(0),
            implicit: TypeId(0),
            any: TypeId(0),
            nothing: TypeId(0),
            bool_ty: TypeId(0),
            soft_bool: TypeId(0),
            int: TypeId(0),
            soft_int: TypeId(0),
            string: TypeId(0),
            soft_string: TypeId(0),
        };
        reg.error = reg.intern(TypeKind::Error, true, true);
        reg.implicit = reg.intern(TypeKind::Implicit, true, false);
        reg.any = reg.intern(TypeKind::Any, true, true);
        reg.nothing = reg.intern(TypeKind::Nothing, true, false);
        reg.bool_ty = reg.intern(TypeKind::Bool, false, false);
        reg.soft_bool = reg.intern(TypeKind::SoftBool, false, false);
        reg.int = reg.intern(TypeKind::Int, false, false);
        reg.soft_int = reg.intern(TypeKind::SoftInt, false, false);
        reg.string = reg.intern(TypeKind::String, false, true);
        reg.soft_string = reg.intern(TypeKind::SoftString, false, true);
        reg
    }

    pub fn error(&self) -> TypeId {
        self.error
    }

    pub fn implicit(&self) -> TypeId {
        self.implicit
    }

    pub fn any(&self) -> TypeId {
        self.any
    }

    pub fn nothing(&self) -> TypeId {
        self.nothing
    }

    pub fn bool_ty(&self) -> TypeId {
        self.bool_ty
    }

    pub fn soft_bool(&self) -> TypeId {
        self.soft_bool
    }

    pub fn int(&self) -> TypeId {
        self.int
    }

    pub fn soft_int(&self) -> TypeId {
        self.soft_int
    }

    pub fn string(&self) -> TypeId {
        self.string
    }

    pub fn soft_string(&self) -> TypeId {
        self.soft_string
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()].kind
    }

    pub fn accepts_nothing(&self, id: TypeId) -> bool {
        self.types[id.index()].accepts_nothing
    }

    pub fn is_ref_counted(&self, id: TypeId) -> bool {
        self.types[id.index()].is_ref_counted
    }

    pub fn is_error(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Error)
    }

    pub fn class_of(&self, id: TypeId) -> Option<ClassId> {
        match self.kind(id) {
            TypeKind::Class(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the canonical `Class(c)` type, creating it on first request.
    pub fn class_type(&mut self, class: ClassId) -> TypeId {
        self.intern(TypeKind::Class(class), false, true)
    }

    /// Returns the canonical `Optional(t)` type, creating it on first
    /// request. Always accepts `Nothing`. An optional type is ref-counted
    /// unconditionally, regardless of `t` — `IntOpt`/`StringOpt`/... are all
    /// `isRefCounted()==true` in the original data model, not just the
    /// optionals of already-ref-counted types.
    pub fn optional(&mut self, inner: TypeId) -> TypeId {
        if let TypeKind::Optional(_) = self.kind(inner) {
            return inner;
        }
        self.intern(TypeKind::Optional(inner), true, true)
    }

    fn intern(&mut self, kind: TypeKind, accepts_nothing: bool, is_ref_counted: bool) -> TypeId {
        if let Some(&id) = self.by_kind.get(&kind) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeData { kind, accepts_nothing, is_ref_counted });
        self.by_kind.insert(kind, id);
        id
    }

    fn builtin_by_spelling(&self, spelling: &str) -> Option<TypeId> {
        match spelling {
            "int" => Some(self.int),
            "string" => Some(self.string),
            "bool" => Some(self.bool_ty),
            "any" => Some(self.any),
            "softint" => Some(self.soft_int),
            "softstring" => Some(self.soft_string),
            "softbool" => Some(self.soft_bool),
            _ => None,
        }
    }

    /// Resolves an AST type annotation seen from namespace `scope` into its
    /// canonical `TypeId`, resolving class names through `graph` and
    /// reporting through `sink` on failure.
    pub fn resolve(
        &mut self,
        graph: &SymbolGraph,
        scope: NamespaceId,
        annotation: &TypeAnnotation,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> TypeId {
        match annotation {
            TypeAnnotation::Implicit => self.implicit,
            TypeAnnotation::Invalid => self.error,
            TypeAnnotation::Basic(name) => self.resolve_name(graph, scope, name, interner, sink),
            TypeAnnotation::Asterisk(name) => {
                let inner = self.resolve_name(graph, scope, name, interner, sink);
                self.optional(inner)
            }
        }
    }

    fn resolve_name(
        &mut self,
        graph: &SymbolGraph,
        scope: NamespaceId,
        name: &Name,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> TypeId {
        if name.is_invalid() {
            return self.error;
        }
        if let Some(simple) = name.as_simple() {
            if let Some(builtin) = self.builtin_by_spelling(interner.get(simple)) {
                return builtin;
            }
        }
        match graph.resolve_class(scope, name, interner, sink) {
            Some(class) => self.class_type(class),
            None => self.error,
        }
    }

    /// A human-readable spelling, used only for diagnostics.
    pub fn display(&self, id: TypeId, graph: &SymbolGraph, interner: &Interner) -> String {
        match self.kind(id) {
            TypeKind::Error => "<error>".to_string(),
            TypeKind::Implicit => "<implicit>".to_string(),
            TypeKind::Any => "any".to_string(),
            TypeKind::Nothing => "nothing".to_string(),
            TypeKind::Bool => "bool".to_string(),
            TypeKind::SoftBool => "softbool".to_string(),
            TypeKind::Int => "int".to_string(),
            TypeKind::SoftInt => "softint".to_string(),
            TypeKind::String => "string".to_string(),
            TypeKind::SoftString => "softstring".to_string(),
            TypeKind::Class(c) => graph.class_full_name(*c, interner),
            TypeKind::Optional(inner) => format!("*{}", self.display(*inner, graph, interner)),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_distinct_and_stable() {
        let reg = TypeRegistry::new();
        assert_ne!(reg.int(), reg.string());
        assert_ne!(reg.int(), reg.soft_int());
        assert!(!reg.accepts_nothing(reg.int()));
        assert!(reg.accepts_nothing(reg.nothing()));
        assert!(reg.is_ref_counted(reg.string()));
        assert!(!reg.is_ref_counted(reg.int()));
    }

    #[test]
    fn optional_is_hash_consed() {
        let mut reg = TypeRegistry::new();
        let a = reg.optional(reg.int());
        let b = reg.optional(reg.int());
        assert_eq!(a, b);
        assert!(reg.accepts_nothing(a));
        assert!(reg.is_ref_counted(a));
    }

    #[test]
    fn optional_of_optional_collapses() {
        let mut reg = TypeRegistry::new();
        let once = reg.optional(reg.string());
        let twice = reg.optional(once);
        assert_eq!(once, twice);
    }

    #[test]
    fn optional_is_ref_counted_even_when_its_inner_type_is_not() {
        let mut reg = TypeRegistry::new();
        let int_opt = reg.optional(reg.int());
        let string_opt = reg.optional(reg.string());
        assert!(reg.is_ref_counted(int_opt));
        assert!(reg.is_ref_counted(string_opt));
    }
}
