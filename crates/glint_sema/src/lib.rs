//! Type registry, symbol graph, and scope machinery: the name- and
//! type-resolution layer between the untyped syntax tree `glint-syntax`
//! produces and the typed IR `glint-ir` emits.
//!
//! Nothing here lowers an expression or a statement; it only answers "what
//! does this name refer to" and "what type does this annotation resolve
//! to", and tracks local-variable lifetime bookkeeping for the IR emitter
//! to consume.

pub mod scope;
pub mod symbols;
pub mod types;

pub use scope::{LocalId, LocalVar, ScopeStack};
pub use symbols::{
    ClassData, ClassId, ConstantData, ConstantId, FieldData, FunctionData, FunctionId, GlobalData,
    GlobalId, MethodData, NamespaceId, ParamInfo, SymbolGraph,
};
pub use types::{TypeId, TypeKind, TypeRegistry};

use glint_base::{DiagnosticSink, Interner};
use glint_syntax::ast::SourceUnit;

/// Runs the full symbol-and-type analysis for one parsed source unit,
/// producing a [`SymbolGraph`] against a fresh [`TypeRegistry`].
pub fn analyze(
    unit: &SourceUnit<'_>,
    interner: &Interner,
    sink: &mut DiagnosticSink,
) -> (SymbolGraph, TypeRegistry) {
    let mut types = TypeRegistry::new();
    let graph = symbols::build(unit, &mut types, interner, sink);
    (graph, types)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_base::SourceInfo;
    use glint_syntax::{parse_source, AstArena};

    fn analyze_source(src: &str) -> (SymbolGraph, TypeRegistry, Interner, DiagnosticSink) {
        let arena = AstArena::new();
        let mut interner = Interner::new();
        let mut sink = DiagnosticSink::new();
        let unit = parse_source(SourceInfo::new("t.gl", "t.gl"), src.as_bytes(), &arena, &mut interner, &mut sink)
            .unwrap();
        let (graph, types) = analyze(&unit, &interner, &mut sink);
        (graph, types, interner, sink)
    }

    #[test]
    fn resolves_simple_class_from_root() {
        let (graph, types, interner, sink) = analyze_source("class Widget { int count; }");
        assert!(!sink.had_error());
        let (class_id, class) = graph.classes().next().expect("one class");
        assert_eq!(interner.get(class.name), "Widget");
        assert_eq!(class.fields.len(), 1);
        assert_eq!(class.fields[0].ty, types.int());
        let _ = class_id;
    }

    #[test]
    fn nested_namespace_declares_its_own_class() {
        let (graph, _, interner, sink) =
            analyze_source("namespace Shapes { class Circle { int radius; } }");
        assert!(!sink.had_error());
        let (_, class) = graph.classes().next().expect("one class");
        assert_eq!(graph.class_full_name(graph.classes().next().unwrap().0, &interner), "Shapes::Circle");
        assert_eq!(interner.get(class.name), "Circle");
    }

    #[test]
    fn duplicate_class_name_in_same_namespace_is_an_error() {
        let (_, _, _, sink) = analyze_source("class Dup {} class Dup {}");
        assert!(sink.had_error());
    }

    #[test]
    fn superclass_resolves_through_root() {
        let (graph, _, interner, sink) =
            analyze_source("class Base {} class Derived inherits Base { }");
        assert!(!sink.had_error());
        let derived = graph
            .classes()
            .find(|(_, c)| interner.get(c.name) == "Derived")
            .expect("Derived class")
            .1;
        assert_eq!(derived.superclasses.len(), 1);
    }

    #[test]
    fn unresolved_superclass_reports_unresolved_class() {
        let (_, _, _, sink) = analyze_source("class Derived inherits NoSuchClass { }");
        assert!(sink.had_error());
    }

    #[test]
    fn global_variable_type_resolves_to_builtin() {
        let (graph, types, _, sink) = analyze_source("our int counter = 0;");
        assert!(!sink.had_error());
        let (_, global) = graph.globals().next().expect("one global");
        assert_eq!(global.ty, types.int());
    }

    #[test]
    fn duplicate_global_name_is_an_error() {
        let (_, _, _, sink) = analyze_source("our int x = 0; our string x = \"a\";");
        assert!(sink.had_error());
    }

    #[test]
    fn functions_may_overload_on_parameter_types() {
        let (_, _, _, sink) = analyze_source(
            "int f(int a) { return a; } int f(string a) { return 0; }",
        );
        assert!(!sink.had_error());
    }

    #[test]
    fn duplicate_function_signature_is_an_error() {
        let (_, _, _, sink) =
            analyze_source("int f(int a) { return a; } int f(int b) { return b; }");
        assert!(sink.had_error());
    }

    #[test]
    fn optional_class_type_field_resolves() {
        let (graph, types, _, sink) = analyze_source("class Node { *Node next; }");
        assert!(!sink.had_error());
        let (_, node) = graph.classes().next().expect("one class");
        let field_ty = node.fields[0].ty;
        assert!(matches!(types.kind(field_ty), TypeKind::Optional(_)));
        assert!(types.accepts_nothing(field_ty));
    }
}
