//! Lowers a parsed, name-and-type-resolved source unit into the
//! stack-machine [`ir::Script`] a backend or persistence layer consumes.
//!
//! [`glint_sema::SymbolGraph`] only ever answers "what does this name refer
//! to" — it keeps no pointers back into the syntax tree it was built from.
//! [`lower`] re-walks [`glint_syntax::ast::SourceUnit`] a second time, in
//! the same order `glint_sema`'s declaration pass used, and re-resolves
//! each declaration's identity against the already-built graph to recover
//! the function bodies and global initializer expressions the symbol graph
//! itself does not retain.

mod convert;
mod emitter;
mod expr;
pub mod ir;
mod lowering;
mod operators;
mod stmt;

pub use ir::{
    AnyOp, ArithOp, BasicBlock, BlockId, ConversionId, FunctionIr, GlobalDecl, Instruction,
    LogicOp, Op, OperatorId, Script, Signature, StringLiteral, StringLiteralId, StringOp,
    Terminator, UserFunction,
};

use glint_base::{DiagnosticSink, Interner, SourceLocation};
use glint_sema::{GlobalId, NamespaceId, SymbolGraph, TypeId, TypeRegistry};
use glint_syntax::ast::{Decl, DeclKind, Expr, Name, SourceUnit};

use emitter::StringPool;
use lowering::Lowering;

/// Lowers `unit` into a [`Script`]. Per the core's contract, no `Script` is
/// produced for a compilation that reported any `Error`-level diagnostic —
/// `unit`'s declarations are only ever re-walked once `sink` is already
/// known to be clean.
pub fn lower(
    unit: &SourceUnit<'_>,
    graph: &SymbolGraph,
    types: &mut TypeRegistry,
    interner: &Interner,
    sink: &mut DiagnosticSink,
) -> Option<Script> {
    if sink.had_error() {
        return None;
    }

    let mut strings = StringPool::new();
    let mut user_functions = Vec::new();
    let mut global_inits = Vec::new();

    walk_members(
        unit.members,
        graph,
        types,
        interner,
        sink,
        graph.root(),
        &mut strings,
        &mut user_functions,
        &mut global_inits,
    );

    let globals = graph
        .globals()
        .map(|(_, g)| GlobalDecl { name: interner.get(g.name).to_string(), ty: g.ty })
        .collect();

    let nothing_ty = types.nothing();
    let mut top_level =
        Lowering::new(graph, types, interner, sink, &mut strings, graph.root(), nothing_ty);

    for (global, init_expr) in &global_inits {
        let declared_ty = top_level.graph.global(*global).ty;
        let value_ty = top_level.lower_expr(*init_expr);
        let _ = top_level.convert_to(value_ty, declared_ty, &SourceLocation::invalid());
        top_level.builder.push(ir::Op::GlobalWriteLock(*global));
        top_level.builder.push(ir::Op::GlobalInit(*global));
        top_level.builder.push(ir::Op::GlobalWriteUnlock(*global));
    }
    let mut fell_through = true;
    for stmt in unit.statements {
        if !top_level.lower_stmt(*stmt) {
            fell_through = false;
            break;
        }
    }
    let _ = fell_through;
    if !top_level.builder.is_current_closed() {
        top_level.builder.terminate(ir::Terminator::RetVoid);
    }
    top_level.builder.set_local_count(top_level.scope.local_count());
    let top_level_ir = top_level.builder.finish();

    if sink.had_error() {
        return None;
    }

    Some(Script { strings: strings.into_literals(), globals, user_functions, top_level: top_level_ir })
}

/// Recursively re-walks one namespace's declarations, collecting every
/// global initializer expression (to be lowered into the synthesized
/// `top_level` entry point's `GlobalInit` prologue) and lowering every free
/// function with a body into a [`UserFunction`].
#[allow(clippy::too_many_arguments)]
fn walk_members<'u>(
    decls: &'u [&'u Decl<'u>],
    graph: &SymbolGraph,
    types: &mut TypeRegistry,
    interner: &Interner,
    sink: &mut DiagnosticSink,
    ns: NamespaceId,
    strings: &mut StringPool,
    user_functions: &mut Vec<UserFunction>,
    global_inits: &mut Vec<(GlobalId, &'u Expr<'u>)>,
) {
    for decl in decls {
        match &decl.kind {
            DeclKind::Namespace { name, members } => {
                if let Some(child) = locate_namespace(graph, ns, name) {
                    walk_members(
                        *members,
                        graph,
                        types,
                        interner,
                        sink,
                        child,
                        strings,
                        user_functions,
                        global_inits,
                    );
                }
            }
            DeclKind::GlobalVariable { name, init: Some(init_expr), .. } => {
                if let Some(global) = graph.find_global(ns, *name) {
                    global_inits.push((global, *init_expr));
                }
            }
            DeclKind::Function { name, params, body: Some(body), .. } => {
                let container = match name.as_simple() {
                    Some(_) => Some(ns),
                    None => locate_container(graph, ns, name),
                };
                let Some(container) = container else { continue };
                let simple_name = match name.segments.last() {
                    Some(&s) => s,
                    None => continue,
                };
                // A throwaway sink: these types already resolved cleanly
                // while the symbol graph was built, and re-resolving through
                // the same hash-consing registry reproduces identical
                // `TypeId`s, used only to pick out which overload `params`
                // belongs to.
                let mut scratch = DiagnosticSink::new();
                let param_types: Vec<TypeId> = params
                    .iter()
                    .map(|p| types.resolve(graph, container, &p.ty, interner, &mut scratch))
                    .collect();
                let candidate = graph.functions_in(container, simple_name).into_iter().find(|&fid| {
                    let data = graph.function(fid);
                    let data_types: Vec<TypeId> = data.params.iter().map(|p| p.ty).collect();
                    data_types == param_types
                });
                let Some(function_id) = candidate else { continue };
                let function = lower_function(
                    graph,
                    types,
                    interner,
                    sink,
                    strings,
                    container,
                    function_id,
                    *body,
                );
                user_functions.push(function);
            }
            _ => {}
        }
    }
}

fn lower_function(
    graph: &SymbolGraph,
    types: &mut TypeRegistry,
    interner: &Interner,
    sink: &mut DiagnosticSink,
    strings: &mut StringPool,
    ns: NamespaceId,
    function_id: glint_sema::FunctionId,
    body: &glint_syntax::ast::Stmt<'_>,
) -> UserFunction {
    let data = graph.function(function_id);
    let return_type = data.return_type;
    let param_types: Vec<TypeId> = data.params.iter().map(|p| p.ty).collect();
    let fn_name = interner.get(data.name).to_string();

    let mut lowering = Lowering::new(graph, types, interner, sink, strings, ns, return_type);
    lowering.scope.push_scope();
    for param in &data.params {
        let id = lowering.scope.declare(
            param.name,
            param.ty,
            SourceLocation::invalid(),
            lowering.interner,
            lowering.sink,
        );
        lowering.builder.push(ir::Op::LifetimeStart(id));
    }
    let fell_through = lowering.lower_stmt(body);
    let declared = lowering.scope.pop_scope();
    if fell_through {
        lowering.emit_scope_cleanup(&declared);
    }
    if !lowering.builder.is_current_closed() {
        lowering.builder.terminate(ir::Terminator::RetVoid);
    }
    lowering.builder.set_local_count(lowering.scope.local_count());

    UserFunction {
        name: fn_name,
        signature: Signature { params: param_types, return_type },
        body: lowering.builder.finish(),
    }
}

/// Mirrors `glint_sema::symbols`'s private `locate_namespace`: walks
/// `name`'s segments as a path of *already-declared* sub-namespaces,
/// starting from `from` (or the root, if rooted).
fn locate_namespace(graph: &SymbolGraph, from: NamespaceId, name: &Name) -> Option<NamespaceId> {
    let mut cur = if name.rooted { graph.root() } else { from };
    for &segment in &name.segments {
        cur = graph.find_namespace(cur, segment)?;
    }
    Some(cur)
}

/// Same walk, but stops one segment short: resolves the namespace a
/// qualified declaration name's *last* segment should be filed under.
fn locate_container(graph: &SymbolGraph, from: NamespaceId, name: &Name) -> Option<NamespaceId> {
    if name.segments.is_empty() {
        return None;
    }
    let mut cur = if name.rooted { graph.root() } else { from };
    for &segment in &name.segments[..name.segments.len() - 1] {
        cur = graph.find_namespace(cur, segment)?;
    }
    Some(cur)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_base::SourceInfo;
    use glint_syntax::{parse_source, AstArena};

    fn lower_source(src: &str) -> (Option<Script>, DiagnosticSink) {
        let arena = AstArena::new();
        let mut interner = Interner::new();
        let mut sink = DiagnosticSink::new();
        let unit =
            parse_source(SourceInfo::new("t.gl", "t.gl"), src.as_bytes(), &arena, &mut interner, &mut sink)
                .unwrap();
        let (graph, mut types) = glint_sema::analyze(&unit, &interner, &mut sink);
        let script = lower(&unit, &graph, &mut types, &interner, &mut sink);
        (script, sink)
    }

    #[test]
    fn a_global_initializer_lowers_into_the_top_level_prologue() {
        let (script, sink) = lower_source("our int counter = 0;");
        assert!(!sink.had_error());
        let script = script.expect("a clean compile produces a script");
        assert_eq!(script.globals.len(), 1);
        let has_init = script
            .top_level
            .blocks
            .iter()
            .flat_map(|b| &b.instructions)
            .any(|i| matches!(i.op, Op::GlobalInit(_)));
        assert!(has_init);
    }

    #[test]
    fn a_free_function_with_a_body_lowers_into_user_functions() {
        let (script, sink) = lower_source("int add(int a, int b) { return a + b; }");
        assert!(!sink.had_error());
        let script = script.expect("a clean compile produces a script");
        assert_eq!(script.user_functions.len(), 1);
        assert_eq!(script.user_functions[0].name, "add");
        let has_op = script.user_functions[0]
            .body
            .blocks
            .iter()
            .flat_map(|b| &b.instructions)
            .any(|i| matches!(i.op, Op::InvokeBinaryOperator(_)));
        assert!(has_op);
    }

    #[test]
    fn declaration_with_initializer_emits_lifetime_start() {
        let (script, sink) = lower_source("int f() { int x = 5; return x; }");
        assert!(!sink.had_error());
        let script = script.expect("a clean compile produces a script");
        let body = &script.user_functions[0].body;
        let has_start = body.blocks.iter().flat_map(|b| &b.instructions).any(|i| matches!(i.op, Op::LifetimeStart(_)));
        assert!(has_start);
    }

    #[test]
    fn a_declaration_error_suppresses_ir_generation() {
        let (script, sink) = lower_source("our int x = 0; our string x = \"dup\";");
        assert!(sink.had_error());
        assert!(script.is_none());
    }

    #[test]
    fn unsupported_construct_is_diagnosed_not_panicked() {
        let (script, sink) = lower_source("int f() { while (true) { } return 0; }");
        assert!(sink.had_error());
        assert!(script.is_none());
    }

    #[test]
    fn an_if_statement_branches_and_rejoins() {
        let (script, sink) =
            lower_source("int f(int a) { if (a) { return 1; } return 0; }");
        assert!(!sink.had_error());
        let script = script.expect("a clean compile produces a script");
        let body = &script.user_functions[0].body;
        assert!(body.blocks.len() >= 4);
    }

    #[test]
    fn try_catch_installs_a_landing_pad() {
        let (script, sink) =
            lower_source("int f() { try { return 1; } catch (ex) { return 0; } }");
        assert!(!sink.had_error());
        let script = script.expect("a clean compile produces a script");
        let body = &script.user_functions[0].body;
        let has_lpad = body.blocks.iter().flat_map(|b| &b.instructions).any(|i| matches!(i.op, Op::LandingPad(_)));
        assert!(has_lpad);
    }
}
