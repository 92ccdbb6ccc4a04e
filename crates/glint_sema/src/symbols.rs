//! Symbol graph: namespaces, classes, globals, constants, and functions,
//! plus the name-resolution algorithm that walks them.
//!
//! The original front-end builds this as a tree of heap-allocated
//! `Namespace`/`Class` objects linked by raw parent pointers and owning
//! `unique_ptr<Symbol>` children. Here every node lives in one of a handful
//! of flat `Vec`s and is addressed by a small `Copy` id (`NamespaceId`,
//! `ClassId`, ...); "parent pointer" becomes `Option<NamespaceId>` and
//! "owns by unique pointer" becomes "is the only `Vec` that pushes this
//! variant of id". This is the same trade the syntax tree made with its
//! arena: no lifetimes to manage, no borrow conflicts between a node and
//! the table that owns it.

use std::collections::HashMap;

use glint_base::{DiagnosticId, DiagnosticSink, Interner, SourceLocation, StringId};
use glint_syntax::ast::{Decl, DeclKind, Modifiers, Name, Param, SourceUnit};
use serde::{Deserialize, Serialize};

use crate::types::{TypeId, TypeRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstantId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionId(u32);

impl NamespaceId {
    /// The anonymous namespace every compilation is rooted at.
    pub const ROOT: NamespaceId = NamespaceId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl ClassId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeMember {
    Namespace(NamespaceId),
    Class(ClassId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueMember {
    Global(GlobalId),
    Constant(ConstantId),
    /// All overload variants declared under this name in this namespace.
    Functions,
}

struct NamespaceData {
    name: Option<StringId>,
    parent: Option<NamespaceId>,
    location: SourceLocation,
    /// Sub-namespace and class names: mutually unique within one namespace.
    types: Vec<(StringId, TypeMember)>,
    /// Global, constant, and function names: mutually unique except that
    /// functions may overload on signature.
    values: Vec<(StringId, ValueMember)>,
    functions: Vec<FunctionId>,
}

pub struct ParamInfo {
    pub name: StringId,
    pub ty: TypeId,
}

pub struct GlobalData {
    pub name: StringId,
    pub namespace: NamespaceId,
    pub location: SourceLocation,
    pub ty: TypeId,
}

pub struct ConstantData {
    pub name: StringId,
    pub namespace: NamespaceId,
    pub location: SourceLocation,
}

pub struct FunctionData {
    pub name: StringId,
    pub namespace: NamespaceId,
    pub location: SourceLocation,
    pub modifiers: Modifiers,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    pub has_body: bool,
}

pub struct FieldData {
    pub name: StringId,
    pub location: SourceLocation,
    pub modifiers: Modifiers,
    pub ty: TypeId,
}

pub struct MethodData {
    pub name: StringId,
    pub location: SourceLocation,
    pub modifiers: Modifiers,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    pub has_body: bool,
}

pub struct ClassData {
    pub name: StringId,
    pub namespace: NamespaceId,
    pub location: SourceLocation,
    pub modifiers: Modifiers,
    pub superclasses: Vec<(Modifiers, ClassId)>,
    pub fields: Vec<FieldData>,
    pub methods: Vec<MethodData>,
}

/// Owns every namespace, class, global, constant, and function discovered
/// while building one compilation's symbol graph.
pub struct SymbolGraph {
    namespaces: Vec<NamespaceData>,
    classes: Vec<ClassData>,
    globals: Vec<GlobalData>,
    constants: Vec<ConstantData>,
    functions: Vec<FunctionData>,
}

impl SymbolGraph {
    fn new() -> Self {
        SymbolGraph {
            namespaces: vec![NamespaceData {
                name: None,
                parent: None,
                location: SourceLocation::invalid(),
                types: Vec::new(),
                values: Vec::new(),
                functions: Vec::new(),
            }],
            classes: Vec::new(),
            globals: Vec::new(),
            constants: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn root(&self) -> NamespaceId {
        NamespaceId::ROOT
    }

    pub fn is_root(&self, ns: NamespaceId) -> bool {
        self.namespaces[ns.index()].parent.is_none()
    }

    pub fn parent_of(&self, ns: NamespaceId) -> Option<NamespaceId> {
        self.namespaces[ns.index()].parent
    }

    pub fn class(&self, id: ClassId) -> &ClassData {
        &self.classes[id.index()]
    }

    pub fn global(&self, id: GlobalId) -> &GlobalData {
        &self.globals[id.0 as usize]
    }

    pub fn constant(&self, id: ConstantId) -> &ConstantData {
        &self.constants[id.0 as usize]
    }

    pub fn function(&self, id: FunctionId) -> &FunctionData {
        &self.functions[id.0 as usize]
    }

    /// Looks up a global variable declared directly in `ns` by name.
    pub fn find_global(&self, ns: NamespaceId, name: StringId) -> Option<GlobalId> {
        self.namespaces[ns.index()].values.iter().find_map(|(n, m)| {
            if *n == name {
                if let ValueMember::Global(id) = m {
                    return Some(*id);
                }
            }
            None
        })
    }

    pub fn functions_in(&self, ns: NamespaceId, name: StringId) -> Vec<FunctionId> {
        self.namespaces[ns.index()]
            .functions
            .iter()
            .copied()
            .filter(|&f| self.functions[f.0 as usize].name == name)
            .collect()
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassData)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, c)| (ClassId(i as u32), c))
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &FunctionData)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FunctionId(i as u32), f))
    }

    pub fn globals(&self) -> impl Iterator<Item = (GlobalId, &GlobalData)> {
        self.globals
            .iter()
            .enumerate()
            .map(|(i, g)| (GlobalId(i as u32), g))
    }

    /// The full, `::`-separated name of a namespace, for diagnostics.
    pub fn namespace_full_name(&self, ns: NamespaceId, interner: &Interner) -> String {
        if self.is_root(ns) {
            return "the root namespace".to_string();
        }
        let mut segments = Vec::new();
        let mut cur = Some(ns);
        while let Some(id) = cur {
            let data = &self.namespaces[id.index()];
            if let Some(name) = data.name {
                segments.push(interner.get(name).to_string());
            }
            cur = data.parent;
        }
        segments.reverse();
        segments.join("::")
    }

    pub fn class_full_name(&self, class: ClassId, interner: &Interner) -> String {
        let data = &self.classes[class.index()];
        let prefix = self.namespace_full_name(data.namespace, interner);
        let name = interner.get(data.name);
        if self.is_root(data.namespace) {
            name.to_string()
        } else {
            format!("{prefix}::{name}")
        }
    }

    /// Looks up a direct sub-namespace of `ns` by name, without descending
    /// further. Used by callers (the IR lowering pass, in particular) that
    /// re-walk the same declaration tree this graph was built from and need
    /// to find the namespace a nested declaration was filed under.
    pub fn find_namespace(&self, ns: NamespaceId, name: StringId) -> Option<NamespaceId> {
        self.namespaces[ns.index()].types.iter().find_map(|(n, m)| {
            if *n == name {
                if let TypeMember::Namespace(id) = m {
                    return Some(*id);
                }
            }
            None
        })
    }

    fn find_class(&self, ns: NamespaceId, name: StringId) -> Option<ClassId> {
        self.namespaces[ns.index()].types.iter().find_map(|(n, m)| {
            if *n == name {
                if let TypeMember::Class(id) = m {
                    return Some(*id);
                }
            }
            None
        })
    }

    /// Exact path lookup: `A::B::C` matches only if the whole path exists
    /// starting from `ns`.
    fn lookup_class_path(&self, ns: NamespaceId, segments: &[StringId]) -> Option<ClassId> {
        debug_assert!(!segments.is_empty());
        if segments.len() == 1 {
            return self.find_class(ns, segments[0]);
        }
        let child = self.find_namespace(ns, segments[0])?;
        self.lookup_class_path(child, &segments[1..])
    }

    fn collect_classes(&self, ns: NamespaceId, segments: &[StringId], out: &mut Vec<ClassId>) {
        if let Some(class) = self.lookup_class_path(ns, segments) {
            out.push(class);
        }
        for (_, member) in &self.namespaces[ns.index()].types {
            if let TypeMember::Namespace(child) = member {
                self.collect_classes(*child, segments, out);
            }
        }
    }

    /// Resolves a (possibly qualified) class name seen from namespace
    /// `scope`, per the rooted / lexical-walk / descendant-search algorithm.
    pub fn resolve_class(
        &self,
        scope: NamespaceId,
        name: &Name,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> Option<ClassId> {
        if name.is_invalid() {
            return None;
        }
        if name.rooted {
            if let Some(class) = self.lookup_class_path(self.root(), &name.segments) {
                return Some(class);
            }
            sink.report(DiagnosticId::SemaUnresolvedClass, name.start.clone())
                .arg(spell(name, interner))
                .arg(self.namespace_full_name(self.root(), interner));
            return None;
        }
        let mut cur = Some(scope);
        while let Some(ns) = cur {
            if let Some(class) = self.lookup_class_path(ns, &name.segments) {
                return Some(class);
            }
            cur = self.parent_of(ns);
        }
        let mut candidates = Vec::new();
        self.collect_classes(self.root(), &name.segments, &mut candidates);
        match candidates.len() {
            1 => Some(candidates[0]),
            0 => {
                sink.report(DiagnosticId::SemaUnresolvedClass, name.start.clone())
                    .arg(spell(name, interner))
                    .arg(self.namespace_full_name(scope, interner));
                None
            }
            _ => {
                sink.report(DiagnosticId::SemaAmbiguousClass, name.start.clone())
                    .arg(spell(name, interner))
                    .arg(self.namespace_full_name(scope, interner));
                None
            }
        }
    }

    fn add_namespace(
        &mut self,
        parent: NamespaceId,
        name: StringId,
        location: SourceLocation,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> NamespaceId {
        if let Some(existing) = self.find_namespace(parent, name) {
            return existing;
        }
        if let Some(class) = self.find_class(parent, name) {
            sink.report(DiagnosticId::SemaDuplicateClassName, location.clone())
                .arg(interner.get(name))
                .arg(self.namespace_full_name(parent, interner));
            sink.report(
                DiagnosticId::SemaPreviousDeclaration,
                self.classes[class.index()].location.clone(),
            );
            return parent;
        }
        let id = NamespaceId(self.namespaces.len() as u32);
        self.namespaces.push(NamespaceData {
            name: Some(name),
            parent: Some(parent),
            location,
            types: Vec::new(),
            values: Vec::new(),
            functions: Vec::new(),
        });
        self.namespaces[parent.index()].types.push((name, TypeMember::Namespace(id)));
        id
    }

    /// Finds or creates the namespace path named by every segment but the
    /// last one of `name`, starting from `scope` (or the root, if rooted).
    /// Used to let a qualified declaration name (`function Foo::bar() {}`)
    /// reach into a namespace it does not lexically sit inside.
    fn resolve_or_create_container(
        &mut self,
        scope: NamespaceId,
        name: &Name,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> NamespaceId {
        let mut cur = if name.rooted { self.root() } else { scope };
        for &segment in &name.segments[..name.segments.len() - 1] {
            cur = self.add_namespace(cur, segment, name.start.clone(), interner, sink);
        }
        cur
    }

    fn add_class(
        &mut self,
        parent: NamespaceId,
        name: StringId,
        location: SourceLocation,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> ClassId {
        if let Some(existing) = self.find_class(parent, name) {
            sink.report(DiagnosticId::SemaDuplicateClassName, location.clone())
                .arg(interner.get(name))
                .arg(self.namespace_full_name(parent, interner));
            sink.report(
                DiagnosticId::SemaPreviousDeclaration,
                self.classes[existing.index()].location.clone(),
            );
            return existing;
        }
        if let Some(ns) = self.find_namespace(parent, name) {
            sink.report(DiagnosticId::SemaDuplicateClassName, location.clone())
                .arg(interner.get(name))
                .arg(self.namespace_full_name(parent, interner));
            sink.report(
                DiagnosticId::SemaPreviousDeclaration,
                self.namespaces[ns.index()].location.clone(),
            );
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassData {
            name,
            namespace: parent,
            location: location.clone(),
            modifiers: Modifiers::empty(),
            superclasses: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        });
        self.namespaces[parent.index()].types.push((name, TypeMember::Class(id)));
        id
    }

    fn check_value_name_free(
        &mut self,
        ns: NamespaceId,
        name: StringId,
        location: &SourceLocation,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> bool {
        for (existing_name, member) in &self.namespaces[ns.index()].values {
            if *existing_name != name {
                continue;
            }
            let previous = match member {
                ValueMember::Global(g) => self.globals[g.0 as usize].location.clone(),
                ValueMember::Constant(c) => self.constants[c.0 as usize].location.clone(),
                ValueMember::Functions => {
                    // Functions overload; let the caller compare signatures.
                    continue;
                }
            };
            sink.report(DiagnosticId::SemaDuplicateGlobalVariableName, location.clone())
                .arg(interner.get(name))
                .arg(self.namespace_full_name(ns, interner));
            sink.report(DiagnosticId::SemaPreviousDeclaration, previous);
            return false;
        }
        true
    }

    fn add_global(
        &mut self,
        ns: NamespaceId,
        name: StringId,
        location: SourceLocation,
        ty: TypeId,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> GlobalId {
        self.check_value_name_free(ns, name, &location, interner, sink);
        let id = GlobalId(self.globals.len() as u32);
        self.globals.push(GlobalData { name, namespace: ns, location, ty });
        self.namespaces[ns.index()].values.push((name, ValueMember::Global(id)));
        id
    }

    fn add_constant(
        &mut self,
        ns: NamespaceId,
        name: StringId,
        location: SourceLocation,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> ConstantId {
        self.check_value_name_free(ns, name, &location, interner, sink);
        let id = ConstantId(self.constants.len() as u32);
        self.constants.push(ConstantData { name, namespace: ns, location });
        self.namespaces[ns.index()].values.push((name, ValueMember::Constant(id)));
        id
    }

    fn add_function(
        &mut self,
        ns: NamespaceId,
        data: FunctionData,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> FunctionId {
        let name = data.name;
        let param_types: Vec<TypeId> = data.params.iter().map(|p| p.ty).collect();
        let existing = self.functions_in(ns, name);
        for other in &existing {
            let other_types: Vec<TypeId> =
                self.functions[other.0 as usize].params.iter().map(|p| p.ty).collect();
            if other_types == param_types {
                sink.report(
                    DiagnosticId::SemaDuplicateGlobalVariableName,
                    data.location.clone(),
                )
                .arg(interner.get(name))
                .arg(self.namespace_full_name(ns, interner));
                sink.report(
                    DiagnosticId::SemaPreviousDeclaration,
                    self.functions[other.0 as usize].location.clone(),
                );
                break;
            }
        }
        if existing.is_empty() {
            let conflicts_with_non_function = self.namespaces[ns.index()]
                .values
                .iter()
                .any(|(n, m)| *n == name && !matches!(m, ValueMember::Functions));
            if conflicts_with_non_function {
                self.check_value_name_free(ns, name, &data.location, interner, sink);
            } else {
                self.namespaces[ns.index()].values.push((name, ValueMember::Functions));
            }
        }
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(data);
        self.namespaces[ns.index()].functions.push(id);
        id
    }

    fn add_method(&mut self, class: ClassId, data: MethodData) {
        self.classes[class.index()].methods.push(data);
    }

    fn add_field(&mut self, class: ClassId, data: FieldData) {
        self.classes[class.index()].fields.push(data);
    }
}

impl Default for SymbolGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn spell(name: &Name, interner: &Interner) -> String {
    let mut out = String::new();
    if name.rooted {
        out.push_str("::");
    }
    for (i, seg) in name.segments.iter().enumerate() {
        if i > 0 {
            out.push_str("::");
        }
        out.push_str(interner.get(*seg));
    }
    out
}

/// Builds a [`SymbolGraph`] and [`TypeRegistry`] from one parsed source
/// unit. Runs the three passes the original analyzer documents: collect
/// namespaces/classes, then declare typed namespace members, then process
/// class bodies.
pub fn build(
    unit: &SourceUnit<'_>,
    types: &mut TypeRegistry,
    interner: &Interner,
    sink: &mut DiagnosticSink,
) -> SymbolGraph {
    let mut graph = SymbolGraph::new();
    let root = graph.root();

    collect_pass(&mut graph, root, unit.members, interner, sink);
    declare_pass(&mut graph, types, root, unit.members, interner, sink);

    graph
}

/// Pass 1: establish the namespace/class tree so later passes can name
/// containers before analysing their contents.
fn collect_pass(
    graph: &mut SymbolGraph,
    ns: NamespaceId,
    decls: &[&Decl<'_>],
    interner: &Interner,
    sink: &mut DiagnosticSink,
) {
    for decl in decls {
        match &decl.kind {
            DeclKind::Namespace { name, members } => {
                if let Some(simple) = name.as_simple() {
                    let child = graph.add_namespace(ns, simple, decl.start.clone(), interner, sink);
                    collect_pass(graph, child, members, interner, sink);
                } else if !name.is_invalid() {
                    let container = graph.resolve_or_create_container(ns, name, interner, sink);
                    let last = *name.segments.last().unwrap();
                    let child = graph.add_namespace(container, last, decl.start.clone(), interner, sink);
                    collect_pass(graph, child, members, interner, sink);
                }
            }
            DeclKind::Class { name, .. } => {
                graph.add_class(ns, *name, decl.start.clone(), interner, sink);
            }
            _ => {}
        }
    }
}

/// Pass 2: declare globals, constants, and functions, resolving their types
/// against the namespace tree pass 1 built.
fn declare_pass(
    graph: &mut SymbolGraph,
    types: &mut TypeRegistry,
    ns: NamespaceId,
    decls: &[&Decl<'_>],
    interner: &Interner,
    sink: &mut DiagnosticSink,
) {
    for decl in decls {
        match &decl.kind {
            DeclKind::Namespace { name, members } => {
                // The namespace itself was created in pass 1; re-locate it
                // by walking the same path so nested members see the right
                // container even when the declaration merges into an
                // already-existing namespace of the same name.
                if let Some(child) = locate_namespace(graph, ns, name) {
                    declare_pass(graph, types, child, members, interner, sink);
                }
            }
            DeclKind::GlobalVariable { ty, name, .. } => {
                let resolved = types.resolve(graph, ns, ty, interner, sink);
                graph.add_global(ns, *name, decl.start.clone(), resolved, interner, sink);
            }
            DeclKind::Constant { name, .. } => {
                graph.add_constant(ns, *name, decl.start.clone(), interner, sink);
            }
            DeclKind::Class { name, superclasses, members, .. } => {
                if let Some(class) = graph.find_class(ns, *name) {
                    declare_class_body(graph, types, class, ns, superclasses, members, interner, sink);
                }
            }
            DeclKind::Function { name, modifiers, params, return_type, body } => {
                let container = if name.as_simple().is_some() {
                    ns
                } else {
                    graph.resolve_or_create_container(ns, name, interner, sink)
                };
                let simple_name = name.segments.last().copied().unwrap_or(StringId::NONE);
                let param_infos = resolve_params(graph, types, ns, params, interner, sink);
                let resolved_return = types.resolve(graph, ns, return_type, interner, sink);
                graph.add_function(
                    container,
                    FunctionData {
                        name: simple_name,
                        namespace: container,
                        location: decl.start.clone(),
                        modifiers: *modifiers,
                        params: param_infos,
                        return_type: resolved_return,
                        has_body: body.is_some(),
                    },
                    interner,
                    sink,
                );
            }
            _ => {}
        }
    }
}

fn resolve_params(
    graph: &SymbolGraph,
    types: &mut TypeRegistry,
    ns: NamespaceId,
    params: &[Param<'_>],
    interner: &Interner,
    sink: &mut DiagnosticSink,
) -> Vec<ParamInfo> {
    params
        .iter()
        .map(|p| ParamInfo { name: p.name, ty: types.resolve(graph, ns, &p.ty, interner, sink) })
        .collect()
}

fn locate_namespace(graph: &SymbolGraph, from: NamespaceId, name: &Name) -> Option<NamespaceId> {
    let mut cur = if name.rooted { graph.root() } else { from };
    for &segment in &name.segments {
        cur = graph.find_namespace(cur, segment)?;
    }
    Some(cur)
}

/// Pass 3 (folded into the declare-pass class arm above): registers a
/// class's superclasses, fields, and methods while its AST member slice is
/// still reachable. Resolves superclasses against `enclosing_ns`, the
/// namespace the class itself is declared in.
fn declare_class_body(
    graph: &mut SymbolGraph,
    types: &mut TypeRegistry,
    class: ClassId,
    enclosing_ns: NamespaceId,
    superclasses: &[(Modifiers, Name)],
    members: &[&Decl<'_>],
    interner: &Interner,
    sink: &mut DiagnosticSink,
) {
    let mut resolved_supers = Vec::new();
    for (modifiers, name) in superclasses {
        if let Some(super_class) = graph.resolve_class(enclosing_ns, name, interner, sink) {
            resolved_supers.push((*modifiers, super_class));
        }
    }
    graph.classes[class.index()].superclasses = resolved_supers;

    declare_class_members(graph, types, class, enclosing_ns, members, interner, sink);
}

fn declare_class_members(
    graph: &mut SymbolGraph,
    types: &mut TypeRegistry,
    class: ClassId,
    enclosing_ns: NamespaceId,
    members: &[&Decl<'_>],
    interner: &Interner,
    sink: &mut DiagnosticSink,
) {
    for decl in members {
        match &decl.kind {
            DeclKind::Field { name, modifiers, ty, .. } => {
                let resolved = types.resolve(graph, enclosing_ns, ty, interner, sink);
                graph.add_field(
                    class,
                    FieldData {
                        name: *name,
                        location: decl.start.clone(),
                        modifiers: *modifiers,
                        ty: resolved,
                    },
                );
            }
            DeclKind::Method { name, modifiers, params, return_type, body } => {
                let param_infos = resolve_params(graph, types, enclosing_ns, params, interner, sink);
                let resolved_return = types.resolve(graph, enclosing_ns, return_type, interner, sink);
                graph.add_method(
                    class,
                    MethodData {
                        name: *name,
                        location: decl.start.clone(),
                        modifiers: *modifiers,
                        params: param_infos,
                        return_type: resolved_return,
                        has_body: body.is_some(),
                    },
                );
            }
            DeclKind::Constant { .. } => {
                // Class-scoped constants share storage with the field list
                // in the original design's "not detailed here" note; bodies
                // are evaluated during IR lowering, not here.
            }
            DeclKind::MemberGroup { members: nested, .. } => {
                declare_class_members(graph, types, class, enclosing_ns, nested, interner, sink);
            }
            _ => {}
        }
    }
}

