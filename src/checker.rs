//! A scoped binder that resolves member accesses to declarations.
//!
//! Resolution is lexical. Every class and interface becomes a type entity
//! owned by the scope that declares it, and names are looked up through the
//! chain of enclosing scopes, so a local class or a type parameter hides an
//! outer declaration with the same name.
//!
//! [`Checker::new`] works in three steps:
//!
//! 1. Hoisting binds the top-level declarations of every file. A file with
//!    imports or exports gets its own module scope; the rest share one global
//!    scope, as TypeScript scripts do. Imports are then linked to the exports
//!    of the file they name.
//! 2. Resolution fills in each entity's base types and the declared types of
//!    its members, looked up from the declaring scope.
//! 3. Binding walks each file with a scope stack, hoisting block-level
//!    declarations on entry, and records the static type of the receiver of
//!    every member access it can determine.
//!
//! A name declared as a class twice in one scope (two scripts, say) is
//! ambiguous and resolves to nothing. Whatever cannot be resolved is left
//! unresolved, so the transform renames less rather than more.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};

use swc_common::comments::SingleThreadedComments;
use swc_common::Span;
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, Callee, CatchClause, Class, ClassExpr, ClassMember, ClassMethod,
    ClassProp, Constructor, Decl, DefaultDecl, ExportSpecifier, Expr, ForInStmt, ForOfStmt,
    ForStmt, Function, GetterProp, ImportSpecifier, MemberExpr, MemberProp, MethodKind,
    ModuleDecl, ModuleExportName, ModuleItem, ObjectPatProp, OptChainBase, ParamOrTsParamProp,
    Pat, PrivateMethod, PrivateProp, SetterProp, StaticBlock, Stmt, SuperProp, SuperPropExpr,
    SwitchStmt, TsEntityName, TsInterfaceDecl, TsModuleBlock, TsModuleName, TsParamPropParam,
    TsType, TsTypeAnn, TsTypeElement, TsTypeParamDecl, VarDecl, VarDeclKind,
};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::{debug, trace};

use crate::program::Program;
use crate::resolver::{Access, Declaration, Symbol, SymbolResolver};

/// Identifies a class or interface entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(usize);

/// The static type of an access receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receiver {
    pub type_id: TypeId,
    /// The receiver is the class itself: `Foo.x`, or `this` in a static member.
    pub is_static: bool,
}

impl Receiver {
    pub fn instance(type_id: TypeId) -> Self {
        Receiver {
            type_id,
            is_static: false,
        }
    }

    pub fn class(type_id: TypeId) -> Self {
        Receiver {
            type_id,
            is_static: true,
        }
    }
}

// ============================================================================
// Type index
// ============================================================================

#[derive(Debug, Clone)]
struct Member {
    declaration: Declaration,
    is_static: bool,
    /// Declared type of a property, parameter property, signature or getter.
    value_type: Option<Receiver>,
    /// Declared return type of a method.
    return_type: Option<Receiver>,
}

/// One class or interface, merged with same-scope declarations of the name.
#[derive(Debug, Default)]
struct Entity {
    name: String,
    has_class: bool,
    bases: Vec<TypeId>,
    members: Vec<Member>,
}

/// Declarations bound in a scope that still need their types resolved.
enum Pending<'n> {
    Class(TypeId, &'n Class),
    Interface(TypeId, &'n TsInterfaceDecl),
    Function(String, &'n Function),
}

#[derive(Debug, Default)]
struct TypeIndex {
    entities: Vec<Entity>,
    by_class: HashMap<Span, TypeId>,
}

impl TypeIndex {
    fn new_entity(&mut self, name: &str) -> TypeId {
        self.entities.push(Entity {
            name: name.to_string(),
            ..Entity::default()
        });
        TypeId(self.entities.len() - 1)
    }

    fn declare_class<'n>(
        &mut self,
        scope: &mut Scope,
        name: Option<&str>,
        class: &'n Class,
        pending: &mut Vec<Pending<'n>>,
    ) -> TypeId {
        let id = match name {
            None => self.new_entity("default"),
            Some(name) => match scope.types.get(name).copied() {
                None => {
                    let id = self.new_entity(name);
                    scope.types.insert(name.to_string(), TypeBinding::Entity(id));
                    scope.values.insert(name.to_string(), Value::Class(id));
                    id
                }
                Some(TypeBinding::Entity(existing)) if !self.entities[existing.0].has_class => {
                    scope.values.insert(name.to_string(), Value::Class(existing));
                    existing
                }
                Some(TypeBinding::Entity(_)) => {
                    debug!(name, "class declared twice in one scope, treating as ambiguous");
                    scope.types.insert(name.to_string(), TypeBinding::Opaque);
                    scope.values.insert(name.to_string(), Value::Unknown);
                    self.new_entity(name)
                }
                Some(TypeBinding::Opaque) => self.new_entity(name),
            },
        };
        self.entities[id.0].has_class = true;
        self.by_class.insert(class.span, id);
        pending.push(Pending::Class(id, class));
        id
    }

    fn declare_interface<'n>(
        &mut self,
        scope: &mut Scope,
        decl: &'n TsInterfaceDecl,
        pending: &mut Vec<Pending<'n>>,
    ) -> TypeId {
        let name = decl.id.sym.to_string();
        let id = match scope.types.get(&name).copied() {
            Some(TypeBinding::Entity(existing)) => existing,
            Some(TypeBinding::Opaque) => self.new_entity(&name),
            None => {
                let id = self.new_entity(&name);
                scope.types.insert(name, TypeBinding::Entity(id));
                id
            }
        };
        pending.push(Pending::Interface(id, decl));
        id
    }

    /// Bind `decl` in `scope`, queueing whatever needs resolving.
    fn declare<'n>(&mut self, scope: &mut Scope, decl: &'n Decl, pending: &mut Vec<Pending<'n>>) {
        match decl {
            Decl::Class(d) => {
                self.declare_class(scope, Some(&*d.ident.sym), &d.class, pending);
            }
            Decl::TsInterface(d) => {
                self.declare_interface(scope, d, pending);
            }
            Decl::Fn(d) => {
                let name = d.ident.sym.to_string();
                scope.values.insert(name.clone(), Value::Function(None));
                pending.push(Pending::Function(name, &d.function));
            }
            Decl::Var(v) => {
                for declarator in &v.decls {
                    scope.declare_unknown(&declarator.name);
                }
            }
            Decl::Using(u) => {
                for declarator in &u.decls {
                    scope.declare_unknown(&declarator.name);
                }
            }
            Decl::TsTypeAlias(d) => {
                scope
                    .types
                    .entry(d.id.sym.to_string())
                    .or_insert(TypeBinding::Opaque);
            }
            Decl::TsEnum(d) => {
                scope
                    .types
                    .entry(d.id.sym.to_string())
                    .or_insert(TypeBinding::Opaque);
                scope
                    .values
                    .entry(d.id.sym.to_string())
                    .or_insert(Value::Unknown);
            }
            Decl::TsModule(d) => {
                if let TsModuleName::Ident(id) = &d.id {
                    scope
                        .values
                        .entry(id.sym.to_string())
                        .or_insert(Value::Unknown);
                }
            }
        }
    }

    /// Resolve queued declarations against `scopes`, the chain they were
    /// declared in. Returns the return types of queued functions.
    fn resolve(
        &mut self,
        scopes: &Scopes,
        pending: Vec<Pending<'_>>,
        comments: &SingleThreadedComments,
    ) -> Vec<(String, Option<Receiver>)> {
        let mut functions = Vec::new();
        for work in pending {
            match work {
                Pending::Class(id, class) => self.resolve_class(scopes, id, class, comments),
                Pending::Interface(id, decl) => {
                    self.resolve_interface(scopes, id, decl, comments)
                }
                Pending::Function(name, function) => {
                    let shadow = type_param_names(function.type_params.as_deref());
                    let ret = resolve_annotation(scopes, &shadow, function.return_type.as_deref());
                    functions.push((name, ret));
                }
            }
        }
        merge_function_types(functions)
    }

    fn resolve_class(
        &mut self,
        scopes: &Scopes,
        id: TypeId,
        class: &Class,
        comments: &SingleThreadedComments,
    ) {
        let shadow = type_param_names(class.type_params.as_deref());
        if let Some(Expr::Ident(base)) = class.super_class.as_deref() {
            if let Some(Value::Class(base)) = scopes.lookup_value(&base.sym) {
                self.entities[id.0].bases.push(*base);
            }
        }
        for member in &class.body {
            let resolved = match member {
                ClassMember::ClassProp(p) => class_prop_member(scopes, &shadow, p, comments),
                ClassMember::Method(m) => class_method_member(scopes, &shadow, m, comments),
                ClassMember::Constructor(c) => {
                    let params = parameter_property_members(scopes, &shadow, c, comments);
                    self.entities[id.0].members.extend(params);
                    None
                }
                _ => None,
            };
            if let Some(member) = resolved {
                self.entities[id.0].members.push(member);
            }
        }
    }

    fn resolve_interface(
        &mut self,
        scopes: &Scopes,
        id: TypeId,
        decl: &TsInterfaceDecl,
        comments: &SingleThreadedComments,
    ) {
        let shadow = type_param_names(decl.type_params.as_deref());
        for heritage in &decl.extends {
            if let Expr::Ident(base) = &*heritage.expr {
                if let Some(TypeBinding::Entity(base_id)) = scopes.lookup_type(&base.sym) {
                    if !shadow.iter().any(|s| *s == &*base.sym) {
                        self.entities[id.0].bases.push(base_id);
                    }
                }
            }
        }
        for element in &decl.body.body {
            let member = match element {
                TsTypeElement::TsPropertySignature(p) => {
                    Declaration::from_property_signature(p, comments).map(|declaration| Member {
                        declaration,
                        is_static: false,
                        value_type: resolve_annotation(scopes, &shadow, p.type_ann.as_deref()),
                        return_type: None,
                    })
                }
                TsTypeElement::TsMethodSignature(m) => {
                    let mut shadow = shadow.clone();
                    shadow.extend(type_param_names(m.type_params.as_deref()));
                    Declaration::from_method_signature(m, comments).map(|declaration| Member {
                        declaration,
                        is_static: false,
                        value_type: None,
                        return_type: resolve_annotation(scopes, &shadow, m.type_ann.as_deref()),
                    })
                }
                _ => None,
            };
            if let Some(member) = member {
                self.entities[id.0].members.push(member);
            }
        }
    }

    /// The first entity along the `extends` chain of `receiver` that declares
    /// `name`. Cycles are cut.
    fn declaring_entity(&self, receiver: &Receiver, name: &str) -> Option<&Entity> {
        let mut queue = VecDeque::from([receiver.type_id]);
        let mut seen = HashSet::new();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            let entity = self.entities.get(id.0)?;
            if entity
                .members
                .iter()
                .any(|m| m.declaration.name == name && m.is_static == receiver.is_static)
            {
                return Some(entity);
            }
            queue.extend(entity.bases.iter().copied());
        }
        None
    }

    fn members_named<'s>(
        &'s self,
        receiver: &Receiver,
        name: &'s str,
    ) -> impl Iterator<Item = &'s Member> + 's {
        let is_static = receiver.is_static;
        self.declaring_entity(receiver, name)
            .into_iter()
            .flat_map(|entity| entity.members.iter())
            .filter(move |m| m.declaration.name == name && m.is_static == is_static)
    }

    fn member_type(&self, receiver: &Receiver, name: &str) -> Option<Receiver> {
        self.members_named(receiver, name).find_map(|m| m.value_type)
    }

    fn method_return_type(&self, receiver: &Receiver, name: &str) -> Option<Receiver> {
        self.members_named(receiver, name).find_map(|m| m.return_type)
    }
}

fn class_prop_member(
    scopes: &Scopes,
    shadow: &[&str],
    prop: &ClassProp,
    comments: &SingleThreadedComments,
) -> Option<Member> {
    Some(Member {
        declaration: Declaration::from_class_prop(prop, comments)?,
        is_static: prop.is_static,
        value_type: resolve_annotation(scopes, shadow, prop.type_ann.as_deref()),
        return_type: None,
    })
}

fn class_method_member(
    scopes: &Scopes,
    shadow: &[&str],
    method: &ClassMethod,
    comments: &SingleThreadedComments,
) -> Option<Member> {
    let mut shadow = shadow.to_vec();
    shadow.extend(type_param_names(method.function.type_params.as_deref()));
    let declared = resolve_annotation(scopes, &shadow, method.function.return_type.as_deref());
    let (value_type, return_type) = match method.kind {
        MethodKind::Getter => (declared, None),
        MethodKind::Method => (None, declared),
        MethodKind::Setter => (None, None),
    };
    Some(Member {
        declaration: Declaration::from_class_method(method, comments)?,
        is_static: method.is_static,
        value_type,
        return_type,
    })
}

fn parameter_property_members(
    scopes: &Scopes,
    shadow: &[&str],
    constructor: &Constructor,
    comments: &SingleThreadedComments,
) -> Vec<Member> {
    constructor
        .params
        .iter()
        .filter_map(|param| {
            let ParamOrTsParamProp::TsParamProp(prop) = param else {
                return None;
            };
            let annotation = match &prop.param {
                TsParamPropParam::Ident(binding) => binding.type_ann.as_deref(),
                TsParamPropParam::Assign(assign) => match &*assign.left {
                    Pat::Ident(binding) => binding.type_ann.as_deref(),
                    _ => None,
                },
            };
            Some(Member {
                declaration: Declaration::from_param_prop(prop, comments)?,
                is_static: false,
                value_type: resolve_annotation(scopes, shadow, annotation),
                return_type: None,
            })
        })
        .collect()
}

/// Functions declared more than once in a scope keep a return type only
/// when every declaration agrees on it.
fn merge_function_types(
    functions: Vec<(String, Option<Receiver>)>,
) -> Vec<(String, Option<Receiver>)> {
    let mut merged: Vec<(String, Option<Receiver>)> = Vec::new();
    for (name, ret) in functions {
        match merged.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => {
                if *existing != ret {
                    *existing = None;
                }
            }
            None => merged.push((name, ret)),
        }
    }
    merged
}

// ============================================================================
// Scopes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Value {
    /// Declared here, type not known. Still hides outer bindings.
    Unknown,
    Typed(Receiver),
    Class(TypeId),
    Function(Option<Receiver>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TypeBinding {
    /// A type parameter, alias, enum or ambiguous name.
    Opaque,
    Entity(TypeId),
}

#[derive(Debug, Clone, Default)]
struct Scope {
    values: HashMap<String, Value>,
    types: HashMap<String, TypeBinding>,
    /// `var` declarations bind here.
    is_function: bool,
}

impl Scope {
    fn function() -> Self {
        Scope {
            is_function: true,
            ..Scope::default()
        }
    }

    fn declare_unknown(&mut self, pat: &Pat) {
        let mut names = Vec::new();
        pattern_names(pat, &mut names);
        for name in names {
            self.values.entry(name).or_insert(Value::Unknown);
        }
    }

    fn bind_type_params(&mut self, params: Option<&TsTypeParamDecl>) {
        for name in type_param_names(params) {
            self.types.insert(name.to_string(), TypeBinding::Opaque);
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Scopes {
    stack: Vec<Scope>,
}

impl Scopes {
    fn push(&mut self, scope: Scope) {
        self.stack.push(scope);
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    fn top_mut(&mut self) -> &mut Scope {
        if self.stack.is_empty() {
            self.stack.push(Scope::function());
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn function_scope_mut(&mut self) -> &mut Scope {
        match self.stack.iter().rposition(|s| s.is_function) {
            Some(index) => &mut self.stack[index],
            None => self.top_mut(),
        }
    }

    fn lookup_value(&self, name: &str) -> Option<&Value> {
        self.stack.iter().rev().find_map(|s| s.values.get(name))
    }

    fn lookup_type(&self, name: &str) -> Option<TypeBinding> {
        self.stack.iter().rev().find_map(|s| s.types.get(name).copied())
    }
}

fn type_param_names(params: Option<&TsTypeParamDecl>) -> Vec<&str> {
    params
        .map(|decl| decl.params.iter().map(|p| &*p.name.sym).collect())
        .unwrap_or_default()
}

fn pattern_names(pat: &Pat, out: &mut Vec<String>) {
    match pat {
        Pat::Ident(binding) => out.push(binding.id.sym.to_string()),
        Pat::Array(array) => {
            for element in array.elems.iter().flatten() {
                pattern_names(element, out);
            }
        }
        Pat::Rest(rest) => pattern_names(&rest.arg, out),
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(kv) => pattern_names(&kv.value, out),
                    ObjectPatProp::Assign(assign) => out.push(assign.key.sym.to_string()),
                    ObjectPatProp::Rest(rest) => pattern_names(&rest.arg, out),
                }
            }
        }
        Pat::Assign(assign) => pattern_names(&assign.left, out),
        Pat::Invalid(_) | Pat::Expr(_) => {}
    }
}

/// The instance type a type annotation names, when it names a class or
/// interface visible from `scopes` and not hidden by `shadow`.
fn resolve_type(scopes: &Scopes, shadow: &[&str], ty: &TsType) -> Option<Receiver> {
    match ty {
        TsType::TsTypeRef(reference) => {
            let TsEntityName::Ident(name) = &reference.type_name else {
                return None;
            };
            if shadow.contains(&&*name.sym) {
                return None;
            }
            match scopes.lookup_type(&name.sym)? {
                TypeBinding::Entity(id) => Some(Receiver::instance(id)),
                TypeBinding::Opaque => None,
            }
        }
        TsType::TsParenthesizedType(inner) => resolve_type(scopes, shadow, &inner.type_ann),
        _ => None,
    }
}

fn resolve_annotation(
    scopes: &Scopes,
    shadow: &[&str],
    annotation: Option<&TsTypeAnn>,
) -> Option<Receiver> {
    annotation.and_then(|ann| resolve_type(scopes, shadow, &ann.type_ann))
}

// ============================================================================
// Modules
// ============================================================================

enum Export {
    Local(String),
    Entity(TypeId),
}

#[derive(Clone)]
struct ImportLink {
    local: String,
    /// Exported name, or `None` for a namespace import.
    imported: Option<String>,
    specifier: String,
}

#[derive(Default)]
struct ModuleScope {
    scope: Scope,
    is_module: bool,
    exports: HashMap<String, Export>,
    imports: Vec<ImportLink>,
}

impl ModuleScope {
    /// What `name` exports, as value and type bindings.
    fn exported(&self, name: &str) -> Option<(Value, TypeBinding)> {
        match self.exports.get(name)? {
            Export::Entity(id) => Some((Value::Class(*id), TypeBinding::Entity(*id))),
            Export::Local(local) => Some((
                self.scope
                    .values
                    .get(local)
                    .cloned()
                    .unwrap_or(Value::Unknown),
                self.scope
                    .types
                    .get(local)
                    .copied()
                    .unwrap_or(TypeBinding::Opaque),
            )),
        }
    }
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_atom_lossy().to_string(),
    }
}

fn declared_names(decl: &Decl) -> Vec<String> {
    let mut names = Vec::new();
    match decl {
        Decl::Class(d) => names.push(d.ident.sym.to_string()),
        Decl::Fn(d) => names.push(d.ident.sym.to_string()),
        Decl::Var(v) => {
            for declarator in &v.decls {
                pattern_names(&declarator.name, &mut names);
            }
        }
        Decl::Using(u) => {
            for declarator in &u.decls {
                pattern_names(&declarator.name, &mut names);
            }
        }
        Decl::TsInterface(d) => names.push(d.id.sym.to_string()),
        Decl::TsTypeAlias(d) => names.push(d.id.sym.to_string()),
        Decl::TsEnum(d) => names.push(d.id.sym.to_string()),
        Decl::TsModule(d) => {
            if let TsModuleName::Ident(id) = &d.id {
                names.push(id.sym.to_string());
            }
        }
    }
    names
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// The program file a relative import specifier names.
fn module_target(files: &HashMap<PathBuf, usize>, importer: &str, specifier: &str) -> Option<usize> {
    if !specifier.starts_with('.') {
        return None;
    }
    let base = Path::new(importer).parent().unwrap_or_else(|| Path::new(""));
    let joined = base.join(specifier);
    let stem = match specifier.strip_suffix(".js") {
        Some(stripped) => base.join(stripped),
        None => joined.clone(),
    };
    let mut candidates = vec![joined];
    for extension in [".ts", ".tsx", ".d.ts"] {
        let mut candidate = stem.clone().into_os_string();
        candidate.push(extension);
        candidates.push(PathBuf::from(candidate));
    }
    candidates.push(stem.join("index.ts"));
    candidates
        .iter()
        .find_map(|candidate| files.get(&normalize(candidate)).copied())
}

// ============================================================================
// Binding
// ============================================================================

/// Walks one file with a scope stack and records access receivers.
struct Binder<'i> {
    index: &'i mut TypeIndex,
    comments: &'i SingleThreadedComments,
    scopes: Scopes,
    this_stack: Vec<Option<Receiver>>,
    classes: Vec<TypeId>,
    accesses: &'i mut HashMap<Span, Receiver>,
}

impl Binder<'_> {
    /// Bind block-level declarations in the innermost scope.
    fn hoist<'n>(&mut self, decls: impl IntoIterator<Item = &'n Decl>) {
        let mut pending = Vec::new();
        let top = self.scopes.top_mut();
        for decl in decls {
            self.index.declare(top, decl, &mut pending);
        }
        let functions = self.index.resolve(&self.scopes, pending, self.comments);
        let top = self.scopes.top_mut();
        for (name, ret) in functions {
            top.values.insert(name, Value::Function(ret));
        }
    }

    fn hoist_stmts(&mut self, stmts: &[Stmt]) {
        self.hoist(stmts.iter().filter_map(|stmt| match stmt {
            Stmt::Decl(decl) => Some(decl),
            _ => None,
        }));
    }

    fn this(&self) -> Option<Receiver> {
        self.this_stack.last().copied().flatten()
    }

    fn member_this(&self, is_static: bool) -> Option<Receiver> {
        self.classes.last().map(|&type_id| Receiver { type_id, is_static })
    }

    fn super_receiver(&self) -> Option<Receiver> {
        let this = self.this()?;
        let base = self.index.entities.get(this.type_id.0)?.bases.first()?;
        Some(Receiver {
            type_id: *base,
            is_static: this.is_static,
        })
    }

    fn resolve_type(&self, ty: &TsType) -> Option<Receiver> {
        resolve_type(&self.scopes, &[], ty)
    }

    fn type_of(&self, expression: &Expr) -> Option<Receiver> {
        match expression {
            Expr::This(_) => self.this(),
            Expr::Ident(ident) => match self.scopes.lookup_value(&ident.sym)? {
                Value::Typed(receiver) => Some(*receiver),
                Value::Class(id) => Some(Receiver::class(*id)),
                Value::Unknown | Value::Function(_) => None,
            },
            Expr::Paren(inner) => self.type_of(&inner.expr),
            Expr::TsNonNull(inner) => self.type_of(&inner.expr),
            Expr::TsSatisfies(inner) => self.type_of(&inner.expr),
            Expr::TsAs(cast) => self.resolve_type(&cast.type_ann),
            Expr::TsTypeAssertion(cast) => self.resolve_type(&cast.type_ann),
            Expr::New(new) => match &*new.callee {
                Expr::Ident(ident) => match self.scopes.lookup_value(&ident.sym)? {
                    Value::Class(id) => Some(Receiver::instance(*id)),
                    _ => None,
                },
                _ => None,
            },
            Expr::Member(member) => self.member_type(member),
            Expr::SuperProp(access) => match &access.prop {
                SuperProp::Ident(name) => {
                    let receiver = self.super_receiver()?;
                    self.index.member_type(&receiver, &name.sym)
                }
                SuperProp::Computed(_) => None,
            },
            Expr::Call(call) => match &call.callee {
                Callee::Expr(callee) => self.return_type(callee),
                Callee::Super(_) | Callee::Import(_) => None,
            },
            Expr::OptChain(chain) => match &*chain.base {
                OptChainBase::Member(member) => self.member_type(member),
                OptChainBase::Call(call) => self.return_type(&call.callee),
            },
            _ => None,
        }
    }

    fn member_type(&self, member: &MemberExpr) -> Option<Receiver> {
        let MemberProp::Ident(name) = &member.prop else {
            return None;
        };
        let receiver = self.type_of(&member.obj)?;
        self.index.member_type(&receiver, &name.sym)
    }

    fn return_type(&self, callee: &Expr) -> Option<Receiver> {
        match callee {
            Expr::Paren(inner) => self.return_type(&inner.expr),
            Expr::Ident(ident) => match self.scopes.lookup_value(&ident.sym)? {
                Value::Function(ret) => *ret,
                _ => None,
            },
            Expr::Member(member) => self.member_return_type(member),
            Expr::SuperProp(access) => match &access.prop {
                SuperProp::Ident(name) => {
                    let receiver = self.super_receiver()?;
                    self.index.method_return_type(&receiver, &name.sym)
                }
                SuperProp::Computed(_) => None,
            },
            Expr::OptChain(chain) => match &*chain.base {
                OptChainBase::Member(member) => self.member_return_type(member),
                OptChainBase::Call(_) => None,
            },
            _ => None,
        }
    }

    fn member_return_type(&self, member: &MemberExpr) -> Option<Receiver> {
        let MemberProp::Ident(name) = &member.prop else {
            return None;
        };
        let receiver = self.type_of(&member.obj)?;
        self.index.method_return_type(&receiver, &name.sym)
    }

    /// Bind a parameter or declarator in the innermost scope (or the nearest
    /// function scope for `var`).
    fn bind_pattern(&mut self, pat: &Pat, init: Option<&Expr>, function_scoped: bool) {
        let typed = match pat {
            Pat::Ident(binding) => Some((
                binding.id.sym.to_string(),
                match binding.type_ann.as_deref() {
                    Some(ann) => self.resolve_type(&ann.type_ann),
                    None => init.and_then(|e| self.type_of(e)),
                },
            )),
            Pat::Assign(assign) => match &*assign.left {
                Pat::Ident(binding) => Some((
                    binding.id.sym.to_string(),
                    match binding.type_ann.as_deref() {
                        Some(ann) => self.resolve_type(&ann.type_ann),
                        None => self.type_of(&assign.right),
                    },
                )),
                _ => None,
            },
            _ => None,
        };
        let scope = if function_scoped {
            self.scopes.function_scope_mut()
        } else {
            self.scopes.top_mut()
        };
        match typed {
            Some((name, receiver)) => {
                scope
                    .values
                    .insert(name, receiver.map_or(Value::Unknown, Value::Typed));
            }
            None => {
                let mut names = Vec::new();
                pattern_names(pat, &mut names);
                for name in names {
                    scope.values.insert(name, Value::Unknown);
                }
            }
        }
    }

    fn enter_function(&mut self, this: Option<Receiver>, type_params: Option<&TsTypeParamDecl>) {
        self.this_stack.push(this);
        let mut scope = Scope::function();
        scope.bind_type_params(type_params);
        self.scopes.push(scope);
    }

    fn exit_function(&mut self) {
        self.scopes.pop();
        self.this_stack.pop();
    }

    fn visit_function_with_this(&mut self, function: &Function, this: Option<Receiver>) {
        self.enter_function(this, function.type_params.as_deref());
        for param in &function.params {
            self.bind_pattern(&param.pat, None, false);
        }
        function.decorators.visit_with(self);
        function.params.visit_with(self);
        function.body.visit_with(self);
        self.exit_function();
    }

    fn record(&mut self, name_span: Span, receiver: Option<Receiver>) {
        if let Some(receiver) = receiver {
            self.accesses.insert(name_span, receiver);
        }
    }
}

impl Visit for Binder<'_> {
    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        self.scopes.push(Scope::default());
        self.hoist_stmts(&node.stmts);
        node.visit_children_with(self);
        self.scopes.pop();
    }

    fn visit_switch_stmt(&mut self, node: &SwitchStmt) {
        node.discriminant.visit_with(self);
        self.scopes.push(Scope::default());
        for case in &node.cases {
            self.hoist_stmts(&case.cons);
        }
        node.cases.visit_with(self);
        self.scopes.pop();
    }

    fn visit_ts_module_block(&mut self, node: &TsModuleBlock) {
        self.scopes.push(Scope::function());
        self.hoist(node.body.iter().filter_map(|item| match item {
            ModuleItem::Stmt(Stmt::Decl(decl)) => Some(decl),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => Some(&export.decl),
            _ => None,
        }));
        node.visit_children_with(self);
        self.scopes.pop();
    }

    fn visit_for_stmt(&mut self, node: &ForStmt) {
        self.scopes.push(Scope::default());
        node.visit_children_with(self);
        self.scopes.pop();
    }

    fn visit_for_in_stmt(&mut self, node: &ForInStmt) {
        self.scopes.push(Scope::default());
        node.visit_children_with(self);
        self.scopes.pop();
    }

    fn visit_for_of_stmt(&mut self, node: &ForOfStmt) {
        self.scopes.push(Scope::default());
        node.visit_children_with(self);
        self.scopes.pop();
    }

    fn visit_catch_clause(&mut self, node: &CatchClause) {
        self.scopes.push(Scope::default());
        if let Some(param) = &node.param {
            self.bind_pattern(param, None, false);
        }
        node.visit_children_with(self);
        self.scopes.pop();
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        let function_scoped = node.kind == VarDeclKind::Var;
        for declarator in &node.decls {
            declarator.visit_with(self);
            self.bind_pattern(&declarator.name, declarator.init.as_deref(), function_scoped);
        }
    }

    fn visit_function(&mut self, node: &Function) {
        self.visit_function_with_this(node, None);
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        let this = self.this();
        self.enter_function(this, node.type_params.as_deref());
        for param in &node.params {
            self.bind_pattern(param, None, false);
        }
        node.params.visit_with(self);
        node.body.visit_with(self);
        self.exit_function();
    }

    fn visit_getter_prop(&mut self, node: &GetterProp) {
        node.key.visit_with(self);
        self.enter_function(None, None);
        node.body.visit_with(self);
        self.exit_function();
    }

    fn visit_setter_prop(&mut self, node: &SetterProp) {
        node.key.visit_with(self);
        self.enter_function(None, None);
        self.bind_pattern(&node.param, None, false);
        node.param.visit_with(self);
        node.body.visit_with(self);
        self.exit_function();
    }

    fn visit_class_expr(&mut self, node: &ClassExpr) {
        self.scopes.push(Scope::default());
        let name = node.ident.as_ref().map(|ident| &*ident.sym);
        match self.index.by_class.get(&node.class.span).copied() {
            Some(id) => {
                if let Some(name) = name {
                    self.scopes
                        .top_mut()
                        .values
                        .insert(name.to_string(), Value::Class(id));
                }
            }
            None => {
                let mut pending = Vec::new();
                let top = self.scopes.top_mut();
                self.index.declare_class(top, name, &node.class, &mut pending);
                self.index.resolve(&self.scopes, pending, self.comments);
            }
        }
        node.class.visit_with(self);
        self.scopes.pop();
    }

    fn visit_class(&mut self, node: &Class) {
        let id = match self.index.by_class.get(&node.span).copied() {
            Some(id) => id,
            None => {
                let mut pending = Vec::new();
                let mut detached = Scope::default();
                let id = self
                    .index
                    .declare_class(&mut detached, None, node, &mut pending);
                self.index.resolve(&self.scopes, pending, self.comments);
                id
            }
        };
        node.decorators.visit_with(self);
        node.super_class.visit_with(self);

        let mut scope = Scope::default();
        scope.bind_type_params(node.type_params.as_deref());
        self.scopes.push(scope);
        self.classes.push(id);
        node.body.visit_with(self);
        self.classes.pop();
        self.scopes.pop();
    }

    fn visit_class_prop(&mut self, node: &ClassProp) {
        node.decorators.visit_with(self);
        node.key.visit_with(self);
        let this = self.member_this(node.is_static);
        self.this_stack.push(this);
        node.value.visit_with(self);
        self.this_stack.pop();
    }

    fn visit_private_prop(&mut self, node: &PrivateProp) {
        node.decorators.visit_with(self);
        let this = self.member_this(node.is_static);
        self.this_stack.push(this);
        node.value.visit_with(self);
        self.this_stack.pop();
    }

    fn visit_class_method(&mut self, node: &ClassMethod) {
        node.key.visit_with(self);
        let this = self.member_this(node.is_static);
        self.visit_function_with_this(&node.function, this);
    }

    fn visit_private_method(&mut self, node: &PrivateMethod) {
        let this = self.member_this(node.is_static);
        self.visit_function_with_this(&node.function, this);
    }

    fn visit_constructor(&mut self, node: &Constructor) {
        let this = self.member_this(false);
        self.enter_function(this, None);
        for param in &node.params {
            match param {
                ParamOrTsParamProp::Param(param) => self.bind_pattern(&param.pat, None, false),
                ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                    TsParamPropParam::Ident(binding) => {
                        self.bind_pattern(&Pat::Ident(binding.clone()), None, false)
                    }
                    TsParamPropParam::Assign(assign) => {
                        self.bind_pattern(&Pat::Assign(assign.clone()), None, false)
                    }
                },
            }
        }
        node.params.visit_with(self);
        node.body.visit_with(self);
        self.exit_function();
    }

    fn visit_static_block(&mut self, node: &StaticBlock) {
        let this = self.member_this(true);
        self.this_stack.push(this);
        node.body.visit_with(self);
        self.this_stack.pop();
    }

    fn visit_member_expr(&mut self, node: &MemberExpr) {
        node.visit_children_with(self);
        if let MemberProp::Ident(name) = &node.prop {
            let receiver = self.type_of(&node.obj);
            self.record(name.span, receiver);
        }
    }

    fn visit_super_prop_expr(&mut self, node: &SuperPropExpr) {
        node.visit_children_with(self);
        if let SuperProp::Ident(name) = &node.prop {
            let receiver = self.super_receiver();
            self.record(name.span, receiver);
        }
    }
}

// ============================================================================
// Checker
// ============================================================================

/// Resolves member accesses across every file of a [`Program`].
#[derive(Debug)]
pub struct Checker {
    index: TypeIndex,
    accesses: HashMap<Span, Receiver>,
}

impl Checker {
    pub fn new(program: &Program) -> Self {
        let files = program.files();
        let mut index = TypeIndex::default();
        let mut global = Scope::function();
        let mut modules: Vec<ModuleScope> = Vec::with_capacity(files.len());
        let mut pending: Vec<Vec<Pending<'_>>> = Vec::with_capacity(files.len());

        // Hoisting.
        for file in files {
            let mut module = ModuleScope {
                scope: Scope::function(),
                is_module: file
                    .module
                    .body
                    .iter()
                    .any(|item| matches!(item, ModuleItem::ModuleDecl(_))),
                ..ModuleScope::default()
            };
            let mut work = Vec::new();
            for item in &file.module.body {
                match item {
                    ModuleItem::Stmt(Stmt::Decl(decl)) => {
                        let target = if module.is_module {
                            &mut module.scope
                        } else {
                            &mut global
                        };
                        index.declare(target, decl, &mut work)
                    }
                    ModuleItem::Stmt(_) => {}
                    ModuleItem::ModuleDecl(decl) => {
                        hoist_module_decl(&mut index, &mut module, decl, &mut work)
                    }
                }
            }
            modules.push(module);
            pending.push(work);
        }

        // Imports. Two rounds let re-exported imports settle regardless of
        // file order.
        let paths: HashMap<PathBuf, usize> = files
            .iter()
            .enumerate()
            .map(|(i, file)| (normalize(Path::new(&file.file_name)), i))
            .collect();
        for _ in 0..2 {
            for (i, file) in files.iter().enumerate() {
                let links = modules[i].imports.clone();
                for link in links {
                    let Some(imported) = &link.imported else {
                        continue;
                    };
                    let Some(target) = module_target(&paths, &file.file_name, &link.specifier)
                    else {
                        trace!(specifier = %link.specifier, "import outside the program");
                        continue;
                    };
                    let Some((value, ty)) = modules[target].exported(imported) else {
                        continue;
                    };
                    let scope = &mut modules[i].scope;
                    scope.values.insert(link.local.clone(), value);
                    scope.types.insert(link.local, ty);
                }
            }
        }

        // Resolution of top-level declarations.
        let mut global_functions = Vec::new();
        for (i, work) in pending.into_iter().enumerate() {
            let scopes = Scopes {
                stack: vec![global.clone(), modules[i].scope.clone()],
            };
            let functions = index.resolve(&scopes, work, &files[i].comments);
            if modules[i].is_module {
                for (name, ret) in functions {
                    modules[i].scope.values.insert(name, Value::Function(ret));
                }
            } else {
                global_functions.extend(functions);
            }
        }
        for (name, ret) in merge_function_types(global_functions) {
            global.values.insert(name, Value::Function(ret));
        }

        // Binding.
        let mut accesses = HashMap::new();
        for (i, file) in files.iter().enumerate() {
            let mut binder = Binder {
                index: &mut index,
                comments: &file.comments,
                scopes: Scopes {
                    stack: vec![global.clone(), modules[i].scope.clone()],
                },
                this_stack: vec![None],
                classes: Vec::new(),
                accesses: &mut accesses,
            };
            file.module.visit_with(&mut binder);
        }

        debug!(
            files = files.len(),
            types = index.entities.len(),
            accesses = accesses.len(),
            "checker ready"
        );
        Checker { index, accesses }
    }

    /// The receiver type recorded for the access whose name is at `name_span`.
    pub fn receiver_of(&self, name_span: Span) -> Option<&Receiver> {
        self.accesses.get(&name_span)
    }

    /// Name of a class or interface.
    pub fn type_name(&self, id: TypeId) -> &str {
        self.index
            .entities
            .get(id.0)
            .map_or("", |entity| entity.name.as_str())
    }

    /// Every declaration of `name` on the first type along the receiver's
    /// `extends` chain that declares it.
    pub fn members(&self, receiver: &Receiver, name: &str) -> Vec<Declaration> {
        self.index
            .members_named(receiver, name)
            .map(|m| m.declaration.clone())
            .collect()
    }
}

fn hoist_module_decl<'n>(
    index: &mut TypeIndex,
    module: &mut ModuleScope,
    decl: &'n ModuleDecl,
    work: &mut Vec<Pending<'n>>,
) {
    match decl {
        ModuleDecl::ExportDecl(export) => {
            index.declare(&mut module.scope, &export.decl, work);
            for name in declared_names(&export.decl) {
                module.exports.insert(name.clone(), Export::Local(name));
            }
        }
        ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
            DefaultDecl::Class(class) => {
                let name = class.ident.as_ref().map(|ident| &*ident.sym);
                let id = index.declare_class(&mut module.scope, name, &class.class, work);
                module
                    .exports
                    .insert("default".to_string(), Export::Entity(id));
            }
            DefaultDecl::TsInterfaceDecl(interface) => {
                let id = index.declare_interface(&mut module.scope, interface, work);
                module
                    .exports
                    .insert("default".to_string(), Export::Entity(id));
            }
            DefaultDecl::Fn(function) => {
                if let Some(ident) = &function.ident {
                    let name = ident.sym.to_string();
                    module
                        .scope
                        .values
                        .insert(name.clone(), Value::Function(None));
                    work.push(Pending::Function(name.clone(), &function.function));
                    module
                        .exports
                        .insert("default".to_string(), Export::Local(name));
                }
            }
        },
        ModuleDecl::ExportDefaultExpr(export) => {
            if let Expr::Ident(ident) = &*export.expr {
                module
                    .exports
                    .insert("default".to_string(), Export::Local(ident.sym.to_string()));
            }
        }
        ModuleDecl::ExportNamed(named) if named.src.is_none() => {
            for specifier in &named.specifiers {
                if let ExportSpecifier::Named(named) = specifier {
                    let local = export_name(&named.orig);
                    let exported = named.exported.as_ref().map_or_else(|| local.clone(), export_name);
                    module.exports.insert(exported, Export::Local(local));
                }
            }
        }
        ModuleDecl::Import(import) => {
            let specifier = import.src.value.to_atom_lossy().to_string();
            for spec in &import.specifiers {
                let (local, imported) = match spec {
                    ImportSpecifier::Named(named) => (
                        named.local.sym.to_string(),
                        Some(
                            named
                                .imported
                                .as_ref()
                                .map_or_else(|| named.local.sym.to_string(), export_name),
                        ),
                    ),
                    ImportSpecifier::Default(import_default) => (
                        import_default.local.sym.to_string(),
                        Some("default".to_string()),
                    ),
                    ImportSpecifier::Namespace(namespace) => (namespace.local.sym.to_string(), None),
                };
                module.scope.values.insert(local.clone(), Value::Unknown);
                module
                    .scope
                    .types
                    .insert(local.clone(), TypeBinding::Opaque);
                module.imports.push(ImportLink {
                    local,
                    imported,
                    specifier: specifier.clone(),
                });
            }
        }
        ModuleDecl::TsImportEquals(import) => {
            let local = import.id.sym.to_string();
            module.scope.values.insert(local.clone(), Value::Unknown);
            module.scope.types.insert(local, TypeBinding::Opaque);
        }
        _ => {}
    }
}

impl SymbolResolver for Checker {
    fn symbol_at_access(&self, access: Access<'_>) -> Option<Symbol> {
        let name = access.name()?;
        let receiver = self.accesses.get(&name.span)?;
        let declarations = self.members(receiver, &name.sym);
        if declarations.is_empty() {
            trace!(name = %name.sym, "receiver declares no such member");
            return None;
        }
        Some(Symbol {
            name: name.sym.to_string(),
            declarations,
        })
    }
}
