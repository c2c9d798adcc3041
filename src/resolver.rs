//! Symbol resolution seam between the transform and a type checker.
//!
//! The transform never inspects types itself. For every member access it asks
//! a [`SymbolResolver`] which declarations the accessed name refers to, and
//! decides from those declarations alone. [`crate::checker::Checker`] is the
//! built-in resolver; tests substitute fakes.
//!
//! Declarations are owned descriptors, so a resolver can answer for files it
//! has already released and the transform can consume the tree it walks.

use privatize_ast::{leading_js_doc, JsDoc};
use swc_common::comments::Comments;
use swc_common::Span;
use swc_ecma_ast::{
    Accessibility, ClassMethod, ClassProp, Expr, IdentName, MemberExpr, MemberProp, MethodKind,
    Pat, PropName, SuperProp, SuperPropExpr, TsMethodSignature, TsParamProp, TsParamPropParam,
    TsPropertySignature,
};

/// What kind of member a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Property,
    Method,
    GetAccessor,
    SetAccessor,
    /// A constructor parameter with an accessibility or `readonly` modifier.
    ParameterProperty,
    PropertySignature,
    MethodSignature,
}

impl DeclarationKind {
    /// Property and method declarations, the only kinds that are renamed.
    pub fn is_field_or_method(self) -> bool {
        matches!(self, DeclarationKind::Property | DeclarationKind::Method)
    }
}

/// A declaration a member name can resolve to.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    pub accessibility: Option<Accessibility>,
    /// JSDoc blocks in front of the declaration.
    pub js_doc: Vec<JsDoc>,
    pub span: Span,
}

impl Declaration {
    /// Describe a class property. `None` for computed names.
    pub fn from_class_prop(node: &ClassProp, comments: &dyn Comments) -> Option<Self> {
        Some(Declaration {
            kind: DeclarationKind::Property,
            name: prop_name_text(&node.key)?,
            accessibility: node.accessibility,
            js_doc: leading_js_doc(comments, node.span.lo),
            span: node.span,
        })
    }

    /// Describe a class method or accessor. `None` for computed names.
    pub fn from_class_method(node: &ClassMethod, comments: &dyn Comments) -> Option<Self> {
        let kind = match node.kind {
            MethodKind::Method => DeclarationKind::Method,
            MethodKind::Getter => DeclarationKind::GetAccessor,
            MethodKind::Setter => DeclarationKind::SetAccessor,
        };
        Some(Declaration {
            kind,
            name: prop_name_text(&node.key)?,
            accessibility: node.accessibility,
            js_doc: leading_js_doc(comments, node.span.lo),
            span: node.span,
        })
    }

    pub fn from_param_prop(node: &TsParamProp, comments: &dyn Comments) -> Option<Self> {
        let name = match &node.param {
            TsParamPropParam::Ident(binding) => binding.id.sym.to_string(),
            TsParamPropParam::Assign(assign) => match &*assign.left {
                Pat::Ident(binding) => binding.id.sym.to_string(),
                _ => return None,
            },
        };
        Some(Declaration {
            kind: DeclarationKind::ParameterProperty,
            name,
            accessibility: node.accessibility,
            js_doc: leading_js_doc(comments, node.span.lo),
            span: node.span,
        })
    }

    pub fn from_property_signature(
        node: &TsPropertySignature,
        comments: &dyn Comments,
    ) -> Option<Self> {
        Some(Declaration {
            kind: DeclarationKind::PropertySignature,
            name: signature_key_text(&node.key, node.computed)?,
            accessibility: None,
            js_doc: leading_js_doc(comments, node.span.lo),
            span: node.span,
        })
    }

    pub fn from_method_signature(
        node: &TsMethodSignature,
        comments: &dyn Comments,
    ) -> Option<Self> {
        Some(Declaration {
            kind: DeclarationKind::MethodSignature,
            name: signature_key_text(&node.key, node.computed)?,
            accessibility: None,
            js_doc: leading_js_doc(comments, node.span.lo),
            span: node.span,
        })
    }
}

/// Statically known text of a member name.
pub fn prop_name_text(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_atom_lossy().to_string()),
        PropName::Num(n) => Some(n.value.to_string()),
        PropName::Computed(_) | PropName::BigInt(_) => None,
    }
}

fn signature_key_text(key: &Expr, computed: bool) -> Option<String> {
    match key {
        Expr::Ident(ident) if !computed => Some(ident.sym.to_string()),
        Expr::Lit(swc_ecma_ast::Lit::Str(s)) => Some(s.value.to_atom_lossy().to_string()),
        Expr::Lit(swc_ecma_ast::Lit::Num(n)) => Some(n.value.to_string()),
        _ => None,
    }
}

/// A member access the transform may rename.
#[derive(Debug, Clone, Copy)]
pub enum Access<'n> {
    /// `receiver.name`, optional chains included.
    Member(&'n MemberExpr),
    /// `super.name`.
    SuperProp(&'n SuperPropExpr),
}

impl<'n> Access<'n> {
    /// The accessed name, or `None` for computed and `#private` accesses.
    pub fn name(&self) -> Option<&'n IdentName> {
        match self {
            Access::Member(node) => match &node.prop {
                MemberProp::Ident(name) => Some(name),
                _ => None,
            },
            Access::SuperProp(node) => match &node.prop {
                SuperProp::Ident(name) => Some(name),
                SuperProp::Computed(_) => None,
            },
        }
    }
}

/// The result of resolving a member access.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    /// Declarations in source order. May be empty.
    pub declarations: Vec<Declaration>,
}

/// Maps member accesses to the declarations they refer to.
///
/// Implementations key on the span of the accessed name, which the transform
/// carries over when it renames.
pub trait SymbolResolver {
    /// The symbol the access refers to, or `None` when the receiver's type is
    /// unknown, ambiguous, or declares no such member.
    fn symbol_at_access(&self, access: Access<'_>) -> Option<Symbol>;
}
