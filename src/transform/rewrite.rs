//! The rewriting handlers.
//!
//! Each handler decides on the original node, folds the children, and then
//! either renames through the node factory or returns the folded node as is.

use privatize_ast::leading_js_doc;
use swc_common::{BytePos, Spanned};
use swc_ecma_ast::{
    Accessibility, ClassMethod, ClassProp, IdentName, MemberExpr, MemberProp, MethodKind,
    MethodProp, PropName, SuperProp, SuperPropExpr,
};
use swc_ecma_visit::FoldWith;
use tracing::{debug, trace};

use super::classify::{is_private_declaration, is_private_parts, prefixed_ident, prefixed_name};
use super::TransformContext;
use crate::resolver::{prop_name_text, Access};

/// The new key for a member declaration, or `None` to leave it as is.
fn renamed_key(
    cx: &TransformContext<'_>,
    what: &str,
    accessibility: Option<Accessibility>,
    doc_positions: &[BytePos],
    key: &PropName,
) -> Option<PropName> {
    let js_doc: Vec<_> = doc_positions
        .iter()
        .flat_map(|&pos| leading_js_doc(&cx.comments, pos))
        .collect();
    if !is_private_parts(&cx.config, accessibility, &js_doc) {
        return None;
    }
    let Some(renamed) = prefixed_name(&cx.factory, cx.config.prefix(), key) else {
        trace!(what, "private member has a computed name, left as is");
        return None;
    };
    debug!(
        what,
        from = %prop_name_text(key).unwrap_or_default(),
        to = %prop_name_text(&renamed).unwrap_or_default(),
        "renaming private member"
    );
    Some(renamed)
}

/// Rename a private field declaration.
pub(super) fn class_prop(cx: &mut TransformContext<'_>, node: ClassProp) -> ClassProp {
    let renamed = renamed_key(cx, "property", node.accessibility, &[node.span.lo], &node.key);
    let node = node.fold_children_with(cx);
    match renamed {
        Some(key) => cx.factory.update_class_prop(node, key),
        None => node,
    }
}

/// Rename a private method declaration. Accessors keep their names.
pub(super) fn class_method(cx: &mut TransformContext<'_>, node: ClassMethod) -> ClassMethod {
    let renamed = match node.kind {
        MethodKind::Method => {
            renamed_key(cx, "method", node.accessibility, &[node.span.lo], &node.key)
        }
        MethodKind::Getter | MethodKind::Setter => None,
    };
    let node = node.fold_children_with(cx);
    match renamed {
        Some(key) => cx.factory.update_class_method(node, key),
        None => node,
    }
}

/// Rename an object-literal method marked `@internal`.
pub(super) fn method_prop(cx: &mut TransformContext<'_>, node: MethodProp) -> MethodProp {
    let mut positions = vec![node.key.span().lo, node.function.span.lo];
    positions.dedup();
    let renamed = renamed_key(cx, "object method", None, &positions, &node.key);
    let node = node.fold_children_with(cx);
    match renamed {
        Some(key) => cx.factory.update_method_prop(node, key),
        None => node,
    }
}

/// The new name for an access whose resolved declaration is a private field
/// or method.
///
/// Candidates are checked in order. Accessors, parameter properties and
/// signatures are skipped; the first private field or method wins.
fn renamed_access(cx: &TransformContext<'_>, access: Access<'_>) -> Option<IdentName> {
    let name = access.name()?;
    let Some(symbol) = cx.resolver.symbol_at_access(access) else {
        trace!(name = %name.sym, "access did not resolve");
        return None;
    };
    let winner = symbol
        .declarations
        .iter()
        .find(|d| d.kind.is_field_or_method() && is_private_declaration(&cx.config, d))?;
    let renamed = prefixed_ident(&cx.factory, cx.config.prefix(), name);
    debug!(kind = ?winner.kind, from = %name.sym, to = %renamed.sym, "renaming access");
    Some(renamed)
}

/// Rename `receiver.name` when it resolves to a private member.
pub(super) fn member_expr(cx: &mut TransformContext<'_>, node: MemberExpr) -> MemberExpr {
    let renamed = renamed_access(cx, Access::Member(&node));
    let node = node.fold_children_with(cx);
    match renamed {
        Some(name) => cx.factory.update_member_expr(node, MemberProp::Ident(name)),
        None => node,
    }
}

/// Rename `super.name` when it resolves to a private member.
pub(super) fn super_prop_expr(cx: &mut TransformContext<'_>, node: SuperPropExpr) -> SuperPropExpr {
    let renamed = renamed_access(cx, Access::SuperProp(&node));
    let node = node.fold_children_with(cx);
    match renamed {
        Some(name) => cx.factory.update_super_prop_expr(node, SuperProp::Ident(name)),
        None => node,
    }
}
