//! Privacy classification and name prefixing.

use privatize_ast::{is_identifier_text, JsDoc, NodeFactory};
use privatize_core::config::TransformerConfig;
use swc_common::Span;
use swc_ecma_ast::{Accessibility, IdentName, PropName};

use crate::resolver::{prop_name_text, Declaration};

/// JSDoc tag that marks a member private when `includeInternal` is on.
pub const INTERNAL_TAG: &str = "internal";

/// Decide privacy from a declaration's parts.
///
/// With `includeInternal`, any `@internal` tag in any leading JSDoc block makes
/// the member private. Otherwise, or when no such tag exists, the member is
/// private iff it carries the `private` modifier.
pub fn is_private_parts(
    config: &TransformerConfig,
    accessibility: Option<Accessibility>,
    js_doc: &[JsDoc],
) -> bool {
    if config.include_internal() && js_doc.iter().any(|doc| doc.has_tag(INTERNAL_TAG)) {
        return true;
    }
    accessibility == Some(Accessibility::Private)
}

/// Classify a declaration returned by a resolver.
pub fn is_private_declaration(config: &TransformerConfig, declaration: &Declaration) -> bool {
    is_private_parts(config, declaration.accessibility, &declaration.js_doc)
}

/// The renamed form of an accessed name.
pub fn prefixed_ident(factory: &NodeFactory, prefix: &str, name: &IdentName) -> IdentName {
    factory.create_ident_name(format!("{}{}", prefix, name.sym), name.span)
}

/// The renamed form of a member name, or `None` when the name is computed.
///
/// Identifier names stay identifiers. Literal names become identifiers when
/// the prefixed text is one, and stay string literals otherwise so that
/// `'a-b'` turns into `'_a-b'` rather than an invalid identifier.
pub fn prefixed_name(factory: &NodeFactory, prefix: &str, name: &PropName) -> Option<PropName> {
    let span = match name {
        PropName::Ident(ident) => return Some(PropName::Ident(prefixed_ident(factory, prefix, ident))),
        PropName::Str(s) => s.span,
        PropName::Num(n) => n.span,
        PropName::Computed(_) | PropName::BigInt(_) => return None,
    };
    let text = prop_name_text(name)?;
    Some(prefixed_literal(factory, prefix, &text, span))
}

fn prefixed_literal(factory: &NodeFactory, prefix: &str, text: &str, span: Span) -> PropName {
    let renamed = format!("{}{}", prefix, text);
    if is_identifier_text(&renamed) {
        PropName::Ident(factory.create_ident_name(renamed, span))
    } else {
        PropName::Str(factory.create_str(renamed, span))
    }
}
