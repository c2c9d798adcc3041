// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Clone-with-changes constructors for swc nodes.
//!
//! `update_*` functions take the original node plus a value for every slot
//! that changes and return a node of the same kind. Spans and every other
//! field carry over, so comments keyed by position stay attached. `create_*`
//! functions build fresh leaf nodes at a given span.

use swc_common::Span;
use swc_ecma_ast::{
    ClassMethod, ClassProp, IdentName, MemberExpr, MemberProp, MethodProp, PropName, Str,
    SuperProp, SuperPropExpr,
};

/// Builds and updates syntax nodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeFactory;

impl NodeFactory {
    pub fn new() -> Self {
        NodeFactory
    }

    /// A property or member name.
    pub fn create_ident_name(&self, text: impl Into<String>, span: Span) -> IdentName {
        let text: String = text.into();
        IdentName {
            span,
            sym: text.into(),
        }
    }

    /// A string literal. The printer picks the quotes.
    pub fn create_str(&self, value: impl Into<String>, span: Span) -> Str {
        let value: String = value.into();
        Str {
            span,
            value: value.into(),
            raw: None,
        }
    }

    pub fn update_class_prop(&self, node: ClassProp, key: PropName) -> ClassProp {
        ClassProp { key, ..node }
    }

    pub fn update_class_method(&self, node: ClassMethod, key: PropName) -> ClassMethod {
        ClassMethod { key, ..node }
    }

    pub fn update_method_prop(&self, node: MethodProp, key: PropName) -> MethodProp {
        MethodProp { key, ..node }
    }

    pub fn update_member_expr(&self, node: MemberExpr, prop: MemberProp) -> MemberExpr {
        MemberExpr { prop, ..node }
    }

    pub fn update_super_prop_expr(&self, node: SuperPropExpr, prop: SuperProp) -> SuperPropExpr {
        SuperPropExpr { prop, ..node }
    }
}
