//! The private-member rename transform.
//!
//! A host registers the transform once per program with
//! [`privatize_transformer`]. The returned factory is called once per
//! transformation context and yields a per-file transform. Every file gets a
//! fresh [`TransformContext`] bundling the shared configuration, the resolver
//! handle, a node factory and the file's comments.
//!
//! The walk is a swc [`Fold`] with hooks for class properties, class methods,
//! object-literal methods, member accesses and `super` accesses. All other
//! nodes take the generic structural recursion.

pub mod classify;
mod rewrite;

use std::sync::Arc;

use privatize_ast::{NodeFactory, SourceFile};
use privatize_core::config::TransformerConfig;
use swc_common::comments::SingleThreadedComments;
use swc_ecma_ast::{ClassMethod, ClassProp, MemberExpr, MethodProp, SuperPropExpr};
use swc_ecma_visit::{Fold, FoldWith};
use tracing::debug_span;

use crate::resolver::SymbolResolver;

/// Per-file transform: `SourceFile -> SourceFile`.
pub type FileTransform<'r> = Box<dyn Fn(SourceFile) -> SourceFile + 'r>;

/// Per-transformation-context factory of file transforms.
pub type ContextTransform<'r> = Box<dyn Fn(&TransformationContext) -> FileTransform<'r> + 'r>;

/// What a host provides to each transformation pass.
#[derive(Debug, Default, Clone)]
pub struct TransformationContext {
    factory: NodeFactory,
}

impl TransformationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(&self) -> NodeFactory {
        self.factory
    }
}

/// State for transforming one file.
pub struct TransformContext<'r> {
    config: Arc<TransformerConfig>,
    resolver: &'r dyn SymbolResolver,
    factory: NodeFactory,
    /// Comments of the file being transformed, for JSDoc lookups.
    comments: SingleThreadedComments,
}

impl<'r> TransformContext<'r> {
    pub fn new(
        config: Arc<TransformerConfig>,
        resolver: &'r dyn SymbolResolver,
        factory: NodeFactory,
    ) -> Self {
        TransformContext {
            config,
            resolver,
            factory,
            comments: SingleThreadedComments::default(),
        }
    }

    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    /// Rewrite a whole file.
    pub fn transform(&mut self, file: SourceFile) -> SourceFile {
        let _span = debug_span!("transform", file = %file.file_name).entered();
        self.comments = file.comments.clone();
        file.map_module(|module| module.fold_with(self))
    }
}

impl Fold for TransformContext<'_> {
    fn fold_class_prop(&mut self, node: ClassProp) -> ClassProp {
        rewrite::class_prop(self, node)
    }

    fn fold_class_method(&mut self, node: ClassMethod) -> ClassMethod {
        rewrite::class_method(self, node)
    }

    fn fold_method_prop(&mut self, node: MethodProp) -> MethodProp {
        rewrite::method_prop(self, node)
    }

    fn fold_member_expr(&mut self, node: MemberExpr) -> MemberExpr {
        rewrite::member_expr(self, node)
    }

    fn fold_super_prop_expr(&mut self, node: SuperPropExpr) -> SuperPropExpr {
        rewrite::super_prop_expr(self, node)
    }
}

/// Register the transform for a program.
///
/// Defaults are applied to `config` here, once; every file transform shares
/// the result.
///
/// ```
/// use privatize::transform::{privatize_transformer, TransformationContext};
/// use privatize::checker::Checker;
/// use privatize::program::Program;
/// use privatize_core::config::RawTransformerConfig;
///
/// let program = Program::from_sources([("a.ts", "class A { private x = 1; }")]).unwrap();
/// let checker = Checker::new(&program);
/// let before = privatize_transformer(&checker, RawTransformerConfig::default());
/// let transform = before(&TransformationContext::new());
/// let file = transform(program.files()[0].clone());
/// let printed = privatize_ast::print_source_file(&file).unwrap();
/// assert!(printed.contains("private _x = 1;"));
/// ```
pub fn privatize_transformer<'r>(
    resolver: &'r dyn SymbolResolver,
    config: impl Into<TransformerConfig>,
) -> ContextTransform<'r> {
    let config = Arc::new(config.into());
    Box::new(move |context: &TransformationContext| -> FileTransform<'r> {
        let config = Arc::clone(&config);
        let factory = context.factory();
        Box::new(move |file: SourceFile| {
            TransformContext::new(Arc::clone(&config), resolver, factory).transform(file)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{Access, Declaration, Symbol};
    use privatize_ast::{new_source_map, parse_source_file, print_source_file};
    use privatize_core::config::RawTransformerConfig;
    use swc_ecma_ast::{ClassMember, Decl, ModuleItem, ParamOrTsParamProp, Stmt};

    /// Resolves an access to every class member with the same name, in
    /// declaration order, ignoring the receiver.
    struct ByName {
        declarations: Vec<Declaration>,
    }

    impl ByName {
        fn from_file(file: &SourceFile) -> Self {
            let mut declarations = Vec::new();
            for item in &file.module.body {
                let ModuleItem::Stmt(Stmt::Decl(Decl::Class(class))) = item else {
                    continue;
                };
                for member in &class.class.body {
                    match member {
                        ClassMember::ClassProp(p) => {
                            declarations.extend(Declaration::from_class_prop(p, &file.comments))
                        }
                        ClassMember::Method(m) => {
                            declarations.extend(Declaration::from_class_method(m, &file.comments))
                        }
                        ClassMember::Constructor(c) => {
                            for param in &c.params {
                                if let ParamOrTsParamProp::TsParamProp(p) = param {
                                    declarations
                                        .extend(Declaration::from_param_prop(p, &file.comments));
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            ByName { declarations }
        }
    }

    impl SymbolResolver for ByName {
        fn symbol_at_access(&self, access: Access<'_>) -> Option<Symbol> {
            let name = access.name()?.sym.to_string();
            let declarations: Vec<Declaration> = self
                .declarations
                .iter()
                .filter(|d| d.name == name)
                .cloned()
                .collect();
            if declarations.is_empty() {
                None
            } else {
                Some(Symbol { name, declarations })
            }
        }
    }

    /// Parse `declarations` as the resolver's view and `source` as the file
    /// to transform, then print the result.
    fn run_with(declarations: &str, source: &str, config: RawTransformerConfig) -> String {
        let cm = new_source_map();
        let file = parse_source_file(&cm, "input.ts", source).unwrap();
        let decls = parse_source_file(&cm, "decls.ts", declarations).unwrap();
        let resolver = ByName::from_file(&decls);
        let before = privatize_transformer(&resolver, config);
        let transform = before(&TransformationContext::new());
        print_source_file(&transform(file)).unwrap()
    }

    fn run(source: &str, config: RawTransformerConfig) -> String {
        run_with(source, source, config)
    }

    fn reprint(source: &str) -> String {
        let cm = new_source_map();
        print_source_file(&parse_source_file(&cm, "input.ts", source).unwrap()).unwrap()
    }

    fn internal() -> RawTransformerConfig {
        RawTransformerConfig {
            include_internal: Some(true),
            custom_prefix: None,
        }
    }

    #[test]
    fn private_field_and_its_accesses_are_renamed() {
        let out = run(
            "class A {\n    private value = 1;\n    read(): number {\n        return this.value;\n    }\n}\n",
            RawTransformerConfig::default(),
        );
        assert!(out.contains("private _value = 1;"), "{}", out);
        assert!(out.contains("return this._value;"), "{}", out);
        assert!(!out.contains(" value"), "{}", out);
    }

    #[test]
    fn public_members_are_untouched() {
        let source = "class A {\n    value = 1;\n    read(): number {\n        return this.value;\n    }\n}\n";
        assert_eq!(run(source, RawTransformerConfig::default()), reprint(source));
    }

    #[test]
    fn internal_method_needs_include_internal() {
        let source = "class A {\n    /** @internal */\n    compute(): number {\n        return 1;\n    }\n    run(): number {\n        return this.compute();\n    }\n}\n";
        let off = run(source, RawTransformerConfig::default());
        assert!(off.contains("compute(): number"), "{}", off);
        assert!(off.contains("this.compute()"), "{}", off);

        let on = run(source, internal());
        assert!(on.contains("/** @internal */"), "{}", on);
        assert!(on.contains("_compute(): number"), "{}", on);
        assert!(on.contains("this._compute()"), "{}", on);
    }

    #[test]
    fn custom_prefix_is_used_everywhere() {
        let config = RawTransformerConfig {
            include_internal: None,
            custom_prefix: Some("priv_".to_string()),
        };
        let out = run(
            "class Counter {\n    private count = 0;\n    inc(): void {\n        this.count += 1;\n    }\n}\n",
            config,
        );
        assert!(out.contains("private priv_count = 0;"), "{}", out);
        assert!(out.contains("this.priv_count += 1;"), "{}", out);
    }

    #[test]
    fn unresolved_access_passes_through() {
        let out = run(
            "class A {\n    private value = 1;\n}\nfunction f(x: any): any {\n    return x.other;\n}\n",
            RawTransformerConfig::default(),
        );
        assert!(out.contains("return x.other;"), "{}", out);
    }

    #[test]
    fn nested_receivers_are_transformed_too() {
        let out = run(
            "class Node {\n    private next: Node;\n    private size = 0;\n    walk(): number {\n        return this.next.size;\n    }\n}\n",
            RawTransformerConfig::default(),
        );
        assert!(out.contains("return this._next._size;"), "{}", out);
    }

    #[test]
    fn accessor_candidates_are_skipped_not_disqualifying() {
        let declarations = "class A {\n    private get size(): number {\n        return 1;\n    }\n}\nclass B {\n    size: number;\n}\nclass C {\n    private size(): number {\n        return 2;\n    }\n}\n";
        let out = run_with(declarations, "let n = thing.size;\n", RawTransformerConfig::default());
        assert!(out.contains("let n = thing._size;"), "{}", out);
    }

    #[test]
    fn only_non_field_candidates_means_no_rename() {
        let declarations = "class A {\n    private get size(): number {\n        return 1;\n    }\n    constructor(private label: string) {}\n}\n";
        let source = "let n = thing.size + thing.label;\n";
        assert_eq!(
            run_with(declarations, source, RawTransformerConfig::default()),
            reprint(source)
        );
    }

    #[test]
    fn public_candidates_before_private_ones_do_not_stop_the_search() {
        let declarations = "class B {\n    size: number;\n}\nclass C {\n    private size: number;\n}\n";
        let out = run_with(declarations, "let n = thing.size;\n", RawTransformerConfig::default());
        assert!(out.contains("let n = thing._size;"), "{}", out);
    }

    #[test]
    fn renamed_declarations_classify_the_same() {
        let cm = new_source_map();
        let file = parse_source_file(
            &cm,
            "a.ts",
            "class A {\n    /** @internal */\n    helper(): void {}\n    private value = 1;\n}\n",
        )
        .unwrap();
        let resolver = ByName::from_file(&file);
        let config = TransformerConfig::new(true, "_");
        let mut cx = TransformContext::new(Arc::new(config.clone()), &resolver, NodeFactory::new());
        let out = cx.transform(file);
        let renamed = ByName::from_file(&out);
        let names: Vec<&str> = renamed.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["_helper", "_value"]);
        for declaration in &renamed.declarations {
            assert!(classify::is_private_declaration(&config, declaration));
        }
    }

    #[test]
    fn optional_chain_survives_rename() {
        let out = run(
            "class A {\n    private value = 1;\n    read(): number {\n        return this?.value;\n    }\n}\n",
            RawTransformerConfig::default(),
        );
        assert!(out.contains("this?._value"), "{}", out);
    }

    #[test]
    fn super_access_is_renamed() {
        let out = run(
            "class A {\n    /** @internal */\n    step(): void {}\n}\nclass B extends A {\n    run(): void {\n        super.step();\n    }\n}\n",
            internal(),
        );
        assert!(out.contains("super._step()"), "{}", out);
    }

    #[test]
    fn object_literal_methods_follow_the_same_rules() {
        let out = run(
            "let o = {\n    /** @internal */\n    hidden(): void {},\n    shown(): void {}\n};\n",
            internal(),
        );
        assert!(out.contains("_hidden()"), "{}", out);
        assert!(out.contains("shown()"), "{}", out);
        assert!(!out.contains("_shown"), "{}", out);
    }

    #[test]
    fn ecmascript_private_names_are_left_alone() {
        let source = "class A {\n    #count = 0;\n    bump(): void {\n        this.#count++;\n    }\n}\n";
        assert_eq!(run(source, internal()), reprint(source));
    }

    #[test]
    fn comments_stay_in_place_after_renaming() {
        let out = run(
            "// header comment\nclass A {\n    // note\n    private x = 1; /* keep */\n}\n",
            RawTransformerConfig::default(),
        );
        assert!(out.contains("// header comment"), "{}", out);
        assert!(out.contains("// note"), "{}", out);
        assert!(out.contains("/* keep */"), "{}", out);
        assert!(out.contains("private _x = 1;"), "{}", out);
    }
}
