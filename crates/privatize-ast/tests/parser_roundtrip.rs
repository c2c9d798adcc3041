// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use privatize_ast::{
    leading_js_doc, new_source_map, parse_source_file, prettify_error, print_source_file,
};
use swc_ecma_ast::{ClassMember, Decl, ModuleDecl, ModuleItem};

fn all_fixtures() -> impl Iterator<Item = (PathBuf, String)> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");

    path.read_dir().expect("read_dir").map(|file| {
        let path = file.unwrap().path();
        let contents = std::fs::read_to_string(&path).expect("reading file");
        (path, contents)
    })
}

#[test]
fn fixtures_parse_and_reprint_stably() {
    for (path, input) in all_fixtures() {
        let label = path.display().to_string();
        let cm = new_source_map();
        let file = match parse_source_file(&cm, &label, &input) {
            Ok(file) => file,
            Err(e) => panic!("{}", prettify_error(&e, &input, &label)),
        };
        let first = print_source_file(&file).unwrap();
        let reparsed = match parse_source_file(&cm, &label, &first) {
            Ok(file) => file,
            Err(e) => panic!("{}", prettify_error(&e, &first, &label)),
        };
        let second = print_source_file(&reparsed).unwrap();
        assert_eq!(first, second, "fixture {}", label);
    }
}

#[test]
fn comments_survive_printing() {
    let input = std::fs::read_to_string(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/counter.ts"),
    )
    .unwrap();
    let cm = new_source_map();
    let out = print_source_file(&parse_source_file(&cm, "counter.ts", &input).unwrap()).unwrap();
    assert!(out.contains("A simple counter."), "{}", out);
    assert!(out.contains("/** @internal */"), "{}", out);
}

#[test]
fn modern_syntax_is_accepted() {
    let input = std::fs::read_to_string(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/modern.ts"),
    )
    .unwrap();
    let cm = new_source_map();
    let out = print_source_file(&parse_source_file(&cm, "modern.ts", &input).unwrap()).unwrap();
    for expected in ["#p = 1", "enum Color", "type N = number", "switch", "finally", "`start ${"] {
        assert!(out.contains(expected), "missing {:?} in {}", expected, out);
    }
    assert!(out.contains("// Aliases and enums."), "{}", out);
}

#[test]
fn jsdoc_is_found_in_front_of_exported_members() {
    let input = std::fs::read_to_string(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/counter.ts"),
    )
    .unwrap();
    let cm = new_source_map();
    let file = parse_source_file(&cm, "counter.ts", &input).unwrap();
    let ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) = &file.module.body[0] else {
        panic!("expected export");
    };
    let Decl::Class(class) = &export.decl else {
        panic!("expected class");
    };
    let ClassMember::ClassProp(step) = &class.class.body[1] else {
        panic!("expected property");
    };
    let docs = leading_js_doc(&file.comments, step.span.lo);
    assert_eq!(docs.len(), 1);
    assert!(docs[0].has_tag("internal"));
}
