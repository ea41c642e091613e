//! Parsing of top-level declarations.

use bittle::parser::ast::{self, AstNode};
use bittle::parser::{SyntaxKind, parse};

fn parse_ok(source: &str) -> bittle::parser::SyntaxNode {
    let result = parse(source);
    assert!(result.ok(), "errors for {source:?}: {:?}", result.errors);
    result.syntax()
}

fn first_item(source: &str) -> ast::Item {
    let root = parse_ok(source);
    ast::Root::cast(root)
        .unwrap()
        .items()
        .next()
        .expect("no item parsed")
}

#[test]
fn test_parse_include_module_import() {
    assert!(matches!(
        first_item("include \"util.btl\";"),
        ast::Item::Include(_)
    ));
    assert!(matches!(first_item("module main;"), ast::Item::Module(_)));
    assert!(matches!(first_item("import \"lib\";"), ast::Item::Import(_)));
}

#[test]
fn test_parse_enum() {
    let ast::Item::Enum(decl) = first_item("enum Color { Red, Green = 2, Blue, }") else {
        panic!("expected enum");
    };
    assert_eq!(decl.name_token().unwrap().text(), "Color");
    let members: Vec<_> = decl.members().map(|m| m.name()).collect();
    assert_eq!(members, ["Red", "Green", "Blue"]);
    assert!(decl.members().nth(1).unwrap().value().is_some());
}

#[test]
fn test_parse_anonymous_enum() {
    let ast::Item::Enum(decl) = first_item("enum { A, B }") else {
        panic!("expected enum");
    };
    assert!(decl.name_token().is_none());
    assert_eq!(decl.members().count(), 2);
}

#[test]
fn test_parse_struct_with_base_and_defaults() {
    let ast::Item::Record(decl) = first_item("struct Derived: Base { x: Int32 = 1, y: Int64 }")
    else {
        panic!("expected record");
    };
    assert!(!decl.is_union());
    assert!(decl.base_type().is_some());
    let fields: Vec<_> = decl.fields().map(|f| f.name()).collect();
    assert_eq!(fields, ["x", "y"]);
    assert!(decl.fields().next().unwrap().default_value().is_some());
}

#[test]
fn test_parse_union() {
    let ast::Item::Record(decl) = first_item("union Value { i: Int64, p: *Void }") else {
        panic!("expected record");
    };
    assert!(decl.is_union());
}

#[test]
fn test_parse_func_signature() {
    let ast::Item::Func(decl) =
        first_item("func add(a: Int32, b: Int32 = 1, rest: ...): Int32 { return a; }")
    else {
        panic!("expected func");
    };
    assert_eq!(decl.name(), "add");
    let params: Vec<_> = decl.params().collect();
    assert_eq!(params.len(), 3);
    assert!(params[1].default_value().is_some());
    assert!(params[2].is_rest());
    assert!(decl.return_type().is_some());
    assert!(decl.body().is_some());
}

#[test]
fn test_parse_extern_forms() {
    let ast::Item::Func(decl) = first_item("extern func exit(code: Int32): !;") else {
        panic!("expected func");
    };
    assert!(decl.is_extern());
    assert!(decl.body().is_none());
    assert!(matches!(decl.return_type(), Some(ast::TypeNode::Never(_))));

    let ast::Item::Global(decl) = first_item("extern var errno: Int32;") else {
        panic!("expected global");
    };
    assert!(decl.is_extern());
}

#[test]
fn test_parse_const() {
    let ast::Item::Const(decl) = first_item("const SIZE: Int64 = 4 * 1024;") else {
        panic!("expected const");
    };
    assert_eq!(decl.name(), "SIZE");
    assert!(decl.ty().is_some());
    assert!(decl.value().is_some());
}

#[test]
fn test_parse_types() {
    let root = parse_ok("var a: *mut Int32; var b: [Int8; 16]; var c: typeof(x); var d: (*Void);");
    let globals: Vec<_> = ast::Root::cast(root)
        .unwrap()
        .items()
        .filter_map(|item| match item {
            ast::Item::Global(g) => g.ty(),
            _ => None,
        })
        .collect();
    assert!(matches!(&globals[0], ast::TypeNode::Pointer(p) if p.is_mut()));
    assert!(matches!(&globals[1], ast::TypeNode::Array(a) if a.size().is_some()));
    assert!(matches!(&globals[2], ast::TypeNode::Typeof(_)));
    assert!(matches!(&globals[3], ast::TypeNode::Group(_)));
}

#[test]
fn test_recovery_between_declarations() {
    let result = parse("func f() {} ??? struct S { x: Int }");
    assert!(!result.ok());
    let root = ast::Root::cast(result.syntax()).unwrap();
    let kinds: Vec<_> = root
        .syntax()
        .children()
        .map(|n| n.kind())
        .filter(|k| *k != SyntaxKind::ERROR)
        .collect();
    assert_eq!(kinds, [SyntaxKind::FUNC_DECL, SyntaxKind::RECORD_DECL]);
}

#[test]
fn test_block_comments_are_trivia() {
    let result = parse(
        "/* header */ struct S { x: Int32 /* field note */, y: Int32 } /* tail */",
    );
    assert!(result.ok(), "errors: {:?}", result.errors);
    let root = ast::Root::cast(result.syntax()).unwrap();
    let ast::Item::Record(decl) = root.items().next().unwrap() else {
        panic!("expected record");
    };
    assert_eq!(decl.fields().count(), 2);
}

#[test]
fn test_error_messages_carry_context() {
    let result = parse("const X: Int32 = 1");
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.message.contains("while parsing constant declaration")),
        "{:?}",
        result.errors
    );

    let result = parse("func f(a Int32) {}");
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.message.contains("while parsing parameter list")),
        "{:?}",
        result.errors
    );
}

#[test]
fn test_recovery_inside_record() {
    let result = parse("struct S { x: Int, ???, y: Int } func f() {}");
    assert!(!result.ok());
    // The following declaration still parses.
    let root = ast::Root::cast(result.syntax()).unwrap();
    assert!(root.items().any(|i| matches!(i, ast::Item::Func(_))));
}
