//! Elaboration: name resolution, type checking, declare/define protocol.

use bittle::AnalysisHost;
use bittle::parser::SyntaxKind;
use bittle::semantic::{Severity, Symbol, TypeKind};

const MAIN: &str = "/ws/main.btl";

fn host(source: &str) -> AnalysisHost {
    let mut host = AnalysisHost::new();
    host.set_file_content(MAIN, source);
    host
}

fn error_messages(host: &AnalysisHost) -> Vec<String> {
    host.diagnostics(MAIN)
        .into_iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| d.message)
        .collect()
}

fn assert_clean(host: &AnalysisHost) {
    let diagnostics = host.diagnostics(MAIN);
    assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
}

/// Find a node of `kind` whose text is exactly `text`.
fn node_with_text(
    host: &AnalysisHost,
    kind: SyntaxKind,
    text: &str,
) -> bittle::parser::SyntaxNode {
    host.syntax(MAIN)
        .descendants()
        .find(|n| n.kind() == kind && n.text() == text)
        .unwrap_or_else(|| panic!("no {kind:?} node with text {text:?}"))
}

#[test]
fn test_distance_function_checks_clean() {
    let host = host(
        "struct P { x: Int, y: Int } \
         func d(p1: *P, p2: *P): Int { \
           var dx = p2.x - p1.x; \
           var dy = p2.y - p1.y; \
           return dx*dx + dy*dy; \
         }",
    );
    assert_clean(&host);

    // `dx` infers to the 64-bit integer without any annotation.
    let dx = node_with_text(&host, SyntaxKind::LOCAL_DECL, "var dx = p2.x - p1.x;");
    let ty = host.infer_type(MAIN, &dx).expect("no type for dx");
    assert!(matches!(&*ty, TypeKind::Int { bits: Some(64) }), "{ty}");

    // The function's return type is Int64.
    let Some(Symbol::Func(d)) = host.symbol(MAIN, "func:d") else {
        panic!("function symbol missing");
    };
    assert!(matches!(&*d.return_ty, TypeKind::Int { bits: Some(64) }));

    // Field access resolves through the record.
    let field = node_with_text(&host, SyntaxKind::FIELD_EXPR, "p1.x");
    assert_eq!(host.resolve_symbol(MAIN, &field), ["P.x"]);
}

#[test]
fn test_redefinition_with_different_signature() {
    let host = host("func f(): Int32; func f(): Int64 { return 0; }");
    let errors = error_messages(&host);
    assert_eq!(errors, ["Redefinition of 'f' with different signature."]);
}

#[test]
fn test_forward_declaration_merges() {
    let host = host("func f(x: Int32): Int32; func f(x: Int32): Int32 { return x; }");
    assert_clean(&host);
    let Some(Symbol::Func(f)) = host.symbol(MAIN, "func:f") else {
        panic!("missing symbol");
    };
    assert!(f.is_defined);
    assert_eq!(f.origins.len(), 2);
    assert!(f.origins[0].is_forward_decl);
    assert!(!f.origins[1].is_forward_decl);
}

#[test]
fn test_positional_after_named_argument() {
    let host = host("func g(a: Int32, b: Int32 = 1) { } func h() { g(b: 2, 3); }");
    let errors = error_messages(&host);
    assert_eq!(errors, ["Positional argument cannot follow a named argument."]);
}

#[test]
fn test_call_argument_rules() {
    let host = host(
        "func g(a: Int32, b: Int32 = 1) { } \
         func h() { g(); g(1); g(1, 2); g(a: 1, b: 2); g(1, 2, 3); g(a: 1, a: 2); }",
    );
    let errors = error_messages(&host);
    assert_eq!(errors.len(), 3, "{errors:?}");
    assert!(errors[0].contains("missing argument for parameter 'a'"));
    assert!(errors[1].contains("too many arguments"));
    assert!(errors[2].contains("parameter 'a' is already initialized"));
}

#[test]
fn test_variadic_calls() {
    let host1 = host(
        "extern func printf(fmt: *Int8, args: ...): Int32; \
         func f() { printf(\"%d %d\", 1, 2); }",
    );
    assert_clean(&host1);

    let host2 = host("func f(args: ...) { f(args); }");
    let diagnostics = host2.diagnostics(MAIN);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning
                && d.message.contains("rest parameter value passed as variadic argument")),
        "{diagnostics:?}"
    );
}

#[test]
fn test_enum_member_values() {
    let host = host("enum Color { Red, Green = 10, Blue } const LAST: Int32 = Blue as Int32;");
    assert_clean(&host);
    let Some(Symbol::Enum(color)) = host.symbol(MAIN, "enum:Color") else {
        panic!("missing enum");
    };
    assert_eq!(color.members.len(), 3);
    let Some(Symbol::Const(blue)) = host.symbol(MAIN, "const:Blue") else {
        panic!("missing member");
    };
    assert!(matches!(&*blue.ty, TypeKind::Enum { .. }));
    let Some(bittle::semantic::ConstValue::Int(value, _)) = &blue.value else {
        panic!("member has no value");
    };
    assert_eq!(value.to_string(), "11");
}

#[test]
fn test_const_before_use_in_signature() {
    // The constant is declared after the function that uses it in an
    // array-typed parameter; lazy definition makes the order irrelevant.
    let host = host("func f(buf: [Int8; SIZE]) { } const SIZE = 16;");
    assert_clean(&host);
}

#[test]
fn test_const_arithmetic_overflow() {
    let host = host("const X: Int8 = 100 + 100;");
    let errors = error_messages(&host);
    assert!(!errors.is_empty(), "overflowing constant must not check");
}

#[test]
fn test_division_by_zero_has_no_value() {
    let host = host("const X = 1 / 0;");
    let errors = error_messages(&host);
    assert!(errors.iter().any(|m| m.contains("constant expression")));
}

#[test]
fn test_record_literal_rules() {
    let host = host(
        "struct P { x: Int32, y: Int32 = 0 } \
         func f() { \
           var a = P { x: 1 }; \
           var b = P { x: 1, x: 2, y: 3 }; \
           var c = P { y: 1 }; \
         }",
    );
    let errors = error_messages(&host);
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(errors[0].contains("field 'x' already initialized"));
    assert!(errors[1].contains("field 'x' is not initialized"));
}

#[test]
fn test_union_literal_takes_exactly_one_field() {
    let host = host(
        "union V { i: Int64, b: Bool } \
         func f() { var a = V { i: 1 }; var b = V { i: 1, b: true }; }",
    );
    let errors = error_messages(&host);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("only one field can be initialized in a union"));
}

#[test]
fn test_record_inheritance() {
    let host = host(
        "struct Base { id: Int32 } \
         struct Derived: Base { extra: Int32 } \
         func f(d: *Derived): Int32 { return d.id; } \
         func g(d: *Derived): *Base { return d; }",
    );
    assert_clean(&host);
    let field = node_with_text(&host, SyntaxKind::FIELD_EXPR, "d.id");
    assert_eq!(host.resolve_symbol(MAIN, &field), ["Derived.id"]);
}

#[test]
fn test_self_inheritance_is_rejected() {
    let host = host("struct S: S { x: Int32 }");
    let errors = error_messages(&host);
    assert!(errors.iter().any(|m| m.contains("cannot inherit from itself")));
}

#[test]
fn test_empty_record_is_rejected() {
    let host = host("struct S { }");
    let errors = error_messages(&host);
    assert!(errors.iter().any(|m| m.contains("at least one field")));
}

#[test]
fn test_unknown_symbol_and_not_a_value() {
    let host = host("struct S { x: Int32 } func f() { var a = missing; var b = S; }");
    let errors = error_messages(&host);
    assert!(errors.iter().any(|m| m.contains("unknown symbol 'missing'")));
    assert!(errors.iter().any(|m| m.contains("'S' is not a value")));
}

#[test]
fn test_type_mismatch_messages() {
    let host = host("func f(): Int8 { var wide: Int64 = 5; return wide; }");
    let errors = error_messages(&host);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("type mismatch: expected 'Int8', got 'Int64'"));
}

#[test]
fn test_numeric_widening_is_implicit() {
    let host = host("func f(): Int64 { var narrow: Int8 = 5; return narrow; }");
    assert_clean(&host);
}

#[test]
fn test_pointer_rules() {
    let host = host(
        "func f(p: *Int32): Int32 { return *p; } \
         func g(x: Int32): *Int32 { return &x; } \
         func bad(x: Int32): Int32 { return *x; }",
    );
    let errors = error_messages(&host);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("expected pointer type"));
}

#[test]
fn test_casts() {
    let host = host(
        "enum E { A } \
         func f() { \
           var a = 1 as Int8; \
           var b = A as Int32; \
           var c = 0 as *Void; \
           var d = true as *Void; \
         }",
    );
    let errors = error_messages(&host);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("invalid cast from 'Bool' to '*Void'"));
}

#[test]
fn test_redundant_cast_warning() {
    let host = host("func f(x: Int32) { var y = x as Int32; }");
    let diagnostics = host.diagnostics(MAIN);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning && d.message.contains("redundant cast")),
        "{diagnostics:?}"
    );
}

#[test]
fn test_main_signature() {
    let host1 = host("func main(argc: Int32, argv: **Int8): Int32 { return 0; }");
    assert_clean(&host1);
    let host2 = host("func main(): Int32 { return 0; }");
    assert_clean(&host2);
    let host3 = host("func main(x: Bool): Int32 { return 0; }");
    let errors = error_messages(&host3);
    assert!(errors.iter().any(|m| m.contains("invalid signature for 'main'")));
}

#[test]
fn test_sizeof_is_int64() {
    let host = host("struct P { a: Int32, b: Int8 } const S = sizeof(P);");
    assert_clean(&host);
    let Some(Symbol::Const(s)) = host.symbol(MAIN, "const:S") else {
        panic!("missing const");
    };
    assert!(matches!(&*s.ty, TypeKind::Int { bits: Some(64) }));
    // C layout: 4 + 1 padded to alignment 4.
    let Some(bittle::semantic::ConstValue::Int(value, _)) = &s.value else {
        panic!("sizeof did not evaluate");
    };
    assert_eq!(value.to_string(), "8");
}

#[test]
fn test_match_pattern_typing() {
    let host = host(
        "const LIMIT: Int32 = 9; \
         func f(x: Int32): Int32 { \
           match (x) { \
             case 0: return 0; \
             case n @ 1 ... LIMIT: return n; \
             case _: return -1; \
           } \
         }",
    );
    assert_clean(&host);
}

#[test]
fn test_binding_in_or_pattern_is_rejected() {
    let host = host("func f(x: Int32) { match (x) { case n @ 1 | 2: return; case _: return; } }");
    let errors = error_messages(&host);
    assert!(
        errors.iter().any(|m| m.contains("binding is not allowed")),
        "{errors:?}"
    );
}

#[test]
fn test_name_pattern_requires_constant() {
    let host = host("var g: Int32; func f(x: Int32) { match (x) { case g: return; case _: return; } }");
    let errors = error_messages(&host);
    assert!(errors.iter().any(|m| m.contains("'g' is not a constant")));
}

#[test]
fn test_empty_range_warning() {
    let host = host("func f(x: Int32) { match (x) { case 9 ... 1: return; case _: return; } }");
    let diagnostics = host.diagnostics(MAIN);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning && d.message.contains("empty range")),
        "{diagnostics:?}"
    );
}

#[test]
fn test_typeof_type() {
    let host = host("var g: Int8; func f(): typeof(g) { return g; }");
    assert_clean(&host);
    let Some(Symbol::Func(f)) = host.symbol(MAIN, "func:f") else {
        panic!("missing func");
    };
    assert!(matches!(&*f.return_ty, TypeKind::Int { bits: Some(8) }));
}

#[test]
fn test_idempotent_elaboration() {
    let source = "struct P { x: Int } func f(p: *P): Int { return p.x; }";
    let host1 = host(source);
    let host2 = host(source);
    assert_eq!(host1.diagnostics(MAIN), host2.diagnostics(MAIN));
    assert_eq!(host1.document_symbols(MAIN), host2.document_symbols(MAIN));
}
