//! Expression parsing: precedence, associativity, postfix chains, patterns.

use bittle::parser::ast::{self, AstNode};
use bittle::parser::{SyntaxKind, parse};

/// Parse `expr` inside a statement and hand back its node.
fn parse_expr(expr: &str) -> ast::Expr {
    let source = format!("func t() {{ {expr}; }}");
    let result = parse(&source);
    assert!(result.ok(), "errors for {expr:?}: {:?}", result.errors);
    let node = result
        .syntax()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::EXPR_STMT)
        .expect("no expression statement");
    ast::ExprStmt::cast(node)
        .unwrap()
        .expr()
        .expect("empty expression statement")
}

#[test]
fn test_mul_binds_tighter_than_add() {
    let ast::Expr::Binary(add) = parse_expr("a + b * c") else {
        panic!("expected binary");
    };
    assert_eq!(add.op(), Some(SyntaxKind::PLUS));
    assert!(matches!(add.lhs(), Some(ast::Expr::Name(_))));
    let ast::Expr::Binary(mul) = add.rhs().unwrap() else {
        panic!("expected nested binary");
    };
    assert_eq!(mul.op(), Some(SyntaxKind::STAR));
}

#[test]
fn test_add_is_left_associative() {
    let ast::Expr::Binary(outer) = parse_expr("a - b - c") else {
        panic!("expected binary");
    };
    assert!(matches!(outer.lhs(), Some(ast::Expr::Binary(_))));
    assert!(matches!(outer.rhs(), Some(ast::Expr::Name(_))));
}

#[test]
fn test_assignment_is_right_associative() {
    let ast::Expr::Binary(outer) = parse_expr("a = b = c") else {
        panic!("expected binary");
    };
    assert_eq!(outer.op(), Some(SyntaxKind::EQ));
    assert!(matches!(outer.lhs(), Some(ast::Expr::Name(_))));
    let ast::Expr::Binary(inner) = outer.rhs().unwrap() else {
        panic!("expected nested assignment");
    };
    assert_eq!(inner.op(), Some(SyntaxKind::EQ));
}

#[test]
fn test_comparison_below_shift() {
    let ast::Expr::Binary(cmp) = parse_expr("a << 1 < b") else {
        panic!("expected binary");
    };
    assert_eq!(cmp.op(), Some(SyntaxKind::LT));
    let ast::Expr::Binary(shift) = cmp.lhs().unwrap() else {
        panic!("expected shift on the left");
    };
    assert_eq!(shift.op(), Some(SyntaxKind::SHL));
}

#[test]
fn test_ternary_is_right_associative() {
    let ast::Expr::Ternary(outer) = parse_expr("a ? b : c ? d : e") else {
        panic!("expected ternary");
    };
    assert!(matches!(outer.else_expr(), Some(ast::Expr::Ternary(_))));
}

#[test]
fn test_unary_and_postfix_binding() {
    // Postfix binds tighter than prefix: -x.f is -(x.f).
    let ast::Expr::Unary(neg) = parse_expr("-x.f") else {
        panic!("expected unary");
    };
    assert_eq!(neg.op(), Some(SyntaxKind::MINUS));
    assert!(matches!(neg.operand(), Some(ast::Expr::Field(_))));

    // Cast applies to the whole unary operand.
    let ast::Expr::Cast(cast) = parse_expr("-x as Int8") else {
        panic!("expected cast");
    };
    assert!(matches!(cast.operand(), Some(ast::Expr::Unary(_))));
}

#[test]
fn test_postfix_chain() {
    let ast::Expr::Call(call) = parse_expr("obj.items[0](1, 2)") else {
        panic!("expected call");
    };
    assert!(matches!(call.callee(), Some(ast::Expr::Index(_))));
    assert_eq!(call.args().count(), 2);
}

#[test]
fn test_named_arguments() {
    let ast::Expr::Call(call) = parse_expr("g(1, b: 2, c: x + 1)") else {
        panic!("expected call");
    };
    let args: Vec<_> = call.args().collect();
    assert_eq!(args.len(), 3);
    assert!(args[0].name_token().is_none());
    assert_eq!(args[1].name_token().unwrap().text(), "b");
    assert_eq!(args[2].name_token().unwrap().text(), "c");
}

#[test]
fn test_record_expr_needs_two_token_lookahead() {
    let ast::Expr::Record(record) = parse_expr("Point { x: 1, y }") else {
        panic!("expected record expression");
    };
    assert_eq!(record.name(), "Point");
    let inits: Vec<_> = record.inits().collect();
    assert!(!inits[0].is_shorthand());
    assert!(inits[1].is_shorthand());

    // A bare name stays a name expression.
    assert!(matches!(parse_expr("Point"), ast::Expr::Name(_)));
}

#[test]
fn test_sizeof_array_literal_group() {
    assert!(matches!(parse_expr("sizeof(Int32)"), ast::Expr::Sizeof(_)));
    let ast::Expr::Array(array) = parse_expr("[1, 2, 3]") else {
        panic!("expected array literal");
    };
    assert_eq!(array.elements().count(), 3);
    assert!(matches!(parse_expr("(a + b)"), ast::Expr::Group(_)));
}

#[test]
fn test_is_expression_with_patterns() {
    let ast::Expr::Is(is) = parse_expr("x is 1 | 2 | 3") else {
        panic!("expected is-expression");
    };
    assert!(matches!(is.pattern(), Some(ast::Pat::Or(_))));

    let ast::Expr::Is(is) = parse_expr("x is 0 ... LIMIT") else {
        panic!("expected is-expression");
    };
    let Some(ast::Pat::Range(range)) = is.pattern() else {
        panic!("expected range pattern");
    };
    assert!(range.lower().is_some());
    assert!(range.upper().is_some());
}

#[test]
fn test_match_patterns() {
    let source = "func t(x: Int32) { match (x) { case v @ 1 ... 9: return; case _: return; } }";
    let result = parse(source);
    assert!(result.ok(), "errors: {:?}", result.errors);
    let cases: Vec<_> = result
        .syntax()
        .descendants()
        .filter_map(ast::MatchCase::cast)
        .collect();
    assert_eq!(cases.len(), 2);
    let Some(ast::Pat::Var(var)) = cases[0].pattern() else {
        panic!("expected binding pattern");
    };
    assert_eq!(var.name(), "v");
    assert!(matches!(var.inner(), Some(ast::Pat::Range(_))));
    assert!(matches!(cases[1].pattern(), Some(ast::Pat::Wildcard(_))));
}

#[test]
fn test_for_statement_parts() {
    let source = "func t() { for (var i = 0; i < 10; i += 1) { } for (;;) { } }";
    let result = parse(source);
    assert!(result.ok(), "errors: {:?}", result.errors);
    let fors: Vec<_> = result
        .syntax()
        .descendants()
        .filter_map(ast::ForStmt::cast)
        .collect();
    let full = fors[0].parts();
    assert!(matches!(full.init, Some(ast::Stmt::Local(_))));
    assert!(full.cond.is_some());
    assert!(full.step.is_some());
    assert!(matches!(full.body, Some(ast::Stmt::Block(_))));
    let empty = fors[1].parts();
    assert!(empty.init.is_none());
    assert!(empty.cond.is_none());
    assert!(empty.step.is_none());
    assert!(matches!(empty.body, Some(ast::Stmt::Block(_))));
}

#[test]
fn test_if_else_chain() {
    let source = "func t() { if (a) f(); else if (b) g(); else h(); }";
    let result = parse(source);
    assert!(result.ok(), "errors: {:?}", result.errors);
    let if_stmt = result
        .syntax()
        .descendants()
        .find_map(ast::IfStmt::cast)
        .unwrap();
    assert!(matches!(if_stmt.else_branch(), Some(ast::Stmt::If(_))));
}
