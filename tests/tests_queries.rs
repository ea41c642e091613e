//! The query façade: symbols in scope, resolution, types, outlines.

use bittle::AnalysisHost;
use bittle::base::Point;
use bittle::parser::SyntaxKind;
use bittle::semantic::TypeKind;

const MAIN: &str = "/ws/main.btl";

const SOURCE: &str = "\
const LIMIT: Int64 = 100;
var total: Int64;
struct Point2 { x: Int, y: Int }
func scale(p: *Point2, factor: Int): Int {
    var scaled = p.x * factor;
    return scaled;
}
";

fn host() -> AnalysisHost {
    let mut host = AnalysisHost::new();
    host.set_file_content(MAIN, SOURCE);
    host
}

#[test]
fn test_no_diagnostics_in_fixture() {
    let host = host();
    let diagnostics = host.diagnostics(MAIN);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_symbols_in_scope_inside_function() {
    let host = host();
    // Inside the body of `scale`, on the `return` line.
    let symbols = host.symbols_in_scope(MAIN, Point::new(5, 8));
    let names: Vec<_> = symbols.iter().map(|s| s.name.as_str()).collect();
    for expected in ["LIMIT", "total", "Point2", "scale", "p", "factor", "scaled"] {
        assert!(names.contains(&expected), "{expected} not in {names:?}");
    }
}

#[test]
fn test_symbols_in_scope_at_top_level() {
    let host = host();
    let symbols = host.symbols_in_scope(MAIN, Point::new(0, 0));
    let names: Vec<_> = symbols.iter().map(|s| s.name.as_str()).collect();
    assert!(names.contains(&"LIMIT"));
    // Locals stay inside their function.
    assert!(!names.contains(&"scaled"), "{names:?}");
}

#[test]
fn test_resolve_symbol_on_name() {
    let host = host();
    // `factor` in `p.x * factor`.
    let node = host
        .node_at(MAIN, Point::new(4, 23), SyntaxKind::NAME_EXPR)
        .expect("no name node");
    let resolved = host.resolve_symbol(MAIN, &node);
    assert_eq!(resolved, ["func:scale.param:1"]);
}

#[test]
fn test_resolve_symbol_on_field_selector() {
    let host = host();
    let node = host
        .node_at(MAIN, Point::new(4, 17), SyntaxKind::FIELD_EXPR)
        .expect("no field node");
    let resolved = host.resolve_symbol(MAIN, &node);
    assert_eq!(resolved, ["Point2.x"]);
}

#[test]
fn test_infer_type_at_cursor() {
    let host = host();
    let node = host
        .node_at(MAIN, Point::new(4, 17), SyntaxKind::FIELD_EXPR)
        .expect("no field node");
    let ty = host.infer_type(MAIN, &node).expect("no type");
    assert!(matches!(&*ty, TypeKind::Int { bits: Some(64) }), "{ty}");
}

#[test]
fn test_eval_type_on_type_node() {
    let host = host();
    let node = host
        .node_at(MAIN, Point::new(3, 15), SyntaxKind::POINTER_TYPE)
        .expect("no pointer type node");
    let ty = host.eval_type(MAIN, &node).expect("no type");
    let TypeKind::Ptr { pointee, .. } = &*ty else {
        panic!("expected pointer, got {ty}");
    };
    assert!(matches!(&**pointee, TypeKind::Record { .. }));
}

#[test]
fn test_document_symbols_outline() {
    let host = host();
    let outline = host.document_symbols(MAIN);
    let entries: Vec<_> = outline
        .iter()
        .map(|s| (s.kind, s.qualified_name.as_str()))
        .collect();
    assert!(entries.contains(&("constant", "const:LIMIT")), "{entries:?}");
    assert!(entries.contains(&("global", "global:total")), "{entries:?}");
    assert!(entries.contains(&("struct", "record:Point2")), "{entries:?}");
    assert!(entries.contains(&("function", "func:scale")), "{entries:?}");
    assert!(entries.contains(&("field", "Point2.x")), "{entries:?}");
    // Locals never appear in the outline.
    assert!(!entries.iter().any(|(_, q)| q.contains("local")), "{entries:?}");
}

#[test]
fn test_references_within_one_file() {
    let host = host();
    let references = host.references(MAIN, "func:scale.param:0");
    // The declaration plus the use in `p.x`.
    assert_eq!(references.len(), 2, "{references:?}");
    assert!(references.iter().any(|r| r.is_definition));
    assert!(references.iter().any(|r| !r.is_definition));
}

#[test]
fn test_queries_never_fail_on_missing_file() {
    let host = host();
    assert!(host.symbols_in_scope("/ws/nope.btl", Point::new(0, 0)).is_empty());
    assert!(host.references("/ws/nope.btl", "func:f").is_empty());
    assert!(host.document_symbols("/ws/nope.btl").is_empty());
    // Diagnostics of a missing file are just empty.
    assert!(host.diagnostics("/ws/nope.btl").is_empty());
}

#[test]
fn test_snapshot_consistency_between_queries() {
    let mut host = host();
    let before = host.document_symbols(MAIN);
    assert_eq!(before, host.document_symbols(MAIN));

    host.set_file_content(MAIN, "func only(): Int32 { return 1; }");
    let after = host.document_symbols(MAIN);
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].qualified_name.as_str(), "func:only");
}
