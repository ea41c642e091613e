//! Includes, imports, the file graph, and cross-file queries.

use bittle::AnalysisHost;
use bittle::semantic::{Severity, Symbol};

fn host(files: &[(&str, &str)]) -> AnalysisHost {
    let mut host = AnalysisHost::new();
    for (path, text) in files {
        host.set_file_content(path, text);
    }
    host
}

fn error_messages(host: &AnalysisHost, path: &str) -> Vec<String> {
    host.diagnostics(path)
        .into_iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| d.message)
        .collect()
}

#[test]
fn test_include_splices_declarations() {
    let host = host(&[
        ("/ws/defs.btl", "struct P { x: Int32 } const LIMIT = 10;"),
        (
            "/ws/main.btl",
            "include \"defs.btl\"; func f(p: *P): Int32 { return p.x + LIMIT as Int32; }",
        ),
    ]);
    assert!(error_messages(&host, "/ws/main.btl").is_empty());
    // The spliced symbols belong to main's translation unit.
    assert!(host.symbol("/ws/main.btl", "record:P").is_some());
}

#[test]
fn test_include_cycle_is_cut() {
    let host = host(&[
        (
            "/ws/a.btl",
            "include \"b.btl\"; func x(): Int32 { return 0; }",
        ),
        ("/ws/b.btl", "include \"a.btl\";"),
    ]);
    assert!(error_messages(&host, "/ws/a.btl").is_empty());
    assert!(error_messages(&host, "/ws/b.btl").is_empty());
    // `x` elaborated once: a single definition origin.
    let Some(Symbol::Func(x)) = host.symbol("/ws/a.btl", "func:x") else {
        panic!("missing x");
    };
    assert!(x.is_defined);
    assert_eq!(x.origins.len(), 1);
}

#[test]
fn test_unresolved_include() {
    let host = host(&[("/ws/main.btl", "include \"missing.btl\";")]);
    let errors = error_messages(&host, "/ws/main.btl");
    assert!(errors.iter().any(|m| m.contains("cannot resolve include")));
}

#[test]
fn test_unresolved_import() {
    let host = host(&[("/ws/main.btl", "import \"nope\";")]);
    let errors = error_messages(&host, "/ws/main.btl");
    assert!(errors.iter().any(|m| m.contains("cannot resolve import")));
}

#[test]
fn test_import_resolves_with_extension() {
    let host = host(&[
        ("/ws/lib.btl", "module lib; func helper(): Int32 { return 1; }"),
        (
            "/ws/main.btl",
            "import \"lib\"; func f(): Int32 { return helper(); }",
        ),
    ]);
    assert!(error_messages(&host, "/ws/main.btl").is_empty());
}

#[test]
fn test_import_gives_cross_file_visibility() {
    let host = host(&[
        (
            "/ws/lib.btl",
            "module lib; struct Vec2 { x: Int32, y: Int32 } \
             func origin(): Vec2 { return Vec2 { x: 0, y: 0 }; }",
        ),
        (
            "/ws/main.btl",
            "import \"lib.btl\"; func f(): Int32 { var v = origin(); return v.x; }",
        ),
    ]);
    assert!(error_messages(&host, "/ws/main.btl").is_empty());
    // Unlike include, the import does not splice the symbol into main.
    let Some(Symbol::Record(_)) = host.symbol("/ws/main.btl", "record:Vec2") else {
        panic!("imported record must be reachable through the unit");
    };
}

#[test]
fn test_references_span_the_workspace() {
    let host = host(&[
        ("/ws/lib.btl", "module lib; struct Vec2 { x: Int32, y: Int32 }"),
        (
            "/ws/main.btl",
            "import \"lib.btl\"; func f(v: *Vec2): Int32 { return v.x; }",
        ),
    ]);
    let references = host.references("/ws/lib.btl", "record:Vec2");
    let files: Vec<_> = references.iter().map(|r| r.file.clone()).collect();
    assert!(
        files.iter().any(|f| f.ends_with("lib.btl")),
        "{references:?}"
    );
    assert!(
        files.iter().any(|f| f.ends_with("main.btl")),
        "{references:?}"
    );
    assert!(references.iter().any(|r| r.is_definition));
    assert!(references.iter().any(|r| !r.is_definition));
}

#[test]
fn test_edit_invalidates_dependent_unit() {
    let mut host = host(&[
        ("/ws/lib.btl", "module lib; func helper(): Int32 { return 1; }"),
        (
            "/ws/main.btl",
            "import \"lib.btl\"; func f(): Int32 { return helper(); }",
        ),
    ]);
    assert!(error_messages(&host, "/ws/main.btl").is_empty());

    // Renaming the helper must be observed by the importing unit.
    host.set_file_content("/ws/lib.btl", "module lib; func helper2(): Int32 { return 1; }");
    let errors = error_messages(&host, "/ws/main.btl");
    assert!(
        errors.iter().any(|m| m.contains("unknown symbol 'helper'")),
        "{errors:?}"
    );
}

#[test]
fn test_creating_a_missing_file_resolves_includes() {
    let mut host = host(&[("/ws/main.btl", "include \"defs.btl\"; func f(p: *P) { }")]);
    assert!(!error_messages(&host, "/ws/main.btl").is_empty());

    host.set_file_content("/ws/defs.btl", "struct P { x: Int32 }");
    assert!(
        error_messages(&host, "/ws/main.btl").is_empty(),
        "{:?}",
        error_messages(&host, "/ws/main.btl")
    );
}

#[test]
fn test_import_cycle_reports() {
    let host = host(&[
        ("/ws/a.btl", "import \"b.btl\";"),
        ("/ws/b.btl", "import \"a.btl\";"),
    ]);
    // One side of the cycle observes the re-entry and reports it.
    let all: Vec<String> = error_messages(&host, "/ws/a.btl")
        .into_iter()
        .chain(error_messages(&host, "/ws/b.btl"))
        .collect();
    assert!(all.iter().any(|m| m.contains("cyclic import")), "{all:?}");
}

#[test]
fn test_diagnostics_attribute_to_the_right_file() {
    let host = host(&[
        ("/ws/bad.btl", "func broken(): Int32 { }"),
        ("/ws/main.btl", "include \"bad.btl\";"),
    ]);
    let diagnostics = host.diagnostics("/ws/main.btl");
    let missing = diagnostics
        .iter()
        .find(|d| d.message.contains("function lacks ending return statement"))
        .expect("missing-return diagnostic not found");
    assert!(missing.file.ends_with("bad.btl"), "{missing:?}");
}
