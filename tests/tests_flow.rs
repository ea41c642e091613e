//! Control-flow analysis: reachability and return-completeness.

use bittle::AnalysisHost;
use bittle::semantic::Severity;

const MAIN: &str = "/ws/main.btl";

fn host(source: &str) -> AnalysisHost {
    let mut host = AnalysisHost::new();
    host.set_file_content(MAIN, source);
    host
}

fn messages(host: &AnalysisHost) -> Vec<String> {
    host.diagnostics(MAIN)
        .into_iter()
        .map(|d| d.message)
        .collect()
}

#[test]
fn test_missing_return_after_conditional() {
    let host = host("func f(): Int32 { if (true) { return 1; } }");
    let messages = messages(&host);
    assert!(
        messages
            .iter()
            .any(|m| m.contains("function lacks ending return statement")),
        "{messages:?}"
    );
}

#[test]
fn test_unreachable_after_return() {
    let host = host("func f() { return; var x = 1; }");
    let diagnostics = host.diagnostics(MAIN);
    let hint = diagnostics
        .iter()
        .find(|d| d.message == "unreachable code")
        .expect("no unreachable hint");
    assert_eq!(hint.severity, Severity::Hint);
    assert!(hint.unnecessary);
    // The hint covers `var x = 1;`.
    assert_eq!(hint.range.start.row, 0);
    assert_eq!(hint.range.start.column, 19);
}

#[test]
fn test_void_function_needs_no_return() {
    let host = host("func f() { var x = 1; }");
    assert!(messages(&host).is_empty());
}

#[test]
fn test_final_return_satisfies() {
    let host = host("func f(c: Bool): Int32 { if (c) { return 1; } return 0; }");
    assert!(messages(&host).is_empty());
}

#[test]
fn test_both_branches_return() {
    let host = host("func f(c: Bool): Int32 { if (c) { return 1; } else { return 0; } }");
    assert!(messages(&host).is_empty());
}

#[test]
fn test_never_call_ends_flow() {
    let host = host(
        "extern func abort(): !; \
         func f(): Int32 { abort(); }",
    );
    assert!(messages(&host).is_empty(), "{:?}", messages(&host));
}

#[test]
fn test_exhaustive_match_returns() {
    let host = host(
        "func f(x: Int32): Int32 { \
           match (x) { \
             case 0: return 0; \
             case _: return 1; \
           } \
         }",
    );
    assert!(messages(&host).is_empty(), "{:?}", messages(&host));
}

#[test]
fn test_guarded_wildcard_is_not_exhaustive() {
    let host = host(
        "func f(x: Int32): Int32 { \
           match (x) { \
             case _ if (x > 0): return 1; \
           } \
         }",
    );
    let messages = messages(&host);
    assert!(
        messages
            .iter()
            .any(|m| m.contains("function lacks ending return statement")),
        "{messages:?}"
    );
}

#[test]
fn test_infinite_loop_counts_as_exit() {
    let host = host("func f(): Int32 { while (true) { } }");
    assert!(messages(&host).is_empty(), "{:?}", messages(&host));
}

#[test]
fn test_breaking_infinite_loop_does_not_exit() {
    let host = host("func f(): Int32 { while (true) { break; } }");
    let messages = messages(&host);
    assert!(
        messages
            .iter()
            .any(|m| m.contains("function lacks ending return statement")),
        "{messages:?}"
    );
}

#[test]
fn test_while_false_body_unreachable() {
    let host = host("func f() { while (false) { return; } }");
    let diagnostics = host.diagnostics(MAIN);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.message == "unreachable code" && d.unnecessary),
        "{diagnostics:?}"
    );
}

#[test]
fn test_if_true_marks_else_unreachable() {
    let host = host("func f() { if (true) { } else { return; } }");
    let diagnostics = host.diagnostics(MAIN);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.message == "unreachable code"),
        "{diagnostics:?}"
    );
}

#[test]
fn test_for_body_state_is_discarded() {
    let host = host("func f(): Int32 { for (;;) { return 1; } }");
    let messages = messages(&host);
    assert!(
        messages
            .iter()
            .any(|m| m.contains("function lacks ending return statement")),
        "{messages:?}"
    );
}

#[test]
fn test_break_outside_loop() {
    let host = host("func f() { break; }");
    let messages = messages(&host);
    assert!(
        messages.iter().any(|m| m.contains("'break' outside of a loop")),
        "{messages:?}"
    );
}

#[test]
fn test_continue_outside_loop() {
    let host = host("func f() { match (1) { case _: continue; } }");
    let messages = messages(&host);
    assert!(
        messages
            .iter()
            .any(|m| m.contains("'continue' outside of a loop")),
        "{messages:?}"
    );
}

#[test]
fn test_break_inside_loop_is_fine() {
    let host = host(
        "func f() { \
           while (true) { break; } \
           for (;;) { continue; } \
         }",
    );
    assert!(messages(&host).is_empty(), "{:?}", messages(&host));
}
