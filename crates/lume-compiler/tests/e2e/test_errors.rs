use super::helpers::*;
use lume_compiler::{compile, CompileError, OptLevel};

#[test]
fn e2e_unterminated_string_is_lex_error() {
    let err = compile_err("local s = \"unterminated");
    assert!(matches!(err, CompileError::Lex(_)));
    assert_eq!(err.stage(), "lex");
}

#[test]
fn e2e_illegal_character_reports_position() {
    let err = compile_err("local x = 1\nlocal y = $");
    let CompileError::Lex(lex) = err else {
        panic!("expected lex error")
    };
    assert_eq!(lex.line, 2);
    assert_eq!(lex.column, 11);
}

#[test]
fn e2e_missing_end_is_parse_error() {
    let err = compile_err("if x then print(x)");
    assert!(matches!(err, CompileError::Parse(_)));
    assert!(err.to_string().contains("'end'"));
}

#[test]
fn e2e_expected_vs_found_in_message() {
    let err = compile_err("while x print(x) end");
    let msg = err.to_string();
    assert!(msg.contains("'do'"), "message: {msg}");
    assert!(msg.contains("print"), "message: {msg}");
}

#[test]
fn e2e_premature_eof() {
    let err = compile_err("function f(");
    assert!(matches!(err, CompileError::Parse(_)));
    assert!(err.to_string().contains("<eof>"));
}

#[test]
fn e2e_invalid_assignment_target() {
    let err = compile_err("f(x) = 3");
    assert!(err.to_string().contains("invalid assignment target"));
}

#[test]
fn e2e_failure_produces_no_listing() {
    // Fail-fast, all-or-nothing: a failed compile yields Err, never a
    // partial listing.
    assert!(compile("\"unterminated", OptLevel::O2).is_err());
    assert!(compile("if x then", OptLevel::O2).is_err());
}

#[test]
fn e2e_optimizer_levels_do_not_change_errors() {
    for level in [OptLevel::O0, OptLevel::O1, OptLevel::O2] {
        let err = compile("local = 1", level).unwrap_err();
        assert_eq!(err.stage(), "parse");
    }
}
