// tests/parser_tests.rs
//
// Grammar-level behavior: whole Paper programs through the public entry point.

use miette::Diagnostic;
use paper::ast::{Node, Program};
use paper::{parse, ErrorKind, PaperError, SourceContext};

fn parse_ok(source: &str) -> Program {
    parse(source, SourceContext::from_source("test", source)).unwrap()
}

fn parse_err(source: &str) -> PaperError {
    parse(source, SourceContext::from_source("test", source)).unwrap_err()
}

// ---
// Literals
// ---

#[test]
fn a_bare_digit_is_an_integer_literal() {
    assert_eq!(parse_ok("5").lines, vec![vec![Node::IntegerLiteral(5)]]);
}

#[test]
fn hash_prefixed_digits_form_a_multi_digit_integer() {
    assert_eq!(parse_ok("#42").lines, vec![vec![Node::IntegerLiteral(42)]]);
}

#[test]
fn the_largest_i64_integer_literal_parses() {
    assert_eq!(
        parse_ok("#9223372036854775807").lines,
        vec![vec![Node::IntegerLiteral(i64::MAX)]]
    );
}

#[test]
fn an_integer_literal_too_large_for_i64_does_not_parse() {
    // The digit run is syntactically fine but its value does not fit, so the
    // literal is a non-match rather than a panic or a wrapped value.
    assert!(matches!(
        parse_err("#99999999999999999999").kind,
        ErrorKind::NoContentParsed
    ));
}

#[test]
fn a_quoted_string_is_a_string_literal() {
    assert_eq!(
        parse_ok("\"hi\"").lines,
        vec![vec![Node::StringLiteral("hi".into())]]
    );
}

#[test]
fn a_string_literal_consumes_exactly_its_quoted_extent() {
    // "ab" is four characters; the trailing letter is left for the
    // instruction fallback.
    assert_eq!(
        parse_ok("\"ab\"c").lines,
        vec![vec![
            Node::StringLiteral("ab".into()),
            Node::Instruction('c'),
        ]]
    );
}

#[test]
fn the_empty_string_literal_is_allowed() {
    assert_eq!(
        parse_ok("\"\"").lines,
        vec![vec![Node::StringLiteral(String::new())]]
    );
}

#[test]
fn a_char_literal_is_a_length_one_string_literal() {
    assert_eq!(
        parse_ok("'x").lines,
        vec![vec![Node::StringLiteral("x".into())]]
    );
}

// ---
// Instructions and lines
// ---

#[test]
fn bare_letters_become_instructions() {
    assert_eq!(
        parse_ok("ab").lines,
        vec![vec![Node::Instruction('a'), Node::Instruction('b')]]
    );
}

#[test]
fn literals_and_instructions_mix_on_a_line() {
    assert_eq!(
        parse_ok("1+2").lines,
        vec![vec![
            Node::IntegerLiteral(1),
            Node::Instruction('+'),
            Node::IntegerLiteral(2),
        ]]
    );
}

#[test]
fn linebreaks_separate_line_groups() {
    assert_eq!(
        parse_ok("5\n6").lines,
        vec![vec![Node::IntegerLiteral(5)], vec![Node::IntegerLiteral(6)]]
    );
}

#[test]
fn a_run_of_linebreak_characters_collapses_to_one_separator() {
    assert_eq!(
        parse_ok("5\r\n\n6").lines,
        vec![vec![Node::IntegerLiteral(5)], vec![Node::IntegerLiteral(6)]]
    );
}

// ---
// Blocks
// ---

#[test]
fn a_pipe_separates_block_clauses() {
    assert_eq!(
        parse_ok("M1|2}").lines,
        vec![vec![Node::MapBlock(vec![
            vec![Node::IntegerLiteral(1)],
            vec![Node::IntegerLiteral(2)],
        ])]]
    );
}

#[test]
fn a_block_without_pipes_has_a_single_clause() {
    assert_eq!(
        parse_ok("R7}").lines,
        vec![vec![Node::RepeatBlock(vec![vec![Node::IntegerLiteral(7)]])]]
    );
}

#[test]
fn blocks_nest() {
    assert_eq!(
        parse_ok("M5R6}}").lines,
        vec![vec![Node::MapBlock(vec![vec![
            Node::IntegerLiteral(5),
            Node::RepeatBlock(vec![vec![Node::IntegerLiteral(6)]]),
        ]])]]
    );
}

#[test]
fn each_marker_builds_its_own_block_kind() {
    assert_eq!(
        parse_ok("?1|2}").lines,
        vec![vec![Node::DecisionBlock(vec![
            vec![Node::IntegerLiteral(1)],
            vec![Node::IntegerLiteral(2)],
        ])]]
    );
    assert_eq!(
        parse_ok("{a}").lines,
        vec![vec![Node::BlockLiteral(vec![vec![Node::Instruction('a')]])]]
    );
}

#[test]
fn an_empty_block_does_not_parse() {
    // Block contents are one-or-more expressions, so `M}` never matches and
    // the leading marker is left unconsumed.
    assert!(matches!(parse_err("M}").kind, ErrorKind::NoContentParsed));
}

// ---
// Driver errors
// ---

#[test]
fn leftover_input_is_reported_with_the_exact_suffix() {
    let err = parse_err("5}");
    assert_eq!(err.kind, ErrorKind::UnconsumedInput { rest: "}".into() });
}

#[test]
fn wholly_unmatched_input_reports_no_content() {
    assert!(matches!(parse_err("}").kind, ErrorKind::NoContentParsed));
    assert!(matches!(parse_err("").kind, ErrorKind::NoContentParsed));
}

#[test]
fn a_trailing_linebreak_fails_the_line_that_never_arrives() {
    let err = parse_err("5\n");
    match err.kind {
        ErrorKind::SequenceElementFailed { label, rest } => {
            assert_eq!(label, "some(expression)");
            assert_eq!(rest, "");
        }
        other => panic!("expected a sequence element failure, got {other:?}"),
    }
}

#[test]
fn errors_carry_a_diagnostic_code_and_message() {
    let err = parse_err("5}");
    assert_eq!(
        err.code().unwrap().to_string(),
        "paper::parse::unconsumed_input"
    );
    assert_eq!(err.to_string(), "Parse error: unconsumed input: '}'");
}
