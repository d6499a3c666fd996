use std::io::Cursor;
use std::thread;

use monkey::evaluator::MAX_CALL_DEPTH;
use monkey::parser::MAX_NESTING_DEPTH;
use monkey::repl::{self, Mode, MONKEY_FACE, PROMPT, STACK_SIZE};
use proptest::prelude::*;

const ERROR_HEADER: &str = "Woops! We ran into some monkey business here!\n parser errors:\n";

fn run(mode: Mode, input: &str) -> String {
    let mut out = Vec::new();
    repl::start(mode, Cursor::new(input.as_bytes()), &mut out).expect("session failed");
    String::from_utf8(out).expect("output is not utf-8")
}

#[test]
fn tokenize_prints_each_token_and_no_eof() {
    let out = run(Mode::Tokenize, "let x = 5;\n");
    assert_eq!(out, format!("{p}\
        {{Type:LET Literal:let}}\n\
        {{Type:IDENT Literal:x}}\n\
        {{Type:= Literal:=}}\n\
        {{Type:INT Literal:5}}\n\
        {{Type:; Literal:;}}\n\
        {p}", p = PROMPT));
    assert!(!out.contains("EOF"));
}

#[test]
fn tokenize_never_prints_banner() {
    let out = run(Mode::Tokenize, "a\nb\n");
    assert!(!out.contains(MONKEY_FACE));
    assert_eq!(out, format!("{p}{{Type:IDENT Literal:a}}\n{p}{{Type:IDENT Literal:b}}\n{p}", p = PROMPT));
}

#[test]
fn blank_line_prints_only_prompts() {
    assert_eq!(run(Mode::Tokenize, "\n"), format!("{p}{p}", p = PROMPT));
    assert_eq!(run(Mode::Parse, "   \n"), format!("{}{p}\n{p}", MONKEY_FACE, p = PROMPT));
}

#[test]
fn parse_prints_canonical_tree() {
    let out = run(Mode::Parse, "let x = 1 + 2 * 3;\n-a * b\n");
    assert_eq!(out, format!("{}{p}let x = (1 + (2 * 3));\n{p}((-a) * b)\n{p}", MONKEY_FACE, p = PROMPT));
    assert!(!out.contains(ERROR_HEADER));
}

#[test]
fn parse_reports_diagnostics_and_continues() {
    let out = run(Mode::Parse, "let x 5;\nx\n");
    assert_eq!(out, format!("{}{p}{}\texpected next token to be =, got INT instead\n{p}x\n{p}",
        MONKEY_FACE, ERROR_HEADER, p = PROMPT));
}

#[test]
fn evaluate_prints_values() {
    let out = run(Mode::Evaluate, "1 + 2\n\"a\" + \"b\"\n[1, 2][0] == 1\n");
    assert_eq!(out, format!("{}{p}3\n{p}ab\n{p}true\n{p}", MONKEY_FACE, p = PROMPT));
}

#[test]
fn evaluate_skips_lines_without_value() {
    let out = run(Mode::Evaluate, "let x = 5;\nx * 2\n");
    assert_eq!(out, format!("{}{p}{p}10\n{p}", MONKEY_FACE, p = PROMPT));
}

#[test]
fn evaluate_does_not_run_after_parse_error() {
    let out = run(Mode::Evaluate, "let y = ;\ny\n");
    assert_eq!(out, format!("{}{p}{}\tno prefix parse function for ; found\n{p}ERROR: identifier not found: y\n{p}",
        MONKEY_FACE, ERROR_HEADER, p = PROMPT));
}

#[test]
fn evaluate_reports_runtime_errors_and_continues() {
    let out = run(Mode::Evaluate, "5 + true\nlet f = fn(n) { if (n < 2) { 1 } else { n * f(n - 1) } };\nf(5)\n");
    assert_eq!(out, format!("{}{p}ERROR: type mismatch: INTEGER + BOOLEAN\n{p}{p}120\n{p}", MONKEY_FACE, p = PROMPT));
}

#[test]
fn banner_written_once_before_first_prompt() {
    for mode in [Mode::Parse, Mode::Evaluate] {
        let out = run(mode, "1\n2\n3\n");
        assert!(out.starts_with(&format!("{}{}", MONKEY_FACE, PROMPT)));
        assert_eq!(out.matches(MONKEY_FACE).count(), 1);
    }
    assert_eq!(run(Mode::Evaluate, ""), format!("{}{}", MONKEY_FACE, PROMPT));
}

#[test]
fn last_line_without_newline_is_processed() {
    assert_eq!(run(Mode::Evaluate, "7"), format!("{}{p}7\n{p}", MONKEY_FACE, p = PROMPT));
}

/// Runs the session on a thread sized like the one the binary uses.
fn run_on_session_stack(mode: Mode, input: String) -> String {
    thread::Builder::new()
        .stack_size(STACK_SIZE)
        .spawn(move || run(mode, &input))
        .expect("failed to spawn session thread")
        .join()
        .expect("session thread panicked")
}

#[test]
fn runaway_recursion_is_an_error_and_session_continues() {
    let input = "let sum = fn(n) { if (n == 0) { 0 } else { n + sum(n - 1) } };\nsum(100000)\nsum(3)\n";
    let out = run_on_session_stack(Mode::Evaluate, input.to_string());
    assert_eq!(out, format!("{}{p}{p}ERROR: stack overflow: max call depth {} exceeded\n{p}6\n{p}",
        MONKEY_FACE, MAX_CALL_DEPTH, p = PROMPT));
}

#[test]
fn deeply_nested_line_is_a_parse_error_and_session_continues() {
    let input = format!("{}\n1 + 1\n", "(".repeat(100_000));
    let expected_error = format!("\texpression nested too deeply: max depth {} exceeded\n", MAX_NESTING_DEPTH);

    let out = run_on_session_stack(Mode::Parse, input.clone());
    assert_eq!(out, format!("{}{p}{}{}{p}(1 + 1)\n{p}", MONKEY_FACE, ERROR_HEADER, expected_error, p = PROMPT));

    let out = run_on_session_stack(Mode::Evaluate, input);
    assert_eq!(out, format!("{}{p}{}{}{p}2\n{p}", MONKEY_FACE, ERROR_HEADER, expected_error, p = PROMPT));
}

fn any_mode() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Tokenize), Just(Mode::Parse), Just(Mode::Evaluate)]
}

proptest! {
    #[test]
    fn prompt_count_is_lines_plus_one(
        lines in prop::collection::vec("[a-z0-9 ]{0,12}", 0..8),
    ) {
        let input: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        let out = run(Mode::Tokenize, &input);
        // token lines never contain the prompt text
        let prompts = out.matches(PROMPT).count();
        prop_assert_eq!(prompts, lines.len() + 1);
        prop_assert!(out.ends_with(PROMPT));
    }

    #[test]
    fn same_input_gives_same_output(
        mode in any_mode(),
        lines in prop::collection::vec(r#"[a-z0-9+*(){}\[\]",:;=!<> -]{0,16}"#, 0..6),
    ) {
        let input = lines.join("\n");
        prop_assert_eq!(run(mode, &input), run(mode, &input));
    }
}
