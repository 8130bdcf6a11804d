//! Black-box tests compiling and running whole programs through the public
//! `babyduck` API, checking stdout output byte-for-byte.

use babyduck::compile_and_run;

#[test]
fn arithmetic_precedence() {
    let src = "program p; var x: int; main { x = 2 + 3 * 4; print(x); } end";
    assert_eq!(compile_and_run(src).unwrap(), "14\n");
}

#[test]
fn parenthesized_precedence_overrides_default() {
    let src = "program p; var x: int; main { x = (2 + 3) * 4; print(x); } end";
    assert_eq!(compile_and_run(src).unwrap(), "20\n");
}

#[test]
fn while_loop_prints_each_iteration_on_one_line() {
    let src = "program p; var i: int; main { i = 0; while (i < 3) do { print(i); i = i + 1; }; } end";
    assert_eq!(compile_and_run(src).unwrap(), "0 1 2\n");
}

#[test]
fn if_else_takes_the_true_branch() {
    let src = r#"program p; var a: int; main { a = 5; if (a < 10) { print("lt"); } else { print("ge"); }; } end"#;
    assert_eq!(compile_and_run(src).unwrap(), "lt\n");
}

#[test]
fn if_else_takes_the_false_branch() {
    let src = r#"program p; var a: int; main { a = 50; if (a < 10) { print("lt"); } else { print("ge"); }; } end"#;
    assert_eq!(compile_and_run(src).unwrap(), "ge\n");
}

#[test]
fn int_division_widens_result_to_float() {
    let src = "program p; var r: float; main { r = 1 / 2; print(r); } end";
    assert_eq!(compile_and_run(src).unwrap(), "0.5\n");
}

#[test]
fn recursion_friendly_call_sequence_computes_fibonacci() {
    let src = "program p; var n,a,b,t,c: int; \
                void fib(k: int) [ { a = 0; b = 1; c = 0; \
                while (c < k) do { t = a+b; a = b; b = t; c = c+1; }; print(a); } ]; \
                main { n = 7; fib(n); } end";
    assert_eq!(compile_and_run(src).unwrap(), "13\n");
}

#[test]
fn multiple_print_items_are_space_separated() {
    let src = r#"program p; var x: int; main { x = 3; print("x is", x); } end"#;
    assert_eq!(compile_and_run(src).unwrap(), "x is 3\n");
}

#[test]
fn nested_parentheses_do_not_leave_operators_on_the_stack() {
    let src = "program p; var x: int; main { x = ((((1 + 2)))); print(x); } end";
    assert_eq!(compile_and_run(src).unwrap(), "3\n");
}

#[test]
fn empty_program_produces_no_output() {
    let src = "program p; main {} end";
    assert_eq!(compile_and_run(src).unwrap(), "");
}

#[test]
fn globals_only_with_no_statements_still_runs() {
    let src = "program p; var x: int; var y: float; main {} end";
    assert_eq!(compile_and_run(src).unwrap(), "");
}

#[test]
fn recursive_function_calls_itself_and_stacks_frames() {
    let src = "program p; var n: int; \
                void countdown(k: int) [ { if (k > 0) { print(k); countdown(k - 1); }; } ]; \
                main { n = 3; countdown(n); } end";
    assert_eq!(compile_and_run(src).unwrap(), "3 2 1\n");
}

#[test]
fn undeclared_variable_is_a_compile_error() {
    let src = "program p; var x: int; main { x = y + 1; } end";
    let err = compile_and_run(src).unwrap_err().to_string();
    assert!(err.contains("undeclared"), "unexpected message: {err}");
}

#[test]
fn use_before_init_is_a_compile_error() {
    let src = "program p; var x: int; var y: int; main { x = y + 1; } end";
    let err = compile_and_run(src).unwrap_err().to_string();
    assert!(err.contains("initializ"), "unexpected message: {err}");
}

#[test]
fn assigning_float_literal_to_int_variable_is_a_type_error() {
    let src = "program p; var x: int; main { x = 1.5; } end";
    assert!(compile_and_run(src).is_err());
}

#[test]
fn calling_a_function_with_the_wrong_arity_is_rejected() {
    let src = "program p; void f(a: int, b: int) [ { } ]; main { f(1); } end";
    let err = compile_and_run(src).unwrap_err().to_string();
    assert!(err.contains("argument count") || err.contains("expected"), "unexpected message: {err}");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let src = "program p; var x: float; var z: int; main { z = 0; x = 4 / z; } end";
    let err = compile_and_run(src).unwrap_err().to_string();
    assert!(err.contains("division"), "unexpected message: {err}");
}
