//! Black-box integration tests for the mote language, exercised only
//! through the `Interpreter` host bridge.

use mote_runtime::{ErrorCode, Interpreter, Word};

fn interp() -> Interpreter {
    Interpreter::new(8192).unwrap()
}

#[test]
fn scenario_arithmetic_on_variables() {
    let mut i = interp();
    let r = i.eval("var x = 3\nvar y = 4\nreturn x*x + y*y").unwrap();
    assert_eq!(r, Word::from_int(25));
}

#[test]
fn scenario_user_function_call() {
    let mut i = interp();
    let r = i.eval("func f(a,b){ return a+b }\nreturn f(10,32)").unwrap();
    assert_eq!(r, Word::from_int(42));
}

#[test]
fn scenario_while_loop_accumulates() {
    let mut i = interp();
    let r = i
        .eval("var s=0\nvar j=1\nwhile (j <= 10) { s = s+j\nj = j+1 }\nreturn s")
        .unwrap();
    assert_eq!(r, Word::from_int(55));
}

#[test]
fn scenario_if_else_both_branches() {
    let mut i = interp();
    let r = i.eval("var x=1\nif (x) { return 7 } else { return 9 }").unwrap();
    assert_eq!(r, Word::from_int(7));

    let mut i = interp();
    let r = i.eval("var x=0\nif (x) { return 7 } else { return 9 }").unwrap();
    assert_eq!(r, Word::from_int(9));
}

#[cfg(feature = "array")]
#[test]
fn scenario_array_sum_and_out_of_bounds() {
    let mut i = interp();
    let r = i
        .eval("array a(3) = {5,6,7}\nreturn a(0)+a(1)+a(2)")
        .unwrap();
    assert_eq!(r, Word::from_int(18));

    let mut i = interp();
    let err = i.eval("array a(3) = {5,6,7}\nreturn a(3)").unwrap_err();
    assert_eq!(err.code(), ErrorCode::OutOfBounds);
}

#[test]
fn scenario_host_function_and_host_operator() {
    let mut i = interp();
    i.define_c_function(
        "dsqr",
        2,
        std::rc::Rc::new(|args: &[Word]| {
            let x = args[0].as_int();
            let y = args[1].as_int();
            Ok(Word::from_int(x * x + y * y))
        }),
    )
    .unwrap();
    assert_eq!(i.eval("return dsqr(3,4)").unwrap(), Word::from_int(25));

    i.define_operator("@", 3, |a, b| {
        Ok(Word::from_int(a.as_int().abs() + b.as_int().abs()))
    })
    .unwrap();
    assert_eq!(i.eval("return 2 @ 3").unwrap(), Word::from_int(5));
}

#[test]
fn invariant_block_scoped_variable_not_visible_outside() {
    let mut i = interp();
    let err = i
        .eval("if (1) { var inner = 5 }\nreturn inner")
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownSym);
}

#[test]
fn invariant_shadowing_is_recovered_after_scope_exit() {
    let mut i = interp();
    let r = i
        .eval("var x = 1\nif (1) { var x = 2\nx = x+1 }\nreturn x")
        .unwrap();
    assert_eq!(r, Word::from_int(1));
}

#[test]
fn invariant_run_restores_arena_top() {
    let mut i = interp();
    let before = i.arena_used_words();
    i.eval("var x=1\nvar y=2\nfunc f(a){return a}\nreturn f(x)+y").unwrap();
    assert_eq!(i.arena_used_words(), before);
}

#[test]
fn invariant_operators_are_left_associative() {
    let mut i = interp();
    // 10 - 3 - 2 is 5 under left associativity, 9 under right.
    let r = i.eval("return 10 - 3 - 2").unwrap();
    assert_eq!(r, Word::from_int(5));
}

#[test]
fn round_trip_set_and_get() {
    let mut i = interp();
    i.define("counter", 0).unwrap();
    i.set("counter", Word::from_int(99)).unwrap();
    assert_eq!(i.get("counter").unwrap(), Word::from_int(99));
}

#[cfg(feature = "float")]
#[test]
fn round_trip_set_and_get_float() {
    let mut i = interp();
    i.set_float("temp", 3.5).unwrap();
    assert_eq!(i.get_float("temp").unwrap(), 3.5);
}

#[cfg(feature = "float")]
#[test]
fn float_literal_lexes_to_bit_reinterpreted_word() {
    let mut i = interp();
    i.set_float("pi", 3.25).unwrap();
    let r = i.eval("return pi").unwrap();
    assert_eq!(r.as_float(), 3.25);
}

#[cfg(feature = "array")]
#[test]
fn round_trip_array_define_and_get() {
    let mut i = interp();
    let values: Vec<Word> = [1, 2, 3].iter().map(|&v| Word::from_int(v)).collect();
    i.define_array("vals", &values).unwrap();
    assert_eq!(i.get_array("vals").unwrap(), values);
}

#[test]
fn recursive_user_function() {
    let mut i = interp();
    let r = i
        .eval("func fact(n) { if (n <= 1) { return 1 } else { return n * fact(n-1) } }\nreturn fact(5)")
        .unwrap();
    assert_eq!(r, Word::from_int(120));
}

#[test]
fn division_and_modulo_by_zero_do_not_panic() {
    let mut i = interp();
    assert_eq!(i.eval("return 5 / 0").unwrap(), Word::from_int(0));
    let mut i = interp();
    assert_eq!(i.eval("return 5 % 0").unwrap(), Word::from_int(0));
}

#[test]
fn stopped_cancellation_is_cooperative() {
    let mut i = interp();
    i.set_stop(|| true);
    let err = i.eval("var n = 0\nwhile (1) { n = n + 1 }").unwrap_err();
    assert_eq!(err.code(), ErrorCode::Stopped);
}

#[test]
fn host_function_reenters_via_run_callback_without_resetting_the_frame() {
    use std::cell::RefCell;
    use std::rc::Rc;

    // A host function that re-enters the interpreter with more source
    // text instead of computing its result directly (§5's re-entrant
    // case): it stashes its argument as a variable, then drives the
    // interpreter through `run_callback` rather than `eval`, so the
    // call it's nested inside isn't disturbed.
    let interp = Rc::new(RefCell::new(interp()));
    let callback_interp = Rc::clone(&interp);
    interp
        .borrow_mut()
        .define_c_function(
            "double_via_script",
            1,
            Rc::new(move |args: &[Word]| {
                let mut i = callback_interp.borrow_mut();
                i.define("cb_n", args[0].as_int())?;
                i.run_callback(Rc::from("return cb_n * 2"))
            }),
        )
        .unwrap();
    let r = interp.borrow_mut().eval("return double_via_script(21)").unwrap();
    assert_eq!(r, Word::from_int(42));
}

#[test]
fn syntax_error_surfaces_as_syntax_code() {
    let mut i = interp();
    let err = i.eval("var x = (1 +").unwrap_err();
    assert_eq!(err.code(), ErrorCode::Syntax);
}

#[test]
fn calling_with_wrong_argument_count_is_bad_args() {
    let mut i = interp();
    let err = i
        .eval("func f(a,b) { return a+b }\nreturn f(1)")
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::BadArgs);
}

#[test]
fn comments_and_semicolons_are_honored() {
    let mut i = interp();
    let r = i.eval("var x = 1; # trailing comment\nvar y = 2; return x + y # done").unwrap();
    assert_eq!(r, Word::from_int(3));
}
