//! The reserved words and built-in operators every [`Interpreter`] seeds
//! its arena with at construction.
//!
//! The built-in table is installed through [`Interpreter::define_operator`],
//! the exact call a host uses to register its own operators, rather
//! than writing directly into the arena, so `DefineOperator` really does
//! extend the grammar instead of there being a separate, privileged path
//! only the built-ins take (see `DESIGN.md`, "OPERATOR vs. BINOP").
//!
//! [`Interpreter`]: crate::Interpreter
//! [`Interpreter::define_operator`]: crate::Interpreter::define_operator

use std::rc::Rc;

use mote_core::{RESERVED_WORDS, Result, StringView, SymKind, TokKind, Word};

use crate::interpreter::Interpreter;

pub(crate) fn install_reserved_words(interp: &mut Interpreter) -> Result<()> {
    for (name, tok) in RESERVED_WORDS {
        if *tok == TokKind::ArrayKw && !cfg!(feature = "array") {
            continue;
        }
        interp
            .arena_mut()
            .define(StringView::whole(Rc::from(*name)), SymKind::Reserved(*tok), Word::ZERO)?;
    }
    Ok(())
}

/// Wraps checked integer division/modulo: the core does not trap
/// division by zero (§4.D), and a built-in operator has to pick *some*
/// behavior rather than let Rust's panicking `/`/`%` take the process
/// down. Zero is returned, matching the two's-complement-wraparound
/// spirit of the rest of the arithmetic table.
fn checked_div(a: i64, b: i64) -> i64 {
    a.checked_div(b).unwrap_or(0)
}

fn checked_rem(a: i64, b: i64) -> i64 {
    a.checked_rem(b).unwrap_or(0)
}

pub(crate) fn install_operators(interp: &mut Interpreter) -> Result<()> {
    interp.define_operator("||", 0, |a, b| Ok(Word::from_bool(a.as_bool() || b.as_bool())))?;
    // Binary form is rarely written; `!` exists chiefly for the
    // unary-operator rule (`!x` => `func(0, x)`), giving logical not.
    interp.define_operator("!", 0, |_a, b| Ok(Word::from_bool(b.as_int() == 0)))?;
    interp.define_operator("&&", 1, |a, b| Ok(Word::from_bool(a.as_bool() && b.as_bool())))?;

    interp.define_operator("==", 2, |a, b| Ok(Word::from_bool(a.as_int() == b.as_int())))?;
    interp.define_operator("!=", 2, |a, b| Ok(Word::from_bool(a.as_int() != b.as_int())))?;
    interp.define_operator("<", 2, |a, b| Ok(Word::from_bool(a.as_int() < b.as_int())))?;
    interp.define_operator("<=", 2, |a, b| Ok(Word::from_bool(a.as_int() <= b.as_int())))?;
    interp.define_operator(">", 2, |a, b| Ok(Word::from_bool(a.as_int() > b.as_int())))?;
    interp.define_operator(">=", 2, |a, b| Ok(Word::from_bool(a.as_int() >= b.as_int())))?;

    interp.define_operator("+", 3, |a, b| Ok(Word::from_int(a.as_int().wrapping_add(b.as_int()))))?;
    interp.define_operator("-", 3, |a, b| Ok(Word::from_int(a.as_int().wrapping_sub(b.as_int()))))?;

    interp.define_operator("*", 4, |a, b| Ok(Word::from_int(a.as_int().wrapping_mul(b.as_int()))))?;
    interp.define_operator("/", 4, |a, b| Ok(Word::from_int(checked_div(a.as_int(), b.as_int()))))?;
    interp.define_operator("%", 4, |a, b| Ok(Word::from_int(checked_rem(a.as_int(), b.as_int()))))?;

    // Bitwise operators sit above multiplicative (the table in §6 leaves
    // their relative precedence to the implementation, "provided ties
    // are consistent"); precedence 6 is left free for host extensions.
    interp.define_operator("&", 5, |a, b| Ok(Word::from_int(a.as_int() & b.as_int())))?;
    interp.define_operator("|", 5, |a, b| Ok(Word::from_int(a.as_int() | b.as_int())))?;
    interp.define_operator("^", 5, |a, b| Ok(Word::from_int(a.as_int() ^ b.as_int())))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_by_zero_yields_zero_not_a_panic() {
        assert_eq!(checked_div(7, 0), 0);
        assert_eq!(checked_rem(7, 0), 0);
    }

    #[test]
    fn division_overflow_edge_case_is_handled() {
        assert_eq!(checked_div(i64::MIN, -1), 0);
    }
}
