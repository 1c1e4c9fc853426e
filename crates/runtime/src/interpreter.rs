//! The host bridge: the single `struct` a host embeds, owning the arena,
//! the evaluation stack, and the optional cooperative-cancellation hook.
//!
//! Every fallible host-facing method returns the crate's richer
//! [`Error`]; `run`/`eval` are the one place that collapses it to the
//! bare `ErrorCode` a host actually wants (§6/§7's "one error code per
//! call" contract).

use std::rc::Rc;

use mote_core::{
    Arena, ErrorCode, Lexer, NativeFn, OpFn, Result, StringView, SymKind, Word,
};
use tracing::debug;

use crate::builtins::{install_operators, install_reserved_words};
use crate::ctx::Ctx;
use crate::stmt::exec_top_level;

/// An embeddable interpreter instance.
///
/// Per §5, this is a policy singleton, not a language-enforced one: a
/// host is free to construct several independent `Interpreter`s (tests
/// do exactly this), but a single instance is not safe to drive from two
/// threads, or re-enter except through [`Interpreter::call`].
pub struct Interpreter {
    arena: Arena,
    stack: Vec<Word>,
    stop: Option<Box<dyn Fn() -> bool>>,
}

impl Interpreter {
    /// Attaches a fresh arena of `capacity_words`, installs the reserved
    /// words and the built-in operator table. Corresponds to the
    /// original bridge's `Init`; there is no separate "attach an
    /// existing buffer" step since the arena is heap-backed here rather
    /// than a host-supplied static array (§10.4).
    pub fn new(capacity_words: usize) -> Result<Self> {
        let mut interp = Interpreter {
            arena: Arena::new(capacity_words),
            stack: Vec::new(),
            stop: None,
        };
        install_reserved_words(&mut interp)?;
        install_operators(&mut interp)?;
        Ok(interp)
    }

    pub(crate) fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Installs (or replaces) the cooperative-cancellation predicate
    /// consulted before every statement.
    pub fn set_stop(&mut self, stop: impl Fn() -> bool + 'static) {
        self.stop = Some(Box::new(stop));
    }

    pub fn clear_stop(&mut self) {
        self.stop = None;
    }

    fn ctx(&mut self) -> Ctx<'_> {
        Ctx {
            arena: &mut self.arena,
            stack: &mut self.stack,
            stop: self.stop.as_deref(),
        }
    }

    /// `Define(name, INT, value)`: inserts a new integer symbol at the
    /// current (top-level) scope.
    pub fn define(&mut self, name: &str, value: i64) -> Result<()> {
        debug!(name, value, "interpreter: define");
        self.arena
            .define(StringView::whole(Rc::from(name)), SymKind::Int, Word::from_int(value))
    }

    /// `DefineCFunction(name, nargs, fn)`. `nargs` must be `0..=4`.
    pub fn define_c_function(&mut self, name: &str, nargs: usize, func: NativeFn) -> Result<()> {
        if nargs > mote_core::MAX_BUILTIN_ARGS {
            return Err(ErrorCode::TooManyArgs.into());
        }
        debug!(name, nargs, "interpreter: define_c_function");
        self.arena.define(
            StringView::whole(Rc::from(name)),
            SymKind::Builtin { nargs, func },
            Word::ZERO,
        )
    }

    /// `DefineOperator(name, prec, fn)`. `prec` must be below
    /// `MAX_EXPR_LEVEL`. Registering through this same path is how the
    /// built-in table is seeded too (§10.6): a host operator is
    /// indistinguishable from a built-in one once installed.
    pub fn define_operator(
        &mut self,
        name: &str,
        precedence: i32,
        func: impl Fn(Word, Word) -> Result<Word> + 'static,
    ) -> Result<()> {
        if precedence >= mote_core::MAX_EXPR_LEVEL {
            return Err(ErrorCode::BadArgs.into());
        }
        debug!(name, precedence, "interpreter: define_operator");
        let func: OpFn = Rc::new(func);
        self.arena.define(
            StringView::whole(Rc::from(name)),
            SymKind::Operator { precedence, func },
            Word::ZERO,
        )
    }

    /// `Run(src, copy=false, topLevel=true)`: interprets an already
    /// shared buffer at zero additional copy cost. The caller keeps
    /// `src` alive; views the script creates may reference it directly
    /// (§10.8).
    pub fn run(&mut self, src: Rc<str>) -> Result<Word> {
        self.run_inner(src, true)
    }

    /// `Eval(src, copy=true, topLevel=true)`: the bridge copies a
    /// transient buffer into storage it owns before interpreting it, so
    /// the source outlives any view the script takes of it.
    pub fn eval(&mut self, src: &str) -> Result<Word> {
        self.run_inner(Rc::from(src), true)
    }

    /// `RunCallback(src, copy=false, topLevel=false)` (§4.F, §5): the
    /// callback-style counterpart to `run`. A host function already
    /// running (invoked from a script the interpreter is mid-call on)
    /// uses this to run more source without the frame reset `run`/`eval`
    /// do: the evaluation stack is left exactly as it is instead of being
    /// cleared, so the new source executes against the in-flight call's
    /// frame rather than assuming a fresh one at offset 0.
    pub fn run_callback(&mut self, src: Rc<str>) -> Result<Word> {
        self.run_inner(src, false)
    }

    /// `EvalCallback(src, copy=true, topLevel=false)`: `run_callback`
    /// over a transient buffer the bridge copies first.
    pub fn eval_callback(&mut self, src: &str) -> Result<Word> {
        self.run_inner(Rc::from(src), false)
    }

    fn run_inner(&mut self, src: Rc<str>, top_level: bool) -> Result<Word> {
        let mark = self.arena.mark();
        if top_level {
            self.stack.clear();
        }
        let frame_base = self.stack.len();
        let result = {
            let mut ctx = self.ctx();
            match Lexer::new(src, ctx.arena) {
                Ok(mut lex) => exec_top_level(&mut lex, &mut ctx, frame_base),
                Err(e) => Err(e),
            }
        };
        self.arena.truncate(mark);
        if let Err(e) = &result {
            debug!(code = ?e.code(), "interpreter: run/eval failed");
        }
        result
    }

    /// The callback-style call surface (§5): looks up `name` and invokes
    /// it with `args`, exactly as the evaluator would for a call
    /// expression, but driven by the host instead of parsed from source.
    /// Does not touch any existing evaluation-stack frames beyond the
    /// one it pushes for the call itself.
    ///
    /// Symbols a script declares at top level do not outlive the
    /// `run`/`eval` call that declared them (invariant 1, §8), so this
    /// is effective for symbols the host itself installed with
    /// `define_c_function`/`define_operator` before any script ran. A
    /// host function that needs to call back into a function the
    /// *current* script just defined (the re-entrant case §5
    /// describes) closes over `Rc<RefCell<Interpreter>>` and calls
    /// `borrow_mut().call(...)` from within its own body; `NativeFn`'s
    /// signature carries no such handle implicitly, matching the
    /// original C function pointer's bare `(Val *args) -> Val`.
    pub fn call(&mut self, name: &str, args: &[Word]) -> Result<Word> {
        let sym = self.arena.lookup(name).ok_or(ErrorCode::UnknownSym)?;
        let kind = sym.kind.clone();
        match kind {
            SymKind::Builtin { nargs, func } => {
                if args.len() > nargs {
                    return Err(ErrorCode::BadArgs.into());
                }
                let mut padded = [Word::ZERO; mote_core::MAX_BUILTIN_ARGS];
                padded[..args.len()].copy_from_slice(args);
                func(&padded[..nargs])
            }
            SymKind::UserFunc(desc) => {
                if args.len() != desc.args.len() {
                    return Err(ErrorCode::BadArgs.into());
                }
                let new_base = self.stack.len();
                self.stack.extend_from_slice(args);
                let mark = self.arena.mark();
                for (i, pname) in desc.args.iter().enumerate() {
                    self.arena.define(pname.clone(), SymKind::Arg(i), Word::ZERO)?;
                }
                let body_src = desc.body.source().clone();
                let body_end = desc.body.end();
                let result = {
                    let mut ctx = self.ctx();
                    match Lexer::at(body_src, desc.body.start(), ctx.arena) {
                        Ok(mut body_lex) => {
                            crate::stmt::exec_func_body(&mut body_lex, &mut ctx, new_base, body_end)
                        }
                        Err(e) => Err(e),
                    }
                };
                self.arena.truncate(mark);
                self.stack.truncate(new_base);
                result
            }
            _ => Err(ErrorCode::Syntax.into()),
        }
    }

    /// `Set(name, INT, value)`.
    pub fn set(&mut self, name: &str, value: Word) -> Result<()> {
        self.arena.set_value(name, value)
    }

    /// `Get(name, INT, out)`.
    pub fn get(&self, name: &str) -> Result<Word> {
        self.arena
            .lookup(name)
            .map(|s| s.value)
            .ok_or_else(|| ErrorCode::UnknownSym.into())
    }

    /// `SetFloat(name, value)`: bit-reinterprets `value` into the same
    /// `Word` cell an `INT` symbol carries, creating the symbol if it
    /// doesn't already exist (mirroring `TinyScript_SetFloat`'s
    /// define-on-`Set`-failure fallback). There is no separate float
    /// `SymKind`: a float-valued variable is still tagged `INT` and
    /// distinguished only by which accessor the host reads it with.
    #[cfg(feature = "float")]
    pub fn set_float(&mut self, name: &str, value: f32) -> Result<()> {
        let word = Word::from_float(value);
        if self.arena.set_value(name, word).is_ok() {
            return Ok(());
        }
        self.define(name, 0)?;
        self.arena.set_value(name, word)
    }

    /// `GetFloat(name, out)`.
    #[cfg(feature = "float")]
    pub fn get_float(&self, name: &str) -> Result<f32> {
        self.get(name).map(Word::as_float)
    }

    /// Defines a new array of `values.len()` cells, seeded from `values`.
    #[cfg(feature = "array")]
    pub fn define_array(&mut self, name: &str, values: &[Word]) -> Result<()> {
        let n = values.len();
        let ptr = self.arena.reserve_cells(n + 1)?;
        self.arena
            .set_cell(ptr, Word::from_int(n as i64))
            .ok_or(ErrorCode::NoMem)?;
        for (i, v) in values.iter().enumerate() {
            self.arena.set_cell(ptr + 1 + i, *v);
        }
        self.arena
            .define(StringView::whole(Rc::from(name)), SymKind::Array { ptr }, Word::ZERO)
    }

    /// `Get(name, ARRAY, out)`: returns the declared length and a copy
    /// of the element cells.
    #[cfg(feature = "array")]
    pub fn get_array(&self, name: &str) -> Result<Vec<Word>> {
        let sym = self.arena.lookup(name).ok_or(ErrorCode::UnknownSym)?;
        let SymKind::Array { ptr } = sym.kind else {
            return Err(ErrorCode::BadArgs.into());
        };
        let len = self.arena.cell(ptr).ok_or(ErrorCode::OutOfBounds)?.as_int();
        if len < 0 {
            return Err(ErrorCode::OutOfBounds.into());
        }
        (0..len as usize)
            .map(|i| self.arena.cell(ptr + 1 + i).ok_or_else(|| ErrorCode::OutOfBounds.into()))
            .collect()
    }

    /// `CheckArray(p)`.
    #[cfg(feature = "array")]
    pub fn check_array(&self, ptr: usize) -> bool {
        self.arena.check_array(ptr)
    }

    pub fn arena_used_words(&self) -> usize {
        self.arena.used_words()
    }

    pub fn arena_capacity_words(&self) -> usize {
        self.arena.capacity_words()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_and_variables() {
        let mut interp = Interpreter::new(4096).unwrap();
        let result = interp.eval("var x = 3\nvar y = 4\nreturn x*x + y*y").unwrap();
        assert_eq!(result, Word::from_int(25));
    }

    #[test]
    fn user_function_call() {
        let mut interp = Interpreter::new(4096).unwrap();
        let result = interp
            .eval("func f(a,b){ return a+b }\nreturn f(10,32)")
            .unwrap();
        assert_eq!(result, Word::from_int(42));
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut interp = Interpreter::new(4096).unwrap();
        interp.define("x", 0).unwrap();
        interp.set("x", Word::from_int(7)).unwrap();
        assert_eq!(interp.get("x").unwrap(), Word::from_int(7));
    }

    #[test]
    fn get_unknown_symbol_errors() {
        let interp = Interpreter::new(4096).unwrap();
        assert_eq!(interp.get("nope").unwrap_err().code(), ErrorCode::UnknownSym);
    }

    #[test]
    fn run_restores_arena_top_on_completion() {
        let mut interp = Interpreter::new(4096).unwrap();
        let before = interp.arena_used_words();
        interp.eval("var x = 1\nvar y = 2\nreturn x+y").unwrap();
        assert_eq!(interp.arena_used_words(), before);
    }

    #[test]
    fn stop_predicate_aborts_execution() {
        let mut interp = Interpreter::new(4096).unwrap();
        interp.set_stop(|| true);
        let err = interp.eval("var i = 0\nwhile (1) { i = i + 1 }").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Stopped);
    }

    #[test]
    fn host_defined_function_callable_from_script() {
        let mut interp = Interpreter::new(4096).unwrap();
        let dsqr: NativeFn = Rc::new(|args: &[Word]| {
            let x = args[0].as_int();
            let y = args[1].as_int();
            Ok(Word::from_int(x * x + y * y))
        });
        interp.define_c_function("dsqr", 2, dsqr).unwrap();
        let result = interp.eval("return dsqr(3,4)").unwrap();
        assert_eq!(result, Word::from_int(25));
    }

    #[test]
    fn host_defined_operator_extends_grammar() {
        let mut interp = Interpreter::new(4096).unwrap();
        interp
            .define_operator("@", 3, |a, b| Ok(Word::from_int(a.as_int().abs() + b.as_int().abs())))
            .unwrap();
        let result = interp.eval("return 2 @ 3").unwrap();
        assert_eq!(result, Word::from_int(5));
    }

    #[test]
    fn call_invokes_a_host_registered_function_directly() {
        let mut interp = Interpreter::new(4096).unwrap();
        let dsqr: NativeFn = Rc::new(|args: &[Word]| {
            Ok(Word::from_int(args[0].as_int() * args[0].as_int() + args[1].as_int() * args[1].as_int()))
        });
        interp.define_c_function("dsqr", 2, dsqr).unwrap();
        assert_eq!(
            interp.call("dsqr", &[Word::from_int(3), Word::from_int(4)]).unwrap(),
            Word::from_int(25)
        );
    }

    #[test]
    fn top_level_script_functions_do_not_survive_past_their_run() {
        let mut interp = Interpreter::new(4096).unwrap();
        interp.eval("func double(n) { return n*2 }").unwrap();
        assert_eq!(
            interp.call("double", &[Word::from_int(21)]).unwrap_err().code(),
            ErrorCode::UnknownSym
        );
    }

    #[test]
    fn run_callback_does_not_clear_an_in_flight_evaluation_stack() {
        let mut interp = Interpreter::new(4096).unwrap();
        interp.stack.extend_from_slice(&[Word::from_int(11), Word::from_int(22)]);
        interp.eval_callback("return 1").unwrap();
        assert_eq!(interp.stack, vec![Word::from_int(11), Word::from_int(22)]);
    }

    #[test]
    fn run_still_clears_the_stack_for_a_fresh_top_level_call() {
        let mut interp = Interpreter::new(4096).unwrap();
        interp.stack.extend_from_slice(&[Word::from_int(11), Word::from_int(22)]);
        interp.eval("return 1").unwrap();
        assert!(interp.stack.is_empty());
    }
}
