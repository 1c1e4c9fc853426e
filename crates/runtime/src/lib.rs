//! Mote Runtime: the live interpreter built on `mote-core`'s primitives.
//!
//! This crate supplies everything `mote-core` deliberately leaves out:
//! the precedence-climbing expression evaluator, the recursive-descent
//! statement interpreter, the built-in operator table, and the host
//! bridge ([`Interpreter`]) a host actually embeds.
//!
//! ```
//! use mote_runtime::Interpreter;
//!
//! let mut interp = Interpreter::new(4096).unwrap();
//! let result = interp.eval("var x = 3\nvar y = 4\nreturn x*x + y*y").unwrap();
//! assert_eq!(result.as_int(), 25);
//! ```

mod builtins;
mod ctx;
mod eval;
mod interpreter;
mod stmt;

pub use interpreter::Interpreter;
pub use mote_core::{Error, ErrorCode, NativeFn, OpFn, Result, Word};
