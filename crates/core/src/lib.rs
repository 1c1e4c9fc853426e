//! Mote Core: language-agnostic primitives for a tiny embeddable scripting
//! interpreter.
//!
//! This crate has no opinion about control flow, function calls, or the
//! host bridge (that lives in `mote-runtime`). What it provides is the
//! substrate everything else is built from:
//!
//! - `word`: the tagged machine-word value cell (`Word`).
//! - `string_view`: reference-counted, zero-copy views into source text.
//! - `symbol`: symbol-table entry kinds (`Symbol`, `SymKind`) and the
//!   function-pointer types a host registers.
//! - `arena`: bump allocation with scope truncation via a `Mark`.
//! - `lexer`: a streaming, symbol-table-aware tokenizer.
//! - `error`: the `ErrorCode`/`Error` boundary shared by every fallible
//!   operation in this workspace.
//!
//! Nothing here allocates on a "real" heap beyond what `Arena` itself
//! owns; there is no garbage collector and no reference cycle detection,
//! matching the language's non-goals.

pub mod arena;
pub mod error;
pub mod lexer;
pub mod string_view;
pub mod symbol;
pub mod word;

pub use arena::{Arena, Mark};
pub use error::{Error, ErrorCode, Result};
pub use lexer::{Lexer, RESERVED_WORDS, TokKind};
pub use string_view::StringView;
pub use symbol::{
    MAX_BUILTIN_ARGS, MAX_EXPR_LEVEL, MAX_USRFUNC_ARGS, NativeFn, OpFn, SYMBOL_CELL_COST, SymKind,
    Symbol, UserFuncDescriptor,
};
pub use word::Word;
