//! Symbol table entries: the arena-resident `{name, kind, value}` triples
//! that back every variable, array, operator, and function the interpreter
//! knows about.

use std::rc::Rc;

use crate::error::Result;
use crate::lexer::TokKind;
use crate::string_view::StringView;
use crate::word::Word;

/// A native function the host registered with `DefineCFunction`.
///
/// Boxed as `Rc<dyn Fn>` rather than a bare function pointer: host
/// functions frequently need to close over host-side state (a device
/// handle, a counter), and a trait object is the idiomatic way to accept
/// that in safe Rust without reaching for a C-ABI function-pointer-plus-
/// context-pointer pair.
pub type NativeFn = Rc<dyn Fn(&[Word]) -> Result<Word>>;

/// A binary operator function, installed either at built-in registration
/// time or by the host via `DefineOperator`.
pub type OpFn = Rc<dyn Fn(Word, Word) -> Result<Word>>;

/// Upper bound on expression precedence (see the evaluator's
/// precedence-climbing loop) and the forced-primary sentinel used to parse
/// a unary operator's operand.
pub const MAX_EXPR_LEVEL: i32 = 7;

/// Maximum fixed arity for a `BUILTIN` (native) function.
pub const MAX_BUILTIN_ARGS: usize = 4;

/// Maximum parameter count for a user-defined `func`.
pub const MAX_USRFUNC_ARGS: usize = 4;

/// Words charged against a host's arena budget per symbol-table entry,
/// amortizing the `Symbol` struct's actual Rust layout the same way the
/// original interpreter amortizes `sizeof(Sym)` against its word-sized
/// cells.
pub const SYMBOL_CELL_COST: usize = 4;

/// A user-defined function's re-parseable body.
///
/// Nothing here is an AST: `body` is a view into the original source, and
/// every call re-lexes and re-parses it. This is deliberate (see the
/// design notes on re-parsing vs. caching a tree): caching a tree would
/// cost more arena space than re-parsing a body that, on an embedded host,
/// is a handful of lines.
#[derive(Clone)]
pub struct UserFuncDescriptor {
    pub body: StringView,
    pub args: Vec<StringView>,
}

/// What a `Symbol` denotes and the data specific to that kind.
#[derive(Clone)]
pub enum SymKind {
    /// An ordinary integer variable. With the `float` feature, this is
    /// also how a float-valued variable is tagged: floats share the
    /// `INT` kind and are told apart only by how the host's `Word`
    /// accessor reads the cell (`as_int` vs `as_float`), exactly as the
    /// original's single `INT` tag covers both (see `DESIGN.md`).
    Int,
    /// A reserved word, seeded at init; carries the token it lexes to.
    Reserved(TokKind),
    /// A binary (or, via the unary-operator rule, unary) operator.
    ///
    /// The original distinguishes a seeded `OPERATOR` tag from a
    /// host-registered `BINOP` tag, but both are driven through the exact
    /// same precedence-climbing call site, so this crate represents them
    /// as one variant (see `DESIGN.md`).
    Operator { precedence: i32, func: OpFn },
    /// A function parameter; `value` on the `Symbol` is unused, the slot
    /// is instead this fixed offset from the current call frame's base on
    /// the evaluation stack.
    Arg(usize),
    /// A dynamically sized array. `ptr` is the arena cell index of the
    /// length cell; elements follow at `ptr + 1 ..= ptr + len`.
    #[cfg(feature = "array")]
    Array { ptr: usize },
    /// A native host function of fixed arity.
    Builtin { nargs: usize, func: NativeFn },
    /// A user-defined function.
    UserFunc(Rc<UserFuncDescriptor>),
}

impl std::fmt::Debug for SymKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymKind::Int => write!(f, "Int"),
            SymKind::Reserved(tok) => write!(f, "Reserved({tok:?})"),
            SymKind::Operator { precedence, .. } => write!(f, "Operator(prec={precedence})"),
            SymKind::Arg(off) => write!(f, "Arg({off})"),
            #[cfg(feature = "array")]
            SymKind::Array { ptr } => write!(f, "Array(ptr={ptr})"),
            SymKind::Builtin { nargs, .. } => write!(f, "Builtin(nargs={nargs})"),
            SymKind::UserFunc(_) => write!(f, "UserFunc"),
        }
    }
}

/// A single symbol-table entry, resident in the arena.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: StringView,
    pub kind: SymKind,
    pub value: Word,
}

impl Symbol {
    pub fn new(name: StringView, kind: SymKind, value: Word) -> Self {
        Symbol { name, kind, value }
    }
}
