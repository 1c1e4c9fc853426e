//! The bundle of mutable state threaded through the evaluator and statement
//! interpreter: the arena, the evaluation stack, and the host's optional
//! cooperative-cancellation predicate.
//!
//! Bundled into one struct rather than passed as three separate `&mut`
//! parameters so every recursive-descent function signature stays readable
//! (`eval_expr(lex, ctx, min_prec, frame_base)` instead of four unrelated
//! borrows threaded independently).

use mote_core::{Arena, Word};

/// Evaluation-stack-relative state for the call currently executing.
///
/// A fresh `Ctx` borrow is constructed per top-level `run`/`eval`/`call`;
/// it does not outlive that single host-bridge entry point.
pub(crate) struct Ctx<'a> {
    pub arena: &'a mut Arena,
    pub stack: &'a mut Vec<Word>,
    pub stop: Option<&'a (dyn Fn() -> bool + 'a)>,
}

impl Ctx<'_> {
    /// Evaluation-stack index of the current call frame's first argument
    /// slot is *not* stored here. It is `frame_base`, threaded as an
    /// explicit parameter alongside `Ctx` because it changes on every
    /// nested call while the arena/stack/stop triple does not.
    pub(crate) fn stack_slot(&self, frame_base: usize, offset: usize) -> Option<Word> {
        self.stack.get(frame_base + offset).copied()
    }
}
