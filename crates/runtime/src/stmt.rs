//! Recursive-descent statement interpreter: control flow, declarations,
//! assignment, and the block parsing both execution and function-body
//! capture share.
//!
//! Every construct that introduces a `{ … }` block (`if`, `while`, `func`)
//! consumes its own braces recursively, so the block-execution loop below
//! never needs to track nesting depth itself: any `{` it could see would
//! mean malformed source, not a nested block it must skip over.

use std::rc::Rc;

use mote_core::{
    ErrorCode, Lexer, MAX_USRFUNC_ARGS, Result, StringView, SymKind, TokKind, UserFuncDescriptor,
    Word,
};

use crate::ctx::Ctx;
use crate::eval::eval_expr;

/// What a statement (or block) did, other than fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Ran to completion; keep reading statements.
    Next,
    /// A `return` unwound this block. Carries the value for the enclosing
    /// call (or the script result, at top level).
    Return(Word),
}

fn expect(lex: &Lexer, kind: TokKind) -> Result<()> {
    if lex.peek() == kind {
        Ok(())
    } else {
        Err(ErrorCode::Syntax.into())
    }
}

fn check_stop(ctx: &Ctx) -> Result<()> {
    if let Some(stop) = ctx.stop {
        if stop() {
            return Err(ErrorCode::Stopped.into());
        }
    }
    Ok(())
}

fn skip_newlines(lex: &mut Lexer, ctx: &Ctx) -> Result<()> {
    while lex.peek() == TokKind::Newline {
        lex.advance(ctx.arena)?;
    }
    Ok(())
}

/// Balances a `{ … }` already positioned at the opening brace, consuming
/// tokens without interpreting them. Used to skip an untaken `if`/`else`
/// branch and an unentered `while` body.
fn skip_block(lex: &mut Lexer, ctx: &Ctx) -> Result<()> {
    expect(lex, TokKind::LBrace)?;
    lex.advance(ctx.arena)?;
    let mut depth = 1i32;
    loop {
        match lex.peek() {
            TokKind::LBrace => depth += 1,
            TokKind::RBrace => {
                depth -= 1;
                if depth == 0 {
                    lex.advance(ctx.arena)?;
                    return Ok(());
                }
            }
            TokKind::Eof => return Err(ErrorCode::Syntax.into()),
            _ => {}
        }
        lex.advance(ctx.arena)?;
    }
}

/// Consumes a `{ … }` already positioned at the opening brace and returns
/// a view over the source between the brace and its match, without
/// executing anything. This is how `func` captures a re-parseable body
/// (see the design notes on re-parsing vs. an AST).
fn parse_block_body(lex: &mut Lexer, ctx: &Ctx) -> Result<StringView> {
    expect(lex, TokKind::LBrace)?;
    lex.advance(ctx.arena)?;
    let src = lex.source().clone();
    let body_start = lex.position();
    let mut depth = 1i32;
    loop {
        match lex.peek() {
            TokKind::LBrace => depth += 1,
            TokKind::RBrace => {
                depth -= 1;
                if depth == 0 {
                    let body_end = lex.token_start();
                    lex.advance(ctx.arena)?;
                    return Ok(StringView::new(src, body_start, body_end));
                }
            }
            TokKind::Eof => return Err(ErrorCode::Syntax.into()),
            _ => {}
        }
        lex.advance(ctx.arena)?;
    }
}

/// Executes a `{ … }` already positioned at the opening brace, introducing
/// a scope truncated on exit.
fn exec_block(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Flow> {
    expect(lex, TokKind::LBrace)?;
    lex.advance(ctx.arena)?;
    let mark = ctx.arena.mark();
    loop {
        skip_newlines(lex, ctx)?;
        match lex.peek() {
            TokKind::RBrace => {
                lex.advance(ctx.arena)?;
                ctx.arena.truncate(mark);
                return Ok(Flow::Next);
            }
            TokKind::Eof => {
                ctx.arena.truncate(mark);
                return Err(ErrorCode::Syntax.into());
            }
            _ => {}
        }
        match exec_stmt(lex, ctx, frame_base)? {
            Flow::Next => continue,
            other => {
                ctx.arena.truncate(mark);
                return Ok(other);
            }
        }
    }
}

/// Runs statements from `lex` (already positioned at a user function's
/// body, a fresh `Lexer` over the same source the body was sliced from)
/// until either a `return` fires or the cursor reaches `body_end`, the
/// byte offset `parse_block_body` recorded for the body's matching `}`.
///
/// The body is re-parsed directly against the original source text rather
/// than a copy: `body_end` stands in for the synthetic end-of-input a
/// bounded sub-lexer would otherwise need, since `Lexer` itself has no
/// notion of a slice boundary within its shared buffer.
pub(crate) fn exec_func_body(
    lex: &mut Lexer,
    ctx: &mut Ctx,
    frame_base: usize,
    body_end: usize,
) -> Result<Word> {
    loop {
        skip_newlines(lex, ctx)?;
        if lex.position() >= body_end || lex.peek() == TokKind::Eof {
            return Ok(Word::ZERO);
        }
        check_stop(ctx)?;
        match exec_stmt(lex, ctx, frame_base)? {
            Flow::Next => continue,
            Flow::Return(v) => return Ok(v),
        }
    }
}

/// Runs statements from `lex` until EOF or a `return`. Used for the
/// top-level script and is how `run`/`eval` get their result.
///
/// `frame_base` is 0 for an ordinary top-level `run`/`eval`, where there
/// is no enclosing call. A callback-style run (`topLevel=false` in §4.F)
/// passes the evaluation stack's current length instead, so a symbol
/// resolution inside the callback's source still lands on the in-flight
/// call's frame rather than assuming one starting at offset 0.
pub(crate) fn exec_top_level(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Word> {
    loop {
        skip_newlines(lex, ctx)?;
        if lex.peek() == TokKind::Eof {
            return Ok(Word::ZERO);
        }
        check_stop(ctx)?;
        match exec_stmt(lex, ctx, frame_base)? {
            Flow::Next => continue,
            Flow::Return(v) => return Ok(v),
        }
    }
}

fn assign_variable(ctx: &mut Ctx, name: &StringView, val: Word, frame_base: usize) -> Result<()> {
    let existing_arg = match ctx.arena.lookup(name.as_str()) {
        Some(sym) => match sym.kind {
            SymKind::Arg(offset) => Some(offset),
            _ => None,
        },
        None => return ctx.arena.define(name.clone(), SymKind::Int, val),
    };
    match existing_arg {
        Some(offset) => {
            let idx = frame_base + offset;
            match ctx.stack.get_mut(idx) {
                Some(slot) => {
                    *slot = val;
                    Ok(())
                }
                None => Err(ErrorCode::BadArgs.into()),
            }
        }
        None => ctx.arena.set_value(name.as_str(), val),
    }
}

#[cfg(feature = "array")]
fn array_ptr(ctx: &Ctx, name: &str) -> Result<usize> {
    match ctx.arena.lookup(name) {
        Some(sym) => match sym.kind {
            SymKind::Array { ptr } => Ok(ptr),
            _ => Err(ErrorCode::Syntax.into()),
        },
        None => Err(ErrorCode::UnknownSym.into()),
    }
}

#[cfg(feature = "array")]
pub(crate) fn array_get(ctx: &Ctx, ptr: usize, index: Word) -> Result<Word> {
    let i = index.as_int();
    let len = ctx
        .arena
        .cell(ptr)
        .ok_or(ErrorCode::OutOfBounds)?
        .as_int();
    if i < 0 || i >= len {
        return Err(ErrorCode::OutOfBounds.into());
    }
    ctx.arena
        .cell(ptr + 1 + i as usize)
        .ok_or_else(|| ErrorCode::OutOfBounds.into())
}

#[cfg(feature = "array")]
fn array_set(ctx: &mut Ctx, ptr: usize, index: Word, val: Word) -> Result<()> {
    let i = index.as_int();
    let len = ctx
        .arena
        .cell(ptr)
        .ok_or(ErrorCode::OutOfBounds)?
        .as_int();
    if i < 0 || i >= len {
        return Err(ErrorCode::OutOfBounds.into());
    }
    ctx.arena
        .set_cell(ptr + 1 + i as usize, val)
        .ok_or_else(|| ErrorCode::OutOfBounds.into())
}

fn parse_name(lex: &mut Lexer, ctx: &Ctx) -> Result<StringView> {
    expect(lex, TokKind::Symbol)?;
    let name = lex.token_string();
    lex.advance(ctx.arena)?;
    Ok(name)
}

fn exec_var(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Flow> {
    lex.advance(ctx.arena)?;
    let name = parse_name(lex, ctx)?;
    let val = if lex.peek() == TokKind::Assign {
        lex.advance(ctx.arena)?;
        eval_expr(lex, ctx, 0, frame_base)?
    } else {
        Word::ZERO
    };
    ctx.arena.define(name, SymKind::Int, val)?;
    Ok(Flow::Next)
}

#[cfg(feature = "array")]
fn exec_array_decl(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Flow> {
    lex.advance(ctx.arena)?;
    let name = parse_name(lex, ctx)?;
    expect(lex, TokKind::LParen)?;
    lex.advance(ctx.arena)?;
    let size_word = eval_expr(lex, ctx, 0, frame_base)?;
    expect(lex, TokKind::RParen)?;
    lex.advance(ctx.arena)?;
    let size = size_word.as_int();
    if size < 0 {
        return Err(ErrorCode::BadArgs.into());
    }
    let n = size as usize;
    let ptr = ctx.arena.reserve_cells(n + 1)?;
    ctx.arena
        .set_cell(ptr, Word::from_int(size))
        .ok_or(ErrorCode::NoMem)?;

    if lex.peek() == TokKind::Assign {
        lex.advance(ctx.arena)?;
        expect(lex, TokKind::LBrace)?;
        lex.advance(ctx.arena)?;
        let mut i = 0usize;
        if lex.peek() != TokKind::RBrace {
            loop {
                let v = eval_expr(lex, ctx, 0, frame_base)?;
                if i >= n {
                    return Err(ErrorCode::BadArgs.into());
                }
                ctx.arena.set_cell(ptr + 1 + i, v);
                i += 1;
                if lex.peek() == TokKind::Comma {
                    lex.advance(ctx.arena)?;
                    continue;
                }
                break;
            }
        }
        expect(lex, TokKind::RBrace)?;
        lex.advance(ctx.arena)?;
    }

    ctx.arena.define(name, SymKind::Array { ptr }, Word::ZERO)?;
    Ok(Flow::Next)
}

fn exec_func_decl(lex: &mut Lexer, ctx: &mut Ctx) -> Result<Flow> {
    lex.advance(ctx.arena)?;
    let name = parse_name(lex, ctx)?;
    expect(lex, TokKind::LParen)?;
    lex.advance(ctx.arena)?;
    let mut params = Vec::new();
    if lex.peek() != TokKind::RParen {
        loop {
            expect(lex, TokKind::Symbol)?;
            params.push(lex.token_string());
            lex.advance(ctx.arena)?;
            if lex.peek() == TokKind::Comma {
                lex.advance(ctx.arena)?;
                continue;
            }
            break;
        }
    }
    expect(lex, TokKind::RParen)?;
    lex.advance(ctx.arena)?;
    if params.len() > MAX_USRFUNC_ARGS {
        return Err(ErrorCode::TooManyArgs.into());
    }
    let body = parse_block_body(lex, ctx)?;
    let desc = Rc::new(UserFuncDescriptor { body, args: params });
    ctx.arena
        .define(name, SymKind::UserFunc(desc), Word::ZERO)?;
    Ok(Flow::Next)
}

fn exec_if(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Flow> {
    lex.advance(ctx.arena)?;
    expect(lex, TokKind::LParen)?;
    lex.advance(ctx.arena)?;
    let cond = eval_expr(lex, ctx, 0, frame_base)?;
    expect(lex, TokKind::RParen)?;
    lex.advance(ctx.arena)?;

    if cond.as_bool() {
        let outcome = exec_block(lex, ctx, frame_base)?;
        if matches!(outcome, Flow::Return(_)) {
            return Ok(outcome);
        }
        skip_newlines(lex, ctx)?;
        if lex.peek() == TokKind::Else {
            lex.advance(ctx.arena)?;
            skip_newlines(lex, ctx)?;
            skip_block(lex, ctx)?;
        }
        Ok(outcome)
    } else {
        skip_block(lex, ctx)?;
        skip_newlines(lex, ctx)?;
        if lex.peek() == TokKind::Else {
            lex.advance(ctx.arena)?;
            skip_newlines(lex, ctx)?;
            exec_block(lex, ctx, frame_base)
        } else {
            Ok(Flow::Next)
        }
    }
}

fn exec_while(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Flow> {
    lex.advance(ctx.arena)?;
    let cond_pos = lex.token_start();
    loop {
        lex.set_position(cond_pos, ctx.arena)?;
        check_stop(ctx)?;
        expect(lex, TokKind::LParen)?;
        lex.advance(ctx.arena)?;
        let cond = eval_expr(lex, ctx, 0, frame_base)?;
        expect(lex, TokKind::RParen)?;
        lex.advance(ctx.arena)?;
        if !cond.as_bool() {
            skip_block(lex, ctx)?;
            return Ok(Flow::Next);
        }
        match exec_block(lex, ctx, frame_base)? {
            Flow::Next => continue,
            other => return Ok(other),
        }
    }
}

fn exec_return(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Flow> {
    lex.advance(ctx.arena)?;
    let val = match lex.peek() {
        TokKind::Newline | TokKind::RBrace | TokKind::Eof => Word::ZERO,
        _ => eval_expr(lex, ctx, 0, frame_base)?,
    };
    Ok(Flow::Return(val))
}

/// `NAME = expr`, `NAME(index) = expr`, or a bare expression statement
/// (including a call made purely for its side effects).
fn exec_name_led(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Flow> {
    let checkpoint = lex.clone();
    let name = lex.token_string();
    lex.advance(ctx.arena)?;

    #[cfg(feature = "array")]
    {
        let is_array = matches!(
            ctx.arena.lookup(name.as_str()).map(|s| &s.kind),
            Some(SymKind::Array { .. })
        );
        if is_array && lex.peek() == TokKind::LParen {
            lex.advance(ctx.arena)?;
            let index = eval_expr(lex, ctx, 0, frame_base)?;
            expect(lex, TokKind::RParen)?;
            lex.advance(ctx.arena)?;
            let ptr = array_ptr(ctx, name.as_str())?;
            if lex.peek() == TokKind::Assign {
                lex.advance(ctx.arena)?;
                let val = eval_expr(lex, ctx, 0, frame_base)?;
                array_set(ctx, ptr, index, val)?;
            } else {
                array_get(ctx, ptr, index)?;
            }
            return Ok(Flow::Next);
        }
    }

    if lex.peek() == TokKind::Assign {
        lex.advance(ctx.arena)?;
        let val = eval_expr(lex, ctx, 0, frame_base)?;
        assign_variable(ctx, &name, val, frame_base)?;
        return Ok(Flow::Next);
    }

    *lex = checkpoint;
    eval_expr(lex, ctx, 0, frame_base)?;
    Ok(Flow::Next)
}

pub(crate) fn exec_stmt(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Flow> {
    check_stop(ctx)?;
    match lex.peek() {
        TokKind::Var => exec_var(lex, ctx, frame_base),
        #[cfg(feature = "array")]
        TokKind::ArrayKw => exec_array_decl(lex, ctx, frame_base),
        TokKind::Func => exec_func_decl(lex, ctx),
        TokKind::If => exec_if(lex, ctx, frame_base),
        TokKind::While => exec_while(lex, ctx, frame_base),
        TokKind::Return => exec_return(lex, ctx, frame_base),
        TokKind::Symbol => exec_name_led(lex, ctx, frame_base),
        TokKind::Eof | TokKind::RBrace | TokKind::Else => Err(ErrorCode::Syntax.into()),
        _ => {
            eval_expr(lex, ctx, 0, frame_base)?;
            Ok(Flow::Next)
        }
    }
}
