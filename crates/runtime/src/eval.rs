//! The expression evaluator: a precedence-climbing parser that evaluates
//! as it parses, producing one `Word` per (sub)expression with no
//! intermediate tree.

use mote_core::{ErrorCode, Lexer, MAX_BUILTIN_ARGS, MAX_EXPR_LEVEL, Result, SymKind, TokKind, Word};

use crate::ctx::Ctx;
#[cfg(feature = "array")]
use crate::stmt::array_get;
use crate::stmt::exec_func_body;

fn expect(lex: &Lexer, kind: TokKind) -> Result<()> {
    if lex.peek() == kind {
        Ok(())
    } else {
        Err(ErrorCode::Syntax.into())
    }
}

/// `parseExpr(minPrec)`: parse a primary, then repeatedly consume
/// operators of precedence `>= min_prec`, recursing with `prec + 1` so
/// same-precedence chains associate left.
pub(crate) fn eval_expr(
    lex: &mut Lexer,
    ctx: &mut Ctx,
    min_prec: i32,
    frame_base: usize,
) -> Result<Word> {
    let mut left = eval_primary(lex, ctx, frame_base)?;
    loop {
        if lex.peek() != TokKind::Operator {
            break;
        }
        let name = lex.token_string();
        let sym = ctx
            .arena
            .lookup(name.as_str())
            .ok_or(ErrorCode::UnknownSym)?;
        let SymKind::Operator { precedence, func } = sym.kind.clone() else {
            return Err(ErrorCode::Syntax.into());
        };
        if precedence < min_prec {
            break;
        }
        lex.advance(ctx.arena)?;
        let right = eval_expr(lex, ctx, precedence + 1, frame_base)?;
        left = func(left, right)?;
    }
    Ok(left)
}

fn eval_primary(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Word> {
    match lex.peek() {
        TokKind::Number => {
            let v = lex.token_value();
            lex.advance(ctx.arena)?;
            Ok(v)
        }
        TokKind::LParen => {
            lex.advance(ctx.arena)?;
            let v = eval_expr(lex, ctx, 0, frame_base)?;
            expect(lex, TokKind::RParen)?;
            lex.advance(ctx.arena)?;
            Ok(v)
        }
        TokKind::Symbol => eval_symbol(lex, ctx, frame_base),
        TokKind::Operator => {
            // The unary-operator rule: any registered operator applied
            // prefix is `f(0, parseExpr(MAX_EXPR_LEVEL))`, the standard
            // behaviour of `-` and `!` as unary prefixes.
            let name = lex.token_string();
            let sym = ctx
                .arena
                .lookup(name.as_str())
                .ok_or(ErrorCode::UnknownSym)?;
            let SymKind::Operator { func, .. } = sym.kind.clone() else {
                return Err(ErrorCode::Syntax.into());
            };
            lex.advance(ctx.arena)?;
            let right = eval_expr(lex, ctx, MAX_EXPR_LEVEL, frame_base)?;
            func(Word::ZERO, right)
        }
        _ => Err(ErrorCode::Syntax.into()),
    }
}

fn eval_symbol(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Word> {
    let name = lex.token_string();
    let sym = ctx
        .arena
        .lookup(name.as_str())
        .ok_or(ErrorCode::UnknownSym)?;
    let kind = sym.kind.clone();
    let value = sym.value;
    match kind {
        SymKind::Int => {
            lex.advance(ctx.arena)?;
            Ok(value)
        }
        SymKind::Arg(offset) => {
            lex.advance(ctx.arena)?;
            ctx.stack_slot(frame_base, offset)
                .ok_or_else(|| ErrorCode::BadArgs.into())
        }
        #[cfg(feature = "array")]
        SymKind::Array { ptr } => {
            lex.advance(ctx.arena)?;
            if lex.peek() == TokKind::LParen {
                lex.advance(ctx.arena)?;
                let index = eval_expr(lex, ctx, 0, frame_base)?;
                expect(lex, TokKind::RParen)?;
                lex.advance(ctx.arena)?;
                array_get(ctx, ptr, index)
            } else {
                Ok(Word::from_ptr_index(ptr))
            }
        }
        SymKind::Builtin { nargs, func } => {
            lex.advance(ctx.arena)?;
            let args = parse_call_args(lex, ctx, frame_base)?;
            if args.len() > nargs {
                return Err(ErrorCode::BadArgs.into());
            }
            let mut padded = [Word::ZERO; MAX_BUILTIN_ARGS];
            padded[..args.len()].copy_from_slice(&args);
            func(&padded[..nargs])
        }
        SymKind::UserFunc(desc) => {
            lex.advance(ctx.arena)?;
            let args = parse_call_args(lex, ctx, frame_base)?;
            if args.len() != desc.args.len() {
                return Err(ErrorCode::BadArgs.into());
            }
            let new_base = ctx.stack.len();
            ctx.stack.extend_from_slice(&args);
            let mark = ctx.arena.mark();
            for (i, pname) in desc.args.iter().enumerate() {
                ctx.arena.define(pname.clone(), SymKind::Arg(i), Word::ZERO)?;
            }
            let body_src = desc.body.source().clone();
            let body_end = desc.body.end();
            let result = match Lexer::at(body_src, desc.body.start(), ctx.arena) {
                Ok(mut body_lex) => exec_func_body(&mut body_lex, ctx, new_base, body_end),
                Err(e) => Err(e),
            };
            ctx.arena.truncate(mark);
            ctx.stack.truncate(new_base);
            result
        }
        SymKind::Reserved(_) | SymKind::Operator { .. } => Err(ErrorCode::Syntax.into()),
    }
}

/// `( a₁, …, aₙ )`, already positioned just past the callee name. Every
/// argument is fully evaluated left-to-right before the call dispatches,
/// matching the call contract in §4.D.
fn parse_call_args(lex: &mut Lexer, ctx: &mut Ctx, frame_base: usize) -> Result<Vec<Word>> {
    expect(lex, TokKind::LParen)?;
    lex.advance(ctx.arena)?;
    let mut args = Vec::new();
    if lex.peek() != TokKind::RParen {
        loop {
            if args.len() >= MAX_BUILTIN_ARGS {
                return Err(ErrorCode::BadArgs.into());
            }
            args.push(eval_expr(lex, ctx, 0, frame_base)?);
            if lex.peek() == TokKind::Comma {
                lex.advance(ctx.arena)?;
                continue;
            }
            break;
        }
    }
    expect(lex, TokKind::RParen)?;
    lex.advance(ctx.arena)?;
    Ok(args)
}
