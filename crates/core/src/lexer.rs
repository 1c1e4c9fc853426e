//! A streaming lexer: no token buffering, no lookahead beyond one token at
//! a time. Identifier and operator classification consult the arena's
//! symbol table directly, so a host-registered operator or reserved word
//! is recognized by exactly the same path a built-in one is.

use std::rc::Rc;

use tracing::trace;

use crate::arena::Arena;
use crate::error::{ErrorCode, Result};
use crate::string_view::StringView;
use crate::word::Word;

/// Bytes already claimed by a structural token `scan` dispatches on
/// directly, before falling through to operator scanning: parens, braces,
/// comma, the string-literal quote, and the comment marker. Everything
/// else in ASCII punctuation is fair game for an operator spelling, so a
/// host's `DefineOperator("@", ...)` is recognized the same way `+` is.
fn is_operator_byte(b: u8) -> bool {
    b.is_ascii_punctuation()
        && !matches!(b, b'(' | b')' | b'{' | b'}' | b',' | b';' | b'"' | b'#')
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// What kind of token is currently under the lexer's cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    Eof,
    /// Newline or `;`: both terminate a statement.
    Newline,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    /// Plain `=`, i.e. assignment, distinguished from `==` by the
    /// longest-match scan finding no two-character operator match.
    Assign,
    Symbol,
    Number,
    Str,
    /// Any operator resolved via the symbol table, built-in or
    /// host-defined.
    Operator,
    If,
    Else,
    While,
    Func,
    Var,
    Return,
    ArrayKw,
}

/// The reserved words seeded into every interpreter's symbol table at
/// init. `array` is only meaningful with the `array` feature enabled; the
/// bridge decides whether to register it.
pub const RESERVED_WORDS: &[(&str, TokKind)] = &[
    ("if", TokKind::If),
    ("else", TokKind::Else),
    ("while", TokKind::While),
    ("func", TokKind::Func),
    ("var", TokKind::Var),
    ("return", TokKind::Return),
    ("array", TokKind::ArrayKw),
];

/// Streaming cursor over source text, producing one token at a time.
///
/// Cheap to clone (an `Rc` bump plus a handful of `usize`/`Word` fields):
/// the statement interpreter clones a lexer as a checkpoint when it needs
/// unbounded lookahead (e.g. distinguishing `name = expr` from a bare
/// expression statement starting with `name`).
#[derive(Clone)]
pub struct Lexer {
    src: Rc<str>,
    pos: usize,
    tok_kind: TokKind,
    tok_start: usize,
    tok_end: usize,
    /// Where the next `scan` should resume. Equal to `tok_end` for every
    /// token except a string literal, whose closing quote is consumed for
    /// resuming but excluded from the token's text.
    tok_resume: usize,
    tok_value: Word,
}

impl Lexer {
    /// Creates a lexer positioned at `pos` within `src` and scans the
    /// first token.
    pub fn at(src: Rc<str>, pos: usize, arena: &Arena) -> Result<Self> {
        let mut lex = Lexer {
            src,
            pos,
            tok_kind: TokKind::Eof,
            tok_start: pos,
            tok_end: pos,
            tok_resume: pos,
            tok_value: Word::ZERO,
        };
        lex.scan(arena)?;
        Ok(lex)
    }

    pub fn new(src: Rc<str>, arena: &Arena) -> Result<Self> {
        Lexer::at(src, 0, arena)
    }

    pub fn peek(&self) -> TokKind {
        self.tok_kind
    }

    pub fn token_string(&self) -> StringView {
        StringView::new(Rc::clone(&self.src), self.tok_start, self.tok_end)
    }

    pub fn token_value(&self) -> Word {
        self.tok_value
    }

    /// Byte offset of the *start* of the current token, used to capture
    /// views that must begin exactly here (e.g. a `while` condition to
    /// re-parse, or a function body).
    pub fn token_start(&self) -> usize {
        self.tok_start
    }

    /// Byte offset just past the cursor's current scan position (i.e.
    /// after the current token). Saving/restoring this is how `while`
    /// re-evaluates its condition and how block-skip resumes afterward.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn source(&self) -> &Rc<str> {
        &self.src
    }

    /// Repositions the cursor and rescans, used to rewind to a saved
    /// position (loop back-edges, function returns to the call site).
    pub fn set_position(&mut self, pos: usize, arena: &Arena) -> Result<()> {
        self.pos = pos;
        self.scan(arena)
    }

    /// Advances past the current token and scans the next one.
    pub fn advance(&mut self, arena: &Arena) -> Result<()> {
        self.pos = self.tok_resume;
        self.scan(arena)
    }

    fn byte_at(&self, i: usize) -> Option<u8> {
        self.src.as_bytes().get(i).copied()
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.byte_at(self.pos) {
                Some(b' ') | Some(b'\t') | Some(b'\r') => self.pos += 1,
                Some(b'#') => {
                    while !matches!(self.byte_at(self.pos), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn scan(&mut self, arena: &Arena) -> Result<()> {
        self.skip_trivia();
        let start = self.pos;
        let Some(b) = self.byte_at(start) else {
            self.set_tok(TokKind::Eof, start, start, Word::ZERO);
            return Ok(());
        };

        match b {
            b'\n' => {
                self.set_tok(TokKind::Newline, start, start + 1, Word::ZERO);
            }
            b';' => {
                self.set_tok(TokKind::Newline, start, start + 1, Word::ZERO);
            }
            b'(' => self.set_tok(TokKind::LParen, start, start + 1, Word::ZERO),
            b')' => self.set_tok(TokKind::RParen, start, start + 1, Word::ZERO),
            b'{' => self.set_tok(TokKind::LBrace, start, start + 1, Word::ZERO),
            b'}' => self.set_tok(TokKind::RBrace, start, start + 1, Word::ZERO),
            b',' => self.set_tok(TokKind::Comma, start, start + 1, Word::ZERO),
            b'"' => self.scan_string(start)?,
            b if b.is_ascii_digit() => self.scan_number(start)?,
            b if is_ident_start(b) => self.scan_ident(start, arena),
            b if is_operator_byte(b) => self.scan_operator_or_assign(start, arena)?,
            _ => return Err(ErrorCode::Syntax.into()),
        }
        trace!(kind = ?self.tok_kind, text = self.token_string().as_str(), "lexer: token");
        Ok(())
    }

    fn set_tok(&mut self, kind: TokKind, start: usize, end: usize, value: Word) {
        self.tok_kind = kind;
        self.tok_start = start;
        self.tok_end = end;
        self.tok_resume = end;
        self.tok_value = value;
    }

    fn scan_ident(&mut self, start: usize, arena: &Arena) {
        let mut end = start + 1;
        while matches!(self.byte_at(end), Some(b) if is_ident_continue(b)) {
            end += 1;
        }
        let text = &self.src[start..end];
        let kind = arena.reserved_kind(text).unwrap_or(TokKind::Symbol);
        self.set_tok(kind, start, end, Word::ZERO);
    }

    fn scan_number(&mut self, start: usize) -> Result<()> {
        let bytes = self.src.as_bytes();
        let mut end = start;

        if bytes[end] == b'0' && matches!(bytes.get(end + 1), Some(b'x') | Some(b'X')) {
            end += 2;
            let hex_start = end;
            while matches!(self.byte_at(end), Some(b) if b.is_ascii_hexdigit()) {
                end += 1;
            }
            let text = &self.src[hex_start..end];
            let v = i64::from_str_radix(text, 16).map_err(|_| ErrorCode::Syntax)?;
            self.set_tok(TokKind::Number, start, end, Word::from_int(v));
            return Ok(());
        }

        while matches!(self.byte_at(end), Some(b) if b.is_ascii_digit()) {
            end += 1;
        }

        #[cfg(feature = "float")]
        {
            if self.byte_at(end) == Some(b'.')
                && matches!(self.byte_at(end + 1), Some(b) if b.is_ascii_digit())
            {
                end += 1;
                while matches!(self.byte_at(end), Some(b) if b.is_ascii_digit()) {
                    end += 1;
                }
                let text = &self.src[start..end];
                let v: f32 = text.parse().map_err(|_| ErrorCode::Syntax)?;
                self.set_tok(TokKind::Number, start, end, Word::from_float(v));
                return Ok(());
            }
        }

        let text = &self.src[start..end];
        let v: i64 = text.parse().map_err(|_| ErrorCode::Syntax)?;
        self.set_tok(TokKind::Number, start, end, Word::from_int(v));
        Ok(())
    }

    fn scan_string(&mut self, start: usize) -> Result<()> {
        let mut end = start + 1;
        loop {
            match self.byte_at(end) {
                Some(b'"') => break,
                Some(_) => end += 1,
                None => return Err(ErrorCode::Syntax.into()),
            }
        }
        // Token text excludes the surrounding quotes; resuming scans
        // past the closing quote.
        self.set_tok(TokKind::Str, start + 1, end, Word::ZERO);
        self.tok_resume = end + 1;
        Ok(())
    }

    fn scan_operator_or_assign(&mut self, start: usize, arena: &Arena) -> Result<()> {
        let mut run_end = start;
        while matches!(self.byte_at(run_end), Some(b) if is_operator_byte(b)) {
            run_end += 1;
        }
        for end in (start + 1..=run_end).rev() {
            let candidate = &self.src[start..end];
            if arena.operator_precedence(candidate).is_some() {
                self.set_tok(TokKind::Operator, start, end, Word::ZERO);
                return Ok(());
            }
        }
        if self.src.as_bytes()[start] == b'=' {
            self.set_tok(TokKind::Assign, start, start + 1, Word::ZERO);
            return Ok(());
        }
        Err(ErrorCode::Syntax.into())
    }
}
