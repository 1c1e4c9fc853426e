//! The tagged machine-word value cell shared by integers, bit-reinterpreted
//! floats, and arena pointers.

/// A single machine-width value cell.
///
/// Mirrors the original interpreter's `intptr_t Val`, which is reused for
/// integers, pointers into the arena, and, with the `float` feature, a
/// bit-reinterpreted `f32`. Kept as a newtype over `i64` rather than an enum:
/// the language itself has no runtime type tag on values (a symbol's
/// `SymKind` carries that information instead), so punning here matches what
/// the interpreter is actually doing rather than inventing a tag nothing
/// reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Word(pub i64);

impl Word {
    pub const ZERO: Word = Word(0);
    pub const ONE: Word = Word(1);

    #[inline]
    pub fn from_int(v: i64) -> Self {
        Word(v)
    }

    #[inline]
    pub fn as_int(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_bool(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub fn from_bool(b: bool) -> Self {
        Word(if b { 1 } else { 0 })
    }

    #[inline]
    pub fn as_ptr_index(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn from_ptr_index(i: usize) -> Self {
        Word(i as i64)
    }

    #[cfg(feature = "float")]
    #[inline]
    pub fn from_float(v: f32) -> Self {
        Word(v.to_bits() as i64)
    }

    #[cfg(feature = "float")]
    #[inline]
    pub fn as_float(self) -> f32 {
        f32::from_bits(self.0 as u32)
    }
}

impl From<i64> for Word {
    fn from(v: i64) -> Self {
        Word(v)
    }
}

impl From<bool> for Word {
    fn from(b: bool) -> Self {
        Word::from_bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_round_trips() {
        assert_eq!(Word::from_bool(true).as_bool(), true);
        assert_eq!(Word::from_bool(false).as_bool(), false);
        assert_eq!(Word::from_bool(true).as_int(), 1);
    }

    #[test]
    fn int_round_trips() {
        assert_eq!(Word::from_int(-42).as_int(), -42);
    }

    #[cfg(feature = "float")]
    #[test]
    fn float_round_trips() {
        let w = Word::from_float(3.5);
        assert_eq!(w.as_float(), 3.5);
    }
}
