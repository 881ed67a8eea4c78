use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// Handle to a BDD node with a complement bit.
///
/// The sign encodes the complement edge: `-r` denotes the negation of the
/// function referenced by `r`. Index 0 is never a valid node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Ref(i32);

impl Ref {
    pub const fn positive(index: u32) -> Self {
        Self(index as i32)
    }

    pub const fn negative(index: u32) -> Self {
        Self(-(index as i32))
    }

    pub const fn is_negated(self) -> bool {
        self.0 < 0
    }

    pub const fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Strip the complement bit.
    pub const fn regular(self) -> Self {
        Self(self.0.abs())
    }

    /// Return the index of the referenced node.
    pub const fn index(self) -> usize {
        self.0.unsigned_abs() as usize
    }

    /// Return the internal representation of the reference.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Unsigned encoding used for hashing: `2 * index + negated`.
    pub(crate) const fn unsigned(self) -> u64 {
        ((self.0.unsigned_abs() as u64) << 1) | (self.0 < 0) as u64
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}",
            if self.is_negated() { "~" } else { "" },
            self.index()
        )
    }
}
