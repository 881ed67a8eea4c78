use std::fmt::{Debug, Display, Formatter};
use std::ops::Not;

/// An edge of an And-Inverter Graph: a constant, a primary input or an AND
/// node, optionally complemented (lowest bit).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Signal(u32);

const INPUT: u32 = 1 << 31;

// Constructors
impl Signal {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn one() -> Self {
        Self(1)
    }

    /// Output of AND node `node`.
    pub const fn from_node(node: u32) -> Self {
        // Index 0 is taken by the constant.
        Self((node + 1) << 1)
    }

    pub const fn from_input(input: u32) -> Self {
        Self(INPUT | (input << 1))
    }

    /// Complement the signal iff `negate` is set.
    pub const fn negate_if(self, negate: bool) -> Self {
        Self(self.0 ^ negate as u32)
    }
}

// Getters
impl Signal {
    pub const fn regular(self) -> Self {
        Self(self.0 & !1)
    }

    pub const fn node(&self) -> u32 {
        assert!(self.is_node());
        ((self.0 & !INPUT) >> 1) - 1
    }

    pub const fn input(&self) -> u32 {
        assert!(self.is_input());
        (self.0 & !INPUT) >> 1
    }
}

// Checks
impl Signal {
    pub const fn is_const(&self) -> bool {
        self.0 >> 1 == 0
    }

    pub const fn is_input(&self) -> bool {
        self.0 & INPUT != 0
    }

    pub const fn is_node(&self) -> bool {
        !self.is_input() && !self.is_const()
    }

    pub const fn is_negated(&self) -> bool {
        self.0 & 1 != 0
    }
}

impl From<bool> for Signal {
    fn from(b: bool) -> Self {
        if b {
            Self::one()
        } else {
            Self::zero()
        }
    }
}

impl Not for Signal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(self.0 ^ 1)
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_const() {
            return write!(f, "{}", self.0 & 1);
        }
        if self.is_negated() {
            write!(f, "!")?;
        }
        if self.is_input() {
            write!(f, "i{}", self.input())
        } else {
            write!(f, "n{}", self.node())
        }
    }
}

impl Debug for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const() {
        let zero = Signal::zero();
        let one = Signal::one();

        assert!(zero.is_const());
        assert!(one.is_const());
        assert_eq!(zero, !one);
        assert!(!zero.is_negated());
        assert!(one.is_negated());
        assert!(!zero.is_input());
        assert!(!one.is_node());
        assert_eq!(Signal::from(true), one);
    }

    #[test]
    fn test_input_and_node() {
        let i = Signal::from_input(5);
        assert!(i.is_input());
        assert!(!i.is_node());
        assert_eq!(i.input(), 5);
        assert_eq!((!i).input(), 5);
        assert_eq!((!i).regular(), i);
        assert_eq!(i.to_string(), "i5");

        let n = Signal::from_node(0);
        assert!(n.is_node());
        assert!(!n.is_const());
        assert_eq!(n.node(), 0);
        assert_eq!(n.negate_if(true).to_string(), "!n0");
        assert_eq!(n.negate_if(false), n);
    }
}
