//! The four states a single wire can be observed in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One bit of a port value.
///
/// The discriminants double as the 2-bit encoding inside a [`LogicVec`](crate::LogicVec).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Driven low.
    Zero = 0,
    /// Driven high.
    One = 1,
    /// Unknown or uninitialized. Every port starts here.
    #[default]
    X = 2,
    /// Undriven.
    Z = 3,
}

impl Logic {
    /// Inverse of `self as u8`, ignoring everything above the low two bits.
    pub(crate) fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            0 => Logic::Zero,
            1 => Logic::One,
            2 => Logic::X,
            _ => Logic::Z,
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digit = match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'X',
            Logic::Z => 'Z',
        };
        write!(f, "{digit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unknown() {
        assert_eq!(Logic::default(), Logic::X);
    }

    #[test]
    fn display() {
        let s: String = [Logic::Zero, Logic::One, Logic::X, Logic::Z]
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(s, "01XZ");
    }
}
