//! Packed vectors of 4-state logic values used as port values.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Two bits per lane, so a word holds 32 lanes.
const LANES_PER_WORD: u32 = u64::BITS / 2;

/// Errors produced when converting between integers, bytes and [`LogicVec`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The value needs more bits than the target width provides.
    #[error("value needs {required} bits but only {width} are available")]
    TooWide {
        /// Minimum number of bits needed to hold the value.
        required: u32,
        /// Width of the destination.
        width: u32,
    },
}

/// A vector of 4-state [`Logic`] values, least significant bit at index 0.
///
/// Lanes are packed two bits apiece into `u64` words.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    words: Vec<u64>,
}

impl LogicVec {
    /// A `width`-bit vector driven to all zeros.
    pub fn new(width: u32) -> Self {
        let words = width.div_ceil(LANES_PER_WORD) as usize;
        Self {
            width,
            words: vec![0; words],
        }
    }

    /// A `width`-bit vector in the power-on state, every lane `X`.
    pub fn all_x(width: u32) -> Self {
        let mut unknown = Self::new(width);
        (0..width).for_each(|lane| unknown.set(lane, Logic::X));
        unknown
    }

    /// Bit width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Reads lane `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the width.
    pub fn get(&self, index: u32) -> Logic {
        let (word, shift) = self.slot(index);
        Logic::from_bits(self.words[word] >> shift)
    }

    /// Overwrites lane `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the width.
    pub fn set(&mut self, index: u32, value: Logic) {
        let (word, shift) = self.slot(index);
        let cleared = self.words[word] & !(0b11 << shift);
        self.words[word] = cleared | (u64::from(value as u8) << shift);
    }

    fn slot(&self, index: u32) -> (usize, u32) {
        assert!(
            index < self.width,
            "lane {index} is outside a {}-bit vector",
            self.width
        );
        ((index / LANES_PER_WORD) as usize, (index % LANES_PER_WORD) * 2)
    }

    /// Lanes from most to least significant, the order they are printed in.
    fn msb_first(&self) -> impl Iterator<Item = Logic> + '_ {
        (0..self.width).rev().map(|lane| self.get(lane))
    }

    /// Creates a `LogicVec` from a `u64`, rejecting values that do not fit `width`.
    pub fn from_u64(value: u64, width: u32) -> Result<Self, ValueError> {
        let required = u64::BITS - value.leading_zeros();
        if required > width {
            return Err(ValueError::TooWide { required, width });
        }
        let mut v = Self::new(width);
        for i in 0..required {
            if (value >> i) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        Ok(v)
    }

    /// Creates a `LogicVec` from little-endian bytes.
    ///
    /// Trailing zero bytes beyond `width` are accepted; any set bit beyond
    /// `width` is rejected.
    pub fn from_le_bytes(bytes: &[u8], width: u32) -> Result<Self, ValueError> {
        let required = bytes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, b)| **b != 0)
            .map(|(i, b)| i as u32 * 8 + (u8::BITS - b.leading_zeros()))
            .unwrap_or(0);
        if required > width {
            return Err(ValueError::TooWide { required, width });
        }
        let mut v = Self::new(width);
        for bit in 0..required {
            let byte = bytes[(bit / 8) as usize];
            if (byte >> (bit % 8)) & 1 != 0 {
                v.set(bit, Logic::One);
            }
        }
        Ok(v)
    }

    /// Converts to a `u64` if every bit is 0 or 1 and the width is at most 64.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        let mut result = 0u64;
        for i in 0..self.width {
            match self.get(i) {
                Logic::Zero => {}
                Logic::One => result |= 1 << i,
                Logic::X | Logic::Z => return None,
            }
        }
        Some(result)
    }

    /// Number of bits up to and including the most significant non-zero bit.
    ///
    /// X and Z count as non-zero since they cannot be dropped without
    /// changing the value.
    pub fn significant_width(&self) -> u32 {
        (0..self.width)
            .rev()
            .find(|&i| self.get(i) != Logic::Zero)
            .map_or(0, |i| i + 1)
    }

    /// Zero-extends or truncates to `width`, rejecting truncation of significant bits.
    pub fn resized(&self, width: u32) -> Result<Self, ValueError> {
        let required = self.significant_width();
        if required > width {
            return Err(ValueError::TooWide { required, width });
        }
        let mut v = Self::new(width);
        for i in 0..required {
            v.set(i, self.get(i));
        }
        Ok(v)
    }

    /// Returns true if every bit is `X`.
    pub fn is_all_x(&self) -> bool {
        (0..self.width).all(|i| self.get(i) == Logic::X)
    }
}

impl From<Logic> for LogicVec {
    fn from(value: Logic) -> Self {
        let mut v = Self::new(1);
        v.set(0, value);
        v
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u64() {
            Some(n) if self.width > 1 => write!(f, "0x{n:x}"),
            _ => self.msb_first().try_for_each(|lane| write!(f, "{lane}")),
        }
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits: String = self.msb_first().map(|lane| lane.to_string()).collect();
        write!(f, "LogicVec({}'{bits})", self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_all_zero() {
        let v = LogicVec::new(8);
        assert_eq!(v.width(), 8);
        assert_eq!(v.to_u64(), Some(0));
    }

    #[test]
    fn all_x_has_no_integer_value() {
        let v = LogicVec::all_x(4);
        assert!(v.is_all_x());
        assert_eq!(v.to_u64(), None);
    }

    #[test]
    fn from_u64_fits() {
        let v = LogicVec::from_u64(0x42, 32).unwrap();
        assert_eq!(v.width(), 32);
        assert_eq!(v.to_u64(), Some(0x42));
    }

    #[test]
    fn from_u64_exact_width() {
        let v = LogicVec::from_u64(0xff, 8).unwrap();
        assert_eq!(v.to_u64(), Some(0xff));
    }

    #[test]
    fn from_u64_too_wide() {
        let err = LogicVec::from_u64(0x100, 8).unwrap_err();
        assert_eq!(
            err,
            ValueError::TooWide {
                required: 9,
                width: 8
            }
        );
        assert_eq!(err.to_string(), "value needs 9 bits but only 8 are available");
    }

    #[test]
    fn from_u64_zero_into_zero_width() {
        let v = LogicVec::from_u64(0, 0).unwrap();
        assert_eq!(v.width(), 0);
    }

    #[test]
    fn words_span_multiple_u64() {
        let mut v = LogicVec::new(70);
        v.set(69, Logic::One);
        v.set(33, Logic::Z);
        assert_eq!(v.get(69), Logic::One);
        assert_eq!(v.get(33), Logic::Z);
        assert_eq!(v.get(0), Logic::Zero);
        assert_eq!(v.to_u64(), None);
    }

    #[test]
    fn le_bytes_accept_zero_padding() {
        let v = LogicVec::from_le_bytes(&[0x04, 0x00, 0x00, 0x00], 32).unwrap();
        assert_eq!(v.to_u64(), Some(4));
    }

    #[test]
    fn le_bytes_rejects_high_bits() {
        let err = LogicVec::from_le_bytes(&[0x00, 0x01], 8).unwrap_err();
        assert_eq!(
            err,
            ValueError::TooWide {
                required: 9,
                width: 8
            }
        );
    }

    #[test]
    fn significant_width_counts_unknowns() {
        let mut v = LogicVec::new(8);
        assert_eq!(v.significant_width(), 0);
        v.set(2, Logic::One);
        assert_eq!(v.significant_width(), 3);
        v.set(6, Logic::X);
        assert_eq!(v.significant_width(), 7);
    }

    #[test]
    fn resized_extends_and_truncates() {
        let v = LogicVec::from_u64(5, 64).unwrap();
        let narrow = v.resized(3).unwrap();
        assert_eq!(narrow.width(), 3);
        assert_eq!(narrow.to_u64(), Some(5));
        assert!(v.resized(2).is_err());
    }

    #[test]
    fn display_hex_for_known_vectors() {
        assert_eq!(LogicVec::from_u64(0x42, 32).unwrap().to_string(), "0x42");
        assert_eq!(LogicVec::from(Logic::One).to_string(), "1");
        assert_eq!(LogicVec::all_x(2).to_string(), "XX");
    }

    #[test]
    fn debug_shows_width_and_bits() {
        let v = LogicVec::from_u64(2, 3).unwrap();
        assert_eq!(format!("{v:?}"), "LogicVec(3'010)");
    }

    #[test]
    #[should_panic(expected = "lane 8 is outside a 8-bit vector")]
    fn get_past_width_panics() {
        LogicVec::new(8).get(8);
    }
}
