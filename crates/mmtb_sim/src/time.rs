//! Simulation time with femtosecond precision.
//!
//! [`SimTime`] is the virtual clock of the environment. [`TimeUnit`] is how
//! testbenches express clock periods and timer lengths (`2, TimeUnit::Ns`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SimError;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;
/// Femtoseconds per second.
pub const FS_PER_S: u64 = 1_000_000_000_000_000;

/// A point in simulated time, in femtoseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime {
    /// Simulation time in femtoseconds.
    pub fs: u64,
}

impl SimTime {
    /// Time zero.
    pub fn zero() -> Self {
        Self { fs: 0 }
    }

    /// Creates a time from a femtosecond value.
    pub fn from_fs(fs: u64) -> Self {
        Self { fs }
    }

    /// Creates a time from a nanosecond value.
    pub fn from_ns(ns: u64) -> Self {
        Self { fs: ns * FS_PER_NS }
    }

    /// Creates a time from an amount in the given unit.
    pub fn from_unit(amount: u64, unit: TimeUnit) -> Self {
        Self {
            fs: unit.to_fs(amount),
        }
    }

    /// Converts to nanoseconds (truncated).
    pub fn to_ns(self) -> u64 {
        self.fs / FS_PER_NS
    }

    /// Returns this time shifted forward by `fs` femtoseconds.
    pub fn after(self, fs: u64) -> Self {
        Self {
            fs: self.fs.saturating_add(fs),
        }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fs = self.fs;
        if fs == 0 {
            write!(f, "0 fs")
        } else if fs.is_multiple_of(FS_PER_S) {
            write!(f, "{} s", fs / FS_PER_S)
        } else if fs.is_multiple_of(FS_PER_MS) {
            write!(f, "{} ms", fs / FS_PER_MS)
        } else if fs.is_multiple_of(FS_PER_US) {
            write!(f, "{} us", fs / FS_PER_US)
        } else if fs.is_multiple_of(FS_PER_NS) {
            write!(f, "{} ns", fs / FS_PER_NS)
        } else if fs.is_multiple_of(FS_PER_PS) {
            write!(f, "{} ps", fs / FS_PER_PS)
        } else {
            write!(f, "{fs} fs")
        }
    }
}

/// A unit for expressing clock periods and delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Femtoseconds.
    Fs,
    /// Picoseconds.
    Ps,
    /// Nanoseconds.
    #[default]
    Ns,
    /// Microseconds.
    Us,
    /// Milliseconds.
    Ms,
    /// Seconds.
    S,
}

impl TimeUnit {
    /// Femtoseconds in one of this unit.
    pub fn fs_per_unit(self) -> u64 {
        match self {
            TimeUnit::Fs => 1,
            TimeUnit::Ps => FS_PER_PS,
            TimeUnit::Ns => FS_PER_NS,
            TimeUnit::Us => FS_PER_US,
            TimeUnit::Ms => FS_PER_MS,
            TimeUnit::S => FS_PER_S,
        }
    }

    /// Converts an amount of this unit to femtoseconds.
    pub fn to_fs(self, amount: u64) -> u64 {
        amount.saturating_mul(self.fs_per_unit())
    }
}

impl FromStr for TimeUnit {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fs" => Ok(TimeUnit::Fs),
            "ps" => Ok(TimeUnit::Ps),
            "ns" => Ok(TimeUnit::Ns),
            "us" => Ok(TimeUnit::Us),
            "ms" => Ok(TimeUnit::Ms),
            "s" => Ok(TimeUnit::S),
            other => Err(SimError::UnknownTimeUnit(other.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeUnit::Fs => "fs",
            TimeUnit::Ps => "ps",
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
        };
        f.write_str(s)
    }
}

/// Parses a duration string like `"100ns"` or `"1 us"` into a [`SimTime`].
pub fn parse_duration(text: &str) -> Result<SimTime, SimError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SimError::InvalidDuration("empty duration string".into()));
    }

    let split = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(text.len(), |(at, _)| at);
    let (count, unit) = text.split_at(split);
    if count.is_empty() {
        return Err(SimError::InvalidDuration(format!(
            "no numeric value in `{text}`"
        )));
    }
    let count: u64 = count
        .parse()
        .map_err(|_| SimError::InvalidDuration(format!("`{text}` is out of range")))?;

    match unit.trim() {
        "" => Err(SimError::InvalidDuration(format!(
            "missing unit in `{text}` (use fs, ps, ns, us, ms, or s)"
        ))),
        unit => {
            let unit: TimeUnit = unit.parse()?;
            count
                .checked_mul(unit.fs_per_unit())
                .map(SimTime::from_fs)
                .ok_or_else(|| SimError::InvalidDuration(format!("`{text}` is out of range")))
        }
    }
}
