//! Signal value types shared across the mmtb testbench crates.
//!
//! Ports on a simulated design carry 4-state values: each bit is `0`, `1`,
//! unknown (`X`) or high-impedance (`Z`). [`LogicVec`] is the packed vector
//! that every port assignment and readback goes through.

#![warn(missing_docs)]

pub mod logic;
pub mod logic_vec;

pub use logic::Logic;
pub use logic_vec::{LogicVec, ValueError};
