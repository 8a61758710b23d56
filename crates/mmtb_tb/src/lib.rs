//! Testbench driver for memory-mapped peripherals.
//!
//! A [`Testbench`] starts a clock, optionally runs an active-low reset,
//! drives static stimulus, issues (possibly disabled) bus transactions and
//! waits a fixed number of clock edges. Two scenarios ship built in: an
//! AXI-Lite peripheral (`test_axi_write_1`) and the `mm_mod` module
//! (`test_mm_mod`). Further scenarios can be declared in `mmtb.toml`.
//!
//! # Modules
//!
//! - `bus`: Bus master seam and AXI-Lite port binding
//! - `driver`: Driver operations and the [`Testbench`] sequence
//! - `scenarios`: Built-in designs and scenarios
//! - `project`: Testbenches from `mmtb.toml`

#![warn(missing_docs)]

pub mod bus;
pub mod driver;
pub mod project;
pub mod scenarios;

pub use bus::{AxiLiteBus, BusFuture, BusMaster, BusOp, BusTransaction};
pub use driver::{ClockSpec, Driver, ResetSpec, Stimulus, Testbench};
pub use project::{suite_from_config, testbench_from_config, testbenches_from_config};
pub use scenarios::{build_suite, builtin_suite, builtin_testbenches, AXI_WRITE_TEST, MM_MOD_TEST};
