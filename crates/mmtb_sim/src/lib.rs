//! Event-driven environment for running mmtb testbenches.
//!
//! This crate provides the minimum a clock/reset/drive/wait testbench needs
//! from a simulator: a store of named ports on the design under test, virtual
//! time, a single-threaded cooperative executor for the test body and its
//! background tasks, and triggers that suspend a task until a timer expires or
//! a port produces an edge. DUT logic is not modeled; ports only hold what the
//! testbench writes.
//!
//! # Usage
//!
//! ```ignore
//! use mmtb_sim::{Clock, DesignSpec, SimConfig, Simulator, TimeUnit};
//!
//! let design = DesignSpec::new("mm_mod").input("CLK", 1).input("op_a_address", 32);
//! let simulator = Simulator::new(design, SimConfig::default())?;
//! let outcome = simulator.run_test("smoke", |dut| async move {
//!     let clk = dut.port("CLK")?;
//!     dut.sim().spawn(Clock::new(clk.clone(), 2, TimeUnit::Ns)?.start(false))?;
//!     dut.port("op_a_address")?.set(0x42)?;
//!     clk.clock_cycles(5).await
//! });
//! assert!(outcome.passed);
//! ```
//!
//! # Modules
//!
//! - `error`: Simulation error types
//! - `time`: Femtosecond time and units
//! - `design`: Port-level design description
//! - `kernel`: Port store, timer queue, and task executor
//! - `signal`: Design and port handles
//! - `trigger`: Timer and edge triggers
//! - `clock`: Free-running clock generator
//! - `runner`: Test registry and reports

#![warn(missing_docs)]

pub mod clock;
pub mod design;
pub mod error;
pub mod kernel;
pub mod runner;
pub mod signal;
pub mod time;
pub mod trigger;

pub use clock::Clock;
pub use design::{DesignSpec, Direction, PortDecl};
pub use error::SimError;
pub use kernel::{EdgeKind, Sim, SimConfig, Simulator, TaskHandle, TaskId, TestOutcome};
pub use runner::{TestCase, TestReport, TestSuite};
pub use signal::{Dut, Signal};
pub use time::{parse_duration, SimTime, TimeUnit};
pub use trigger::{clock_cycles, falling_edge, rising_edge, EdgeTrigger, Timer};
