//! Design and port handles used by testbench code.
//!
//! [`Dut`] is the handle a test body receives. [`Signal`] is a resolved port
//! on it: writes take effect immediately and are visible to the next read in
//! the same time step.

use std::fmt;

use log::trace;
use mmtb_common::LogicVec;

use crate::error::SimError;
use crate::kernel::{EdgeKind, Sim};
use crate::trigger::EdgeTrigger;

/// Handle to the design under test.
#[derive(Clone)]
pub struct Dut {
    sim: Sim,
    name: String,
}

impl Dut {
    pub(crate) fn new(sim: Sim, name: String) -> Self {
        Self { sim, name }
    }

    /// The design's top-level name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The simulation this design lives in.
    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    /// Resolves a port by name.
    ///
    /// Exact matches win; otherwise, if enabled in the
    /// [`SimConfig`](crate::SimConfig), a unique case-insensitive match is
    /// accepted.
    pub fn port(&self, name: &str) -> Result<Signal, SimError> {
        let state = self.sim.live()?;
        let index = state.lookup(name)?;
        let decl = &state.ports[index].decl;
        Ok(Signal {
            sim: self.sim.clone(),
            index,
            name: decl.name.clone(),
            width: decl.width,
        })
    }

    /// Returns true if `name` resolves to a port.
    pub fn has_port(&self, name: &str) -> bool {
        self.port(name).is_ok()
    }

    /// Every port named `{prefix}_*`, in declaration order.
    ///
    /// The prefix is compared ignoring ASCII case when case-insensitive
    /// lookup is enabled.
    pub fn ports_with_prefix(&self, prefix: &str) -> Result<Vec<Signal>, SimError> {
        let state = self.sim.live()?;
        let head = format!("{prefix}_");
        let under_prefix = |name: &str| match name.get(..head.len()) {
            Some(start) if state.case_insensitive => start.eq_ignore_ascii_case(&head),
            Some(start) => start == head,
            None => false,
        };
        Ok(state
            .ports
            .iter()
            .enumerate()
            .filter(|(_, p)| under_prefix(&p.decl.name))
            .map(|(index, p)| Signal {
                sim: self.sim.clone(),
                index,
                name: p.decl.name.clone(),
                width: p.decl.width,
            })
            .collect())
    }

    /// Names of all ports, in declaration order.
    pub fn port_names(&self) -> Result<Vec<String>, SimError> {
        let state = self.sim.live()?;
        Ok(state.ports.iter().map(|p| p.decl.name.clone()).collect())
    }
}

impl fmt::Debug for Dut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dut").field("name", &self.name).finish()
    }
}

/// A resolved port on the design under test.
#[derive(Clone)]
pub struct Signal {
    sim: Sim,
    index: usize,
    name: String,
    width: u32,
}

impl Signal {
    /// The port's declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The port's bit width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The simulation this port belongs to.
    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Assigns an integer value.
    pub fn set(&self, value: u64) -> Result<(), SimError> {
        let value = LogicVec::from_u64(value, self.width).map_err(|source| self.too_wide(source))?;
        self.drive(value)
    }

    /// Assigns a little-endian byte string.
    pub fn set_bytes(&self, bytes: &[u8]) -> Result<(), SimError> {
        let value =
            LogicVec::from_le_bytes(bytes, self.width).map_err(|source| self.too_wide(source))?;
        self.drive(value)
    }

    /// Assigns a 4-state value, zero-extending it to the port width.
    pub fn set_value(&self, value: &LogicVec) -> Result<(), SimError> {
        let value = value
            .resized(self.width)
            .map_err(|source| self.too_wide(source))?;
        self.drive(value)
    }

    fn too_wide(&self, source: mmtb_common::ValueError) -> SimError {
        SimError::ValueTooWide {
            port: self.name.clone(),
            source,
        }
    }

    fn drive(&self, value: LogicVec) -> Result<(), SimError> {
        let mut state = self.sim.live()?;
        trace!("{} {} = {value}", state.now, self.name);
        state.ports[self.index].drive(value);
        Ok(())
    }

    /// Reads the current value.
    pub fn value(&self) -> Result<LogicVec, SimError> {
        let state = self.sim.live()?;
        Ok(state.ports[self.index].value.clone())
    }

    /// Reads the current value as an integer, `None` if any bit is X or Z.
    pub fn to_u64(&self) -> Result<Option<u64>, SimError> {
        Ok(self.value()?.to_u64())
    }

    /// Number of rising edges seen on this port since the test started.
    pub fn rising_edges(&self) -> Result<u64, SimError> {
        let state = self.sim.live()?;
        Ok(state.ports[self.index].edge_count(EdgeKind::Rising))
    }

    /// Waits for the next rising edge.
    pub fn rising_edge(&self) -> EdgeTrigger {
        EdgeTrigger::new(self.clone(), EdgeKind::Rising, 1)
    }

    /// Waits for the next falling edge.
    pub fn falling_edge(&self) -> EdgeTrigger {
        EdgeTrigger::new(self.clone(), EdgeKind::Falling, 1)
    }

    /// Waits for the next change of value.
    pub fn value_change(&self) -> EdgeTrigger {
        EdgeTrigger::new(self.clone(), EdgeKind::Any, 1)
    }

    /// Waits for `cycles` rising edges.
    pub fn clock_cycles(&self, cycles: u64) -> EdgeTrigger {
        EdgeTrigger::new(self.clone(), EdgeKind::Rising, cycles)
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("width", &self.width)
            .finish()
    }
}
