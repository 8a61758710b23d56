//! The testbench driver: clock, reset, stimulus, bus transactions, settle.
//!
//! A [`Testbench`] describes one scenario as data. Running it against a
//! [`Dut`] performs the fixed sequence
//!
//! 1. start the clock as a background task,
//! 2. bind the bus interface, if any,
//! 3. run the reset sequence, if any,
//! 4. drive the static stimulus,
//! 5. issue the enabled bus transactions, each followed by a short settle,
//! 6. wait the final settle count of rising clock edges.
//!
//! Every failure propagates to the caller unchanged.

use std::fmt;
use std::rc::Rc;

use log::debug;
use mmtb_sim::{Clock, DesignSpec, Dut, SimError, Signal, TaskHandle, TestCase, TimeUnit};

use crate::bus::{AxiLiteBus, BusMaster, BusOp, BusTransaction};

/// Builds a bus master once the bus ports are bound.
pub type BusFactory = Rc<dyn Fn(&AxiLiteBus) -> Result<Box<dyn BusMaster>, SimError>>;

/// Clock parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockSpec {
    /// Port the clock drives.
    pub port: String,
    /// Period in `unit`s.
    pub period: u64,
    /// Unit of `period`.
    pub unit: TimeUnit,
    /// Whether the clock starts high.
    pub start_high: bool,
}

impl ClockSpec {
    /// A clock starting low.
    pub fn new(port: impl Into<String>, period: u64, unit: TimeUnit) -> Self {
        Self {
            port: port.into(),
            period,
            unit,
            start_high: false,
        }
    }
}

/// Reset sequence parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetSpec {
    /// Reset port.
    pub port: String,
    /// Rising edges to hold reset asserted.
    pub cycles: u64,
    /// Whether reset is asserted by driving 0.
    pub active_low: bool,
    /// Port whose rising edges are counted. Defaults to the clock port.
    pub edge_port: Option<String>,
}

impl ResetSpec {
    /// An active-low reset held for `cycles` clock edges.
    pub fn active_low(port: impl Into<String>, cycles: u64) -> Self {
        Self {
            port: port.into(),
            cycles,
            active_low: true,
            edge_port: None,
        }
    }

    /// Counts edges on `port` instead of the clock port.
    pub fn counted_on(mut self, port: impl Into<String>) -> Self {
        self.edge_port = Some(port.into());
        self
    }
}

/// A value driven once onto a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stimulus {
    /// Target port.
    pub port: String,
    /// Value.
    pub value: u64,
}

/// Per-test handle performing the individual driver operations on a [`Dut`].
#[derive(Debug, Clone)]
pub struct Driver {
    dut: Dut,
    clock: Signal,
}

impl Driver {
    /// Resolves `clock_port` on `dut`.
    pub fn new(dut: Dut, clock_port: &str) -> Result<Self, SimError> {
        let clock = dut.port(clock_port)?;
        Ok(Self { dut, clock })
    }

    /// The design handle.
    pub fn dut(&self) -> &Dut {
        &self.dut
    }

    /// The clock port.
    pub fn clock(&self) -> &Signal {
        &self.clock
    }

    /// Starts a free-running clock in the background. Never blocks.
    pub fn start_clock(
        &self,
        period: u64,
        unit: TimeUnit,
        start_high: bool,
    ) -> Result<TaskHandle, SimError> {
        let clock = Clock::new(self.clock.clone(), period, unit)?;
        self.dut.sim().spawn(clock.start(start_high))
    }

    /// Asserts reset, waits `spec.cycles` rising edges, then releases it.
    pub async fn reset(&self, spec: &ResetSpec) -> Result<(), SimError> {
        let port = self.dut.port(&spec.port)?;
        let edges = match &spec.edge_port {
            Some(name) => self.dut.port(name)?,
            None => self.clock.clone(),
        };
        let (asserted, released) = if spec.active_low { (0, 1) } else { (1, 0) };

        port.set(asserted)?;
        debug!("reset `{}` asserted at {}", port.name(), self.dut.sim().now());
        edges.clock_cycles(spec.cycles).await?;
        port.set(released)?;
        debug!("reset `{}` released at {}", port.name(), self.dut.sim().now());
        Ok(())
    }

    /// Writes `value` onto `port`.
    pub fn drive(&self, port: &str, value: u64) -> Result<(), SimError> {
        let signal = self.dut.port(port)?;
        signal.set(value)?;
        debug!("{} <= {value:#x} at {}", signal.name(), self.dut.sim().now());
        Ok(())
    }

    /// Issues `txn` through `bus` and waits its settle count.
    ///
    /// Disabled transactions are skipped without waiting. An enabled one with
    /// no bus master fails with [`SimError::Bus`].
    pub async fn transact(
        &self,
        bus: Option<&dyn BusMaster>,
        txn: &BusTransaction,
    ) -> Result<(), SimError> {
        if !txn.enabled {
            debug!("skipping disabled transaction: {txn}");
            return Ok(());
        }
        let Some(bus) = bus else {
            return Err(SimError::Bus {
                reason: format!("no bus master attached for {txn}"),
            });
        };
        debug!("{txn} at {}", self.dut.sim().now());
        match &txn.op {
            BusOp::Write { address, data } => bus.write(*address, data).await?,
            BusOp::Read { address, length } => {
                let data = bus.read(*address, *length).await?;
                debug!("read {address:#x} returned {data:02x?}");
            }
        }
        self.settle(txn.settle_cycles).await
    }

    /// Waits `cycles` rising clock edges.
    pub async fn settle(&self, cycles: u64) -> Result<(), SimError> {
        self.clock.clock_cycles(cycles).await
    }
}

/// A complete scenario: design, clock, reset, stimulus, transactions, settle.
#[derive(Clone)]
pub struct Testbench {
    name: String,
    design: DesignSpec,
    clock: ClockSpec,
    reset: Option<ResetSpec>,
    bus_prefix: Option<String>,
    bus_master: Option<BusFactory>,
    stimulus: Vec<Stimulus>,
    transactions: Vec<BusTransaction>,
    settle_cycles: u64,
}

impl Testbench {
    /// A scenario that only runs the clock and waits `settle_cycles` edges.
    pub fn new(
        name: impl Into<String>,
        design: DesignSpec,
        clock: ClockSpec,
        settle_cycles: u64,
    ) -> Self {
        Self {
            name: name.into(),
            design,
            clock,
            reset: None,
            bus_prefix: None,
            bus_master: None,
            stimulus: Vec::new(),
            transactions: Vec::new(),
            settle_cycles,
        }
    }

    /// Adds a reset sequence.
    pub fn with_reset(mut self, reset: ResetSpec) -> Self {
        self.reset = Some(reset);
        self
    }

    /// Binds an AXI-Lite interface with the given signal prefix.
    pub fn with_bus(mut self, prefix: impl Into<String>) -> Self {
        self.bus_prefix = Some(prefix.into());
        self
    }

    /// Attaches the bus master used for enabled transactions.
    pub fn with_bus_master<F>(mut self, factory: F) -> Self
    where
        F: Fn(&AxiLiteBus) -> Result<Box<dyn BusMaster>, SimError> + 'static,
    {
        self.bus_master = Some(Rc::new(factory));
        self
    }

    /// Appends a static stimulus value.
    pub fn drive(mut self, port: impl Into<String>, value: u64) -> Self {
        self.stimulus.push(Stimulus {
            port: port.into(),
            value,
        });
        self
    }

    /// Appends a bus transaction.
    pub fn transaction(mut self, txn: BusTransaction) -> Self {
        self.transactions.push(txn);
        self
    }

    /// Test name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Design under test.
    pub fn design(&self) -> &DesignSpec {
        &self.design
    }

    /// Clock parameters.
    pub fn clock(&self) -> &ClockSpec {
        &self.clock
    }

    /// Reset parameters, if any.
    pub fn reset(&self) -> Option<&ResetSpec> {
        self.reset.as_ref()
    }

    /// Static stimulus, in drive order.
    pub fn stimulus(&self) -> &[Stimulus] {
        &self.stimulus
    }

    /// Bus transactions, in issue order.
    pub fn transactions(&self) -> &[BusTransaction] {
        &self.transactions
    }

    /// Final settle count.
    pub fn settle_cycles(&self) -> u64 {
        self.settle_cycles
    }

    /// Runs the scenario against `dut`.
    pub async fn run(&self, dut: Dut) -> Result<(), SimError> {
        let driver = Driver::new(dut, &self.clock.port)?;
        driver.start_clock(self.clock.period, self.clock.unit, self.clock.start_high)?;

        let mut master = None;
        if let Some(prefix) = &self.bus_prefix {
            let bus = AxiLiteBus::from_prefix(driver.dut(), prefix)?;
            bus.drive_idle()?;
            if let Some(factory) = &self.bus_master {
                master = Some(factory(&bus)?);
            }
        }

        if let Some(reset) = &self.reset {
            driver.reset(reset).await?;
        }
        for stimulus in &self.stimulus {
            driver.drive(&stimulus.port, stimulus.value)?;
        }
        for txn in &self.transactions {
            driver.transact(master.as_deref(), txn).await?;
        }
        driver.settle(self.settle_cycles).await
    }

    /// Registers the scenario as a test case.
    pub fn into_case(self) -> TestCase {
        let design = self.design.clone();
        let name = self.name.clone();
        let tb = Rc::new(self);
        TestCase::new(name, design, move |dut| {
            let tb = Rc::clone(&tb);
            async move { tb.run(dut).await }
        })
    }
}

impl fmt::Debug for Testbench {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Testbench")
            .field("name", &self.name)
            .field("design", &self.design.name)
            .field("clock", &self.clock)
            .field("reset", &self.reset)
            .field("bus_prefix", &self.bus_prefix)
            .field("bus_master", &self.bus_master.is_some())
            .field("stimulus", &self.stimulus)
            .field("transactions", &self.transactions)
            .field("settle_cycles", &self.settle_cycles)
            .finish()
    }
}
