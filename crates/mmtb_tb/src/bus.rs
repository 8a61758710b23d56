//! Memory-mapped bus seam.
//!
//! The driver never speaks a bus protocol itself. It hands transactions to a
//! [`BusMaster`], and binds the AXI-Lite channel ports through [`AxiLiteBus`]
//! so that a master implementation has typed handles to drive.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use log::debug;
use mmtb_sim::{Dut, SimError, Signal};

/// Boxed future returned by [`BusMaster`] operations.
pub type BusFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SimError>> + 'a>>;

/// A bus master able to issue memory-mapped reads and writes.
///
/// Failures are reported as [`SimError::Bus`].
pub trait BusMaster {
    /// Writes `data` starting at byte address `address`.
    fn write<'a>(&'a self, address: u64, data: &'a [u8]) -> BusFuture<'a, ()>;

    /// Reads `length` bytes starting at byte address `address`.
    fn read(&self, address: u64, length: usize) -> BusFuture<'_, Vec<u8>>;
}

/// Address channel (`AW` or `AR`).
#[derive(Debug, Clone)]
pub struct AddressChannel {
    /// `xADDR`.
    pub addr: Signal,
    /// `xPROT`, if the design has one.
    pub prot: Option<Signal>,
    /// `xVALID`.
    pub valid: Signal,
    /// `xREADY`.
    pub ready: Signal,
}

/// Write data channel.
#[derive(Debug, Clone)]
pub struct WriteDataChannel {
    /// `WDATA`.
    pub data: Signal,
    /// `WSTRB`, if the design has one.
    pub strb: Option<Signal>,
    /// `WVALID`.
    pub valid: Signal,
    /// `WREADY`.
    pub ready: Signal,
}

/// Write response channel.
#[derive(Debug, Clone)]
pub struct WriteResponseChannel {
    /// `BRESP`.
    pub resp: Signal,
    /// `BVALID`.
    pub valid: Signal,
    /// `BREADY`.
    pub ready: Signal,
}

/// Read data channel.
#[derive(Debug, Clone)]
pub struct ReadDataChannel {
    /// `RDATA`.
    pub data: Signal,
    /// `RRESP`.
    pub resp: Signal,
    /// `RVALID`.
    pub valid: Signal,
    /// `RREADY`.
    pub ready: Signal,
}

/// The five AXI-Lite channels of a design, bound by signal-name prefix.
#[derive(Debug, Clone)]
pub struct AxiLiteBus {
    prefix: String,
    /// Write address channel.
    pub aw: AddressChannel,
    /// Write data channel.
    pub w: WriteDataChannel,
    /// Write response channel.
    pub b: WriteResponseChannel,
    /// Read address channel.
    pub ar: AddressChannel,
    /// Read data channel.
    pub r: ReadDataChannel,
}

impl AxiLiteBus {
    /// Binds `<prefix>_AWADDR`, `<prefix>_WDATA`, ... on `dut`.
    ///
    /// `AWPROT`, `ARPROT` and `WSTRB` may be absent. Any other missing port
    /// fails with [`SimError::PortNotFound`]. The data width must be a
    /// whole number of bytes.
    pub fn from_prefix(dut: &Dut, prefix: &str) -> Result<Self, SimError> {
        let port = |suffix: &str| dut.port(&format!("{prefix}_{suffix}"));
        let optional = |suffix: &str| {
            let name = format!("{prefix}_{suffix}");
            dut.has_port(&name).then(|| dut.port(&name)).transpose()
        };

        let bus = Self {
            prefix: prefix.to_string(),
            aw: AddressChannel {
                addr: port("AWADDR")?,
                prot: optional("AWPROT")?,
                valid: port("AWVALID")?,
                ready: port("AWREADY")?,
            },
            w: WriteDataChannel {
                data: port("WDATA")?,
                strb: optional("WSTRB")?,
                valid: port("WVALID")?,
                ready: port("WREADY")?,
            },
            b: WriteResponseChannel {
                resp: port("BRESP")?,
                valid: port("BVALID")?,
                ready: port("BREADY")?,
            },
            ar: AddressChannel {
                addr: port("ARADDR")?,
                prot: optional("ARPROT")?,
                valid: port("ARVALID")?,
                ready: port("ARREADY")?,
            },
            r: ReadDataChannel {
                data: port("RDATA")?,
                resp: port("RRESP")?,
                valid: port("RVALID")?,
                ready: port("RREADY")?,
            },
        };

        if bus.data_width() == 0 || !bus.data_width().is_multiple_of(8) {
            return Err(SimError::Bus {
                reason: format!(
                    "{prefix}_WDATA is {} bits wide, expected a multiple of 8",
                    bus.data_width()
                ),
            });
        }
        if bus.r.data.width() != bus.data_width() {
            return Err(SimError::Bus {
                reason: format!(
                    "{prefix}_RDATA ({} bits) and {prefix}_WDATA ({} bits) differ in width",
                    bus.r.data.width(),
                    bus.data_width()
                ),
            });
        }
        debug!(
            "bound AXI-Lite bus `{prefix}`: {}-bit address, {}-bit data, {} ports under the prefix",
            bus.address_width(),
            bus.data_width(),
            dut.ports_with_prefix(prefix)?.len()
        );
        Ok(bus)
    }

    /// The signal-name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Width of `AWADDR`.
    pub fn address_width(&self) -> u32 {
        self.aw.addr.width()
    }

    /// Width of `WDATA`.
    pub fn data_width(&self) -> u32 {
        self.w.data.width()
    }

    /// Bytes per data beat.
    pub fn byte_lanes(&self) -> u32 {
        self.data_width() / 8
    }

    /// Deasserts every handshake signal the master drives.
    pub fn drive_idle(&self) -> Result<(), SimError> {
        let outputs = [
            &self.aw.valid,
            &self.w.valid,
            &self.b.ready,
            &self.ar.valid,
            &self.r.ready,
        ];
        for signal in outputs {
            signal.set(0)?;
        }
        Ok(())
    }
}

/// The operation carried by a [`BusTransaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    /// Write `data` starting at `address`.
    Write {
        /// Byte address.
        address: u64,
        /// Payload.
        data: Vec<u8>,
    },
    /// Read `length` bytes starting at `address`.
    Read {
        /// Byte address.
        address: u64,
        /// Byte count.
        length: usize,
    },
}

/// A bus transaction as listed in a testbench.
///
/// Disabled transactions stay in the sequence but are never issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusTransaction {
    /// What to issue.
    pub op: BusOp,
    /// Whether the transaction is issued at all.
    pub enabled: bool,
    /// Rising clock edges to wait after the transaction completes.
    pub settle_cycles: u64,
}

impl BusTransaction {
    /// Rising clock edges waited after a transaction unless overridden.
    pub const DEFAULT_SETTLE_CYCLES: u64 = 2;

    /// An enabled write.
    pub fn write(address: u64, data: impl Into<Vec<u8>>) -> Self {
        Self::new(BusOp::Write {
            address,
            data: data.into(),
        })
    }

    /// An enabled read.
    pub fn read(address: u64, length: usize) -> Self {
        Self::new(BusOp::Read { address, length })
    }

    fn new(op: BusOp) -> Self {
        Self {
            op,
            enabled: true,
            settle_cycles: Self::DEFAULT_SETTLE_CYCLES,
        }
    }

    /// Marks the transaction as disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Overrides the settle wait.
    pub fn settle(mut self, cycles: u64) -> Self {
        self.settle_cycles = cycles;
        self
    }
}

impl fmt::Display for BusTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            BusOp::Write { address, data } => {
                write!(f, "write {address:#x} [")?;
                for (i, byte) in data.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{byte:02x}")?;
                }
                f.write_str("]")
            }
            BusOp::Read { address, length } => write!(f, "read {address:#x} ({length} bytes)"),
        }
    }
}
