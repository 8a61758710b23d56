//! Built-in designs and scenarios.
//!
//! These are used when no `mmtb.toml` is present.

use mmtb_sim::{DesignSpec, PortDecl, SimConfig, TestSuite, TimeUnit};

use crate::bus::BusTransaction;
use crate::driver::{ClockSpec, ResetSpec, Testbench};

/// Name of the AXI-Lite peripheral scenario.
pub const AXI_WRITE_TEST: &str = "test_axi_write_1";

/// Name of the `mm_mod` scenario.
pub const MM_MOD_TEST: &str = "test_mm_mod";

const AXI_ADDR_WIDTH: u32 = 8;
const AXI_DATA_WIDTH: u32 = 32;

/// Port interface of the AXI-Lite memory-mapped peripheral with its BRAM port.
pub fn mm_axi_design() -> DesignSpec {
    let mut design = DesignSpec::new("mm_axi")
        .input("S_AXI_ACLK", 1)
        .input("S_AXI_ARESETN", 1);

    // (name, width, driven by the design)
    let axi = [
        ("AWADDR", AXI_ADDR_WIDTH, false),
        ("AWPROT", 3, false),
        ("AWVALID", 1, false),
        ("AWREADY", 1, true),
        ("WDATA", AXI_DATA_WIDTH, false),
        ("WSTRB", AXI_DATA_WIDTH / 8, false),
        ("WVALID", 1, false),
        ("WREADY", 1, true),
        ("BRESP", 2, true),
        ("BVALID", 1, true),
        ("BREADY", 1, false),
        ("ARADDR", AXI_ADDR_WIDTH, false),
        ("ARPROT", 3, false),
        ("ARVALID", 1, false),
        ("ARREADY", 1, true),
        ("RDATA", AXI_DATA_WIDTH, true),
        ("RRESP", 2, true),
        ("RVALID", 1, true),
        ("RREADY", 1, false),
    ];
    for (suffix, width, output) in axi {
        let name = format!("S_AXI_{suffix}");
        design = design.with_port(if output {
            PortDecl::output(name, width)
        } else {
            PortDecl::input(name, width)
        });
    }

    design
        .output("S_BRAM_ADDR", 32)
        .output("S_BRAM_EN", 1)
        .output("S_BRAM_WE", 4)
        .output("S_BRAM_WRDATA", 32)
        .input("S_BRAM_RDDATA", 32)
}

/// Port interface of `mm_mod`.
pub fn mm_mod_design() -> DesignSpec {
    DesignSpec::new("mm_mod")
        .input("CLK", 1)
        .input("op_a_address", 32)
}

/// Reset for two cycles, park 0x42 on the BRAM read data, wait 20 cycles.
///
/// The register writes and the read-back are listed but disabled.
pub fn axi_write_testbench() -> Testbench {
    let clock = ClockSpec::new("S_AXI_ACLK", 2, TimeUnit::Ns);
    Testbench::new(AXI_WRITE_TEST, mm_axi_design(), clock, 20)
        .with_bus("S_AXI")
        .with_reset(ResetSpec::active_low("S_AXI_ARESETN", 2).counted_on("s_axi_aclk"))
        .drive("S_BRAM_RDDATA", 0x42)
        // REG0
        .transaction(BusTransaction::write(0x0, [0x04]).disabled())
        .transaction(BusTransaction::write(0x0, [0x0c]).disabled())
        // CTRL
        .transaction(BusTransaction::write(0x48, [0x00]).disabled())
        .transaction(BusTransaction::read(0xc, 1).settle(0).disabled())
}

/// Drive 0x42 onto `op_a_address` and wait 5 cycles.
pub fn mm_mod_testbench() -> Testbench {
    let clock = ClockSpec::new("CLK", 2, TimeUnit::Ns);
    Testbench::new(MM_MOD_TEST, mm_mod_design(), clock, 5).drive("op_a_address", 0x42)
}

/// Both built-in scenarios, in registration order.
pub fn builtin_testbenches() -> Vec<Testbench> {
    vec![axi_write_testbench(), mm_mod_testbench()]
}

/// Registers `testbenches` in a suite running with `config`.
pub fn build_suite(
    config: SimConfig,
    testbenches: impl IntoIterator<Item = Testbench>,
) -> TestSuite {
    testbenches
        .into_iter()
        .fold(TestSuite::new(config), |suite, tb| suite.with(tb.into_case()))
}

/// The built-in suite.
pub fn builtin_suite(config: SimConfig) -> TestSuite {
    build_suite(config, builtin_testbenches())
}
