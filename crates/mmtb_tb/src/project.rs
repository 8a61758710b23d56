//! Builds testbenches from a loaded `mmtb.toml`.

use mmtb_config::{ConfigError, ProjectConfig, TestbenchConfig, TransactionConfig};
use mmtb_sim::TestSuite;

use crate::bus::BusTransaction;
use crate::driver::{ClockSpec, ResetSpec, Testbench};
use crate::scenarios::build_suite;

/// Converts one `[[testbench]]` entry.
pub fn testbench_from_config(
    project: &ProjectConfig,
    config: &TestbenchConfig,
) -> Result<Testbench, ConfigError> {
    let design = project
        .designs
        .get(&config.design)
        .ok_or_else(|| ConfigError::UnknownDesign {
            testbench: config.name.clone(),
            design: config.design.clone(),
        })?
        .to_spec(&config.design);

    let clock = ClockSpec {
        port: config.clock.port.clone(),
        period: config.clock.period,
        unit: config.clock.units,
        start_high: config.clock.start_high,
    };
    let mut tb = Testbench::new(&config.name, design, clock, config.settle_cycles);

    if let Some(bus) = &config.bus {
        tb = tb.with_bus(&bus.prefix);
    }
    if let Some(reset) = &config.reset {
        tb = tb.with_reset(ResetSpec {
            port: reset.port.clone(),
            cycles: reset.cycles,
            active_low: reset.active_low,
            edge_port: reset.clock_port.clone(),
        });
    }
    for stimulus in &config.stimulus {
        tb = tb.drive(&stimulus.port, stimulus.value);
    }
    for txn in &config.transactions {
        tb = tb.transaction(transaction_from_config(txn));
    }
    Ok(tb)
}

fn transaction_from_config(config: &TransactionConfig) -> BusTransaction {
    let (txn, enabled, settle) = match config {
        TransactionConfig::Write {
            address,
            data,
            enabled,
            settle_cycles,
        } => (
            BusTransaction::write(*address, data.clone()),
            *enabled,
            *settle_cycles,
        ),
        TransactionConfig::Read {
            address,
            length,
            enabled,
            settle_cycles,
        } => (
            BusTransaction::read(*address, *length),
            *enabled,
            *settle_cycles,
        ),
    };
    let txn = txn.settle(settle);
    if enabled {
        txn
    } else {
        txn.disabled()
    }
}

/// Converts every `[[testbench]]` entry, in declaration order.
pub fn testbenches_from_config(project: &ProjectConfig) -> Result<Vec<Testbench>, ConfigError> {
    project
        .testbenches
        .iter()
        .map(|tb| testbench_from_config(project, tb))
        .collect()
}

/// Builds the suite described by `project`, including its `[sim]` settings.
pub fn suite_from_config(project: &ProjectConfig) -> Result<TestSuite, ConfigError> {
    let config = project.sim.to_sim_config()?;
    Ok(build_suite(config, testbenches_from_config(project)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusOp;
    use mmtb_config::load_config_from_str;
    use mmtb_sim::{SimTime, TimeUnit};

    const MM_MOD: &str = r#"
[project]
name = "mm"

[sim]
time_limit = "100ns"

[designs.mm_mod.ports]
CLK = 1
op_a_address = 32

[[testbench]]
name = "test_mm_mod"
design = "mm_mod"
clock = { port = "CLK", period = 2, units = "ns" }
stimulus = [{ port = "op_a_address", value = 0x42 }]
settle_cycles = 5
"#;

    #[test]
    fn converts_testbench_entry() {
        let project = load_config_from_str(MM_MOD).unwrap();
        let tbs = testbenches_from_config(&project).unwrap();
        assert_eq!(tbs.len(), 1);
        let tb = &tbs[0];
        assert_eq!(tb.name(), "test_mm_mod");
        assert_eq!(tb.design().name, "mm_mod");
        assert_eq!(tb.clock().unit, TimeUnit::Ns);
        assert_eq!(tb.stimulus()[0].value, 0x42);
        assert!(tb.reset().is_none());
        assert_eq!(tb.settle_cycles(), 5);
    }

    #[test]
    fn suite_runs_with_sim_settings() {
        let project = load_config_from_str(MM_MOD).unwrap();
        let suite = suite_from_config(&project).unwrap();
        assert_eq!(suite.config().time_limit, Some(SimTime::from_ns(100)));
        let report = suite.run(None, None);
        assert!(report.all_passed());
        assert_eq!(report.outcomes[0].final_time, SimTime::from_ns(9));
    }

    #[test]
    fn transaction_flags_carry_over() {
        let write = TransactionConfig::Write {
            address: 0x48,
            data: vec![0],
            enabled: false,
            settle_cycles: 2,
        };
        let txn = transaction_from_config(&write);
        assert!(!txn.enabled);
        assert_eq!(
            txn.op,
            BusOp::Write {
                address: 0x48,
                data: vec![0]
            }
        );
        let read = TransactionConfig::Read {
            address: 0xc,
            length: 1,
            enabled: true,
            settle_cycles: 0,
        };
        let txn = transaction_from_config(&read);
        assert!(txn.enabled);
        assert_eq!(txn.settle_cycles, 0);
    }
}
