//! Configuration types deserialized from `mmtb.toml`.

use std::collections::BTreeMap;

use mmtb_sim::{parse_duration, DesignSpec, Direction, PortDecl, SimConfig, TimeUnit};
use serde::Deserialize;

use crate::error::ConfigError;

/// The top-level configuration parsed from `mmtb.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata.
    pub project: ProjectMeta,
    /// Simulator settings shared by every testbench.
    #[serde(default)]
    pub sim: SimSettings,
    /// Port interfaces of the designs under test, keyed by design name.
    #[serde(default)]
    pub designs: BTreeMap<String, DesignConfig>,
    /// Testbench scenarios, in declaration order.
    #[serde(default, rename = "testbench")]
    pub testbenches: Vec<TestbenchConfig>,
}

/// Project metadata.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// The `[sim]` table.
#[derive(Debug, Deserialize)]
pub struct SimSettings {
    /// Simulated time limit per test, e.g. `"1ms"`. Absent means the default.
    #[serde(default)]
    pub time_limit: Option<String>,
    /// Disables the time limit entirely.
    #[serde(default)]
    pub unlimited: bool,
    /// Whether port lookups fall back to a case-insensitive match.
    #[serde(default = "default_true")]
    pub case_insensitive: bool,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            time_limit: None,
            unlimited: false,
            case_insensitive: true,
        }
    }
}

impl SimSettings {
    /// Converts the table into a [`SimConfig`], parsing the time limit.
    pub fn to_sim_config(&self) -> Result<SimConfig, ConfigError> {
        let mut config = SimConfig {
            case_insensitive_ports: self.case_insensitive,
            ..SimConfig::default()
        };
        if self.unlimited {
            config.time_limit = None;
        } else if let Some(limit) = &self.time_limit {
            let limit = parse_duration(limit)
                .map_err(|e| ConfigError::Invalid(format!("sim.time_limit: {e}")))?;
            config.time_limit = Some(limit);
        }
        Ok(config)
    }
}

/// A `[designs.<name>]` table.
#[derive(Debug, Default, Deserialize)]
pub struct DesignConfig {
    /// Ports keyed by HDL name.
    #[serde(default)]
    pub ports: BTreeMap<String, PortConfig>,
}

impl DesignConfig {
    /// Builds the port-level design description for `name`.
    pub fn to_spec(&self, name: &str) -> DesignSpec {
        self.ports
            .iter()
            .fold(DesignSpec::new(name), |spec, (port, cfg)| {
                spec.with_port(PortDecl {
                    name: port.clone(),
                    width: cfg.width(),
                    direction: cfg.direction(),
                })
            })
    }
}

/// A port declaration: either a bare width or a table with a direction.
///
/// ```toml
/// ports = { CLK = 1, S_BRAM_RDDATA = { width = 32, direction = "input" } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortConfig {
    /// An input port of the given width.
    Width(u32),
    /// A port with an explicit direction.
    Detailed {
        /// Bit width.
        width: u32,
        /// Port direction.
        #[serde(default)]
        direction: Direction,
    },
}

impl PortConfig {
    /// The declared width.
    pub fn width(&self) -> u32 {
        match self {
            PortConfig::Width(w) => *w,
            PortConfig::Detailed { width, .. } => *width,
        }
    }

    /// The declared direction.
    pub fn direction(&self) -> Direction {
        match self {
            PortConfig::Width(_) => Direction::Input,
            PortConfig::Detailed { direction, .. } => *direction,
        }
    }
}

/// One `[[testbench]]` entry.
#[derive(Debug, Deserialize)]
pub struct TestbenchConfig {
    /// Test name, as selected on the command line.
    pub name: String,
    /// Name of the design in `[designs]` the test runs against.
    pub design: String,
    /// Free-running clock.
    pub clock: ClockConfig,
    /// Optional reset sequence, run after the clock starts.
    #[serde(default)]
    pub reset: Option<ResetConfig>,
    /// Optional bus interface used by `transaction` entries.
    #[serde(default)]
    pub bus: Option<BusConfig>,
    /// Static values driven once and never changed.
    #[serde(default)]
    pub stimulus: Vec<StimulusConfig>,
    /// Bus transactions, in issue order.
    #[serde(default, rename = "transaction")]
    pub transactions: Vec<TransactionConfig>,
    /// Rising clock edges to wait before the test ends.
    pub settle_cycles: u64,
}

/// The `clock` table of a testbench.
#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    /// Port driven by the clock.
    pub port: String,
    /// Period in `units`.
    pub period: u64,
    /// Unit of `period`. Defaults to nanoseconds.
    #[serde(default)]
    pub units: TimeUnit,
    /// Whether the clock starts high.
    #[serde(default)]
    pub start_high: bool,
}

/// The `reset` table of a testbench.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetConfig {
    /// Reset port.
    pub port: String,
    /// Rising clock edges to hold reset asserted.
    #[serde(default = "default_reset_cycles")]
    pub cycles: u64,
    /// Whether reset is asserted by driving 0.
    #[serde(default = "default_true")]
    pub active_low: bool,
    /// Optional port whose edges time the reset instead of the clock port.
    #[serde(default)]
    pub clock_port: Option<String>,
}

/// The `bus` table of a testbench.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Common signal prefix, e.g. `"S_AXI"`.
    pub prefix: String,
}

/// A static value driven onto a port.
#[derive(Debug, Clone, Deserialize)]
pub struct StimulusConfig {
    /// Target port.
    pub port: String,
    /// Value to drive.
    pub value: u64,
}

/// A bus transaction entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransactionConfig {
    /// A write of `data` starting at `address`.
    Write {
        /// Byte address.
        address: u64,
        /// Bytes to write.
        data: Vec<u8>,
        /// Disabled transactions are kept but never issued.
        #[serde(default = "default_true")]
        enabled: bool,
        /// Rising clock edges to wait after the transaction.
        #[serde(default = "default_transaction_settle")]
        settle_cycles: u64,
    },
    /// A read of `length` bytes starting at `address`.
    Read {
        /// Byte address.
        address: u64,
        /// Number of bytes to read.
        length: usize,
        /// Disabled transactions are kept but never issued.
        #[serde(default = "default_true")]
        enabled: bool,
        /// Rising clock edges to wait after the transaction.
        #[serde(default = "default_transaction_settle")]
        settle_cycles: u64,
    },
}

fn default_true() -> bool {
    true
}

fn default_reset_cycles() -> u64 {
    2
}

fn default_transaction_settle() -> u64 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmtb_sim::SimTime;

    #[test]
    fn sim_settings_defaults() {
        let config = SimSettings::default().to_sim_config().unwrap();
        assert_eq!(config.time_limit, SimConfig::default().time_limit);
        assert!(config.case_insensitive_ports);
    }

    #[test]
    fn sim_settings_time_limit() {
        let settings = SimSettings {
            time_limit: Some("500 ns".into()),
            unlimited: false,
            case_insensitive: false,
        };
        let config = settings.to_sim_config().unwrap();
        assert_eq!(config.time_limit, Some(SimTime::from_ns(500)));
        assert!(!config.case_insensitive_ports);
    }

    #[test]
    fn sim_settings_unlimited_wins() {
        let settings = SimSettings {
            time_limit: Some("500ns".into()),
            unlimited: true,
            case_insensitive: true,
        };
        assert_eq!(settings.to_sim_config().unwrap().time_limit, None);
    }

    #[test]
    fn bad_time_limit_is_a_validation_error() {
        let settings = SimSettings {
            time_limit: Some("soon".into()),
            ..SimSettings::default()
        };
        assert!(matches!(
            settings.to_sim_config(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn design_to_spec() {
        let mut ports = BTreeMap::new();
        ports.insert("CLK".to_string(), PortConfig::Width(1));
        ports.insert(
            "done".to_string(),
            PortConfig::Detailed {
                width: 1,
                direction: Direction::Output,
            },
        );
        let spec = DesignConfig { ports }.to_spec("mm_mod");
        assert_eq!(spec.name, "mm_mod");
        assert_eq!(spec.ports.len(), 2);
        assert_eq!(spec.ports[0], PortDecl::input("CLK", 1));
        assert_eq!(spec.ports[1], PortDecl::output("done", 1));
    }
}
