//! Error types for the testbench simulation environment.
//!
//! Every failure a testbench can hit is a variant of [`SimError`]. None of
//! them are recovered from inside a test: they propagate out of the test body
//! and mark the test as failed.

use mmtb_common::ValueError;

use crate::time::SimTime;

/// Errors that can occur while building or running a testbench simulation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A port name does not exist on the design.
    #[error("design `{design}` has no port named `{name}`")]
    PortNotFound {
        /// Name of the design that was searched.
        design: String,
        /// The port name that was requested.
        name: String,
    },

    /// A case-insensitive lookup matched more than one port.
    #[error("port name `{name}` is ambiguous, matches: {}", candidates.join(", "))]
    AmbiguousPort {
        /// The port name that was requested.
        name: String,
        /// All ports that match ignoring case.
        candidates: Vec<String>,
    },

    /// A design declared the same port twice.
    #[error("design `{design}` declares port `{name}` more than once")]
    DuplicatePort {
        /// Name of the offending design.
        design: String,
        /// The duplicated port name.
        name: String,
    },

    /// A value assigned to a port does not fit its width.
    #[error("cannot assign to `{port}`: {source}")]
    ValueTooWide {
        /// The port being assigned.
        port: String,
        /// Why the value was rejected.
        source: ValueError,
    },

    /// The simulation ran past the configured time limit.
    #[error("simulation timed out at {limit}")]
    Timeout {
        /// The configured time limit.
        limit: SimTime,
    },

    /// The test is waiting but nothing can ever wake it up.
    #[error("simulation stalled at {time}: no pending events")]
    Stalled {
        /// Time at which the event queue ran dry.
        time: SimTime,
    },

    /// A port or trigger was used after its test finished.
    #[error("simulation has already ended")]
    SimulationEnded,

    /// A clock period that cannot be split into two equal halves.
    #[error("invalid clock period of {period_fs} fs (must be non-zero and even)")]
    InvalidClockPeriod {
        /// The requested period in femtoseconds.
        period_fs: u64,
    },

    /// A time unit string that is not one of fs, ps, ns, us, ms, s.
    #[error("unknown time unit `{0}` (use fs, ps, ns, us, ms, or s)")]
    UnknownTimeUnit(String),

    /// A duration string that could not be parsed.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// A bus-master transaction failed.
    #[error("bus transaction failed: {reason}")]
    Bus {
        /// Description of the failure.
        reason: String,
    },

    /// A check inside a test body did not hold.
    #[error("assertion failed at {time}: {message}")]
    AssertionFailed {
        /// Simulation time of the failed check.
        time: SimTime,
        /// What was expected.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_not_found_display() {
        let e = SimError::PortNotFound {
            design: "mm_mod".into(),
            name: "op_b_address".into(),
        };
        assert_eq!(
            e.to_string(),
            "design `mm_mod` has no port named `op_b_address`"
        );
    }

    #[test]
    fn ambiguous_port_display() {
        let e = SimError::AmbiguousPort {
            name: "clk".into(),
            candidates: vec!["CLK".into(), "Clk".into()],
        };
        assert_eq!(e.to_string(), "port name `clk` is ambiguous, matches: CLK, Clk");
    }

    #[test]
    fn value_too_wide_display() {
        let e = SimError::ValueTooWide {
            port: "S_AXI_ARESETN".into(),
            source: ValueError::TooWide {
                required: 2,
                width: 1,
            },
        };
        assert_eq!(
            e.to_string(),
            "cannot assign to `S_AXI_ARESETN`: value needs 2 bits but only 1 are available"
        );
    }

    #[test]
    fn timeout_display() {
        let e = SimError::Timeout {
            limit: SimTime::from_ns(100),
        };
        assert_eq!(e.to_string(), "simulation timed out at 100 ns");
    }

    #[test]
    fn stalled_display() {
        let e = SimError::Stalled {
            time: SimTime::zero(),
        };
        assert_eq!(e.to_string(), "simulation stalled at 0 fs: no pending events");
    }

    #[test]
    fn invalid_clock_period_display() {
        let e = SimError::InvalidClockPeriod { period_fs: 3 };
        assert_eq!(
            e.to_string(),
            "invalid clock period of 3 fs (must be non-zero and even)"
        );
    }

    #[test]
    fn bus_display() {
        let e = SimError::Bus {
            reason: "SLVERR at 0x48".into(),
        };
        assert_eq!(e.to_string(), "bus transaction failed: SLVERR at 0x48");
    }

    #[test]
    fn assertion_failed_display() {
        let e = SimError::AssertionFailed {
            time: SimTime::from_ns(3),
            message: "reset released early".into(),
        };
        assert_eq!(e.to_string(), "assertion failed at 3 ns: reset released early");
    }
}
