//! Port-level description of a design under test.
//!
//! The environment does not model DUT logic. A [`DesignSpec`] only lists the
//! ports a testbench may drive or observe, with their widths.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::SimError;

/// Direction of a port as seen from the design.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Driven by the testbench.
    #[default]
    Input,
    /// Driven by the design.
    Output,
    /// Bidirectional.
    Inout,
}

/// A single named port on a design.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDecl {
    /// Port name as it appears in the HDL.
    pub name: String,
    /// Bit width.
    pub width: u32,
    /// Port direction.
    #[serde(default)]
    pub direction: Direction,
}

impl PortDecl {
    /// Declares an input port.
    pub fn input(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
            direction: Direction::Input,
        }
    }

    /// Declares an output port.
    pub fn output(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
            direction: Direction::Output,
        }
    }
}

/// The interface of a design under test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSpec {
    /// Top-level module name.
    pub name: String,
    /// Ports in declaration order.
    pub ports: Vec<PortDecl>,
}

impl DesignSpec {
    /// Creates a design with no ports.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: Vec::new(),
        }
    }

    /// Adds a port, builder style.
    pub fn with_port(mut self, port: PortDecl) -> Self {
        self.ports.push(port);
        self
    }

    /// Adds an input port, builder style.
    pub fn input(self, name: impl Into<String>, width: u32) -> Self {
        self.with_port(PortDecl::input(name, width))
    }

    /// Adds an output port, builder style.
    pub fn output(self, name: impl Into<String>, width: u32) -> Self {
        self.with_port(PortDecl::output(name, width))
    }

    /// Checks that no port name is declared twice.
    pub fn validate(&self) -> Result<(), SimError> {
        let mut seen = HashSet::new();
        for port in &self.ports {
            if !seen.insert(port.name.as_str()) {
                return Err(SimError::DuplicatePort {
                    design: self.name.clone(),
                    name: port.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_declaration_order() {
        let spec = DesignSpec::new("mm_mod")
            .input("CLK", 1)
            .input("op_a_address", 32)
            .output("op_a_data", 32);
        let names: Vec<_> = spec.ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["CLK", "op_a_address", "op_a_data"]);
        assert_eq!(spec.ports[2].direction, Direction::Output);
    }

    #[test]
    fn validate_rejects_duplicates() {
        let spec = DesignSpec::new("dup").input("a", 1).input("a", 2);
        assert_eq!(
            spec.validate(),
            Err(SimError::DuplicatePort {
                design: "dup".into(),
                name: "a".into()
            })
        );
    }

    #[test]
    fn validate_allows_names_differing_in_case() {
        let spec = DesignSpec::new("d").input("clk", 1).input("CLK", 1);
        assert!(spec.validate().is_ok());
    }
}
