//! Configuration file loading and validation.

use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::{ProjectConfig, TestbenchConfig};

/// File name looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "mmtb.toml";

/// Loads and validates `mmtb.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates configuration text.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::Syntax(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    config.sim.to_sim_config()?;

    for (name, design) in &config.designs {
        for (port, cfg) in &design.ports {
            if cfg.width() == 0 {
                return Err(ConfigError::Invalid(format!(
                    "port `{port}` of design `{name}` has zero width"
                )));
            }
        }
    }

    let mut seen = HashSet::new();
    for tb in &config.testbenches {
        if tb.name.is_empty() {
            return Err(ConfigError::MissingField("testbench.name".to_string()));
        }
        if !seen.insert(tb.name.as_str()) {
            return Err(ConfigError::DuplicateTestbench(tb.name.clone()));
        }
        validate_testbench(config, tb)?;
    }
    Ok(())
}

fn validate_testbench(config: &ProjectConfig, tb: &TestbenchConfig) -> Result<(), ConfigError> {
    let Some(design) = config.designs.get(&tb.design) else {
        return Err(ConfigError::UnknownDesign {
            testbench: tb.name.clone(),
            design: tb.design.clone(),
        });
    };
    if tb.clock.period == 0 {
        return Err(ConfigError::Invalid(format!(
            "testbench `{}`: clock period must be non-zero",
            tb.name
        )));
    }
    let mut ports = vec![tb.clock.port.as_str()];
    if let Some(reset) = &tb.reset {
        ports.push(&reset.port);
        ports.extend(reset.clock_port.as_deref());
    }
    ports.extend(tb.stimulus.iter().map(|s| s.port.as_str()));
    for port in ports {
        if port.is_empty() {
            return Err(ConfigError::MissingField(format!(
                "testbench `{}`: port name",
                tb.name
            )));
        }
    }
    if design.ports.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "design `{}` declares no ports",
            tb.design
        )));
    }
    if !tb.transactions.is_empty() && tb.bus.is_none() {
        return Err(ConfigError::MissingField(format!(
            "testbench `{}`: bus.prefix (required by transactions)",
            tb.name
        )));
    }
    Ok(())
}
