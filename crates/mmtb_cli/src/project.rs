//! Locating `mmtb.toml` and turning it (or the built-ins) into a test suite.

use std::path::{Path, PathBuf};

use mmtb_config::CONFIG_FILE_NAME;
use mmtb_sim::{parse_duration, SimConfig, TestSuite};
use mmtb_tb::{build_suite, builtin_testbenches, testbenches_from_config, Testbench};

use crate::GlobalArgs;

/// Where the testbenches came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A project configuration.
    Project {
        /// `project.name`.
        name: String,
        /// `project.version`.
        version: String,
    },
    /// No configuration was found; the built-in scenarios are used.
    Builtin,
}

/// Testbenches ready to be registered in a suite.
pub struct LoadedProject {
    /// Where they came from.
    pub origin: Origin,
    /// Simulator settings after command-line overrides.
    pub config: SimConfig,
    /// Testbenches in declaration order.
    pub testbenches: Vec<Testbench>,
}

impl LoadedProject {
    /// Registers the testbenches in a suite.
    pub fn into_suite(self) -> TestSuite {
        build_suite(self.config, self.testbenches)
    }
}

/// Walks up from `start` looking for the nearest directory containing `mmtb.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}

/// Resolves the project directory.
///
/// `--config` may name the file itself or its directory. Without it, the
/// current directory and its parents are searched; `None` means no project.
pub fn resolve_project_root(
    global: &GlobalArgs,
) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    match &global.config {
        Some(config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                Ok(Some(
                    p.parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| PathBuf::from(".")),
                ))
            } else {
                Ok(Some(p))
            }
        }
        None => Ok(find_project_root(&std::env::current_dir()?)),
    }
}

/// Loads the project's testbenches, or the built-ins if there is no project.
pub fn load(global: &GlobalArgs) -> Result<LoadedProject, Box<dyn std::error::Error>> {
    let mut loaded = match resolve_project_root(global)? {
        Some(dir) => {
            log::debug!("loading {}", dir.join(CONFIG_FILE_NAME).display());
            let project = mmtb_config::load_config(&dir)?;
            LoadedProject {
                origin: Origin::Project {
                    name: project.project.name.clone(),
                    version: project.project.version.clone(),
                },
                config: project.sim.to_sim_config()?,
                testbenches: testbenches_from_config(&project)?,
            }
        }
        None => {
            log::debug!("no {CONFIG_FILE_NAME} found, using built-in scenarios");
            LoadedProject {
                origin: Origin::Builtin,
                config: SimConfig::default(),
                testbenches: builtin_testbenches(),
            }
        }
    };

    if let Some(limit) = &global.time_limit {
        loaded.config.time_limit = Some(parse_duration(limit)?);
    }
    Ok(loaded)
}
