//! `mmtb list`: print the registered testbench names.

use crate::project;
use crate::GlobalArgs;

/// Prints one testbench name per line on stdout, with its design.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let loaded = project::load(global)?;
    for tb in &loaded.testbenches {
        if global.verbose {
            println!("{} ({})", tb.name(), tb.design().name);
        } else {
            println!("{}", tb.name());
        }
    }
    Ok(0)
}
