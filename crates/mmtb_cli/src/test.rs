//! `mmtb test`: run testbenches and report pass/fail.
//!
//! Loads the project's testbenches (or the built-ins), selects them by exact
//! name or substring filter, runs each in a fresh simulation and prints a
//! status line per test plus a summary.

use mmtb_sim::{TestOutcome, TestReport};

use crate::project::{self, Origin};
use crate::{GlobalArgs, ReportFormat, TestArgs};

/// Runs the `mmtb test` command.
///
/// Returns exit code 0 if every selected test passes, 1 otherwise.
pub fn run(args: &TestArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let loaded = project::load(global)?;
    let status = !global.quiet && args.format == ReportFormat::Text;

    if status {
        match &loaded.origin {
            Origin::Project { name, version } => eprintln!("   Testing {name} v{version}"),
            Origin::Builtin => eprintln!("   Testing built-in scenarios"),
        }
    }

    let suite = loaded.into_suite();
    let selected = suite.select(args.name.as_deref(), args.filter.as_deref()).len();
    if selected == 0 {
        if !global.quiet {
            eprintln!("warning: no testbenches match the given filter");
        }
        return Ok(0);
    }
    if status {
        eprintln!("   Found {selected} testbench(es)");
    }

    let report = suite.run_with(args.name.as_deref(), args.filter.as_deref(), |outcome| {
        if status {
            print_outcome(outcome);
        }
    });

    match args.format {
        ReportFormat::Text => {
            if status {
                print_summary(&report);
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.all_passed() { 0 } else { 1 })
}

/// Prints one status line.
fn print_outcome(outcome: &TestOutcome) {
    match &outcome.failure {
        None => eprintln!(
            "   PASS  {name} ({time})",
            name = outcome.name,
            time = outcome.final_time,
        ),
        Some(err) => eprintln!(
            "   FAIL  {name}: {err} (at {time})",
            name = outcome.name,
            time = outcome.final_time,
        ),
    }
}

fn print_summary(report: &TestReport) {
    eprintln!();
    eprintln!(
        "   Result: {} passed, {} failed out of {} testbench(es)",
        report.passed(),
        report.failed(),
        report.outcomes.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmtb_config::CONFIG_FILE_NAME;
    use std::fs;
    use tempfile::TempDir;

    const PROJECT: &str = r#"
[project]
name = "demo"
version = "0.1.0"

[designs.mm_mod.ports]
CLK = 1
op_a_address = 32

[[testbench]]
name = "test_mm_mod"
design = "mm_mod"
clock = { port = "CLK", period = 2 }
stimulus = [{ port = "op_a_address", value = 0x42 }]
settle_cycles = 5

[[testbench]]
name = "test_bad_port"
design = "mm_mod"
clock = { port = "CLK", period = 2 }
stimulus = [{ port = "op_b_address", value = 1 }]
settle_cycles = 5
"#;

    fn project() -> (TempDir, GlobalArgs) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), PROJECT).unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(tmp.path().to_string_lossy().into_owned()),
            time_limit: None,
        };
        (tmp, global)
    }

    fn args(name: Option<&str>, filter: Option<&str>) -> TestArgs {
        TestArgs {
            name: name.map(str::to_string),
            filter: filter.map(str::to_string),
            format: ReportFormat::Text,
        }
    }

    #[test]
    fn passing_test_exits_zero() {
        let (_tmp, global) = project();
        assert_eq!(run(&args(Some("test_mm_mod"), None), &global).unwrap(), 0);
    }

    #[test]
    fn failing_test_exits_one() {
        let (_tmp, global) = project();
        assert_eq!(run(&args(None, None), &global).unwrap(), 1);
        assert_eq!(run(&args(None, Some("bad")), &global).unwrap(), 1);
    }

    #[test]
    fn no_match_exits_zero() {
        let (_tmp, global) = project();
        assert_eq!(run(&args(Some("nope"), None), &global).unwrap(), 0);
    }

    #[test]
    fn json_format_runs() {
        let (_tmp, global) = project();
        let mut a = args(Some("test_mm_mod"), None);
        a.format = ReportFormat::Json;
        assert_eq!(run(&a, &global).unwrap(), 0);
    }

    #[test]
    fn invalid_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "[project]\nname = \"\"\n").unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(tmp.path().to_string_lossy().into_owned()),
            time_limit: None,
        };
        assert!(run(&args(None, None), &global).is_err());
    }
}
