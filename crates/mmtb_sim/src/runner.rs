//! Test registry and pass/fail reporting.
//!
//! A [`TestSuite`] holds named test entry points, each bound to the design it
//! runs against. Every test gets a fresh [`Simulator`] run, so no port state
//! leaks between tests.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use serde::Serialize;

use crate::design::DesignSpec;
use crate::error::SimError;
use crate::kernel::{SimConfig, Simulator, TaskFuture, TestOutcome};
use crate::signal::Dut;
use crate::time::SimTime;

type TestBody = Rc<dyn Fn(Dut) -> TaskFuture>;

/// A registered test entry point.
#[derive(Clone)]
pub struct TestCase {
    name: String,
    design: DesignSpec,
    body: TestBody,
}

impl TestCase {
    /// Registers `body` under `name`, to be run against `design`.
    pub fn new<F, Fut>(name: impl Into<String>, design: DesignSpec, body: F) -> Self
    where
        F: Fn(Dut) -> Fut + 'static,
        Fut: Future<Output = Result<(), SimError>> + 'static,
    {
        Self {
            name: name.into(),
            design,
            body: Rc::new(move |dut| -> TaskFuture { Box::pin(body(dut)) }),
        }
    }

    /// The test's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The design the test runs against.
    pub fn design(&self) -> &DesignSpec {
        &self.design
    }

    /// Runs the test once with the given configuration.
    pub fn run(&self, config: &SimConfig) -> TestOutcome {
        match Simulator::new(self.design.clone(), config.clone()) {
            Ok(simulator) => simulator.run_test(&self.name, |dut| (self.body)(dut)),
            Err(e) => TestOutcome::new(self.name.clone(), SimTime::zero(), Err(e)),
        }
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("design", &self.design.name)
            .finish()
    }
}

/// An ordered collection of tests sharing one [`SimConfig`].
#[derive(Debug, Clone, Default)]
pub struct TestSuite {
    config: SimConfig,
    cases: Vec<TestCase>,
}

impl TestSuite {
    /// Creates an empty suite.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            cases: Vec::new(),
        }
    }

    /// Appends a test.
    pub fn add(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    /// Appends a test, builder style.
    pub fn with(mut self, case: TestCase) -> Self {
        self.add(case);
        self
    }

    /// The suite's configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Names of all registered tests, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.cases.iter().map(TestCase::name).collect()
    }

    /// Selects tests by exact name, or else by substring filter.
    ///
    /// With neither, every test is selected.
    pub fn select(&self, name: Option<&str>, filter: Option<&str>) -> Vec<&TestCase> {
        self.cases
            .iter()
            .filter(|case| {
                if let Some(n) = name {
                    return case.name == n;
                }
                if let Some(f) = filter {
                    return case.name.contains(f);
                }
                true
            })
            .collect()
    }

    /// Runs every selected test in registration order.
    pub fn run(&self, name: Option<&str>, filter: Option<&str>) -> TestReport {
        self.run_with(name, filter, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_outcome` after each test finishes.
    pub fn run_with<F>(
        &self,
        name: Option<&str>,
        filter: Option<&str>,
        mut on_outcome: F,
    ) -> TestReport
    where
        F: FnMut(&TestOutcome),
    {
        let outcomes = self
            .select(name, filter)
            .into_iter()
            .map(|case| {
                let outcome = case.run(&self.config);
                on_outcome(&outcome);
                outcome
            })
            .collect();
        TestReport { outcomes }
    }
}

/// Results of a suite run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestReport {
    /// One outcome per test, in run order.
    pub outcomes: Vec<TestOutcome>,
}

impl TestReport {
    /// Number of passing tests.
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// Number of failing tests.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// True if every test passed. An empty report counts as passing.
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}
