//! Free-running clock generator.

use log::debug;

use crate::error::SimError;
use crate::signal::Signal;
use crate::time::{SimTime, TimeUnit};
use crate::trigger::Timer;

/// Drives a square wave with a 50% duty cycle onto a 1-bit port.
///
/// ```ignore
/// let clock = Clock::new(dut.port("CLK")?, 2, TimeUnit::Ns)?;
/// dut.sim().spawn(clock.start(false))?;
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    signal: Signal,
    half_period_fs: u64,
}

impl Clock {
    /// Creates a clock of the given period.
    ///
    /// The period must be non-zero and divisible into two equal halves at
    /// femtosecond resolution.
    pub fn new(signal: Signal, period: u64, unit: TimeUnit) -> Result<Self, SimError> {
        let period_fs = unit.to_fs(period);
        if period_fs == 0 || !period_fs.is_multiple_of(2) {
            return Err(SimError::InvalidClockPeriod { period_fs });
        }
        Ok(Self {
            signal,
            half_period_fs: period_fs / 2,
        })
    }

    /// The full clock period.
    pub fn period(&self) -> SimTime {
        SimTime::from_fs(self.half_period_fs * 2)
    }

    /// Time between consecutive edges.
    pub fn half_period(&self) -> SimTime {
        SimTime::from_fs(self.half_period_fs)
    }

    /// The driven port.
    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    /// Runs the clock forever. Meant to be handed to [`Sim::spawn`](crate::Sim::spawn).
    ///
    /// With `start_high == false` the port is driven low immediately and the
    /// first rising edge comes one half period later.
    pub async fn start(self, start_high: bool) -> Result<(), SimError> {
        let sim = self.signal.sim().clone();
        let (first, second) = if start_high { (1, 0) } else { (0, 1) };
        debug!(
            "clock on `{}` started at {}: period {}, start_high={start_high}",
            self.signal.name(),
            sim.now(),
            self.period()
        );
        loop {
            self.signal.set(first)?;
            Timer::from_fs(&sim, self.half_period_fs).await?;
            self.signal.set(second)?;
            Timer::from_fs(&sim, self.half_period_fs).await?;
        }
    }
}
