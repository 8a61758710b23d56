//! Awaitable triggers that suspend a task until simulated time or a port moves.
//!
//! Both trigger kinds arm themselves on first poll: a [`Timer`] measures its
//! delay from the time it is first awaited, and an [`EdgeTrigger`] counts
//! edges from the moment it is first awaited.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::SimError;
use crate::kernel::{EdgeKind, Sim};
use crate::signal::Signal;
use crate::time::{SimTime, TimeUnit};

/// Resolves after a fixed amount of simulated time.
#[derive(Debug)]
#[must_use = "triggers do nothing unless awaited"]
pub struct Timer {
    sim: Sim,
    delay_fs: u64,
    deadline: Option<SimTime>,
}

impl Timer {
    /// A timer of `amount` `unit`s.
    pub fn new(sim: &Sim, amount: u64, unit: TimeUnit) -> Self {
        Self::from_fs(sim, unit.to_fs(amount))
    }

    /// A timer of `delay_fs` femtoseconds. A zero delay resolves immediately.
    pub fn from_fs(sim: &Sim, delay_fs: u64) -> Self {
        Self {
            sim: sim.clone(),
            delay_fs,
            deadline: None,
        }
    }
}

impl Future for Timer {
    type Output = Result<(), SimError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut state = match this.sim.live() {
            Ok(state) => state,
            Err(e) => return Poll::Ready(Err(e)),
        };
        match this.deadline {
            Some(deadline) if state.now >= deadline => Poll::Ready(Ok(())),
            Some(_) => Poll::Pending,
            None if this.delay_fs == 0 => Poll::Ready(Ok(())),
            None => {
                let deadline = state.now.after(this.delay_fs);
                this.deadline = Some(deadline);
                state.schedule_timer(deadline, cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// Resolves after a number of edges of one kind on a port.
#[derive(Debug)]
#[must_use = "triggers do nothing unless awaited"]
pub struct EdgeTrigger {
    signal: Signal,
    kind: EdgeKind,
    count: u64,
    start: Option<u64>,
}

impl EdgeTrigger {
    /// Waits for `count` edges of `kind` on `signal`.
    pub fn new(signal: Signal, kind: EdgeKind, count: u64) -> Self {
        Self {
            signal,
            kind,
            count,
            start: None,
        }
    }
}

impl Future for EdgeTrigger {
    type Output = Result<(), SimError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut state = match this.signal.sim().live() {
            Ok(state) => state,
            Err(e) => return Poll::Ready(Err(e)),
        };
        let port = &mut state.ports[this.signal.index()];
        let seen = port.edge_count(this.kind);
        let start = *this.start.get_or_insert(seen);
        if seen - start >= this.count {
            return Poll::Ready(Ok(()));
        }
        port.add_waiter(cx.waker());
        Poll::Pending
    }
}

/// Waits for the next rising edge of `signal`.
pub fn rising_edge(signal: &Signal) -> EdgeTrigger {
    signal.rising_edge()
}

/// Waits for the next falling edge of `signal`.
pub fn falling_edge(signal: &Signal) -> EdgeTrigger {
    signal.falling_edge()
}

/// Waits for `cycles` rising edges of `clock`.
pub fn clock_cycles(clock: &Signal, cycles: u64) -> EdgeTrigger {
    clock.clock_cycles(cycles)
}
