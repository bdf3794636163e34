//! Allocation admission and accounting for queues.
//!
//! Every allocation a [`Queue`](crate::Queue) makes (the container, each node,
//! each owned value copy) is first admitted by an [`AllocGate`], and every
//! release is reported back to it. This gives the command harness two tools:
//!
//! - [`FaultInjector`] - refuse every Nth allocation to exercise the
//!   allocation-failure paths deterministically
//! - [`AllocTracker`] - count live allocations so teardown can be checked for
//!   leaks and double releases
//!
//! Gates take `&self` and keep their state in shared cells, so a caller can
//! hold a clone of a gate while the queue owns another clone of the same one.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::AllocKind;

/// Admission hook consulted for each queue allocation.
pub trait AllocGate {
    /// Decide whether an allocation of `bytes` for `what` may proceed.
    fn admit(&self, what: AllocKind, bytes: usize) -> bool;

    /// Report that a previously admitted allocation was released.
    fn release(&self, what: AllocKind, bytes: usize) {
        let _ = (what, bytes);
    }
}

/// Gate that admits everything and tracks nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGate;

impl AllocGate for SystemGate {
    fn admit(&self, _what: AllocKind, _bytes: usize) -> bool {
        true
    }
}

#[derive(Debug, Default)]
struct FaultState {
    period: Cell<u32>,
    requests: Cell<u64>,
    refused: Cell<u64>,
}

/// Gate that refuses every Nth allocation request.
///
/// A period of 0 disables injection. Changing the period restarts the request
/// count, so the first refusal lands exactly `period` requests later.
#[derive(Debug, Clone, Default)]
pub struct FaultInjector {
    state: Rc<FaultState>,
}

impl FaultInjector {
    /// Create an injector refusing every `period`th request (0 = never).
    #[must_use]
    pub fn new(period: u32) -> Self {
        let injector = Self::default();
        injector.set_period(period);
        injector
    }

    /// Change the fault period. Takes effect for the next request.
    pub fn set_period(&self, period: u32) {
        self.state.period.set(period);
        self.state.requests.set(0);
    }

    /// Current fault period.
    #[must_use]
    pub fn period(&self) -> u32 {
        self.state.period.get()
    }

    /// Whether any allocation can currently be refused.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.period() > 0
    }

    /// Number of requests refused so far.
    #[must_use]
    pub fn refused(&self) -> u64 {
        self.state.refused.get()
    }
}

impl AllocGate for FaultInjector {
    fn admit(&self, _what: AllocKind, _bytes: usize) -> bool {
        let period = self.state.period.get();
        if period == 0 {
            return true;
        }

        let requests = self.state.requests.get() + 1;
        self.state.requests.set(requests);

        if requests % u64::from(period) == 0 {
            self.state.refused.set(self.state.refused.get() + 1);
            false
        } else {
            true
        }
    }
}

/// Point-in-time allocation counters for one [`AllocKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStats {
    /// Allocations admitted.
    pub allocated: u64,
    /// Allocations released.
    pub released: u64,
    /// Releases reported with no matching live allocation.
    pub over_released: u64,
    /// Bytes currently live.
    pub live_bytes: usize,
}

impl KindStats {
    /// Allocations admitted but not yet released.
    #[must_use]
    pub fn live(&self) -> u64 {
        self.allocated - self.released
    }
}

/// Snapshot of an [`AllocTracker`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    pub queues: KindStats,
    pub nodes: KindStats,
    pub values: KindStats,
}

impl AllocStats {
    /// Total live allocations across all kinds.
    #[must_use]
    pub fn live_blocks(&self) -> u64 {
        self.queues.live() + self.nodes.live() + self.values.live()
    }

    /// Total releases that had no live allocation to release.
    #[must_use]
    pub fn over_released(&self) -> u64 {
        self.queues.over_released + self.nodes.over_released + self.values.over_released
    }
}

struct TrackerState {
    inner: Box<dyn AllocGate>,
    stats: Cell<AllocStats>,
}

/// Gate that counts admitted and released allocations.
///
/// Admission is delegated to an inner gate (by default [`SystemGate`]); only
/// allocations the inner gate admits are counted.
#[derive(Clone)]
pub struct AllocTracker {
    state: Rc<TrackerState>,
}

impl Default for AllocTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AllocTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocTracker")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl AllocTracker {
    /// Create a tracker that admits everything.
    #[must_use]
    pub fn new() -> Self {
        Self::wrapping(SystemGate)
    }

    /// Create a tracker that delegates admission to `inner`.
    pub fn wrapping(inner: impl AllocGate + 'static) -> Self {
        Self {
            state: Rc::new(TrackerState {
                inner: Box::new(inner),
                stats: Cell::new(AllocStats::default()),
            }),
        }
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> AllocStats {
        self.state.stats.get()
    }

    /// Live allocations across all kinds.
    #[must_use]
    pub fn live_blocks(&self) -> u64 {
        self.stats().live_blocks()
    }

    fn update(&self, what: AllocKind, f: impl FnOnce(&mut KindStats)) {
        let mut stats = self.state.stats.get();
        let kind = match what {
            AllocKind::Queue => &mut stats.queues,
            AllocKind::Node => &mut stats.nodes,
            AllocKind::Value => &mut stats.values,
        };
        f(kind);
        self.state.stats.set(stats);
    }
}

impl AllocGate for AllocTracker {
    fn admit(&self, what: AllocKind, bytes: usize) -> bool {
        if !self.state.inner.admit(what, bytes) {
            return false;
        }
        self.update(what, |kind| {
            kind.allocated += 1;
            kind.live_bytes += bytes;
        });
        true
    }

    fn release(&self, what: AllocKind, bytes: usize) {
        self.update(what, |kind| {
            if kind.live() == 0 {
                kind.over_released += 1;
            } else {
                kind.released += 1;
                kind.live_bytes = kind.live_bytes.saturating_sub(bytes);
            }
        });
        self.state.inner.release(what, bytes);
    }
}
