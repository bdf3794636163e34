//! Nullable-handle queue operations.
//!
//! These functions mirror the queue's external boundary as a driver sees it:
//! a queue may be absent, and every outcome is a plain flag, count or no-op.
//! An absent queue and an empty queue are indistinguishable to the caller.

use crate::alloc::AllocGate;
use crate::queue::Queue;

/// Create an empty queue that admits every allocation.
#[must_use]
pub fn new() -> Option<Queue> {
    Some(Queue::new())
}

/// Create an empty queue through `gate`; `None` if the gate refuses it.
pub fn new_with_gate(gate: impl AllocGate + 'static) -> Option<Queue> {
    Queue::try_with_gate(gate).ok()
}

/// Release a queue and everything it holds. No-op for `None`.
pub fn destroy(q: Option<Queue>) {
    drop(q);
}

/// Insert a copy of `text` at the head. `false` if absent or out of memory.
pub fn insert_head(q: Option<&mut Queue>, text: &str) -> bool {
    q.is_some_and(|q| q.insert_head(text).is_ok())
}

/// Insert a copy of `text` at the tail. `false` if absent or out of memory.
pub fn insert_tail(q: Option<&mut Queue>, text: &str) -> bool {
    q.is_some_and(|q| q.insert_tail(text).is_ok())
}

/// Remove the head, copying a truncated, NUL-terminated copy into `out`.
///
/// `false` if the queue is absent or empty.
pub fn remove_head(q: Option<&mut Queue>, out: Option<&mut [u8]>) -> bool {
    q.is_some_and(|q| q.remove_head(out).is_ok())
}

/// Element count; 0 for an absent queue.
#[must_use]
pub fn size(q: Option<&Queue>) -> usize {
    q.map_or(0, Queue::size)
}

/// Reverse in place. No-op for an absent queue.
pub fn reverse(q: Option<&mut Queue>) {
    if let Some(q) = q {
        q.reverse();
    }
}

/// Sort ascending in place. No-op for an absent queue.
pub fn sort(q: Option<&mut Queue>) {
    if let Some(q) = q {
        q.sort();
    }
}
