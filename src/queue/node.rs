//! List nodes and the arena that owns them.
//!
//! Nodes live in slots of a `Vec`; a link is the slot index of the next node.
//! Each occupied slot is reachable from exactly one link (the queue head or a
//! predecessor's `next`), so relinking is a plain index update and no node is
//! ever referenced through two owners.

use std::collections::TryReserveError;
use std::mem;

/// Index of the next node; `None` terminates the chain.
pub(crate) type Link = Option<usize>;

/// One queue element.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) value: String,
    pub(crate) next: Link,
}

/// Slot storage for nodes. Vacated slots are reused by later inserts.
#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Option<Node>>,
    vacant: Vec<usize>,
}

impl Arena {
    /// Make sure the next [`insert`](Self::insert) needs no allocation.
    pub(crate) fn try_reserve_slot(&mut self) -> Result<(), TryReserveError> {
        if self.vacant.is_empty() {
            self.slots.try_reserve(1)?;
        }
        Ok(())
    }

    /// Store an unlinked node, returning its index.
    pub(crate) fn insert(&mut self, value: String) -> usize {
        let node = Node { value, next: None };
        match self.vacant.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    /// Take the node out of its slot and vacate it.
    pub(crate) fn remove(&mut self, idx: usize) -> Option<Node> {
        let node = self.slots.get_mut(idx)?.take()?;
        self.vacant.push(idx);
        Some(node)
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&Node> {
        self.slots.get(idx)?.as_ref()
    }

    pub(crate) fn value(&self, idx: usize) -> Option<&str> {
        self.get(idx).map(|node| node.value.as_str())
    }

    pub(crate) fn next(&self, idx: usize) -> Link {
        self.get(idx)?.next
    }

    pub(crate) fn set_next(&mut self, idx: usize, next: Link) {
        if let Some(Some(node)) = self.slots.get_mut(idx) {
            node.next = next;
        }
    }

    /// Exchange the values of two distinct nodes, leaving links alone.
    pub(crate) fn swap_values(&mut self, a: usize, b: usize) {
        if let Ok([Some(x), Some(y)]) = self.slots.get_disjoint_mut([a, b]) {
            mem::swap(&mut x.value, &mut y.value);
        }
    }

    /// Walk `at` nodes from `head` and detach everything after them.
    ///
    /// Returns `None` when `at` is 0 or the chain holds `at` nodes or fewer.
    pub(crate) fn split_off(&mut self, head: Link, at: usize) -> Link {
        if at == 0 {
            return None;
        }
        let mut last = head?;
        for _ in 1..at {
            last = self.next(last)?;
        }
        let rest = self.next(last);
        self.set_next(last, None);
        rest
    }

    /// Last node of the chain starting at `head`.
    pub(crate) fn last(&self, head: Link) -> Link {
        let mut last = head?;
        while let Some(next) = self.next(last) {
            last = next;
        }
        Some(last)
    }

    #[cfg(test)]
    pub(crate) fn slots_len(&self) -> usize {
        self.slots.len()
    }
}

/// Copy `value` into `buf` as a NUL-terminated byte string, truncating to fit.
///
/// At most `buf.len() - 1` bytes of `value` are copied, followed by a single
/// `0`. A zero-length buffer is left untouched. Returns the number of value
/// bytes copied (terminator excluded).
pub fn copy_truncated(value: &str, buf: &mut [u8]) -> usize {
    let Some(room) = buf.len().checked_sub(1) else {
        return 0;
    };
    let src = value.as_bytes();
    let n = src.len().min(room);
    buf[..n].copy_from_slice(&src[..n]);
    buf[n] = 0;
    n
}
