//! Singly linked queue of owned strings.
//!
//! Nodes are stored in an index arena: the queue holds the head and tail
//! indices, and each node holds the index of its successor. Every node is
//! reachable from exactly one link, so structural operations (reverse, sort)
//! are index rewrites that move a node from one owner slot to another without
//! copying or reallocating it.
//!
//! # Examples
//!
//! ```rust
//! use strqueue::Queue;
//!
//! # fn main() -> strqueue::Result<()> {
//! let mut q = Queue::new();
//! q.insert_tail("b")?;
//! q.insert_head("a")?;
//! q.insert_tail("c")?;
//! assert_eq!(q.size(), 3);
//!
//! q.reverse();
//! assert_eq!(q.iter().collect::<Vec<_>>(), ["c", "b", "a"]);
//!
//! q.sort();
//! let mut buf = [0u8; 8];
//! q.remove_head(Some(&mut buf))?;
//! assert_eq!(&buf[..2], b"a\0");
//! # Ok(())
//! # }
//! ```

mod node;
mod sort;

pub use node::copy_truncated;
pub use sort::SortStrategy;

use std::fmt;
use std::mem;

use crate::alloc::{AllocGate, SystemGate};
use crate::error::{AllocKind, Error, Result};
use node::{Arena, Link, Node};

const QUEUE_BYTES: usize = mem::size_of::<Queue>();
const NODE_BYTES: usize = mem::size_of::<Node>();

/// FIFO/LIFO queue of owned strings backed by a singly linked list.
pub struct Queue {
    nodes: Arena,
    head: Link,
    /// Last node of the chain starting at `head`; `None` iff `head` is `None`.
    tail: Link,
    size: usize,
    gate: Box<dyn AllocGate>,
}

impl Queue {
    /// Create an empty queue that admits every allocation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boxed_gate(Box::new(SystemGate))
    }

    /// Create an empty queue whose allocations go through `gate`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the gate refuses the queue
    /// itself; no queue is produced in that case.
    pub fn try_with_gate(gate: impl AllocGate + 'static) -> Result<Self> {
        if !gate.admit(AllocKind::Queue, QUEUE_BYTES) {
            return Err(Error::allocation(AllocKind::Queue, QUEUE_BYTES));
        }
        Ok(Self::with_boxed_gate(Box::new(gate)))
    }

    fn with_boxed_gate(gate: Box<dyn AllocGate>) -> Self {
        Self {
            nodes: Arena::default(),
            head: None,
            tail: None,
            size: 0,
            gate,
        }
    }

    /// Number of elements. O(1).
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the queue holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Insert a copy of `text` at the head.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the node or the value copy
    /// cannot be allocated. The queue is unchanged on error.
    pub fn insert_head(&mut self, text: &str) -> Result<()> {
        let idx = self.alloc_node(text)?;
        self.nodes.set_next(idx, self.head);
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.size += 1;
        Ok(())
    }

    /// Insert a copy of `text` at the tail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the node or the value copy
    /// cannot be allocated. The queue is unchanged on error.
    pub fn insert_tail(&mut self, text: &str) -> Result<()> {
        let idx = self.alloc_node(text)?;
        match self.tail {
            Some(tail) => self.nodes.set_next(tail, Some(idx)),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.size += 1;
        Ok(())
    }

    /// Remove the head element, copying its text into `out` if given.
    ///
    /// With a buffer of capacity `n > 0`, at most `n - 1` bytes are copied
    /// followed by a NUL byte; longer values are truncated. A zero-length
    /// buffer receives nothing. Passing `None` discards the text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQueue`] if there is nothing to remove.
    pub fn remove_head(&mut self, out: Option<&mut [u8]>) -> Result<()> {
        let node = self.unlink_head().ok_or(Error::EmptyQueue)?;
        if let Some(buf) = out {
            copy_truncated(&node.value, buf);
        }
        self.release_node(node);
        Ok(())
    }

    /// Remove the head element and hand its text to the caller.
    pub fn pop_head(&mut self) -> Option<String> {
        let node = self.unlink_head()?;
        Some(self.release_node(node))
    }

    /// Text of the head element.
    #[must_use]
    pub fn peek_head(&self) -> Option<&str> {
        self.nodes.value(self.head?)
    }

    /// Text of the tail element.
    #[must_use]
    pub fn peek_tail(&self) -> Option<&str> {
        self.nodes.value(self.tail?)
    }

    /// Reverse the element order in place.
    ///
    /// No node is allocated or released. Empty and single-element queues are
    /// left as they are.
    pub fn reverse(&mut self) {
        if self.size < 2 {
            return;
        }

        let mut prev: Link = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            cursor = self.nodes.next(idx);
            self.nodes.set_next(idx, prev);
            prev = Some(idx);
        }

        self.tail = self.head;
        self.head = prev;
    }

    /// Sort elements into ascending byte order using merge sort.
    pub fn sort(&mut self) {
        self.sort_with(SortStrategy::Merge);
    }

    /// Sort elements into ascending byte order using `strategy`.
    ///
    /// No node is allocated or released. Equal values keep their relative
    /// order under both strategies.
    pub fn sort_with(&mut self, strategy: SortStrategy) {
        if self.size < 2 {
            return;
        }

        match strategy {
            SortStrategy::Merge => {
                self.head = sort::merge_sort(&mut self.nodes, self.head, self.size);
                self.tail = self.nodes.last(self.head);
            }
            SortStrategy::AdjacentSwap => sort::adjacent_swap_sort(&mut self.nodes, self.head),
        }
    }

    /// Iterate over element texts from head to tail.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            next: self.head,
            remaining: self.size,
        }
    }

    fn alloc_node(&mut self, text: &str) -> Result<usize> {
        if !self.gate.admit(AllocKind::Node, NODE_BYTES) {
            return Err(Error::allocation(AllocKind::Node, NODE_BYTES));
        }
        if self.nodes.try_reserve_slot().is_err() {
            self.gate.release(AllocKind::Node, NODE_BYTES);
            return Err(Error::allocation(AllocKind::Node, NODE_BYTES));
        }
        let value = match self.copy_value(text) {
            Ok(value) => value,
            Err(e) => {
                self.gate.release(AllocKind::Node, NODE_BYTES);
                return Err(e);
            }
        };
        Ok(self.nodes.insert(value))
    }

    fn copy_value(&self, text: &str) -> Result<String> {
        let err = || Error::allocation(AllocKind::Value, text.len());
        if !self.gate.admit(AllocKind::Value, text.len()) {
            return Err(err());
        }

        let mut value = String::new();
        if value.try_reserve_exact(text.len()).is_err() {
            self.gate.release(AllocKind::Value, text.len());
            return Err(err());
        }
        value.push_str(text);
        Ok(value)
    }

    /// Detach the head node, keeping head, tail and size consistent.
    fn unlink_head(&mut self) -> Option<Node> {
        let node = self.nodes.remove(self.head?)?;
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        self.size -= 1;
        Some(node)
    }

    /// Report a detached node and its value as released, yielding the text.
    fn release_node(&self, node: Node) -> String {
        let Node { value, .. } = node;
        self.gate.release(AllocKind::Value, value.len());
        self.gate.release(AllocKind::Node, NODE_BYTES);
        value
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        while let Some(node) = self.unlink_head() {
            self.release_node(node);
        }
        self.gate.release(AllocKind::Queue, QUEUE_BYTES);
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Queue {
    type Item = &'a str;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over a [`Queue`], head to tail.
pub struct Iter<'a> {
    nodes: &'a Arena,
    next: Link,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        let node = self.nodes.get(idx)?;
        self.next = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(node.value.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
