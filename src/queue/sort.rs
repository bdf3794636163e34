//! In-place sorting of a node chain.
//!
//! Two interchangeable strategies order values by byte-wise comparison:
//!
//! - [`SortStrategy::Merge`] - top-down merge sort, O(n log n), relinks nodes
//! - [`SortStrategy::AdjacentSwap`] - repeated adjacent exchange, O(n²),
//!   swaps values between nodes and leaves the links alone
//!
//! Neither allocates or releases a node. Both are stable.

use serde::{Deserialize, Serialize};

use super::node::{Arena, Link};

/// Sorting algorithm used by [`Queue::sort_with`](crate::Queue::sort_with).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortStrategy {
    /// Divide-and-conquer merge sort.
    #[default]
    Merge,
    /// Repeated adjacent swaps until a pass makes no exchange.
    #[value(alias = "swap")]
    #[serde(alias = "swap")]
    AdjacentSwap,
}

impl std::fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => f.write_str("merge"),
            Self::AdjacentSwap => f.write_str("adjacent-swap"),
        }
    }
}

impl std::str::FromStr for SortStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merge" => Ok(Self::Merge),
            "adjacent-swap" | "swap" => Ok(Self::AdjacentSwap),
            other => Err(format!("unknown sort strategy '{other}' (expected merge or swap)")),
        }
    }
}

/// Merge sort the `len`-node chain at `head`, returning the new head.
pub(crate) fn merge_sort(arena: &mut Arena, head: Link, len: usize) -> Link {
    if len < 2 {
        return head;
    }

    let mid = len / 2;
    let right = arena.split_off(head, mid);
    let left = merge_sort(arena, head, mid);
    let right = merge_sort(arena, right, len - mid);
    merge(arena, left, right)
}

/// Merge two ascending chains. On equal values the node from `left` goes first.
fn merge(arena: &mut Arena, mut left: Link, mut right: Link) -> Link {
    let mut head: Link = None;
    let mut last: Link = None;

    while let (Some(l), Some(r)) = (left, right) {
        let taken = if arena.value(l) <= arena.value(r) {
            left = arena.next(l);
            l
        } else {
            right = arena.next(r);
            r
        };
        match last {
            Some(prev) => arena.set_next(prev, Some(taken)),
            None => head = Some(taken),
        }
        last = Some(taken);
    }

    let rest = left.or(right);
    match last {
        Some(prev) => arena.set_next(prev, rest),
        None => head = rest,
    }
    head
}

/// Bubble values toward the tail until the chain is ordered.
pub(crate) fn adjacent_swap_sort(arena: &mut Arena, head: Link) {
    loop {
        let mut swapped = false;
        let mut cursor = head;

        while let Some(idx) = cursor {
            let next = arena.next(idx);
            if let Some(next) = next
                && arena.value(next) < arena.value(idx)
            {
                arena.swap_values(idx, next);
                swapped = true;
            }
            cursor = next;
        }

        if !swapped {
            break;
        }
    }
}
