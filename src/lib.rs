//! Singly linked queue of owned strings.
//!
//! The crate provides:
//!
//! - [`Queue`] - head/tail insertion, head removal with bounded copy-out,
//!   O(1) size, in-place reverse and in-place sort
//! - [`ops`] - the same operations over an optional queue handle, reporting
//!   plain success flags
//! - [`alloc`] - allocation gates for fault injection and leak tracking
//! - [`harness`] - the line-oriented command interpreter behind `qtest`
//! - [`config`] - TOML configuration for the harness

#![deny(unsafe_code)]

pub mod alloc;
pub mod config;
pub mod error;
pub mod harness;
pub mod ops;
pub mod queue;

pub use error::{AllocKind, Error, Result};
pub use queue::{Iter, Queue, SortStrategy, copy_truncated};
