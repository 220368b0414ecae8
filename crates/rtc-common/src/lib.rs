//! Common types and utilities for the rtc runtime type-compatibility engine.
//!
//! This crate provides foundational types shared by the solver and its hosts:
//! - String interning (`Atom`, `ShardedInterner`) for field, function,
//!   package and map-key names
//! - Stack and recursion limits

// String interning for name deduplication
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Centralized limits and thresholds
pub mod limits;
