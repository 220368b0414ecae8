//! Centralized limits and thresholds for the runtime type-compatibility engine.
//!
//! # Solver recursion limits
//!
//! `rtc_solver::recursion::RecursionProfile` reads its defaults from here, and
//! `rtc_solver::RelationPolicy` can override them per query. The stack
//! constants are used when the checkers grow the native stack on deep
//! (non-cyclic) type and value graphs.

/// Remaining stack (in bytes) below which a recursive checker step allocates
/// a fresh stack segment before descending.
///
/// Deeply nested JSON documents or long record chains recurse once per level.
/// Keeping a 64 KiB red zone leaves room for the frames of a single rule
/// (record field walk, union member scan) between growth checks.
pub const STACK_RED_ZONE: usize = 64 * 1024;

/// Size (in bytes) of each stack segment allocated by `stacker::maybe_grow`.
pub const STACK_GROWTH_SIZE: usize = 1024 * 1024;

/// Maximum nesting depth for `is-type` recursion.
///
/// Type graphs are built by a compiler and are rarely deep; a record whose
/// field types nest 512 levels without revisiting a (source, target) pair is
/// far outside anything a program declares.
pub const MAX_SUBTYPE_DEPTH: u32 = 512;

/// Maximum nesting depth for `is-like-type` recursion.
///
/// Value graphs follow live data (parsed JSON, user records) and can be much
/// deeper than the declared types that bound them.
pub const MAX_SHAPE_DEPTH: u32 = 4096;

/// Maximum number of guarded steps a single `is-type` query may take.
///
/// Without memoization a diamond-shaped record graph can be walked once per
/// path; the budget turns such a blowup into a `false` answer flagged as
/// exceeded.
pub const MAX_SUBTYPE_ITERATIONS: u32 = 100_000;

/// Maximum number of pairs the cycle guard tracks at once.
pub const MAX_VISITING_PAIRS: u32 = 100_000;
