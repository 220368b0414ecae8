//! is-type rules, one file per family of target descriptors.

mod containers;
mod finite;
mod functions;
mod intrinsics;
mod records;
mod unions;
