//! Core types and synchronization primitives for the KinOS kernel.
//!
//! Everything here is independent of the kernel target: typed identifiers
//! for tasks and descriptors, the leveled logging front-end, and the
//! interrupt-masking lock that every shared kernel table sits behind.
//!
//! The crate is `no_std` except under `cfg(test)`, so it builds for the
//! kernel and runs its tests on the host with plain `cargo test`.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod id;
pub mod log;
pub mod sync;
