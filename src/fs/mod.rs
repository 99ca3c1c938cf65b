//! Filesystem utilities for davlock.
//!
//! The file-backed lock table is rewritten as a whole on every mutation, so
//! writes go through a temp-file-and-rename step and a crash never leaves a
//! truncated table behind.

pub mod atomic;

pub use atomic::atomic_write;
