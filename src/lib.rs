//! davlock: WebDAV class 2 locking for a tree of resources.
//!
//! The [`engine::LockEngine`] answers `LOCK` and `UNLOCK`, evaluates `If`
//! headers and guards every other state-changing method against locks the
//! client has not proven it holds. Locks are kept in a pluggable
//! [`locks::LockStore`]; resources are reached through a
//! [`resource::ResourceTree`].

pub mod cli;
pub mod commands;
pub mod conditions;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod headers;
pub mod locks;
pub mod paths;
pub mod resource;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use engine::{DavRequest, DavResponse, LockEngine, LockRequest, MethodGuard};
pub use error::{DavLockError, Result};
pub use locks::{LockDepth, LockInfo, LockScope, LockStore, LockTimeout, LockToken};
