//! Command implementations for davlock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command resolves the served root, loads its config
//! and drives a [`LockEngine`](crate::engine::LockEngine) built from it.

mod check;
mod list;
mod lock;
mod unlock;


use crate::cli::{Cli, Command};
use crate::context::ServerContext;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let ctx = ServerContext::resolve(cli.root.as_deref())?;

    match cli.command {
        Command::Lock(args) => lock::cmd_lock(&ctx, args),
        Command::Refresh(args) => lock::cmd_refresh(&ctx, args),
        Command::Unlock(args) => unlock::cmd_unlock(&ctx, args),
        Command::Check(args) => check::cmd_check(&ctx, args),
        Command::List(args) => list::cmd_list(&ctx, args),
    }
}

/// Get the default owner string for new locks (USER@HOSTNAME).
fn default_owner() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
