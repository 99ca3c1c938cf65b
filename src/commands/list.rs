//! Implementation of the `davlock list` command.

use crate::cli::ListArgs;
use crate::context::ServerContext;
use crate::error::{DavLockError, Result};

/// Execute the `davlock list` command.
///
/// Without a path every active lock is listed; with one, the locks that
/// apply to it or to anything beneath it.
pub fn cmd_list(ctx: &ServerContext, args: ListArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let engine = ctx.engine(&config)?;

    let locks = match &args.path {
        Some(path) => engine.get_locks(path, true)?,
        None => engine.active_locks()?,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&locks)
            .map_err(|e| DavLockError::Storage(format!("failed to serialize locks: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    if locks.is_empty() {
        println!("No active locks.");
        return Ok(());
    }

    println!("Active locks:");
    println!();
    for lock in &locks {
        println!("  {}", lock);
        println!("    token: {}", lock.token);
    }
    println!();
    println!("Total: {} lock(s)", locks.len());
    Ok(())
}
