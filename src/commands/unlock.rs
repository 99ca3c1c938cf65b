//! Implementation of the `davlock unlock` command.

use crate::cli::UnlockArgs;
use crate::context::ServerContext;
use crate::engine::DavRequest;
use crate::error::{DavLockError, Result};
use crate::headers;
use http::Method;

/// Execute the `davlock unlock` command.
pub fn cmd_unlock(ctx: &ServerContext, args: UnlockArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let engine = ctx.engine(&config)?;

    let method = Method::from_bytes(b"UNLOCK")
        .map_err(|e| DavLockError::BadRequest(format!("invalid method: {}", e)))?;
    let request = DavRequest::new(method, &args.path).header(headers::LOCK_TOKEN, &args.token)?;

    engine.execute(&request)?;
    println!("Released lock on {}", crate::paths::normalize(&args.path));
    Ok(())
}
