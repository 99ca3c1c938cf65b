//! Implementation of the `davlock check` command.
//!
//! Runs the method guard exactly as a server would before executing the
//! method, without performing the method itself.

use crate::cli::CheckArgs;
use crate::context::ServerContext;
use crate::engine::{DavRequest, MethodGuard};
use crate::error::{DavLockError, Result};
use crate::headers;
use http::Method;

/// Execute the `davlock check` command.
pub fn cmd_check(ctx: &ServerContext, args: CheckArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let engine = ctx.engine(&config)?;

    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| DavLockError::BadRequest(format!("invalid method '{}'", args.method)))?;

    let mut request = DavRequest::new(method.clone(), &args.path);
    if let Some(destination) = &args.destination {
        request = request.header(headers::DESTINATION, destination)?;
    }
    if let Some(overwrite) = &args.overwrite {
        request = request.header(headers::OVERWRITE, overwrite)?;
    }
    if let Some(if_header) = &args.if_header {
        request = request.header(headers::IF, if_header)?;
    }

    engine.check(&request)?;
    println!(
        "{} {} is allowed",
        method,
        crate::paths::normalize(&args.path)
    );
    Ok(())
}
