//! Implementation of the `davlock lock` and `davlock refresh` commands.

use super::default_owner;
use crate::cli::{LockArgs, RefreshArgs, ScopeArg};
use crate::context::ServerContext;
use crate::engine::{DavRequest, DavResponse, LockEngine, LockRequest};
use crate::error::{DavLockError, Result};
use crate::headers;
use crate::locks::LockToken;
use http::Method;
use quick_xml::escape::escape;

/// Execute the `davlock lock` command.
///
/// Prints the lock token on the first line, followed by the granted lock.
pub fn cmd_lock(ctx: &ServerContext, args: LockArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let engine = ctx.engine(&config)?;

    let owner = args.owner.unwrap_or_else(default_owner);
    let owner = Some(escape(owner.as_str()).into_owned());
    let body = match args.scope {
        ScopeArg::Exclusive => LockRequest::exclusive(owner),
        ScopeArg::Shared => LockRequest::shared(owner),
    };

    let mut request = DavRequest::new(lock_method()?, &args.path)
        .header(headers::DEPTH, &args.depth)?
        .with_lock_body(body);
    if let Some(timeout) = &args.timeout {
        request = request.header(headers::TIMEOUT, timeout)?;
    }
    if let Some(if_header) = &args.if_header {
        request = request.header(headers::IF, if_header)?;
    }

    let response = engine.execute(&request)?;
    print_granted(&engine, &args.path, &response)
}

/// Execute the `davlock refresh` command.
pub fn cmd_refresh(ctx: &ServerContext, args: RefreshArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let engine = ctx.engine(&config)?;

    let mut request =
        DavRequest::new(lock_method()?, &args.path).header(headers::IF, &args.if_header)?;
    if let Some(timeout) = &args.timeout {
        request = request.header(headers::TIMEOUT, timeout)?;
    }

    let response = engine.execute(&request)?;
    print_granted(&engine, &args.path, &response)
}

fn lock_method() -> Result<Method> {
    Method::from_bytes(b"LOCK")
        .map_err(|e| DavLockError::BadRequest(format!("invalid method: {}", e)))
}

fn print_granted(engine: &LockEngine, path: &str, response: &DavResponse) -> Result<()> {
    let token = response
        .header_str(headers::LOCK_TOKEN.as_str())
        .ok_or_else(|| DavLockError::Storage("LOCK response has no Lock-Token".to_string()))?;
    println!("{}", token);

    let token = LockToken::parse(token)?;
    if let Some(lock) = engine
        .get_locks(path, false)?
        .into_iter()
        .find(|l| l.token == token)
    {
        println!("{}", lock);
    }
    Ok(())
}
