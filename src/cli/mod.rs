//! CLI argument parsing for davlock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// davlock: WebDAV class 2 locks for a directory tree.
///
/// Takes, refreshes and releases locks on paths beneath a served root and
/// checks whether a WebDAV method would be allowed under the current locks.
/// State lives in `.davlock/` inside the root.
#[derive(Parser, Debug)]
#[command(name = "davlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Served root directory (default: current directory).
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for davlock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Take a new lock.
    ///
    /// Creates an empty resource when nothing is mapped at the path yet.
    /// Prints the lock token on success.
    Lock(LockArgs),

    /// Refresh an existing lock.
    ///
    /// The If header must name the token of a lock rooted at the path.
    Refresh(RefreshArgs),

    /// Release a lock.
    Unlock(UnlockArgs),

    /// Check whether a method may run on a path under the current locks.
    ///
    /// Exits 0 when allowed, with the locked or precondition-failed exit
    /// code otherwise.
    Check(CheckArgs),

    /// List active locks, optionally only those applying to a path.
    List(ListArgs),
}

/// Lock scope as given on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeArg {
    Exclusive,
    Shared,
}

/// Arguments for the `lock` command.
#[derive(Parser, Debug)]
pub struct LockArgs {
    /// Request path to lock (e.g. /dir/file.txt).
    pub path: String,

    /// Lock scope.
    #[arg(long, value_enum, default_value = "exclusive")]
    pub scope: ScopeArg,

    /// Depth header value: 0 or infinity.
    #[arg(long, default_value = "infinity")]
    pub depth: String,

    /// Owner recorded with the lock (default: user@host).
    #[arg(long)]
    pub owner: Option<String>,

    /// Timeout header value (e.g. "Second-3600" or "Infinite").
    #[arg(long)]
    pub timeout: Option<String>,

    /// If header value proving ownership of conflicting locks.
    #[arg(long = "if")]
    pub if_header: Option<String>,
}

/// Arguments for the `refresh` command.
#[derive(Parser, Debug)]
pub struct RefreshArgs {
    /// Lock root to refresh.
    pub path: String,

    /// If header naming the lock token, e.g. "(<opaquelocktoken:...>)".
    #[arg(long = "if")]
    pub if_header: String,

    /// New Timeout header value.
    #[arg(long)]
    pub timeout: Option<String>,
}

/// Arguments for the `unlock` command.
#[derive(Parser, Debug)]
pub struct UnlockArgs {
    /// Lock root.
    pub path: String,

    /// Lock token, with or without angle brackets.
    #[arg(long)]
    pub token: String,
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// WebDAV method (PUT, DELETE, MKCOL, PROPPATCH, COPY, MOVE, ...).
    pub method: String,

    /// Request path.
    pub path: String,

    /// Destination for COPY and MOVE.
    #[arg(long)]
    pub destination: Option<String>,

    /// Overwrite header value for COPY and MOVE (T or F).
    #[arg(long)]
    pub overwrite: Option<String>,

    /// If header value.
    #[arg(long = "if")]
    pub if_header: Option<String>,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only show locks applying to this path (including locks below it).
    pub path: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
