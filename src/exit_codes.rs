//! Exit code constants for the davlock CLI.
//!
//! - 0: Success
//! - 1: Bad request (malformed header, arguments, or lock body)
//! - 2: Precondition failed (If header evaluated false)
//! - 3: Conflict (unmatched UNLOCK token, missing parent collection)
//! - 4: Locked (a covering lock was not proven)
//! - 5: Storage failure or unsupported operation

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Malformed input: headers, arguments, or lock body.
pub const BAD_REQUEST: i32 = 1;

/// The If header was well-formed but did not evaluate to true.
pub const PRECONDITION_FAILED: i32 = 2;

/// The request conflicts with the current state (e.g. unknown lock token).
pub const CONFLICT: i32 = 3;

/// The target is locked and no proof of ownership was supplied.
pub const LOCKED: i32 = 4;

/// Lock store or resource tree failure, or locking disabled.
pub const STORAGE_FAILURE: i32 = 5;
