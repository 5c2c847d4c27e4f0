//! Standard exit codes (BSD sysexits.h compatible)

/// The selector refused the gesture (disabled node, empty buffer, ...)
pub const REJECTED: i32 = 1;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (malformed forest, unknown node value)
pub const DATAERR: i32 = 65;

/// Cannot open input
pub const NOINPUT: i32 = 66;

/// Configuration error
pub const CONFIG: i32 = 78;
