//! Handshake authentication.
//!
//! The submission protocol authenticates a handshake with
//! `md5(secret + timestamp)`. MD5 is fixed by the wire protocol.
//!
//! The same timestamp must be sent as the handshake's `t` parameter, or the
//! server rejects the token with `BADAUTH`.

use md5::{Digest, Md5};

/// Computes the authentication token for a handshake at `timestamp`.
///
/// Returns the lowercase hexadecimal MD5 digest of `secret` followed by the
/// decimal form of `timestamp` (UTC seconds since the epoch).
#[must_use]
pub fn auth_token(secret: &str, timestamp: u64) -> String {
    format!("{:x}", Md5::digest(format!("{secret}{timestamp}")))
}
