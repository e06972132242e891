//! Audioscrobbler submission protocol, version 1.2.1.
//!
//! The protocol is plain text over HTTP:
//!
//! * A handshake (GET) authenticates the client and hands out a session key
//!   and the URLs to use for the other commands.
//! * Now-playing notifications and submissions (POST, form encoded) use
//!   those URLs and the session key.
//! * Every reply is a list of lines, the first of which is `OK` on success or
//!   an error code such as `BADAUTH` or `FAILED <reason>`.
//!
//! # Submodules
//!
//! * [`handshake`] - handshake parameters and reply
//! * [`submission`] - now-playing and scrobble parameters

pub mod handshake;
pub mod submission;

use crate::error::{Error, Result};

/// Protocol version sent with every handshake.
pub const PROTOCOL_VERSION: &str = "1.2.1";

/// Default handshake endpoint.
pub const HANDSHAKE_URL: &str = "http://post.audioscrobbler.com:80/";

/// Status line of every successful reply.
const STATUS_OK: &str = "OK";

/// Request parameters, in the order they are sent.
pub type Params = Vec<(String, String)>;

/// Lines of a successful reply, status line included.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Response {
    lines: Vec<String>,
}

impl Response {
    /// Checks the HTTP status and the status line of a reply.
    ///
    /// Leading and trailing newlines are ignored. A carriage return ending a
    /// line is not part of it.
    ///
    /// # Errors
    ///
    /// * [`Error::HttpStatus`] if `status` is neither `0` nor `200`. The body
    ///   is not looked at.
    /// * [`Error::Protocol`] with the trimmed first line if it is not `OK`.
    pub fn parse(status: u16, body: &str, origin: &str) -> Result<Self> {
        if !matches!(status, 0 | 200) {
            warn!("{origin}: HTTP status {status}");
            return Err(Error::HttpStatus(status));
        }

        trace!("{origin}: {body:?}");

        let lines: Vec<String> = body
            .trim_matches('\n')
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_owned())
            .collect();

        let status_line = lines.first().map_or("", String::as_str);
        if status_line != STATUS_OK {
            let message = status_line.trim();
            warn!("{origin}: {message}");
            return Err(if message.is_empty() {
                Error::protocol("empty response")
            } else {
                Error::protocol(message)
            });
        }

        Ok(Self { lines })
    }

    /// All lines, starting with the `OK` status line.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The payload line at `index`, where `0` is the status line.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }
}

/// Adds a parameter.
pub(crate) fn param(params: &mut Params, key: &str, value: impl ToString) {
    params.push((key.to_owned(), value.to_string()));
}

/// Adds a parameter that is sent empty when absent.
pub(crate) fn optional<T: ToString>(params: &mut Params, key: &str, value: Option<T>) {
    params.push((
        key.to_owned(),
        value.map(|value| value.to_string()).unwrap_or_default(),
    ));
}
