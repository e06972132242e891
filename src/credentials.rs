//! Account and client credentials.
//!
//! Credentials are usually read from a TOML secrets file:
//!
//! ```toml
//! api_key = "0123456789abcdef0123456789abcdef"
//! secret = "fedcba9876543210fedcba9876543210"
//! username = "rj"
//! session_key = ""
//! client_id = "tst"
//! client_version = "1.0"
//! ```
//!
//! `session_key` may be left out, in which case the handshake starts without
//! one.

use std::{fs, io, path::Path};

use serde::Deserialize;
use veil::Redact;

/// Immutable identity used for every handshake.
#[derive(Clone, Redact, PartialEq, Eq, Hash, Deserialize)]
pub struct Credentials {
    #[redact]
    pub api_key: String,

    /// Shared secret used to sign handshakes. Never sent in the clear.
    #[redact]
    pub secret: String,

    pub username: String,

    /// Web services session key to present on the first handshake.
    #[redact]
    #[serde(default)]
    pub session_key: String,

    /// Client identifier issued by Last.fm, such as `tst` for testing.
    pub client_id: String,
    pub client_version: String,
}

impl Credentials {
    /// Secrets files are tiny; refuse anything larger to avoid reading
    /// arbitrary files into memory.
    const MAX_FILE_SIZE: u64 = 1024;

    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        secret: impl Into<String>,
        username: impl Into<String>,
        session_key: impl Into<String>,
        client_id: impl Into<String>,
        client_version: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            username: username.into(),
            session_key: session_key.into(),
            client_id: client_id.into(),
            client_version: client_version.into(),
        }
    }

    /// Loads credentials from a TOML secrets file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is larger than 1 KiB or
    /// does not contain all required keys.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();

        // Prevent out-of-memory condition: secrets file should be small.
        let file_size = fs::metadata(path)?.len();
        if file_size > Self::MAX_FILE_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} is too large", path.display()),
            ));
        }

        let contents = fs::read_to_string(path)?;
        contents.parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} format is invalid: {e}", path.display()),
            )
        })
    }
}

impl std::str::FromStr for Credentials {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}
