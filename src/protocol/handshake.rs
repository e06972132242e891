//! Handshake with the submission servers.
//!
//! The handshake is a GET request carrying the client and user identity and
//! an authentication token. A successful reply looks like:
//!
//! ```text
//! OK
//! 17E61E13454CDD8B68E8D7DEEEDF6170
//! http://post.audioscrobbler.com:80/np_1.2
//! http://post2.audioscrobbler.com:80/protocol_1.2
//! ```

use url::Url;
use veil::Redact;

use super::{param, Params, Response, PROTOCOL_VERSION};
use crate::{
    credentials::Credentials,
    error::{Error, Result},
    signing,
};

/// Builds the handshake query parameters.
///
/// `timestamp` is sent as `t` and signs the token sent as `a`, so the two
/// always agree.
#[must_use]
pub fn params(credentials: &Credentials, session_key: &str, timestamp: u64) -> Params {
    let mut params = Params::with_capacity(9);
    param(&mut params, "hs", "true");
    param(&mut params, "p", PROTOCOL_VERSION);
    param(&mut params, "c", &credentials.client_id);
    param(&mut params, "v", &credentials.client_version);
    param(&mut params, "u", &credentials.username);
    param(&mut params, "t", timestamp);
    param(&mut params, "a", signing::auth_token(&credentials.secret, timestamp));
    param(&mut params, "api_key", &credentials.api_key);
    param(&mut params, "sk", session_key);
    params
}

/// Session details handed out by a successful handshake.
#[derive(Clone, Redact, PartialEq, Eq, Hash)]
pub struct Reply {
    #[redact]
    pub session_key: String,
    pub now_playing_url: Url,
    pub submission_url: Url,
}

impl TryFrom<Response> for Reply {
    type Error = Error;

    fn try_from(response: Response) -> Result<Self> {
        let [_, session_key, now_playing_url, submission_url, ..] = response.lines() else {
            return Err(Error::protocol(format!(
                "handshake reply has {} lines, expected 4",
                response.lines().len()
            )));
        };

        Ok(Self {
            session_key: session_key.clone(),
            now_playing_url: now_playing_url.parse()?,
            submission_url: submission_url.parse()?,
        })
    }
}
