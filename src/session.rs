//! Audioscrobbler session.
//!
//! A [`Session`] is created by a successful handshake and holds what the
//! handshake handed out: a session key and the URLs for now-playing
//! notifications and submissions. There is no way to obtain a session
//! without a successful handshake.
//!
//! # Lifecycle
//!
//! * [`Session::connect`] performs the first handshake
//! * [`Session::now_playing`] and [`Session::submit`] report plays
//! * [`Session::handshake`] renews the session, for instance after a
//!   `BADSESSION` reply (see `Error::is_bad_session`)
//!
//! Nothing is retried automatically. Dropping the session releases its
//! transport.
//!
//! # Example
//!
//! ```rust
//! use scrobbler::{config::Config, credentials::Credentials, session::Session};
//!
//! let session = Session::new(credentials, &Config::default()).await?;
//! session.now_playing(&track).await?;
//! // ... once the track has finished ...
//! session.submit(&scrobble).await?;
//! ```

use url::Url;

use crate::{
    config::Config,
    credentials::Credentials,
    error::Result,
    http::{self, Request, Transport},
    protocol::{
        handshake::{self, Reply},
        submission, Params, Response,
    },
    track::{Scrobble, Track},
    util,
};

/// Session key and endpoints handed out by the last successful handshake.
///
/// Replaced as a whole by every successful handshake.
pub type SessionState = Reply;

/// An authenticated submission session.
pub struct Session<T = http::Client> {
    credentials: Credentials,
    handshake_url: Url,
    transport: T,
    state: SessionState,
}

impl Session {
    /// Connects over HTTP as configured by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake fails. See [`Session::connect`].
    pub async fn new(credentials: Credentials, config: &Config) -> Result<Self> {
        let transport = http::Client::new(config);
        Self::connect(credentials, config.handshake_url.clone(), transport).await
    }
}

impl<T: Transport> Session<T> {
    /// Performs a handshake with the server at `handshake_url` and returns
    /// the resulting session.
    ///
    /// # Errors
    ///
    /// * `Error::Transport` if the server could not be reached
    /// * `Error::HttpStatus` if the server did not answer with `200`
    /// * `Error::Protocol` if the handshake was refused, with the server's
    ///   reason (`BANNED`, `BADAUTH`, `BADTIME`, `FAILED <reason>`), or the
    ///   reply was malformed
    pub async fn connect(credentials: Credentials, handshake_url: Url, transport: T) -> Result<Self> {
        let state = Self::request_session(
            &transport,
            &handshake_url,
            &credentials,
            &credentials.session_key,
        )
        .await?;

        Ok(Self {
            credentials,
            handshake_url,
            transport,
            state,
        })
    }

    /// Renews the session key and endpoints.
    ///
    /// The current session key is sent along. On failure the previous
    /// session state is kept.
    ///
    /// # Errors
    ///
    /// As [`Session::connect`].
    pub async fn handshake(&mut self) -> Result<()> {
        let state = Self::request_session(
            &self.transport,
            &self.handshake_url,
            &self.credentials,
            &self.state.session_key,
        )
        .await?;

        self.state = state;
        Ok(())
    }

    async fn request_session(
        transport: &T,
        url: &Url,
        credentials: &Credentials,
        session_key: &str,
    ) -> Result<SessionState> {
        debug!("handshake as {} with {url}", credentials.username);

        // Captured once: the token is only valid for the `t` it is sent with.
        let timestamp = util::now_from_epoch();
        let params = handshake::params(credentials, session_key, timestamp);

        let response = Self::call(transport, Request::get(url.clone(), params), "handshake").await?;
        let state = SessionState::try_from(response)?;

        debug!(
            "session established; now playing: {}; submissions: {}",
            state.now_playing_url, state.submission_url
        );
        Ok(state)
    }

    /// Announces that `track` has started playing.
    ///
    /// Notifications are advisory: only artist and title are required.
    ///
    /// # Errors
    ///
    /// * `Error::Validation` if artist or title is empty; nothing is sent
    /// * `Error::Transport`, `Error::HttpStatus` or `Error::Protocol`
    ///   if the notification failed
    pub async fn now_playing(&self, track: &Track) -> Result<()> {
        track.validate()?;

        let state = &self.state;
        let params = submission::now_playing_params(&state.session_key, track);
        self.post(state.now_playing_url.clone(), params, "now playing")
            .await
    }

    /// Submits a finished track.
    ///
    /// Whether the track was played long enough to count is up to the
    /// caller; see [`Track::is_eligible`].
    ///
    /// # Errors
    ///
    /// * `Error::Validation` if the scrobble is not a legal submission (see
    ///   [`Scrobble::validate`]); nothing is sent
    /// * `Error::Transport`, `Error::HttpStatus` or `Error::Protocol`
    ///   if the submission failed
    pub async fn submit(&self, scrobble: &Scrobble) -> Result<()> {
        scrobble.validate()?;

        let state = &self.state;
        let params = submission::scrobble_params(&state.session_key, scrobble);
        self.post(state.submission_url.clone(), params, "submission")
            .await
    }

    async fn post(&self, url: Url, params: Params, origin: &str) -> Result<()> {
        Self::call(&self.transport, Request::post(url, params), origin)
            .await
            .map(|_| ())
    }

    async fn call(transport: &T, request: Request, origin: &str) -> Result<Response> {
        let response = transport.send(request).await.inspect_err(|e| {
            warn!("{origin}: {e}");
        })?;

        Response::parse(response.status, &response.body, origin)
    }

    /// The current session key and endpoints.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
