use std::time::Duration;

use url::Url;

use crate::protocol::HANDSHAKE_URL;

/// Client configuration.
///
/// The `User-Agent` is `<app_name>/<app_version>` followed by a suffix
/// identifying the application that embeds this client.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    pub app_name: String,
    pub app_version: String,

    pub user_agent: String,

    pub handshake_url: Url,

    /// Applies to every request, the handshake included.
    pub timeout: Duration,
}

impl Config {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration with `suffix` appended to the `User-Agent`.
    ///
    /// # Panics
    ///
    /// Panics if the package name or version contain a `/` or whitespace.
    #[must_use]
    pub fn with_user_agent(suffix: &str) -> Self {
        let app_name = env!("CARGO_PKG_NAME").to_owned();
        let app_version = env!("CARGO_PKG_VERSION").to_owned();

        // Additional `User-Agent` string checks on top of `reqwest::HeaderValue`.
        let illegal_chars = |chr: char| chr == '/' || chr.is_whitespace();
        if app_name.is_empty()
            || app_name.contains(illegal_chars)
            || app_version.is_empty()
            || app_version.contains(illegal_chars)
        {
            panic!("application name and/or version invalid (\"{app_name}\"; \"{app_version}\")");
        }

        let user_agent = format!("{app_name}/{app_version} {suffix}")
            .trim_end()
            .to_owned();
        trace!("user agent: {user_agent}");

        Self {
            app_name,
            app_version,
            user_agent,
            handshake_url: Url::parse(HANDSHAKE_URL).expect("invalid handshake url"),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_user_agent("")
    }
}
