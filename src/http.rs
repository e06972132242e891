//! HTTP transport for the submission protocol.
//!
//! The protocol core only needs to send a flat list of parameters with GET or
//! POST and read back a status and a text body. That need is captured by the
//! [`Transport`] trait, so that sessions can be driven by something other
//! than a real network connection.
//!
//! [`Client`] is the `reqwest` implementation. It adds:
//! * A `User-Agent` and request timeout taken from [`Config`]
//! * Lazy creation of the underlying connection pool on the first request
//! * Request rate limiting to stay within the service's quota
//!
//! # Example
//!
//! ```rust
//! use scrobbler::http::{Client, Request, Transport};
//!
//! let client = Client::new(&config);
//! let request = Request::get(url, params);
//! let response = client.send(request).await?;
//! ```

use std::{future::Future, num::NonZeroU32, time::Duration};

use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Method,
};
use tokio::sync::OnceCell;
use url::{form_urlencoded, Url};

use crate::{config::Config, error::Result, protocol::Params};

/// An outgoing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,

    /// Sent as the query string for GET and as a form encoded body otherwise.
    pub params: Params,
}

impl Request {
    #[must_use]
    pub fn get(url: Url, params: Params) -> Self {
        Self {
            method: Method::GET,
            url,
            params,
        }
    }

    #[must_use]
    pub fn post(url: Url, params: Params) -> Self {
        Self {
            method: Method::POST,
            url,
            params,
        }
    }
}

/// A completed exchange, whatever its status.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Response {
    /// HTTP status code, or `0` when there is none.
    pub status: u16,
    pub body: String,
}

/// Sends requests on behalf of a session.
pub trait Transport {
    /// Sends `request` and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::error::Error::Transport) when no
    /// response was received, for example on connection failures or
    /// timeouts. HTTP error statuses are not errors at this level.
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

/// HTTP client with lazy initialization and built-in rate limiting.
pub struct Client {
    /// Created on the first request and reused after that.
    inner: OnceCell<reqwest::Client>,

    user_agent: String,
    timeout: Duration,

    /// Rate limiter for API quota compliance.
    rate_limiter: DefaultDirectRateLimiter,
}

impl Client {
    /// Maximum allowed calls per interval.
    ///
    /// Last.fm asks clients not to average more than five calls per second.
    const RATE_LIMIT_CALLS_PER_INTERVAL: u8 = 5;

    /// Rolling window for the rate limit.
    const RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(1);

    /// Duration to keep idle connections alive.
    const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(60);

    /// The `Content-Type` of POST bodies.
    const FORM_CONTENT: &'static str = "application/x-www-form-urlencoded";

    /// Creates a new client. No connection is made until the first request.
    ///
    /// # Panics
    ///
    /// Panics if rate limit parameters are zero.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let replenish_interval =
            Self::RATE_LIMIT_INTERVAL / u32::from(Self::RATE_LIMIT_CALLS_PER_INTERVAL);
        let quota = Quota::with_period(replenish_interval)
            .expect("quota time interval is zero")
            .allow_burst(
                NonZeroU32::new(Self::RATE_LIMIT_CALLS_PER_INTERVAL.into())
                    .expect("calls per interval is zero"),
            );

        Self {
            inner: OnceCell::new(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout,
            rate_limiter: governor::RateLimiter::direct(quota),
        }
    }

    /// Returns the underlying client, building it if this is the first call.
    async fn inner(&self) -> Result<&reqwest::Client> {
        self.inner
            .get_or_try_init(|| async {
                debug!("creating http client; timeout: {:?}", self.timeout);
                reqwest::Client::builder()
                    .tcp_keepalive(Self::KEEPALIVE_TIMEOUT)
                    .timeout(self.timeout)
                    .user_agent(&self.user_agent)
                    .build()
            })
            .await
            .map_err(Into::into)
    }

    /// Whether the underlying client has been created yet.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized()
    }

    /// Converts a [`Request`] into a `reqwest::Request`.
    fn build(request: Request) -> reqwest::Request {
        let Request {
            method,
            mut url,
            params,
        } = request;

        if method == Method::GET {
            url.query_pairs_mut().extend_pairs(&params);
            return reqwest::Request::new(method, url);
        }

        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&params)
            .finish();

        let mut request = reqwest::Request::new(method, url);
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(Self::FORM_CONTENT));
        *request.body_mut() = Some(body.into());

        request
    }
}

impl Transport for Client {
    async fn send(&self, request: Request) -> Result<Response> {
        let client = self.inner().await?;
        let request = Self::build(request);

        // No need to await with jitter because the level of concurrency is low.
        self.rate_limiter.until_ready().await;

        debug!("{} {}", request.method(), request.url().path());
        let response = client.execute(request).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(Response { status, body })
    }
}
