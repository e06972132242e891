//! Client for the Audioscrobbler submission protocol.
//!
//! A [`session::Session`] authenticates with a handshake and then reports
//! now-playing notifications and scrobbles over an injected
//! [`http::Transport`].
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate log;

pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod protocol;
pub mod session;
pub mod signing;
pub mod track;
pub mod util;
