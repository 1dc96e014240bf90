//! Credential negotiation for the Twitter API.
//!
//! [`DelegatedAuthHandler`] runs the three-legged OAuth 1.0a flow to act on behalf of a user, and
//! [`AppOnlyAuthHandler`] obtains an app-only bearer token. Once a handler holds credentials,
//! [`AuthHandler::apply_auth`] returns a [`RequestDecorator`] which authorizes any outgoing
//! `reqwest` request.

pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod decorator;
mod encoding;
pub mod error;
pub mod request_data;
pub mod user;

pub use auth::{AnyAuthHandler, AppOnlyAuthHandler, AuthHandler, DelegatedAuthHandler};
pub use client::AsyncClient;
pub use config::Config;
pub use credentials::{AccessToken, ApplicationCredential, BearerCredential, RequestToken};
pub use decorator::{BearerToken, OAuth10a, RequestDecorator};
pub use error::{Error, ErrorKind};
