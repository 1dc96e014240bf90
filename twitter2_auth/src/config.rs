use std::time::Duration;

use crate::error::{Error, ErrorKind};

const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// Settings shared by the authentication handlers and the clients they create.
///
/// The defaults talk to the real Twitter API over HTTPS with no request timeout.
#[derive(Clone, Debug)]
pub struct Config {
    api_base: Box<str>,
    timeout: Option<Duration>,
    https_only: bool,
}

impl Config {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            timeout: None,
            https_only: true,
        }
    }

    /// Overrides the scheme and host that every endpoint is resolved against. A trailing slash is
    /// ignored.
    #[inline]
    #[must_use]
    pub fn api_base<S>(self, api_base: S) -> Self
    where
        S: AsRef<str>,
    {
        Self {
            api_base: api_base.as_ref().trim_end_matches('/').into(),
            ..self
        }
    }

    #[inline]
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    /// Allows plain HTTP connections. Only useful for talking to a local stand-in for the API.
    #[inline]
    #[must_use]
    pub fn allow_http(self) -> Self {
        Self {
            https_only: false,
            ..self
        }
    }

    pub fn oauth_url(&self, endpoint: &str) -> String {
        format!("{}/oauth/{}", self.api_base, endpoint)
    }

    pub fn oauth2_url(&self, endpoint: &str) -> String {
        format!("{}/oauth2/{}", self.api_base, endpoint)
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}/1.1/{}", self.api_base, path)
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .https_only(self.https_only);

        let builder = match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };

        builder
            .build()
            .map_err(|err| Error::from(ErrorKind::Transport(err)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
