pub mod bearer_token;
pub mod oauth10a;

pub use bearer_token::BearerToken;
pub use oauth10a::OAuth10a;

use std::borrow::Cow;

use reqwest::header::{HeaderValue, AUTHORIZATION};

use crate::error::{Error, ErrorKind};

/// Attaches authorization material to outgoing requests.
///
/// A decorator is obtained from
/// [`AuthHandler::apply_auth`](crate::auth::AuthHandler::apply_auth) and holds everything it needs,
/// so it never performs I/O and can be shared freely between concurrent requests.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RequestDecorator {
    /// Signs each request with OAuth 1.0a, using a fresh nonce and timestamp every time.
    OAuth1Signing(OAuth10a),
    /// Stamps each request with the same `Authorization: Bearer` header.
    BearerHeader(BearerToken),
}

impl RequestDecorator {
    /// Returns the `Authorization` header value this decorator would attach to the request.
    pub fn auth_header(&self, request: &reqwest::Request) -> Cow<str> {
        match self {
            RequestDecorator::OAuth1Signing(auth) => Cow::Owned(auth.auth_header(request)),
            RequestDecorator::BearerHeader(auth) => Cow::Borrowed(auth.auth_header()),
        }
    }

    /// Sets the `Authorization` header of the request, replacing any existing one, and returns the
    /// request.
    pub fn decorate(&self, mut request: reqwest::Request) -> Result<reqwest::Request, Error> {
        let auth_header = {
            let auth_string = self.auth_header(&request);
            let mut auth_header = HeaderValue::from_str(&auth_string)
                .map_err(|_| Error::from(ErrorKind::BadAuthHeader))?;
            auth_header.set_sensitive(true);
            auth_header
        };

        request.headers_mut().insert(AUTHORIZATION, auth_header);
        Ok(request)
    }
}

impl From<OAuth10a> for RequestDecorator {
    fn from(auth: OAuth10a) -> Self {
        RequestDecorator::OAuth1Signing(auth)
    }
}

impl From<BearerToken> for RequestDecorator {
    fn from(auth: BearerToken) -> Self {
        RequestDecorator::BearerHeader(auth)
    }
}
