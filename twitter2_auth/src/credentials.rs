use std::fmt;

use serde::{Deserialize, Serialize};

/// The API key pair identifying a
/// [Twitter App](https://developer.twitter.com/en/docs/apps/overview), also known as the consumer
/// key and consumer secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApplicationCredential {
    consumer_key: Box<str>,
    consumer_secret: Box<str>,
}

impl ApplicationCredential {
    pub fn new<K, S>(consumer_key: K, consumer_secret: S) -> Self
    where
        K: Into<Box<str>>,
        S: Into<Box<str>>,
    {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }
}

impl fmt::Debug for ApplicationCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationCredential")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &Redacted)
            .finish()
    }
}

/// A temporary token pair issued by `oauth/request_token`. It is only good for building the
/// authorization URL and for a single access token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestToken {
    token: Box<str>,
    token_secret: Box<str>,
}

impl RequestToken {
    pub fn new<T, S>(token: T, token_secret: S) -> Self
    where
        T: Into<Box<str>>,
        S: Into<Box<str>>,
    {
        Self {
            token: token.into(),
            token_secret: token_secret.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn token_secret(&self) -> &str {
        &self.token_secret
    }
}

impl fmt::Debug for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestToken")
            .field("token", &self.token)
            .field("token_secret", &Redacted)
            .finish()
    }
}

/// A user access token pair. These do not expire, so it is common to persist one (it implements
/// `Serialize` and `Deserialize` for that reason) and hand it back to
/// [`DelegatedAuthHandler::set_access_token`](crate::auth::DelegatedAuthHandler::set_access_token)
/// later.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: Box<str>,
    token_secret: Box<str>,
}

impl AccessToken {
    pub fn new<T, S>(token: T, token_secret: S) -> Self
    where
        T: Into<Box<str>>,
        S: Into<Box<str>>,
    {
        Self {
            token: token.into(),
            token_secret: token_secret.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn token_secret(&self) -> &str {
        &self.token_secret
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &self.token)
            .field("token_secret", &Redacted)
            .finish()
    }
}

/// An app-only bearer token issued by `oauth2/token`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential {
    token: Box<str>,
}

impl BearerCredential {
    pub fn new<T>(token: T) -> Self
    where
        T: Into<Box<str>>,
    {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerCredential")
            .field("token", &Redacted)
            .finish()
    }
}

struct Redacted;

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
