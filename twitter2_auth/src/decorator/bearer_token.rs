use std::fmt;

use crate::credentials::BearerCredential;

/// An app-only bearer token which can be used to authenticate requests made on behalf of a
/// [Twitter App](https://developer.twitter.com/en/docs/apps/overview). For example, this can be
/// used to retrieve public Tweets, but cannot be used to publish new Tweets.
///
/// For more information about bearer tokens, see the
/// [Twitter documentation](https://developer.twitter.com/en/docs/authentication/oauth-2-0/bearer-tokens).
///
/// If you want to make requests on behalf of a user rather than a Twitter App, see
/// [`OAuth10a`](crate::decorator::OAuth10a).
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    auth_header: Box<str>,
}

impl BearerToken {
    pub fn new<S>(token: S) -> Self
    where
        S: AsRef<str>,
    {
        let bearer_token = token.as_ref();

        // Create the Authorization header ahead-of-time, since it will be the same for every
        // request using this `BearerToken`.
        let auth_header = {
            const PREFIX: &str = "Bearer ";
            let mut buf = String::with_capacity(PREFIX.len() + bearer_token.len());
            buf.push_str(PREFIX);
            buf.push_str(bearer_token);
            buf.into_boxed_str()
        };

        Self { auth_header }
    }

    pub fn auth_header(&self) -> &str {
        &self.auth_header
    }
}

impl From<&BearerCredential> for BearerToken {
    fn from(credential: &BearerCredential) -> Self {
        Self::new(credential.token())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken").finish_non_exhaustive()
    }
}
