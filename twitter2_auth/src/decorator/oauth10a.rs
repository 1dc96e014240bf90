use std::{borrow::Cow, fmt};

use base64::{engine::GeneralPurpose, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, CryptoRng, Rng};
use reqwest::header::CONTENT_TYPE;
use sha1::Sha1;

use crate::{
    credentials::{AccessToken, ApplicationCredential, RequestToken},
    encoding::{percent_encode, FormDecoder},
};

const NONCE_LEN: usize = 32;

/// A set of [OAuth 1.0a](https://oauth.net/core/1.0a/) credentials which signs requests with
/// HMAC-SHA1.
///
/// Usually this holds an API key pair together with a user's access token pair, and is used to
/// authenticate requests made on behalf of that user. During the token exchanges themselves it may
/// instead hold a request token, or no token at all.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuth10a {
    api_key_encoded: Box<str>,
    token_encoded: Option<Box<str>>,
    signing_key: Box<str>,
}

impl OAuth10a {
    /// Returns a new `OAuth10a` which can be used to authenticate requests made on behalf of a
    /// specific user.
    pub fn new(
        api_key: &str,
        api_key_secret: &str,
        access_token: &str,
        access_token_secret: &str,
    ) -> Self
    {
        Self::consumer_only(api_key, api_key_secret)
            .with_token(access_token, access_token_secret)
    }

    /// Returns a new `OAuth10a` which signs with the API key pair alone. The signing key's token
    /// secret component is left empty and no `oauth_token` parameter is sent.
    pub fn consumer_only(api_key: &str, api_key_secret: &str) -> Self {
        let signing_key = {
            let api_key_secret_encoded = percent_encode(api_key_secret);
            let mut buf = String::with_capacity(api_key_secret_encoded.len() + 1);
            buf.push_str(&api_key_secret_encoded);
            buf.push('&');
            buf.into_boxed_str()
        };

        Self {
            api_key_encoded: percent_encode(api_key).into(),
            token_encoded: None,
            signing_key,
        }
    }

    pub(crate) fn for_app(app: &ApplicationCredential) -> Self {
        Self::consumer_only(app.consumer_key(), app.consumer_secret())
    }

    pub(crate) fn for_request_token(app: &ApplicationCredential, token: &RequestToken) -> Self {
        Self::for_app(app).with_token(token.token(), token.token_secret())
    }

    pub(crate) fn for_access_token(app: &ApplicationCredential, token: &AccessToken) -> Self {
        Self::for_app(app).with_token(token.token(), token.token_secret())
    }

    /// Returns a new `OAuth10a` with the same API key pair but a different token pair.
    #[must_use]
    pub fn with_token(&self, token: &str, token_secret: &str) -> Self {
        let signing_key = {
            // Find the position of the ampersand which separates the API key secret from the
            // token secret.
            let sep_index = self
                .signing_key
                .find('&')
                .expect("the signing key should always contain an ampersand (&)");

            // Get the prefix of the original signing key containing the encoded API key secret and
            // the ampersand.
            let prefix = &self.signing_key[..(sep_index + 1)];

            let token_secret_encoded = percent_encode(token_secret);

            let mut buf = String::with_capacity(prefix.len() + token_secret_encoded.len());
            buf.push_str(prefix);
            buf.push_str(&token_secret_encoded);
            buf.into_boxed_str()
        };

        Self {
            api_key_encoded: self.api_key_encoded.clone(),
            token_encoded: Some(percent_encode(token).into()),
            signing_key,
        }
    }

    /// The percent-encoded token sent as `oauth_token`, if there is one.
    pub fn token_encoded(&self) -> Option<&str> {
        self.token_encoded.as_deref()
    }

    /// Returns the value of the `Authorization` header for the given request, signed with a fresh
    /// nonce and the current timestamp.
    pub fn auth_header(&self, request: &reqwest::Request) -> String {
        // The nonce is generated using only the characters 0..=9, A..=Z and a..=z, so it is
        // already percent-encoded.
        let nonce = gen_alphanumeric_nonce(&mut rand::thread_rng());
        let timestamp = Utc::now().timestamp();
        self.auth_header_with(request, &nonce, timestamp)
    }

    fn auth_header_with(&self, request: &reqwest::Request, nonce: &str, timestamp: i64) -> String {
        let signature = self.signature(request, nonce, timestamp);

        let mut buf = format!(
            r#"OAuth oauth_consumer_key="{}", oauth_nonce="{}", oauth_signature="{}", oauth_signature_method="HMAC-SHA1", oauth_timestamp="{}""#,
            self.api_key_encoded,
            nonce,
            percent_encode(&signature),
            timestamp,
        );
        if let Some(token_encoded) = &self.token_encoded {
            buf.push_str(r#", oauth_token=""#);
            buf.push_str(token_encoded);
            buf.push('"');
        }
        buf.push_str(r#", oauth_version="1.0""#);
        buf
    }

    fn parameter_string(
        &self,
        request: &reqwest::Request,
        nonce_encoded: &str,
        timestamp: i64,
    ) -> Box<str>
    {
        let timestamp = timestamp.to_string();

        let mut params = vec![
            (Cow::Borrowed("oauth_consumer_key"), Cow::Borrowed(&*self.api_key_encoded)),
            (Cow::Borrowed("oauth_nonce"), Cow::Borrowed(nonce_encoded)),
            (Cow::Borrowed("oauth_signature_method"), Cow::Borrowed("HMAC-SHA1")),
            (Cow::Borrowed("oauth_timestamp"), Cow::Borrowed(&*timestamp)),
            (Cow::Borrowed("oauth_version"), Cow::Borrowed("1.0")),
        ];

        if let Some(token_encoded) = &self.token_encoded {
            params.push((Cow::Borrowed("oauth_token"), Cow::Borrowed(&**token_encoded)));
        }

        for (key, val) in request.url().query_pairs() {
            params.push((
                Cow::Owned(percent_encode(&key).into_owned()),
                Cow::Owned(percent_encode(&val).into_owned()),
            ));
        }

        if let Some(body) = form_body(request) {
            for (key, val) in FormDecoder::new(body) {
                params.push((
                    Cow::Owned(percent_encode(&key).into_owned()),
                    Cow::Owned(percent_encode(&val).into_owned()),
                ));
            }
        }

        // Parameters are sorted by encoded key, then by encoded value. Duplicates are kept.
        params.sort_unstable();

        let mut buf = String::new();
        for (key, val) in params {
            if !buf.is_empty() {
                buf.push('&');
            }
            buf.push_str(&key);
            buf.push('=');
            buf.push_str(&val);
        }

        buf.into_boxed_str()
    }

    fn signature_base(
        &self,
        request: &reqwest::Request,
        nonce_encoded: &str,
        timestamp: i64,
    ) -> Box<str>
    {
        let method = request.method().as_str();
        let url = base_url(request.url());
        let base_url_encoded = percent_encode(&url);
        let parameter_string = self.parameter_string(request, nonce_encoded, timestamp);
        let parameter_string_encoded = percent_encode(&parameter_string);

        let cap = method.len() + base_url_encoded.len() + parameter_string_encoded.len() + 2;
        let mut buf = String::with_capacity(cap);
        buf.push_str(method);
        buf.push('&');
        buf.push_str(&base_url_encoded);
        buf.push('&');
        buf.push_str(&parameter_string_encoded);
        buf.into_boxed_str()
    }

    fn signature(
        &self,
        request: &reqwest::Request,
        nonce_encoded: &str,
        timestamp: i64,
    ) -> Box<str>
    {
        const BASE64_ENGINE: GeneralPurpose = base64::engine::general_purpose::STANDARD;

        let base = self.signature_base(request, nonce_encoded, timestamp);

        // Compute `hmac_sha1(signing_key, base)`.
        let signature_bytes = {
            let mut mac = Hmac::<Sha1>::new_from_slice(self.signing_key.as_bytes())
                .expect("HMAC-SHA1 should accept a key of any length");
            mac.update(base.as_bytes());
            mac.finalize().into_bytes()
        };

        BASE64_ENGINE.encode(signature_bytes).into_boxed_str()
    }
}

impl fmt::Debug for OAuth10a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth10a")
            .field("api_key", &self.api_key_encoded)
            .field("token", &self.token_encoded)
            .finish_non_exhaustive()
    }
}

/// The request URL without its query string or fragment. `Url` has already lowercased the scheme
/// and host and dropped any default port.
fn base_url(url: &reqwest::Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.as_str().to_owned()
}

/// The body of the request, if it is a form whose parameters must be included in the signature.
fn form_body(request: &reqwest::Request) -> Option<&[u8]> {
    let is_form = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .map_or(false, |content_type| {
            content_type.starts_with("application/x-www-form-urlencoded")
        });

    if is_form {
        request.body().and_then(reqwest::Body::as_bytes)
    } else {
        None
    }
}

fn gen_alphanumeric_nonce<R>(rng: &mut R) -> String
where
    R: Rng + CryptoRng + ?Sized,
{
    (0..NONCE_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}
