use std::{borrow::Cow, future::Future, sync::OnceLock};

use enumscribe::ScribeStaticStr;
use tracing::debug;

use crate::{
    client::AsyncClient,
    config::Config,
    credentials::{AccessToken, ApplicationCredential, RequestToken},
    decorator::{OAuth10a, RequestDecorator},
    encoding::percent_encode,
    error::{Error, ErrorKind},
};

use super::{resolve_username, AuthHandler};

/// The `oauth_callback` value which asks Twitter to show the user a PIN instead of redirecting.
const OUT_OF_BAND: &str = "oob";

/// The level of access requested from the user, overriding the App's configured permissions.
#[derive(ScribeStaticStr, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AccessType {
    #[enumscribe(str = "read")]
    Read,
    #[enumscribe(str = "write")]
    Write,
}

impl AccessType {
    pub fn as_str(self) -> &'static str {
        self.scribe()
    }
}

/// An authorization in progress: a fresh request token and the URL the user must visit to approve
/// it. Hand it to [`DelegatedAuthHandler::get_access_token`] together with the verifier once the
/// user has done so. The exchange consumes it, so a request token cannot be used twice.
#[derive(Debug)]
pub struct PendingAuthorization {
    request_token: RequestToken,
    authorization_url: Box<str>,
}

impl PendingAuthorization {
    /// Rebuilds a pending authorization from a request token which was stored while waiting for
    /// the user, e.g. across the redirect to and from Twitter in a web application.
    pub fn resume<S>(request_token: RequestToken, authorization_url: S) -> Self
    where
        S: Into<Box<str>>,
    {
        Self {
            request_token,
            authorization_url: authorization_url.into(),
        }
    }

    pub fn authorization_url(&self) -> &str {
        &self.authorization_url
    }

    pub fn request_token(&self) -> &RequestToken {
        &self.request_token
    }
}

/// Authenticates on behalf of a user with the three-legged
/// [OAuth 1.0a flow](https://developer.twitter.com/en/docs/authentication/oauth-1-0a/obtaining-user-access-tokens).
///
/// 1. [`get_authorization_url`](Self::get_authorization_url) obtains a request token and the URL
///    the user must visit.
/// 2. The user approves the App and is redirected to the callback URL with an `oauth_verifier`, or
///    is shown a PIN if there is no callback URL.
/// 3. [`get_access_token`](Self::get_access_token) exchanges the verifier for an access token.
///
/// An access token obtained earlier can instead be supplied with
/// [`set_access_token`](Self::set_access_token). Use one handler per authorization in progress.
#[derive(Debug)]
pub struct DelegatedAuthHandler {
    app: ApplicationCredential,
    callback: Option<Box<str>>,
    access_type: Option<AccessType>,
    access_token: Option<AccessToken>,
    username: OnceLock<Box<str>>,
    http_client: reqwest::Client,
    config: Config,
}

impl DelegatedAuthHandler {
    /// Returns a new handler for the given App. Without a callback URL, the user is shown a PIN to
    /// enter into the application instead of being redirected.
    pub fn new(app: ApplicationCredential, callback: Option<&str>) -> Result<Self, Error> {
        Self::with_config(app, callback, Config::new())
    }

    pub fn with_config(
        app: ApplicationCredential,
        callback: Option<&str>,
        config: Config,
    ) -> Result<Self, Error>
    {
        Ok(Self {
            app,
            callback: callback.map(Into::into),
            access_type: None,
            access_token: None,
            username: OnceLock::new(),
            http_client: config.http_client()?,
            config,
        })
    }

    /// Requests `read` or `write` access regardless of the App's configured permissions.
    #[inline]
    #[must_use]
    pub fn access_type(self, access_type: AccessType) -> Self {
        Self {
            access_type: Some(access_type),
            ..self
        }
    }

    pub fn application(&self) -> &ApplicationCredential {
        &self.app
    }

    pub fn callback(&self) -> Option<&str> {
        self.callback.as_deref()
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    /// Obtains a new request token and returns it along with the URL of the page where the user
    /// can approve it. When `sign_in` is set, the URL is for the
    /// ["Sign in with Twitter"](https://developer.twitter.com/en/docs/authentication/guides/log-in-with-twitter)
    /// page, which skips the approval step for users who have already approved the App.
    ///
    /// Every call obtains a new request token.
    #[tracing::instrument(skip_all, fields(sign_in = sign_in))]
    pub async fn get_authorization_url(&self, sign_in: bool) -> Result<PendingAuthorization, Error> {
        let endpoint = self.config.oauth_url("request_token");

        let mut params = vec![(
            Cow::Borrowed("oauth_callback"),
            Cow::Borrowed(self.callback().unwrap_or(OUT_OF_BAND)),
        )];

        if let Some(access_type) = self.access_type {
            params.push((
                Cow::Borrowed("x_auth_access_type"),
                Cow::Borrowed(access_type.as_str()),
            ));
        }

        debug!(endpoint = %endpoint, "requesting request token");

        let (token, token_secret) = self
            .client(OAuth10a::for_app(&self.app))
            .token_exchange(&endpoint, &params)
            .await?;

        let request_token = RequestToken::new(token, token_secret);

        let page = if sign_in { "authenticate" } else { "authorize" };
        let authorization_url = format!(
            "{}?oauth_token={}",
            self.config.oauth_url(page),
            percent_encode(request_token.token())
        )
        .into_boxed_str();

        debug!(authorization_url = &*authorization_url, "obtained request token");

        Ok(PendingAuthorization {
            request_token,
            authorization_url,
        })
    }

    /// Exchanges an approved request token and its verifier for an access token, which is stored
    /// in this handler and returned.
    #[tracing::instrument(skip_all)]
    pub async fn get_access_token(
        &mut self,
        pending: PendingAuthorization,
        verifier: &str,
    ) -> Result<AccessToken, Error>
    {
        let endpoint = self.config.oauth_url("access_token");

        let params = [(Cow::Borrowed("oauth_verifier"), Cow::Borrowed(verifier))];

        debug!(endpoint = %endpoint, "exchanging verifier for access token");

        let (token, token_secret) = self
            .client(OAuth10a::for_request_token(&self.app, &pending.request_token))
            .token_exchange(&endpoint, &params)
            .await?;

        let access_token = AccessToken::new(token, token_secret);
        self.store_access_token(access_token.clone());

        debug!("obtained access token");

        Ok(access_token)
    }

    /// Uses an access token obtained some other way, such as one persisted from an earlier
    /// [`get_access_token`](Self::get_access_token). Replaces any access token already held.
    pub fn set_access_token<T, S>(&mut self, token: T, token_secret: S)
    where
        T: Into<Box<str>>,
        S: Into<Box<str>>,
    {
        self.store_access_token(AccessToken::new(token, token_secret));
    }

    /// Exchanges a user's username and password directly for an access token using
    /// [xAuth](https://developer.twitter.com/en/docs/authentication/oauth-1-0a/xauth). Twitter only
    /// allows this for Apps which have been approved for it.
    #[tracing::instrument(skip_all)]
    pub async fn get_token_via_password(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<AccessToken, Error>
    {
        let endpoint = self.config.oauth_url("access_token");

        let params = [
            (Cow::Borrowed("x_auth_mode"), Cow::Borrowed("client_auth")),
            (Cow::Borrowed("x_auth_password"), Cow::Borrowed(password)),
            (Cow::Borrowed("x_auth_username"), Cow::Borrowed(username)),
        ];

        debug!(endpoint = %endpoint, "exchanging password for access token");

        let (token, token_secret) = self
            .client(OAuth10a::for_app(&self.app))
            .token_exchange(&endpoint, &params)
            .await?;

        let access_token = AccessToken::new(token, token_secret);
        self.store_access_token(access_token.clone());

        debug!("obtained access token");

        Ok(access_token)
    }

    // The resolved username is memoized for the lifetime of the handler, so it is left alone
    // here even when the token changes.
    fn store_access_token(&mut self, access_token: AccessToken) {
        self.access_token = Some(access_token);
    }

    fn client(&self, auth: OAuth10a) -> AsyncClient {
        AsyncClient::with_http_client(self.http_client.clone(), auth.into(), &self.config)
    }
}

impl AuthHandler for DelegatedAuthHandler {
    fn apply_auth(&self) -> Result<RequestDecorator, Error> {
        let access_token = self
            .access_token
            .as_ref()
            .ok_or_else(|| Error::from(ErrorKind::NoAccessToken))?;

        Ok(OAuth10a::for_access_token(&self.app, access_token).into())
    }

    fn get_username(&self) -> impl Future<Output = Result<&str, Error>> + Send {
        resolve_username(&self.username, move || {
            Ok(AsyncClient::with_http_client(
                self.http_client.clone(),
                self.apply_auth()?,
                &self.config,
            ))
        })
    }
}
