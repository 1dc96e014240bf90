use std::{future::Future, sync::OnceLock};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    client::{missing_field, successful_body, AsyncClient},
    config::Config,
    credentials::{ApplicationCredential, BearerCredential},
    decorator::{BearerToken, RequestDecorator},
    encoding::percent_encode,
    error::{Error, ErrorKind, ErrorRepr, ProtocolViolation},
};

use super::{resolve_username, AuthHandler};

const EXPECTED_TOKEN_TYPE: &str = "bearer";

/// Authenticates as a [Twitter App](https://developer.twitter.com/en/docs/apps/overview) rather
/// than as a user, using an
/// [app-only bearer token](https://developer.twitter.com/en/docs/authentication/oauth-2-0/application-only).
///
/// The bearer token is obtained when the handler is created, so a handler which exists is always
/// ready to use. It never changes afterwards, so the handler can be shared between tasks freely.
#[derive(Debug)]
pub struct AppOnlyAuthHandler {
    app: ApplicationCredential,
    bearer_token: BearerCredential,
    username: OnceLock<Box<str>>,
    http_client: reqwest::Client,
    config: Config,
}

impl AppOnlyAuthHandler {
    /// Exchanges the App's API key pair for a bearer token. Fails if Twitter does not issue a
    /// bearer token; there is no way to retry on the same handler, so just call this again.
    pub async fn new(app: ApplicationCredential) -> Result<Self, Error> {
        Self::with_config(app, Config::new()).await
    }

    pub async fn with_config(app: ApplicationCredential, config: Config) -> Result<Self, Error> {
        let http_client = config.http_client()?;
        let bearer_token = request_bearer_token(&http_client, &config, &app).await?;

        Ok(Self {
            app,
            bearer_token,
            username: OnceLock::new(),
            http_client,
            config,
        })
    }

    pub fn application(&self) -> &ApplicationCredential {
        &self.app
    }

    pub fn bearer_token(&self) -> &BearerCredential {
        &self.bearer_token
    }
}

impl AuthHandler for AppOnlyAuthHandler {
    fn apply_auth(&self) -> Result<RequestDecorator, Error> {
        Ok(BearerToken::from(&self.bearer_token).into())
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

#[derive(Deserialize)]
struct TokenResponse {
    token_type: Option<Box<str>>,
    access_token: Option<Box<str>>,
}

#[tracing::instrument(skip_all)]
async fn request_bearer_token(
    http_client: &reqwest::Client,
    config: &Config,
    app: &ApplicationCredential,
) -> Result<BearerCredential, Error>
{
    let endpoint = config.oauth2_url("token");

    debug!(endpoint = %endpoint, "requesting bearer token");

    // Twitter asks for both halves of the key pair to be percent-encoded before they are joined
    // and base64-encoded.
    let response = http_client
        .post(&endpoint)
        .basic_auth(
            percent_encode(app.consumer_key()),
            Some(percent_encode(app.consumer_secret())),
        )
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|err| ErrorRepr::at(&endpoint, ErrorKind::Transport(err)).boxed())?;

    let body = successful_body(&endpoint, response).await?;

    let token_response = serde_json::from_slice::<TokenResponse>(&body).map_err(|err| {
        ErrorRepr::at(
            &endpoint,
            ErrorKind::Protocol(ProtocolViolation::InvalidJson(err)),
        )
        .boxed()
    })?;

    if token_response.token_type.as_deref() != Some(EXPECTED_TOKEN_TYPE) {
        warn!(
            endpoint = %endpoint,
            token_type = ?token_response.token_type,
            "unexpected token type"
        );
        return Err(ErrorRepr::at(
            &endpoint,
            ErrorKind::Protocol(ProtocolViolation::UnexpectedTokenType(
                token_response.token_type,
            )),
        )
        .boxed());
    }

    let access_token = token_response
        .access_token
        .filter(|access_token| !access_token.is_empty())
        .ok_or_else(|| missing_field(&endpoint, "access_token"))?;

    debug!("obtained bearer token");

    Ok(BearerCredential::new(access_token))
}
