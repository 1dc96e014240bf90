use std::{borrow::Cow, sync::Arc};

use enumscribe::ScribeStaticStr;
use tracing::{debug, warn};

use crate::{
    config::Config,
    decorator::RequestDecorator,
    encoding::FormDecoder,
    error::{Error, ErrorKind, ErrorRepr, ProtocolViolation},
    request_data::{FormData, QueryData, RequestData},
    user::VerifiedUser,
};

/// An HTTP client which attaches the authorization material of a [`RequestDecorator`] to every
/// request it sends.
#[derive(Clone, Debug)]
pub struct AsyncClient {
    http_client: reqwest::Client,
    decorator: Arc<RequestDecorator>,
    config: Config,
}

impl AsyncClient {
    pub(crate) fn with_http_client(
        http_client: reqwest::Client,
        decorator: RequestDecorator,
        config: &Config,
    ) -> Self
    {
        Self {
            http_client,
            decorator: Arc::new(decorator),
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds, decorates and sends the request. Only transport-level failures are reported as
    /// errors; the response status is left for the caller to inspect.
    pub async fn execute<'req, ReqData>(
        &self,
        request: Request<'req, ReqData>,
    ) -> Result<reqwest::Response, Error>
    where
        ReqData: RequestData,
    {
        let endpoint = request.base_url;

        let http_request = {
            let builder = self
                .http_client
                .request(request.method.to_reqwest_method(), request.base_url);

            request
                .data
                .build_http_request(builder)
                .map_err(|err| ErrorRepr::at(endpoint, ErrorKind::Transport(err)).boxed())?
        };

        let http_request = self
            .decorator
            .decorate(http_request)
            .map_err(|err| ErrorRepr::at(endpoint, err.into_kind()).boxed())?;

        debug!(method = request.method.as_str(), endpoint, "sending request");

        self.http_client
            .execute(http_request)
            .await
            .map_err(|err| ErrorRepr::at(endpoint, ErrorKind::Transport(err)).boxed())
    }

    /// POSTs the form to one of the OAuth 1.0a token endpoints and returns the `oauth_token` and
    /// `oauth_token_secret` from the form-encoded response.
    pub(crate) async fn token_exchange(
        &self,
        endpoint: &str,
        params: &[(Cow<'_, str>, Cow<'_, str>)],
    ) -> Result<(Box<str>, Box<str>), Error>
    {
        let response = self
            .execute(Request::new(
                Method::Post,
                endpoint,
                FormData::new(params),
            ))
            .await?;

        let body = successful_body(endpoint, response).await?;

        let (mut token, mut token_secret) = (None, None);

        for (key, val) in FormDecoder::new(&body) {
            match &*key {
                "oauth_token" => {
                    token = Some(val);
                }
                "oauth_token_secret" => {
                    token_secret = Some(val);
                }
                _ => (),
            }
        }

        // A blank value is as unusable for signing as an absent one.
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| missing_field(endpoint, "oauth_token"))?
            .into_owned()
            .into_boxed_str();

        let token_secret = token_secret
            .filter(|token_secret| !token_secret.is_empty())
            .ok_or_else(|| missing_field(endpoint, "oauth_token_secret"))?
            .into_owned()
            .into_boxed_str();

        Ok((token, token_secret))
    }

    /// Calls `account/verify_credentials`, which responds with the user the credentials belong
    /// to. A rejected request is reported as [`ErrorKind::IdentityUnresolved`].
    pub async fn verify_credentials(&self) -> Result<VerifiedUser, Error> {
        let endpoint = self.config.api_url("account/verify_credentials.json");

        let params = [("include_entities", "false"), ("skip_status", "true")];

        let response = self
            .execute(Request::new(
                Method::Get,
                &endpoint,
                QueryData::new(&params),
            ))
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %endpoint, %status, "credentials were rejected");
            return Err(ErrorRepr::at(
                &endpoint,
                ErrorKind::IdentityUnresolved { status: Some(status) },
            )
            .boxed());
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| ErrorRepr::at(&endpoint, ErrorKind::Transport(err)).boxed())?;

        serde_json::from_slice::<VerifiedUser>(&body).map_err(|err| {
            ErrorRepr::at(
                &endpoint,
                ErrorKind::Protocol(ProtocolViolation::InvalidJson(err)),
            )
            .boxed()
        })
    }
}

/// Reads the response body, or fails with [`ProtocolViolation::ErrorStatus`] if the response
/// status is not 2XX.
pub(crate) async fn successful_body(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<Vec<u8>, Error>
{
    let status = response.status();

    let body = response
        .bytes()
        .await
        .map_err(|err| ErrorRepr::at(endpoint, ErrorKind::Transport(err)).boxed())?;

    if !status.is_success() {
        warn!(endpoint, %status, "provider returned an error status");
        return Err(ErrorRepr::at(
            endpoint,
            ErrorKind::Protocol(ProtocolViolation::ErrorStatus {
                status,
                body: String::from_utf8_lossy(&body).into(),
            }),
        )
        .boxed());
    }

    Ok(body.to_vec())
}

pub(crate) fn missing_field(endpoint: &str, field: &'static str) -> Error {
    warn!(endpoint, field, "field missing from provider response");
    ErrorRepr::at(
        endpoint,
        ErrorKind::Protocol(ProtocolViolation::MissingField(field)),
    )
    .boxed()
}

#[derive(ScribeStaticStr, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Method {
    #[enumscribe(str = "GET")]
    Get,
    #[enumscribe(str = "POST")]
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        self.scribe()
    }

    fn to_reqwest_method(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

pub struct Request<'a, D> {
    method: Method,
    base_url: &'a str,
    data: D,
}

impl<'a, D> Request<'a, D> {
    pub fn new(method: Method, base_url: &'a str, data: D) -> Self {
        Self {
            method,
            base_url,
            data,
        }
    }
}
