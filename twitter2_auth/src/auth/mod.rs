pub mod app_only;
pub mod delegated;

pub use app_only::AppOnlyAuthHandler;
pub use delegated::{AccessType, DelegatedAuthHandler, PendingAuthorization};

use std::{future::Future, sync::OnceLock};

use tracing::debug;

use crate::{
    client::AsyncClient,
    decorator::RequestDecorator,
    error::{Error, ErrorKind, ErrorRepr},
};

/// The capability shared by every authentication flow: producing a [`RequestDecorator`] for
/// outgoing requests, and finding out which user the credentials belong to.
pub trait AuthHandler: sealed::Sealed {
    /// Returns a decorator built from the handler's current credentials. This never performs any
    /// I/O. Fails with [`ErrorKind::NoAccessToken`] if the handler is not ready yet.
    fn apply_auth(&self) -> Result<RequestDecorator, Error>;

    /// Returns the screen name of the authenticated user, calling `account/verify_credentials` the
    /// first time and returning the remembered answer after that.
    ///
    /// App-only credentials have no associated user, so Twitter rejects this call for an
    /// [`AppOnlyAuthHandler`].
    fn get_username(&self) -> impl Future<Output = Result<&str, Error>> + Send;
}

/// Either of the authentication flows, for callers who only decide which one to use at runtime.
#[derive(Debug)]
pub enum AnyAuthHandler {
    Delegated(DelegatedAuthHandler),
    AppOnly(AppOnlyAuthHandler),
}

impl AuthHandler for AnyAuthHandler {
    fn apply_auth(&self) -> Result<RequestDecorator, Error> {
        match self {
            AnyAuthHandler::Delegated(handler) => handler.apply_auth(),
            AnyAuthHandler::AppOnly(handler) => handler.apply_auth(),
        }
    }

    fn get_username(&self) -> impl Future<Output = Result<&str, Error>> + Send {
        async move {
            match self {
                AnyAuthHandler::Delegated(handler) => handler.get_username().await,
                AnyAuthHandler::AppOnly(handler) => handler.get_username().await,
            }
        }
    }
}

impl From<DelegatedAuthHandler> for AnyAuthHandler {
    fn from(handler: DelegatedAuthHandler) -> Self {
        AnyAuthHandler::Delegated(handler)
    }
}

impl From<AppOnlyAuthHandler> for AnyAuthHandler {
    fn from(handler: AppOnlyAuthHandler) -> Self {
        AnyAuthHandler::AppOnly(handler)
    }
}

pub(crate) async fn resolve_username<F>(
    cache: &OnceLock<Box<str>>,
    make_client: F,
) -> Result<&str, Error>
where
    F: FnOnce() -> Result<AsyncClient, Error>,
{
    if let Some(username) = cache.get() {
        return Ok(&**username);
    }

    let client = make_client()?;
    let user = client.verify_credentials().await?;

    let username = user
        .screen_name
        .filter(|screen_name| !screen_name.is_empty())
        .ok_or_else(|| {
            ErrorRepr::at(
                &client.config().api_url("account/verify_credentials.json"),
                ErrorKind::IdentityUnresolved { status: None },
            )
            .boxed()
        })?;

    debug!(username = &*username, "resolved authenticated user");

    Ok(&**cache.get_or_init(|| username))
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::app_only::AppOnlyAuthHandler {}
    impl Sealed for super::delegated::DelegatedAuthHandler {}
    impl Sealed for super::AnyAuthHandler {}
}
