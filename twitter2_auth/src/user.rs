use serde::Deserialize;

/// The part of the `account/verify_credentials` response that identifies the authenticated user.
/// The field is optional so that a response without it is reported as an unresolved identity
/// rather than as a JSON error.
#[derive(Deserialize, Debug)]
pub struct VerifiedUser {
    pub screen_name: Option<Box<str>>,
}
