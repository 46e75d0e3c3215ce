use std::future::Future;

use crate::domain::{
    authentication::entities::{
        OAuthProvider, OAuthRedirect, PasswordCredentials, Session, SignUpInput, SignUpOutcome,
        User,
    },
    common::entities::app_errors::CoreError,
};

/// Hosted identity provider. Credential checks, session persistence and
/// token refresh all live behind this port.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    fn sign_up(
        &self,
        input: SignUpInput,
    ) -> impl Future<Output = Result<SignUpOutcome, CoreError>> + Send;

    fn sign_in_with_password(
        &self,
        credentials: PasswordCredentials,
    ) -> impl Future<Output = Result<Session, CoreError>> + Send;

    /// Build the provider's authorize URL; the browser round-trip happens
    /// outside this client.
    fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: String,
    ) -> impl Future<Output = Result<OAuthRedirect, CoreError>> + Send;

    /// The session currently held by the provider client, if any.
    fn get_session(&self) -> impl Future<Output = Result<Option<Session>, CoreError>> + Send;

    /// Ask the provider who the current access token belongs to.
    fn get_user(&self) -> impl Future<Output = Result<User, CoreError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}
