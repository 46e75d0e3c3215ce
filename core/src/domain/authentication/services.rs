use std::future::Future;

use tracing::instrument;

use crate::domain::{
    authentication::{
        entities::{
            OAuthProvider, OAuthRedirect, PasswordCredentials, Session, SignUpInput,
            SignUpOutcome, User,
        },
        ports::IdentityProvider,
    },
    common::{entities::app_errors::CoreError, services::Service},
    storage::ports::RowStore,
};

#[cfg_attr(test, mockall::automock)]
pub trait AuthService: Send + Sync {
    fn sign_up(
        &self,
        input: SignUpInput,
    ) -> impl Future<Output = Result<SignUpOutcome, CoreError>> + Send;

    fn sign_in(
        &self,
        credentials: PasswordCredentials,
    ) -> impl Future<Output = Result<Session, CoreError>> + Send;

    fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: String,
    ) -> impl Future<Output = Result<OAuthRedirect, CoreError>> + Send;

    fn get_current_session(
        &self,
    ) -> impl Future<Output = Result<Option<Session>, CoreError>> + Send;

    fn get_current_user(&self) -> impl Future<Output = Result<User, CoreError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl<IP, RS> AuthService for Service<IP, RS>
where
    IP: IdentityProvider,
    RS: RowStore,
{
    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn sign_up(&self, input: SignUpInput) -> Result<SignUpOutcome, CoreError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(CoreError::Invalid(
                "email and password are required".to_string(),
            ));
        }

        let outcome = self.identity_provider.sign_up(input).await?;
        match &outcome {
            SignUpOutcome::SignedIn(session) => {
                tracing::info!(user_id = %session.user.id, "User signed up and signed in")
            }
            SignUpOutcome::ConfirmationRequired(user) => {
                tracing::info!(user_id = %user.id, "User signed up, confirmation pending")
            }
        }

        Ok(outcome)
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_in(&self, credentials: PasswordCredentials) -> Result<Session, CoreError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(CoreError::Invalid(
                "email and password are required".to_string(),
            ));
        }

        let session = self
            .identity_provider
            .sign_in_with_password(credentials)
            .await?;

        tracing::info!(user_id = %session.user.id, "User signed in");
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: String,
    ) -> Result<OAuthRedirect, CoreError> {
        self.identity_provider
            .sign_in_with_oauth(provider, redirect_to)
            .await
    }

    async fn get_current_session(&self) -> Result<Option<Session>, CoreError> {
        self.identity_provider.get_session().await
    }

    async fn get_current_user(&self) -> Result<User, CoreError> {
        self.identity_provider.get_user().await
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), CoreError> {
        self.identity_provider.sign_out().await?;
        tracing::info!("User signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        authentication::{entities::UserMetadata, ports::MockIdentityProvider},
        storage::ports::MockRowStore,
    };
    use uuid::Uuid;

    fn session() -> Session {
        Session {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: None,
            user: User {
                id: Uuid::nil(),
                email: Some("sam@example.com".to_string()),
                user_metadata: UserMetadata::default(),
            },
        }
    }

    #[tokio::test]
    async fn test_sign_in_forwards_credentials() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in_with_password()
            .withf(|c| c.email == "sam@example.com" && c.password == "pw")
            .times(1)
            .returning(|_| Box::pin(async { Ok(session()) }));

        let service = Service::new(provider, MockRowStore::new());
        let session = service
            .sign_in(PasswordCredentials {
                email: "sam@example.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.user.id, Uuid::nil());
    }

    #[tokio::test]
    async fn test_sign_in_with_blank_email_never_calls_provider() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_sign_in_with_password().never();

        let service = Service::new(provider, MockRowStore::new());
        let result = service
            .sign_in(PasswordCredentials {
                email: " ".to_string(),
                password: "pw".to_string(),
            })
            .await;
        assert!(matches!(result, Err(CoreError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_sign_out_propagates_provider_error() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_sign_out().returning(|| {
            Box::pin(async { Err(CoreError::Transport("connection reset".to_string())) })
        });

        let service = Service::new(provider, MockRowStore::new());
        assert_eq!(
            service.sign_out().await,
            Err(CoreError::Transport("connection reset".to_string()))
        );
    }
}
