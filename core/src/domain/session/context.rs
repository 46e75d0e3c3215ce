use tokio::sync::watch;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::domain::{
    authentication::{
        entities::{
            OAuthProvider, OAuthRedirect, PasswordCredentials, Session, SignUpInput,
            SignUpOutcome, User,
        },
        services::AuthService,
    },
    common::entities::app_errors::CoreError,
    profile::{entities::UserProfile, services::ProfileService, value_objects::ProfileUpdate},
};

/// What the rest of the client knows about the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub profile: Option<UserProfile>,
    /// True until the first session check resolves.
    pub loading: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            profile: None,
            loading: true,
        }
    }
}

/// Single owner of the current user and profile. Views hold a
/// [`SessionSubscription`] for as long as they are mounted.
pub struct SessionContext<S> {
    service: S,
    state: watch::Sender<SessionSnapshot>,
}

/// Live view of the session. Dropping it unsubscribes.
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: watch::Receiver<SessionSnapshot>,
}

impl SessionSubscription {
    pub fn current(&self) -> SessionSnapshot {
        self.receiver.borrow().clone()
    }

    /// Whether a change was published since the last [`Self::seen`] or
    /// [`Self::changed`].
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    pub fn seen(&mut self) -> SessionSnapshot {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for the next change. `None` once the context is gone.
    pub async fn changed(&mut self) -> Option<SessionSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {}
}

impl<S> SessionContext<S>
where
    S: AuthService + ProfileService,
{
    pub fn new(service: S) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self { service, state }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.state.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// First identity check. Failures end the loading state with no user.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        match self.service.get_current_session().await {
            Ok(session) => self.apply_session(session).await,
            Err(e) => {
                error!("Error getting initial session: {}", e);
                self.state.send_modify(|s| s.loading = false);
            }
        }
    }

    pub async fn sign_up(&self, input: SignUpInput) -> Result<SignUpOutcome, CoreError> {
        let outcome = self.service.sign_up(input).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            self.apply_session(Some(session.clone())).await;
        }
        Ok(outcome)
    }

    pub async fn sign_in(&self, credentials: PasswordCredentials) -> Result<User, CoreError> {
        let session = self.service.sign_in(credentials).await?;
        let user = session.user.clone();
        self.apply_session(Some(session)).await;
        Ok(user)
    }

    pub async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: String,
    ) -> Result<OAuthRedirect, CoreError> {
        self.service.sign_in_with_oauth(provider, redirect_to).await
    }

    /// The profile is dropped even when the provider call fails; the user is
    /// only dropped once the provider confirms.
    pub async fn sign_out(&self) -> Result<(), CoreError> {
        let result = self.service.sign_out().await;

        self.state.send_modify(|s| {
            s.profile = None;
            if result.is_ok() {
                s.user = None;
            }
        });

        result
    }

    pub async fn update_profile(&self, updates: ProfileUpdate) -> Result<UserProfile, CoreError> {
        let user = self.user().ok_or(CoreError::NotAuthenticated)?;

        let profile = self.service.update_profile(user.id, updates).await?;
        self.state
            .send_modify(|s| s.profile = Some(profile.clone()));

        Ok(profile)
    }

    /// Reloads the profile of the signed-in user. Load failures keep the
    /// current profile.
    pub async fn refresh_profile(&self) {
        let Some(user) = self.user() else {
            return;
        };

        if let Ok(profile) = self.load_profile(user.id).await {
            self.state.send_modify(|s| s.profile = profile);
        }
    }

    async fn apply_session(&self, session: Option<Session>) {
        let user = session.map(|s| s.user);
        let profile = match &user {
            Some(user) => self.load_profile(user.id).await.unwrap_or(None),
            None => None,
        };

        self.state.send_modify(|s| {
            s.user = user;
            s.profile = profile;
            s.loading = false;
        });
    }

    async fn load_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, CoreError> {
        self.service.get_profile(user_id).await.inspect_err(|e| {
            error!(%user_id, "Error loading profile: {}", e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        authentication::{entities::UserMetadata, ports::MockIdentityProvider},
        common::services::Service,
        storage::ports::MockRowStore,
    };
    use serde_json::json;

    const USER: &str = "0199a8c0-0000-7000-8000-0000000000aa";

    fn user() -> User {
        User {
            id: USER.parse().unwrap(),
            email: Some("sam@example.com".to_string()),
            user_metadata: UserMetadata::default(),
        }
    }

    fn session() -> Session {
        Session {
            access_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Some(1_900_000_000),
            user: user(),
        }
    }

    fn profile_row() -> serde_json::Value {
        json!({
            "id": USER,
            "email": "sam@example.com",
            "full_name": "Sam",
            "avatar_url": null,
            "phone": null,
            "date_of_birth": null,
            "emergency_contact_name": null,
            "emergency_contact_phone": null,
            "created_at": "2025-03-01T12:00:00Z",
            "updated_at": "2025-03-01T12:00:00Z"
        })
    }

    fn context(
        provider: MockIdentityProvider,
        store: MockRowStore,
    ) -> SessionContext<Service<MockIdentityProvider, MockRowStore>> {
        SessionContext::new(Service::new(provider, store))
    }

    #[tokio::test]
    async fn test_starts_loading() {
        let context = context(MockIdentityProvider::new(), MockRowStore::new());
        assert!(context.snapshot().loading);
        assert!(context.user().is_none());
    }

    #[tokio::test]
    async fn test_initialize_without_session() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_get_session()
            .returning(|| Box::pin(async { Ok(None) }));
        let mut store = MockRowStore::new();
        store.expect_get_row().never();

        let context = context(provider, store);
        context.initialize().await;

        let snapshot = context.snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.user.is_none());
    }

    #[tokio::test]
    async fn test_initialize_error_stops_loading() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_get_session()
            .returning(|| Box::pin(async { Err(CoreError::Transport("offline".to_string())) }));

        let context = context(provider, MockRowStore::new());
        context.initialize().await;
        assert!(!context.snapshot().loading);
    }

    #[tokio::test]
    async fn test_sign_in_loads_profile_and_notifies() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in_with_password()
            .returning(|_| Box::pin(async { Ok(session()) }));
        let mut store = MockRowStore::new();
        store
            .expect_get_row()
            .returning(|_| Box::pin(async { Ok(Some(profile_row())) }));

        let context = context(provider, store);
        let mut subscription = context.subscribe();

        let signed_in = context
            .sign_in(PasswordCredentials {
                email: "sam@example.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(signed_in, user());

        assert!(subscription.has_changed());
        let snapshot = subscription.seen();
        assert_eq!(snapshot.user, Some(user()));
        assert_eq!(
            snapshot.profile.and_then(|p| p.full_name),
            Some("Sam".to_string())
        );
        assert!(!subscription.has_changed());
    }

    #[tokio::test]
    async fn test_profile_load_failure_keeps_user_signed_in() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_get_session()
            .returning(|| Box::pin(async { Ok(Some(session())) }));
        let mut store = MockRowStore::new();
        store
            .expect_get_row()
            .returning(|_| Box::pin(async { Err(CoreError::HttpStatus { status: 500, body: String::new() }) }));

        let context = context(provider, store);
        context.initialize().await;

        let snapshot = context.snapshot();
        assert_eq!(snapshot.user, Some(user()));
        assert!(snapshot.profile.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_user_and_profile() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_get_session()
            .returning(|| Box::pin(async { Ok(Some(session())) }));
        provider
            .expect_sign_out()
            .returning(|| Box::pin(async { Ok(()) }));
        let mut store = MockRowStore::new();
        store
            .expect_get_row()
            .returning(|_| Box::pin(async { Ok(Some(profile_row())) }));

        let context = context(provider, store);
        context.initialize().await;
        assert!(context.snapshot().profile.is_some());

        context.sign_out().await.unwrap();
        let snapshot = context.snapshot();
        assert!(snapshot.user.is_none());
        assert!(snapshot.profile.is_none());
    }

    #[tokio::test]
    async fn test_failed_sign_out_still_clears_profile() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_get_session()
            .returning(|| Box::pin(async { Ok(Some(session())) }));
        provider.expect_sign_out().returning(|| {
            Box::pin(async { Err(CoreError::Transport("offline".to_string())) })
        });
        let mut store = MockRowStore::new();
        store
            .expect_get_row()
            .returning(|_| Box::pin(async { Ok(Some(profile_row())) }));

        let context = context(provider, store);
        context.initialize().await;

        assert!(context.sign_out().await.is_err());
        let snapshot = context.snapshot();
        assert!(snapshot.profile.is_none());
        assert_eq!(snapshot.user, Some(user()));
    }

    #[tokio::test]
    async fn test_update_profile_requires_user() {
        let mut store = MockRowStore::new();
        store.expect_update_rows().never();

        let context = context(MockIdentityProvider::new(), store);
        let result = context
            .update_profile(ProfileUpdate {
                phone: Some("555-0100".to_string()),
                ..Default::default()
            })
            .await;

        let error = result.unwrap_err();
        assert_eq!(error, CoreError::NotAuthenticated);
        assert_eq!(error.to_string(), "No user logged in");
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_receiver() {
        let context = context(MockIdentityProvider::new(), MockRowStore::new());
        let first = context.subscribe();
        let second = context.subscribe();
        assert_eq!(context.subscriber_count(), 2);

        first.unsubscribe();
        assert_eq!(context.subscriber_count(), 1);
        drop(second);
        assert_eq!(context.subscriber_count(), 0);
    }
}
