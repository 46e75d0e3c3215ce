use chrono::Utc;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::{
    domain::{
        authentication::{
            entities::{
                OAuthProvider, OAuthRedirect, PasswordCredentials, Session, SignUpInput,
                SignUpOutcome, User,
            },
            ports::IdentityProvider,
        },
        common::entities::app_errors::CoreError,
        storage::value_objects::decode_row,
    },
    infrastructure::{
        hosted::HostedProject,
        http::{send, send_json},
    },
};

#[derive(Debug, Clone)]
pub struct HostedIdentityProvider {
    project: HostedProject,
}

#[derive(Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpData<'a>,
}

#[derive(Serialize)]
struct SignUpData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Seconds before `expires_at` at which a session counts as expired.
const EXPIRY_MARGIN_SECS: i64 = 30;

fn needs_refresh(session: &Session, now: i64) -> bool {
    session.refresh_token.is_some()
        && session
            .expires_at
            .is_some_and(|expires_at| expires_at - EXPIRY_MARGIN_SECS <= now)
}

impl HostedIdentityProvider {
    pub fn new(project: HostedProject) -> Self {
        Self { project }
    }

    pub fn project(&self) -> &HostedProject {
        &self.project
    }
}

/// Sign-up answers with a full session when confirmation is disabled and
/// with the bare user (sometimes wrapped as `{ user, session: null }`)
/// when an email confirmation is pending.
fn sign_up_outcome(body: Value) -> Result<SignUpOutcome, CoreError> {
    if body.get("access_token").is_some() {
        return decode_row::<Session>(body).map(SignUpOutcome::SignedIn);
    }

    match body {
        Value::Object(mut map) if map.get("user").is_some_and(Value::is_object) => {
            let user = map.remove("user").unwrap_or_default();
            decode_row::<User>(user).map(SignUpOutcome::ConfirmationRequired)
        }
        other => decode_row::<User>(other).map(SignUpOutcome::ConfirmationRequired),
    }
}

fn authorize_url(
    base_url: &str,
    provider: OAuthProvider,
    redirect_to: &str,
) -> Result<String, CoreError> {
    let url = Url::parse_with_params(
        &format!("{}/auth/v1/authorize", base_url),
        &[("provider", provider.as_str()), ("redirect_to", redirect_to)],
    )
    .map_err(|e| CoreError::Invalid(format!("invalid identity provider URL: {}", e)))?;

    Ok(url.to_string())
}

impl IdentityProvider for HostedIdentityProvider {
    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn sign_up(&self, input: SignUpInput) -> Result<SignUpOutcome, CoreError> {
        let body = SignUpBody {
            email: &input.email,
            password: &input.password,
            data: SignUpData {
                full_name: input.full_name.as_deref(),
            },
        };

        let request = self
            .project
            .request(Method::POST, "/auth/v1/signup")
            .json(&body);
        let response: Value = send_json(request, "Sign up").await?;
        let outcome = sign_up_outcome(response)?;

        if let SignUpOutcome::SignedIn(session) = &outcome {
            self.project.set_session(Some(session.clone())).await;
        }

        Ok(outcome)
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_in_with_password(
        &self,
        credentials: PasswordCredentials,
    ) -> Result<Session, CoreError> {
        let body = PasswordGrant {
            email: &credentials.email,
            password: &credentials.password,
        };

        let request = self
            .project
            .request(Method::POST, "/auth/v1/token?grant_type=password")
            .json(&body);
        let session: Session = send_json(request, "Sign in").await?;

        info!(user_id = %session.user.id, "Password sign-in accepted");
        self.project.set_session(Some(session.clone())).await;
        Ok(session)
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: String,
    ) -> Result<OAuthRedirect, CoreError> {
        let url = authorize_url(self.project.base_url(), provider, &redirect_to)?;
        debug!(provider = provider.as_str(), %url, "Built OAuth authorize URL");

        Ok(OAuthRedirect { provider, url })
    }

    #[instrument(skip(self))]
    async fn get_session(&self) -> Result<Option<Session>, CoreError> {
        let Some(session) = self.project.session().await else {
            return Ok(None);
        };
        if !needs_refresh(&session, Utc::now().timestamp()) {
            return Ok(Some(session));
        }
        let Some(refresh_token) = session.refresh_token.as_deref() else {
            return Ok(Some(session));
        };

        let request = self
            .project
            .request(Method::POST, "/auth/v1/token?grant_type=refresh_token")
            .json(&RefreshGrant { refresh_token });

        match send_json::<Session>(request, "Refresh session").await {
            Ok(mut fresh) => {
                if fresh.refresh_token.is_none() {
                    fresh.refresh_token = session.refresh_token.clone();
                }
                info!(user_id = %fresh.user.id, "Session refreshed");
                self.project.set_session(Some(fresh.clone())).await;
                Ok(Some(fresh))
            }
            Err(e) => {
                warn!("Session refresh failed: {}", e.with_body());
                self.project.set_session(None).await;
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_user(&self) -> Result<User, CoreError> {
        if self.project.session().await.is_none() {
            return Err(CoreError::NotAuthenticated);
        }

        let request = self.project.authorized(Method::GET, "/auth/v1/user").await;
        send_json(request, "Get user").await
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), CoreError> {
        if self.project.session().await.is_none() {
            return Ok(());
        }

        let request = self
            .project
            .authorized(Method::POST, "/auth/v1/logout")
            .await;
        send(request, "Sign out").await?;

        self.project.set_session(None).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const USER_ID: &str = "6f1c2d4e-9a7b-4c3d-8e2f-1a2b3c4d5e6f";

    #[test]
    fn test_sign_up_with_session_signs_in() {
        let outcome = sign_up_outcome(json!({
            "access_token": "jwt",
            "refresh_token": "r",
            "expires_at": 1760000000,
            "user": { "id": USER_ID, "email": "sam@example.com" }
        }))
        .unwrap();

        match outcome {
            SignUpOutcome::SignedIn(session) => {
                assert_eq!(session.access_token, "jwt");
                assert_eq!(session.user.email.as_deref(), Some("sam@example.com"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_sign_up_pending_confirmation() {
        let bare = sign_up_outcome(json!({ "id": USER_ID, "email": "sam@example.com" })).unwrap();
        assert!(matches!(bare, SignUpOutcome::ConfirmationRequired(_)));

        let wrapped = sign_up_outcome(json!({
            "user": { "id": USER_ID, "email": "sam@example.com" },
            "session": null
        }))
        .unwrap();
        assert!(matches!(wrapped, SignUpOutcome::ConfirmationRequired(u) if u.id.to_string() == USER_ID));
    }

    #[test]
    fn test_authorize_url_encodes_redirect() {
        let url = authorize_url(
            "https://project.example.co",
            OAuthProvider::Google,
            "http://localhost:3000/auth/callback",
        )
        .unwrap();

        assert_eq!(
            url,
            "https://project.example.co/auth/v1/authorize?provider=google&redirect_to=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"
        );
    }

    fn session(refresh_token: Option<&str>, expires_at: Option<i64>) -> Session {
        decode_row(json!({
            "access_token": "jwt",
            "refresh_token": refresh_token,
            "expires_at": expires_at,
            "user": { "id": USER_ID, "email": "sam@example.com" }
        }))
        .unwrap()
    }

    #[test]
    fn test_needs_refresh_near_expiry_only() {
        let now = 1_760_000_000;

        assert!(needs_refresh(&session(Some("r"), Some(now - 1)), now));
        assert!(needs_refresh(&session(Some("r"), Some(now + 10)), now));
        assert!(!needs_refresh(&session(Some("r"), Some(now + 3600)), now));
        assert!(!needs_refresh(&session(None, Some(now - 1)), now));
        assert!(!needs_refresh(&session(Some("r"), None), now));
    }

    #[tokio::test]
    async fn test_get_user_without_session_is_unauthenticated() {
        let provider = HostedIdentityProvider::new(HostedProject::with_client(
            "http://127.0.0.1:1",
            "anon",
            reqwest::Client::new(),
        ));

        assert_eq!(provider.get_user().await, Err(CoreError::NotAuthenticated));
        assert_eq!(provider.sign_out().await, Ok(()));
    }
}
