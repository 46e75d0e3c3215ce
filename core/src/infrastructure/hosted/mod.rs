use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder};
use tokio::sync::RwLock;

use crate::domain::{authentication::entities::Session, common::IdentityConfig};

/// Connection to a hosted identity + row storage project. The identity
/// adapter writes the session here and the row store reads the access
/// token from it, so both must be built from clones of one project.
#[derive(Debug, Clone)]
pub struct HostedProject {
    base_url: String,
    anon_key: String,
    http: Client,
    session: Arc<RwLock<Option<Session>>>,
}

impl HostedProject {
    pub fn new(config: &IdentityConfig) -> Self {
        Self::with_client(&config.url, &config.anon_key, Client::new())
    }

    pub fn with_client(base_url: &str, anon_key: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            http,
            session: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn set_session(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }

    /// Request carrying only the project key.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
    }

    /// Request authorized as the signed-in user, or as the anonymous role
    /// when nobody is signed in.
    pub async fn authorized(&self, method: Method, path: &str) -> RequestBuilder {
        let token = match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        };

        self.request(method, path).bearer_auth(token)
    }
}
