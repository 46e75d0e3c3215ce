pub mod entities;
pub mod services;

/// Placeholder URL shipped in the sample environment file. Treated the same
/// as a missing value.
pub const IDENTITY_URL_PLACEHOLDER: &str = "your_supabase_project_url_here";

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

pub const DEFAULT_OAUTH_REDIRECT: &str = "http://localhost:3000/auth/callback";

#[derive(Clone, Debug)]
pub struct AllerLensConfig {
    pub backend: BackendConfig,
    pub identity: Option<IdentityConfig>,
}

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct IdentityConfig {
    pub url: String,
    pub anon_key: String,
    pub oauth_redirect: String,
}

impl IdentityConfig {
    /// Builds the identity configuration only when both values are present,
    /// non-blank and not the sample placeholder.
    pub fn from_parts(
        url: Option<String>,
        anon_key: Option<String>,
        oauth_redirect: Option<String>,
    ) -> Option<Self> {
        let url = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
        let anon_key = anon_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())?;

        if url == IDENTITY_URL_PLACEHOLDER {
            return None;
        }

        Some(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            oauth_redirect: oauth_redirect
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OAUTH_REDIRECT.to_string()),
        })
    }
}

impl AllerLensConfig {
    pub fn identity_configured(&self) -> bool {
        self.identity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_config_requires_both_values() {
        assert!(IdentityConfig::from_parts(Some("https://x.example".into()), None, None).is_none());
        assert!(IdentityConfig::from_parts(None, Some("key".into()), None).is_none());
        assert!(
            IdentityConfig::from_parts(Some("  ".into()), Some("key".into()), None).is_none()
        );
    }

    #[test]
    fn test_identity_config_rejects_placeholder() {
        let config = IdentityConfig::from_parts(
            Some(IDENTITY_URL_PLACEHOLDER.into()),
            Some("key".into()),
            None,
        );
        assert!(config.is_none());
    }

    #[test]
    fn test_identity_config_trims_trailing_slash_and_defaults_redirect() {
        let config = IdentityConfig::from_parts(
            Some("https://project.example.co/".into()),
            Some("anon".into()),
            None,
        )
        .unwrap();
        assert_eq!(config.url, "https://project.example.co");
        assert_eq!(config.oauth_redirect, DEFAULT_OAUTH_REDIRECT);
    }
}
