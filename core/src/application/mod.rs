use crate::{
    domain::common::{AllerLensConfig, entities::app_errors::CoreError, services::Service},
    infrastructure::{
        hosted::HostedProject, identity::HostedIdentityProvider,
        menu_backend::HttpMenuBackend, storage::HostedRowStore,
    },
};

pub type AllerLensService = Service<HostedIdentityProvider, HostedRowStore>;

/// Wires the account services against the hosted project. Fails with
/// [`CoreError::NotConfigured`] when no identity provider is configured;
/// callers show the setup view instead.
pub fn create_service(config: &AllerLensConfig) -> Result<AllerLensService, CoreError> {
    let identity = config.identity.as_ref().ok_or(CoreError::NotConfigured)?;
    let project = HostedProject::new(identity);

    tracing::debug!(url = %project.base_url(), "Connecting to hosted project");

    Ok(Service::new(
        HostedIdentityProvider::new(project.clone()),
        HostedRowStore::new(project),
    ))
}

pub fn create_menu_backend(config: &AllerLensConfig) -> HttpMenuBackend {
    HttpMenuBackend::new(&config.backend.base_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::common::{BackendConfig, IdentityConfig};

    #[test]
    fn test_create_service_requires_identity() {
        let config = AllerLensConfig {
            backend: BackendConfig::default(),
            identity: None,
        };
        assert!(matches!(create_service(&config), Err(CoreError::NotConfigured)));
    }

    #[test]
    fn test_create_service_shares_project() {
        let config = AllerLensConfig {
            backend: BackendConfig::default(),
            identity: IdentityConfig::from_parts(
                Some("https://project.example.co".into()),
                Some("anon".into()),
                None,
            ),
        };

        let service = create_service(&config).unwrap();
        assert_eq!(
            service.identity_provider.project().base_url(),
            "https://project.example.co"
        );
        assert_eq!(create_menu_backend(&config).base_url(), "http://localhost:8000");
    }
}
