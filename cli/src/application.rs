use std::sync::Arc;

use allerlens_core::{
    application::{create_menu_backend, create_service},
    domain::{
        common::{AllerLensConfig, entities::app_errors::CoreError},
        menu::ports::MenuBackend,
        session::{SessionContext, SessionGate},
        workflow::MenuWorkflow,
    },
};
use tracing::{info, warn};

use crate::args::{Args, Command};
use crate::application::console::Console;

pub mod console;
pub mod logging;

pub async fn run(args: Arc<Args>) -> Result<(), anyhow::Error> {
    let config = AllerLensConfig::from(args.as_ref().clone());
    let backend = create_menu_backend(&config);

    if let Some(Command::Health) = args.command {
        let status = backend.health().await?;
        println!("{}: {}", backend.base_url(), status.status);
        if !status.is_ok() {
            anyhow::bail!("backend reported status {}", status.status);
        }
        return Ok(());
    }

    let session = match create_service(&config) {
        Ok(service) => Some(SessionContext::new(service)),
        Err(CoreError::NotConfigured) => {
            warn!("Identity provider is not configured");
            None
        }
        Err(e) => return Err(e.into()),
    };

    info!(api_base = %config.backend.base_url, "Starting console");

    let redirect = config
        .identity
        .as_ref()
        .map(|identity| identity.oauth_redirect.clone())
        .unwrap_or_default();

    let mut console = Console::new(
        MenuWorkflow::new(backend),
        SessionGate::for_config(&config),
        session,
        redirect,
    );

    console.run().await
}
