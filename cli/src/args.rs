use allerlens_core::domain::common::{
    AllerLensConfig, BackendConfig, DEFAULT_API_BASE, DEFAULT_OAUTH_REDIRECT, IdentityConfig,
};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "allerlens", version, about = "Ask whether a menu is safe for your allergies")]
pub struct Args {
    /// Base URL of the menu parsing and question-answering backend.
    #[arg(long, env = "ALLERLENS_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[command(flatten)]
    pub identity: IdentityArgs,

    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct IdentityArgs {
    /// Hosted identity project URL. Leave unset to get setup instructions.
    #[arg(long = "identity-url", env = "ALLERLENS_IDENTITY_URL")]
    pub url: Option<String>,

    #[arg(long = "identity-anon-key", env = "ALLERLENS_IDENTITY_ANON_KEY", hide_env_values = true)]
    pub anon_key: Option<String>,

    #[arg(long = "oauth-redirect", env = "ALLERLENS_OAUTH_REDIRECT", default_value = DEFAULT_OAUTH_REDIRECT)]
    pub oauth_redirect: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    #[arg(long = "log-level", env = "LOG_LEVEL", default_value = "warn")]
    pub level: String,

    #[arg(long = "log-json", env = "LOG_JSON", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check that the menu backend is reachable.
    Health,
    /// Interactive console (the default).
    Console,
}

impl From<Args> for AllerLensConfig {
    fn from(args: Args) -> Self {
        Self {
            backend: BackendConfig {
                base_url: args.api_base,
            },
            identity: IdentityConfig::from_parts(
                args.identity.url,
                args.identity.anon_key,
                Some(args.identity.oauth_redirect),
            ),
        }
    }
}
