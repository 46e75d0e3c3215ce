pub mod hosted_identity;

pub use hosted_identity::HostedIdentityProvider;
