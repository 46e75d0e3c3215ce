use crate::domain::{authentication::ports::IdentityProvider, storage::ports::RowStore};

/// Account-side service: everything that talks to the hosted identity and
/// row-storage provider. Domain service traits are implemented on it.
#[derive(Clone)]
pub struct Service<IP, RS>
where
    IP: IdentityProvider,
    RS: RowStore,
{
    pub identity_provider: IP,
    pub row_store: RS,
}

impl<IP, RS> Service<IP, RS>
where
    IP: IdentityProvider,
    RS: RowStore,
{
    pub fn new(identity_provider: IP, row_store: RS) -> Self {
        Self {
            identity_provider,
            row_store,
        }
    }
}
