//! Wiring shared by every command.

use std::sync::Arc;

use shopline_storefront::api::{AdminClient, ApiClient};
use shopline_storefront::cart::{CartStore, FileStorage};
use shopline_storefront::config::StorefrontConfig;
use shopline_storefront::error::AppError;

use crate::console::ConsoleNotifier;

/// Backend client, persisted cart and notice sink for one invocation.
pub struct Context {
    pub client: ApiClient,
    pub store: CartStore,
    pub notifier: ConsoleNotifier,
}

impl Context {
    /// Build the client and open the cart under the configured data dir.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let client = ApiClient::new(&config.api)?;
        let store = CartStore::new(Arc::new(FileStorage::new(config.data_dir)));

        tracing::debug!(api = %client.base_url(), "Client ready");

        Ok(Self {
            client,
            store,
            notifier: ConsoleNotifier,
        })
    }

    #[must_use]
    pub fn admin(&self) -> AdminClient {
        AdminClient::new(self.client.clone())
    }
}
