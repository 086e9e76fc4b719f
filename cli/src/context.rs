//! What every networked command needs: the API client and the durable store.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use erate_client::DefaultClient;
use erate_store::KeyValueStore;
use tracing::instrument;

use crate::config::CliConfig;

pub struct AppContext {
    pub client: DefaultClient,
    /// Shared with the client's token storage.
    pub store: Arc<dyn KeyValueStore>,
}

impl AppContext {
    #[instrument(skip_all, name = "init")]
    pub fn init(api_url: Option<String>) -> Result<Self> {
        let config = CliConfig::init(api_url)?;
        let store = config.open_store()?;
        let client = DefaultClient::with_store(config.client().clone(), Arc::clone(&store))
            .context("Failed to create HTTP client")?;
        Ok(Self { client, store })
    }
}
