//! Application state shared by every handler.

use beatvault_core::Config;
use beatvault_storage::SignedUrlBroker;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub broker: SignedUrlBroker,
}

impl AppState {
    pub fn new(config: Config, broker: SignedUrlBroker) -> Self {
        Self { config, broker }
    }
}
