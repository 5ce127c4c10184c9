//! API server configuration.

use vital_core::ProviderConfig;

/// Configuration for the API server.
///
/// The server binary fills this from its `--host`/`--port` arguments and
/// [`ProviderConfig::from_env`].
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// Provider credential, model, timeout and prompt policy.
    pub provider: ProviderConfig,
}
