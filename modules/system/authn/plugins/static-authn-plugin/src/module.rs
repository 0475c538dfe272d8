//! Registration of the static `AuthN` plugin.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{AuthNMode, StaticAuthNPluginConfig};
use crate::domain::Service;

/// Adds the static client to `svc`.
pub fn register(svc: &mut authn::Service, cfg: &StaticAuthNPluginConfig) {
    if cfg.mode == AuthNMode::AcceptAll {
        warn!(
            "Static AuthN plugin is running in `accept_all` mode: \
             every token is accepted with a hardcoded identity. \
             Do NOT use this mode in production."
        );
    }

    info!(
        priority = cfg.priority,
        header = %cfg.header_name,
        mode = ?cfg.mode,
        token_count = cfg.tokens.len(),
        "Loaded plugin configuration"
    );

    svc.register_client(Arc::new(Service::from_config(cfg)));
}
