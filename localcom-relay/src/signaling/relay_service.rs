use crate::config::RelayConfig;
use crate::registry::ConnectionRegistry;
use std::sync::Arc;

struct RelayInner {
    registry: ConnectionRegistry,
    config: RelayConfig,
}

/// Shared relay state handed to every connection handler.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl RelayService {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                registry: ConnectionRegistry::new(),
                config,
            }),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    pub fn connection_count(&self) -> usize {
        self.inner.registry.len()
    }
}
