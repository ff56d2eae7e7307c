use std::sync::Arc;

use rpl_dispatch::Dispatcher;
use tokio::net::TcpListener;

use crate::config::{NodeConfig, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// RidePool HTTP server.
pub struct RidePoolServer {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
}

impl RidePoolServer {
    pub fn new(config: ServerConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self { config, dispatcher }
    }

    /// Open the configured ledger and wire a dispatcher over it.
    pub fn from_node_config(node: &NodeConfig) -> ServerResult<Self> {
        let ledger = node.ledger.open()?;
        let dispatcher = Dispatcher::new(ledger, node.rides.clone());
        Ok(Self::new(node.server.clone(), Arc::new(dispatcher)))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.dispatcher))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("RidePool server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_from_default_config() {
        let server = RidePoolServer::from_node_config(&NodeConfig::default()).unwrap();
        assert_eq!(server.config().bind_addr.port(), crate::config::DEFAULT_PORT);
        assert_eq!(server.dispatcher().ledger().height().unwrap(), 0);
    }

    #[test]
    fn router_builds() {
        let server = RidePoolServer::from_node_config(&NodeConfig::default()).unwrap();
        let _router = server.router();
    }
}
