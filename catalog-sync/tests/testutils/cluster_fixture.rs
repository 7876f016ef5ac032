//! Cluster fixture for catalog-sync integration tests
//!
//! Every node gets its own client handle on a shared [`MemoryEnsemble`], its
//! own connector registry and its own announcer, exactly like separate
//! processes would. Requests go through each node's management router.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use catalog_sync::discovery::{parse_connector_ids, CONNECTOR_IDS_PROPERTY};
use catalog_sync::{CatalogSyncNode, MemoryEnsemble, SyncConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

pub const ROOT: &str = "/catalog/meta";
const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration with the feature enabled on the in-memory store
pub fn enabled_config() -> SyncConfig {
    SyncConfig {
        enabled: true,
        store_type: catalog_sync::StoreType::Memory,
        event_buffer: 16,
        ..SyncConfig::default()
    }
}

/// JSON body of a catalog definition
pub fn definition_json(name: &str, connector: &str, properties: &[(&str, &str)]) -> String {
    let properties: serde_json::Map<String, serde_json::Value> = properties
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();
    serde_json::json!({
        "catalogName": name,
        "connectorName": connector,
        "properties": properties,
    })
    .to_string()
}

/// Poll `condition` until it holds, panicking after a timeout
pub async fn wait_until<F>(what: &str, condition: F)
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while !condition() {
        if Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Connector ids in a node's last broadcast announcement
pub fn advertised_ids(node: &CatalogSyncNode) -> Vec<String> {
    node.announcer()
        .last_broadcast()
        .iter()
        .find(|a| a.service_type() == node.config().service_type)
        .map(|a| parse_connector_ids(a.properties().get(CONNECTOR_IDS_PROPERTY)))
        .unwrap_or_default()
}

pub struct ClusterFixture {
    ensemble: MemoryEnsemble,
    nodes: Vec<CatalogSyncNode>,
}

impl ClusterFixture {
    /// Build `size` nodes on one ensemble without starting them
    pub fn new(size: usize) -> Self {
        Self::with_config(size, enabled_config())
    }

    pub fn with_config(size: usize, config: SyncConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let ensemble = MemoryEnsemble::new();
        let nodes = (0..size)
            .map(|_| {
                let store = Arc::new(ensemble.connect(&config.namespace));
                CatalogSyncNode::with_store(config.clone(), store)
            })
            .collect();
        Self { ensemble, nodes }
    }

    /// Build and start `size` nodes
    pub async fn started(size: usize) -> Self {
        let fixture = Self::new(size);
        for node in &fixture.nodes {
            node.start().await.expect("node starts");
        }
        fixture
    }

    pub fn ensemble(&self) -> &MemoryEnsemble {
        &self.ensemble
    }

    pub fn node(&self, index: usize) -> &CatalogSyncNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[CatalogSyncNode] {
        &self.nodes
    }

    /// Send a request to one node's management router
    pub async fn request(
        &self,
        index: usize,
        method: Method,
        uri: &str,
        body: Option<String>,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .expect("valid request");
        let response = self
            .node(index)
            .router()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body readable");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, json)
    }

    pub async fn post_catalog(&self, index: usize, body: String) -> StatusCode {
        self.request(index, Method::POST, "/v1/catalog", Some(body))
            .await
            .0
    }

    pub async fn delete_catalog(&self, index: usize, name: &str) -> StatusCode {
        self.request(index, Method::DELETE, &format!("/v1/catalog/{}", name), None)
            .await
            .0
    }

    /// Wait until every node serves exactly `expected` catalogs
    pub async fn wait_converged(&self, expected: &[&str]) {
        for (index, node) in self.nodes.iter().enumerate() {
            wait_until(&format!("node {} to serve {:?}", index, expected), || {
                node.engine().active_catalogs() == expected
            })
            .await;
        }
    }
}

impl Drop for ClusterFixture {
    fn drop(&mut self) {
        for node in &self.nodes {
            node.shutdown();
        }
    }
}
