//! Multi-node convergence through one shared coordination ensemble

#[path = "testutils/mod.rs"]
mod testutils;

use axum::http::{Method, StatusCode};
use testutils::cluster_fixture::{advertised_ids, definition_json, wait_until, ClusterFixture};

#[tokio::test]
async fn test_write_on_one_node_converges_everywhere() {
    let cluster = ClusterFixture::started(3).await;

    let status = cluster
        .post_catalog(0, definition_json("sales", "memory", &[("region", "eu")]))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    cluster.wait_converged(&["sales"]).await;

    for node in cluster.nodes() {
        wait_until("every node to announce sales", || advertised_ids(node) == ["sales"]).await;
        assert!(node.node_manager().refresh_count() >= 1);
    }

    // Any node may read what another wrote
    let (status, json) = cluster.request(2, Method::GET, "/v1/catalog/sales", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["properties"]["region"], "eu");
}

#[tokio::test]
async fn test_update_and_delete_from_different_nodes() {
    let cluster = ClusterFixture::started(2).await;

    cluster
        .post_catalog(0, definition_json("sales", "memory", &[("k", "v")]))
        .await;
    cluster
        .post_catalog(0, definition_json("marketing", "blackhole", &[("k", "v")]))
        .await;
    cluster.wait_converged(&["marketing", "sales"]).await;

    cluster
        .post_catalog(1, definition_json("sales", "blackhole", &[("k", "v2")]))
        .await;
    for node in cluster.nodes() {
        wait_until("sales to switch connector", || {
            node.connectors().connector_of("sales").as_deref() == Some("blackhole")
        })
        .await;
        assert_eq!(node.engine().active_catalogs().len(), 2);
    }

    assert_eq!(cluster.delete_catalog(1, "marketing").await, StatusCode::NO_CONTENT);
    cluster.wait_converged(&["sales"]).await;
    for node in cluster.nodes() {
        wait_until("marketing to be withdrawn", || advertised_ids(node) == ["sales"]).await;
    }
}

#[tokio::test]
async fn test_late_joiner_catches_up_from_snapshot() {
    let cluster = ClusterFixture::new(2);
    cluster.node(0).start().await.unwrap();

    cluster
        .post_catalog(0, definition_json("sales", "memory", &[("k", "v")]))
        .await;
    cluster
        .post_catalog(0, definition_json("hr", "memory", &[("k", "v")]))
        .await;
    wait_until("first node to converge", || {
        cluster.node(0).engine().active_catalogs() == ["hr", "sales"]
    })
    .await;

    cluster.node(1).start().await.unwrap();
    cluster.wait_converged(&["hr", "sales"]).await;
}
