use axum::Router;
use powchain_core::{Blockchain, ChainConfig};
use powchain_node::client::HttpPeerClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub type HttpNode = Arc<Blockchain<HttpPeerClient>>;

/// Serve `router` on an ephemeral localhost port and return `"ip:port"`.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr.to_string()
}

pub fn http_node(reward_address: &str) -> HttpNode {
    let client = HttpPeerClient::new(Duration::from_secs(5)).unwrap();
    Arc::new(Blockchain::new(
        reward_address,
        ChainConfig::default(),
        client,
    ))
}

/// Start a node's HTTP interface.
pub async fn serve_node(node: &HttpNode) -> String {
    serve(powchain_node::api::router(Arc::clone(node))).await
}
