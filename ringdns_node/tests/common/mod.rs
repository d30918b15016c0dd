#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tonic::transport::Server;

use ringdns_node::error::{NodeError, Result};
use ringdns_node::resolve::Resolver;
use ringdns_node::storage::RecordStore;
use ringdns_node::transport::GrpcTransport;
use ringdns_node::{Node, NodeConfig};
use ringdns_proto::ring::ring_server::RingServer;

/// Fixed name-to-addresses table standing in for real DNS.
pub struct StaticResolver {
    entries: HashMap<String, Vec<String>>,
}

impl StaticResolver {
    pub fn new(entries: &[(&str, &[&str])]) -> Self {
        let entries = entries
            .iter()
            .map(|(name, addrs)| {
                let addrs = addrs.iter().map(|a| a.to_string()).collect();
                (name.to_string(), addrs)
            })
            .collect();
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::new(&[])
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve(&self, name: &str) -> Result<Vec<String>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| NodeError::ResolveFailed {
                name: name.to_string(),
                reason: "unknown host".to_string(),
            })
    }
}

/// Collects appended records in memory.
#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<Vec<(u64, Vec<String>)>>,
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append(&self, id: u64, addrs: &[String]) -> std::io::Result<()> {
        self.records.lock().await.push((id, addrs.to_vec()));
        Ok(())
    }
}

/// Starts a node on an ephemeral port and serves it in a background task.
/// Returns the node and the server handle, which can be aborted to simulate
/// a crash.
pub async fn start_node(
    resolver: Arc<dyn Resolver>,
    store: Arc<dyn RecordStore>,
) -> (Arc<Node>, tokio::task::JoinHandle<()>) {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let listener = TcpListener::bind(addr).await.unwrap();
    let local_addr = listener.local_addr().unwrap().to_string();
    let id = ringdns_proto::hash_key(&local_addr);

    let node = Arc::new(Node::new(
        id,
        local_addr,
        NodeConfig::default(),
        Arc::new(GrpcTransport::new()),
        resolver,
        store,
    ));

    let service = node.clone();
    let handle = tokio::spawn(async move {
        Server::builder()
            .add_service(RingServer::new((*service).clone()))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    // Give it a moment to start
    tokio::time::sleep(Duration::from_millis(100)).await;
    (node, handle)
}

pub async fn start_plain_node() -> (Arc<Node>, tokio::task::JoinHandle<()>) {
    start_node(Arc::new(StaticResolver::empty()), Arc::new(MemoryStore::default())).await
}

/// Drives the maintenance protocols synchronously for a fixed number of
/// rounds across the given nodes.
pub async fn run_maintenance(nodes: &[Arc<Node>], rounds: usize) {
    for _ in 0..rounds {
        for node in nodes {
            node.stabilize().await;
            node.fix_fingers().await;
            node.check_predecessor().await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// The id of the first live node clockwise at or after `k`.
pub fn responsible(ids: &[u64], k: u64) -> u64 {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    *sorted.iter().find(|&&id| id >= k).unwrap_or(&sorted[0])
}
