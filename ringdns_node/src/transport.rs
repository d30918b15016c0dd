use std::time::Duration;

use async_trait::async_trait;
use ringdns_proto::ring::ring_client::RingClient;
use ringdns_proto::ring::{RequestMessage, ResponseMessage};

use crate::constants::RPC_TIMEOUT_MS;

/// Sends one request to the peer at `addr` and returns its reply.
///
/// Implementations map every failure (connect error, timeout, peer crash)
/// to the empty `ResponseMessage`; callers never see a transport error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, addr: &str, request: RequestMessage) -> ResponseMessage;
}

/// gRPC transport. One connection per exchange, the whole exchange bounded
/// by a single deadline.
pub struct GrpcTransport {
    timeout: Duration,
}

impl GrpcTransport {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_millis(RPC_TIMEOUT_MS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for GrpcTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    async fn call(&self, addr: &str, request: RequestMessage) -> ResponseMessage {
        let endpoint = format!("http://{}", addr);
        let exchange = async {
            let mut client = RingClient::connect(endpoint).await.ok()?;
            let reply = client.call(tonic::Request::new(request)).await.ok()?;
            Some(reply.into_inner())
        };
        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Some(reply)) => reply,
            _ => ResponseMessage::default(),
        }
    }
}
