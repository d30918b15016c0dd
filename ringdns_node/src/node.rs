use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tonic::{Request, Response, Status};

use ringdns_proto::ring::ring_server::Ring;
use ringdns_proto::ring::{RequestKind, RequestMessage, ResponseKind, ResponseMessage};

use crate::cache::QueryCache;
use crate::constants::{
    CACHE_SIZE, CHECK_PREDECESSOR_INTERVAL_MS, FINGER_TABLE_SIZE, FIX_FINGERS_INTERVAL_MS,
    RING_SIZE, STABILIZE_INTERVAL_MS, UNKNOWN_MESSAGE_DELAY_MS,
};
use crate::error::{NodeError, Result};
use crate::interval::{belongs_to, between};
use crate::resolve::Resolver;
use crate::storage::RecordStore;
use crate::transport::Transport;

/// A (node id, network address) pair naming a peer on the ring.
///
/// The default value is the empty sentinel meaning "unknown". A pointer is a
/// lookup key carried in messages and state, never an owning reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pointer {
    pub id: u64,
    pub addr: String,
}

impl Pointer {
    pub fn new(id: u64, addr: impl Into<String>) -> Self {
        Self {
            id,
            addr: addr.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id == 0 && self.addr.is_empty()
    }

    fn from_reply(reply: &ResponseMessage) -> Self {
        Self::new(reply.node_id, reply.ip.clone())
    }
}

/// The published ring pointers, shared between the dispatcher and the
/// maintenance tasks. Reads clone out of the lock before any RPC.
#[derive(Debug)]
pub struct RingState {
    pub successor: Pointer,
    pub predecessor: Option<Pointer>,
    pub finger_table: Vec<Pointer>,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub cache_size: usize,
    pub stabilize_interval: Duration,
    pub fix_fingers_interval: Duration,
    pub check_predecessor_interval: Duration,
    /// Log every inbound peer message.
    pub logging: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            cache_size: CACHE_SIZE,
            stabilize_interval: Duration::from_millis(STABILIZE_INTERVAL_MS),
            fix_fingers_interval: Duration::from_millis(FIX_FINGERS_INTERVAL_MS),
            check_predecessor_interval: Duration::from_millis(CHECK_PREDECESSOR_INTERVAL_MS),
            logging: false,
        }
    }
}

#[derive(Clone)]
pub struct Node {
    pub id: u64,
    pub addr: String,
    pub config: NodeConfig,
    pub state: Arc<RwLock<RingState>>,
    pub(crate) cache: Arc<Mutex<QueryCache>>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) resolver: Arc<dyn Resolver>,
    pub(crate) store: Arc<dyn RecordStore>,
}

impl Node {
    pub fn new(
        id: u64,
        addr: String,
        config: NodeConfig,
        transport: Arc<dyn Transport>,
        resolver: Arc<dyn Resolver>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        let state = RingState {
            successor: Pointer::new(id, addr.clone()),
            predecessor: None,
            finger_table: vec![Pointer::default(); FINGER_TABLE_SIZE],
        };
        let cache = QueryCache::new(config.cache_size);
        Node {
            id,
            addr,
            config,
            state: Arc::new(RwLock::new(state)),
            cache: Arc::new(Mutex::new(cache)),
            transport,
            resolver,
            store,
        }
    }

    fn pointer(&self) -> Pointer {
        Pointer::new(self.id, self.addr.clone())
    }

    /// Founds a new ring when `helper` carries no port separator, otherwise
    /// asks the helper for our successor. The finger table stays empty until
    /// the first fix-fingers pass; routing falls back to the successor
    /// meanwhile.
    pub async fn join(&self, helper: &str) -> Result<()> {
        if !helper.contains(':') {
            info!("node {}: creating a new ring", self.id);
            let mut state = self.state.write().await;
            state.successor = self.pointer();
            state.predecessor = None;
            return Ok(());
        }

        info!("node {}: joining the ring via {}", self.id, helper);
        let reply = self
            .transport
            .call(helper, RequestMessage::find_successor(self.id))
            .await;
        let successor = Pointer::from_reply(&reply);
        if successor.is_empty() {
            return Err(NodeError::JoinFailed(helper.to_string()));
        }
        info!("node {}: successor is {}", self.id, successor.id);
        let mut state = self.state.write().await;
        state.successor = successor;
        state.predecessor = None;
        Ok(())
    }

    /// Resolves the node responsible for `k`.
    ///
    /// Returns the local successor when it covers `k` or when no finger is
    /// usable; otherwise forwards to the closest preceding finger and returns
    /// whatever comes back. A failed forward yields the empty pointer, which
    /// callers treat as "try again later".
    pub async fn find_successor(&self, k: u64) -> Pointer {
        let successor = { self.state.read().await.successor.clone() };
        if belongs_to(k, self.id, successor.id) {
            return successor;
        }

        let next = self.closest_preceding_node(k).await;
        if next.is_empty() || next.id == self.id {
            // One-node ring, or every finger is stale.
            return successor;
        }

        let reply = self
            .transport
            .call(&next.addr, RequestMessage::find_successor(k))
            .await;
        Pointer::from_reply(&reply)
    }

    /// Scans the finger table top-down for the entry closest below `k`.
    pub async fn closest_preceding_node(&self, k: u64) -> Pointer {
        let state = self.state.read().await;
        for finger in state.finger_table.iter().rev() {
            if finger.is_empty() {
                continue;
            }
            if between(finger.id, self.id, k) {
                return finger.clone();
            }
        }
        self.pointer()
    }

    /// One stabilization round: adopt the successor's predecessor when it
    /// sits between us, repair a dead successor, then announce ourselves.
    pub async fn stabilize(&self) {
        let successor = { self.state.read().await.successor.clone() };

        let reply = self
            .transport
            .call(&successor.addr, RequestMessage::get_predecessor())
            .await;
        let x = Pointer::from_reply(&reply);
        if !x.is_empty() {
            if between(x.id, self.id, successor.id) {
                debug!("node {}: successor is now {}", self.id, x.id);
                self.state.write().await.successor = x;
            }
        } else {
            // Either the successor is gone or it has no predecessor yet.
            // Re-resolve our own successor, with self as the last resort.
            let mut repaired = self.find_successor(self.id).await;
            if repaired.is_empty() {
                repaired = self.pointer();
            }
            if repaired.id != successor.id {
                warn!(
                    "node {}: successor {} unreachable, now {}",
                    self.id, successor.id, repaired.id
                );
            }
            self.state.write().await.successor = repaired;
        }

        let successor = { self.state.read().await.successor.clone() };
        if successor.id != self.id {
            let reply = self
                .transport
                .call(
                    &successor.addr,
                    RequestMessage::notify(self.id, self.addr.clone()),
                )
                .await;
            if reply.kind() == ResponseKind::Ack {
                debug!(
                    "node {}: successor {} accepted us as predecessor",
                    self.id, successor.id
                );
            }
        }
    }

    /// Handles a peer claiming to be our predecessor. Returns whether the
    /// claim was accepted.
    pub async fn notify(&self, x: Pointer) -> bool {
        let mut state = self.state.write().await;
        let accept = match &state.predecessor {
            None => true,
            Some(pred) => between(x.id, pred.id, self.id),
        };
        if accept {
            debug!("node {}: predecessor is now {}", self.id, x.id);
            state.predecessor = Some(x);
        }
        accept
    }

    /// Refreshes every finger entry in ascending index order. Entries keep
    /// their previous value when resolution fails; the scan skips empties.
    pub async fn fix_fingers(&self) {
        for i in 0..FINGER_TABLE_SIZE {
            let target = (self.id + (1u64 << i)) % RING_SIZE;
            let finger = self.find_successor(target).await;
            if finger.is_empty() {
                continue;
            }
            let mut state = self.state.write().await;
            state.finger_table[i] = finger;
        }
    }

    /// Clears the predecessor pointer when it stops answering pings.
    pub async fn check_predecessor(&self) {
        let predecessor = { self.state.read().await.predecessor.clone() };
        let Some(pred) = predecessor else {
            return;
        };
        let reply = self
            .transport
            .call(&pred.addr, RequestMessage::ping())
            .await;
        if reply.is_empty() {
            warn!("node {}: predecessor {} stopped answering", self.id, pred.id);
            self.state.write().await.predecessor = None;
        }
    }

    /// Launches the three maintenance loops on independent periods. They run
    /// until the process exits; a failed round is retried on the next tick.
    pub fn spawn_maintenance(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let stabilize = {
            let node = Arc::clone(self);
            tokio::spawn(async move {
                loop {
                    sleep(node.config.stabilize_interval).await;
                    node.stabilize().await;
                }
            })
        };
        let fix_fingers = {
            let node = Arc::clone(self);
            tokio::spawn(async move {
                loop {
                    sleep(node.config.fix_fingers_interval).await;
                    node.fix_fingers().await;
                }
            })
        };
        let check_predecessor = {
            let node = Arc::clone(self);
            tokio::spawn(async move {
                loop {
                    sleep(node.config.check_predecessor_interval).await;
                    node.check_predecessor().await;
                }
            })
        };
        vec![stabilize, fix_fingers, check_predecessor]
    }

    /// Serves one inbound peer request. Every request gets a reply; the
    /// empty reply doubles as a rejection.
    pub async fn handle_message(&self, request: RequestMessage) -> ResponseMessage {
        let kind = request.kind();
        if self.config.logging {
            debug!("node {}: received {:?}", self.id, kind);
        }
        match kind {
            RequestKind::Ping => ResponseMessage::ack(),
            RequestKind::FindSuccessor => {
                let found = self.find_successor(request.target_id).await;
                ResponseMessage::ack_pointer(found.id, found.addr)
            }
            RequestKind::ClosestPrecedingNode => {
                let found = self.closest_preceding_node(request.target_id).await;
                ResponseMessage::ack_pointer(found.id, found.addr)
            }
            RequestKind::GetPredecessor => {
                let state = self.state.read().await;
                match &state.predecessor {
                    Some(pred) => ResponseMessage::pointer(pred.id, pred.addr.clone()),
                    None => ResponseMessage::default(),
                }
            }
            RequestKind::Notify => {
                let claimant = Pointer::new(request.target_id, request.ip);
                if self.notify(claimant).await {
                    ResponseMessage::ack()
                } else {
                    ResponseMessage::default()
                }
            }
            RequestKind::Put | RequestKind::Get => {
                // Reserved kinds; peers get the empty reply until these
                // mean something.
                ResponseMessage::default()
            }
            RequestKind::RequestNone => {
                sleep(Duration::from_millis(UNKNOWN_MESSAGE_DELAY_MS)).await;
                ResponseMessage::default()
            }
        }
    }
}

#[tonic::async_trait]
impl Ring for Node {
    async fn call(
        &self,
        request: Request<RequestMessage>,
    ) -> std::result::Result<Response<ResponseMessage>, Status> {
        Ok(Response::new(self.handle_message(request.into_inner()).await))
    }
}
