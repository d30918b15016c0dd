pub mod ring {
    tonic::include_proto!("ring");
}

use ring::{RequestKind, RequestMessage, ResponseKind, ResponseMessage};

/// Ring bit-width. Hashing and finger indexing share this one value.
pub const M: u32 = 32;
/// Number of identifiers on the ring.
pub const RING_SIZE: u64 = 1 << M;

/// Hashes an arbitrary string onto the identifier ring: the first eight
/// bytes of its SHA-256 digest, big-endian, reduced mod 2^M.
pub fn hash_key(input: &str) -> u64 {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_be_bytes(bytes) % RING_SIZE
}

impl RequestMessage {
    pub fn ping() -> Self {
        Self {
            kind: RequestKind::Ping as i32,
            ..Default::default()
        }
    }

    pub fn find_successor(target_id: u64) -> Self {
        Self {
            kind: RequestKind::FindSuccessor as i32,
            target_id,
            ip: String::new(),
        }
    }

    pub fn closest_preceding_node(target_id: u64) -> Self {
        Self {
            kind: RequestKind::ClosestPrecedingNode as i32,
            target_id,
            ip: String::new(),
        }
    }

    pub fn get_predecessor() -> Self {
        Self {
            kind: RequestKind::GetPredecessor as i32,
            ..Default::default()
        }
    }

    pub fn notify(target_id: u64, ip: String) -> Self {
        Self {
            kind: RequestKind::Notify as i32,
            target_id,
            ip,
        }
    }
}

impl ResponseMessage {
    pub fn ack() -> Self {
        Self {
            kind: ResponseKind::Ack as i32,
            ..Default::default()
        }
    }

    /// Acknowledgement carrying a node pointer, as `FIND_SUCCESSOR` replies do.
    pub fn ack_pointer(node_id: u64, ip: String) -> Self {
        Self {
            kind: ResponseKind::Ack as i32,
            node_id,
            ip,
        }
    }

    /// Bare node pointer with the kind left unset, as `GET_PREDECESSOR`
    /// replies do.
    pub fn pointer(node_id: u64, ip: String) -> Self {
        Self {
            kind: ResponseKind::ResponseNone as i32,
            node_id,
            ip,
        }
    }

    /// The all-default reply: transport failure, timeout, or rejection.
    pub fn is_empty(&self) -> bool {
        self.kind == ResponseKind::ResponseNone as i32 && self.node_id == 0 && self.ip.is_empty()
    }
}
