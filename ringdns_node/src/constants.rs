pub use ringdns_proto::{M, RING_SIZE};

pub const FINGER_TABLE_SIZE: usize = M as usize;
pub const CACHE_SIZE: usize = 5;
pub const DEFAULT_PORT: u16 = 5000;
pub const LOCALHOST: &str = "127.0.0.1";

// Intervals
pub const STABILIZE_INTERVAL_MS: u64 = 5000;
pub const FIX_FINGERS_INTERVAL_MS: u64 = 5000;
pub const CHECK_PREDECESSOR_INTERVAL_MS: u64 = 5000;

// An expired RPC is indistinguishable from a dead peer.
pub const RPC_TIMEOUT_MS: u64 = 2000;
pub const UNKNOWN_MESSAGE_DELAY_MS: u64 = 10;
