//! A Chord-style distributed hash table node that resolves DNS names at the
//! responsible position on the identifier ring and caches the answers.

pub mod cache;
pub mod constants;
pub mod error;
pub mod interval;
pub mod node;
pub mod query;
pub mod resolve;
pub mod storage;
pub mod transport;

pub use node::{Node, NodeConfig, Pointer, RingState};
