use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

use crate::error::{NodeError, Result};

/// Resolves a host name to its addresses, in answer order.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Vec<String>>;
}

/// DNS resolver using the system configuration, falling back to the
/// built-in defaults when none can be read.
pub struct DnsResolver {
    inner: TokioAsyncResolver,
}

impl DnsResolver {
    pub fn new() -> Self {
        let inner = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|_| {
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { inner }
    }
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resolver for DnsResolver {
    async fn resolve(&self, name: &str) -> Result<Vec<String>> {
        let lookup = self
            .inner
            .lookup_ip(name)
            .await
            .map_err(|err| NodeError::ResolveFailed {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
        let addrs: Vec<String> = lookup.iter().map(|ip| ip.to_string()).collect();
        if addrs.is_empty() {
            return Err(NodeError::ResolveFailed {
                name: name.to_string(),
                reason: "no address records".to_string(),
            });
        }
        Ok(addrs)
    }
}
