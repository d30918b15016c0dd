use log::{info, warn};

use ringdns_proto::hash_key;

use crate::error::Result;
use crate::node::Node;

impl Node {
    /// Resolves `name` through the ring.
    ///
    /// The name is hashed onto the ring and the responsible node reported;
    /// the answer itself is served from the local cache when present,
    /// otherwise looked up, cached, and appended to the record store.
    /// Resolution failure leaves the cache unchanged; a store failure is
    /// logged and does not fail the query.
    pub async fn query(&self, name: &str) -> Result<Vec<String>> {
        let name = name.strip_prefix("www.").unwrap_or(name);
        let key = hash_key(name);

        let responsible = self.find_successor(key).await;
        if responsible.is_empty() {
            warn!("node {}: nobody answered for key {}", self.id, key);
        } else {
            info!(
                "node {}: {} hashes to {}, responsibility of {} ({})",
                self.id, name, key, responsible.id, responsible.addr
            );
        }

        let stamp = {
            let mut cache = self.cache.lock().await;
            let stamp = cache.bump();
            if let Some(entry) = cache.get(key) {
                info!("node {}: serving {} from cache", self.id, name);
                return Ok(entry.values.clone());
            }
            stamp
        };

        let addrs = self.resolver.resolve(name).await?;
        {
            let mut cache = self.cache.lock().await;
            cache.insert(key, addrs.clone(), stamp);
        }

        if let Err(err) = self.store.append(key, &addrs).await {
            warn!("node {}: failed to record key {}: {}", self.id, key, err);
        }

        Ok(addrs)
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn cached(&self, key: u64) -> bool {
        self.cache.lock().await.contains(key)
    }
}
