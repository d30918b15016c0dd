use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Append-only sink for resolved records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append(&self, id: u64, addrs: &[String]) -> io::Result<()>;
}

/// Appends one `<id> : [addrs]` line per record to a local file, creating
/// the file on first use.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn append(&self, id: u64, addrs: &[String]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let line = format!("{} : {:?}\n", id, addrs);
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}
