//! Content-addressed JSON store held in memory.

use crate::ports::outbound::IpfsGateway;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use shared_types::{SyncError, SyncResult};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Stores documents under a hash of their serialized form.
///
/// Hashes look like IPFS hashes but are not CIDs.
#[derive(Debug, Default)]
pub struct MemoryIpfs {
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryIpfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }
}

#[async_trait]
impl IpfsGateway for MemoryIpfs {
    async fn add_json(&self, document: &Value) -> SyncResult<String> {
        let encoded = serde_json::to_string(document).map_err(|e| SyncError::Transport {
            reason: format!("ipfs encode: {e}"),
        })?;
        let mut hasher = DefaultHasher::new();
        encoded.hash(&mut hasher);
        let hash = format!("Qm{:016x}", hasher.finish());

        self.documents.lock().insert(hash.clone(), document.clone());
        Ok(hash)
    }

    async fn cat_json(&self, hash: &str) -> SyncResult<Value> {
        self.documents
            .lock()
            .get(hash)
            .cloned()
            .ok_or_else(|| SyncError::Transport {
                reason: format!("ipfs: no document {hash}"),
            })
    }
}
