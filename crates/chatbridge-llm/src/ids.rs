//! Call identifier generation
//!
//! Function calls need an id that links them to their later response. When the
//! remote does not provide one we mint it here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of identifiers for function calls the remote left unnamed
pub trait CallIdGenerator: Send + Sync {
    /// Produce the next identifier; never empty
    fn next_id(&self) -> String;
}

/// Timestamp plus random suffix, unique enough within a response
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCallIds;

impl CallIdGenerator for RandomCallIds {
    fn next_id(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let random = uuid::Uuid::new_v4().simple().to_string();
        format!("call_{millis}_{}", &random[..9])
    }
}

/// Deterministic `call_<prefix>_<n>` identifiers
#[derive(Debug)]
pub struct SequentialCallIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialCallIds {
    /// Start counting from 1 under the given prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl CallIdGenerator for SequentialCallIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("call_{}_{n}", self.prefix)
    }
}
