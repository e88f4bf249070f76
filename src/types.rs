//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: process-unique, monotonically assigned connection identifier

use std::sync::atomic::{AtomicU64, Ordering};

/// Next identifier handed out by `ClientId::next`
static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(0);

/// Unique client identifier (newtype pattern)
///
/// Assigned when a connection is accepted. Identifiers are never reused
/// within the lifetime of the process, even after the client leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    /// Allocate the next identifier
    pub fn next() -> Self {
        Self(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client#{}", self.0)
    }
}
