//! Per-tenant write serialization.
//!
//! A tenant's collection is persisted whole and rewritten on every addition,
//! so two concurrent writers on one tenant would silently lose entries. All
//! mutation acquires the tenant's async mutex first; different tenants never
//! contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use passage_core::TenantId;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct TenantLocks {
    inner: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl TenantLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the mutex guarding the given tenant, creating it on first use.
    #[must_use]
    pub fn for_tenant(&self, tenant: &TenantId) -> Arc<Mutex<()>> {
        let mut map = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        map.entry(tenant.as_str().to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
