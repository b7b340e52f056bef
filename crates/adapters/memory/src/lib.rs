//! # Paybridge Memory Adapter
//!
//! An in-memory configuration resolver for Paybridge, primarily intended
//! for testing, development and single-node deployments with static tenants.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paybridge_adapter_memory::MemoryConfigResolver;
//!
//! let resolver = MemoryConfigResolver::new();
//! resolver
//!     .set_private_config(&tenant, json!({
//!         "integrations": { "stripe": { "secretKey": "sk_test_..." } }
//!     }))
//!     .await;
//! ```

use async_trait::async_trait;
use paybridge_core::error::{IntegrationError, IntegrationResult};
use paybridge_core::traits::{ConfigAccess, ConfigRequest, ConfigResolver};
use paybridge_core::TenantContext;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-memory storage for one configuration tree per tenant.
type Store = Arc<RwLock<HashMap<TenantContext, Value>>>;

/// In-memory configuration resolver.
///
/// Holds a default and a private configuration tree per tenant. Tenants with
/// no stored tree resolve to an empty object. Data is lost when the process
/// exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigResolver {
    default_trees: Store,
    private_trees: Store,
    closed: Arc<AtomicBool>,
}

impl MemoryConfigResolver {
    /// Creates a new in-memory resolver.
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self, access: ConfigAccess) -> &Store {
        match access {
            ConfigAccess::Default => &self.default_trees,
            ConfigAccess::Private => &self.private_trees,
        }
    }

    /// Replaces a tenant's private configuration tree.
    pub async fn set_private_config(&self, tenant: &TenantContext, tree: Value) {
        self.private_trees.write().await.insert(tenant.clone(), tree);
    }

    /// Replaces a tenant's default configuration tree.
    pub async fn set_default_config(&self, tenant: &TenantContext, tree: Value) {
        self.default_trees.write().await.insert(tenant.clone(), tree);
    }

    /// Deep-merges `patch` into a tenant's private configuration tree.
    ///
    /// Objects merge key by key; any other value replaces the existing one.
    /// A `null` removes the key.
    pub async fn patch_private_config(&self, tenant: &TenantContext, patch: Value) {
        let mut trees = self.private_trees.write().await;
        let tree = trees
            .entry(tenant.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        merge(tree, patch);
    }

    /// Removes every tree stored for a tenant.
    pub async fn remove_tenant(&self, tenant: &TenantContext) {
        self.default_trees.write().await.remove(tenant);
        self.private_trees.write().await.remove(tenant);
    }

    /// Returns the number of tenants with a private tree.
    pub async fn tenant_count(&self) -> usize {
        self.private_trees.read().await.len()
    }

    /// Whether [`ConfigResolver::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                if value.is_null() {
                    target.remove(&key);
                } else {
                    merge(target.entry(key).or_insert(Value::Null), value);
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

#[async_trait]
impl ConfigResolver for MemoryConfigResolver {
    async fn communicate(&self, tenant: &TenantContext, request: ConfigRequest) -> IntegrationResult<Value> {
        if self.is_closed() {
            return Err(IntegrationError::upstream("config", "resolver is closed"));
        }
        if request.kind != "_getConfig" {
            return Err(IntegrationError::internal(format!(
                "Unsupported config request '{}'",
                request.kind
            )));
        }

        let trees = self.store(request.access).read().await;
        Ok(trees
            .get(tenant)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
