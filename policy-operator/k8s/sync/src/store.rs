mod kube_store;

pub use self::kube_store::KubeStore;

use routeguard_policy_operator_core::{TargetKind, TargetRef, TargetState, FINALIZER};
use routeguard_policy_operator_k8s_api::{gateway, NetworkPolicy, Resource, ResourceExt, SecurityPolicy};
use std::collections::BTreeMap;

/// Cluster object access consumed by the engine.
///
/// `NotFound` is an expected outcome on several paths (no policy created
/// yet, a named address list that has been deleted) and is surfaced as a
/// distinct variant rather than an opaque failure. `Conflict` marks an
/// optimistic-concurrency collision; callers surface it for retry rather
/// than overwriting.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Fetches a named address-list NetworkPolicy from the reserved
    /// namespace.
    async fn get_address_list(&self, name: &str) -> Result<NetworkPolicy, StoreError>;

    async fn get_security_policy(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<SecurityPolicy, StoreError>;

    async fn list_security_policies(
        &self,
        namespace: &str,
    ) -> Result<Vec<SecurityPolicy>, StoreError>;

    async fn create_security_policy(
        &self,
        policy: SecurityPolicy,
    ) -> Result<SecurityPolicy, StoreError>;

    async fn update_security_policy(
        &self,
        policy: SecurityPolicy,
    ) -> Result<SecurityPolicy, StoreError>;

    async fn delete_security_policy(&self, policy: &SecurityPolicy) -> Result<(), StoreError>;

    /// Lists every target of the given kind across all namespaces.
    async fn list_targets(&self, kind: TargetKind) -> Result<Vec<TargetState>, StoreError>;

    /// Merge-patches the given annotations onto a target, leaving the
    /// rest of the object untouched.
    async fn patch_target_annotations(
        &self,
        target: &TargetRef,
        annotations: BTreeMap<String, String>,
    ) -> Result<(), StoreError>;

    async fn add_finalizer(&self, target: &TargetRef) -> Result<(), StoreError>;

    async fn remove_finalizer(&self, target: &TargetRef) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("resource not found")]
    NotFound,

    #[error("write conflicted with a concurrent update: {0}")]
    Conflict(String),

    #[error("store request failed: {0}")]
    Transient(#[source] anyhow::Error),
}

impl From<kube::Error> for StoreError {
    fn from(error: kube::Error) -> Self {
        match error {
            kube::Error::Api(ref response) if response.code == 404 => StoreError::NotFound,
            kube::Error::Api(ref response) if response.code == 409 => {
                StoreError::Conflict(response.message.clone())
            }
            error => StoreError::Transient(error.into()),
        }
    }
}

/// A managed Gateway API kind.
pub trait TargetResource:
    kube::Resource<DynamicType = (), Scope = kube::core::NamespaceResourceScope>
    + Clone
    + std::fmt::Debug
    + serde::de::DeserializeOwned
    + serde::Serialize
    + Send
    + Sync
    + 'static
{
    const KIND: TargetKind;
}

impl TargetResource for gateway::Gateway {
    const KIND: TargetKind = TargetKind::Gateway;
}

impl TargetResource for gateway::HTTPRoute {
    const KIND: TargetKind = TargetKind::HttpRoute;
}

impl TargetResource for gateway::GRPCRoute {
    const KIND: TargetKind = TargetKind::GrpcRoute;
}

/// Snapshots the parts of a target the engine acts on.
pub fn target_state<K: TargetResource>(resource: &K) -> TargetState {
    TargetState {
        target: TargetRef::new(
            K::KIND,
            resource.namespace().unwrap_or_default(),
            resource.name_any(),
        ),
        annotations: resource.annotations().clone(),
        finalizer_present: resource.finalizers().iter().any(|f| f == FINALIZER),
        deletion_requested: resource.meta().deletion_timestamp.is_some(),
    }
}
