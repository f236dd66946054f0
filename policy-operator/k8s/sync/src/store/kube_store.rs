use super::{target_state, Store, StoreError, TargetResource};
use kube::api::DeleteParams;
use routeguard_policy_operator_core::{TargetKind, TargetRef, TargetState, FINALIZER, RESERVED_NAMESPACE};
use routeguard_policy_operator_k8s_api::{
    gateway, Api, Client, ListParams, NetworkPolicy, Patch, PatchParams, PostParams, Resource,
    ResourceExt, SecurityPolicy,
};
use std::collections::BTreeMap;

/// API-server-backed [`Store`]. Updates go through `replace`, so the
/// object's `resourceVersion` provides optimistic-concurrency conflict
/// detection.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn policies(&self, namespace: &str) -> Api<SecurityPolicy> {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn list_kind<K: TargetResource>(&self) -> Result<Vec<TargetState>, StoreError> {
        let api = Api::<K>::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(target_state).collect())
    }

    async fn patch_annotations<K: TargetResource>(
        &self,
        target: &TargetRef,
        annotations: BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        let api = Api::<K>::namespaced(self.client.clone(), &target.namespace);
        let patch = serde_json::json!({
            "metadata": { "annotations": annotations },
        });
        api.patch(&target.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }

    async fn edit_finalizer<K: TargetResource>(
        &self,
        target: &TargetRef,
        add: bool,
    ) -> Result<(), StoreError> {
        let api = Api::<K>::namespaced(self.client.clone(), &target.namespace);
        let mut resource = api.get(&target.name).await.map_err(StoreError::from)?;

        let finalizers = resource.meta_mut().finalizers.get_or_insert_with(Vec::new);
        if add {
            if finalizers.iter().any(|f| f == FINALIZER) {
                return Ok(());
            }
            finalizers.push(FINALIZER.to_string());
        } else {
            let len = finalizers.len();
            finalizers.retain(|f| f != FINALIZER);
            if finalizers.len() == len {
                return Ok(());
            }
        }

        api.replace(&target.name, &PostParams::default(), &resource)
            .await?;
        Ok(())
    }
}

macro_rules! dispatch_kind {
    ($kind:expr, $method:ident ( $self:expr $(, $arg:expr)* )) => {
        match $kind {
            TargetKind::Gateway => $self.$method::<gateway::Gateway>($($arg),*).await,
            TargetKind::HttpRoute => $self.$method::<gateway::HTTPRoute>($($arg),*).await,
            TargetKind::GrpcRoute => $self.$method::<gateway::GRPCRoute>($($arg),*).await,
        }
    };
}

#[async_trait::async_trait]
impl Store for KubeStore {
    async fn get_address_list(&self, name: &str) -> Result<NetworkPolicy, StoreError> {
        let api = Api::<NetworkPolicy>::namespaced(self.client.clone(), RESERVED_NAMESPACE);
        Ok(api.get(name).await?)
    }

    async fn get_security_policy(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<SecurityPolicy, StoreError> {
        Ok(self.policies(namespace).get(name).await?)
    }

    async fn list_security_policies(
        &self,
        namespace: &str,
    ) -> Result<Vec<SecurityPolicy>, StoreError> {
        let list = self
            .policies(namespace)
            .list(&ListParams::default())
            .await?;
        Ok(list.items)
    }

    async fn create_security_policy(
        &self,
        policy: SecurityPolicy,
    ) -> Result<SecurityPolicy, StoreError> {
        let namespace = policy.namespace().unwrap_or_default();
        Ok(self
            .policies(&namespace)
            .create(&PostParams::default(), &policy)
            .await?)
    }

    async fn update_security_policy(
        &self,
        policy: SecurityPolicy,
    ) -> Result<SecurityPolicy, StoreError> {
        let namespace = policy.namespace().unwrap_or_default();
        let name = policy.name_any();
        Ok(self
            .policies(&namespace)
            .replace(&name, &PostParams::default(), &policy)
            .await?)
    }

    async fn delete_security_policy(&self, policy: &SecurityPolicy) -> Result<(), StoreError> {
        let namespace = policy.namespace().unwrap_or_default();
        self.policies(&namespace)
            .delete(&policy.name_any(), &DeleteParams::default())
            .await?;
        Ok(())
    }

    async fn list_targets(&self, kind: TargetKind) -> Result<Vec<TargetState>, StoreError> {
        dispatch_kind!(kind, list_kind(self))
    }

    async fn patch_target_annotations(
        &self,
        target: &TargetRef,
        annotations: BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        dispatch_kind!(target.kind, patch_annotations(self, target, annotations))
    }

    async fn add_finalizer(&self, target: &TargetRef) -> Result<(), StoreError> {
        dispatch_kind!(target.kind, edit_finalizer(self, target, true))
    }

    async fn remove_finalizer(&self, target: &TargetRef) -> Result<(), StoreError> {
        dispatch_kind!(target.kind, edit_finalizer(self, target, false))
    }
}
