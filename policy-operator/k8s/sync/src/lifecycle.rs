use crate::{
    selector::{find_canonical_policy, references_target},
    store::{Store, StoreError},
};
use routeguard_policy_operator_core::TargetRef;
use routeguard_policy_operator_k8s_api::{
    ObjectMeta, PolicyTargetReference, SecurityPolicy, SecurityPolicySpec,
};

const TARGET_GROUP: &str = "gateway.networking.k8s.io";

/// Returns the canonical SecurityPolicy for the target, creating it if
/// none exists.
///
/// A found policy has its `targetRefs` rewritten to a singleton naming
/// exactly this target, discarding any other references it carried.
/// When the selector finds nothing but a policy with the deterministic
/// name already exists, that policy is adopted rather than
/// duplicate-created, so re-running after a partial failure converges.
pub async fn ensure_canonical_policy(
    store: &dyn Store,
    target: &TargetRef,
) -> Result<SecurityPolicy, StoreError> {
    let singleton = vec![target_reference(target)];

    if let Some(mut policy) = find_canonical_policy(store, target).await? {
        if policy.spec.target_refs == singleton {
            return Ok(policy);
        }
        policy.spec.target_refs = singleton;
        return store.update_security_policy(policy).await;
    }

    let name = target.policy_name();
    match store.get_security_policy(&target.namespace, &name).await {
        Ok(mut existing) => {
            existing.spec.target_refs = singleton;
            store.update_security_policy(existing).await
        }
        Err(StoreError::NotFound) => {
            let policy = SecurityPolicy {
                metadata: ObjectMeta {
                    name: Some(name),
                    namespace: Some(target.namespace.clone()),
                    ..Default::default()
                },
                spec: SecurityPolicySpec {
                    target_refs: vec![target_reference(target)],
                    authorization: None,
                },
            };
            store.create_security_policy(policy).await
        }
        Err(error) => Err(error),
    }
}

/// Detaches the target from its canonical policy. A policy whose sole
/// reference is this target is deleted outright; a shared policy only
/// loses this target's entry.
pub async fn detach(store: &dyn Store, target: &TargetRef) -> Result<(), StoreError> {
    let Some(mut policy) = find_canonical_policy(store, target).await? else {
        return Ok(());
    };

    policy
        .spec
        .target_refs
        .retain(|reference| !references_target(reference, target));

    if policy.spec.target_refs.is_empty() {
        return match store.delete_security_policy(&policy).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(error) => Err(error),
        };
    }

    store.update_security_policy(policy).await.map(drop)
}

fn target_reference(target: &TargetRef) -> PolicyTargetReference {
    PolicyTargetReference {
        group: TARGET_GROUP.to_string(),
        kind: target.kind.as_str().to_string(),
        name: target.name.clone(),
    }
}
