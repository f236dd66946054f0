use crate::store::{Store, StoreError};
use routeguard_policy_operator_core::TargetRef;
use routeguard_policy_operator_k8s_api::{PolicyTargetReference, SecurityPolicy};

/// Finds the canonical SecurityPolicy for a target: the policy in the
/// target's namespace whose `targetRefs` names it. `None` means no
/// policy has been created yet.
pub async fn find_canonical_policy(
    store: &dyn Store,
    target: &TargetRef,
) -> Result<Option<SecurityPolicy>, StoreError> {
    let policies = store.list_security_policies(&target.namespace).await?;
    Ok(select_canonical(policies, target))
}

/// Picks the canonical policy among candidates referencing the target.
///
/// Only one policy is processed per target. When duplicates reference
/// the same target, the oldest by creation time wins (ties fall back to
/// input order); the non-canonical duplicates are never touched.
pub fn select_canonical(
    policies: Vec<SecurityPolicy>,
    target: &TargetRef,
) -> Option<SecurityPolicy> {
    policies
        .into_iter()
        .filter(|policy| {
            policy
                .spec
                .target_refs
                .iter()
                .any(|reference| references_target(reference, target))
        })
        .min_by_key(|policy| policy.metadata.creation_timestamp.clone())
}

/// Whether a `targetRefs` entry names this target. Kind and name must
/// both match: same-named targets of different kinds are distinct
/// owners.
pub(crate) fn references_target(reference: &PolicyTargetReference, target: &TargetRef) -> bool {
    reference.kind == target.kind.as_str() && reference.name == target.name
}
