use crate::store::{Store, StoreError};
use routeguard_policy_operator_core::{
    split_list, TargetKind, ANNOTATION_LAST_UPDATED, ANNOTATION_LISTS,
};
use std::collections::BTreeMap;

/// Re-triggers every target referencing a changed address list.
///
/// Scans all targets of all managed kinds; each one whose `lists`
/// annotation names the changed NetworkPolicy gets a minimal merge
/// patch clearing `last-updated`, which forces its own reconciliation
/// to re-run. A full scan is acceptable here: address-list changes are
/// infrequent administrative events.
pub async fn fan_out(store: &dyn Store, changed_list: &str) -> Result<usize, StoreError> {
    let mut touched = 0;

    for kind in TargetKind::ALL {
        for state in store.list_targets(kind).await? {
            let lists = split_list(state.annotations.get(ANNOTATION_LISTS));
            if !lists.iter().any(|list| list == changed_list) {
                continue;
            }

            let mut touch = BTreeMap::new();
            touch.insert(ANNOTATION_LAST_UPDATED.to_string(), String::new());
            store.patch_target_annotations(&state.target, touch).await?;

            tracing::info!(
                target = %state.target,
                list = %changed_list,
                "Retriggered target for changed address list",
            );
            touched += 1;
        }
    }

    Ok(touched)
}
