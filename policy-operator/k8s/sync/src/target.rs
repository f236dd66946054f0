use crate::{
    lifecycle::{detach, ensure_canonical_policy},
    store::{Store, StoreError},
    synchronizer::{sync_policy, SyncOutcome},
};
use routeguard_policy_operator_core::{
    InvalidDefaultAction, TargetConfig, TargetState, ANNOTATION_ADDRESSES,
    ANNOTATION_DEFAULT_ACTION, ANNOTATION_LAST_UPDATED, ANNOTATION_LISTS, ANNOTATION_MANAGED_BY,
    MANAGER_NAME,
};
use std::collections::BTreeMap;

const CONFIG_ANNOTATIONS: [&str; 3] = [
    ANNOTATION_DEFAULT_ACTION,
    ANNOTATION_LISTS,
    ANNOTATION_ADDRESSES,
];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] InvalidDefaultAction),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How a reconciliation pass ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// The target carries no state of ours and was left alone.
    Skipped,
    /// Authorization synced and bookkeeping annotations stamped.
    Synced,
    /// No address ranges resolved; authorization cleared, no stamp.
    Cleared,
    /// Deletion handled: policy detached and finalizer removed.
    Released,
}

/// Drives a target through its lifecycle from a single event snapshot.
///
/// Active targets are guarded with the finalizer and their canonical
/// policy is (re)built; deletion-requested targets are detached and
/// released. Any error leaves the finalizer in place so the scheduler
/// retries the whole pass; every step is idempotent under re-runs.
pub async fn reconcile_target(
    store: &dyn Store,
    state: &TargetState,
) -> Result<Reconciliation, Error> {
    if state.deletion_requested {
        if !state.finalizer_present {
            return Ok(Reconciliation::Skipped);
        }

        detach(store, &state.target).await?;
        return match store.remove_finalizer(&state.target).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(Reconciliation::Released),
            Err(error) => Err(error.into()),
        };
    }

    if !state.finalizer_present && !is_annotated(state) {
        return Ok(Reconciliation::Skipped);
    }

    // Validate before touching anything so a malformed default-action
    // leaves the target unmodified.
    let config = TargetConfig::from_annotations(&state.annotations)?;

    if !state.finalizer_present {
        store.add_finalizer(&state.target).await?;
    }

    let policy = ensure_canonical_policy(store, &state.target).await?;
    match sync_policy(store, &config, policy).await? {
        SyncOutcome::Cleared => Ok(Reconciliation::Cleared),
        SyncOutcome::Applied => {
            store
                .patch_target_annotations(&state.target, bookkeeping_annotations())
                .await?;
            Ok(Reconciliation::Synced)
        }
    }
}

/// Whether the target opts into management by carrying any of the
/// configuration annotations.
pub fn is_annotated(state: &TargetState) -> bool {
    CONFIG_ANNOTATIONS
        .iter()
        .any(|key| state.annotations.get(*key).is_some_and(|v| !v.is_empty()))
}

/// Whether a new snapshot warrants re-running reconciliation.
///
/// Fires on any change to the configuration annotations or the deletion
/// flag, and on `last-updated` being cleared to the empty string (the
/// notifier's touch). The engine's own timestamp stamp does not
/// re-trigger.
pub fn sync_trigger_changed(old: &TargetState, new: &TargetState) -> bool {
    if old.deletion_requested != new.deletion_requested {
        return true;
    }

    if CONFIG_ANNOTATIONS
        .iter()
        .any(|key| old.annotations.get(*key) != new.annotations.get(*key))
    {
        return true;
    }

    let old_touch = old.annotations.get(ANNOTATION_LAST_UPDATED);
    let new_touch = new.annotations.get(ANNOTATION_LAST_UPDATED);
    old_touch != new_touch && new_touch.is_some_and(|v| v.is_empty())
}

fn bookkeeping_annotations() -> BTreeMap<String, String> {
    let mut annotations = BTreeMap::new();
    annotations.insert(
        ANNOTATION_LAST_UPDATED.to_string(),
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    );
    annotations.insert(ANNOTATION_MANAGED_BY.to_string(), MANAGER_NAME.to_string());
    annotations
}
