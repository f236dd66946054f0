use crate::metrics::Metrics;
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use parking_lot::RwLock;
use routeguard_policy_operator_core::{TargetRef, TargetState};
use routeguard_policy_operator_k8s_sync::{
    is_annotated, reconcile_target, sync_trigger_changed, target_state, Error, KubeStore,
    Reconciliation, TargetResource,
};
use std::{collections::HashMap, sync::Arc, time::Duration};

const RETRY_DELAY: Duration = Duration::from_secs(5);

pub(crate) struct Ctx {
    store: KubeStore,
    metrics: Metrics,

    // Last snapshot per target that reached the engine; reconciles are
    // gated on `sync_trigger_changed` against it.
    seen: RwLock<HashMap<TargetRef, TargetState>>,
}

impl Ctx {
    pub fn new(store: KubeStore, metrics: Metrics) -> Arc<Self> {
        Arc::new(Self {
            store,
            metrics,
            seen: RwLock::new(HashMap::new()),
        })
    }
}

/// Runs the reconcile loop for one target kind.
pub(crate) async fn run_controller<K: TargetResource>(client: Client, ctx: Arc<Ctx>) {
    Controller::new(Api::<K>::all(client), watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile::<K>, error_policy::<K>, ctx)
        .for_each(|result| async move {
            match result {
                Ok((object, _)) => tracing::debug!(%object, "Reconciled"),
                Err(error) => tracing::warn!(%error, "Reconciliation failed"),
            }
        })
        .await;
}

async fn reconcile<K: TargetResource>(resource: Arc<K>, ctx: Arc<Ctx>) -> Result<Action, Error> {
    let state = target_state(resource.as_ref());

    if !triggered(&ctx, &state) {
        return Ok(Action::await_change());
    }

    let outcome = reconcile_target(&ctx.store, &state).await;
    ctx.metrics.observe_reconcile(K::KIND, &outcome);

    match outcome? {
        Reconciliation::Released => {
            tracing::info!(target = %state.target, "Released target");
            ctx.seen.write().remove(&state.target);
        }
        outcome => {
            tracing::info!(target = %state.target, ?outcome, "Reconciled target");
            ctx.seen.write().insert(state.target.clone(), state);
        }
    }
    Ok(Action::await_change())
}

/// Whether this snapshot warrants a pass through the engine. Snapshots
/// that do not (our own bookkeeping stamp included) still refresh the
/// cache so the next diff is taken against current state. A failed pass
/// leaves the cache untouched, keeping retries triggered.
fn triggered(ctx: &Ctx, state: &TargetState) -> bool {
    let mut seen = ctx.seen.write();
    let changed = seen
        .get(&state.target)
        .map(|old| sync_trigger_changed(old, state));
    match changed {
        Some(true) => true,
        Some(false) => {
            seen.insert(state.target.clone(), state.clone());
            false
        }
        None => is_annotated(state) || state.finalizer_present || state.deletion_requested,
    }
}

fn error_policy<K: TargetResource>(resource: Arc<K>, error: &Error, _ctx: Arc<Ctx>) -> Action {
    let name = resource.name_any();
    match error {
        // Retrying cannot fix a malformed annotation; wait for an edit.
        Error::Validation(error) => {
            tracing::warn!(kind = %K::KIND, %name, %error, "Invalid target configuration");
            Action::await_change()
        }
        Error::Store(error) => {
            tracing::warn!(kind = %K::KIND, %name, %error, "Reconciliation failed; will retry");
            Action::requeue(RETRY_DELAY)
        }
    }
}
