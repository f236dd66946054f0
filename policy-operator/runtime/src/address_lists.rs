use crate::metrics::Metrics;
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use routeguard_policy_operator_core::RESERVED_NAMESPACE;
use routeguard_policy_operator_k8s_api::NetworkPolicy;
use routeguard_policy_operator_k8s_sync::{fan_out, KubeStore, StoreError};
use std::{sync::Arc, time::Duration};

const RETRY_DELAY: Duration = Duration::from_secs(5);

struct Ctx {
    store: KubeStore,
    metrics: Metrics,
}

/// Watches address lists in the reserved namespace and retriggers every
/// target that references a changed list.
pub(crate) async fn run_notifier(client: Client, store: KubeStore, metrics: Metrics) {
    let lists = Api::<NetworkPolicy>::namespaced(client, RESERVED_NAMESPACE);
    Controller::new(lists, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, Arc::new(Ctx { store, metrics }))
        .for_each(|result| async move {
            match result {
                Ok((object, _)) => tracing::debug!(%object, "Fanned out"),
                Err(error) => tracing::warn!(%error, "Fan-out failed"),
            }
        })
        .await;
}

async fn reconcile(list: Arc<NetworkPolicy>, ctx: Arc<Ctx>) -> Result<Action, StoreError> {
    let name = list.name_any();
    let touched = fan_out(&ctx.store, &name).await?;
    ctx.metrics.observe_fan_out(touched);
    tracing::info!(list = %name, touched, "Address list changed");
    Ok(Action::await_change())
}

fn error_policy(list: Arc<NetworkPolicy>, error: &StoreError, _ctx: Arc<Ctx>) -> Action {
    tracing::warn!(list = %list.name_any(), %error, "Fan-out failed; will retry");
    Action::requeue(RETRY_DELAY)
}
