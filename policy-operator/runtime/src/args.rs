use crate::{address_lists, metrics::Metrics, targets};
use anyhow::{bail, Result};
use clap::Parser;
use kube::{Client, Resource};
use prometheus_client::registry::Registry;
use routeguard_policy_operator_k8s_api::gateway::{GRPCRoute, Gateway, HTTPRoute};
use routeguard_policy_operator_k8s_sync::{KubeStore, TargetResource};
use std::sync::Arc;
use tracing::{info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "routeguard",
    about = "An annotation-driven authorization policy operator"
)]
pub struct Args {
    #[clap(long, default_value = "routeguard=info,warn", env = "ROUTEGUARD_LOG")]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
        } = self;

        let mut prom = <Registry>::default();
        let metrics = Metrics::register(prom.sub_registry_with_prefix("routeguard"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        let client = runtime.client();
        let store = KubeStore::new(client.clone());
        let ctx = targets::Ctx::new(store.clone(), metrics.clone());

        spawn_target_controller::<HTTPRoute>(&client, &ctx).await;
        spawn_target_controller::<GRPCRoute>(&client, &ctx).await;
        spawn_target_controller::<Gateway>(&client, &ctx).await;

        tokio::spawn(
            address_lists::run_notifier(client, store, metrics)
                .instrument(info_span!("addresslists")),
        );

        // Block the main thread on the shutdown signal, then wait for the
        // background tasks to complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}

async fn spawn_target_controller<K: TargetResource>(client: &Client, ctx: &Arc<targets::Ctx>) {
    if api_resource_exists::<K>(client).await {
        tokio::spawn(
            targets::run_controller::<K>(client.clone(), ctx.clone())
                .instrument(info_span!("targets", kind = %K::KIND)),
        );
    } else {
        tracing::warn!(kind = %K::KIND, "Resource kind not found, skipping watch");
    }
}

async fn api_resource_exists<T>(client: &Client) -> bool
where
    T: Resource,
    T::DynamicType: Default,
{
    let dt = Default::default();
    client
        .list_api_group_resources(&T::api_version(&dt))
        .await
        .ok()
        .iter()
        .flat_map(|r| r.resources.iter())
        .any(|r| r.kind == T::kind(&dt))
}
