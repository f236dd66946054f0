use crate::sync;
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};
use routeguard_policy_operator_core::TargetKind;

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    reconciles: Family<ReconcileLabels, Counter>,
    fan_outs: Counter,
    fan_out_touches: Counter,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct ReconcileLabels {
    kind: &'static str,
    outcome: &'static str,
}

impl Metrics {
    pub fn register(reg: &mut Registry) -> Self {
        let reconciles = Family::<ReconcileLabels, Counter>::default();
        reg.register(
            "reconciles",
            "Target reconciliation passes by kind and outcome",
            reconciles.clone(),
        );

        let fan_outs = Counter::default();
        reg.register(
            "address_list_fan_outs",
            "Address-list change events fanned out to targets",
            fan_outs.clone(),
        );

        let fan_out_touches = Counter::default();
        reg.register(
            "address_list_touches",
            "Targets retriggered by address-list changes",
            fan_out_touches.clone(),
        );

        Self {
            reconciles,
            fan_outs,
            fan_out_touches,
        }
    }

    pub fn observe_reconcile(
        &self,
        kind: TargetKind,
        outcome: &Result<sync::Reconciliation, sync::Error>,
    ) {
        let outcome = match outcome {
            Ok(sync::Reconciliation::Skipped) => "skipped",
            Ok(sync::Reconciliation::Synced) => "synced",
            Ok(sync::Reconciliation::Cleared) => "cleared",
            Ok(sync::Reconciliation::Released) => "released",
            Err(sync::Error::Validation(_)) => "invalid",
            Err(sync::Error::Store(_)) => "error",
        };
        self.reconciles
            .get_or_create(&ReconcileLabels {
                kind: kind.as_str(),
                outcome,
            })
            .inc();
    }

    pub fn observe_fan_out(&self, touched: usize) {
        self.fan_outs.inc();
        self.fan_out_touches.inc_by(touched as u64);
    }
}
