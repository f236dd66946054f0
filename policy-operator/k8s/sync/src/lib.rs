//! The annotation-to-SecurityPolicy synchronization engine.
//!
//! Watches deliver target snapshots and address-list change events; the
//! modules here resolve annotations into CIDR sets, maintain the
//! canonical SecurityPolicy per target, and fan re-reconciliation out
//! to every target referencing a changed address list. All cluster I/O
//! goes through the [`Store`] seam so the engine can be exercised
//! without an API server.

mod lifecycle;
mod notifier;
mod resolver;
mod selector;
mod store;
mod synchronizer;
mod target;


pub use self::{
    lifecycle::{detach, ensure_canonical_policy},
    notifier::fan_out,
    resolver::resolve_addresses,
    selector::{find_canonical_policy, select_canonical},
    store::{target_state, KubeStore, Store, StoreError, TargetResource},
    synchronizer::{sync_policy, SyncOutcome},
    target::{is_annotated, reconcile_target, sync_trigger_changed, Error, Reconciliation},
};
