pub use routeguard_policy_operator_core as core;
pub use routeguard_policy_operator_k8s_api as k8s;
pub use routeguard_policy_operator_k8s_sync as sync;

mod address_lists;
mod args;
mod metrics;
mod targets;

pub use self::args::Args;
