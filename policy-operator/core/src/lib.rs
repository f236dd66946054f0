#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod config;
mod target;

pub use self::{
    config::{split_list, DefaultAction, InvalidDefaultAction, TargetConfig},
    target::{TargetKind, TargetRef, TargetState},
};

/// Namespace holding the NetworkPolicy objects that serve as named,
/// reusable address lists.
pub const RESERVED_NAMESPACE: &str = "network-policies";

/// Finalizer installed on every managed target, shared by all kinds.
pub const FINALIZER: &str = "routeguard.io/finalizer";

/// Value stamped into the `managed-by` annotation.
pub const MANAGER_NAME: &str = "routeguard-policy-operator";

pub const ANNOTATION_DEFAULT_ACTION: &str = "routeguard.io/default-action";
pub const ANNOTATION_LISTS: &str = "routeguard.io/lists";
pub const ANNOTATION_ADDRESSES: &str = "routeguard.io/addresses";
pub const ANNOTATION_LAST_UPDATED: &str = "routeguard.io/last-updated";
pub const ANNOTATION_MANAGED_BY: &str = "routeguard.io/managed-by";
