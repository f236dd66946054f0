#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod security_policy;

pub use self::security_policy::{
    Authorization, AuthorizationAction, AuthorizationRule, PolicyTargetReference, Principal,
    SecurityPolicy, SecurityPolicySpec,
};
pub use k8s_openapi::api::networking::v1::{NetworkPolicy, NetworkPolicySpec};
pub use kube::{
    api::{Api, ListParams, ObjectMeta, Patch, PatchParams, PostParams},
    Client, Resource, ResourceExt,
};

/// The Gateway API kinds this operator manages.
pub mod gateway {
    pub use gateway_api::apis::standard::{
        gateways::Gateway, grpcroutes::GRPCRoute, httproutes::HTTPRoute,
    };
}
