use crate::store::Store;
use routeguard_policy_operator_k8s_api::NetworkPolicy;
use std::collections::BTreeSet;

/// Resolves named address lists and raw address strings into a
/// deduplicated, lexicographically ascending set of CIDR ranges.
///
/// Resolution is best-effort: an address list that cannot be fetched is
/// logged and skipped, and syntactically invalid ranges are dropped. A
/// missing list degrades the result; it does not fail the cycle.
pub async fn resolve_addresses(
    store: &dyn Store,
    lists: &[String],
    addresses: &[String],
) -> Vec<String> {
    let mut ranges = BTreeSet::new();

    for name in lists {
        let policy = match store.get_address_list(name).await {
            Ok(policy) => policy,
            Err(error) => {
                tracing::warn!(%name, %error, "Unable to fetch address list; skipping");
                continue;
            }
        };
        ranges.extend(extract_cidrs(&policy).into_iter().filter(|c| is_valid_cidr(c)));
    }

    ranges.extend(
        addresses
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| is_valid_cidr(a)),
    );

    ranges.into_iter().collect()
}

/// Every `ipBlock` CIDR named by the policy's ingress and egress rules.
pub(crate) fn extract_cidrs(policy: &NetworkPolicy) -> Vec<String> {
    let Some(spec) = &policy.spec else {
        return Vec::new();
    };

    let ingress = spec
        .ingress
        .iter()
        .flatten()
        .flat_map(|rule| rule.from.iter().flatten());
    let egress = spec
        .egress
        .iter()
        .flatten()
        .flat_map(|rule| rule.to.iter().flatten());

    ingress
        .chain(egress)
        .filter_map(|peer| peer.ip_block.as_ref())
        .map(|block| block.cidr.trim().to_string())
        .collect()
}

pub(crate) fn is_valid_cidr(address: &str) -> bool {
    address.parse::<ipnet::IpNet>().is_ok()
}
