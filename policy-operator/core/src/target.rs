use std::collections::BTreeMap;

/// The Gateway API kinds whose access policy this operator manages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Gateway,
    HttpRoute,
    GrpcRoute,
}

/// Identifies a managed target resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetRef {
    pub kind: TargetKind,
    pub namespace: String,
    pub name: String,
}

/// Immutable snapshot of a target, taken once per delivered event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetState {
    pub target: TargetRef,
    pub annotations: BTreeMap<String, String>,
    pub finalizer_present: bool,
    pub deletion_requested: bool,
}

// === impl TargetKind ===

impl TargetKind {
    pub const ALL: [TargetKind; 3] = [
        TargetKind::Gateway,
        TargetKind::HttpRoute,
        TargetKind::GrpcRoute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Gateway => "Gateway",
            TargetKind::HttpRoute => "HTTPRoute",
            TargetKind::GrpcRoute => "GRPCRoute",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// === impl TargetRef ===

impl TargetRef {
    pub fn new(kind: TargetKind, namespace: impl ToString, name: impl ToString) -> Self {
        Self {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// The deterministic name of the SecurityPolicy owned by this target.
    pub fn policy_name(&self) -> String {
        format!("{}-{}", self.kind.as_str().to_lowercase(), self.name)
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}
