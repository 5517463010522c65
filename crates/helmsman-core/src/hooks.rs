//! Helm hook annotations
//!
//! Only Jobs are treated as hooks. The annotation keys are the ones charts
//! already carry, matched byte for byte.

use serde_yaml::Mapping;
use std::collections::BTreeMap;

/// Hook phase annotation
pub const HOOK: &str = "helm.sh/hook";
/// Hook weight for ordering
pub const HOOK_WEIGHT: &str = "helm.sh/hook-weight";
/// Hook delete policy
pub const HOOK_DELETE_POLICY: &str = "helm.sh/hook-delete-policy";

/// Hook execution phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookPhase {
    PreInstall,
    PostInstall,
    PreUpgrade,
    PostUpgrade,
    PreRollback,
    PostRollback,
    PreDelete,
    PostDelete,
    Test,
}

impl HookPhase {
    /// Parse a single phase as written in the annotation
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "pre-install" => HookPhase::PreInstall,
            "post-install" => HookPhase::PostInstall,
            "pre-upgrade" => HookPhase::PreUpgrade,
            "post-upgrade" => HookPhase::PostUpgrade,
            "pre-rollback" => HookPhase::PreRollback,
            "post-rollback" => HookPhase::PostRollback,
            "pre-delete" => HookPhase::PreDelete,
            "post-delete" => HookPhase::PostDelete,
            // test-success is the helm 2 spelling
            "test" | "test-success" => HookPhase::Test,
            _ => return None,
        })
    }

    /// Is this a "pre" phase (before the operation)?
    pub fn is_pre(&self) -> bool {
        matches!(
            self,
            HookPhase::PreInstall
                | HookPhase::PreUpgrade
                | HookPhase::PreRollback
                | HookPhase::PreDelete
        )
    }

    /// Is this a "post" phase (after the operation)?
    pub fn is_post(&self) -> bool {
        matches!(
            self,
            HookPhase::PostInstall
                | HookPhase::PostUpgrade
                | HookPhase::PostRollback
                | HookPhase::PostDelete
        )
    }
}

impl std::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HookPhase::PreInstall => "pre-install",
            HookPhase::PostInstall => "post-install",
            HookPhase::PreUpgrade => "pre-upgrade",
            HookPhase::PostUpgrade => "post-upgrade",
            HookPhase::PreRollback => "pre-rollback",
            HookPhase::PostRollback => "post-rollback",
            HookPhase::PreDelete => "pre-delete",
            HookPhase::PostDelete => "post-delete",
            HookPhase::Test => "test",
        };
        write!(f, "{}", s)
    }
}

/// Whether the annotations mark the resource as a hook
///
/// Only the key matters; an empty or non-string value still marks a hook.
pub fn is_hook(annotations: &Mapping) -> bool {
    annotations.contains_key(HOOK)
}

/// Parse comma-separated hook phases, dropping unknown ones
pub fn parse_hook_phases(value: &str) -> Vec<HookPhase> {
    value
        .split(',')
        .map(str::trim)
        .filter_map(HookPhase::parse)
        .collect()
}

/// Parse hook weight (default: 0)
pub fn parse_hook_weight(annotations: &BTreeMap<String, String>) -> i32 {
    annotations
        .get(HOOK_WEIGHT)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

/// Parse hook delete policies as listed in the annotation
pub fn parse_delete_policies(annotations: &BTreeMap<String, String>) -> Vec<String> {
    annotations
        .get(HOOK_DELETE_POLICY)
        .map(|s| {
            s.split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
