//! Process-wide deploy mode

/// Default helm executable, looked up on `PATH`
pub const DEFAULT_HELM_BINARY: &str = "helm";

/// Flags that apply to every release handled by one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySettings {
    /// Render and validate only, never change the cluster
    pub dry_run: bool,

    /// Operator asked for verbose output
    pub verbose: bool,

    /// Helm executable to invoke
    pub helm_binary: String,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            dry_run: false,
            verbose: false,
            helm_binary: DEFAULT_HELM_BINARY.to_string(),
        }
    }
}

impl DeploySettings {
    /// Whether helm should be asked for `--debug` output
    pub fn debug(&self) -> bool {
        self.dry_run || self.verbose
    }
}
