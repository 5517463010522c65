//! Helm command line assembly
//!
//! Builds the exact argv for `helm upgrade` so that evaluation and deploy share
//! one definition:
//!
//! ```text
//! helm upgrade <release> <chart> [--values <path>]... [--set <k>=<v>]...
//!      --namespace <ns> --install [--dry-run] [--debug] [--timeout <seconds>]
//! ```

use helmsman_core::{DeploySettings, Release};

/// Value key receiving the image repository
pub const REPO_KEY: &str = "global.dapp.repo";
/// Value key receiving the image tag
pub const IMAGE_VERSION_KEY: &str = "global.dapp.image_version";
/// Value key receiving the target namespace
pub const NAMESPACE_KEY: &str = "global.namespace";

/// A program and its arguments, passed to the runner without a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

/// Renders as a copy-pasteable command line
impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@+%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Helm invocations for one release
#[derive(Debug, Clone, Copy)]
pub struct HelmCommand<'a> {
    release: &'a Release,
    settings: &'a DeploySettings,
}

impl<'a> HelmCommand<'a> {
    pub fn new(release: &'a Release, settings: &'a DeploySettings) -> Self {
        Self { release, settings }
    }

    /// `--values <path>` for every value file, in order
    pub fn value_flags(&self) -> Vec<String> {
        self.release
            .values()
            .iter()
            .flat_map(|path| ["--values".to_string(), path.display().to_string()])
            .collect()
    }

    /// The three computed globals, then the caller's overrides in order
    pub fn set_flags(&self) -> Vec<String> {
        let globals = [
            format!("{}={}", REPO_KEY, self.release.repo()),
            format!("{}={}", IMAGE_VERSION_KEY, self.release.image_version()),
            format!("{}={}", NAMESPACE_KEY, self.release.namespace()),
        ];

        globals
            .into_iter()
            .chain(self.release.set().iter().cloned())
            .flat_map(|option| ["--set".to_string(), option])
            .collect()
    }

    /// Namespace, install and the conditional flags
    pub fn extra_flags(&self, dry_run: bool) -> Vec<String> {
        let mut flags = vec![
            "--namespace".to_string(),
            self.release.namespace().to_string(),
            "--install".to_string(),
        ];
        if dry_run {
            flags.push("--dry-run".to_string());
        }
        if dry_run || self.settings.verbose {
            flags.push("--debug".to_string());
        }
        if let Some(timeout) = self.release.deploy_timeout() {
            flags.push("--timeout".to_string());
            // Rounded up so a sub-second timeout never becomes `--timeout 0`
            let seconds = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
            flags.push(seconds.to_string());
        }
        flags
    }

    /// `helm upgrade` with everything in place
    pub fn upgrade(&self, dry_run: bool) -> Invocation {
        Invocation::new(&self.settings.helm_binary)
            .arg("upgrade")
            .arg(self.release.name())
            .arg(self.release.chart_path().display().to_string())
            .args(self.value_flags())
            .args(self.set_flags())
            .args(self.extra_flags(dry_run))
    }

    /// Render-only upgrade used to inspect the release, always a dry run
    pub fn evaluate(&self) -> Invocation {
        self.upgrade(true)
    }

    /// The real upgrade, a dry run only when the process runs in dry-run mode
    pub fn deploy(&self) -> Invocation {
        self.upgrade(self.settings.dry_run)
    }

    /// `helm delete --purge <release>`, with `--dry-run` in dry-run mode
    pub fn delete(&self) -> Invocation {
        let invocation = Invocation::new(&self.settings.helm_binary)
            .args(["delete", "--purge"])
            .arg(self.release.name());
        if self.settings.dry_run {
            invocation.arg("--dry-run")
        } else {
            invocation
        }
    }
}
