//! Integration tests for CLI commands
//!
//! helm is replaced by a shell script that logs its arguments and prints
//! canned dry-run output, so no cluster or chart is needed.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes script creation and execution; a fork from a parallel test
/// could otherwise keep the script open for writing ("text file busy").
static EXEC_LOCK: Mutex<()> = Mutex::new(());

const DRY_RUN_OUTPUT: &str = r#"REVISION: 2
CHART: myapp-0.1.0
HOOKS:
---
# myapp-migrate
apiVersion: batch/v1
kind: Job
metadata:
  name: myapp-migrate
  annotations:
    "helm.sh/hook": pre-install,pre-upgrade
    "helm.sh/hook-weight": "10"
---
# myapp-warmup
apiVersion: batch/v1
kind: Job
metadata:
  name: myapp-warmup
  annotations:
    "helm.sh/hook": post-upgrade
    "helm.sh/hook-weight": "-5"
MANIFEST:

---
# Source: myapp/templates/deployment.yaml
apiVersion: apps/v1
kind: Deployment
metadata:
  name: myapp-web
spec:
  replicas: 2
  template:
    spec:
      containers:
        - name: web
          image: registry.local/myapp:1.2.3
---
# Source: myapp/templates/service.yaml
apiVersion: v1
kind: Service
metadata:
  name: myapp-web

Release "myapp" has been upgraded. Happy Helming!
"#;

const FAKE_HELM: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/args.log"
case "$1" in
  upgrade) cat "$(dirname "$0")/output.txt" ;;
  delete) echo "release \"$3\" deleted" ;;
esac
"#;

const FAILING_HELM: &str = r#"#!/bin/sh
echo 'Error: chart "myapp" not found' >&2
exit 1
"#;

struct FakeHelm {
    dir: TempDir,
}

impl FakeHelm {
    fn new(script: &str, output: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let helm = dir.path().join("helm");
        std::fs::write(&helm, script).unwrap();
        std::fs::set_permissions(&helm, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(dir.path().join("output.txt"), output).unwrap();
        Self { dir }
    }

    fn working() -> Self {
        Self::new(FAKE_HELM, DRY_RUN_OUTPUT)
    }

    fn path(&self) -> PathBuf {
        self.dir.path().join("helm")
    }

    fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Every helm invocation, one line each
    fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("args.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Run helmsman with `helm` pointing at the fake
fn helmsman(helm: &FakeHelm, args: &[&str]) -> Output {
    let _guard = EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    Command::new(env!("CARGO_BIN_EXE_helmsman"))
        .args(args)
        .env("HELMSMAN_HELM_BIN", helm.path())
        .env_remove("HELMSMAN_DRY_RUN")
        .env_remove("HELMSMAN_VERBOSE")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute helmsman")
}

const RELEASE_FLAGS: &[&str] = &[
    "myapp",
    ".helm",
    "--repo",
    "registry.local/myapp",
    "--image-version",
    "1.2.3",
    "--namespace",
    "staging",
];

fn with_release_flags<'a>(command: &'a str, extra: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec![command];
    args.extend_from_slice(RELEASE_FLAGS);
    args.extend_from_slice(extra);
    args
}

mod help {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        let helm = FakeHelm::working();
        let output = helmsman(&helm, &["--help"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("deploy"));
        assert!(stdout.contains("resources"));
        assert!(stdout.contains("dismiss"));
    }
}

mod resources_command {
    use super::*;

    #[test]
    fn test_resources_table() {
        let helm = FakeHelm::working();
        let output = helmsman(&helm, &with_release_flags("resources", &[]));

        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("myapp-migrate"));
        assert!(stdout.contains("myapp-web"));
        assert!(stdout.contains("Service"));
    }

    #[test]
    fn test_resources_runs_one_dry_run() {
        let helm = FakeHelm::working();
        let output = helmsman(&helm, &with_release_flags("resources", &["--set", "replicas=2"]));
        assert!(output.status.success());

        let calls = helm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            "upgrade myapp .helm \
             --set global.dapp.repo=registry.local/myapp \
             --set global.dapp.image_version=1.2.3 \
             --set global.namespace=staging \
             --set replicas=2 \
             --namespace staging --install --dry-run --debug"
        );
    }

    #[test]
    fn test_hooks_json_in_weight_order() {
        let helm = FakeHelm::working();
        let output = helmsman(
            &helm,
            &with_release_flags("resources", &["--kind", "hooks", "--output", "json"]),
        );
        assert!(output.status.success());

        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
        let hooks = json.as_array().unwrap();
        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks[0]["name"], "myapp-warmup");
        assert_eq!(hooks[0]["hook"]["weight"], -5);
        assert_eq!(hooks[1]["name"], "myapp-migrate");
        assert_eq!(hooks[1]["hook"]["phases"][0], "pre-install");
    }

    #[test]
    fn test_deployments_yaml() {
        let helm = FakeHelm::working();
        let output = helmsman(
            &helm,
            &with_release_flags("resources", &["--kind", "deployments", "--output", "yaml"]),
        );
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.starts_with("---\n"));
        assert!(stdout.contains("kind: Deployment"));
        assert!(stdout.contains("replicas: 2"));
        assert!(!stdout.contains("kind: Job"));
    }

    #[test]
    fn test_release_file() {
        let helm = FakeHelm::working();
        let release_file = helm.dir().join("release.yaml");
        std::fs::write(
            &release_file,
            "name: myapp\nrepo: registry.local/myapp\nimageVersion: \"2.0.0\"\nnamespace: prod\nchartPath: stable/myapp\ndeployTimeout: 5m\n",
        )
        .unwrap();

        let output = helmsman(
            &helm,
            &["resources", "--config", release_file.to_str().unwrap()],
        );
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let calls = helm.calls();
        assert!(calls[0].starts_with("upgrade myapp stable/myapp "));
        assert!(calls[0].contains("--set global.dapp.image_version=2.0.0"));
        assert!(calls[0].ends_with("--namespace prod --install --dry-run --debug --timeout 300"));
    }
}

mod errors {
    use super::*;

    #[test]
    fn test_invalid_set_exits_with_input_error() {
        let helm = FakeHelm::working();
        let output = helmsman(&helm, &with_release_flags("resources", &["--set", "novalue"]));

        assert_eq!(output.status.code(), Some(2));
        assert!(helm.calls().is_empty());
    }

    #[test]
    fn test_missing_field_exits_with_input_error() {
        let helm = FakeHelm::working();
        let output = helmsman(&helm, &["resources", "myapp", ".helm"]);

        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("repo"));
    }

    #[test]
    fn test_invalid_set_fails_deploy_before_cluster_access() {
        let helm = FakeHelm::working();
        let output = helmsman(&helm, &with_release_flags("deploy", &["--set", "=x"]));

        assert_eq!(output.status.code(), Some(2));
        assert!(helm.calls().is_empty());
    }

    #[test]
    fn test_helm_failure_exits_with_command_error() {
        let helm = FakeHelm::new(FAILING_HELM, "");
        let output = helmsman(&helm, &with_release_flags("resources", &[]));

        assert_eq!(output.status.code(), Some(3));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("not found"));
    }

    #[test]
    fn test_missing_helm_binary_exits_with_command_error() {
        let helm = FakeHelm::working();
        let _guard = EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let output = Command::new(env!("CARGO_BIN_EXE_helmsman"))
            .args(with_release_flags("resources", &[]))
            .args(["--helm-bin", "/nonexistent/helm"])
            .env_remove("HELMSMAN_HELM_BIN")
            .output()
            .expect("Failed to execute helmsman");
        drop(helm);

        assert_eq!(output.status.code(), Some(3));
    }

    #[test]
    fn test_malformed_manifest_exits_with_manifest_error() {
        let helm = FakeHelm::new(FAKE_HELM, "HOOKS:\nMANIFEST:\n---\nkind: Job\nmetadata: [oops\n");
        let output = helmsman(&helm, &with_release_flags("resources", &[]));

        assert_eq!(output.status.code(), Some(4));
    }
}

mod dismiss_command {
    use super::*;

    #[test]
    fn test_dismiss_purges_release() {
        let helm = FakeHelm::working();
        let output = helmsman(&helm, &with_release_flags("dismiss", &[]));

        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert_eq!(helm.calls(), vec!["delete --purge myapp"]);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("release \"myapp\" deleted"));
    }

    #[test]
    fn test_dismiss_dry_run() {
        let helm = FakeHelm::working();
        let output = helmsman(&helm, &with_release_flags("dismiss", &["--dry-run", "--with-namespace"]));

        assert!(output.status.success());
        assert_eq!(helm.calls(), vec!["delete --purge myapp --dry-run"]);
    }
}
