//! In-memory collaborators for testing
//!
//! [`MockRunner`] replays canned helm output and records every invocation.
//! [`MockNamespaces`] keeps a set of namespace names. Both are cheap to clone
//! and share state between clones, so a test can keep a handle for
//! assertions after moving one into a client.

use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, RwLock};

use crate::command::Invocation;
use crate::error::{KubeError, Result};
use crate::namespace::NamespaceClient;
use crate::shell::{CommandOutput, CommandRunner};

/// A command seen by [`MockRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub invocation: Invocation,
    pub verbose: bool,
}

#[derive(Debug, Default)]
struct RunnerState {
    stdout: String,
    failures: VecDeque<String>,
    calls: Vec<RecordedCall>,
}

/// Command runner that never starts a process
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    state: Arc<RwLock<RunnerState>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every successful run prints `stdout`
    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        let runner = Self::new();
        runner.state.write().unwrap().stdout = stdout.into();
        runner
    }

    /// Make the next run exit non-zero with `stderr`
    ///
    /// Queued failures are consumed in order before runs succeed again.
    pub fn fail_next(&self, stderr: impl Into<String>) {
        self.state.write().unwrap().failures.push_back(stderr.into());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.read().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.read().unwrap().calls.len()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, invocation: &Invocation, verbose: bool) -> Result<CommandOutput> {
        let outcome = {
            let mut state = self.state.write().unwrap();
            state.calls.push(RecordedCall {
                invocation: invocation.clone(),
                verbose,
            });
            match state.failures.pop_front() {
                Some(stderr) => Err(KubeError::CommandFailed {
                    command: invocation.to_string(),
                    status: "exit status: 1".to_string(),
                    stderr,
                }),
                None => Ok(CommandOutput {
                    stdout: state.stdout.clone(),
                    stderr: String::new(),
                }),
            }
        };

        // Give concurrent callers a chance to interleave
        tokio::task::yield_now().await;
        outcome
    }
}

/// Counts of namespace operations for assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NamespaceCounts {
    pub checks: usize,
    pub creates: usize,
    pub deletes: usize,
}

#[derive(Debug, Default)]
struct NamespaceState {
    namespaces: BTreeSet<String>,
    counts: NamespaceCounts,
    fail_creates: bool,
}

/// Namespace client over an in-memory set
#[derive(Debug, Clone, Default)]
pub struct MockNamespaces {
    state: Arc<RwLock<NamespaceState>>,
}

impl MockNamespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given namespaces already present
    pub fn with_namespaces<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::new();
        client
            .state
            .write()
            .unwrap()
            .namespaces
            .extend(names.into_iter().map(Into::into));
        client
    }

    /// Reject every create with a permission error
    pub fn fail_creates(&self) {
        self.state.write().unwrap().fail_creates = true;
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.read().unwrap().namespaces.contains(name)
    }

    pub fn counts(&self) -> NamespaceCounts {
        self.state.read().unwrap().counts.clone()
    }
}

#[async_trait]
impl NamespaceClient for MockNamespaces {
    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        let mut state = self.state.write().unwrap();
        state.counts.checks += 1;
        Ok(state.namespaces.contains(name))
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.counts.creates += 1;
        if state.fail_creates {
            return Err(KubeError::InvalidConfig(format!(
                "namespaces \"{}\" is forbidden",
                name
            )));
        }
        state.namespaces.insert(name.to_string());
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.counts.deletes += 1;
        state.namespaces.remove(name);
        Ok(())
    }
}
