//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions where applicable.

/// Success - operation completed without errors
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Input error - invalid release file, missing field or malformed `--set`
pub const INPUT_ERROR: i32 = 2;

/// Command error - helm could not be started or exited non-zero
pub const COMMAND_ERROR: i32 = 3;

/// Manifest error - a rendered document is not valid YAML
pub const MANIFEST_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Cluster error - the Kubernetes API refused or failed a request
pub const CLUSTER_ERROR: i32 = 6;
