//! Helmsman Core - release model and dry-run output parsing
//!
//! This crate has no I/O beyond reading release files:
//! - `Release`: Immutable description of one helm release
//! - `DeploySettings`: Process-wide dry-run / verbose mode
//! - `SectionLocator`: Finds the HOOKS and MANIFEST sections in dry-run output
//! - `ResourceIndex`: Rendered documents classified by kind and name
//! - `Resource`: Typed Job / Deployment / generic views with hook detection

pub mod error;
pub mod hooks;
pub mod manifest;
pub mod release;
pub mod resource;
pub mod sections;
pub mod settings;

pub use error::{CoreError, Result};
pub use hooks::HookPhase;
pub use manifest::{ResourceIndex, split_documents};
pub use release::{Release, ReleaseBuilder};
pub use resource::{Deployment, GenericResource, Job, RawDocument, Resource, ResourceSpec};
pub use sections::{Section, SectionLocator, Sections};
pub use settings::{DEFAULT_HELM_BINARY, DeploySettings};
