//! Rendered manifest classification
//!
//! Splits a section of dry-run output into YAML documents and indexes them by
//! `kind`, then by `metadata.name`. Hooks and manifests share one index, so a
//! Job shows up under `Job` whichever section it was rendered in.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::resource::{DEPLOYMENT_KIND, Deployment, JOB_KIND, Job, RawDocument, Resource};
use crate::sections::{SectionLocator, Sections};

/// A `# Source: ...` comment line or a bare `---` line
static DOCUMENT_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:# Source.*|---)\r?$").expect("valid regex"));

/// Split text into parsed YAML documents
///
/// Chunks that are blank (or hold nothing but comments) are dropped. Any chunk
/// that fails to parse rejects the whole text.
pub fn split_documents(text: &str) -> Result<Vec<Value>> {
    DOCUMENT_SEPARATOR
        .split(text)
        .filter(|chunk| !is_blank(chunk))
        .enumerate()
        .map(|(index, chunk)| {
            serde_yaml::from_str(chunk).map_err(|source| CoreError::MalformedDocument { index, source })
        })
        .collect()
}

fn is_blank(chunk: &str) -> bool {
    chunk
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

/// Documents indexed by kind, then by name
///
/// At most one document per (kind, name); a later document replaces an
/// earlier one with the same key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceIndex {
    kinds: BTreeMap<String, BTreeMap<String, RawDocument>>,
}

impl ResourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index dry-run output: hooks first, then the manifest
    pub fn from_dry_run(text: &str, locator: &SectionLocator) -> Result<Self> {
        Self::from_sections(&locator.locate(text))
    }

    /// Index located sections, hooks first
    pub fn from_sections(sections: &Sections<'_>) -> Result<Self> {
        let mut index = Self::new();
        for text in [sections.hooks, sections.manifest].into_iter().flatten() {
            index.classify(text)?;
        }
        Ok(index)
    }

    /// Parse `text` and add its documents, returning how many were indexed
    ///
    /// Nothing is added when any document fails to parse. Documents without a
    /// `kind` are skipped.
    pub fn classify(&mut self, text: &str) -> Result<usize> {
        let documents = split_documents(text)?;

        let mut indexed = 0;
        for value in documents {
            match RawDocument::from_value(value) {
                Some(doc) => {
                    self.insert(doc);
                    indexed += 1;
                }
                None => debug!("Skipping rendered document without kind"),
            }
        }
        Ok(indexed)
    }

    /// Insert a document, returning the one it replaced
    pub fn insert(&mut self, doc: RawDocument) -> Option<RawDocument> {
        self.kinds
            .entry(doc.kind().to_string())
            .or_default()
            .insert(doc.name().to_string(), doc)
    }

    /// All documents of one kind, by name
    pub fn kind(&self, kind: &str) -> Option<&BTreeMap<String, RawDocument>> {
        self.kinds.get(kind)
    }

    pub fn get(&self, kind: &str, name: &str) -> Option<&RawDocument> {
        self.kinds.get(kind).and_then(|docs| docs.get(name))
    }

    /// Kinds present, sorted
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Total number of documents
    pub fn len(&self) -> usize {
        self.kinds.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every document wrapped by kind, ordered by kind then name
    pub fn resources(&self) -> Vec<Resource> {
        self.kinds
            .values()
            .flat_map(BTreeMap::values)
            .cloned()
            .map(Resource::from_document)
            .collect()
    }

    /// Every Job, by name
    pub fn jobs(&self) -> BTreeMap<String, Job> {
        self.wrap(JOB_KIND, Job::from_document)
    }

    /// Jobs carrying the hook annotation, by name
    pub fn hooks(&self) -> BTreeMap<String, Job> {
        self.jobs()
            .into_iter()
            .filter(|(_, job)| job.is_hook())
            .collect()
    }

    /// Hooks in execution order: by weight, then by name
    pub fn hooks_in_order(&self) -> Vec<Job> {
        let mut hooks: Vec<Job> = self.hooks().into_values().collect();
        // BTreeMap order is by name, so a stable sort on weight is enough
        hooks.sort_by_key(Job::hook_weight);
        hooks
    }

    /// Every Deployment, by name
    pub fn deployments(&self) -> BTreeMap<String, Deployment> {
        self.wrap(DEPLOYMENT_KIND, Deployment::from_document)
    }

    fn wrap<T>(&self, kind: &str, wrap: impl Fn(RawDocument) -> T) -> BTreeMap<String, T> {
        self.kind(kind)
            .map(|docs| {
                docs.iter()
                    .map(|(name, doc)| (name.clone(), wrap(doc.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }
}
