//! Section locator for `helm upgrade --dry-run --debug` output
//!
//! The dry-run output is plain text. The parts we care about look like:
//!
//! ```text
//! HOOKS:
//! ---
//! # Source: app/templates/migrate.yaml
//! ...
//! MANIFEST:
//!
//! ---
//! # Source: app/templates/deployment.yaml
//! ...
//!
//! Release "app" has been upgraded. Happy Helming!
//! ```
//!
//! Markers are matched against whole lines. Everything here is
//! string scanning; turning the sections into resources is the job of
//! [`crate::manifest`].

use tracing::{debug, warn};

/// Line that opens the hooks section
pub const HOOKS_MARKER: &str = "HOOKS:";
/// Line that opens the manifest section
pub const MANIFEST_MARKER: &str = "MANIFEST:";

/// A section of the dry-run output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Hooks,
    Manifest,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Hooks => write!(f, "HOOKS"),
            Section::Manifest => write!(f, "MANIFEST"),
        }
    }
}

/// Sections found in one dry-run output, borrowed from it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections<'a> {
    /// Hook documents, between the HOOKS and MANIFEST markers
    pub hooks: Option<&'a str>,
    /// Release documents, after the MANIFEST marker
    pub manifest: Option<&'a str>,
    /// Markers that could not be found
    pub missing: Vec<Section>,
}

/// Finds the hook and manifest sections for one release
#[derive(Debug, Clone)]
pub struct SectionLocator {
    completion_line: String,
}

impl SectionLocator {
    /// Locator for a release whose upgrade ends with `completion_line`
    pub fn new(completion_line: impl Into<String>) -> Self {
        Self {
            completion_line: completion_line.into(),
        }
    }

    /// Split dry-run output into its sections
    ///
    /// A missing marker is reported through `missing` and a warning, never as
    /// an error. The hook section needs both markers to be bounded.
    pub fn locate<'a>(&self, text: &'a str) -> Sections<'a> {
        let lines = Lines::new(text);

        let hooks_at = lines.position(HOOKS_MARKER);
        let manifest_at = lines.position(MANIFEST_MARKER);
        let completion_at = lines.position(&self.completion_line);

        let mut sections = Sections::default();

        if hooks_at.is_none() {
            sections.missing.push(Section::Hooks);
        }
        if manifest_at.is_none() {
            sections.missing.push(Section::Manifest);
        }
        for section in &sections.missing {
            warn!(%section, "Cannot find {} section in helm dry-run output", section);
        }
        if !sections.missing.is_empty() {
            debug!(output = text, "helm dry-run output");
        }

        if let (Some(hooks), Some(manifest)) = (hooks_at, manifest_at) {
            if hooks < manifest {
                sections.hooks = Some(lines.slice(hooks + 1, manifest));
            }
        }

        if let Some(manifest) = manifest_at {
            let start = manifest + 1;
            // helm separates the manifest from the completion line with one line
            let end = match completion_at {
                Some(completion) if completion > manifest => (completion - 1).max(start),
                _ => lines.len(),
            };
            sections.manifest = Some(lines.slice(start, end));
        }

        sections
    }
}

/// Line view of a text that keeps byte offsets, so sections borrow from it
struct Lines<'a> {
    text: &'a str,
    offsets: Vec<usize>,
    lines: Vec<&'a str>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let mut offsets = Vec::new();
        let mut lines = Vec::new();
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            offsets.push(offset);
            offset += line.len();
            lines.push(strip_line_ending(line));
        }
        offsets.push(text.len());

        Self {
            text,
            offsets,
            lines,
        }
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    /// Index of the first line exactly equal to `needle`
    fn position(&self, needle: &str) -> Option<usize> {
        self.lines.iter().position(|line| *line == needle)
    }

    /// Text of lines `start..end`, line endings included
    fn slice(&self, start: usize, end: usize) -> &'a str {
        let start = start.min(self.len());
        let end = end.clamp(start, self.len());
        &self.text[self.offsets[start]..self.offsets[end]]
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn locator() -> SectionLocator {
        SectionLocator::new("Release \"app\" has been upgraded. Happy Helming!")
    }

    /// Log sink shared with a test subscriber
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` and return what it logged at WARN and above
    fn warnings_of(f: impl FnOnce()) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        log.contents()
    }

    #[test]
    fn test_all_sections() {
        let text = "REVISION: 2\nHOOKS:\nkind: Job\nMANIFEST:\n\nkind: Deployment\n\nRelease \"app\" has been upgraded. Happy Helming!\n";
        let sections = locator().locate(text);

        assert_eq!(sections.hooks, Some("kind: Job\n"));
        assert_eq!(sections.manifest, Some("\nkind: Deployment\n"));
        assert!(sections.missing.is_empty());
    }

    #[test]
    fn test_line_before_completion_is_dropped() {
        let text = "MANIFEST:\na: 1\nb: 2\nRelease \"app\" has been upgraded. Happy Helming!\n";
        let sections = locator().locate(text);
        assert_eq!(sections.manifest, Some("a: 1\n"));
    }

    #[test]
    fn test_manifest_runs_to_end_without_completion() {
        let text = "HOOKS:\nkind: Job\nMANIFEST:\nkind: Deployment\nmetadata:\n  name: web";
        let sections = locator().locate(text);

        assert_eq!(sections.hooks, Some("kind: Job\n"));
        assert_eq!(sections.manifest, Some("kind: Deployment\nmetadata:\n  name: web"));
    }

    #[test]
    fn test_completion_for_other_release_is_ignored() {
        let text = "MANIFEST:\nkind: Service\nRelease \"other\" has been upgraded. Happy Helming!\n";
        let sections = locator().locate(text);
        assert_eq!(
            sections.manifest,
            Some("kind: Service\nRelease \"other\" has been upgraded. Happy Helming!\n")
        );
    }

    #[test]
    fn test_missing_hooks() {
        let text = "MANIFEST:\nkind: Deployment\n";
        let sections = locator().locate(text);

        assert_eq!(sections.hooks, None);
        assert_eq!(sections.manifest, Some("kind: Deployment\n"));
        assert_eq!(sections.missing, vec![Section::Hooks]);
    }

    #[test]
    fn test_missing_section_is_logged_as_warning() {
        let log = warnings_of(|| {
            locator().locate("MANIFEST:\nkind: Deployment\n");
        });

        assert!(log.contains("WARN"), "log: {log}");
        assert!(log.contains("Cannot find HOOKS section in helm dry-run output"));
        assert!(!log.contains("MANIFEST section"));
    }

    #[test]
    fn test_complete_output_logs_nothing() {
        let log = warnings_of(|| {
            locator().locate("HOOKS:\nMANIFEST:\nkind: Deployment\n");
        });

        assert!(log.is_empty(), "log: {log}");
    }

    #[test]
    fn test_missing_manifest_skips_hooks_too() {
        let text = "HOOKS:\nkind: Job\n";
        let sections = locator().locate(text);

        assert_eq!(sections.hooks, None);
        assert_eq!(sections.manifest, None);
        assert_eq!(sections.missing, vec![Section::Manifest]);
    }

    #[test]
    fn test_both_missing_with_completion_line() {
        let text = "Release \"app\" has been upgraded. Happy Helming!\n";
        let sections = locator().locate(text);

        assert_eq!(sections.hooks, None);
        assert_eq!(sections.manifest, None);
        assert_eq!(sections.missing, vec![Section::Hooks, Section::Manifest]);
    }

    #[test]
    fn test_marker_must_be_whole_line() {
        let text = "NOTES: see HOOKS:\n  MANIFEST:\nMANIFEST:\nkind: A\n";
        let sections = locator().locate(text);

        assert_eq!(sections.missing, vec![Section::Hooks]);
        assert_eq!(sections.manifest, Some("kind: A\n"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "HOOKS:\r\nkind: Job\r\nMANIFEST:\r\nkind: Deployment\r\n";
        let sections = locator().locate(text);

        assert_eq!(sections.hooks, Some("kind: Job\r\n"));
        assert_eq!(sections.manifest, Some("kind: Deployment\r\n"));
    }

    #[test]
    fn test_hooks_after_manifest_yields_no_hook_section() {
        let text = "MANIFEST:\nkind: A\nHOOKS:\nkind: Job\n";
        let sections = locator().locate(text);

        assert_eq!(sections.hooks, None);
        assert!(sections.missing.is_empty());
    }

    #[test]
    fn test_empty_manifest_section() {
        let text = "HOOKS:\nMANIFEST:\n";
        let sections = locator().locate(text);

        assert_eq!(sections.hooks, Some(""));
        assert_eq!(sections.manifest, Some(""));
    }
}
