//! Release definition
//!
//! A [`Release`] is the fully resolved identity of one deployment unit: the
//! helm release name, the chart it is rendered from, and every override that
//! ends up on the `helm upgrade` command line. It is immutable once built;
//! use [`ReleaseBuilder`] (optionally seeded from a release file) to make one.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, Result};

/// A deployable release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    name: String,
    repo: String,
    image_version: String,
    namespace: String,
    chart_path: PathBuf,
    values: Vec<PathBuf>,
    set: Vec<String>,
    deploy_timeout: Option<Duration>,
}

impl Release {
    /// Start building a release
    pub fn builder() -> ReleaseBuilder {
        ReleaseBuilder::default()
    }

    /// Release name (unique within the namespace)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image repository injected as `global.dapp.repo`
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Image tag injected as `global.dapp.image_version`
    pub fn image_version(&self) -> &str {
        &self.image_version
    }

    /// Target namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Chart directory or chart reference
    pub fn chart_path(&self) -> &Path {
        &self.chart_path
    }

    /// Value files, in the order they are passed to helm
    pub fn values(&self) -> &[PathBuf] {
        &self.values
    }

    /// Caller supplied `key=value` overrides, in the order supplied
    pub fn set(&self) -> &[String] {
        &self.set
    }

    /// Timeout handed to helm for the deploy
    pub fn deploy_timeout(&self) -> Option<Duration> {
        self.deploy_timeout
    }

    /// The line helm prints once an upgrade of this release went through
    pub fn completion_line(&self) -> String {
        format!("Release \"{}\" has been upgraded. Happy Helming!", self.name)
    }
}

/// Builder for [`Release`], also the shape of a release file
///
/// ```yaml
/// name: myapp
/// repo: registry.example.com/myapp
/// imageVersion: "1.4.2"
/// namespace: production
/// chartPath: .helm
/// values:
///   - values/production.yaml
/// set:
///   - replicas=3
/// deployTimeout: 5m
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReleaseBuilder {
    name: Option<String>,
    repo: Option<String>,
    image_version: Option<String>,
    namespace: Option<String>,
    chart_path: Option<PathBuf>,
    #[serde(default)]
    values: Vec<PathBuf>,
    #[serde(default)]
    set: Vec<String>,
    #[serde(default, with = "humantime_serde")]
    deploy_timeout: Option<Duration>,
}

impl ReleaseBuilder {
    /// Load a release file
    ///
    /// Relative value files resolve against the file's directory. A relative
    /// chart path does as well when it exists there; otherwise it is kept as is
    /// so that repository references like `stable/nginx` keep working.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ReleaseFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut builder: Self = serde_yaml::from_str(&content)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for value_file in &mut builder.values {
            if value_file.is_relative() {
                *value_file = base.join(&*value_file);
            }
        }
        if let Some(chart) = &builder.chart_path {
            let candidate = base.join(chart);
            if chart.is_relative() && candidate.exists() {
                builder.chart_path = Some(candidate);
            }
        }

        Ok(builder)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    pub fn image_version(mut self, image_version: impl Into<String>) -> Self {
        self.image_version = Some(image_version.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn chart_path(mut self, chart_path: impl Into<PathBuf>) -> Self {
        self.chart_path = Some(chart_path.into());
        self
    }

    /// Append a value file
    pub fn values_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.values.push(path.into());
        self
    }

    /// Append an inline `key=value` override
    pub fn set(mut self, option: impl Into<String>) -> Self {
        self.set.push(option.into());
        self
    }

    pub fn deploy_timeout(mut self, timeout: Duration) -> Self {
        self.deploy_timeout = Some(timeout);
        self
    }

    /// Validate and freeze the release
    pub fn build(self) -> Result<Release> {
        for option in &self.set {
            validate_set_option(option)?;
        }

        Ok(Release {
            name: required(self.name, "name")?,
            repo: required(self.repo, "repo")?,
            image_version: required(self.image_version, "imageVersion")?,
            namespace: required(self.namespace, "namespace")?,
            chart_path: self.chart_path.ok_or_else(|| CoreError::MissingField {
                field: "chartPath".to_string(),
            })?,
            values: self.values,
            set: self.set,
            deploy_timeout: self.deploy_timeout,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CoreError::MissingField {
            field: field.to_string(),
        })
}

/// An override must look like `key=value` with a non-empty key
fn validate_set_option(option: &str) -> Result<()> {
    match option.split_once('=') {
        Some((key, _)) if !key.trim().is_empty() => Ok(()),
        _ => Err(CoreError::InvalidSetValue {
            value: option.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ReleaseBuilder {
        Release::builder()
            .name("myapp")
            .repo("registry.local/myapp")
            .image_version("1.2.3")
            .namespace("staging")
            .chart_path(".helm")
    }

    #[test]
    fn test_build_release() {
        let release = base()
            .values_file("a.yaml")
            .values_file("b.yaml")
            .set("replicas=2")
            .deploy_timeout(Duration::from_secs(120))
            .build()
            .unwrap();

        assert_eq!(release.name(), "myapp");
        assert_eq!(release.namespace(), "staging");
        assert_eq!(
            release.values(),
            &[PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]
        );
        assert_eq!(release.set(), &["replicas=2".to_string()]);
        assert_eq!(release.deploy_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_missing_field() {
        let err = Release::builder().name("x").build().unwrap_err();
        assert!(matches!(err, CoreError::MissingField { field } if field == "repo"));
    }

    #[test]
    fn test_blank_namespace_is_missing() {
        let err = base().namespace("  ").build().unwrap_err();
        assert!(matches!(err, CoreError::MissingField { field } if field == "namespace"));
    }

    #[test]
    fn test_invalid_set_value() {
        let err = base().set("noequals").build().unwrap_err();
        assert!(matches!(err, CoreError::InvalidSetValue { value } if value == "noequals"));

        let err = base().set("=value").build().unwrap_err();
        assert!(matches!(err, CoreError::InvalidSetValue { .. }));
    }

    #[test]
    fn test_set_value_may_contain_equals() {
        let release = base().set("annotations.a=b=c").build().unwrap();
        assert_eq!(release.set(), &["annotations.a=b=c".to_string()]);
    }

    #[test]
    fn test_completion_line() {
        let release = base().build().unwrap();
        assert_eq!(
            release.completion_line(),
            "Release \"myapp\" has been upgraded. Happy Helming!"
        );
    }

    #[test]
    fn test_release_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".helm")).unwrap();
        let file = dir.path().join("release.yaml");
        std::fs::write(
            &file,
            r#"name: myapp
repo: registry.local/myapp
imageVersion: "2.0"
namespace: production
chartPath: .helm
values:
  - values/prod.yaml
  - /etc/shared.yaml
set:
  - replicas=3
deployTimeout: 5m
"#,
        )
        .unwrap();

        let release = ReleaseBuilder::from_file(&file).unwrap().build().unwrap();

        assert_eq!(release.image_version(), "2.0");
        assert_eq!(release.chart_path(), dir.path().join(".helm"));
        assert_eq!(
            release.values(),
            &[
                dir.path().join("values/prod.yaml"),
                PathBuf::from("/etc/shared.yaml")
            ]
        );
        assert_eq!(release.deploy_timeout(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_release_file_chart_reference_kept() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("release.yaml");
        std::fs::write(&file, "chartPath: stable/nginx\n").unwrap();

        let builder = ReleaseBuilder::from_file(&file).unwrap();
        let release = builder
            .name("web")
            .repo("r")
            .image_version("v")
            .namespace("ns")
            .build()
            .unwrap();
        assert_eq!(release.chart_path(), Path::new("stable/nginx"));
    }

    #[test]
    fn test_cli_overrides_extend_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("release.yaml");
        std::fs::write(&file, "name: from-file\nset:\n  - a=1\n").unwrap();

        let release = ReleaseBuilder::from_file(&file)
            .unwrap()
            .name("from-cli")
            .repo("r")
            .image_version("v")
            .namespace("ns")
            .chart_path("chart")
            .set("b=2")
            .build()
            .unwrap();

        assert_eq!(release.name(), "from-cli");
        assert_eq!(release.set(), &["a=1".to_string(), "b=2".to_string()]);
    }

    #[test]
    fn test_release_file_not_found() {
        let err = ReleaseBuilder::from_file(Path::new("/nonexistent/release.yaml")).unwrap_err();
        assert!(matches!(err, CoreError::ReleaseFileNotFound { .. }));
    }

    #[test]
    fn test_release_file_unknown_field() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("release.yaml");
        std::fs::write(&file, "nmae: typo\n").unwrap();

        let err = ReleaseBuilder::from_file(&file).unwrap_err();
        assert!(matches!(err, CoreError::YamlParse(_)));
    }
}
