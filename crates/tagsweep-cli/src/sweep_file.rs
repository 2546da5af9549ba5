//! Optional YAML file supplying defaults for `tagsweep clean`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Contents of a `tagsweep.yaml` file.
///
/// Every field is optional; command-line flags and environment variables
/// take precedence over values found here.
///
/// ```yaml
/// url: https://harbor.example.com
/// user: robot$cleaner
/// project: library
/// keep: 10
/// concurrency: 4
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub struct SweepFile {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub project: Option<String>,
    pub keep: Option<i64>,
    /// Request timeout in seconds.
    pub timeout: Option<u64>,
    /// Connect timeout in seconds.
    pub connect_timeout: Option<u64>,
    pub concurrency: Option<usize>,
    pub page_size: Option<u32>,
    pub dry_run: Option<bool>,
    pub insecure: Option<bool>,
    pub ca_cert: Option<PathBuf>,
}

impl SweepFile {
    /// Loads a sweep file from YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "url: https://harbor.example.com\n\
             user: admin\n\
             password: secret\n\
             project: library\n\
             keep: 10\n\
             timeout: 45\n\
             connect_timeout: 5\n\
             concurrency: 4\n\
             page_size: 50\n\
             dry_run: true\n\
             insecure: false\n\
             ca_cert: /etc/ssl/harbor.pem"
        )
        .unwrap();

        let sweep = SweepFile::load(file.path()).unwrap();
        assert_eq!(sweep.url.as_deref(), Some("https://harbor.example.com"));
        assert_eq!(sweep.project.as_deref(), Some("library"));
        assert_eq!(sweep.keep, Some(10));
        assert_eq!(sweep.timeout, Some(45));
        assert_eq!(sweep.connect_timeout, Some(5));
        assert_eq!(sweep.concurrency, Some(4));
        assert_eq!(sweep.page_size, Some(50));
        assert_eq!(sweep.dry_run, Some(true));
        assert_eq!(sweep.ca_cert, Some(PathBuf::from("/etc/ssl/harbor.pem")));
    }

    #[test]
    fn test_partial_and_empty_files() {
        let sweep = SweepFile::parse("project: library\n").unwrap();
        assert_eq!(sweep.project.as_deref(), Some("library"));
        assert!(sweep.url.is_none());

        assert_eq!(SweepFile::parse("  \n").unwrap(), SweepFile::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = SweepFile::parse("keep_last: 3\n").unwrap_err();
        assert!(err.to_string().contains("keep_last"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SweepFile::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
