//! Trace configuration

use crate::error::{Error, Result};
use crate::filter::{ProvenanceFilter, DEFAULT_SYSTEM_PREFIXES};
use std::path::{Path, PathBuf};

/// Trace options
///
/// The only externally tunable setting is the output destination. The
/// system prefixes are fixed when the session is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceOptions {
    /// Output file; `None` writes to standard error
    pub output: Option<PathBuf>,
    /// Path prefixes whose statements are not traced
    pub system_prefixes: Vec<String>,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            output: None,
            system_prefixes: DEFAULT_SYSTEM_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl TraceOptions {
    /// Sets the output file
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Replaces the system prefixes
    pub fn with_system_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.system_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the provenance filter these options describe
    pub fn filter(&self) -> ProvenanceFilter {
        ProvenanceFilter::new(self.system_prefixes.iter().cloned())
    }
}

/// Picks a per-compile output file inside a session directory:
/// `dir/site-<unit stem>-<pid>.jsonl`. Creates `dir` if needed.
pub fn session_output_path(dir: &Path, unit_name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| Error::SessionDir {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let stem = Path::new(unit_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("unit");

    let file_name = format!("site-{}-{}.jsonl", stem, std::process::id());
    Ok(dir.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = TraceOptions::default();
        assert_eq!(options.output, None);
        assert_eq!(options.system_prefixes, vec!["/usr/", "/lib/", "/opt/"]);
        assert_eq!(options.filter(), ProvenanceFilter::default());
    }

    #[test]
    fn test_builders() {
        let options = TraceOptions::default()
            .with_output("/tmp/trace.jsonl")
            .with_system_prefixes(["/sdk/"]);
        assert_eq!(options.output, Some(PathBuf::from("/tmp/trace.jsonl")));
        assert_eq!(options.system_prefixes, vec!["/sdk/".to_string()]);
    }

    #[test]
    fn test_session_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session");
        let path = session_output_path(&session, "src/main.c").unwrap();
        assert!(session.is_dir());
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()).unwrap(),
            format!("site-main-{}.jsonl", std::process::id())
        );
    }

    #[test]
    fn test_session_output_path_fails_under_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = session_output_path(&file.path().join("sub"), "main.c").unwrap_err();
        assert!(matches!(err, Error::SessionDir { .. }));
    }
}
