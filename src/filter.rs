//! User-code provenance filter

use crate::ir::Location;

/// Path prefixes treated as system code unless configured otherwise
pub const DEFAULT_SYSTEM_PREFIXES: [&str; 3] = ["/usr/", "/lib/", "/opt/"];

/// Decides whether a statement's location belongs to user code.
///
/// Unknown locations, and known locations without a file, are never user
/// code. Otherwise a file is user code unless its path starts with one of the
/// system prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceFilter {
    system_prefixes: Vec<String>,
}

impl ProvenanceFilter {
    /// Creates a filter with the given system prefixes
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            system_prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Configured system prefixes
    pub fn system_prefixes(&self) -> &[String] {
        &self.system_prefixes
    }

    /// Whether `path` lives under a system prefix
    pub fn is_system_path(&self, path: &str) -> bool {
        self.system_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Whether a statement at `location` should be traced
    pub fn is_user_code(&self, location: &Location) -> bool {
        match location.file() {
            Some(file) => !self.is_system_path(file),
            None => false,
        }
    }
}

impl Default for ProvenanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PREFIXES)
    }
}
