use glob::{MatchOptions, Pattern, glob};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TplError};

/// Resolves template names (including `include ... file "name"` targets) to source text.
pub trait SourceLoader: Send + Sync {
    /// Returns the template source, or [`TplError::FileNotFound`] when `name` does not exist.
    fn load(&self, name: &str) -> Result<String>;

    /// Names of every template matching the glob `pattern`, in the form [`load`](Self::load)
    /// accepts. Loaders that cannot enumerate their templates return nothing.
    fn names(&self, _pattern: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

const SEGMENT_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn glob_error(pattern: &str, e: impl std::fmt::Display) -> TplError {
    TplError::Glob(format!("{}: {}", pattern, e))
}

/// Loads templates from disk, resolving relative names against a base directory.
#[derive(Debug, Clone)]
pub struct FsLoader {
    base: PathBuf,
}

impl FsLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }
}

impl Default for FsLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl SourceLoader for FsLoader {
    fn load(&self, name: &str) -> Result<String> {
        let path = self.resolve(name);
        if !path.is_file() {
            return Err(TplError::FileNotFound(name.to_string()));
        }
        fs::read_to_string(&path).map_err(|source| TplError::Io { path, source })
    }

    /// Matches `pattern` relative to the base directory and returns base-relative names.
    fn names(&self, pattern: &str) -> Result<Vec<String>> {
        let full = self.resolve(pattern);
        let paths = glob(&full.to_string_lossy()).map_err(|e| glob_error(pattern, e))?;

        let mut names = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| TplError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if !path.is_file() {
                continue;
            }
            let name = path.strip_prefix(&self.base).unwrap_or(&path);
            names.push(name.to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

/// In-memory name -> source table, mostly for embedded templates and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(name.into(), source.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, name: &str) -> Result<String> {
        self.sources
            .get(name)
            .cloned()
            .ok_or_else(|| TplError::FileNotFound(name.to_string()))
    }

    fn names(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = Pattern::new(pattern).map_err(|e| glob_error(pattern, e))?;
        let mut names: Vec<String> = self
            .sources
            .keys()
            // `*` stays within one path segment, as it does on disk
            .filter(|name| pattern.matches_with(name, SEGMENT_MATCH))
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }
}
