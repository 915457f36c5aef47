use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use crate::error::BoxError;


/// Source of partial templates, consulted each time a partial is rendered.
pub trait PartialProvider: Send + Sync {
    /// Returns the source of partial `name`.
    ///
    /// A partial that does not exist is `Ok("")`; errors are reserved for
    /// failures of the provider itself.
    fn get(&self, name: &str) -> Result<String, BoxError>;
}


/// Partials held in memory, by name.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    partials: HashMap<String, String>,
}

impl StaticProvider {
    pub fn new<K, V>(partials: impl IntoIterator<Item = (K, V)>) -> Self
    where K: Into<String>, V: Into<String> {
        StaticProvider {
            partials: partials.into_iter()
                .map(|(name, text)| (name.into(), text.into()))
                .collect()
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.partials.insert(name.into(), text.into());
    }
}

impl PartialProvider for StaticProvider {
    fn get(&self, name: &str) -> Result<String, BoxError> {
        Ok(self.partials.get(name).cloned().unwrap_or_default())
    }
}


#[derive(Debug, thiserror::Error)]
#[error("unsafe partial name: {0}")]
pub struct UnsafePartialName(pub String);


/// Partials read from files.
///
/// Partial `NAME` is looked up in every path of `paths` as a file named
/// `NAME` followed by each of `extensions`, in order. Unless `unsafe_paths`
/// is set, names leading outside of the search paths are rejected.
#[derive(Debug, Clone)]
pub struct FileProvider {
    pub paths: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub unsafe_paths: bool,
}

impl Default for FileProvider {
    fn default() -> Self {
        FileProvider {
            paths: vec![PathBuf::new()],
            extensions: vec![String::new(), ".mustache".to_owned(), ".stache".to_owned()],
            unsafe_paths: false
        }
    }
}

impl FileProvider {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        FileProvider {
            paths: paths.into_iter().map(Into::into).collect(),
            ..FileProvider::default()
        }
    }

    pub fn with_extensions(mut self, extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

impl PartialProvider for FileProvider {
    fn get(&self, name: &str) -> Result<String, BoxError> {
        let name = if self.unsafe_paths {
            PathBuf::from(name)
        } else {
            clean_name(name).ok_or_else(|| UnsafePartialName(name.to_owned()))?
        };
        for path in &self.paths {
            for ext in &self.extensions {
                let mut file_name = name.clone().into_os_string();
                file_name.push(ext);
                let candidate = path.join(file_name);
                if candidate.is_file() {
                    log::trace!("partial {} read from {}", name.display(), candidate.display());
                    return Ok(fs::read_to_string(&candidate)?);
                }
            }
        }
        Ok(String::new())
    }
}

// Lexically normalized relative path, `None` when it would escape
fn clean_name(name: &str) -> Option<PathBuf> {
    if name.starts_with(['/', '\\']) {
        return None;
    }
    let mut parts = Vec::new();
    for part in name.split(['/', '\\']) {
        match part {
            "" | "." => {},
            ".." => {
                parts.pop()?;
            },
            part if part.contains(':') => return None,
            part => parts.push(part)
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.iter().collect())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider() {
        let mut provider = StaticProvider::new([("a", "A")]);
        provider.insert("b", "B");
        assert_eq!(provider.get("a").unwrap(), "A");
        assert_eq!(provider.get("b").unwrap(), "B");
        assert_eq!(provider.get("c").unwrap(), "");
    }

    #[test]
    fn clean_names() {
        assert_eq!(clean_name("a/./b"), Some(PathBuf::from("a/b")));
        assert_eq!(clean_name("a/../b"), Some(PathBuf::from("b")));
        assert_eq!(clean_name("../unsafe"), None);
        assert_eq!(clean_name("docs/..\\..\\test.txt"), None);
        assert_eq!(clean_name("/etc/passwd"), None);
        assert_eq!(clean_name("c:/x"), None);
        assert_eq!(clean_name("."), None);
    }

    #[test]
    fn file_provider() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("partial.mustache"), "hello {{Name}}").unwrap();
        fs::write(dir.path().join("plain"), "plain").unwrap();
        let provider = FileProvider::new([dir.path()]);
        assert_eq!(provider.get("partial").unwrap(), "hello {{Name}}");
        assert_eq!(provider.get("plain").unwrap(), "plain");
        assert_eq!(provider.get("missing").unwrap(), "");

        let provider = provider.with_extensions([".txt"]);
        assert_eq!(provider.get("partial").unwrap(), "");
    }

    #[test]
    fn file_provider_rejects_unsafe_names() {
        let provider = FileProvider::default();
        let err = provider.get("../unsafe").unwrap_err();
        assert_eq!(err.to_string(), "unsafe partial name: ../unsafe");
    }
}
