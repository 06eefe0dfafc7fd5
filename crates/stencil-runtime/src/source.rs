//! Template sources: where template text and modification times come from.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use stencil_compiler::{source_path, IncludeResolver, IncludedSource};

/// A located template source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    File(PathBuf),
    /// Key of an in-memory source (the template's relative source path).
    Memory(String),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::File(path) => write!(f, "{}", path.display()),
            Resource::Memory(key) => write!(f, "memory:{key}"),
        }
    }
}

/// Lookup of template text by name.
pub trait TemplateSource: Send + Sync + fmt::Debug {
    /// Resource holding template `name` with `extension`, if any.
    fn locate(&self, name: &str, extension: &str) -> Option<Resource>;

    fn read(&self, resource: &Resource) -> io::Result<String>;

    fn modified(&self, resource: &Resource) -> io::Result<DateTime<Utc>>;

    /// Names of every template with `extension` this source can provide.
    fn template_names(&self, extension: &str) -> io::Result<Vec<String>>;
}

/// Whether `name` is a dotted template name: non-empty segments free of path
/// separators, so the resolved path always stays under its root.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            !segment.is_empty() && !segment.contains(&['/', '\\', ':', '\0'][..])
        })
}

fn unsupported(resource: &Resource) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("resource {resource} does not belong to this source"),
    )
}

/// Templates stored as files under one or more root directories; earlier
/// roots take precedence.
#[derive(Debug, Clone, Default)]
pub struct DirectorySource {
    roots: Vec<PathBuf>,
}

impl DirectorySource {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl TemplateSource for DirectorySource {
    fn locate(&self, name: &str, extension: &str) -> Option<Resource> {
        if !is_valid_name(name) {
            return None;
        }
        let relative = source_path(name, extension);
        self.roots
            .iter()
            .map(|root| root.join(&relative))
            .find(|path| path.is_file())
            .map(Resource::File)
    }

    fn read(&self, resource: &Resource) -> io::Result<String> {
        match resource {
            Resource::File(path) => std::fs::read_to_string(path),
            Resource::Memory(_) => Err(unsupported(resource)),
        }
    }

    fn modified(&self, resource: &Resource) -> io::Result<DateTime<Utc>> {
        match resource {
            Resource::File(path) => Ok(std::fs::metadata(path)?.modified()?.into()),
            Resource::Memory(_) => Err(unsupported(resource)),
        }
    }

    fn template_names(&self, extension: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for root in &self.roots {
            if root.is_dir() {
                collect_names(root, root, extension, &mut names)?;
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }
}

fn collect_names(root: &Path, dir: &Path, extension: &str, names: &mut Vec<String>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_names(root, &path, extension, names)?;
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let Some(relative) = relative.to_str() else {
            continue;
        };
        if let Some(stem) = relative.strip_suffix(extension) {
            let name = stem.replace(std::path::MAIN_SEPARATOR, ".");
            if is_valid_name(&name) {
                names.push(name);
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    content: String,
    modified: DateTime<Utc>,
}

/// Templates held in memory with explicit modification times.
///
/// Mutable through a shared reference, so sources handed to a factory can
/// still be updated.
#[derive(Debug, Default)]
pub struct MemorySource {
    entries: DashMap<String, MemoryEntry>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace template `name`, stamped with the current time.
    pub fn insert(&self, name: &str, extension: &str, content: impl Into<String>) {
        self.insert_with_modified(name, extension, content, Utc::now());
    }

    pub fn insert_with_modified(
        &self,
        name: &str,
        extension: &str,
        content: impl Into<String>,
        modified: DateTime<Utc>,
    ) {
        self.entries.insert(
            source_path(name, extension),
            MemoryEntry {
                content: content.into(),
                modified,
            },
        );
    }

    /// Change the modification time of an existing template. Returns `false`
    /// when it does not exist.
    pub fn touch(&self, name: &str, extension: &str, modified: DateTime<Utc>) -> bool {
        match self.entries.get_mut(&source_path(name, extension)) {
            Some(mut entry) => {
                entry.modified = modified;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, name: &str, extension: &str) -> bool {
        self.entries.remove(&source_path(name, extension)).is_some()
    }

    fn entry(&self, resource: &Resource) -> io::Result<MemoryEntry> {
        let Resource::Memory(key) = resource else {
            return Err(unsupported(resource));
        };
        self.entries
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{resource} was removed")))
    }
}

impl TemplateSource for MemorySource {
    fn locate(&self, name: &str, extension: &str) -> Option<Resource> {
        if !is_valid_name(name) {
            return None;
        }
        let key = source_path(name, extension);
        self.entries.contains_key(&key).then_some(Resource::Memory(key))
    }

    fn read(&self, resource: &Resource) -> io::Result<String> {
        Ok(self.entry(resource)?.content)
    }

    fn modified(&self, resource: &Resource) -> io::Result<DateTime<Utc>> {
        Ok(self.entry(resource)?.modified)
    }

    fn template_names(&self, extension: &str) -> io::Result<Vec<String>> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter_map(|entry| entry.key().strip_suffix(extension).map(|stem| stem.replace('/', ".")))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Several sources consulted in order.
#[derive(Debug, Default)]
pub struct SourceChain {
    sources: Vec<std::sync::Arc<dyn TemplateSource>>,
}

impl SourceChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: std::sync::Arc<dyn TemplateSource>) -> Self {
        self.sources.push(source);
        self
    }

    fn first_ok<T>(&self, resource: &Resource, op: impl Fn(&dyn TemplateSource) -> io::Result<T>) -> io::Result<T> {
        let mut last_error = unsupported(resource);
        for source in &self.sources {
            match op(source.as_ref()) {
                Ok(value) => return Ok(value),
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }
}

impl TemplateSource for SourceChain {
    fn locate(&self, name: &str, extension: &str) -> Option<Resource> {
        self.sources.iter().find_map(|s| s.locate(name, extension))
    }

    fn read(&self, resource: &Resource) -> io::Result<String> {
        self.first_ok(resource, |s| s.read(resource))
    }

    fn modified(&self, resource: &Resource) -> io::Result<DateTime<Utc>> {
        self.first_ok(resource, |s| s.modified(resource))
    }

    fn template_names(&self, extension: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for source in &self.sources {
            names.extend(source.template_names(extension)?);
        }
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Resolves `{{i NAME/}}` includes against a template source.
#[derive(Debug)]
pub(crate) struct SourceIncludes<'a> {
    pub source: &'a dyn TemplateSource,
    pub extension: &'a str,
}

impl IncludeResolver for SourceIncludes<'_> {
    fn resolve_include(&self, name: &str) -> io::Result<Option<IncludedSource>> {
        let Some(resource) = self.source.locate(name, self.extension) else {
            return Ok(None);
        };
        let content = self.source.read(&resource)?;
        let modified = self.source.modified(&resource).ok();
        Ok(Some(IncludedSource { content, modified }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    #[test]
    fn test_directory_source_maps_dotted_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pages")).unwrap();
        std::fs::write(dir.path().join("pages/home.html"), "home").unwrap();

        let source = DirectorySource::new([dir.path()]);
        let resource = source.locate("pages.home", ".html").unwrap();
        assert_eq!(source.read(&resource).unwrap(), "home");
        assert!(source.modified(&resource).is_ok());
        assert!(source.locate("pages.missing", ".html").is_none());
        assert!(source.locate("pages..home", ".html").is_none());
        assert!(source.locate("pages/home", ".html").is_none());
        assert_eq!(source.template_names(".html").unwrap(), vec!["pages.home"]);
    }

    #[test]
    fn test_names_cannot_escape_the_root() {
        let outside = tempfile::tempdir().unwrap();
        let secret = outside.path().join("secret.txt");
        std::fs::write(&secret, "hidden").unwrap();
        let root = tempfile::tempdir().unwrap();
        let source = DirectorySource::new([root.path()]);

        let absolute = secret.with_extension("").display().to_string();
        assert!(source.locate(&absolute, ".txt").is_none());
        assert!(source.locate("..secret", ".txt").is_none());
        assert!(source.locate("a\\b", ".txt").is_none());
        assert!(source.locate("c:secret", ".txt").is_none());

        assert!(is_valid_name("pages.home"));
        assert!(!is_valid_name("/etc/passwd"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn test_directory_source_root_precedence() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("a.txt"), "first").unwrap();
        std::fs::write(second.path().join("a.txt"), "second").unwrap();
        std::fs::write(second.path().join("b.txt"), "only second").unwrap();

        let source = DirectorySource::new([first.path(), second.path()]);
        let a = source.locate("a", ".txt").unwrap();
        assert_eq!(source.read(&a).unwrap(), "first");
        assert_eq!(source.template_names(".txt").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_memory_source_touch() {
        let source = MemorySource::new();
        let t0 = Utc::now();
        source.insert_with_modified("greeting", ".txt", "hi", t0);
        let resource = source.locate("greeting", ".txt").unwrap();
        assert_eq!(resource, Resource::Memory("greeting.txt".to_string()));
        assert_eq!(source.modified(&resource).unwrap(), t0);

        assert!(source.touch("greeting", ".txt", t0 + Duration::seconds(5)));
        assert_eq!(source.modified(&resource).unwrap(), t0 + Duration::seconds(5));
        assert!(!source.touch("nope", ".txt", t0));

        assert!(source.remove("greeting", ".txt"));
        assert!(source.read(&resource).is_err());
    }

    #[test]
    fn test_chain_consults_sources_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("disk.txt"), "disk").unwrap();
        let memory = Arc::new(MemorySource::new());
        memory.insert("mem", ".txt", "memory");

        let chain = SourceChain::new()
            .with_source(memory)
            .with_source(Arc::new(DirectorySource::new([dir.path()])));
        let disk = chain.locate("disk", ".txt").unwrap();
        let mem = chain.locate("mem", ".txt").unwrap();
        assert_eq!(chain.read(&disk).unwrap(), "disk");
        assert_eq!(chain.read(&mem).unwrap(), "memory");
        assert_eq!(chain.template_names(".txt").unwrap(), vec!["disk", "mem"]);
    }

    #[test]
    fn test_source_includes_resolves_through_source() {
        let memory = MemorySource::new();
        memory.insert("common.header", ".html", "<h1/>");
        let includes = SourceIncludes {
            source: &memory,
            extension: ".html",
        };
        let included = includes.resolve_include("common.header").unwrap().unwrap();
        assert_eq!(included.content, "<h1/>");
        assert!(included.modified.is_some());
        assert!(includes.resolve_include("missing").unwrap().is_none());
    }
}
