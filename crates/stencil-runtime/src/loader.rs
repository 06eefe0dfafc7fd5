//! Compiled-artifact cache and loader.
//!
//! Artifacts are cached per template name and recompiled when missing or,
//! with auto-reload enabled, stale. Compilation for one name runs under that
//! name's lock only; requests for other names proceed independently. A
//! reload swaps the cached `Arc`, so templates holding the previous artifact
//! keep working.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use stencil_compiler::TemplateCompiler;
use stencil_core::CompiledArtifact;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::persist::ArtifactStore;
use crate::source::{is_valid_name, SourceIncludes, TemplateSource};

#[derive(Debug)]
pub struct ArtifactLoader {
    source: Arc<dyn TemplateSource>,
    compiler: TemplateCompiler,
    auto_reload: bool,
    store: Option<ArtifactStore>,
    cache: DashMap<String, Arc<CompiledArtifact>>,
    locks: DashMap<String, Arc<Mutex<()>>>,
    generation: AtomicU64,
    compilations: AtomicU64,
}

impl ArtifactLoader {
    /// Loader with auto-reload enabled and no persistence.
    pub fn new(source: Arc<dyn TemplateSource>, compiler: TemplateCompiler) -> Self {
        Self {
            source,
            compiler,
            auto_reload: true,
            store: None,
            cache: DashMap::new(),
            locks: DashMap::new(),
            generation: AtomicU64::new(0),
            compilations: AtomicU64::new(0),
        }
    }

    pub fn with_auto_reload(mut self, auto_reload: bool) -> Self {
        self.auto_reload = auto_reload;
        self
    }

    pub fn with_store(mut self, store: ArtifactStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn auto_reload(&self) -> bool {
        self.auto_reload
    }

    pub fn compiler(&self) -> &TemplateCompiler {
        &self.compiler
    }

    pub fn source(&self) -> &Arc<dyn TemplateSource> {
        &self.source
    }

    /// Artifact for `name`, compiling it when absent or stale.
    pub fn load(&self, name: &str) -> Result<Arc<CompiledArtifact>, LoadError> {
        // Invalid names would resolve outside the source roots and the store.
        if !is_valid_name(name) {
            return Err(self.not_found(name));
        }
        if let Some(artifact) = self.fresh(name) {
            debug!(template = name, generation = artifact.generation(), "Artifact cache hit");
            return Ok(artifact);
        }

        let lock = self.lock_for(name);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // Another thread may have compiled while we waited.
        if let Some(artifact) = self.fresh(name) {
            debug!(template = name, "Artifact compiled by concurrent request");
            return Ok(artifact);
        }

        let previous = self.cache.get(name).map(|entry| entry.generation());
        if previous.is_none() {
            if let Some(artifact) = self.load_persisted(name) {
                return Ok(artifact);
            }
        }

        let mut artifact = self.compile(name)?;
        if let Some(store) = &self.store {
            store.save(&artifact)?;
        }
        artifact.set_generation(self.next_generation());
        let artifact = Arc::new(artifact);
        self.cache.insert(name.to_string(), Arc::clone(&artifact));

        match previous {
            Some(old) => info!(
                template = name,
                family = self.compiler.family(),
                old_generation = old,
                generation = artifact.generation(),
                "Recompiled stale template"
            ),
            None => debug!(
                template = name,
                family = self.compiler.family(),
                generation = artifact.generation(),
                "Compiled template"
            ),
        }
        Ok(artifact)
    }

    /// Whether `artifact` no longer matches its sources or the compiler
    /// settings. Lookup and I/O failures count as unmodified.
    pub fn is_modified(&self, artifact: &CompiledArtifact) -> bool {
        let state = self.compiler.modification_state();
        if artifact.modification_state() != Some(state.as_str()) {
            debug!(template = artifact.name(), "Modification state changed");
            return true;
        }

        if self.resource_newer(artifact.name(), artifact.source_modified()) {
            return true;
        }
        artifact
            .dependencies()
            .iter()
            .any(|dep| self.resource_newer(&dep.name, dep.modified))
    }

    /// Number of compilations performed by this loader.
    pub fn compilation_count(&self) -> u64 {
        self.compilations.load(Ordering::SeqCst)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    pub fn cached_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cache.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Drop the cached artifact for `name`. Returns whether one was cached.
    pub fn invalidate(&self, name: &str) -> bool {
        self.cache.remove(name).is_some()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Cached artifact that can be served without recompiling.
    fn fresh(&self, name: &str) -> Option<Arc<CompiledArtifact>> {
        let artifact = self.cache.get(name).map(|entry| Arc::clone(entry.value()))?;
        if self.auto_reload && self.is_modified(&artifact) {
            return None;
        }
        Some(artifact)
    }

    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn load_persisted(&self, name: &str) -> Option<Arc<CompiledArtifact>> {
        let store = self.store.as_ref()?;
        let mut artifact = store.load(self.compiler.family(), name)?;
        if self.auto_reload && self.is_modified(&artifact) {
            debug!(template = name, "Persisted artifact is stale");
            return None;
        }
        artifact.set_generation(self.next_generation());
        let artifact = Arc::new(artifact);
        self.cache.insert(name.to_string(), Arc::clone(&artifact));
        debug!(template = name, generation = artifact.generation(), "Using persisted artifact");
        Some(artifact)
    }

    fn not_found(&self, name: &str) -> LoadError {
        LoadError::NotFound {
            name: name.to_string(),
            family: self.compiler.family().to_string(),
        }
    }

    fn compile(&self, name: &str) -> Result<CompiledArtifact, LoadError> {
        let extension = self.compiler.extension();
        let resource = self
            .source
            .locate(name, extension)
            .ok_or_else(|| self.not_found(name))?;
        let content = self.source.read(&resource).map_err(|source| LoadError::Io {
            name: name.to_string(),
            source,
        })?;
        let modified = match self.source.modified(&resource) {
            Ok(modified) => Some(modified),
            Err(e) => {
                warn!(template = name, error = %e, "Cannot read modification time");
                None
            }
        };

        let includes = SourceIncludes {
            source: self.source.as_ref(),
            extension,
        };
        let artifact = self
            .compiler
            .compile(name, &content, modified, &includes)
            .map_err(|source| LoadError::Compile {
                name: name.to_string(),
                source,
            })?;
        self.compilations.fetch_add(1, Ordering::SeqCst);
        Ok(artifact)
    }

    fn resource_newer(&self, name: &str, recorded: Option<chrono::DateTime<chrono::Utc>>) -> bool {
        let Some(resource) = self.source.locate(name, self.compiler.extension()) else {
            warn!(template = name, "Source not found during modification check");
            return false;
        };
        match self.source.modified(&resource) {
            Ok(current) => match recorded {
                Some(recorded) => current > recorded,
                None => true,
            },
            Err(e) => {
                warn!(template = name, error = %e, "Modification check failed");
                false
            }
        }
    }
}
