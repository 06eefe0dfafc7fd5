//! # stencil-runtime
//!
//! Everything between a template name and a ready [`Template`](stencil_core::Template):
//!
//! - [`TemplateSource`] implementations locating template text on disk or in memory
//! - [`ArtifactLoader`], the per-name locked, hot-reloading cache of compiled artifacts
//! - [`ArtifactStore`] for persisting compiled artifacts between runs
//! - [`TemplateFactory`] (one per output family) and [`TemplateRegistry`]
//! - [`StencilConfig`] loading and file-backed resource bundles
//!
//! ```no_run
//! use stencil_runtime::{load_config, TemplateRegistry};
//!
//! let registry = TemplateRegistry::from_config(&load_config())?;
//! let mut page = registry.get("html", "pages.home")?;
//! page.set_value("title", "Welcome")?;
//! println!("{}", page.get_content()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bundle;
pub mod config;
pub mod error;
pub mod factory;
pub mod loader;
pub mod persist;
pub mod registry;
pub mod source;

pub use bundle::{DirectoryBundleResolver, TomlBundle};
pub use config::{
    builtin_families, expand_path, load_config, EncoderKind, FamilyConfig, FilterConfig, StencilConfig,
};
pub use error::{ConfigError, FactoryError, LoadError};
pub use factory::TemplateFactory;
pub use loader::ArtifactLoader;
pub use persist::ArtifactStore;
pub use registry::TemplateRegistry;
pub use source::{DirectorySource, MemorySource, Resource, SourceChain, TemplateSource};
