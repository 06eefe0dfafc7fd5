//! # Stencil
//!
//! A block/value template engine. Template sources declare named **blocks**
//! (fragments of content) and **values** (slots filled at render time). A
//! template instance is filled by setting values to text or to compositions
//! of blocks, then resolved into output text.
//!
//! Compiled templates are cached per family and recompiled when their sources
//! or any included source change.
//!
//! ```no_run
//! use std::sync::Arc;
//! use stencil::{DirectorySource, TemplateRegistry};
//!
//! let registry = TemplateRegistry::with_builtin_families(Arc::new(DirectorySource::new(["templates"])))?;
//! let mut page = registry.get("html", "pages.list")?;
//! page.set_value("TITLE", "Fruit")?;
//! for fruit in ["apple", "pear"] {
//!     page.set_value("ITEM", fruit)?;
//!     page.append_block("CONTENT", "ROW")?;
//! }
//! println!("{}", page.get_content()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The crates behind this facade:
//!
//! - [`stencil_core`]: content model, value store, block resolution, tag evaluation
//! - [`stencil_compiler`]: template grammar and artifact compilation
//! - [`stencil_runtime`]: sources, artifact cache, factories, registry, configuration

pub use stencil_compiler;
pub use stencil_core;
pub use stencil_runtime;

pub use stencil_compiler::{CompileError, FilterDefinition, FilterSet, TemplateCompiler};
pub use stencil_core::{
    BeanHandler, BundleResolver, Charset, CompiledArtifact, Component, ComponentRegistry, Encoder,
    ExternalValue, HtmlEncoder, InternalValue, JsonBeanHandler, JsonEncoder, MapBundle,
    MapBundleResolver, RendererComponent, ResourceBundle, Template, TemplateBindings, TemplateError,
    TemplateInitializer, TemplateResult, ValueRenderer, XmlEncoder,
};
pub use stencil_runtime::{
    load_config, ArtifactLoader, ArtifactStore, ConfigError, DirectoryBundleResolver, DirectorySource,
    EncoderKind, FactoryError, FamilyConfig, LoadError, MemorySource, SourceChain, StencilConfig,
    TemplateFactory, TemplateRegistry, TemplateSource, TomlBundle,
};
