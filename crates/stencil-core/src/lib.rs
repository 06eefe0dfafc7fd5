//! # stencil-core
//!
//! Runtime model of Stencil templates: the immutable content tree produced by
//! compilation, the per-instance value store, block resolution and the tag
//! evaluation passes (renderers, localization, language variants).
//!
//! A [`Template`] is normally obtained from a factory in `stencil-runtime`,
//! which compiles and caches the [`CompiledArtifact`] it is bound to.

pub mod bindings;
pub mod capability;
pub mod charset;
pub mod error;
pub mod model;
pub mod template;
pub mod value;

pub use bindings::TemplateBindings;
pub use capability::{
    BeanHandler, BundleResolver, Component, ComponentFactory, ComponentRegistry, Encoder,
    HtmlEncoder, JsonBeanHandler, JsonEncoder, MapBundle, MapBundleResolver, RendererComponent,
    ResourceBundle, TemplateInitializer, ValueRenderer, XmlEncoder,
};
pub use charset::Charset;
pub use error::{TemplateError, TemplateResult};
pub use model::{
    Block, BlockPart, CompiledArtifact, ContentTree, ContentTreeBuilder, Dependency,
    FilterCaptures, FILTER_L10N, FILTER_LANG, FILTER_RENDER, ROOT_BLOCK,
};
pub use template::Template;
pub use value::{ExternalValue, InternalPart, InternalValue};
