//! Collaborator capabilities consumed by templates: encoders, resource bundles,
//! bean handlers, initializers and renderer components.

mod bean;
mod bundle;
mod component;
mod encoder;
mod initializer;

pub use bean::{BeanHandler, JsonBeanHandler};
pub use bundle::{BundleResolver, MapBundle, MapBundleResolver, ResourceBundle};
pub use component::{
    Component, ComponentFactory, ComponentRegistry, RendererComponent, ValueRenderer,
};
pub use encoder::{Encoder, HtmlEncoder, JsonEncoder, XmlEncoder};
pub use initializer::TemplateInitializer;
