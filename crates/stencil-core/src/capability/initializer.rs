use crate::error::TemplateResult;
use crate::template::Template;

/// Hook run on every new or cleared template, after the localization and
/// language passes.
pub trait TemplateInitializer: Send + Sync + std::fmt::Debug {
    fn initialize(&self, template: &mut Template) -> TemplateResult<()>;
}
