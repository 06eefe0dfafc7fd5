//! Bean binding: filling template values from the fields of a serializable object.

use serde_json::Value;

use crate::error::{TemplateError, TemplateResult};
use crate::template::Template;

/// Binds the fields of a bean to template values.
///
/// Beans arrive as JSON so handlers stay object safe; the template serializes
/// the caller's type before delegating.
pub trait BeanHandler: Send + Sync + std::fmt::Debug {
    fn set_bean(
        &self,
        template: &mut Template,
        bean: &Value,
        prefix: Option<&str>,
        encode: bool,
    ) -> TemplateResult<()>;

    fn remove_bean(
        &self,
        template: &mut Template,
        bean: &Value,
        prefix: Option<&str>,
    ) -> TemplateResult<()>;
}

/// Maps each top-level field `f` of a JSON object to the value `prefix + f`.
///
/// Fields without a matching declared value are ignored. Strings are set
/// verbatim, `null` removes the value and everything else is set as JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBeanHandler;

impl JsonBeanHandler {
    fn fields(bean: &Value) -> TemplateResult<&serde_json::Map<String, Value>> {
        bean.as_object().ok_or_else(|| {
            TemplateError::InvalidBean(format!("expected an object, found {}", kind(bean)))
        })
    }
}

impl BeanHandler for JsonBeanHandler {
    fn set_bean(
        &self,
        template: &mut Template,
        bean: &Value,
        prefix: Option<&str>,
        encode: bool,
    ) -> TemplateResult<()> {
        for (field, value) in Self::fields(bean)? {
            let id = format!("{}{field}", prefix.unwrap_or_default());
            if !template.has_value_id(&id) {
                continue;
            }
            let text = match value {
                Value::Null => {
                    template.remove_value(&id)?;
                    continue;
                }
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if encode {
                template.set_value_encoded(&id, &text)?;
            } else {
                template.set_value(&id, text)?;
            }
        }
        Ok(())
    }

    fn remove_bean(
        &self,
        template: &mut Template,
        bean: &Value,
        prefix: Option<&str>,
    ) -> TemplateResult<()> {
        for field in Self::fields(bean)?.keys() {
            let id = format!("{}{field}", prefix.unwrap_or_default());
            if template.has_value_id(&id) {
                template.remove_value(&id)?;
            }
        }
        Ok(())
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
