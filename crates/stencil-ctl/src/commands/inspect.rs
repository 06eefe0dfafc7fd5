//! `stencil-ctl inspect`

use anyhow::Context;
use stencil_core::{Template, ROOT_BLOCK};
use stencil_runtime::TemplateRegistry;

use crate::output;

pub(crate) fn handle_inspect_command(
    registry: &TemplateRegistry,
    family: &str,
    name: &str,
) -> anyhow::Result<()> {
    let factory = registry.family(family)?;
    let template = factory
        .get(name)
        .with_context(|| format!("cannot load template '{name}'"))?;

    output::header(format!("Template {}", template.full_name()));
    output::label("Family", template.family());
    output::label("Content type", template.default_content_type());
    output::label("Language", template.language().unwrap_or("-"));
    output::label("Generation", template.generation());
    output::blank();

    output::header("Values");
    for id in template.available_value_ids() {
        let detail = template.default_value(id).map(|d| format!("default: {d:?}"));
        output::entry(id, detail.as_deref());
    }
    output::blank();

    output::header("Blocks");
    for id in template.block_ids().filter(|id| *id != ROOT_BLOCK) {
        output::entry(id, None);
    }

    let filters = factory.loader().compiler().filters();
    print_filtered(
        "Filtered values",
        filters.value_filter_names(),
        |filter| template_values(&template, filter),
    );
    print_filtered(
        "Filtered blocks",
        filters.block_filter_names(),
        |filter| template_blocks(&template, filter),
    );

    if !template.dependencies().is_empty() {
        output::blank();
        output::header("Dependencies");
        for dependency in template.dependencies() {
            let modified = dependency.modified.map(|m| m.to_rfc3339());
            output::entry(&dependency.name, modified.as_deref());
        }
    }
    Ok(())
}

fn template_values(template: &Template, filter: &str) -> Vec<String> {
    template.filtered_values(filter).iter().map(|c| c.id.clone()).collect()
}

fn template_blocks(template: &Template, filter: &str) -> Vec<String> {
    template.filtered_blocks(filter).iter().map(|c| c.id.clone()).collect()
}

fn print_filtered<'a>(
    title: &str,
    filters: impl Iterator<Item = &'a str>,
    matches: impl Fn(&str) -> Vec<String>,
) {
    let rows: Vec<(&str, Vec<String>)> = filters
        .map(|filter| (filter, matches(filter)))
        .filter(|(_, ids)| !ids.is_empty())
        .collect();
    if rows.is_empty() {
        return;
    }
    output::blank();
    output::header(title);
    for (filter, ids) in rows {
        output::label(filter, ids.join(", "));
    }
}
