//! `stencil-ctl render`

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context};
use stencil_core::Template;
use stencil_runtime::TemplateRegistry;

use crate::output;

#[derive(Debug)]
pub(crate) struct RenderRequest<'a> {
    pub name: &'a str,
    pub family: &'a str,
    pub values: &'a [String],
    pub block: Option<&'a str>,
    pub language: Option<&'a str>,
    pub charset: Option<&'a str>,
    pub output: Option<&'a Path>,
}

pub(crate) fn handle_render_command(
    registry: &TemplateRegistry,
    request: &RenderRequest<'_>,
) -> anyhow::Result<()> {
    let mut template = registry
        .get(request.family, request.name)
        .with_context(|| format!("cannot load template '{}'", request.name))?;
    prepare(&mut template, request)?;

    match request.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create '{}'", path.display()))?;
            let mut writer = BufWriter::new(file);
            write(&mut template, request, &mut writer)?;
            writer.flush()?;
            output::success(format!("Rendered {} to {}", template.full_name(), path.display()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            write(&mut template, request, &mut stdout)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn prepare(template: &mut Template, request: &RenderRequest<'_>) -> anyhow::Result<()> {
    if let Some(language) = request.language {
        template.set_language(Some(language.to_string()));
    }
    for assignment in request.values {
        let (id, value) = parse_assignment(assignment)?;
        template
            .set_value_encoded(id, value)
            .with_context(|| format!("cannot set '{id}'"))?;
    }
    Ok(())
}

fn write<W: Write>(
    template: &mut Template,
    request: &RenderRequest<'_>,
    writer: &mut W,
) -> anyhow::Result<()> {
    match request.block {
        Some(block) => template.write_block(writer, block, request.charset)?,
        None => template.write_content(writer, request.charset)?,
    }
    Ok(())
}

/// Split `ID=VALUE` at the first `=`.
fn parse_assignment(raw: &str) -> anyhow::Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((id, value)) if !id.is_empty() => Ok((id, value)),
        _ => bail!("expected ID=VALUE, got '{raw}'"),
    }
}
