//! `stencil-ctl check`

use anyhow::bail;
use stencil_runtime::{TemplateFactory, TemplateRegistry};

use crate::output;

#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    passed: usize,
    failed: usize,
}

pub(crate) fn handle_check_command(
    registry: &TemplateRegistry,
    family: Option<&str>,
) -> anyhow::Result<()> {
    let factories = match family {
        Some(id) => vec![registry.family(id)?],
        None => registry
            .families()
            .into_iter()
            .map(|id| registry.family(id))
            .collect::<Result<Vec<_>, _>>()?,
    };

    let mut total = Tally::default();
    for factory in factories {
        let tally = check_family(factory)?;
        total.passed += tally.passed;
        total.failed += tally.failed;
    }

    output::blank();
    if total.failed > 0 {
        bail!("{} of {} templates failed to compile", total.failed, total.passed + total.failed);
    }
    if total.passed == 0 {
        output::warning("No templates found.");
    } else {
        output::success(format!("{} templates compiled", total.passed));
    }
    Ok(())
}

fn check_family(factory: &TemplateFactory) -> anyhow::Result<Tally> {
    let names = factory.template_names()?;
    let mut tally = Tally::default();
    if names.is_empty() {
        return Ok(tally);
    }

    output::header(format!("{} ({})", factory.identifier(), factory.extension()));
    for name in names {
        match factory.loader().load(&name) {
            Ok(artifact) => {
                tally.passed += 1;
                output::outcome(true, &name);
                if !artifact.dependencies().is_empty() {
                    output::muted(format!("      includes {}", artifact.dependencies().len()));
                }
            }
            Err(e) => {
                tally.failed += 1;
                output::outcome(false, format!("{name}: {e}"));
            }
        }
    }
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stencil_runtime::MemorySource;

    #[test]
    fn test_check_counts_failures() {
        let source = Arc::new(MemorySource::new());
        source.insert("good", ".txt", "{{v a/}}");
        source.insert("bad", ".txt", "{{b open}}");
        source.insert("fine", ".xml", "<x/>");
        let registry = TemplateRegistry::with_builtin_families(source).unwrap();

        let txt = check_family(registry.family("txt").unwrap()).unwrap();
        assert_eq!(txt, Tally { passed: 1, failed: 1 });
        assert!(handle_check_command(&registry, Some("xml")).is_ok());
        assert!(handle_check_command(&registry, None).is_err());
        assert!(handle_check_command(&registry, Some("pdf")).is_err());
    }
}
