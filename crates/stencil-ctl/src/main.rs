//! `stencil-ctl`: render, inspect and check Stencil templates from the shell.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stencil_runtime::{load_config, StencilConfig, TemplateRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stencil-ctl", version, about = "Render, inspect and check Stencil templates")]
#[command(styles = output::clap_styles())]
pub(crate) struct Cli {
    /// Configuration file; defaults to ./stencil.toml, then ~/.config/stencil/stencil.toml
    #[arg(long, global = true, env = "STENCIL_CONFIG")]
    config: Option<PathBuf>,

    /// Template root directory, searched before configured paths (repeatable)
    #[arg(long = "template-path", global = true)]
    template_paths: Vec<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Render a template to stdout or a file
    Render {
        /// Template name, e.g. `pages.home`
        name: String,

        #[arg(long, default_value = "html")]
        family: String,

        /// Set a value before rendering (repeatable)
        #[arg(long = "set", value_name = "ID=VALUE")]
        values: Vec<String>,

        /// Render only this block
        #[arg(long)]
        block: Option<String>,

        /// Active language for lang tags and bundle lookup
        #[arg(long)]
        language: Option<String>,

        /// Output charset (UTF-8, ISO-8859-1, US-ASCII)
        #[arg(long)]
        charset: Option<String>,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show a template's values, blocks, filtered tags and dependencies
    Inspect {
        name: String,

        #[arg(long, default_value = "html")]
        family: String,
    },

    /// Compile every template and report failures
    Check {
        /// Only check this family
        #[arg(long)]
        family: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "stencil=debug" } else { "stencil=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    let registry = TemplateRegistry::from_config(&config)?;
    tracing::debug!(families = ?registry.families(), "stencil-ctl ready");

    match cli.command {
        Commands::Render {
            name,
            family,
            values,
            block,
            language,
            charset,
            output,
        } => commands::handle_render_command(
            &registry,
            &commands::RenderRequest {
                name: &name,
                family: &family,
                values: &values,
                block: block.as_deref(),
                language: language.as_deref(),
                charset: charset.as_deref(),
                output: output.as_deref(),
            },
        ),
        Commands::Inspect { name, family } => {
            commands::handle_inspect_command(&registry, &family, &name)
        }
        Commands::Check { family } => commands::handle_check_command(&registry, family.as_deref()),
    }
}

/// Explicit `--config` is strict; discovered config falls back to defaults.
/// `--template-path` directories take precedence over configured ones.
fn resolve_config(cli: &Cli) -> anyhow::Result<StencilConfig> {
    let mut config = match &cli.config {
        Some(path) => StencilConfig::from_file(path)?,
        None => load_config(),
    };
    if !cli.template_paths.is_empty() {
        let mut paths: Vec<String> = cli
            .template_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        paths.append(&mut config.template_paths);
        config.template_paths = paths;
    }
    Ok(config)
}
